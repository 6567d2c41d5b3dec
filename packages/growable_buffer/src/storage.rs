use std::marker::PhantomData;
use std::num::NonZero;
use std::ptr::NonNull;

/// Where the bytes of a buffer live and who is responsible for freeing them.
///
/// The variant is the single source of truth for ownership. Only `Owned` storage is ever
/// passed to the allocator for reallocation or deallocation.
#[derive(Debug)]
pub(crate) enum Storage<'a> {
    /// No memory is referenced. The buffer length is always zero in this state.
    Unlinked,

    /// Memory owned by someone else, borrowed for `'a`. Never freed by the buffer.
    Linked {
        ptr: NonNull<u8>,

        /// Whether the region was linked through a mutable borrow. Read-only regions must never
        /// be written through this pointer.
        writable: bool,

        _region: PhantomData<&'a mut [u8]>,
    },

    /// Memory allocated through the buffer's allocator with a layout of
    /// `capacity` bytes and an alignment of 1. Every byte of the allocation is initialized.
    Owned {
        ptr: NonNull<u8>,
        capacity: NonZero<usize>,
    },
}

impl Storage<'_> {
    pub(crate) fn linked(ptr: NonNull<u8>, writable: bool) -> Self {
        Self::Linked {
            ptr,
            writable,
            _region: PhantomData,
        }
    }

    pub(crate) fn ptr(&self) -> Option<NonNull<u8>> {
        match self {
            Self::Unlinked => None,
            Self::Linked { ptr, .. } | Self::Owned { ptr, .. } => Some(*ptr),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        match self {
            Self::Unlinked | Self::Linked { .. } => 0,
            Self::Owned { capacity, .. } => capacity.get(),
        }
    }

    pub(crate) fn state_name(&self) -> &'static str {
        match self {
            Self::Unlinked => "unlinked",
            Self::Linked { writable: true, .. } => "linked",
            Self::Linked {
                writable: false, ..
            } => "linked (read-only)",
            Self::Owned { .. } => "owned",
        }
    }
}

/// An allocation released from a [`GrowableBuffer`][crate::GrowableBuffer], with everything
/// needed to hand it to another buffer via [`adopt()`][crate::GrowableBuffer::adopt].
///
/// Holding a `RawParts` does not free anything when it is dropped. Whoever holds it is responsible
/// for either adopting it into a buffer that uses the same allocator or freeing it through that
/// allocator with a layout of `capacity` bytes and an alignment of 1.
#[derive(Debug, Eq, PartialEq)]
pub struct RawParts {
    ptr: NonNull<u8>,
    len: usize,
    capacity: NonZero<usize>,
}

impl RawParts {
    /// Describes an allocation of `capacity` bytes starting at `ptr`, of which the first `len`
    /// bytes are the logical content.
    ///
    /// # Panics
    ///
    /// Panics if `len` is greater than `capacity`.
    #[must_use]
    pub fn new(ptr: NonNull<u8>, len: usize, capacity: NonZero<usize>) -> Self {
        assert!(
            len <= capacity.get(),
            "length {len} cannot exceed the capacity {capacity} of the allocation"
        );

        Self { ptr, len, capacity }
    }

    /// Pointer to the first byte of the allocation.
    #[must_use]
    pub fn ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Number of bytes of logical content at the start of the allocation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the allocation holds no logical content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the allocation in bytes.
    #[must_use]
    pub fn capacity(&self) -> NonZero<usize> {
        self.capacity
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_zero_unless_owned() {
        let mut byte = 7_u8;
        let ptr = NonNull::from(&mut byte);

        assert_eq!(Storage::Unlinked.capacity(), 0);
        assert_eq!(Storage::linked(ptr, true).capacity(), 0);
        assert_eq!(
            Storage::Owned {
                ptr,
                capacity: NonZero::new(1).unwrap()
            }
            .capacity(),
            1
        );
    }

    #[test]
    fn unlinked_has_no_pointer() {
        assert!(Storage::Unlinked.ptr().is_none());
    }

    #[test]
    #[should_panic]
    fn raw_parts_len_beyond_capacity_panics() {
        let mut byte = 0_u8;

        _ = RawParts::new(NonNull::from(&mut byte), 2, NonZero::new(1).unwrap());
    }
}
