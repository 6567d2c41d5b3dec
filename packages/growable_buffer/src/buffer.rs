use std::alloc::{GlobalAlloc, Layout, System};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::num::NonZero;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::{fmt, mem, ptr, slice};

use tracing::{debug, trace};

use crate::{Error, GrowableBufferBuilder, GrowthPolicy, MAX_SIZE, RawParts, Storage};

/// Owned allocations are plain bytes, so there is never an alignment requirement beyond 1.
const BYTE_ALIGNMENT: usize = 1;

/// A contiguous run of bytes that is either owned by the buffer or linked to memory owned by
/// someone else.
///
/// The buffer tracks its logical length separately from its allocated capacity and is always in
/// exactly one of three states:
///
/// * **unlinked** - no memory is referenced, the length is zero.
/// * **linked** - the buffer references a region borrowed for `'a`. It never reallocates or
///   frees that region. Linking is done via [`linked()`][Self::linked],
///   [`linked_read_only()`][Self::linked_read_only], [`manage()`][Self::manage] and friends.
/// * **owned** - the buffer allocated the memory through its allocator `A` and frees it when it
///   is dropped, deallocated or relinked.
///
/// Any operation that needs more capacity than the buffer owns converts it into an owned buffer.
/// A linked buffer is converted by allocating fresh storage and copying the linked bytes into
/// it, leaving the linked region untouched.
///
/// The buffer dereferences to `[u8]`, which provides iteration, indexing and comparison.
///
/// # Contents of newly exposed bytes
///
/// Bytes exposed by growing the length (via [`resize()`][Self::resize] or the gap opened by
/// [`insert()`][Self::insert]) have unspecified values. They are always initialized, so reading
/// them is safe, but they may hold zeroes or stale data from earlier operations.
///
/// # Examples
///
/// ```
/// use growable_buffer::GrowableBuffer;
///
/// let mut buffer = GrowableBuffer::copy_from_slice(b"ABCDE").unwrap();
///
/// let gap = buffer.insert(2, 2).unwrap();
/// buffer[gap..gap + 2].copy_from_slice(b"XY");
/// assert_eq!(buffer.as_slice(), b"ABXYCDE");
///
/// buffer.erase(1, 3);
/// assert_eq!(buffer.as_slice(), b"ACDE");
/// ```
///
/// # Thread safety
///
/// The buffer is thread-mobile ([`Send`]) when its allocator is, but it is not thread-safe
/// ([`Sync`]).
pub struct GrowableBuffer<'a, A = System>
where
    A: GlobalAlloc,
{
    storage: Storage<'a>,

    /// Logical length. Bounded by the capacity when owned and by the region size when linked.
    len: usize,

    growth_policy: GrowthPolicy,
    allocator: A,
}

impl<'a> GrowableBuffer<'a> {
    /// Creates an empty, unlinked buffer that allocates from the system allocator.
    ///
    /// This does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(System)
    }

    /// Starts building a buffer with custom growth behavior or a custom allocator.
    #[inline]
    pub fn builder() -> GrowableBufferBuilder {
        GrowableBufferBuilder::new()
    }

    /// Creates an owned buffer of `len` bytes with unspecified content.
    ///
    /// Exactly `len` bytes are allocated. A zero length does not allocate.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn with_len(len: usize) -> crate::Result<Self> {
        let mut buffer = Self::new();
        buffer.resize_exact(len)?;
        Ok(buffer)
    }

    /// Creates an owned buffer holding a copy of `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn copy_from_slice(src: &[u8]) -> crate::Result<Self> {
        let mut buffer = Self::new();
        buffer.resize_exact(src.len())?;
        buffer.as_mut_slice().copy_from_slice(src);
        Ok(buffer)
    }

    /// Creates a buffer linked to a writable region owned by the caller.
    ///
    /// The region is never freed by the buffer. In-place operations such as
    /// [`erase()`][Self::erase] or writes via [`DerefMut`] modify the region directly, whereas
    /// growth converts the buffer into an owned copy.
    #[must_use]
    pub fn linked(region: &'a mut [u8]) -> Self {
        let mut buffer = Self::new();
        buffer.manage(region);
        buffer
    }

    /// Creates a buffer linked to a read-only region owned by the caller.
    ///
    /// The buffer rejects (panics on) any attempt to write into the region. Growing the buffer
    /// converts it into an owned copy, which is writable.
    #[must_use]
    pub fn linked_read_only(region: &'a [u8]) -> Self {
        let mut buffer = Self::new();
        buffer.manage_read_only(region);
        buffer
    }
}

impl Default for GrowableBuffer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A> GrowableBuffer<'a, A>
where
    A: GlobalAlloc,
{
    /// Creates an empty, unlinked buffer that allocates from `allocator`.
    #[must_use]
    pub fn new_in(allocator: A) -> Self {
        Self::with_config(GrowthPolicy::default(), allocator)
    }

    pub(crate) fn with_config(growth_policy: GrowthPolicy, allocator: A) -> Self {
        Self {
            storage: Storage::Unlinked,
            len: 0,
            growth_policy,
            allocator,
        }
    }

    /// Creates a buffer that takes ownership of a previously released allocation.
    ///
    /// # Safety
    ///
    /// The same requirements as [`adopt()`][Self::adopt] apply.
    #[must_use]
    pub unsafe fn from_raw_parts_in(parts: RawParts, allocator: A) -> Self {
        let mut buffer = Self::new_in(allocator);

        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            buffer.adopt(parts);
        }

        buffer
    }

    /// Number of bytes of logical content.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has no logical content.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes owned by the buffer. This is zero for unlinked and linked buffers.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The largest length a buffer can ever reach.
    #[must_use]
    #[inline]
    pub fn max_size(&self) -> usize {
        MAX_SIZE
    }

    /// Returns `true` if the buffer references memory owned by someone else.
    #[must_use]
    #[inline]
    pub fn is_linked(&self) -> bool {
        matches!(self.storage, Storage::Linked { .. })
    }

    /// Returns `true` if the buffer references no memory at all.
    #[must_use]
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        matches!(self.storage, Storage::Unlinked)
    }

    /// Returns `true` if the buffer owns its memory.
    #[must_use]
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned { .. })
    }

    /// Returns `true` if the buffer is linked to a region it must not write to.
    #[must_use]
    #[inline]
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.storage,
            Storage::Linked {
                writable: false,
                ..
            }
        )
    }

    /// The policy used by the inexact growth methods.
    #[must_use]
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth_policy
    }

    /// The allocator that owned storage is obtained from.
    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Pointer to the first byte, or null if the buffer is unlinked.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.storage
            .ptr()
            .map_or(ptr::null(), |ptr| ptr.as_ptr().cast_const())
    }

    /// The logical content.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self.storage.ptr() {
            // SAFETY: Owned storage holds at least `len` initialized bytes (every byte of an
            // owned allocation is initialized). Linked storage was created from a slice of at
            // least `len` bytes that stays borrowed for 'a, which outlives &self.
            Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// The logical content, for writing.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is linked to a read-only region.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        assert!(
            !self.is_read_only(),
            "cannot write into a buffer that is linked to read-only memory"
        );

        match self.storage.ptr() {
            // SAFETY: As in as_slice(). The region is writable (checked above) and we hold
            // &mut self, so no other reference into the region can be created through us.
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// The owned bytes between the logical length and the capacity. Their values are
    /// unspecified. Empty unless the buffer is owned.
    ///
    /// Data written here becomes part of the content after a [`resize()`][Self::resize] that
    /// does not exceed the capacity.
    #[must_use]
    pub fn spare_capacity_mut(&mut self) -> &mut [u8] {
        match self.storage {
            Storage::Owned { ptr, capacity } => {
                // Cannot underflow because owned buffers never have len > capacity.
                let spare = capacity.get().wrapping_sub(self.len);

                // SAFETY: The range [len, capacity) lies within the allocation, every byte of
                // which is initialized, and we hold &mut self.
                unsafe { slice::from_raw_parts_mut(ptr.add(self.len).as_ptr(), spare) }
            }
            Storage::Unlinked | Storage::Linked { .. } => &mut [],
        }
    }

    /// Ensures the buffer owns at least `capacity` bytes, rounding the allocation up according
    /// to the [growth policy][GrowthPolicy]. The length is not changed.
    ///
    /// Does nothing if the buffer already owns enough memory. A linked buffer is converted into an
    /// owned copy of its content (unless `capacity` is zero), and the new allocation is large
    /// enough to hold that whole content.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    pub fn reserve(&mut self, capacity: usize) -> crate::Result<()> {
        self.grow(capacity, false)
    }

    /// Ensures the buffer owns at least `capacity` bytes, allocating exactly that much if it
    /// needs to grow. Otherwise identical to [`reserve()`][Self::reserve].
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    pub fn reserve_exact(&mut self, capacity: usize) -> crate::Result<()> {
        self.grow(capacity, true)
    }

    /// Sets the length to `len`, growing the owned capacity according to the
    /// [growth policy][GrowthPolicy] if needed.
    ///
    /// Shrinking never releases memory. Bytes exposed by growing have unspecified values.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    pub fn resize(&mut self, len: usize) -> crate::Result<()> {
        self.grow(len, false)?;
        self.len = len;
        Ok(())
    }

    /// Sets the length to `len`, allocating exactly `len` bytes if the buffer needs to grow.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    pub fn resize_exact(&mut self, len: usize) -> crate::Result<()> {
        self.grow(len, true)?;
        self.len = len;
        Ok(())
    }

    /// Sets the length to zero, keeping any owned memory for reuse.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Releases owned memory beyond the current length. An empty owned buffer frees all its
    /// memory and becomes unlinked. Does nothing for linked and unlinked buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator fails to shrink the allocation. The buffer is left
    /// unchanged in that case.
    pub fn shrink_to_fit(&mut self) -> crate::Result<()> {
        let Storage::Owned { capacity, .. } = self.storage else {
            return Ok(());
        };

        match NonZero::new(self.len) {
            None => {
                self.deallocate();
                Ok(())
            }
            Some(len) if len < capacity => self.reallocate(len),
            Some(_) => Ok(()),
        }
    }

    /// Converts a linked buffer into an owned copy of its content, so it no longer depends on
    /// the linked region. An empty linked buffer becomes unlinked instead.
    ///
    /// Does nothing for owned and unlinked buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer stays linked in that case.
    pub fn copy_link(&mut self) -> crate::Result<()> {
        if !self.is_linked() {
            return Ok(());
        }

        match NonZero::new(self.len) {
            Some(len) => self.reallocate(len),
            None => {
                self.unlink();
                Ok(())
            }
        }
    }

    /// Opens a gap of `count` bytes at `position`, moving the bytes from `position` onward
    /// towards the end. Returns the index of the start of the gap, which is `position`.
    ///
    /// The gap has unspecified content. Capacity grows according to the
    /// [growth policy][GrowthPolicy] if needed. Inserting zero bytes does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics if `position` is greater than the length.
    pub fn insert(&mut self, position: usize, count: usize) -> crate::Result<usize> {
        assert!(
            position <= self.len,
            "insert position {position} is out of bounds in buffer of length {}",
            self.len
        );

        if count == 0 {
            return Ok(position);
        }

        let old_len = self.len;
        let new_len = old_len
            .checked_add(count)
            .ok_or(Error::CapacityOverflow)?;

        self.resize(new_len)?;

        // Cannot overflow because position + count <= old_len + count == new_len.
        let gap_end = position.wrapping_add(count);

        // copy_within() is a memmove, so the overlapping ranges are handled correctly.
        self.as_mut_slice().copy_within(position..old_len, gap_end);

        Ok(position)
    }

    /// Removes `count` bytes starting at `position`, moving the bytes after the removed range
    /// towards the start. Returns `position`, which now indexes the first byte after the
    /// removed range (or equals the length if the range reached the end).
    ///
    /// Owned capacity is not released. A writable linked buffer is modified in place and stays
    /// linked.
    ///
    /// # Panics
    ///
    /// Panics if `position + count` is greater than the length, or if bytes would be removed
    /// from a buffer linked to read-only memory.
    pub fn erase(&mut self, position: usize, count: usize) -> usize {
        let end = position.checked_add(count).filter(|end| *end <= self.len);

        let Some(end) = end else {
            panic!(
                "cannot erase {count} bytes at position {position} in buffer of length {}",
                self.len
            );
        };

        if count == 0 {
            return position;
        }

        let len = self.len;
        self.as_mut_slice().copy_within(end..len, position);

        // Cannot underflow because count <= end <= len.
        self.len = len.wrapping_sub(count);

        position
    }

    /// Appends a copy of `src` to the end of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    pub fn extend_from_slice(&mut self, src: &[u8]) -> crate::Result<()> {
        if src.is_empty() {
            return Ok(());
        }

        let position = self.insert(self.len, src.len())?;

        let (_, gap) = self.as_mut_slice().split_at_mut(position);
        gap.copy_from_slice(src);

        Ok(())
    }

    /// Replaces the content with a copy of `src`, reusing owned memory if there is enough.
    ///
    /// Assigning a buffer's own content to itself does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails. The buffer is left unchanged in that case.
    pub fn assign(&mut self, src: &[u8]) -> crate::Result<()> {
        self.assign_with(src, false)
    }

    fn assign_with(&mut self, src: &[u8], exact: bool) -> crate::Result<()> {
        if ptr::eq(self.as_slice(), src) {
            return Ok(());
        }

        if src.is_empty() {
            self.len = 0;
            return Ok(());
        }

        // A linked buffer always converts into owned storage here, so `src` may even point into
        // the previously linked region without being overwritten.
        self.grow(src.len(), exact)?;
        self.len = src.len();
        self.as_mut_slice().copy_from_slice(src);

        Ok(())
    }

    /// Links the buffer to a writable region owned by the caller, first freeing any memory the
    /// buffer owns.
    ///
    /// To link to the content of another buffer, pass `&mut other` (or
    /// `other.as_mut_slice()`), which keeps the other buffer borrowed while the link exists.
    pub fn manage(&mut self, region: &'a mut [u8]) {
        self.deallocate();

        self.len = region.len();
        self.storage = Storage::linked(NonNull::from(region).cast(), true);
    }

    /// Links the buffer to a read-only region owned by the caller, first freeing any memory the
    /// buffer owns.
    pub fn manage_read_only(&mut self, region: &'a [u8]) {
        self.deallocate();

        self.len = region.len();
        self.storage = Storage::linked(NonNull::from(region).cast(), false);
    }

    /// Links the buffer to `len` writable bytes at `ptr`, first freeing any memory the buffer
    /// owns. A null `ptr` leaves the buffer unlinked.
    ///
    /// # Safety
    ///
    /// If `ptr` is not null, it must be valid for reads and writes of `len` bytes, all of which
    /// must be initialized. The region must remain valid, and must not be accessed other than
    /// through this buffer, for as long as the buffer stays linked to it (at most `'a`).
    ///
    /// # Panics
    ///
    /// Panics if `ptr` is null and `len` is not zero.
    pub unsafe fn manage_raw(&mut self, ptr: *mut u8, len: usize) {
        self.deallocate();

        let Some(ptr) = NonNull::new(ptr) else {
            assert!(len == 0, "a null pointer cannot be linked with length {len}");
            return;
        };

        self.len = len;
        self.storage = Storage::linked(ptr, true);
    }

    /// Frees the memory if the buffer owns it, then unlinks the buffer. Linked memory is never
    /// freed. Calling this on an unlinked buffer does nothing.
    pub fn deallocate(&mut self) {
        if let Storage::Owned { ptr, capacity } = self.storage {
            // SAFETY: The layout was validated when the allocation was made.
            let layout = unsafe { owned_layout(capacity) };

            // SAFETY: Owned storage was allocated by self.allocator with this layout and is
            // still live. We unlink immediately below, so it cannot be freed twice.
            unsafe {
                self.allocator.dealloc(ptr.as_ptr(), layout);
            }

            trace!(capacity = capacity.get(), "freed owned storage");
        }

        self.unlink();
    }

    /// Resets the buffer to the unlinked state without freeing anything.
    ///
    /// This is meant for dropping a link to foreign memory. If the buffer owns memory, that memory
    /// is leaked. Use [`release()`][Self::release] to take ownership of it instead.
    pub fn unlink(&mut self) {
        self.storage = Storage::Unlinked;
        self.len = 0;
    }

    /// Hands the owned allocation over to the caller and unlinks the buffer.
    ///
    /// Returns `None` if the buffer did not own any memory (it is unlinked either way).
    #[must_use]
    pub fn release(&mut self) -> Option<RawParts> {
        let parts = match self.storage {
            Storage::Owned { ptr, capacity } => Some(RawParts::new(ptr, self.len, capacity)),
            Storage::Unlinked | Storage::Linked { .. } => None,
        };

        self.unlink();
        parts
    }

    /// Takes ownership of an allocation, first freeing any memory the buffer owns.
    ///
    /// # Safety
    ///
    /// The allocation must have been made by an allocator equivalent to this buffer's allocator,
    /// with a layout of `parts.capacity()` bytes and an alignment of 1, and every byte of it must
    /// be initialized. Allocations obtained from [`release()`][Self::release] of a buffer using
    /// the same allocator satisfy this. Nothing else may free or access the allocation afterwards.
    pub unsafe fn adopt(&mut self, parts: RawParts) {
        self.deallocate();

        self.len = parts.len();
        self.storage = Storage::Owned {
            ptr: parts.ptr(),
            capacity: parts.capacity(),
        };
    }

    /// Exchanges the entire state of two buffers without allocating or copying any content.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Creates an owned deep copy of the buffer, regardless of whether it is owned or linked.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn try_clone(&self) -> crate::Result<Self>
    where
        A: Clone,
    {
        let mut copy = Self::with_config(self.growth_policy, self.allocator.clone());
        copy.assign_with(self.as_slice(), true)?;
        Ok(copy)
    }

    fn grow(&mut self, requested: usize, exact: bool) -> crate::Result<()> {
        let Some(requested) = NonZero::new(requested).filter(|r| r.get() > self.capacity()) else {
            return Ok(());
        };

        // A linked buffer is converted into an owned copy of its whole content.
        let requested = NonZero::new(self.len).map_or(requested, |len| requested.max(len));

        let target = if exact {
            requested
        } else {
            self.growth_policy
                .target_capacity(self.capacity(), requested)?
        };

        self.reallocate(target)
    }

    /// Moves the content into owned storage of exactly `new_capacity` bytes.
    ///
    /// The caller guarantees that `new_capacity` is at least the length.
    fn reallocate(&mut self, new_capacity: NonZero<usize>) -> crate::Result<()> {
        debug_assert!(new_capacity.get() >= self.len);

        let new_layout = Layout::from_size_align(new_capacity.get(), BYTE_ALIGNMENT)
            .or(Err(Error::CapacityOverflow))?;

        match self.storage {
            Storage::Owned { ptr, capacity } => {
                // SAFETY: The layout was validated when the allocation was made.
                let old_layout = unsafe { owned_layout(capacity) };

                // SAFETY: The allocation was made by self.allocator with old_layout and is live.
                // The new size is non-zero and forms a valid layout with the same alignment, as
                // validated above.
                let new_ptr = unsafe {
                    self.allocator
                        .realloc(ptr.as_ptr(), old_layout, new_capacity.get())
                };

                let new_ptr = NonNull::new(new_ptr).ok_or_else(|| {
                    debug!(
                        capacity = capacity.get(),
                        requested = new_capacity.get(),
                        "reallocation failed"
                    );
                    Error::Allocation {
                        requested: new_capacity.get(),
                    }
                })?;

                // SAFETY: The new allocation spans new_capacity bytes.
                unsafe {
                    zero_fill(new_ptr, capacity.get(), new_capacity.get());
                }

                self.storage = Storage::Owned {
                    ptr: new_ptr,
                    capacity: new_capacity,
                };

                trace!(
                    old_capacity = capacity.get(),
                    new_capacity = new_capacity.get(),
                    "reallocated owned storage"
                );
            }
            Storage::Unlinked | Storage::Linked { .. } => {
                // SAFETY: The layout has a non-zero size.
                let new_ptr = unsafe { self.allocator.alloc_zeroed(new_layout) };

                let new_ptr = NonNull::new(new_ptr).ok_or_else(|| {
                    debug!(requested = new_capacity.get(), "allocation failed");
                    Error::Allocation {
                        requested: new_capacity.get(),
                    }
                })?;

                if let Some(linked_ptr) = self.storage.ptr() {
                    // SAFETY: The linked region is valid for reads of len bytes, the new
                    // allocation has room for at least len bytes and the two cannot overlap
                    // because the allocation was just made.
                    unsafe {
                        ptr::copy_nonoverlapping(linked_ptr.as_ptr(), new_ptr.as_ptr(), self.len);
                    }

                    debug!(
                        len = self.len,
                        capacity = new_capacity.get(),
                        "copied linked memory into owned storage"
                    );
                }

                self.storage = Storage::Owned {
                    ptr: new_ptr,
                    capacity: new_capacity,
                };

                trace!(capacity = new_capacity.get(), "allocated owned storage");
            }
        }

        Ok(())
    }
}

/// Recreates the layout of an owned allocation of `capacity` bytes.
///
/// # Safety
///
/// `capacity` must have formed a valid layout with byte alignment when the allocation was made.
unsafe fn owned_layout(capacity: NonZero<usize>) -> Layout {
    // SAFETY: Forwarding safety requirements to the caller.
    unsafe { Layout::from_size_align_unchecked(capacity.get(), BYTE_ALIGNMENT) }
}

/// Zeroes the bytes in `[from, to)` of the allocation at `ptr`. Does nothing if the range is
/// empty.
///
/// # Safety
///
/// `ptr` must be valid for writes of `to` bytes.
unsafe fn zero_fill(ptr: NonNull<u8>, from: usize, to: usize) {
    let Some(count) = to.checked_sub(from) else {
        return;
    };

    // SAFETY: The range lies within the first `to` bytes, which the caller guarantees are
    // valid for writes.
    unsafe {
        ptr.add(from).write_bytes(0, count);
    }
}

impl<A> Drop for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn drop(&mut self) {
        self.deallocate();
    }
}

// SAFETY: The buffer either exclusively owns its allocation or holds a borrow of a byte region
// (`&mut [u8]` or `&[u8]`), both of which may be moved to another thread. Moving the buffer moves
// that access along with it.
unsafe impl<A> Send for GrowableBuffer<'_, A> where A: GlobalAlloc + Send {}

impl<A> Deref for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// # Panics
///
/// Dereferencing mutably panics if the buffer is linked to read-only memory.
impl<A> DerefMut for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl<A> AsRef<[u8]> for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<A> Clone for GrowableBuffer<'_, A>
where
    A: GlobalAlloc + Clone,
{
    /// # Panics
    ///
    /// Panics if the allocation fails. Use [`try_clone()`][GrowableBuffer::try_clone] to handle
    /// allocation failure.
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|error| panic!("failed to clone buffer of {} bytes: {error}", self.len))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(error) = self.assign(source.as_slice()) {
            panic!("failed to clone buffer of {} bytes: {error}", source.len);
        }
    }
}

impl TryFrom<&[u8]> for GrowableBuffer<'_> {
    type Error = Error;

    fn try_from(value: &[u8]) -> crate::Result<Self> {
        Self::copy_from_slice(value)
    }
}

impl<A> fmt::Debug for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("state", &self.storage.state_name())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("growth_policy", &self.growth_policy)
            .finish_non_exhaustive()
    }
}

impl<A, B> PartialEq<GrowableBuffer<'_, B>> for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
    B: GlobalAlloc,
{
    fn eq(&self, other: &GrowableBuffer<'_, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<A> PartialEq<[u8]> for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl<A> Eq for GrowableBuffer<'_, A> where A: GlobalAlloc {}

impl<A> PartialOrd for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<A> Hash for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}
