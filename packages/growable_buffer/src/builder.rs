use std::alloc::{GlobalAlloc, System};
use std::cell::Cell;
use std::marker::PhantomData;
use std::num::NonZero;

use crate::{GrowableBuffer, GrowthPolicy};

/// Builder for creating an instance of [`GrowableBuffer`] with custom settings.
///
/// All settings are optional. By default, the buffer allocates from the system allocator and
/// grows in pages of [`DEFAULT_PAGE_SIZE`][crate::DEFAULT_PAGE_SIZE] bytes.
///
/// # Examples
///
/// ```
/// use growable_buffer::{GrowableBuffer, GrowthPolicy};
///
/// let mut buffer = GrowableBuffer::builder()
///     .growth_policy(GrowthPolicy::Geometric)
///     .build();
///
/// buffer.extend_from_slice(b"Hello").unwrap();
/// assert_eq!(buffer.as_slice(), b"Hello");
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) when the allocator is, but it is not
/// thread-safe ([`Sync`]).
#[derive(Debug)]
#[must_use]
pub struct GrowableBufferBuilder<A = System> {
    growth_policy: GrowthPolicy,
    allocator: A,

    _not_sync: PhantomData<Cell<()>>,
}

impl GrowableBufferBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            growth_policy: GrowthPolicy::default(),
            allocator: System,
            _not_sync: PhantomData,
        }
    }
}

impl<A> GrowableBufferBuilder<A>
where
    A: GlobalAlloc,
{
    /// Sets the [growth policy][GrowthPolicy] used when the buffer grows without an exact
    /// size request.
    #[inline]
    pub fn growth_policy(mut self, policy: GrowthPolicy) -> Self {
        self.growth_policy = policy;
        self
    }

    /// Shorthand for a [paged growth policy][GrowthPolicy::Paged] with the given page size.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZero;
    ///
    /// use growable_buffer::GrowableBuffer;
    ///
    /// let mut buffer = GrowableBuffer::builder()
    ///     .page_size(NonZero::new(16).unwrap())
    ///     .build();
    ///
    /// buffer.resize(17).unwrap();
    /// assert_eq!(buffer.capacity(), 32);
    /// ```
    #[inline]
    pub fn page_size(self, page_size: NonZero<usize>) -> Self {
        self.growth_policy(GrowthPolicy::Paged { page_size })
    }

    /// Sets the allocator that owned storage is obtained from.
    ///
    /// Any [`GlobalAlloc`] implementation can be used, not only the global allocator. The buffer
    /// owns the allocator instance and uses it for every allocation, reallocation and
    /// deallocation of its storage.
    #[inline]
    pub fn allocator<B>(self, allocator: B) -> GrowableBufferBuilder<B>
    where
        B: GlobalAlloc,
    {
        GrowableBufferBuilder {
            growth_policy: self.growth_policy,
            allocator,
            _not_sync: PhantomData,
        }
    }

    /// Builds an empty, unlinked buffer with the specified configuration. This does not
    /// allocate.
    #[must_use]
    #[inline]
    pub fn build<'a>(self) -> GrowableBuffer<'a, A> {
        GrowableBuffer::with_config(self.growth_policy, self.allocator)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::DEFAULT_PAGE_SIZE;

    assert_impl_all!(GrowableBufferBuilder: Send);
    assert_not_impl_any!(GrowableBufferBuilder: Sync);

    #[test]
    fn default_configuration() {
        let buffer = GrowableBuffer::builder().build();

        assert!(buffer.is_unlinked());
        assert_eq!(
            buffer.growth_policy(),
            GrowthPolicy::Paged {
                page_size: DEFAULT_PAGE_SIZE
            }
        );
    }

    #[test]
    fn page_size_sets_paged_policy() {
        let mut buffer = GrowableBuffer::builder()
            .page_size(NonZero::new(100).unwrap())
            .build();

        buffer.reserve(1).unwrap();

        assert_eq!(buffer.capacity(), 100);
    }

    #[test]
    fn geometric_policy_doubles() {
        let mut buffer = GrowableBuffer::builder()
            .growth_policy(GrowthPolicy::Geometric)
            .build();

        buffer.resize(64).unwrap();
        assert_eq!(buffer.capacity(), 64);

        buffer.resize(65).unwrap();
        assert_eq!(buffer.capacity(), 128);

        buffer.resize(129).unwrap();
        assert_eq!(buffer.capacity(), 256);
    }

    #[test]
    fn custom_allocator_is_used() {
        let buffer = GrowableBuffer::builder()
            .growth_policy(GrowthPolicy::Geometric)
            .allocator(System)
            .build();

        // The growth policy survives switching the allocator.
        assert_eq!(buffer.growth_policy(), GrowthPolicy::Geometric);
    }
}
