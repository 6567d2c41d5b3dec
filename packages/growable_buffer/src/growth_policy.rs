use std::num::NonZero;

use crate::MAX_SIZE;

/// The default allocation unit used when a buffer grows without an exact size request.
pub const DEFAULT_PAGE_SIZE: NonZero<usize> = NonZero::new(64).expect("64 is not zero");

/// Determines how much memory a buffer allocates when it grows through one of the inexact
/// methods ([`reserve()`][1], [`resize()`][2], [`insert()`][3] and friends).
///
/// Exact methods ([`reserve_exact()`][4], [`resize_exact()`][5]) always allocate exactly what was
/// asked for and ignore the policy.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use growable_buffer::{GrowableBuffer, GrowthPolicy};
///
/// let mut buffer = GrowableBuffer::builder()
///     .growth_policy(GrowthPolicy::Paged {
///         page_size: NonZero::new(256).unwrap(),
///     })
///     .build();
///
/// buffer.resize(10).unwrap();
/// assert_eq!(buffer.capacity(), 256);
/// ```
///
/// [1]: crate::GrowableBuffer::reserve
/// [2]: crate::GrowableBuffer::resize
/// [3]: crate::GrowableBuffer::insert
/// [4]: crate::GrowableBuffer::reserve_exact
/// [5]: crate::GrowableBuffer::resize_exact
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GrowthPolicy {
    /// Rounds the requested capacity up to the next multiple of `page_size`. This is the default,
    /// with a page size of [`DEFAULT_PAGE_SIZE`].
    ///
    /// Growth is linear, so a long series of small appends to a large buffer reallocates often.
    /// Prefer [`Geometric`][Self::Geometric] for that usage pattern.
    Paged {
        /// The allocation unit.
        page_size: NonZero<usize>,
    },

    /// Grows to at least double the current capacity, rounded up to a multiple of
    /// [`DEFAULT_PAGE_SIZE`]. Gives amortized constant time appends.
    Geometric,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::Paged {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GrowthPolicy {
    /// Calculates the capacity to allocate when a buffer with `current` capacity needs to hold
    /// at least `requested` bytes.
    ///
    /// The result is always at least `requested`.
    pub(crate) fn target_capacity(
        self,
        current: usize,
        requested: NonZero<usize>,
    ) -> crate::Result<NonZero<usize>> {
        match self {
            Self::Paged { page_size } => requested
                .get()
                .checked_next_multiple_of(page_size.get())
                .and_then(NonZero::new)
                .ok_or(crate::Error::CapacityOverflow),
            Self::Geometric => {
                let doubled = current.saturating_mul(2).min(MAX_SIZE);
                let target = requested.max(NonZero::new(doubled).unwrap_or(requested));

                // Rounding is only an optimization, so we fall back to the raw target if the
                // rounded value would no longer be a valid allocation size.
                Ok(target
                    .get()
                    .checked_next_multiple_of(DEFAULT_PAGE_SIZE.get())
                    .filter(|rounded| *rounded <= MAX_SIZE)
                    .and_then(NonZero::new)
                    .unwrap_or(target))
            }
        }
    }
}
