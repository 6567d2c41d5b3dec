use std::io;

use thiserror::Error;

/// Errors that can occur when growing a buffer or moving its contents through a stream.
///
/// Out-of-range positions passed to [`insert()`][crate::GrowableBuffer::insert] or
/// [`erase()`][crate::GrowableBuffer::erase] are programming errors and panic instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The allocator could not provide the requested amount of memory. The buffer is left in
    /// the state it was in before the operation.
    #[error("allocator failed to provide {requested} bytes")]
    Allocation {
        /// The number of bytes the buffer asked the allocator for.
        requested: usize,
    },

    /// The requested capacity cannot be described as a valid memory layout on this platform.
    #[error("requested capacity exceeds the maximum buffer size of {} bytes", crate::MAX_SIZE)]
    CapacityOverflow,

    /// The byte source or sink failed, or the source ended before a complete record was read.
    #[error("stream operation failed: {operation}")]
    Stream {
        /// A human-readable description of what the buffer was doing with the stream.
        operation: String,

        /// The I/O error reported by the stream.
        #[source]
        source: io::Error,
    },

    /// The buffer is too large to be written as a record with a 32-bit length prefix.
    #[error("buffer of {len} bytes does not fit in a record with a 32-bit length prefix")]
    RecordTooLarge {
        /// Length of the buffer that was being written.
        len: usize,
    },
}

impl Error {
    pub(crate) fn stream(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Stream {
            operation: operation.into(),
            source,
        }
    }
}

/// A specialized `Result` type for buffer operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
