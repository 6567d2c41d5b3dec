#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A growable byte buffer that either owns its allocation or links to memory owned by someone
//! else, giving the caller explicit control over every allocation.
//!
//! This crate provides [`GrowableBuffer`], the foundational primitive for building higher-level
//! containers such as vectors and strings on top of raw bytes. Unlike `Vec<u8>`, the buffer can
//! also reference memory it does not own, and it reports allocation failure as an error instead of
//! aborting the process.
//!
//! # Ownership states
//!
//! A buffer is always in exactly one of three states:
//!
//! * **Unlinked** - references no memory. This is the state of a new buffer.
//! * **Linked** - references a region owned by someone else, borrowed for the buffer's lifetime
//!   parameter. The buffer never frees or reallocates a linked region.
//! * **Owned** - references memory allocated through the buffer's allocator. The memory is freed
//!   when the buffer is dropped, deallocated or linked to something else.
//!
//! Growing a linked buffer converts it into an owned copy of the linked bytes.
//!
//! # Key Features
//!
//! - **Separate length and capacity**: shrinking never releases memory, growing reuses it
//! - **Range operations**: [`insert()`][GrowableBuffer::insert] opens a gap and
//!   [`erase()`][GrowableBuffer::erase] closes one, with overlap-safe byte moves
//! - **Ownership transfer**: [`release()`][GrowableBuffer::release] and
//!   [`adopt()`][GrowableBuffer::adopt] move allocations between buffers without copying
//! - **Configurable growth**: inexact growth follows a [`GrowthPolicy`]
//! - **Custom allocators**: any [`GlobalAlloc`][std::alloc::GlobalAlloc] instance can back the
//!   buffer
//! - **Stream I/O**: length-prefixed records via [`read_from()`][GrowableBuffer::read_from] and
//!   [`write_to()`][GrowableBuffer::write_to], whole streams and files via
//!   [`read_to_end_from()`][GrowableBuffer::read_to_end_from] and
//!   [`read_file()`][GrowableBuffer::read_file]
//!
//! # Examples
//!
//! ## Owned buffer
//!
//! ```
//! use growable_buffer::GrowableBuffer;
//!
//! let mut buffer = GrowableBuffer::new();
//! assert!(buffer.is_unlinked());
//!
//! buffer.resize_exact(10).unwrap();
//! assert!(buffer.is_owned());
//! assert_eq!(buffer.len(), 10);
//! assert_eq!(buffer.capacity(), 10);
//!
//! buffer.resize(3).unwrap();
//! assert_eq!(buffer.capacity(), 10);
//! ```
//!
//! ## Linking to foreign memory
//!
//! ```
//! use growable_buffer::GrowableBuffer;
//!
//! let mut array = *b"ABCDE";
//!
//! {
//!     let mut buffer = GrowableBuffer::linked(&mut array);
//!     assert!(buffer.is_linked());
//!     assert_eq!(buffer.capacity(), 0);
//!
//!     // Growing copies the linked bytes into owned storage.
//!     buffer.reserve(20).unwrap();
//!     assert!(buffer.is_owned());
//!     assert!(buffer.capacity() >= 20);
//!     assert_eq!(buffer.as_slice(), b"ABCDE");
//!
//!     buffer[0] = b'Z';
//! }
//!
//! // The linked array was never touched.
//! assert_eq!(&array, b"ABCDE");
//! ```
//!
//! ## Handing an allocation over
//!
//! ```
//! use growable_buffer::GrowableBuffer;
//!
//! let mut source = GrowableBuffer::copy_from_slice(b"payload").unwrap();
//! let parts = source.release().unwrap();
//! assert!(source.is_unlinked());
//!
//! let mut target = GrowableBuffer::new();
//!
//! // SAFETY: The parts were released by a buffer that uses the same allocator.
//! unsafe {
//!     target.adopt(parts);
//! }
//!
//! assert_eq!(target.as_slice(), b"payload");
//! ```

mod buffer;
mod builder;
mod error;
mod growth_policy;
mod io;
mod storage;

pub use buffer::GrowableBuffer;
pub use builder::GrowableBufferBuilder;
pub use error::{Error, Result};
pub use growth_policy::{DEFAULT_PAGE_SIZE, GrowthPolicy};
pub use storage::RawParts;
pub(crate) use storage::Storage;

/// The largest capacity a buffer can allocate. Allocations larger than this cannot be described by
/// a valid memory layout.
pub const MAX_SIZE: usize = isize::MAX.unsigned_abs();
