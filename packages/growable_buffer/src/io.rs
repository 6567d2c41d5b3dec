//! Moving buffer contents through byte streams.
//!
//! A single buffer is stored in a stream as a record: a little-endian `u32` length prefix, the
//! content bytes and zero padding that aligns the end of the record to the size of the prefix.

use std::alloc::GlobalAlloc;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::{Error, GrowableBuffer};

const LENGTH_PREFIX_SIZE: usize = size_of::<u32>();

/// Records are padded to a multiple of this many bytes.
const RECORD_ALIGNMENT: usize = LENGTH_PREFIX_SIZE;

/// How much spare capacity to ensure before each read when consuming a whole stream.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Number of padding bytes that follow a record with `len` content bytes.
fn padding_for(len: usize) -> usize {
    // The prefix is itself aligned, so only the content length matters.
    len.wrapping_neg() % RECORD_ALIGNMENT
}

impl<A> GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    /// Replaces the content with one record read from `reader`.
    ///
    /// A linked buffer is unlinked first, so the linked region is never written to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if the reader fails or ends before the whole record (including
    /// padding) has been read, or an allocation error if the buffer cannot grow to the record
    /// length. On error the buffer is left empty, keeping any owned capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use growable_buffer::GrowableBuffer;
    ///
    /// let mut stream = Vec::new();
    /// GrowableBuffer::copy_from_slice(b"record")
    ///     .unwrap()
    ///     .write_to(&mut stream)
    ///     .unwrap();
    ///
    /// let mut buffer = GrowableBuffer::new();
    /// buffer.read_from(stream.as_slice()).unwrap();
    /// assert_eq!(buffer.as_slice(), b"record");
    /// ```
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> crate::Result<()> {
        if self.is_linked() {
            self.unlink();
        }

        let result = self.read_record(&mut reader);

        if let Err(error) = &result {
            debug!(%error, "failed to read buffer record");
            self.clear();
        }

        result
    }

    fn read_record(&mut self, reader: &mut impl Read) -> crate::Result<()> {
        let mut prefix = [0_u8; LENGTH_PREFIX_SIZE];
        reader
            .read_exact(&mut prefix)
            .map_err(|source| Error::stream("read record length", source))?;

        let prefix = u32::from_le_bytes(prefix);
        let len = usize::try_from(prefix).or(Err(Error::CapacityOverflow))?;

        self.read_record_content(reader.by_ref().take(u64::from(prefix)), len)?;

        let mut padding = [0_u8; RECORD_ALIGNMENT];
        let (padding, _) = padding.split_at_mut(padding_for(len));
        reader
            .read_exact(padding)
            .map_err(|source| Error::stream("read record padding", source))?;

        Ok(())
    }

    /// Reads exactly `len` content bytes, growing only as the bytes arrive so that a corrupt length
    /// prefix cannot trigger an allocation larger than the stream itself.
    fn read_record_content(&mut self, mut content: impl Read, len: usize) -> crate::Result<()> {
        self.clear();

        while self.len() < len {
            if self.spare_capacity_mut().is_empty() {
                let wanted = self
                    .len()
                    .saturating_mul(2)
                    .max(self.len().saturating_add(READ_CHUNK_SIZE))
                    .min(len);

                self.reserve_exact(wanted)?;
            }

            match content.read(self.spare_capacity_mut()) {
                Ok(0) => {
                    return Err(Error::stream(
                        format!("read {len} bytes of record content"),
                        io::ErrorKind::UnexpectedEof.into(),
                    ));
                }
                Ok(count) => {
                    // Cannot overflow because the reader filled at most the spare capacity.
                    let new_len = self.len().wrapping_add(count);

                    self.resize(new_len)?;
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(Error::stream(
                        format!("read {len} bytes of record content"),
                        source,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Replaces the content with everything `reader` produces until it reports the end of the
    /// stream. Returns the number of bytes read.
    ///
    /// A linked buffer is unlinked first, so the linked region is never written to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if the reader fails, or an allocation error if the buffer cannot
    /// grow. On error the buffer is left empty, keeping any owned capacity.
    pub fn read_to_end_from<R: Read>(&mut self, mut reader: R) -> crate::Result<usize> {
        if self.is_linked() {
            self.unlink();
        }

        self.clear();

        loop {
            if self.spare_capacity_mut().is_empty() {
                let wanted = self
                    .len()
                    .checked_add(READ_CHUNK_SIZE)
                    .ok_or(Error::CapacityOverflow);

                if let Err(error) = wanted.and_then(|wanted| self.reserve(wanted)) {
                    self.clear();
                    return Err(error);
                }
            }

            match reader.read(self.spare_capacity_mut()) {
                Ok(0) => return Ok(self.len()),
                Ok(count) => {
                    // Cannot overflow because the reader filled at most the spare capacity.
                    let len = self.len().wrapping_add(count);

                    self.resize(len)?;
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    debug!(error = %source, "failed to read stream into buffer");
                    self.clear();
                    return Err(Error::stream("read to end of stream", source));
                }
            }
        }
    }

    /// Replaces the content with the entire content of the file at `path`. Returns the number of
    /// bytes read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if the file cannot be opened or read, or an allocation error if
    /// the buffer cannot grow. If the file cannot be opened, the buffer is not modified. On any
    /// other error the buffer is left empty, keeping any owned capacity.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> crate::Result<usize> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| {
            debug!(path = %path.display(), error = %source, "failed to open file");
            Error::stream(format!("open file '{}'", path.display()), source)
        })?;

        if self.is_linked() {
            self.unlink();
        }

        self.clear();

        // The size is only a hint, the file may change while we read it.
        let size_hint = file
            .metadata()
            .ok()
            .and_then(|metadata| usize::try_from(metadata.len()).ok());

        if let Some(size_hint) = size_hint {
            // One more byte lets the final read observe the end of the file without growing.
            self.reserve_exact(size_hint.saturating_add(1))?;
        }

        self.read_to_end_from(file)
    }

    /// Writes the content to `writer` as one record that [`read_from()`][Self::read_from] can
    /// read back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordTooLarge`] if the length does not fit the 32-bit length prefix, or
    /// [`Error::Stream`] if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> crate::Result<()> {
        let len = self.len();
        let prefix = u32::try_from(len).or(Err(Error::RecordTooLarge { len }))?;

        writer
            .write_all(&prefix.to_le_bytes())
            .map_err(|source| Error::stream("write record length", source))?;

        writer
            .write_all(self.as_slice())
            .map_err(|source| Error::stream(format!("write {len} bytes of record content"), source))?;

        let padding = [0_u8; RECORD_ALIGNMENT];
        let (padding, _) = padding.split_at(padding_for(len));
        writer
            .write_all(padding)
            .map_err(|source| Error::stream("write record padding", source))?;

        Ok(())
    }
}

/// Appends written bytes to the end of the buffer.
impl<A> Write for GrowableBuffer<'_, A>
where
    A: GlobalAlloc,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::alloc::{Layout, System};
    use std::cell::Cell;
    use std::io::Cursor;
    use std::ptr;
    use std::rc::Rc;

    use super::*;

    /// Returns a fixed number of bytes and then fails every read.
    struct FailingReader {
        remaining: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.remaining.read(buf)? {
                0 => Err(io::Error::other("source failed")),
                count => Ok(count),
            }
        }
    }

    #[test]
    fn padding_aligns_to_prefix_size() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 3);
        assert_eq!(padding_for(2), 2);
        assert_eq!(padding_for(3), 1);
        assert_eq!(padding_for(4), 0);
        assert_eq!(padding_for(5), 3);
    }

    #[test]
    fn write_to_emits_prefix_content_and_padding() {
        let buffer = GrowableBuffer::copy_from_slice(b"ABCDE").unwrap();
        let mut stream = Vec::new();

        buffer.write_to(&mut stream).unwrap();

        assert_eq!(stream, b"\x05\x00\x00\x00ABCDE\x00\x00\x00");
    }

    #[test]
    fn read_from_consumes_exactly_one_record() {
        let mut stream = Vec::new();
        GrowableBuffer::copy_from_slice(b"first")
            .unwrap()
            .write_to(&mut stream)
            .unwrap();
        GrowableBuffer::copy_from_slice(b"second!!")
            .unwrap()
            .write_to(&mut stream)
            .unwrap();

        let mut reader = stream.as_slice();
        let mut buffer = GrowableBuffer::new();

        buffer.read_from(&mut reader).unwrap();
        assert_eq!(buffer.as_slice(), b"first");

        buffer.read_from(&mut reader).unwrap();
        assert_eq!(buffer.as_slice(), b"second!!");

        assert!(reader.is_empty());
    }

    #[test]
    fn read_from_empty_record() {
        let mut buffer = GrowableBuffer::copy_from_slice(b"old").unwrap();

        buffer.read_from(&[0_u8, 0, 0, 0][..]).unwrap();

        assert!(buffer.is_empty());
    }

    #[test]
    fn read_from_truncated_content_is_error() {
        let mut buffer = GrowableBuffer::copy_from_slice(b"old content").unwrap();
        let capacity = buffer.capacity();

        let result = buffer.read_from(&b"\x0A\x00\x00\x00short"[..]);

        match result {
            Err(Error::Stream { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("expected stream error, got {other:?}"),
        }

        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    /// Forwards to the system allocator, remembering the largest request and refusing any
    /// request above a fixed limit.
    #[derive(Clone, Debug, Default)]
    struct CappedAllocator {
        largest_request: Rc<Cell<usize>>,
    }

    impl CappedAllocator {
        const LIMIT: usize = 1024 * 1024;
    }

    // SAFETY: All calls are forwarded to the system allocator unchanged, or fail by returning null.
    unsafe impl GlobalAlloc for CappedAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            self.largest_request
                .set(self.largest_request.get().max(layout.size()));

            if layout.size() > Self::LIMIT {
                return ptr::null_mut();
            }

            // SAFETY: Forwarding safety requirements from the caller.
            unsafe { System.alloc(layout) }
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            // SAFETY: Forwarding safety requirements from the caller.
            unsafe { System.dealloc(ptr, layout) }
        }

        unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
            self.largest_request
                .set(self.largest_request.get().max(new_size));

            if new_size > Self::LIMIT {
                return ptr::null_mut();
            }

            // SAFETY: Forwarding safety requirements from the caller.
            unsafe { System.realloc(ptr, layout, new_size) }
        }
    }

    #[test]
    fn read_from_huge_prefix_with_short_body_is_eof() {
        let allocator = CappedAllocator::default();
        let largest_request = Rc::clone(&allocator.largest_request);
        let mut buffer = GrowableBuffer::new_in(allocator);

        let result = buffer.read_from(&[0xFF_u8, 0xFF, 0xFF, 0xFF, b'x'][..]);

        match result {
            Err(Error::Stream { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("expected stream error, got {other:?}"),
        }

        assert!(buffer.is_empty());
        assert!(largest_request.get() <= READ_CHUNK_SIZE);
    }

    #[test]
    fn read_from_record_larger_than_one_chunk() {
        let content: Vec<u8> = (0..3 * READ_CHUNK_SIZE + 5)
            .map(|i| u8::try_from(i % 253).unwrap())
            .collect();
        let mut stream = Vec::new();
        GrowableBuffer::linked_read_only(&content)
            .write_to(&mut stream)
            .unwrap();

        let mut buffer = GrowableBuffer::new();
        buffer.read_from(stream.as_slice()).unwrap();

        assert_eq!(buffer.as_slice(), content.as_slice());
        assert!(buffer.capacity() <= content.len());
    }

    #[test]
    fn read_from_missing_padding_is_error() {
        let mut buffer = GrowableBuffer::new();

        let result = buffer.read_from(&b"\x01\x00\x00\x00A"[..]);

        assert!(matches!(result, Err(Error::Stream { .. })));
        assert!(buffer.is_empty());
    }

    #[test]
    fn read_from_empty_stream_is_error() {
        let mut buffer = GrowableBuffer::new();

        let result = buffer.read_from(io::empty());

        assert!(matches!(result, Err(Error::Stream { .. })));
    }

    #[test]
    fn read_from_never_writes_into_linked_memory() {
        let mut array = *b"linked";

        {
            let mut buffer = GrowableBuffer::linked(&mut array);

            buffer.read_from(&b"\x02\x00\x00\x00XY\x00\x00"[..]).unwrap();

            assert!(buffer.is_owned());
            assert_eq!(buffer.as_slice(), b"XY");
        }

        assert_eq!(&array, b"linked");
    }

    #[test]
    fn read_from_into_read_only_link_with_empty_record() {
        let data = *b"linked";
        let mut buffer = GrowableBuffer::linked_read_only(&data);

        buffer.read_from(&[0_u8; 4][..]).unwrap();

        assert!(buffer.is_unlinked());
    }

    #[test]
    fn read_to_end_from_consumes_everything() {
        let data: Vec<u8> = (0..50_000_u32)
            .map(|i| u8::try_from(i % 251).unwrap())
            .collect();
        let mut buffer = GrowableBuffer::copy_from_slice(b"old").unwrap();

        let count = buffer.read_to_end_from(data.as_slice()).unwrap();

        assert_eq!(count, data.len());
        assert_eq!(buffer.as_slice(), data.as_slice());
    }

    #[test]
    fn read_to_end_from_empty_source() {
        let mut buffer = GrowableBuffer::new();

        let count = buffer.read_to_end_from(io::empty()).unwrap();

        assert_eq!(count, 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn read_to_end_from_failing_source_is_error() {
        let mut buffer = GrowableBuffer::new();
        let reader = FailingReader {
            remaining: Cursor::new(b"partial".to_vec()),
        };

        let result = buffer.read_to_end_from(reader);

        assert!(matches!(result, Err(Error::Stream { .. })));
        assert!(buffer.is_empty());
    }

    #[test]
    fn write_trait_appends() {
        let mut buffer = GrowableBuffer::new();

        write!(buffer, "{}-{}", 12, "ab").unwrap();
        buffer.write_all(b"!").unwrap();
        buffer.flush().unwrap();

        assert_eq!(buffer.as_slice(), b"12-ab!");
    }
}
