//! Replayable byte sink backing both captures.

use bytes::{Bytes, BytesMut};
use std::io;

use crate::charset;

/// Append-only buffer that can be re-read any number of times.
#[derive(Debug, Default)]
pub struct BodyBuffer {
    bytes: BytesMut,
}

impl BodyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Everything written so far. Does not consume the buffer.
    pub fn snapshot(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the contents with `encoding`, UTF-8 when `None`.
    ///
    /// An encoding label we do not know yields
    /// [`UNSUPPORTED_ENCODING`](crate::charset::UNSUPPORTED_ENCODING) instead of an error.
    pub fn as_text(&self, encoding: Option<&str>) -> String {
        charset::decode(&self.bytes, encoding)
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes.freeze()
    }
}

impl io::Write for BodyBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BodyBuffer::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_snapshot_is_repeatable() {
        let mut buffer = BodyBuffer::new();
        buffer.write(b"Hello, ");
        buffer.write(b"World!");

        assert_eq!(buffer.snapshot(), b"Hello, World!");
        assert_eq!(buffer.snapshot(), b"Hello, World!");
        assert_eq!(buffer.as_text(None), "Hello, World!");
        assert_eq!(buffer.len(), 13);
    }

    #[test]
    fn test_io_write_variants_all_land_in_buffer() {
        let mut buffer = BodyBuffer::new();
        let payload = b"xxabcxx";

        Write::write_all(&mut buffer, &[b'>']).unwrap();
        Write::write_all(&mut buffer, b"whole").unwrap();
        Write::write_all(&mut buffer, &payload[2..5]).unwrap();
        write!(buffer, "{}", 42).unwrap();

        assert_eq!(buffer.snapshot(), b">wholeabc42");
    }

    #[test]
    fn test_unsupported_encoding() {
        let mut buffer = BodyBuffer::new();
        buffer.write(b"data");
        assert_eq!(buffer.as_text(Some("EBCDIC-FR")), "[UNSUPPORTED ENCODING]");
    }

    #[test]
    fn test_into_bytes() {
        let mut buffer = BodyBuffer::new();
        assert!(buffer.is_empty());
        buffer.write(&[0, 159, 146, 150]);
        assert_eq!(buffer.into_bytes(), Bytes::from_static(&[0, 159, 146, 150]));
    }
}
