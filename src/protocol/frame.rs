//! Length-prefixed JSON frames over a byte stream.
//!
//! Wire format: 4-byte little-endian unsigned length, then exactly that many
//! bytes of UTF-8 JSON. No delimiter, no padding. Both directions use the same
//! framing.

use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::FrameError;

/// Upper bound for inbound frames; browsers cap caller→host messages at 64 MiB.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Fill `buf` from `r`, stopping early only at end of stream. Returns bytes read.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read one frame. `Ok(None)` means the peer closed cleanly between frames.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<Value>, FrameError> {
    let mut header = [0u8; 4];
    let got = read_full(r, &mut header)?;
    if got == 0 {
        return Ok(None);
    }
    if got < header.len() {
        return Err(FrameError::ShortRead {
            expected: header.len(),
            got,
        });
    }
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }
    let mut body = vec![0u8; len];
    let got = read_full(r, &mut body)?;
    if got < len {
        return Err(FrameError::ShortRead { expected: len, got });
    }
    Ok(Some(serde_json::from_slice(&body)?))
}

/// Encode `msg` as one frame and flush.
pub fn write_frame<W: Write, T: Serialize + ?Sized>(w: &mut W, msg: &T) -> Result<(), FrameError> {
    let body = serde_json::to_vec(msg)?;
    let len = u32::try_from(body.len()).map_err(|_| FrameError::TooLarge(body.len()))?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(&body)?;
    w.flush()?;
    Ok(())
}

/// A bidirectional framed channel over a reader/writer pair (stdio for the host,
/// child pipes for the caller).
pub struct FramedStream<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> FramedStream<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn send<T: Serialize + ?Sized>(&mut self, msg: &T) -> Result<(), FrameError> {
        write_frame(&mut self.writer, msg)
    }

    pub fn receive(&mut self) -> Result<Option<Value>, FrameError> {
        read_frame(&mut self.reader)
    }

    /// Receive and decode into `T`. Decode failures are JSON frame errors.
    pub fn receive_as<T: DeserializeOwned>(&mut self) -> Result<Option<T>, FrameError> {
        match self.receive()? {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    /// Reader that hands out at most one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn header_is_little_endian_length() {
        let mut out = Vec::new();
        write_frame(&mut out, &json!({"a": 1})).unwrap();
        assert_eq!(&out[..4], &[7, 0, 0, 0]);
        assert_eq!(&out[4..], br#"{"a":1}"#);
    }

    #[test]
    fn partial_reads_are_reassembled() {
        let mut out = Vec::new();
        write_frame(&mut out, &json!({"action": "ping"})).unwrap();
        let mut r = Trickle(&out);
        let v = read_frame(&mut r).unwrap().unwrap();
        assert_eq!(v, json!({"action": "ping"}));
        assert!(read_frame(&mut r).unwrap().is_none());
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut bytes = ((MAX_FRAME_LEN + 1) as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let err = read_frame(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FrameError::TooLarge(_)), "{err}");
    }
}
