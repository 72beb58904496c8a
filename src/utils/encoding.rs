use std::io::{self, Read, Write};

/// Encode a u32 as a variable-length integer
pub fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        if value < 0x80 {
            buf.push(value as u8);
            break;
        }
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
}

/// Decode a variable-length integer from a slice
/// Returns (value, bytes_consumed)
pub fn decode_varint(buf: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        // Fifth byte may only carry the top 4 bits
        if shift == 28 && byte > 0x0F {
            return None;
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    None // Incomplete
}

/// Encode a length-prefixed, delta-encoded list of non-decreasing u32s
pub fn encode_delta_list(values: &[u32], buf: &mut Vec<u8>) {
    encode_varint(values.len() as u32, buf);
    let mut prev = 0u32;
    for &value in values {
        encode_varint(value - prev, buf);
        prev = value;
    }
}

/// Encode a length-prefixed UTF-8 string
pub fn encode_str(value: &str, buf: &mut Vec<u8>) {
    encode_varint(value.len() as u32, buf);
    buf.extend_from_slice(value.as_bytes());
}

/// Cursor over an in-memory buffer. Every read fails with `None` on truncation.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    pub fn read_varint(&mut self) -> Option<u32> {
        let (value, consumed) = decode_varint(&self.buf[self.pos..])?;
        self.pos += consumed;
        Some(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    pub fn read_str(&mut self) -> Option<&'a str> {
        let len = self.read_varint()? as usize;
        std::str::from_utf8(self.read_bytes(len)?).ok()
    }

    /// Inverse of [`encode_delta_list`]. Fails on overflow.
    pub fn read_delta_list(&mut self) -> Option<Vec<u32>> {
        let len = self.read_varint()? as usize;
        // Every entry takes at least one byte
        if len > self.remaining() {
            return None;
        }
        let mut values = Vec::with_capacity(len);
        let mut prev = 0u32;
        for _ in 0..len {
            prev = prev.checked_add(self.read_varint()?)?;
            values.push(prev);
        }
        Some(values)
    }
}

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u32 in little-endian format
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        let values = [0, 1, 127, 128, 16383, 16384, u32::MAX];
        for value in values {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let (decoded, _) = decode_varint(&buf).unwrap();
            assert_eq!(value, decoded);
        }
    }

    #[test]
    fn test_varint_rejects_overflow_and_truncation() {
        assert_eq!(decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]), None);
        assert_eq!(decode_varint(&[0x80, 0x80]), None);
        assert_eq!(decode_varint(&[]), None);
    }

    #[test]
    fn test_delta_list_with_repeats() {
        let values = vec![1, 5, 5, 10, 1000];
        let mut buf = Vec::new();
        encode_delta_list(&values, &mut buf);
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_delta_list(), Some(values));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_truncation() {
        let mut buf = Vec::new();
        encode_str("hello", &mut buf);
        buf.truncate(3);
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_str(), None);

        let mut reader = ByteReader::new(&[1, 2, 3]);
        assert_eq!(reader.read_bytes(4), None);
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_delta_list_length_bounded_by_input() {
        let mut buf = Vec::new();
        encode_varint(1_000_000, &mut buf);
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_delta_list(), None);
    }

    #[test]
    fn test_u32_le_stream() {
        let mut out = Vec::new();
        write_u32_le(&mut out, 0xDEADBEEF).unwrap();
        assert_eq!(read_u32_le(&mut out.as_slice()).unwrap(), 0xDEADBEEF);
    }
}
