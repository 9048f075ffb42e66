//! Utility functions for binary marshaling and string conversion.
//!
//! Stored text is kept as UTF-16LE code units, matching the native registry
//! layout. Fixed-width numerics are read back at native width from the raw
//! byte image.

use byteorder::{NativeEndian, ReadBytesExt};
use std::io::Cursor;

/// Decodes the UTF-16LE code units of a byte buffer.
///
/// A trailing odd byte is dropped. Decoding is lossy: unpaired surrogates
/// become replacement characters.
pub fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Decodes a NUL-terminated UTF-16LE string, stopping at the first NUL unit.
///
/// Data without a terminator decodes in full.
pub fn decode_utf16z(data: &[u8]) -> String {
    let units = utf16_units(data);
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

/// Decodes a list of NUL-terminated UTF-16LE strings.
///
/// Segments are sliced off the front until a zero-length segment (the
/// double-NUL terminator) or the end of the buffer terminates the list.
pub fn decode_multi_utf16z(data: &[u8]) -> Vec<String> {
    let units = utf16_units(data);
    let mut items = Vec::new();
    let mut rest = &units[..];

    loop {
        let end = rest.iter().position(|&u| u == 0).unwrap_or(rest.len());
        if end == 0 {
            break;
        }
        items.push(String::from_utf16_lossy(&rest[..end]));
        if end >= rest.len() {
            break;
        }
        rest = &rest[end + 1..];
    }

    items
}

/// Encodes a string as NUL-terminated UTF-16LE bytes.
pub fn encode_utf16z(value: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity((value.len() + 1) * 2);
    for unit in value.encode_utf16() {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf
}

/// Encodes a string list as a sequence of NUL-terminated UTF-16LE entries
/// with a trailing empty entry.
pub fn encode_multi_utf16z<S: AsRef<str>>(values: &[S]) -> Vec<u8> {
    let mut buf = Vec::new();
    for value in values {
        buf.extend_from_slice(&encode_utf16z(value.as_ref()));
    }
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf
}

/// Reads an i32 from the front of a byte slice at native width.
pub fn read_i32_ne(data: &[u8]) -> Option<i32> {
    Cursor::new(data).read_i32::<NativeEndian>().ok()
}

/// Reads a u32 from the front of a byte slice at native width.
pub fn read_u32_ne(data: &[u8]) -> Option<u32> {
    Cursor::new(data).read_u32::<NativeEndian>().ok()
}

/// Reads an i64 from the front of a byte slice at native width.
pub fn read_i64_ne(data: &[u8]) -> Option<i64> {
    Cursor::new(data).read_i64::<NativeEndian>().ok()
}

/// Reads a u64 from the front of a byte slice at native width.
pub fn read_u64_ne(data: &[u8]) -> Option<u64> {
    Cursor::new(data).read_u64::<NativeEndian>().ok()
}

/// Reads an f64 from the front of a byte slice as a raw in-memory image.
pub fn read_f64_ne(data: &[u8]) -> Option<f64> {
    Cursor::new(data).read_f64::<NativeEndian>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_utf16z() {
        let bytes = encode_utf16z("Software");
        assert_eq!(bytes.len(), ("Software".len() + 1) * 2);
        assert_eq!(&bytes[bytes.len() - 2..], &[0, 0]);
        assert_eq!(decode_utf16z(&bytes), "Software");
    }

    #[test]
    fn test_decode_stops_at_first_nul() {
        let mut bytes = encode_utf16z("abc");
        bytes.extend_from_slice(&encode_utf16z("hidden"));
        assert_eq!(decode_utf16z(&bytes), "abc");
    }

    #[test]
    fn test_decode_without_terminator() {
        let bytes: Vec<u8> = "ab".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        assert_eq!(decode_utf16z(&bytes), "ab");
    }

    #[test]
    fn test_multi_round_trip() {
        let items = ["one", "two", "three"];
        let bytes = encode_multi_utf16z(&items);
        assert_eq!(decode_multi_utf16z(&bytes), items);
    }

    #[test]
    fn test_multi_empty_list() {
        let bytes = encode_multi_utf16z::<&str>(&[]);
        assert_eq!(bytes, vec![0, 0]);
        assert!(decode_multi_utf16z(&bytes).is_empty());
    }

    #[test]
    fn test_numeric_readers() {
        assert_eq!(read_i32_ne(&1234i32.to_ne_bytes()), Some(1234));
        assert_eq!(read_u64_ne(&0xDEAD_BEEFu64.to_ne_bytes()), Some(0xDEAD_BEEF));
        assert_eq!(read_f64_ne(&2.5f64.to_ne_bytes()), Some(2.5));
        assert_eq!(read_i32_ne(&[1, 2]), None);
    }

    #[test]
    fn test_utf16_units_drops_odd_trailing_byte() {
        let units = utf16_units(&[0x41, 0x00, 0x42]);
        assert_eq!(units, vec![0x41]);
    }
}
