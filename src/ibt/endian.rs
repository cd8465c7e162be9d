//! Little-endian primitive decoding for IBT byte layouts.
//!
//! These are pure conversions. Every function indexes its input directly and panics if
//! the slice is shorter than the width it decodes; callers slice bounds-correct spans
//! before calling in (the header decoders read fixed-size buffers, and the value codec
//! works against a validated [`VariableSchema`](crate::VariableSchema)).

use crate::types::BitField;

/// Decode a little-endian `i32`.
///
/// The all-ones pattern `0xFFFFFFFF` is the SDK's "unset" marker and decodes to `-1`.
pub fn byte4_to_int(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Decode a little-endian IEEE-754 single precision float.
pub fn byte4_to_float(b: &[u8]) -> f32 {
    f32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Decode a little-endian IEEE-754 double precision float.
pub fn byte8_to_double(b: &[u8]) -> f64 {
    f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Decode a little-endian `i64`.
pub fn byte8_to_int64(b: &[u8]) -> i64 {
    i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Decode 4 bytes of flags as lowercase hex with a `0x` prefix.
pub fn byte4_to_bitfield(b: &[u8]) -> String {
    BitField(u32::from_le_bytes([b[0], b[1], b[2], b[3]])).to_string()
}

/// Strip trailing NUL padding from a fixed-width byte run.
pub fn trim_nul(b: &[u8]) -> &[u8] {
    let end = b.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
    &b[..end]
}

/// Fixed-width byte run to string, trailing NULs stripped, invalid UTF-8 replaced.
pub fn bytes_to_string(b: &[u8]) -> String {
    String::from_utf8_lossy(trim_nul(b)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn all_ones_int_is_unset_marker() {
        assert_eq!(byte4_to_int(&[0xFF, 0xFF, 0xFF, 0xFF]), -1);
    }

    #[test]
    fn int_is_little_endian() {
        assert_eq!(byte4_to_int(&[0x02, 0x00, 0x00, 0x01]), 16_777_218);
        assert_eq!(byte4_to_int(&[0x3C, 0x00, 0x00, 0x00]), 60);
    }

    #[test]
    fn floats_decode_sdk_samples() {
        assert_eq!(byte4_to_float(&[0x01, 0x7c, 0x17, 0xba]), -0.000_577_867_1_f32);
        assert_eq!(byte8_to_double(&[0, 0, 0, 0, 0, 0x75, 0x22, 0x41]), 604_800.0);
    }

    #[test]
    fn int64_decodes_start_date() {
        let bytes = 1_719_258_336i64.to_le_bytes();
        assert_eq!(byte8_to_int64(&bytes), 1_719_258_336);
    }

    #[test]
    fn bitfield_renders_lowercase_hex() {
        assert_eq!(byte4_to_bitfield(&[0x00, 0x02, 0x04, 0x10]), "0x10040200");
        assert_eq!(byte4_to_bitfield(&[0x00, 0x04, 0x08, 0x14]), "0x14080400");
        assert_eq!(byte4_to_bitfield(&[0xAB, 0, 0, 0]), "0xab");
    }

    #[test]
    fn strings_drop_only_trailing_nuls() {
        assert_eq!(bytes_to_string(b"Speed\0\0\0"), "Speed");
        assert_eq!(bytes_to_string(b"a\0b\0"), "a\0b");
        assert_eq!(bytes_to_string(&[0u8; 8]), "");
        assert_eq!(trim_nul(b"m/s"), b"m/s");
    }

    #[test]
    #[should_panic]
    fn short_slices_panic() {
        byte4_to_int(&[1, 2, 3]);
    }

    proptest! {
        #[test]
        fn int_decode_matches_std(value in any::<i32>()) {
            prop_assert_eq!(byte4_to_int(&value.to_le_bytes()), value);
        }

        #[test]
        fn double_decode_is_bit_exact(bits in any::<u64>()) {
            let decoded = byte8_to_double(&bits.to_le_bytes());
            prop_assert_eq!(decoded.to_bits(), bits);
        }

        #[test]
        fn trim_never_leaves_trailing_nul(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let trimmed = trim_nul(&bytes);
            prop_assert!(trimmed.last() != Some(&0));
            prop_assert!(bytes.starts_with(trimmed));
        }
    }
}
