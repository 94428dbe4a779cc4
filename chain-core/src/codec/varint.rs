use super::error::DecodeError;

/// Largest value representable by the variable-length prefix scheme.
pub const MAX_LEN: u64 = (1 << 29) - 1;

/// Ceiling on the total byte footprint (element count * element size) a
/// slice or string may declare before decoding refuses to even attempt the
/// allocation.
pub const MAX_SLICE_BYTES: u64 = 5 * 1024 * 1024;

/// Encodes `n` using the low-bit tag scheme: the top one, two, or three
/// bits of the first byte mark how many following bytes extend the value,
/// so the prefix grows from one to four bytes as `n` crosses the
/// 2^7, 2^14, and 2^21 boundaries.
pub fn encode_len(n: u64) -> Result<Vec<u8>, DecodeError> {
    if n <= 0x7F {
        Ok(vec![n as u8])
    } else if n <= 0x3FFF {
        Ok(vec![0x80 | (n & 0x3F) as u8, ((n >> 6) & 0xFF) as u8])
    } else if n <= 0x1F_FFFF {
        Ok(vec![
            0xC0 | (n & 0x1F) as u8,
            ((n >> 5) & 0xFF) as u8,
            ((n >> 13) & 0xFF) as u8,
        ])
    } else if n <= MAX_LEN {
        Ok(vec![
            0xE0 | (n & 0x1F) as u8,
            ((n >> 5) & 0xFF) as u8,
            ((n >> 13) & 0xFF) as u8,
            ((n >> 21) & 0xFF) as u8,
        ])
    } else {
        Err(DecodeError::Overflow)
    }
}

/// Inspects the leading byte of an already-read prefix and reports how many
/// bytes (including the leading byte) the full prefix occupies.
pub fn prefix_len(byte0: u8) -> usize {
    if byte0 & 0x80 == 0 {
        1
    } else if byte0 & 0xC0 == 0x80 {
        2
    } else if byte0 & 0xE0 == 0xC0 {
        3
    } else {
        4
    }
}

/// Decodes a length prefix from its raw bytes. `bytes` must be exactly
/// `prefix_len(bytes[0])` long.
pub fn decode_len(bytes: &[u8]) -> Result<u64, DecodeError> {
    match bytes.len() {
        1 => Ok((bytes[0] & 0x7F) as u64),
        2 => {
            let low = (bytes[0] & 0x3F) as u64;
            let high = bytes[1] as u64;
            Ok(low | (high << 6))
        }
        3 => {
            let low = (bytes[0] & 0x1F) as u64;
            let mid = bytes[1] as u64;
            let high = bytes[2] as u64;
            Ok(low | (mid << 5) | (high << 13))
        }
        4 => {
            let low = (bytes[0] & 0x1F) as u64;
            let b1 = bytes[1] as u64;
            let b2 = bytes[2] as u64;
            let b3 = bytes[3] as u64;
            let value = low | (b1 << 5) | (b2 << 13) | (b3 << 21);
            if value > MAX_LEN {
                Err(DecodeError::Overflow)
            } else {
                Ok(value)
            }
        }
        _ => unreachable!("prefix_len never returns outside 1..=4"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(n: u64) {
        let bytes = encode_len(n).expect("n within range");
        assert_eq!(bytes.len(), prefix_len(bytes[0]));
        let decoded = decode_len(&bytes).expect("valid prefix");
        assert_eq!(decoded, n);
    }

    #[test]
    fn roundtrips_every_tier_boundary() {
        for n in [
            0,
            1,
            0x7F,
            0x80,
            0x3FFF,
            0x4000,
            0x1F_FFFF,
            0x20_0000,
            MAX_LEN,
        ] {
            roundtrip(n);
        }
    }

    #[test]
    fn byte_count_is_monotonic_in_value() {
        let mut last_len = 0;
        for n in [0u64, 0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000, MAX_LEN] {
            let bytes = encode_len(n).unwrap();
            assert!(bytes.len() >= last_len);
            last_len = bytes.len();
        }
    }

    #[test]
    fn rejects_values_past_max_len() {
        assert!(matches!(encode_len(MAX_LEN + 1), Err(DecodeError::Overflow)));
    }

    proptest::proptest! {
        #[test]
        fn decode_len_inverts_encode_len_for_any_in_range_value(n in 0u64..=MAX_LEN) {
            let bytes = encode_len(n).unwrap();
            prop_assert_eq!(decode_len(&bytes).unwrap(), n);
        }
    }
}
