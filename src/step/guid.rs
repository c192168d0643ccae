//! IFC `GlobalId` generation.
//!
//! IFC stores 128-bit GUIDs as 22 base-64 digits over its own alphabet,
//! most significant digit first.

use uuid::Uuid;

/// Number of digits in a compressed GUID.
pub const GUID_LENGTH: usize = 22;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Creates a fresh `GlobalId` from a random (v4) UUID.
#[must_use]
pub fn create_guid() -> String {
    compress(Uuid::new_v4().as_u128())
}

/// Encodes a 128-bit value as a 22-digit `GlobalId`.
///
/// Small values come out left-padded with `'0'`.
#[must_use]
pub fn compress(value: u128) -> String {
    let mut num = value;
    let mut digits = [b'0'; GUID_LENGTH];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(num % 64) as usize];
        num /= 64;
    }
    digits.iter().copied().map(char::from).collect()
}

/// Decodes a `GlobalId` back into its 128-bit value.
///
/// Returns `None` for wrong length, foreign characters or values above `u128::MAX`.
#[must_use]
pub fn expand(guid: &str) -> Option<u128> {
    if guid.len() != GUID_LENGTH {
        return None;
    }
    guid.bytes().try_fold(0u128, |acc, byte| {
        let digit = ALPHABET.iter().position(|&c| c == byte)?;
        acc.checked_mul(64)?.checked_add(digit as u128)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_guid_shape() {
        for _ in 0..1000 {
            let guid = create_guid();
            assert_eq!(guid.len(), GUID_LENGTH);
            assert!(guid.bytes().all(|b| ALPHABET.contains(&b)), "{guid}");
        }
    }

    #[test]
    fn test_guid_no_collisions() {
        let guids: HashSet<String> = (0..10_000).map(|_| create_guid()).collect();
        assert_eq!(guids.len(), 10_000);
    }

    #[test]
    fn test_compress_pads_small_values() {
        assert_eq!(compress(0), "0000000000000000000000");
        assert_eq!(compress(63), "000000000000000000000$");
        assert_eq!(compress(64), "0000000000000000000010");
    }

    #[test]
    fn test_compress_max_value() {
        // 128 bits leave 2 bits for the leading digit.
        assert_eq!(compress(u128::MAX), "3$$$$$$$$$$$$$$$$$$$$$");
    }

    #[test]
    fn test_expand_inverts_compress() {
        let value = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210_u128;
        assert_eq!(expand(&compress(value)), Some(value));
    }

    #[test]
    fn test_expand_rejects_bad_input() {
        assert_eq!(expand("short"), None);
        assert_eq!(expand("000000000000000000000!"), None);
        assert_eq!(expand("$$$$$$$$$$$$$$$$$$$$$$"), None);
    }
}
