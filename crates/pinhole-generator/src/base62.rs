//! Base62 codec over the alphabet `[0-9a-zA-Z]`.

pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const BASE: u64 = ALPHABET.len() as u64;

/// Number of distinct codes of the given length (`62^length`).
///
/// Saturates at `u64::MAX` for lengths above 10.
pub fn keyspace(length: usize) -> u64 {
    BASE.checked_pow(length as u32).unwrap_or(u64::MAX)
}

/// Encodes `value` in base62 without padding.
pub fn encode(value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11);
    let mut rest = value;
    while rest > 0 {
        digits.push(ALPHABET[(rest % BASE) as usize]);
        rest /= BASE;
    }
    digits.reverse();
    // every byte comes from ALPHABET, which is ASCII
    digits.into_iter().map(char::from).collect()
}

/// Encodes `value` in base62, left-padded with `'0'` to `width` characters.
pub fn encode_padded(value: u64, width: usize) -> String {
    let encoded = encode(value);
    if encoded.len() >= width {
        return encoded;
    }
    let mut padded = "0".repeat(width - encoded.len());
    padded.push_str(&encoded);
    padded
}

/// Decodes a base62 string. Returns `None` on foreign characters or overflow.
pub fn decode(input: &str) -> Option<u64> {
    if input.is_empty() {
        return None;
    }
    input.bytes().try_fold(0_u64, |acc, b| {
        let digit = digit_value(b)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

fn digit_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u64),
        b'a'..=b'z' => Some((b - b'a') as u64 + 10),
        b'A'..=b'Z' => Some((b - b'A') as u64 + 36),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_values() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(61), "Z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(3843), "ZZ");
    }

    #[test]
    fn pads_to_width() {
        assert_eq!(encode_padded(0, 6), "000000");
        assert_eq!(encode_padded(62, 6), "000010");
        assert_eq!(encode_padded(keyspace(6) - 1, 6), "ZZZZZZ");
    }

    #[test]
    fn decode_inverts_encode() {
        for value in [0, 1, 61, 62, 1_000_000, u64::MAX] {
            assert_eq!(decode(&encode(value)), Some(value));
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("ab-c"), None);
        assert_eq!(decode("ZZZZZZZZZZZZ"), None);
    }

    #[test]
    fn keyspace_sizes() {
        assert_eq!(keyspace(6), 56_800_235_584);
        assert_eq!(keyspace(8), 218_340_105_584_896);
        assert_eq!(keyspace(20), u64::MAX);
    }
}
