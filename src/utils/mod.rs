//! Small shared helpers.

/// Alphabet for generated short codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric short code of the given length.
///
/// Uniform over `[a-zA-Z0-9]`. Not cryptographic; collision avoidance is the
/// caller's job.
pub fn generate_short_code(length: usize) -> String {
    use rand::Rng;
    use std::iter;

    let mut rng = rand::rng();

    iter::repeat_with(|| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        for length in [0, 1, 4, 6, 20] {
            assert_eq!(generate_short_code(length).len(), length);
        }
    }

    #[test]
    fn generates_only_alphanumeric_symbols() {
        let code = generate_short_code(256);
        assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn successive_codes_differ() {
        // 62^32 outcomes make a repeat effectively impossible.
        assert_ne!(generate_short_code(32), generate_short_code(32));
    }
}
