//! Redemption code generation.
//!
//! Codes are eight characters drawn uniformly from an alphabet without the
//! easily confused `0`, `O`, `1` and `I`, optionally preceded by a merchant
//! prefix and a hyphen.

use rand::Rng;

/// 32 unambiguous characters.
pub const CODE_ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

pub const CODE_LENGTH: usize = 8;

/// Generate a redemption code using the thread-local RNG.
pub fn generate_code(prefix: Option<&str>) -> String {
    generate_code_with(prefix, &mut rand::rng())
}

/// Generate a redemption code from an explicit RNG.
pub fn generate_code_with<R: Rng + ?Sized>(prefix: Option<&str>, rng: &mut R) -> String {
    let body: String = (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();

    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{prefix}-{body}"),
        None => body,
    }
}

/// Check that `code` has the shape `generate_code` produces for `prefix`.
pub fn is_well_formed(code: &str, prefix: Option<&str>) -> bool {
    let body = match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => match code
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            Some(body) => body,
            None => return false,
        },
        None => code,
    };

    body.len() == CODE_LENGTH && body.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_alphabet_excludes_confusable_characters() {
        assert_eq!(CODE_ALPHABET.len(), 32);
        for c in [b'0', b'O', b'1', b'I'] {
            assert!(!CODE_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn test_prefixed_code_shape() {
        for _ in 0..200 {
            let code = generate_code(Some("SAVE"));
            assert!(code.starts_with("SAVE-"), "{code}");
            assert_eq!(code.len(), "SAVE-".len() + CODE_LENGTH);
            assert!(is_well_formed(&code, Some("SAVE")), "{code}");
        }
    }

    #[test]
    fn test_code_without_prefix() {
        for prefix in [None, Some(""), Some("   ")] {
            let code = generate_code(prefix);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(!code.contains('-'));
            assert!(is_well_formed(&code, None));
        }
    }

    #[test]
    fn test_is_well_formed_rejects_bad_codes() {
        assert!(!is_well_formed("SAVE-ABCDEFG", Some("SAVE")));
        assert!(!is_well_formed("SAVE-ABCDEFG0", Some("SAVE")));
        assert!(!is_well_formed("SAVEABCDEFGH", Some("SAVE")));
        assert!(!is_well_formed("abcdefgh", None));
        assert!(is_well_formed("ABCDEFGH", None));
    }

    #[test]
    fn test_draws_cover_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 32];
        for _ in 0..500 {
            let code = generate_code_with(None, &mut rng);
            for b in code.bytes() {
                let idx = CODE_ALPHABET.iter().position(|&c| c == b).unwrap();
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }
}
