//! Random string generation.

use rand::Rng;

/// Alphabet random strings are drawn from: 64 URL- and filename-friendly characters.
pub const RANDOM_STRING_SOURCE: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+";

/// Returns a string of exactly `n` characters drawn uniformly from
/// [`RANDOM_STRING_SOURCE`].
///
/// Uses the thread-local generator from [`rand::rng`], a CSPRNG seeded from
/// the operating system.
pub fn random_string(n: usize) -> String {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| RANDOM_STRING_SOURCE[rng.random_range(0..RANDOM_STRING_SOURCE.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_length() {
        for n in [0, 1, 10, 25, 200] {
            assert_eq!(random_string(n).chars().count(), n);
        }
    }

    #[test]
    fn only_alphabet_characters() {
        let s = random_string(1000);
        assert!(s.bytes().all(|b| RANDOM_STRING_SOURCE.contains(&b)));
    }

    #[test]
    fn successive_strings_differ() {
        assert_ne!(random_string(25), random_string(25));
    }
}
