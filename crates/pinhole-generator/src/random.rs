use crate::base62::ALPHABET;
use crate::{check_length, Error, Generator, DEFAULT_CODE_LENGTH};
use pinhole_core::ShortCode;
use rand::Rng;

/// Draws codes uniformly at random from the base62 alphabet.
///
/// Collisions are possible but rare (62^7 is roughly 3.5 trillion codes);
/// callers rely on the repository's atomic insert to detect them and draw again.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing codes of `length` characters.
    pub fn new(length: usize) -> Result<Self, Error> {
        Ok(Self {
            length: check_length(length)?,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self, _original_url: &str) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}
