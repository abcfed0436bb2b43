//! Short code generation strategies.
//!
//! Generators are pure: they never consult storage. Uniqueness of the
//! codes they hand out is enforced by the repository's atomic insert, so a
//! generator only has to make collisions rare.

pub mod base62;
pub mod error;
pub mod random;
pub mod seq;

pub use error::Error;
pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use pinhole_core::ShortCode;

/// Shortest code a generator may be configured to emit.
pub const MIN_CODE_LENGTH: usize = 6;
/// Longest code a generator may be configured to emit.
pub const MAX_CODE_LENGTH: usize = 8;
/// Code length used when none is configured.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Trait for generating short codes.
///
/// Implementations can vary from simple random generators to counter
/// based ones. The original URL is passed along so that content-derived
/// strategies can be plugged in; the bundled strategies ignore it.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Produces a candidate short code for `original_url`.
    fn generate(&self, original_url: &str) -> Self::Output;
}

pub(crate) fn check_length(length: usize) -> Result<usize, Error> {
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        return Err(Error::InvalidLength {
            length,
            min: MIN_CODE_LENGTH,
            max: MAX_CODE_LENGTH,
        });
    }
    Ok(length)
}
