use crate::error::ShortenerError;
use url::Url;

pub const DEFAULT_MAX_URL_LENGTH: usize = 2048;

/// Checks that `input` is a well-formed absolute http(s) URL of bounded length.
///
/// Surrounding whitespace is dropped; the rest is returned exactly as given
/// so that resolving the short code yields the submitted URL byte for byte.
pub fn validate_url(input: &str, max_length: usize) -> Result<String, ShortenerError> {
    let candidate = input.trim();

    if candidate.is_empty() {
        return Err(ShortenerError::InvalidUrl(
            "URL cannot be empty".to_string(),
        ));
    }

    if candidate.len() > max_length {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must be at most {} bytes, got {}",
            max_length,
            candidate.len()
        )));
    }

    // the stored string is served verbatim as a Location header
    if candidate.bytes().any(|b| b.is_ascii_control()) {
        return Err(ShortenerError::InvalidUrl(
            "URL must not contain control characters".to_string(),
        ));
    }

    let parsed = Url::parse(candidate)
        .map_err(|e| ShortenerError::InvalidUrl(format!("malformed URL: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            parsed.scheme()
        )));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => {
            return Err(ShortenerError::InvalidUrl(
                "URL must have a host".to_string(),
            ))
        }
    }

    Ok(candidate.to_string())
}
