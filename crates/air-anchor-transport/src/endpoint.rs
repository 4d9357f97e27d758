//! Base URL handling.

use crate::error::{Result, TransportError};

/// Normalize a ledger or authority base URL.
///
/// Surrounding whitespace and trailing slashes are removed. A URL without an
/// explicit scheme gets `http://` prepended.
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(TransportError::InvalidUrl("empty base url".into()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else if trimmed.contains("://") {
        Err(TransportError::InvalidUrl(format!(
            "unsupported scheme in {trimmed}"
        )))
    } else {
        Ok(format!("http://{trimmed}"))
    }
}
