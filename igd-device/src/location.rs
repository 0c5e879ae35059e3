//! Normalization of service URLs against the description's base URL.

use url::Url;

use crate::error::{IgdError, Result};

/// Base URL for a description: the declared `URLBase` when there is one,
/// else the URL the description was fetched from.
pub fn base_url(declared: Option<&str>, description_url: &str) -> Result<Url> {
    let raw = declared.unwrap_or(description_url);
    Url::parse(raw).map_err(|e| IgdError::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Resolve a service URL taken from a description against `base`.
///
/// Bare paths are joined onto `base`. A URL that parses as absolute but has
/// no host (e.g. `upnp:/ctl` or `file:///ctl`) takes its scheme, host and
/// port from `base`, keeping its own path, query and fragment.
pub fn resolve(base: &Url, raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => base
            .join(raw)
            .map_err(|e| IgdError::InvalidUrl(format!("{}: {}", raw, e)))?,
    };

    if parsed.host_str().is_some_and(|host| !host.is_empty()) {
        return Ok(parsed);
    }

    tracing::trace!(url = raw, base = %base, "filling in host from base URL");

    let mut resolved = base.clone();
    resolved.set_path(parsed.path());
    resolved.set_query(parsed.query());
    resolved.set_fragment(parsed.fragment());
    Ok(resolved)
}
