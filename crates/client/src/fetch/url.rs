//! URL canonicalization and worker scope resolution.

use url::Url;

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute URL so equal resources share one cache key.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http(s) scheme
/// 3. Lowercase the host (done by the URL parser)
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// The origin a worker controls.
///
/// Manifest paths are resolved against it and responses from it are
/// classified as same-origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    origin: Url,
}

impl Scope {
    /// Build a scope from an origin such as `http://127.0.0.1:8080`.
    ///
    /// Any path, query or fragment on the input is dropped.
    pub fn new(origin: &str) -> Result<Self, UrlError> {
        let mut origin = canonicalize(origin)?;
        if origin.host_str().is_none() {
            return Err(UrlError::InvalidUrl(format!("origin has no host: {origin}")));
        }
        origin.set_path("/");
        origin.set_query(None);
        Ok(Self { origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolve an origin-relative path (or an absolute URL) to a canonical URL.
    pub fn resolve(&self, path: &str) -> Result<Url, UrlError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }
        let joined = self.origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        canonicalize(joined.as_str())
    }

    /// Same scheme, host and port as the scope.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }
}
