//! URL helpers for building chat API endpoints from a configured server root.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use owchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:3000/"), "http://localhost:3000");
/// assert_eq!(normalize_base_url("https://chat.example.com///"), "https://chat.example.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a server root and an endpoint path with exactly one slash between them.
///
/// A base URL that already ends in `/api` is accepted as well, so both
/// `http://host` and `http://host/api` reach `http://host/api/models`.
///
/// # Examples
///
/// ```
/// use owchat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:3000", "api/models"),
///     "http://localhost:3000/api/models"
/// );
/// assert_eq!(
///     construct_api_url("http://localhost:3000/api/", "/api/chat/completions"),
///     "http://localhost:3000/api/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let mut normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    if endpoint.starts_with("api/") && normalized_base.ends_with("/api") {
        normalized_base.truncate(normalized_base.len() - "/api".len());
    }
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:3000"),
            "http://localhost:3000"
        );
        assert_eq!(
            normalize_base_url("http://localhost:3000/"),
            "http://localhost:3000"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://localhost:3000", "api/models"),
            "http://localhost:3000/api/models"
        );
        assert_eq!(
            construct_api_url("http://localhost:3000///", "///api/models"),
            "http://localhost:3000/api/models"
        );
        assert_eq!(
            construct_api_url("https://chat.example.com/api", "api/chat/completions"),
            "https://chat.example.com/api/chat/completions"
        );
        // Only a trailing `/api` segment is folded, not one embedded in a longer path.
        assert_eq!(
            construct_api_url("https://example.com/rapid", "api/models"),
            "https://example.com/rapid/api/models"
        );
    }
}
