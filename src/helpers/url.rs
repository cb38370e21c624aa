//! URL helper functions

use percent_encoding::percent_decode_str;

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/site.css") // -> "/blog/css/site.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/notes/") // -> "https://example.com/notes/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Decode a request path, rejecting anything that could leave the output
/// directory
pub fn decode_request_path(path: &str) -> Option<String> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let clean = decoded.trim_start_matches('/');
    if clean
        .split(['/', '\\'])
        .any(|segment| segment == ".." || segment.contains('\0'))
    {
        return None;
    }
    Some(clean.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com/".to_string(),
            root: "/site/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/site.css"), "/site/css/site.css");
        assert_eq!(url_for(&config, "notes/"), "/site/notes/");
        assert_eq!(url_for(&config, ""), "/site/");
        assert_eq!(url_for(&SiteConfig::default(), "/blog/"), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/blog/hello/"),
            "https://example.com/site/blog/hello/"
        );
    }

    #[test]
    fn test_decode_request_path() {
        assert_eq!(
            decode_request_path("/blog/tags/c%2B%2B/").as_deref(),
            Some("blog/tags/c++/")
        );
        assert_eq!(decode_request_path("/").as_deref(), Some(""));
        assert_eq!(decode_request_path("/../etc/passwd"), None);
        assert_eq!(decode_request_path("/a/%2E%2E/b"), None);
    }
}
