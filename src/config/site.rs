//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub name: String,
    pub description: String,
    pub intro: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    pub date_format: String,
    pub feed_limit: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Navigation
    pub nav: Vec<NavItem>,
    pub sections: Vec<SectionItem>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Theseus".to_string(),
            description: "A minimal personal site for blog posts, study notes, and resume."
                .to_string(),
            intro: "Hi, I am Theseus. This site records my ideas, study notes, and my resume."
                .to_string(),
            author: "Theseus".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            date_format: "%b %d, %Y".to_string(),
            feed_limit: 20,
            highlight: HighlightConfig::default(),

            nav: vec![
                NavItem::new("/blog", "Blog"),
                NavItem::new("/notes", "Notes"),
                NavItem::new("/resume", "Resume"),
            ],
            sections: vec![
                SectionItem::new(
                    "/blog",
                    "Blog",
                    "Long-form writing about thinking, decisions, and reflection.",
                ),
                SectionItem::new(
                    "/notes",
                    "Notes",
                    "Short study notes focused on concrete ideas and takeaways.",
                ),
                SectionItem::new(
                    "/resume",
                    "Resume",
                    "Resume page rendered from local YAML content.",
                ),
            ],
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }
}

/// A header navigation link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub href: String,
    pub label: String,
}

impl NavItem {
    pub fn new(href: &str, label: &str) -> Self {
        Self {
            href: href.to_string(),
            label: label.to_string(),
        }
    }
}

/// A card on the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionItem {
    pub href: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl SectionItem {
    pub fn new(href: &str, title: &str, description: &str) -> Self {
        Self {
            href: href.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.name, "Theseus");
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.feed_limit, 20);
        assert_eq!(config.nav.len(), 3);
        assert_eq!(config.nav[0].href, "/blog");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
name: Ariadne
url: https://ariadne.example
nav:
  - href: /blog
    label: Writing
highlight:
  line_number: true
github_username: ariadne
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "Ariadne");
        assert_eq!(config.url, "https://ariadne.example");
        assert_eq!(config.nav.len(), 1);
        assert_eq!(config.nav[0].label, "Writing");
        assert!(config.highlight.line_number);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        // Untouched fields keep their defaults
        assert_eq!(config.sections.len(), 3);
        assert!(config.extra.contains_key("github_username"));
    }
}
