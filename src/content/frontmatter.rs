//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// Accept only string values, anything else is treated as absent
fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// Tags may be a list of scalars or a single comma separated string
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(tags_from_value(&value))
}

/// Loose boolean: `true`, `"true"` (any case), or a non-zero number
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    })
}

/// Normalize a YAML tags value into a clean list
pub(crate) fn tags_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Value::String(s) => split_tags(s),
        _ => Vec::new(),
    }
}

/// Split a comma separated tag string
pub(crate) fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Front-matter data from a blog post or note
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "string_only")]
    pub title: Option<String>,
    #[serde(deserialize_with = "string_only")]
    pub date: Option<String>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_only")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "truthy")]
    pub draft: bool,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> (Self, &str) {
        let content = content.trim_start_matches('\u{feff}');

        let Some((yaml_content, remaining)) = split_block(content) else {
            return (FrontMatter::default(), content);
        };
        match Self::parse_yaml(yaml_content) {
            Some(fm) => (fm, remaining),
            None => (FrontMatter::default(), content),
        }
    }

    /// The front-matter block as an untyped YAML mapping
    pub fn raw_mapping(content: &str) -> Option<Value> {
        let (yaml_content, _) = split_block(content.trim_start_matches('\u{feff}'))?;
        serde_yaml::from_str::<Value>(yaml_content)
            .ok()
            .filter(Value::is_mapping)
    }

    fn parse_yaml(yaml_content: &str) -> Option<Self> {
        let value: Value = match serde_yaml::from_str(yaml_content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                return None;
            }
        };

        match value {
            Value::Null => Some(FrontMatter::default()),
            Value::Mapping(_) => match serde_yaml::from_value(value) {
                Ok(fm) => Some(fm),
                Err(e) => {
                    tracing::warn!("Unexpected front-matter shape: {}", e);
                    None
                }
            },
            _ => {
                tracing::warn!("Front-matter is not a mapping, treating as content");
                None
            }
        }
    }

    /// Title if present and not blank
    pub fn non_blank_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Parse the date string into a NaiveDateTime
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Split a leading `---` block into (yaml, body)
fn split_block(content: &str) -> Option<(&str, &str)> {
    let first_line = content.split_inclusive('\n').next()?;
    if first_line.trim_end() != "---" {
        return None;
    }

    let rest = &content[first_line.len()..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    tracing::warn!("Unclosed front-matter block, treating as content");
    None
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset, compared in UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - notes
summary: First post
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["rust", "notes"]);
        assert_eq!(fm.summary.as_deref(), Some("First post"));
        assert!(!fm.draft);
        assert_eq!(remaining, "\nThis is the content.\n");
    }

    #[test]
    fn test_comma_separated_tags() {
        let content = "---\ntags: \"rust, , web ,cli\"\n---\nBody";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.tags, vec!["rust", "web", "cli"]);
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_scalar_tags_are_stringified() {
        let content = "---\ntags: [2024, true, \"  \", ~, go]\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.tags, vec!["2024", "true", "go"]);
    }

    #[test]
    fn test_lenient_field_types() {
        let content = "---\ntitle: 42\nsummary: [a]\ndraft: \"TRUE\"\ntags: {a: b}\n---\nx";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(fm.summary, None);
        assert!(fm.draft);
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn test_draft_values() {
        for (raw, expected) in [
            ("true", true),
            ("false", false),
            ("\"false\"", false),
            ("1", true),
            ("0", false),
            ("yes please", false),
        ] {
            let content = format!("---\ndraft: {}\n---\n", raw);
            let (fm, _) = FrontMatter::parse(&content);
            assert_eq!(fm.draft, expected, "draft: {}", raw);
        }
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just a heading\n\nText";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_unclosed_frontmatter_is_content() {
        let content = "---\ntitle: Oops\nno closing line";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_invalid_yaml_is_content() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody");
        assert_eq!(fm.title, None);
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        assert!(parse_date_string("2024/03/01").is_some());
        assert!(parse_date_string("2024-03-01T08:00:00+08:00").is_some());
        assert!(parse_date_string("not a date").is_none());
        assert!(parse_date_string("2024-13-40").is_none());
    }

    #[test]
    fn test_blank_title() {
        let fm = FrontMatter {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(fm.non_blank_title(), None);
    }
}
