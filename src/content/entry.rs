//! Content entry model

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Collection, FrontMatter};

/// A blog post or note, derived from one markdown file
#[derive(Debug, Clone, Serialize)]
pub struct ContentEntry {
    /// File name without extension
    pub slug: String,

    /// Collection the file lives in
    pub collection: Collection,

    /// Title from front-matter, or the slug
    pub title: String,

    /// Publication date, 1970-01-01 when missing or unparseable
    pub date: NaiveDateTime,

    /// Normalized tags
    pub tags: Vec<String>,

    /// Short summary for listings
    pub summary: String,

    /// Whether the entry is hidden
    pub draft: bool,

    /// Raw markdown after the front-matter
    pub body: String,
}

impl ContentEntry {
    /// Build an entry from a file's source text
    pub fn from_source(collection: Collection, slug: &str, source: &str) -> Self {
        let (fm, body) = FrontMatter::parse(source);

        let title = fm
            .non_blank_title()
            .map(str::to_string)
            .unwrap_or_else(|| slug.to_string());

        // NaiveDateTime::default() is the unix epoch
        let date = fm.parse_date().unwrap_or_default();

        Self {
            slug: slug.to_string(),
            collection,
            title,
            date,
            tags: fm.tags,
            summary: fm.summary.unwrap_or_default(),
            draft: fm.draft,
            body: body.to_string(),
        }
    }

    /// Whether any tag matches `tag` after normalization
    pub fn has_tag(&self, tag: &str) -> bool {
        let target = normalize_tag(tag);
        self.tags.iter().any(|t| normalize_tag(t) == target)
    }

    /// Site-relative URL path, e.g. `/blog/hello-world/`
    pub fn path(&self) -> String {
        format!("/{}/{}/", self.collection.dir_name(), self.slug)
    }
}

/// Tag identity used for matching: trimmed and lowercased
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// A distinct tag and the number of entries carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// First spelling seen
    pub name: String,
    pub count: usize,
}
