//! Content module - handles blog posts, notes, and markdown processing

mod entry;
mod frontmatter;
pub mod loader;
mod markdown;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use entry::{normalize_tag, ContentEntry, TagCount};
pub use frontmatter::{parse_date_string, FrontMatter};
pub use loader::ContentLoader;
pub use markdown::{plain_text, MarkdownRenderer};

/// A directory of entries under the content root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Blog,
    Notes,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Blog, Collection::Notes];

    /// Directory name under the content root, also the URL prefix
    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::Blog => "blog",
            Collection::Notes => "notes",
        }
    }

    /// Heading used on listing pages
    pub fn label(self) -> &'static str {
        match self {
            Collection::Blog => "Blog",
            Collection::Notes => "Notes",
        }
    }

    /// Parse a collection name, accepting `posts` as an alias for the blog
    pub fn from_alias(value: &str) -> Option<Self> {
        match value {
            "blog" | "posts" => Some(Collection::Blog),
            "notes" => Some(Collection::Notes),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::from_alias(s)
            .ok_or_else(|| anyhow::anyhow!("Unknown collection: {}. Available: blog, notes", s))
    }
}
