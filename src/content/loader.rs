//! Content loader - reads blog posts and notes from the content directory

use anyhow::Result;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{normalize_tag, Collection, ContentEntry, TagCount};
use crate::Site;

lazy_static! {
    static ref SLUG_PATTERN: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Loads entries from `content/<collection>/`
///
/// Nothing is cached: every call reads the directory again.
pub struct ContentLoader {
    content_dir: PathBuf,
}

impl ContentLoader {
    /// Create a loader for a site
    pub fn new(site: &Site) -> Self {
        Self::with_root(&site.content_dir)
    }

    /// Create a loader rooted at an arbitrary content directory
    pub fn with_root<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding a collection's markdown files
    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.content_dir.join(collection.dir_name())
    }

    /// Load all published entries, newest first
    pub fn entries(&self, collection: Collection) -> Result<Vec<ContentEntry>> {
        let dir = self.collection_dir(collection);
        if !dir.is_dir() {
            tracing::debug!("No {} directory at {:?}", collection, dir);
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(slug) = markdown_slug(path) else {
                continue;
            };

            match fs::read_to_string(path) {
                Ok(source) => {
                    let item = ContentEntry::from_source(collection, &slug, &source);
                    if !item.draft {
                        entries.push(item);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load {:?}: {}", path, e);
                }
            }
        }

        // Sort by date descending (newest first), slug breaks ties
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        Ok(entries)
    }

    /// Resolve a single published entry by slug
    ///
    /// Returns `None` for malformed slugs, missing files, and drafts.
    pub fn entry_by_slug(&self, collection: Collection, slug: &str) -> Option<ContentEntry> {
        if !SLUG_PATTERN.is_match(slug) {
            return None;
        }

        let dir = self.collection_dir(collection);
        let source = ["mdx", "md"]
            .iter()
            .find_map(|ext| fs::read_to_string(dir.join(format!("{}.{}", slug, ext))).ok())?;

        let entry = ContentEntry::from_source(collection, slug, &source);
        if entry.draft {
            None
        } else {
            Some(entry)
        }
    }

    /// Slugs of all published entries, newest first
    pub fn all_slugs(&self, collection: Collection) -> Result<Vec<String>> {
        Ok(self
            .entries(collection)?
            .into_iter()
            .map(|e| e.slug)
            .collect())
    }

    /// Published entries carrying a tag (matched trimmed and case-insensitively)
    pub fn entries_with_tag(&self, collection: Collection, tag: &str) -> Result<Vec<ContentEntry>> {
        Ok(self
            .entries(collection)?
            .into_iter()
            .filter(|e| e.has_tag(tag))
            .collect())
    }

    /// Distinct tags with counts, in first-seen order
    pub fn tags(&self, collection: Collection) -> Result<Vec<TagCount>> {
        Ok(collect_tags(&self.entries(collection)?))
    }
}

/// Group tags by normalized identity, keeping the first spelling seen
pub fn collect_tags(entries: &[ContentEntry]) -> Vec<TagCount> {
    let mut tags: IndexMap<String, TagCount> = IndexMap::new();
    for entry in entries {
        let mut seen = Vec::new();
        for tag in &entry.tags {
            let key = normalize_tag(tag);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            tags.entry(key.clone())
                .or_insert_with(|| TagCount {
                    name: tag.trim().to_string(),
                    count: 0,
                })
                .count += 1;
            seen.push(key);
        }
    }
    tags.into_values().collect()
}

/// Whether the path has a `.md` or `.mdx` extension
pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("mdx"))
        .unwrap_or(false)
}

/// Slug for a markdown file name, `None` for other files
fn markdown_slug(path: &Path) -> Option<String> {
    if !is_markdown(path) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn fixture() -> (TempDir, ContentLoader) {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("blog");
        write(
            &blog,
            "older.md",
            "---\ntitle: Older\ndate: 2023-05-01\ntags: [Rust]\n---\nOld body",
        );
        write(
            &blog,
            "newer.mdx",
            "---\ntitle: Newer\ndate: 2024-05-01\ntags: [rust, Web]\n---\nNew body",
        );
        write(
            &blog,
            "secret.md",
            "---\ntitle: Secret\ndate: 2025-01-01\ndraft: true\n---\nHidden",
        );
        write(&blog, "undated.MD", "No front-matter here");
        write(&blog, "notes.txt", "not markdown");
        write(&blog.join("nested"), "deep.md", "---\ntitle: Deep\n---\n");
        let loader = ContentLoader::with_root(tmp.path());
        (tmp, loader)
    }

    #[test]
    fn test_entries_sorted_and_filtered() {
        let (_tmp, loader) = fixture();
        let entries = loader.entries(Collection::Blog).unwrap();
        let slugs: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older", "undated"]);
        assert_eq!(entries[2].title, "undated");
        assert_eq!(entries[2].body, "No front-matter here");
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let (_tmp, loader) = fixture();
        assert!(loader.entries(Collection::Notes).unwrap().is_empty());
        assert!(loader.all_slugs(Collection::Notes).unwrap().is_empty());
    }

    #[test]
    fn test_same_date_sorted_by_slug() {
        let tmp = TempDir::new().unwrap();
        let notes = tmp.path().join("notes");
        write(&notes, "b.md", "---\ndate: 2024-01-01\n---\n");
        write(&notes, "a.md", "---\ndate: 2024-01-01\n---\n");
        let loader = ContentLoader::with_root(tmp.path());
        assert_eq!(loader.all_slugs(Collection::Notes).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_entry_by_slug() {
        let (_tmp, loader) = fixture();
        let entry = loader.entry_by_slug(Collection::Blog, "newer").unwrap();
        assert_eq!(entry.title, "Newer");
        assert_eq!(entry.collection, Collection::Blog);

        assert!(loader.entry_by_slug(Collection::Blog, "older").is_some());
        assert!(loader.entry_by_slug(Collection::Blog, "secret").is_none());
        assert!(loader.entry_by_slug(Collection::Blog, "missing").is_none());
        assert!(loader.entry_by_slug(Collection::Blog, "../blog/older").is_none());
        assert!(loader.entry_by_slug(Collection::Blog, "Older").is_none());
        assert!(loader.entry_by_slug(Collection::Blog, "double--dash").is_none());
    }

    #[test]
    fn test_mdx_preferred_over_md() {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("blog");
        write(&blog, "post.md", "---\ntitle: From md\n---\n");
        write(&blog, "post.mdx", "---\ntitle: From mdx\n---\n");
        let loader = ContentLoader::with_root(tmp.path());
        let entry = loader.entry_by_slug(Collection::Blog, "post").unwrap();
        assert_eq!(entry.title, "From mdx");
    }

    #[test]
    fn test_entries_with_tag() {
        let (_tmp, loader) = fixture();
        let tagged = loader.entries_with_tag(Collection::Blog, " RUST ").unwrap();
        let slugs: Vec<_> = tagged.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
        assert!(loader
            .entries_with_tag(Collection::Blog, "go")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_tags_counted_by_normalized_name() {
        let (_tmp, loader) = fixture();
        let tags = loader.tags(Collection::Blog).unwrap();
        assert_eq!(
            tags,
            vec![
                TagCount {
                    name: "rust".to_string(),
                    count: 2
                },
                TagCount {
                    name: "Web".to_string(),
                    count: 1
                },
            ]
        );
    }
}
