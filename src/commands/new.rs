//! Create a new blog post or note

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use super::import::{build_frontmatter, import_slugify};
use crate::content::Collection;
use crate::Site;

/// Scaffold a draft entry dated today
pub fn run(site: &Site, title: &str, collection: Collection, slug: Option<&str>) -> Result<PathBuf> {
    create_entry(site, title, collection, slug, chrono::Local::now().date_naive())
}

/// Scaffold a draft entry with an explicit date
pub fn create_entry(
    site: &Site,
    title: &str,
    collection: Collection,
    slug: Option<&str>,
    date: NaiveDate,
) -> Result<PathBuf> {
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("Title must not be empty");
    }

    let slug = import_slugify(slug.unwrap_or(title));
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}. Please provide --slug.", title);
    }

    let target_dir = site.content_dir.join(collection.dir_name());
    fs::create_dir_all(&target_dir)?;

    // Either extension would claim the same URL
    for ext in ["md", "mdx"] {
        let existing = target_dir.join(format!("{}.{}", slug, ext));
        if existing.exists() {
            anyhow::bail!("File already exists: {:?}", existing);
        }
    }

    let file_path = target_dir.join(format!("{}.mdx", slug));
    let content = build_frontmatter(title, &date.format("%Y-%m-%d").to_string(), &[], true);
    fs::write(&file_path, content)?;

    tracing::debug!("Created {} draft {:?}", collection, file_path);

    Ok(file_path)
}
