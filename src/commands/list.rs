//! List site content

use anyhow::Result;
use std::fmt::Write as _;

use crate::content::Collection;
use crate::Site;

/// Options for `list`
#[derive(Debug, Clone, Default)]
pub struct ListOptions<'a> {
    /// Only entries carrying this tag
    pub tag: Option<&'a str>,
    /// Print bare slugs, one per line
    pub slugs_only: bool,
}

/// List site content by type
pub fn run(site: &Site, content_type: &str, options: &ListOptions<'_>) -> Result<()> {
    print!("{}", render(site, content_type, options)?);
    Ok(())
}

/// Build the listing printed by [`run`]
pub fn render(site: &Site, content_type: &str, options: &ListOptions<'_>) -> Result<String> {
    let loader = site.loader();
    let mut out = String::new();

    if matches!(content_type, "tag" | "tags") {
        for collection in Collection::ALL {
            let tags = loader.tags(collection)?;
            writeln!(out, "{} tags ({}):", collection.label(), tags.len())?;
            for tag in tags {
                writeln!(out, "  {} ({})", tag.name, tag.count)?;
            }
        }
        return Ok(out);
    }

    let Some(collection) = Collection::from_alias(content_type) else {
        anyhow::bail!(
            "Unknown type: {}. Available: blog, notes, tags",
            content_type
        );
    };

    if options.slugs_only && options.tag.is_none() {
        for slug in loader.all_slugs(collection)? {
            writeln!(out, "{}", slug)?;
        }
        return Ok(out);
    }

    let entries = match options.tag {
        Some(tag) => loader.entries_with_tag(collection, tag)?,
        None => loader.entries(collection)?,
    };

    if options.slugs_only {
        for entry in &entries {
            writeln!(out, "{}", entry.slug)?;
        }
        return Ok(out);
    }

    writeln!(out, "{} ({}):", collection.label(), entries.len())?;
    for entry in &entries {
        writeln!(
            out,
            "  {} - {} [{}]",
            entry.date.format("%Y-%m-%d"),
            entry.title,
            entry.slug
        )?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("content/blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(blog.join("a.md"), "---\ntitle: A\ndate: 2024-01-01\ntags: [Rust]\n---\n").unwrap();
        fs::write(blog.join("b.md"), "---\ntitle: B\ndate: 2024-02-01\ntags: [rust, web]\n---\n").unwrap();
        fs::write(blog.join("c.md"), "---\ntitle: C\ndraft: true\n---\n").unwrap();
        let site = Site::new(tmp.path()).unwrap();
        (tmp, site)
    }

    #[test]
    fn test_list_entries() {
        let (_tmp, site) = fixture();
        let out = render(&site, "posts", &ListOptions::default()).unwrap();
        assert_eq!(
            out,
            "Blog (2):\n  2024-02-01 - B [b]\n  2024-01-01 - A [a]\n"
        );
    }

    #[test]
    fn test_list_by_tag_and_slugs() {
        let (_tmp, site) = fixture();
        let slugs = ListOptions {
            slugs_only: true,
            ..ListOptions::default()
        };
        assert_eq!(render(&site, "blog", &slugs).unwrap(), "b\na\n");

        let web = ListOptions {
            tag: Some(" WEB "),
            slugs_only: true,
        };
        assert_eq!(render(&site, "blog", &web).unwrap(), "b\n");
    }

    #[test]
    fn test_list_tags() {
        let (_tmp, site) = fixture();
        let out = render(&site, "tags", &ListOptions::default()).unwrap();
        assert!(out.contains("Blog tags (2):\n  rust (2)\n  web (1)\n"));
        assert!(out.contains("Notes tags (0):"));
    }

    #[test]
    fn test_unknown_type() {
        let (_tmp, site) = fixture();
        assert!(render(&site, "pages", &ListOptions::default()).is_err());
    }
}
