//! Initialize a new site

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
name: Theseus
description: A minimal personal site for blog posts, study notes, and resume.
intro: Hi, I am Theseus. This site records my ideas, study notes, and my resume.
author: Theseus
language: en

# URL
url: http://example.com
root: /

# Directory
content_dir: content
public_dir: public

# Writing
date_format: "%b %d, %Y"
feed_limit: 20
highlight:
  theme: base16-ocean.dark
  line_number: false
"#;

const SAMPLE_RESUME: &str = r#"basics:
  name: Your Name
  title: Your Title
  email: you@example.com
  location: Your City
  summary: A short personal summary.
experience:
  - company: Example Co.
    role: Software Engineer
    start: "2022"
    end: Present
    summary: Built and maintained internal tools.
education:
  - school: Example University
    degree: B.Sc. Computer Science
    start: "2018"
    end: "2022"
skills:
  - Rust
  - Writing
"#;

/// Initialize a new site in the given directory
///
/// Existing files are left untouched, so running it on a populated site
/// only fills in what is missing. Returns the files that were written.
pub fn init_site(target_dir: &Path) -> Result<Vec<PathBuf>> {
    for dir in ["content/blog", "content/notes", "content/resume", "content/static"] {
        let path = target_dir.join(dir);
        fs::create_dir_all(&path).with_context(|| format!("Failed to create {:?}", path))?;
    }

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
tags: [meta]
summary: The first post on this site.
---

Welcome! This post lives in `content/blog/hello-world.md`.

## Writing

```bash
$ theseus new "My New Post" --to blog
```

New entries start as drafts. Set `draft: false` to publish them.

<Callout type="info" title="Tip">
Use `theseus import --file <path> --to notes` to bring in existing markdown.
</Callout>

## Preview

```bash
$ theseus server
```
"#,
        today
    );

    let files = [
        (CONFIG_FILE, DEFAULT_CONFIG.to_string()),
        ("content/resume/resume.yml", SAMPLE_RESUME.to_string()),
        ("content/blog/hello-world.md", sample_post),
    ];

    let mut written = Vec::new();
    for (relative, content) in files {
        let path = target_dir.join(relative);
        if path.exists() {
            tracing::info!("Skipped existing {:?}", path);
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Collection;
    use crate::resume::ResumeData;
    use crate::Site;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_a_working_site() {
        let tmp = TempDir::new().unwrap();
        let written = init_site(tmp.path()).unwrap();
        assert_eq!(written.len(), 3);

        let site = Site::new(tmp.path()).unwrap();
        assert_eq!(site.config.name, "Theseus");
        assert_eq!(site.config.date_format, "%b %d, %Y");
        assert!(site.content_dir.join("notes").is_dir());
        assert!(site.content_dir.join("static").is_dir());

        let posts = site.loader().entries(Collection::Blog).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello-world");
        assert_eq!(posts[0].tags, vec!["meta"]);

        let resume = ResumeData::load(site.content_dir.join("resume/resume.yml"));
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.skills, vec!["Rust", "Writing"]);
    }

    #[test]
    fn test_init_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "name: Mine\n").unwrap();

        let written = init_site(tmp.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap(),
            "name: Mine\n"
        );

        assert!(init_site(tmp.path()).unwrap().is_empty());
    }
}
