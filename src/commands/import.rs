//! Import an external markdown file into a collection

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::content::{parse_date_string, Collection, FrontMatter};
use crate::Site;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref FIRST_HEADING: Regex = Regex::new(r"(?m)^#\s+(.+)$").unwrap();
}

/// Import failures reported to the user
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unknown collection: {0}. Available: blog, notes, posts")]
    UnknownCollection(String),

    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Invalid slug. Please provide --slug.")]
    InvalidSlug,

    #[error("Target exists: {}\nUse --force to overwrite.", .0.display())]
    TargetExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Arguments of `import`
#[derive(Debug, Clone)]
pub struct ImportOptions<'a> {
    pub file: &'a Path,
    /// `blog`, `notes`, or `posts`
    pub to: &'a str,
    pub slug: Option<&'a str>,
    pub force: bool,
}

/// What an import wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub slug: String,
    /// The slug was derived from a hash because the name had no ASCII letters or digits
    pub generated_slug: bool,
}

/// Import a file dated against the local calendar
pub fn run(site: &Site, options: &ImportOptions<'_>) -> Result<ImportReport, ImportError> {
    import_file(site, options, chrono::Local::now().date_naive())
}

/// Import a file, using `today` when the source has no usable date
pub fn import_file(
    site: &Site,
    options: &ImportOptions<'_>,
    today: NaiveDate,
) -> Result<ImportReport, ImportError> {
    let collection = Collection::from_alias(options.to)
        .ok_or_else(|| ImportError::UnknownCollection(options.to.to_string()))?;

    let source = fs::read_to_string(options.file)
        .map_err(|_| ImportError::SourceNotFound(options.file.to_path_buf()))?;

    let file_stem = options
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let raw_slug = options
        .slug
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(file_stem.as_str());

    let mut slug = import_slugify(raw_slug);
    let mut generated_slug = false;
    if slug.is_empty() {
        slug = format!("{}-{}", collection, fnv1a_base36(&file_stem));
        generated_slug = true;
    }
    if slug.is_empty() {
        return Err(ImportError::InvalidSlug);
    }

    let (front_matter, body) = FrontMatter::parse(&source);

    let title = front_matter
        .non_blank_title()
        .map(|t| t.trim().to_string())
        .or_else(|| extract_title(body))
        .unwrap_or_else(|| file_stem.clone());
    let date = resolve_date(front_matter.date.as_deref(), today);
    let draft = resolve_draft(
        FrontMatter::raw_mapping(&source)
            .as_ref()
            .and_then(|fm| fm.get("draft")),
    );

    let out_dir = site.content_dir.join(collection.dir_name());
    fs::create_dir_all(&out_dir)?;
    let target = out_dir.join(format!("{}.mdx", slug));

    if target.exists() && !options.force {
        return Err(ImportError::TargetExists(target));
    }

    let output = format!(
        "{}{}\n",
        build_frontmatter(&title, &date, &front_matter.tags, draft),
        body.trim_start()
    );
    fs::write(&target, output)?;

    tracing::debug!("Imported {:?} as {}/{}", options.file, collection, slug);

    Ok(ImportReport {
        source: options.file.to_path_buf(),
        target,
        slug,
        generated_slug,
    })
}

/// ASCII-only slug: lowercase, runs of anything else become `-`
pub fn import_slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(lowered.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// 32-bit FNV-1a over the code points of `input`, in base 36
pub fn fnv1a_base36(input: &str) -> String {
    let mut hash: u32 = 2166136261;
    for ch in input.chars() {
        hash ^= ch as u32;
        hash = hash.wrapping_mul(16777619);
    }
    to_base36(hash)
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// First 10 characters of a parseable date, else `today`
pub fn resolve_date(value: Option<&str>, today: NaiveDate) -> String {
    match value {
        Some(s) if parse_date_string(s).is_some() => s.trim().chars().take(10).collect(),
        _ => today.format("%Y-%m-%d").to_string(),
    }
}

/// Only a boolean or the string `true` (any case) marks an import as a draft
pub fn resolve_draft(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Text of the first level-one ATX heading
pub fn extract_title(body: &str) -> Option<String> {
    FIRST_HEADING
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Double-quoted YAML scalar
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Normalized front-matter block, including the closing delimiter line
pub fn build_frontmatter(title: &str, date: &str, tags: &[String], draft: bool) -> String {
    let tags = tags
        .iter()
        .map(|tag| quote(tag))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "---\ntitle: {}\ndate: {}\ntags: [{}]\ndraft: {}\n---\n",
        quote(title),
        quote(date),
        tags,
        draft
    )
}
