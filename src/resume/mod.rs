//! Resume data loaded from `content/resume/resume.yml`
//!
//! The file is read leniently: a missing or broken file yields the
//! placeholder resume, and malformed sections fall back field by field.

use anyhow::Result;
use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Contact and summary block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeBasics {
    pub name: String,
    pub title: String,
    pub email: String,
    pub location: String,
    pub summary: String,
}

impl Default for ResumeBasics {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            title: "Your Title".to_string(),
            email: "you@example.com".to_string(),
            location: "Your City".to_string(),
            summary: "A short personal summary.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeExperienceItem {
    pub company: String,
    pub role: String,
    pub start: String,
    pub end: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeEducationItem {
    pub school: String,
    pub degree: String,
    pub start: String,
    pub end: String,
}

/// Parsed resume
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeData {
    pub basics: ResumeBasics,
    pub experience: Vec<ResumeExperienceItem>,
    pub education: Vec<ResumeEducationItem>,
    pub skills: Vec<String>,
}

impl ResumeData {
    /// Load the resume, falling back to defaults on any error
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::debug!("No resume at {:?} ({}), using defaults", path, e);
                return Self::default();
            }
        };

        match Self::from_yaml_str(&source) {
            Ok(resume) => resume,
            Err(e) => {
                tracing::warn!("Failed to parse resume {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse resume YAML, tolerating missing or mistyped fields
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(source)?;

        Ok(Self {
            basics: parse_basics(root.get("basics")),
            experience: parse_rows(root.get("experience"), |row| ResumeExperienceItem {
                company: field(row, "company"),
                role: field(row, "role"),
                start: field(row, "start"),
                end: field(row, "end"),
                summary: field(row, "summary"),
            }),
            education: parse_rows(root.get("education"), |row| ResumeEducationItem {
                school: field(row, "school"),
                degree: field(row, "degree"),
                start: field(row, "start"),
                end: field(row, "end"),
            }),
            skills: parse_skills(root.get("skills")),
        })
    }
}

fn parse_basics(value: Option<&Value>) -> ResumeBasics {
    let defaults = ResumeBasics::default();
    let Some(basics) = value.filter(|v| v.is_mapping()) else {
        return defaults;
    };

    let pick = |key: &str, fallback: String| {
        basics
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback)
    };

    ResumeBasics {
        name: pick("name", defaults.name),
        title: pick("title", defaults.title),
        email: pick("email", defaults.email),
        location: pick("location", defaults.location),
        summary: pick("summary", defaults.summary),
    }
}

fn parse_rows<T>(value: Option<&Value>, build: impl Fn(Option<&Value>) -> T) -> Vec<T> {
    match value {
        Some(Value::Sequence(rows)) => rows
            .iter()
            .map(|row| build(Some(row).filter(|r| r.is_mapping())))
            .collect(),
        _ => Vec::new(),
    }
}

fn field(row: Option<&Value>, key: &str) -> String {
    row.and_then(|r| r.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_skills(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Sequence(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}
