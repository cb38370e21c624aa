//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{NavItem, SectionItem, SiteConfig};
use crate::helpers::url_for;

/// Stylesheet written to `css/site.css`
pub const SITE_CSS: &str = include_str!("site/assets/site.css");

/// Template renderer with the embedded site layout
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // User text is escaped explicitly with `| escape`; rendered
        // markdown and generated paths go through untouched
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("base.html", include_str!("site/base.html")),
            ("home.html", include_str!("site/home.html")),
            ("listing.html", include_str!("site/listing.html")),
            ("entry.html", include_str!("site/entry.html")),
            ("tag.html", include_str!("site/tag.html")),
            ("resume.html", include_str!("site/resume.html")),
            ("404.html", include_str!("site/404.html")),
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/entry_list.html",
                include_str!("site/partials/entry_list.html"),
            ),
            (
                "partials/tag_list.html",
                include_str!("site/partials/tag_list.html"),
            ),
            ("ui.js", include_str!("site/assets/ui.js")),
        ])?;

        let config = config.clone();
        tera.register_filter(
            "url",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("url", "value", String, value);
                Ok(tera::Value::String(prefix_root(&config, &path)))
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Prefix a site-relative path with the configured root
fn prefix_root(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        path.to_string()
    } else {
        url_for(config, path)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub name: String,
    pub description: String,
    pub intro: String,
    pub language: String,
    pub nav: Vec<NavItem>,
    pub sections: Vec<SectionItem>,
    pub year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub slug: String,
    pub title: String,
    /// Date formatted for display
    pub date: String,
    /// Machine readable date for `<time datetime>`
    pub iso_date: String,
    pub path: String,
    pub summary: String,
    pub tags: Vec<TagLink>,
}

/// A tag label, linked when the collection has tag pages
#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub heading: String,
    pub subtitle: String,
    pub empty_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_root() {
        let config = SiteConfig::default();
        assert_eq!(prefix_root(&config, "/blog/"), "/blog/");
        assert_eq!(prefix_root(&config, "/"), "/");
        assert_eq!(
            prefix_root(&config, "https://example.com/x"),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_url_filter_uses_root() {
        let config = SiteConfig {
            root: "/site/".to_string(),
            ..SiteConfig::default()
        };
        let mut renderer = TemplateRenderer::new(&config).unwrap();
        let mut context = Context::new();
        context.insert("path", "/notes/");
        let out = renderer
            .tera
            .render_str("{{ path | url }}", &context)
            .unwrap();
        assert_eq!(out, "/site/notes/");
    }
}
