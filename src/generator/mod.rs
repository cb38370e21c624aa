//! Generator module - renders the site to static HTML files

use anyhow::{Context as _, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::loader::{collect_tags, is_markdown};
use crate::content::{normalize_tag, plain_text, Collection, ContentEntry, MarkdownRenderer};
use crate::helpers::{
    date_xml, escape_xml, format_date, full_url_for, strip_invalid_xml_chars,
};
use crate::preferences::{self, PreferenceData};
use crate::resume::ResumeData;
use crate::templates::{EntryData, ListingData, SiteData, TagLink, TemplateRenderer, SITE_CSS};
use crate::Site;

/// Directory under `content/` copied verbatim to the output root
const STATIC_DIR: &str = "static";

/// Resume sources under `content/`
const RESUME_DIR: &str = "resume";
const RESUME_FILE: &str = "resume.yml";
const RESUME_PDF: &str = "resume.pdf";

/// Length of the feed summary derived from a post body
const FEED_EXCERPT_CHARS: usize = 200;

/// A blog tag page: every published post carrying one normalized tag
#[derive(Debug, Clone)]
pub struct TagPage<'a> {
    /// First spelling seen
    pub name: String,
    /// Output directory name under `blog/tags/`
    pub segment: String,
    pub entries: Vec<&'a ContentEntry>,
}

impl TagPage<'_> {
    pub fn path(&self) -> String {
        format!("/{}/tags/{}/", Collection::Blog.dir_name(), self.segment)
    }
}

/// Group entries into tag pages with unique, URL-safe segments
pub fn build_tag_pages(entries: &[ContentEntry]) -> Vec<TagPage<'_>> {
    let mut used = HashSet::new();
    let mut pages = Vec::new();

    for tag in collect_tags(entries) {
        let base = match slug::slugify(&tag.name) {
            s if s.is_empty() => "tag".to_string(),
            s => s,
        };
        let mut segment = base.clone();
        let mut n = 2;
        while !used.insert(segment.clone()) {
            segment = format!("{}-{}", base, n);
            n += 1;
        }

        let tagged = entries.iter().filter(|e| e.has_tag(&tag.name)).collect();
        pages.push(TagPage {
            name: tag.name,
            segment,
            entries: tagged,
        });
    }

    pages
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
    prefs: PreferenceData,
    init_script: String,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config)?;
        let markdown = MarkdownRenderer::with_options(
            &site.config.highlight.theme,
            site.config.highlight.line_number,
        );

        Ok(Self {
            site: site.clone(),
            renderer,
            markdown,
            prefs: PreferenceData::default(),
            init_script: preferences::init_script(),
        })
    }

    /// Generate the entire site
    pub fn generate(&self, blog: &[ContentEntry], notes: &[ContentEntry]) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir).with_context(|| {
            format!("Failed to create output dir {:?}", self.site.public_dir)
        })?;

        self.write_assets()?;
        self.copy_static_files()?;

        let site_data = self.build_site_data();

        let tag_pages = build_tag_pages(blog);
        let tag_paths: HashMap<String, String> = tag_pages
            .iter()
            .map(|page| (normalize_tag(&page.name), page.path()))
            .collect();

        self.generate_home(&site_data)?;

        self.generate_listing(Collection::Blog, blog, Some(&tag_paths), &site_data)?;
        self.generate_entry_pages(blog, Some(&tag_paths), &site_data)?;
        self.generate_tag_pages(&tag_pages, &tag_paths, &site_data)?;

        self.generate_listing(Collection::Notes, notes, None, &site_data)?;
        self.generate_entry_pages(notes, None, &site_data)?;

        self.generate_resume(&site_data)?;
        self.generate_not_found(&site_data)?;
        self.generate_atom_feed(blog)?;

        tracing::info!(
            "Generated {} posts, {} notes, {} tag pages",
            blog.len(),
            notes.len(),
            tag_pages.len()
        );

        Ok(())
    }

    /// Build site data for templates
    fn build_site_data(&self) -> SiteData {
        let config = &self.site.config;
        SiteData {
            name: config.name.clone(),
            description: config.description.clone(),
            intro: config.intro.clone(),
            language: config.language.clone(),
            nav: config.nav.clone(),
            sections: config.sections.clone(),
            year: chrono::Local::now().format("%Y").to_string(),
        }
    }

    /// Create a base context with common variables
    fn create_base_context(&self, site_data: &SiteData) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("prefs", &self.prefs);
        context.insert("init_script", &self.init_script);
        context
    }

    fn entry_data(
        &self,
        entry: &ContentEntry,
        tag_paths: Option<&HashMap<String, String>>,
    ) -> EntryData {
        let tags = entry
            .tags
            .iter()
            .map(|tag| TagLink {
                name: tag.clone(),
                path: tag_paths.and_then(|paths| paths.get(&normalize_tag(tag)).cloned()),
            })
            .collect();

        EntryData {
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            date: format_date(&entry.date, &self.site.config.date_format),
            iso_date: entry.date.format("%Y-%m-%d").to_string(),
            path: entry.path(),
            summary: entry.summary.clone(),
            tags,
        }
    }

    /// Generate the home page
    fn generate_home(&self, site_data: &SiteData) -> Result<()> {
        let context = self.create_base_context(site_data);
        let html = self.renderer.render("home.html", &context)?;
        self.write_output("index.html", &html)
    }

    /// Generate a collection listing, newest first
    fn generate_listing(
        &self,
        collection: Collection,
        entries: &[ContentEntry],
        tag_paths: Option<&HashMap<String, String>>,
        site_data: &SiteData,
    ) -> Result<()> {
        let listing = match collection {
            Collection::Blog => ListingData {
                heading: "Blog".to_string(),
                subtitle: "Posts sorted by date (newest first).".to_string(),
                empty_message: "No posts yet.".to_string(),
            },
            Collection::Notes => ListingData {
                heading: "Notes".to_string(),
                subtitle: "Short notes sorted by date (newest first).".to_string(),
                empty_message: "No notes yet.".to_string(),
            },
        };
        let description = match collection {
            Collection::Blog => "Thoughts and long-form writing.",
            Collection::Notes => "Study notes and concise knowledge records.",
        };

        let entry_data: Vec<EntryData> = entries
            .iter()
            .map(|e| self.entry_data(e, tag_paths))
            .collect();

        let mut context = self.create_base_context(site_data);
        context.insert("page_title", collection.label());
        context.insert("description", description);
        context.insert("listing", &listing);
        context.insert("entries", &entry_data);

        let html = self.renderer.render("listing.html", &context)?;
        self.write_output(&format!("{}/index.html", collection.dir_name()), &html)
    }

    /// Generate one page per entry
    fn generate_entry_pages(
        &self,
        entries: &[ContentEntry],
        tag_paths: Option<&HashMap<String, String>>,
        site_data: &SiteData,
    ) -> Result<()> {
        for entry in entries {
            let data = self.entry_data(entry, tag_paths);
            let description = match entry.collection {
                Collection::Blog => format!("Blog post: {}", entry.title),
                Collection::Notes => format!("Note: {}", entry.title),
            };

            let mut context = self.create_base_context(site_data);
            context.insert("page_title", &entry.title);
            context.insert("description", &description);
            context.insert("entry", &data);
            context.insert("entry_content", &self.markdown.render(&entry.body));

            let html = self.renderer.render("entry.html", &context)?;
            self.write_output(&format!("{}index.html", data.path.trim_start_matches('/')), &html)?;
            tracing::debug!("Generated {}: {}", entry.collection, entry.slug);
        }

        Ok(())
    }

    /// Generate blog tag pages
    fn generate_tag_pages(
        &self,
        tag_pages: &[TagPage<'_>],
        tag_paths: &HashMap<String, String>,
        site_data: &SiteData,
    ) -> Result<()> {
        for page in tag_pages {
            let entries: Vec<EntryData> = page
                .entries
                .iter()
                .map(|e| self.entry_data(e, Some(tag_paths)))
                .collect();

            let path = page.path();
            let mut context = self.create_base_context(site_data);
            context.insert("page_title", &format!("Tag: {}", page.name));
            context.insert(
                "description",
                &format!("Blog posts tagged with \"{}\".", page.name),
            );
            context.insert("tag_name", &page.name);
            context.insert("entries", &entries);

            let html = self.renderer.render("tag.html", &context)?;
            self.write_output(&format!("{}index.html", path.trim_start_matches('/')), &html)?;
        }

        Ok(())
    }

    /// Generate the resume page, publishing the PDF when one exists
    fn generate_resume(&self, site_data: &SiteData) -> Result<()> {
        let resume_dir = self.site.content_dir.join(RESUME_DIR);
        let resume = ResumeData::load(resume_dir.join(RESUME_FILE));

        let pdf_source = resume_dir.join(RESUME_PDF);
        let resume_pdf = if pdf_source.is_file() {
            let dest = self.site.public_dir.join(RESUME_DIR).join(RESUME_PDF);
            copy_file(&pdf_source, &dest)?;
            Some(format!("/{}/{}", RESUME_DIR, RESUME_PDF))
        } else {
            None
        };

        let mut context = self.create_base_context(site_data);
        context.insert("page_title", "Resume");
        context.insert("description", &format!("Resume of {}.", resume.basics.name));
        context.insert("resume", &resume);
        context.insert("resume_pdf", &resume_pdf);

        let html = self.renderer.render("resume.html", &context)?;
        self.write_output(&format!("{}/index.html", RESUME_DIR), &html)
    }

    /// Generate the not-found page
    fn generate_not_found(&self, site_data: &SiteData) -> Result<()> {
        let mut context = self.create_base_context(site_data);
        context.insert("page_title", "Not Found");
        context.insert("description", "The requested page does not exist.");
        let html = self.renderer.render("404.html", &context)?;
        self.write_output("404.html", &html)
    }

    /// Generate Atom feed of recent blog posts
    fn generate_atom_feed(&self, posts: &[ContentEntry]) -> Result<()> {
        let config = &self.site.config;
        let home = full_url_for(config, "/");

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.name)));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, "/atom.xml")
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", home));
        let updated = posts
            .first()
            .map(|p| date_xml(&p.date))
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", home));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in posts.iter().take(config.feed_limit) {
            let url = full_url_for(config, &post.path());
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
            feed.push_str(&format!("    <id>{}</id>\n", url));
            feed.push_str(&format!("    <updated>{}</updated>\n", date_xml(&post.date)));
            for tag in &post.tags {
                feed.push_str(&format!("    <category term=\"{}\"/>\n", escape_xml(tag)));
            }
            let content = strip_invalid_xml_chars(&self.markdown.render(&post.body));
            let summary = if post.summary.is_empty() {
                excerpt(&plain_text(&post.body), FEED_EXCERPT_CHARS)
            } else {
                post.summary.clone()
            };
            if !summary.is_empty() {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(&strip_invalid_xml_chars(&summary))
                ));
            }
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content.replace("]]>", "]]]]><![CDATA[>")
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        self.write_output("atom.xml", &feed)?;
        tracing::info!("Generated atom.xml");
        Ok(())
    }

    /// Write the stylesheet and the preference widget script
    fn write_assets(&self) -> Result<()> {
        self.write_output("css/site.css", SITE_CSS)?;

        let mut context = Context::new();
        context.insert("prefs", &self.prefs);
        let script = self.renderer.render("ui.js", &context)?;
        self.write_output("js/ui.js", &script)
    }

    /// Copy `content/static/**` to the output root
    fn copy_static_files(&self) -> Result<()> {
        let static_dir = self.site.content_dir.join(STATIC_DIR);
        if !static_dir.is_dir() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(&static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            // Markdown sources are content, not assets
            if !entry.file_type().is_file() || is_markdown(path) {
                continue;
            }
            let relative = path.strip_prefix(&static_dir)?;
            copy_file(path, &self.site.public_dir.join(relative))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(())
    }

    /// Write a file relative to the public directory
    fn write_output(&self, relative: &str, contents: &str) -> Result<()> {
        let output_path = self.site.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, contents)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

/// Collapse whitespace and cut to `max` characters
fn excerpt(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}
