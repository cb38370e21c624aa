//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::{Collection, ContentEntry, ContentLoader};
use crate::generator::Generator;
use crate::{Site, CONFIG_FILE};

/// Generate the static site
pub fn run(site: &Site) -> Result<()> {
    let start = Instant::now();

    let loader = site.loader();
    let blog = routable_entries(&loader, Collection::Blog)?;
    let notes = routable_entries(&loader, Collection::Notes)?;

    tracing::info!("Loaded {} posts and {} notes", blog.len(), notes.len());

    let generator = Generator::new(site)?;
    generator.generate(&blog, &notes)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Published entries that can be served at `/<collection>/<slug>/`
///
/// Each slug is resolved the way a request would be, so file names that
/// are not valid slugs are skipped and `<slug>.mdx` wins over `<slug>.md`.
pub fn routable_entries(
    loader: &ContentLoader,
    collection: Collection,
) -> Result<Vec<ContentEntry>> {
    let mut seen = HashSet::new();
    let mut routable = Vec::new();

    for entry in loader.entries(collection)? {
        if !seen.insert(entry.slug.clone()) {
            continue;
        }
        match loader.entry_by_slug(collection, &entry.slug) {
            Some(resolved) => routable.push(resolved),
            None => tracing::warn!(
                "Skipping {} entry {:?}: file name is not a valid slug",
                collection,
                entry.slug
            ),
        }
    }

    routable.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    Ok(routable)
}

/// Watch for file changes and regenerate
pub async fn watch(site: &Site) -> Result<()> {
    let site = site.clone();
    tokio::task::spawn_blocking(move || watch_blocking(site, |_| ControlFlow::Continue(())))
        .await?
}

/// Debounced watch loop shared by `generate --watch` and the dev server
///
/// Content changes and `_config.yml` edits trigger a reload of the site
/// followed by a full build. `on_rebuild` runs after every successful
/// build and can stop the loop by returning `ControlFlow::Break`.
pub fn watch_blocking<F>(mut site: Site, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&Site) -> ControlFlow<()>,
{
    let (tx, rx) = channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if site.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&site.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", site.content_dir);
    }

    // The base dir is watched instead of the config file so that editors
    // replacing the file on save are still seen
    debouncer
        .watcher()
        .watch(&site.base_dir, RecursiveMode::NonRecursive)?;
    tracing::debug!("Watching: {:?}", site.config_path());

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        let events = match rx.recv() {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
            Err(_) => break,
        };

        let relevant: Vec<_> = events
            .iter()
            .filter(|e| triggers_rebuild(&site, &e.path))
            .collect();
        if relevant.is_empty() {
            continue;
        }
        for event in &relevant {
            tracing::info!("File changed: {}", event.path.display());
        }

        match reload_and_run(&mut site) {
            Ok(()) => {
                tracing::info!("Regenerated successfully");
                if on_rebuild(&site).is_break() {
                    break;
                }
            }
            Err(e) => tracing::error!("Generation failed: {:#}", e),
        }
    }

    Ok(())
}

/// Whether a changed path should cause a rebuild
fn triggers_rebuild(site: &Site, path: &Path) -> bool {
    if !is_relevant(path) {
        return false;
    }
    if path.file_name() == Some(OsStr::new(CONFIG_FILE)) {
        return true;
    }
    // Some backends report canonical paths
    path.starts_with(&site.content_dir)
        || site
            .content_dir
            .canonicalize()
            .map(|dir| path.starts_with(dir))
            .unwrap_or(false)
}

/// Editor swap files and VCS noise do not trigger a rebuild
pub fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

/// Re-read `_config.yml` so config edits apply, then regenerate
pub fn reload_and_run(site: &mut Site) -> Result<()> {
    *site = Site::new(&site.base_dir)?;
    run(site)
}
