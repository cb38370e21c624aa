//! CLI entry point for theseus

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use theseus::commands::import::{self, ImportOptions};
use theseus::commands::list::ListOptions;
use theseus::content::Collection;
use theseus::Site;

#[derive(Parser)]
#[command(name = "theseus")]
#[command(version)]
#[command(about = "A static generator for a personal site: blog, notes and resume", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new draft post or note
    New {
        /// Title of the new entry
        title: String,

        /// Collection to create it in (blog, notes)
        #[arg(short, long, default_value = "blog")]
        to: Collection,

        /// Slug for the file name (derived from the title by default)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Import a markdown file into a collection
    Import {
        /// Markdown file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Target collection (blog, notes, posts)
        #[arg(short, long)]
        to: String,

        /// Slug for the imported entry (defaults to the file name)
        #[arg(short, long)]
        slug: Option<String>,

        /// Overwrite an existing entry
        #[arg(long)]
        force: bool,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site content
    List {
        /// Type of content to list (blog, notes, tags)
        #[arg(default_value = "blog")]
        r#type: String,

        /// Only entries with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Print slugs only
        #[arg(long)]
        slugs: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "theseus=debug,info"
    } else {
        "theseus=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            let written = theseus::commands::init::init_site(&target_dir)?;
            for path in &written {
                println!("Created: {}", path.display());
            }
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, to, slug } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Creating new {} entry: {}", to, title);
            let path = theseus::commands::new::run(&site, &title, to, slug.as_deref())?;
            println!("Created: {}", path.display());
        }

        Commands::Import {
            file,
            to,
            slug,
            force,
        } => {
            let site = Site::new(&base_dir)?;
            let options = ImportOptions {
                file: &file,
                to: &to,
                slug: slug.as_deref(),
                force,
            };
            match import::run(&site, &options) {
                Ok(report) => {
                    if report.generated_slug {
                        println!("Auto-generated slug for non-ASCII filename: {}", report.slug);
                    }
                    println!("Imported: {}", report.source.display());
                    println!("To: {}", report.target.display());
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Generate { watch } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Generating static files...");

            site.generate()?;
            println!("Generated successfully!");

            if watch {
                tracing::info!("Watching for file changes...");
                theseus::commands::generate::watch(&site).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = Site::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            site.generate()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            theseus::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            r#type,
            tag,
            slugs,
        } => {
            let site = Site::new(&base_dir)?;
            let options = ListOptions {
                tag: tag.as_deref(),
                slugs_only: slugs,
            };
            theseus::commands::list::run(&site, &r#type, &options)?;
        }

        Commands::Version => {
            println!("theseus version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
