//! CLI entry point for spacetraveling

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A statically generated blog front-end backed by a headless CMS", long_about = None)]
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
    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Serve the site, generating and revalidating pages on demand
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Clean the public folder and cache
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, route)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
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
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Generate => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;

            if !blog.public_dir.join("index.html").exists() {
                tracing::info!("Nothing generated yet, generating static files...");
                blog.generate().await?;
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&blog, &ip, port, open).await?;
        }

        Commands::Clean => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            spacetraveling::commands::list::run(&blog, &r#type).await?;
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
