//! spacetraveling: a statically generated blog front-end backed by a
//! headless CMS
//!
//! Posts are fetched from a Prismic-compatible content API, reshaped into
//! view models and rendered with embedded Tera templates. The listing page
//! and the post pages are generated ahead of time and regenerated after
//! their revalidation window; unknown posts are generated on first request.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main blog application
#[derive(Clone, Debug)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new blog from a directory, reading `_config.yml` and the
    /// CMS environment overrides
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
