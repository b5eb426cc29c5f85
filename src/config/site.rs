//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `cms.endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable overriding `cms.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub logo: String,

    // Directory
    pub public_dir: String,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,

    // Regeneration windows
    #[serde(default)]
    pub revalidate: RevalidateConfig,

    /// Seconds before the loading page asks the browser to retry
    pub fallback_refresh: u64,

    // UI strings
    #[serde(default)]
    pub strings: StringsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: String::new(),
            logo: "/logo.svg".to_string(),

            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
            revalidate: RevalidateConfig::default(),
            fallback_refresh: 1,
            strings: StringsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply CMS endpoint/credential overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_ENDPOINT).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        );
    }

    /// Apply CMS endpoint/credential overrides; empty values are ignored
    pub fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("CMS endpoint overridden from environment");
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            self.cms.access_token = Some(token);
        }
    }

    /// Resolve the configured timezone, falling back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                chrono_tz::UTC
            }
        }
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type of blog post documents
    pub post_type: String,
    /// Page size of the first listing page
    pub page_size: usize,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            post_type: "posts".to_string(),
            page_size: 1,
        }
    }
}

/// Regeneration windows, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidateConfig {
    pub index: u64,
    pub post: u64,
    /// Wait before retrying a post page whose generation failed
    pub error: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            index: 60 * 60,
            post: 60 * 30,
            error: 60,
        }
    }
}

/// Text shown by the page templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StringsConfig {
    pub load_more: String,
    pub loading: String,
    pub home_title: String,
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            load_more: "Carregar mais posts".to_string(),
            loading: "Carregando...".to_string(),
            home_title: "Home".to_string(),
        }
    }
}
