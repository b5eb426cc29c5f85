//! Generator module - renders CMS content to static HTML files

use anyhow::{Context as _, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::PathBuf;

use tera::Context;

use crate::cms::{CmsClient, Predicate, QueryOptions};
use crate::content::{Listing, Post, PostPagination};
use crate::helpers::Locale;
use crate::templates::{ConfigData, PostPageData, TemplateRenderer, ASSETS};
use crate::Blog;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Largest page the CMS serves in one response
pub const MAX_PAGE_SIZE: usize = 100;

/// Whether `slug` can name a post route
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Route of the post page for `uid`
pub fn post_route(uid: &str) -> String {
    format!("/post/{}", uid)
}

/// Output file of `route`, relative to the public directory
pub fn relative_output(route: &str) -> String {
    let clean = route.trim_matches('/');
    if clean.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", clean)
    }
}

/// Static site generator backed by the CMS
pub struct Generator {
    blog: Blog,
    client: CmsClient,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a generator talking to the configured CMS
    pub fn new(blog: &Blog) -> Result<Self> {
        let client = CmsClient::from_config(&blog.config.cms)?;
        Self::with_client(blog, client)
    }

    /// Create a generator with an existing client
    pub fn with_client(blog: &Blog, client: CmsClient) -> Result<Self> {
        let renderer = TemplateRenderer::new(&blog.config)?;
        Ok(Self {
            blog: blog.clone(),
            client,
            renderer,
        })
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    /// Generate the whole site: assets, the listing page and every known
    /// post. Returns the generated routes.
    pub async fn generate(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.blog.public_dir)?;
        self.write_assets()?;

        let mut routes = vec![self.generate_index().await?];

        let uids = self.known_post_uids().await?;
        tracing::info!("Found {} posts", uids.len());
        for uid in uids {
            routes.push(self.generate_post(&uid).await?);
        }

        Ok(routes)
    }

    /// Write the embedded static assets
    pub fn write_assets(&self) -> Result<()> {
        fs::create_dir_all(&self.blog.public_dir)?;
        for (name, body) in ASSETS {
            let path = self.blog.public_dir.join(name);
            fs::write(&path, body)
                .with_context(|| format!("Failed to write asset {:?}", path))?;
        }
        Ok(())
    }

    /// Generate the listing page from the first page of posts
    pub async fn generate_index(&self) -> Result<String> {
        let listing = Listing::fetch_first(&self.client, &self.blog.config.cms).await?;
        tracing::debug!(
            "Listing has {} posts, more: {}",
            listing.posts().len(),
            listing.has_more()
        );
        let html = self.render_index(&listing.into_pagination())?;
        let route = "/".to_string();
        self.write_route(&route, &html)?;
        tracing::info!("Generated listing page");
        Ok(route)
    }

    /// Generate the page of a single post
    pub async fn generate_post(&self, uid: &str) -> Result<String> {
        if !is_valid_slug(uid) {
            anyhow::bail!("Refusing to generate post with uid {:?}", uid);
        }
        let doc = self
            .client
            .get_by_uid(&self.blog.config.cms.post_type, uid)
            .await?;
        let post = Post::from_document(doc)
            .with_context(|| format!("Malformed post document {:?}", uid))?;
        let html = self.render_post(&post)?;
        let route = post_route(uid);
        self.write_route(&route, &html)?;
        tracing::debug!("Generated post: {}", route);
        Ok(route)
    }

    /// Uids of every post, following the result pages to the end
    pub async fn known_post_uids(&self) -> Result<Vec<String>> {
        let mut response = self
            .client
            .query(
                &[Predicate::document_type(&self.blog.config.cms.post_type)],
                &QueryOptions::page_size(MAX_PAGE_SIZE),
            )
            .await?;

        let mut uids = Vec::new();
        loop {
            for doc in response.results.drain(..) {
                match doc.uid {
                    Some(uid) if is_valid_slug(&uid) => uids.push(uid),
                    Some(uid) => tracing::warn!("Skipping post with unusable uid {:?}", uid),
                    None => tracing::warn!("Skipping post {} without uid", doc.id),
                }
            }
            match response.next_page.take().filter(|p| !p.trim().is_empty()) {
                Some(next) => response = self.client.fetch_page(&next).await?,
                None => break,
            }
        }

        Ok(uids)
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&self.blog.config));
        context
    }

    pub fn render_index(&self, pagination: &PostPagination) -> Result<String> {
        let locale = Locale::from_tag(&self.blog.config.language);
        let mut context = self.create_base_context();
        context.insert("posts", &pagination.results);
        context.insert("next_page", &pagination.next_page);
        context.insert("months", &locale.months());
        self.renderer.render("index.html", &context)
    }

    pub fn render_post(&self, post: &Post) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("post", &PostPageData::from(post));
        self.renderer.render("post.html", &context)
    }

    /// Placeholder shown while a page is generated on demand
    pub fn render_fallback(&self) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("refresh", &self.blog.config.fallback_refresh);
        self.renderer.render("fallback.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer
            .render("not_found.html", &self.create_base_context())
    }

    /// Absolute output file of `route`
    pub fn output_path(&self, route: &str) -> PathBuf {
        self.blog.public_dir.join(relative_output(route))
    }

    fn write_route(&self, route: &str, html: &str) -> Result<()> {
        let output_path = self.output_path(route);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        // Readers only ever see complete pages
        let tmp_path = output_path.with_extension("html.tmp");
        fs::write(&tmp_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", tmp_path, e))?;
        fs::rename(&tmp_path, &output_path)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{PostSummary, SummaryData};

    fn generator(dir: &std::path::Path) -> Generator {
        let mut config = SiteConfig::default();
        config.cms.endpoint = "http://127.0.0.1:9/api/v2".to_string();
        let blog = Blog::with_config(dir, config);
        Generator::new(&blog).unwrap()
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: Some(uid.to_string()),
            first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            data: SummaryData {
                title: format!("Title {}", uid),
                subtitle: "Sub".to_string(),
                author: "Joseph".to_string(),
            },
        }
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("como-utilizar-hooks"));
        assert!(is_valid_slug("post_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../etc"));
        assert!(!is_valid_slug("a b"));
    }

    #[test]
    fn test_relative_output() {
        assert_eq!(relative_output("/"), "index.html");
        assert_eq!(relative_output("/post/hooks"), "post/hooks/index.html");
    }

    #[test]
    fn test_index_shows_load_more_only_with_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(dir.path());

        let with_cursor = PostPagination {
            next_page: Some("https://cms.example/api/v2/documents/search?page=2&pageSize=1".to_string()),
            results: vec![summary("a")],
        };
        let html = generator.render_index(&with_cursor).unwrap();
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("data-next-page="));
        assert!(html.contains(r#"data-timezone="UTC""#));
        assert!(html.contains("load-more.js"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains(r#"href="/post/a""#));

        let without_cursor = PostPagination {
            next_page: None,
            results: vec![summary("a"), summary("b")],
        };
        let html = generator.render_index(&without_cursor).unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(!html.contains("load-more.js"));
        assert!(html.find("Title a").unwrap() < html.find("Title b").unwrap());
    }

    #[test]
    fn test_write_assets() {
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(dir.path());
        generator.write_assets().unwrap();
        assert!(dir.path().join("public/styles.css").exists());
        assert!(dir.path().join("public/load-more.js").exists());
    }
}
