//! List site content

use anyhow::Result;
use walkdir::WalkDir;

use crate::cache::{self, CacheDb, Freshness};
use crate::cms::CmsClient;
use crate::content::Listing;
use crate::helpers::{format_publication_date, Locale};
use crate::Blog;

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => list_posts(blog).await,
        "route" | "routes" => {
            for (route, freshness) in generated_routes(blog) {
                println!("  {} [{:?}]", route, freshness);
            }
            Ok(())
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, route",
                content_type
            );
        }
    }
}

/// Page through every post with the same cursor the listing page uses
async fn list_posts(blog: &Blog) -> Result<()> {
    let client = CmsClient::from_config(&blog.config.cms)?;
    let mut listing = Listing::fetch_first(&client, &blog.config.cms).await?;
    while listing.has_more() {
        listing.load_more(&client).await?;
    }

    let locale = Locale::from_tag(&blog.config.language);
    let tz = blog.config.tz();
    println!("Posts ({}):", listing.posts().len());
    for post in listing.posts() {
        println!(
            "  {} - {} [{}]",
            format_publication_date(post.first_publication_date.as_deref(), locale, &tz),
            post.data.title,
            post.uid.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Routes with a generated page on disk, sorted
pub fn generated_routes(blog: &Blog) -> Vec<(String, Freshness)> {
    let cache = CacheDb::load(&blog.base_dir);
    let now = cache::now();

    let mut routes: Vec<(String, Freshness)> = WalkDir::new(&blog.public_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
        .filter_map(|e| {
            let relative = e.path().strip_prefix(&blog.public_dir).ok()?;
            let dir = relative.parent()?.to_string_lossy().replace('\\', "/");
            let route = format!("/{}", dir);
            let window = cache::revalidate_window(&route, &blog.config.revalidate);
            let freshness = cache.freshness(&route, window, now);
            Some((route, freshness))
        })
        .collect();

    routes.sort_by(|a, b| a.0.cmp(&b.0));
    routes
}
