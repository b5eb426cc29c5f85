//! Generate static files

use anyhow::Result;

use crate::cache::{self, CacheDb};
use crate::generator::{relative_output, Generator};
use crate::Blog;

/// Generate the static site and record every route in the cache
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let routes = generator.generate().await?;

    let mut cache = CacheDb::load(&blog.base_dir);
    let now = cache::now();
    for route in &routes {
        cache.record(route, &relative_output(route), now);
    }
    cache.save(&blog.base_dir)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages in {:.2}s",
        routes.len(),
        duration.as_secs_f64()
    );

    Ok(())
}
