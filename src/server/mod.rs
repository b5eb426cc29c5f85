//! HTTP server with on-demand generation and periodic revalidation
//!
//! Pages are served from the public directory. A page older than its
//! revalidation window is still served, and regenerated in the background.
//! A post that was never generated is generated on first request while the
//! visitor gets a loading placeholder that refreshes itself. A post the CMS
//! does not have is a 404 until the post window passes; a post whose
//! generation failed is a 500 until the error window passes.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{self, CacheDb, Freshness};
use crate::cms::CmsError;
use crate::generator::{is_valid_slug, post_route, relative_output, Generator};
use crate::Blog;

/// Upper bound on remembered generation failures
const MAX_FAILURES: usize = 1024;

/// Why the last generation of a route produced no page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    /// The CMS has no such document
    Missing,
    Error,
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    kind: FailureKind,
    at: i64,
}

/// Server state
pub struct ServerState {
    generator: Generator,
    cache: RwLock<CacheDb>,
    /// Routes currently being generated
    in_flight: Mutex<HashSet<String>>,
    /// Last failed generation per route
    failures: RwLock<HashMap<String, Failure>>,
}

impl ServerState {
    pub fn new(generator: Generator) -> Arc<Self> {
        let cache = CacheDb::load(&generator.blog().base_dir);
        Arc::new(Self {
            generator,
            cache: RwLock::new(cache),
            in_flight: Mutex::new(HashSet::new()),
            failures: RwLock::new(HashMap::new()),
        })
    }

    fn blog(&self) -> &Blog {
        self.generator.blog()
    }

    async fn freshness(&self, route: &str) -> Freshness {
        let window = cache::revalidate_window(route, &self.blog().config.revalidate);
        self.cache.read().await.freshness(route, window, cache::now())
    }

    /// Mark `route` as being generated. Returns false if it already is.
    async fn begin(&self, route: &str) -> bool {
        self.in_flight.lock().await.insert(route.to_string())
    }

    async fn finish(&self, route: &str) {
        self.in_flight.lock().await.remove(route);
    }

    /// Seconds a failure of `kind` is remembered
    fn failure_window(&self, kind: FailureKind) -> u64 {
        let revalidate = &self.blog().config.revalidate;
        match kind {
            FailureKind::Missing => revalidate.post,
            FailureKind::Error => revalidate.error,
        }
    }

    fn failure_is_recent(&self, failure: &Failure, now: i64) -> bool {
        let age = now.saturating_sub(failure.at);
        age < 0 || (age as u64) < self.failure_window(failure.kind)
    }

    /// The failure of `route` still inside its window, if any
    async fn recent_failure(&self, route: &str) -> Option<FailureKind> {
        let failures = self.failures.read().await;
        let failure = failures.get(route)?;
        self.failure_is_recent(failure, cache::now())
            .then_some(failure.kind)
    }

    async fn record_failure(&self, route: &str, kind: FailureKind) {
        let now = cache::now();
        let mut failures = self.failures.write().await;
        if failures.len() >= MAX_FAILURES && !failures.contains_key(route) {
            failures.retain(|_, failure| self.failure_is_recent(failure, now));
            if failures.len() >= MAX_FAILURES {
                let oldest = failures
                    .iter()
                    .min_by_key(|(_, failure)| failure.at)
                    .map(|(route, _)| route.clone());
                if let Some(oldest) = oldest {
                    failures.remove(&oldest);
                }
            }
        }
        failures.insert(route.to_string(), Failure { kind, at: now });
    }

    async fn record(&self, route: &str) {
        self.failures.write().await.remove(route);
        let mut cache = self.cache.write().await;
        cache.record(route, &relative_output(route), cache::now());
        if let Err(e) = cache.save(&self.blog().base_dir) {
            tracing::warn!("Failed to save cache: {}", e);
        }
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    let public_dir = state.blog().public_dir.clone();
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .route("/post/:slug/index.html", get(post_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let generator = Generator::new(blog)?;
    generator.write_assets()?;
    let state = ServerState::new(generator);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Generate `route` unless another task already is
async fn regenerate(state: &Arc<ServerState>, route: &str) -> Result<()> {
    if !state.begin(route).await {
        tracing::debug!("Already generating {}", route);
        return Ok(());
    }

    let result = match route.strip_prefix("/post/") {
        Some(uid) => state.generator.generate_post(uid).await,
        None => state.generator.generate_index().await,
    };

    // Outcome is recorded before the route leaves the in-flight set
    let result = match result {
        Ok(_) => {
            state.record(route).await;
            tracing::info!("Regenerated {}", route);
            Ok(())
        }
        Err(e) => {
            let kind = match e.downcast_ref::<CmsError>() {
                Some(err) if err.is_not_found() => FailureKind::Missing,
                _ => FailureKind::Error,
            };
            state.record_failure(route, kind).await;
            Err(e)
        }
    };
    state.finish(route).await;
    result
}

/// Regenerate `route` without holding up the response
fn spawn_regenerate(state: &Arc<ServerState>, route: String) {
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = regenerate(&state, &route).await {
            tracing::warn!("Regenerating {} failed: {}", route, e);
        }
    });
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let route = "/";
    let path = state.generator.output_path(route);

    if path.exists() {
        if state.recent_failure(route).await.is_none()
            && state.freshness(route).await != Freshness::Fresh
        {
            spawn_regenerate(&state, route.to_string());
        }
    } else if let Err(e) = regenerate(&state, route).await {
        tracing::error!("Failed to generate listing page: {}", e);
        return server_error();
    }

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        // Another request is still generating it
        Err(_) => fallback_page(&state),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    if !is_valid_slug(&slug) {
        return not_found_page(&state);
    }

    let route = post_route(&slug);
    let failure = state.recent_failure(&route).await;
    if failure == Some(FailureKind::Missing) {
        return not_found_page(&state);
    }

    let path = state.generator.output_path(&route);
    if let Ok(html) = tokio::fs::read_to_string(&path).await {
        // A failed regeneration keeps the old page until the error window passes
        if failure.is_none() && state.freshness(&route).await != Freshness::Fresh {
            spawn_regenerate(&state, route);
        }
        return Html(html).into_response();
    }

    if failure == Some(FailureKind::Error) {
        return server_error();
    }

    tracing::debug!("No page for {} yet, generating on demand", route);
    spawn_regenerate(&state, route);
    fallback_page(&state)
}

fn fallback_page(state: &ServerState) -> Response {
    match state.generator.render_fallback() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render fallback page: {}", e);
            server_error()
        }
    }
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

fn not_found_page(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn state(dir: &std::path::Path) -> Arc<ServerState> {
        let mut config = SiteConfig::default();
        config.cms.endpoint = "http://127.0.0.1:9/api/v2".to_string();
        let blog = Blog::with_config(dir, config);
        ServerState::new(Generator::new(&blog).unwrap())
    }

    #[tokio::test]
    async fn test_failures_expire_after_their_window() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        state.record_failure("/post/a", FailureKind::Missing).await;
        state.record_failure("/post/b", FailureKind::Error).await;
        assert_eq!(state.recent_failure("/post/a").await, Some(FailureKind::Missing));
        assert_eq!(state.recent_failure("/post/b").await, Some(FailureKind::Error));

        let long_ago = cache::now() - 1_800;
        for failure in state.failures.write().await.values_mut() {
            failure.at = long_ago;
        }
        assert_eq!(state.recent_failure("/post/a").await, None);
        assert_eq!(state.recent_failure("/post/b").await, None);
    }

    #[tokio::test]
    async fn test_failures_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        for i in 0..MAX_FAILURES + 10 {
            state
                .record_failure(&post_route(&format!("p{}", i)), FailureKind::Missing)
                .await;
        }
        assert_eq!(state.failures.read().await.len(), MAX_FAILURES);
        let last = post_route(&format!("p{}", MAX_FAILURES + 9));
        assert_eq!(state.recent_failure(&last).await, Some(FailureKind::Missing));
    }

    #[tokio::test]
    async fn test_success_clears_failure() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        state.record_failure("/post/a", FailureKind::Error).await;
        state.record("/post/a").await;
        assert_eq!(state.recent_failure("/post/a").await, None);
    }
}
