//! The growing list behind the "load more" control

use serde::Serialize;

use super::post::{PostPagination, PostSummary};
use crate::cms::{CmsClient, CmsError, Predicate, QueryOptions};
use crate::config::CmsConfig;

/// Posts shown so far plus the cursor to the next page
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
}

impl Listing {
    pub fn new(first: PostPagination) -> Self {
        Self {
            posts: first.results,
            next_page: first.next_page.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Query the first page of posts
    pub async fn fetch_first(client: &CmsClient, config: &CmsConfig) -> Result<Self, CmsError> {
        let response = client
            .query(
                &[Predicate::document_type(&config.post_type)],
                &QueryOptions::page_size(config.page_size),
            )
            .await?;
        Ok(Self::new(PostPagination::from_response(response)?))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether the "load more" control is offered
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Append a fetched page and take over its cursor. Returns the number of
    /// posts appended.
    pub fn append(&mut self, page: PostPagination) -> usize {
        let added = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page.filter(|p| !p.trim().is_empty());
        added
    }

    /// Fetch the page behind the current cursor and append it. Without a
    /// cursor this does nothing.
    pub async fn load_more(&mut self, client: &CmsClient) -> Result<usize, CmsError> {
        let Some(url) = self.next_page.clone() else {
            return Ok(0);
        };
        let response = client.fetch_page(&url).await?;
        let page = PostPagination::from_response(response)?;
        let added = self.append(page);
        tracing::debug!("Loaded {} more posts (total {})", added, self.posts.len());
        Ok(added)
    }

    pub fn into_pagination(self) -> PostPagination {
        PostPagination {
            next_page: self.next_page,
            results: self.posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::post::SummaryData;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: Some(uid.to_string()),
            first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            data: SummaryData {
                title: uid.to_uppercase(),
                ..Default::default()
            },
        }
    }

    fn page(uids: &[&str], next: Option<&str>) -> PostPagination {
        PostPagination {
            next_page: next.map(str::to_string),
            results: uids.iter().map(|u| summary(u)).collect(),
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut listing = Listing::new(page(&["a", "b"], Some("https://cms/page2")));
        assert!(listing.has_more());

        let added = listing.append(page(&["c", "d", "e"], Some("https://cms/page3")));
        assert_eq!(added, 3);
        let uids: Vec<_> = listing
            .posts()
            .iter()
            .map(|p| p.uid.as_deref().unwrap())
            .collect();
        assert_eq!(uids, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(listing.next_page(), Some("https://cms/page3"));
    }

    #[test]
    fn test_cursor_cleared_when_absent() {
        let mut listing = Listing::new(page(&["a"], Some("https://cms/page2")));
        listing.append(page(&["b"], None));
        assert!(!listing.has_more());

        let mut listing = Listing::new(page(&["a"], Some("https://cms/page2")));
        listing.append(page(&["b"], Some("")));
        assert!(!listing.has_more());
    }

    #[test]
    fn test_no_deduplication() {
        let mut listing = Listing::new(page(&["a"], Some("https://cms/page2")));
        listing.append(page(&["a"], None));
        assert_eq!(listing.posts().len(), 2);
    }

    #[test]
    fn test_into_pagination() {
        let listing = Listing::new(page(&["a"], Some("https://cms/page2")));
        let pagination = listing.into_pagination();
        assert_eq!(pagination.results.len(), 1);
        assert_eq!(pagination.next_page.as_deref(), Some("https://cms/page2"));
    }
}
