//! HTTP client for the CMS REST API

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use super::document::{ApiInfo, Document, SearchResponse};
use super::error::CmsError;
use super::predicate::{query_string, Predicate};
use crate::config::CmsConfig;

/// Paging options for a search query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub page_size: Option<usize>,
    pub page: Option<usize>,
}

impl QueryOptions {
    pub fn page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            page: None,
        }
    }
}

/// Client for a Prismic-compatible content API
#[derive(Clone, Debug)]
pub struct CmsClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl CmsClient {
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, CmsError> {
        if endpoint.trim().is_empty() {
            return Err(CmsError::MissingEndpoint);
        }
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(CmsError::InvalidEndpoint(endpoint.to_string()));
        }
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    pub fn from_config(config: &CmsConfig) -> Result<Self, CmsError> {
        Self::new(&config.endpoint, config.access_token.clone())
    }

    pub fn user_agent() -> &'static str {
        concat!("spacetraveling/", env!("CARGO_PKG_VERSION"))
    }

    /// Run a search query against the master ref
    pub async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, CmsError> {
        let master_ref = self.master_ref().await?;

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| CmsError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(["documents", "search"]);
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("ref", &master_ref);
            if !predicates.is_empty() {
                qp.append_pair("q", &query_string(predicates));
            }
            if let Some(page_size) = options.page_size {
                qp.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(page) = options.page {
                qp.append_pair("page", &page.to_string());
            }
            if let Some(token) = &self.access_token {
                qp.append_pair("access_token", token);
            }
        }

        tracing::debug!("CMS query: {}", query_string(predicates));
        self.get_json(url).await
    }

    /// Fetch the single document of `doc_type` whose uid is `uid`
    pub async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError> {
        let response = self
            .query(&[Predicate::uid(doc_type, uid)], &QueryOptions::page_size(1))
            .await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    /// Fetch a results page by the `next_page` URL of an earlier response
    pub async fn fetch_page(&self, page_url: &str) -> Result<SearchResponse, CmsError> {
        let url = Url::parse(page_url)?;
        tracing::debug!("Fetching next page: {}", url);
        self.get_json(url).await
    }

    async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(CmsError::NoMasterRef)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        let resp = self.http.get(url).send().await?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, CmsError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
