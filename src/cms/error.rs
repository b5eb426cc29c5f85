//! Errors raised while talking to the CMS

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("CMS endpoint is not configured (set cms.endpoint or PRISMIC_API_ENDPOINT)")]
    MissingEndpoint,
    #[error("CMS endpoint cannot carry a path: {0}")]
    InvalidEndpoint(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CMS returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("CMS API exposes no master ref")]
    NoMasterRef,
    #[error("no {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },
}

impl CmsError {
    /// Whether the CMS answered but had no such document
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }
}
