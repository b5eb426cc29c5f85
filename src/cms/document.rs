//! Raw CMS wire types

use serde::{Deserialize, Serialize};

/// API root response, listing the content refs
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

impl ApiInfo {
    /// The ref pointing at published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// A content release ref
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub results_size: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

/// A CMS document; `data` holds the custom type's fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}
