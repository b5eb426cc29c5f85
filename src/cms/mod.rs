//! CMS module - queries the headless content API

mod client;
mod document;
mod error;
mod predicate;

pub use client::{CmsClient, QueryOptions};
pub use document::{ApiInfo, ApiRef, Document, SearchResponse};
pub use error::CmsError;
pub use predicate::{query_string, Predicate};
