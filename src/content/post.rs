//! Post view models

use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::richtext::RichTextBlock;
use crate::cms::{CmsError, Document, SearchResponse};

/// Words per minute used for the reading time estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: Option<String>,
    pub first_publication_date: Option<String>,
    pub data: SummaryData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
}

impl PostSummary {
    /// Reshape a raw CMS document into the listing shape
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        let data = if doc.data.is_null() {
            SummaryData::default()
        } else {
            serde_json::from_value(doc.data)?
        };
        Ok(Self {
            uid: doc.uid,
            first_publication_date: doc.first_publication_date,
            data,
        })
    }

    /// Link to the post page, if the document has a uid
    pub fn href(&self) -> Option<String> {
        self.uid.as_ref().map(|uid| format!("/post/{}", uid))
    }
}

/// One page of listing results plus the cursor to the next one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostPagination {
    /// Map every raw result into the summary shape. An empty cursor counts
    /// as no cursor.
    pub fn from_response(response: SearchResponse) -> Result<Self, CmsError> {
        let results = response
            .results
            .into_iter()
            .map(PostSummary::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            next_page: response.next_page.filter(|p| !p.trim().is_empty()),
            results,
        })
    }
}

/// A full post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub uid: Option<String>,
    pub first_publication_date: Option<String>,
    pub data: PostData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub banner: Banner,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// A heading followed by rich text paragraphs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    #[serde(deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: Vec<RichTextBlock>,
}

impl Post {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        let data = if doc.data.is_null() {
            PostData::default()
        } else {
            serde_json::from_value(doc.data)?
        };
        Ok(Self {
            uid: doc.uid,
            first_publication_date: doc.first_publication_date,
            data,
        })
    }

    /// Estimated minutes to read the post
    pub fn reading_time(&self) -> usize {
        reading_time(&self.data.content)
    }
}

/// Count words by splitting on single spaces, the same way for headings and
/// body text. An empty string still counts as one word.
pub fn word_count(sections: &[ContentSection]) -> usize {
    sections
        .iter()
        .map(|section| {
            section.heading.split(' ').count()
                + section
                    .body
                    .iter()
                    .map(|block| block.text.split(' ').count())
                    .sum::<usize>()
        })
        .sum()
}

/// Minutes to read, rounded up
pub fn reading_time(sections: &[ContentSection]) -> usize {
    word_count(sections).div_ceil(WORDS_PER_MINUTE)
}
