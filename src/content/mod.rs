//! Content module - view models, reading time, rich text

mod listing;
mod post;
pub mod richtext;

pub use listing::Listing;
pub use post::{
    reading_time, word_count, Banner, ContentSection, Post, PostData, PostPagination, PostSummary,
    SummaryData, WORDS_PER_MINUTE,
};
pub use richtext::RichTextBlock;

use serde::{Deserialize, Deserializer};

/// Deserialize a field the CMS may send as `null`, using the type's default
/// in that case
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
