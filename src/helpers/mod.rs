//! Helper functions shared by the content model and the templates

mod date;
mod html;

pub use date::*;
pub use html::*;
