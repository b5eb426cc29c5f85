//! Query predicates in the CMS query language
//!
//! A query is a bracketed list of predicates, e.g.
//! `[[at(document.type, "posts")]]`.

use std::fmt;

/// A single query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match of a field path against a value
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Match every document of a custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Match the document of `doc_type` carrying `uid`
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                write!(f, "[at({}, \"{}\")]", path, escape_value(value))
            }
        }
    }
}

/// Render predicates as the `q` query parameter
pub fn query_string(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner)
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_query() {
        let q = query_string(&[Predicate::document_type("posts")]);
        assert_eq!(q, r#"[[at(document.type, "posts")]]"#);
    }

    #[test]
    fn test_uid_query() {
        let q = query_string(&[Predicate::uid("posts", "hello-world")]);
        assert_eq!(q, r#"[[at(my.posts.uid, "hello-world")]]"#);
    }

    #[test]
    fn test_value_is_escaped() {
        let p = Predicate::at("document.type", r#"a"b"#);
        assert_eq!(p.to_string(), r#"[at(document.type, "a\"b")]"#);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(query_string(&[]), "[]");
    }
}
