//! Attribute paths.
//!
//! An attribute path names a field to extract from one side of an entry,
//! e.g. `address.city` or `tags[0]`. Which side (key or value) is an
//! explicit discriminator chosen at construction, never inferred from the
//! path text: name-based routing conventions are a classic source of
//! ambiguity bugs when user fields collide with the convention.

use std::fmt;

use crate::error::{QueryError, QueryResult};

/// Which side of an entry a path extracts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeScope {
    /// The path navigates the record key.
    Key,
    /// The path navigates the record value.
    Value,
}

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Descend into a map field by name.
    Field(String),
    /// Descend into an array element by position.
    Index(usize),
}

/// A parsed, scope-tagged attribute path.
///
/// Paths are cheap to clone and hashable, so entries use them directly as
/// attribute-cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    scope: AttributeScope,
    segments: Vec<PathSegment>,
}

impl AttributePath {
    /// Parses a key-scoped attribute path.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedPath`] on invalid path syntax.
    pub fn key(path: &str) -> QueryResult<Self> {
        Self::parse(AttributeScope::Key, path)
    }

    /// Parses a value-scoped attribute path.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedPath`] on invalid path syntax.
    pub fn value(path: &str) -> QueryResult<Self> {
        Self::parse(AttributeScope::Value, path)
    }

    /// Parses a dotted path under an explicit scope.
    ///
    /// Syntax: dot-separated field names, each optionally followed by one
    /// or more `[n]` index suffixes (`meta.tags[2].id`).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedPath`] on empty paths, empty
    /// segments, malformed brackets, or non-numeric indexes.
    pub fn parse(scope: AttributeScope, path: &str) -> QueryResult<Self> {
        if path.is_empty() {
            return Err(QueryError::malformed_path(path, "path is empty"));
        }

        let mut segments = Vec::new();
        for part in path.split('.') {
            parse_part(path, part, &mut segments)?;
        }
        Ok(Self { scope, segments })
    }

    /// The side of the entry this path extracts from.
    #[must_use]
    pub const fn scope(&self) -> AttributeScope {
        self.scope
    }

    /// The parsed steps of this path.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The first field name of this path.
    ///
    /// This is the name custom extractors are registered under.
    #[must_use]
    pub fn leading_field(&self) -> &str {
        match &self.segments[0] {
            PathSegment::Field(name) => name,
            // parse_part guarantees every part starts with a field name
            PathSegment::Index(_) => unreachable!("paths start with a field segment"),
        }
    }
}

/// Parses one dot-separated part (`name` or `name[i][j]...`) into segments.
fn parse_part(full: &str, part: &str, segments: &mut Vec<PathSegment>) -> QueryResult<()> {
    if part.is_empty() {
        return Err(QueryError::malformed_path(full, "empty path segment"));
    }

    let (name, indexes) = match part.find('[') {
        Some(bracket) => part.split_at(bracket),
        None => (part, ""),
    };
    if name.is_empty() {
        return Err(QueryError::malformed_path(
            full,
            "segment must start with a field name",
        ));
    }
    if name.contains(']') {
        return Err(QueryError::malformed_path(full, "unmatched ']'"));
    }
    segments.push(PathSegment::Field(name.to_string()));

    let mut rest = indexes;
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(QueryError::malformed_path(
                full,
                "unexpected text after index",
            ));
        };
        let Some(close) = inner.find(']') else {
            return Err(QueryError::malformed_path(full, "unmatched '['"));
        };
        let digits = &inner[..close];
        let index: usize = digits
            .parse()
            .map_err(|_| QueryError::malformed_path(full, "index must be a non-negative integer"))?;
        segments.push(PathSegment::Index(index));
        rest = &inner[close + 1..];
    }
    Ok(())
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.scope {
            AttributeScope::Key => "key",
            AttributeScope::Value => "value",
        };
        write!(f, "{side}:")?;
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_field() {
        let path = AttributePath::value("name").unwrap();
        assert_eq!(path.scope(), AttributeScope::Value);
        assert_eq!(path.segments(), &[PathSegment::Field("name".into())]);
        assert_eq!(path.leading_field(), "name");
    }

    #[test]
    fn parse_nested_fields() {
        let path = AttributePath::value("address.city").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("address".into()),
                PathSegment::Field("city".into()),
            ]
        );
    }

    #[test]
    fn parse_indexes() {
        let path = AttributePath::value("meta.tags[2].id").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("meta".into()),
                PathSegment::Field("tags".into()),
                PathSegment::Index(2),
                PathSegment::Field("id".into()),
            ]
        );

        let path = AttributePath::value("grid[1][2]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("grid".into()),
                PathSegment::Index(1),
                PathSegment::Index(2),
            ]
        );
    }

    #[test]
    fn key_scope_is_explicit() {
        let key_path = AttributePath::key("id").unwrap();
        let value_path = AttributePath::value("id").unwrap();
        assert_eq!(key_path.scope(), AttributeScope::Key);
        assert_ne!(key_path, value_path);
    }

    #[test]
    fn reject_malformed_paths() {
        for bad in [
            "",
            ".",
            "a..b",
            "a.",
            ".a",
            "[0]",
            "a[0",
            "a0]",
            "a[x]",
            "a[-1]",
            "a[0]b",
        ] {
            assert!(
                matches!(
                    AttributePath::value(bad),
                    Err(QueryError::MalformedPath { .. })
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn display_renders_scope_and_segments() {
        let path = AttributePath::value("meta.tags[2].id").unwrap();
        assert_eq!(path.to_string(), "value:meta.tags[2].id");

        let path = AttributePath::key("id").unwrap();
        assert_eq!(path.to_string(), "key:id");
    }

    #[test]
    fn paths_are_usable_as_cache_keys() {
        use std::collections::HashMap;

        let mut cache = HashMap::new();
        cache.insert(AttributePath::value("a.b").unwrap(), 1);
        assert_eq!(cache.get(&AttributePath::value("a.b").unwrap()), Some(&1));
        assert_eq!(cache.get(&AttributePath::key("a.b").unwrap()), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::fmt::Write;

        fn path_text() -> impl Strategy<Value = String> {
            proptest::collection::vec(
                ("[a-z][a-z0-9_]{0,5}", proptest::collection::vec(0usize..30, 0..3)),
                1..4,
            )
            .prop_map(|parts| {
                let mut text = String::new();
                for (i, (name, indexes)) in parts.iter().enumerate() {
                    if i > 0 {
                        text.push('.');
                    }
                    text.push_str(name);
                    for index in indexes {
                        let _ = write!(text, "[{index}]");
                    }
                }
                text
            })
        }

        proptest! {
            #[test]
            fn parse_display_roundtrip(text in path_text()) {
                let path = AttributePath::value(&text).unwrap();
                prop_assert_eq!(path.to_string(), format!("value:{text}"));

                let reparsed = AttributePath::parse(AttributeScope::Value, &text).unwrap();
                prop_assert_eq!(reparsed, path);
            }
        }
    }
}
