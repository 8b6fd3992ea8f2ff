//! Composite cache keys.

use chirp_core::{TweetId, UserId};
use std::fmt;

/// Separator placed between key fields when hashing.
pub const KEY_SEPARATOR: char = ':';

/// One typed field of a composite key.
///
/// Only the variants below can be built, so an unsupported field type is a
/// compile error rather than a runtime failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyField {
    /// String field, hashed verbatim.
    Str(String),
    /// Integer field, hashed in base 10.
    Int(i64),
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for KeyField {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KeyField {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for KeyField {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<TweetId> for KeyField {
    fn from(value: TweetId) -> Self {
        Self::Int(value.into_inner())
    }
}

impl From<UserId> for KeyField {
    fn from(value: UserId) -> Self {
        Self::Int(value.into_inner())
    }
}

/// Ordered tuple of typed fields identifying one cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fields: Vec<KeyField>,
}

impl CacheKey {
    /// Creates an empty key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    #[must_use]
    pub fn with(mut self, field: impl Into<KeyField>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Returns the fields in order.
    #[must_use]
    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    /// Joins the fields into the string stored in the backend.
    #[must_use]
    pub fn hash(&self) -> String {
        let mut out = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(KEY_SEPARATOR);
            }
            out.push_str(&field.to_string());
        }
        out
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash())
    }
}

impl<T: Into<KeyField>> FromIterator<T> for CacheKey {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}
