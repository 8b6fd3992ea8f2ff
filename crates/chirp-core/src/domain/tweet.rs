//! Tweet record and hydrated tweet.

use crate::{PublicUser, TweetId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tweet as stored: immutable content plus its author reference.
///
/// This is the shape cached under the tweet's identity key. Derived data
/// (author projection, like count, viewer flag) is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A fully hydrated tweet as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub author: PublicUser,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    /// Whether the viewer this tweet was hydrated for has liked it.
    pub liked: bool,
}

impl Tweet {
    /// Builds a hydrated tweet from its record and derived fields.
    #[must_use]
    pub fn hydrate(record: TweetRecord, author: PublicUser, like_count: i64, liked: bool) -> Self {
        Self {
            id: record.id,
            author,
            content: record.content,
            created_at: record.created_at,
            like_count,
            liked,
        }
    }

    /// Returns the author's ID.
    #[must_use]
    pub fn author_id(&self) -> UserId {
        self.author.id
    }
}
