//! Cache key builders for consistent key naming.
//!
//! Identity entries (`tweet`, `user`, `search`) expire; every other key is
//! written without a TTL and invalidated by the mutation that changes it.

use super::CacheKey;
use chirp_core::{TweetId, UserId};

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "chirp";

fn key(kind: &str) -> CacheKey {
    CacheKey::new().with(CACHE_PREFIX).with(kind)
}

/// Tweet record by ID.
#[must_use]
pub fn tweet(id: TweetId) -> CacheKey {
    key("tweet").with(id)
}

/// Like counter of a tweet.
#[must_use]
pub fn tweet_like_count(id: TweetId) -> CacheKey {
    key("tweet").with(id).with("likecount")
}

/// Whether `viewer` likes tweet `id`.
#[must_use]
pub fn tweet_liked(id: TweetId, viewer: UserId) -> CacheKey {
    key("tweet").with(id).with("likedby").with(viewer)
}

/// Set of tweet IDs written by a user.
#[must_use]
pub fn user_tweet_ids(id: UserId) -> CacheKey {
    key("user").with(id).with("tweets")
}

/// Public user profile by ID.
#[must_use]
pub fn user(id: UserId) -> CacheKey {
    key("user").with(id)
}

/// Set of user IDs following `id`.
#[must_use]
pub fn user_followers(id: UserId) -> CacheKey {
    key("user").with(id).with("followers")
}

/// Set of user IDs `id` follows.
#[must_use]
pub fn user_followees(id: UserId) -> CacheKey {
    key("user").with(id).with("followees")
}

/// Follower counter of a user.
#[must_use]
pub fn user_follower_count(id: UserId) -> CacheKey {
    key("user").with(id).with("followercount")
}

/// Followee counter of a user.
#[must_use]
pub fn user_followee_count(id: UserId) -> CacheKey {
    key("user").with(id).with("followeecount")
}

/// Whether `viewer` follows `id`.
#[must_use]
pub fn user_following(id: UserId, viewer: UserId) -> CacheKey {
    key("user").with(id).with("followedby").with(viewer)
}

/// Search result IDs for `query` over one entity kind (`"tweet"` or `"user"`).
#[must_use]
pub fn search(kind: &str, query: &str) -> CacheKey {
    key(kind).with("querystring").with(query)
}
