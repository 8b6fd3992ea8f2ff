//! FollowDao trait: the directed (followee, follower) relation.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, UserId};

/// Follow edge data access object.
#[async_trait]
pub trait FollowDao: Interface + Send + Sync {
    /// Adds the edge `follower → followee`. Returns `true` only if it is new.
    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool>;

    /// Removes the edge `follower → followee`. Returns `true` only if it existed.
    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool>;

    /// Lists the users following `user_id`.
    async fn get_followers_ids(&self, user_id: UserId) -> ChirpResult<Vec<UserId>>;

    /// Lists the users `user_id` follows.
    async fn get_followees_ids(&self, user_id: UserId) -> ChirpResult<Vec<UserId>>;

    /// Counts the users following `user_id`.
    async fn get_follower_count(&self, user_id: UserId) -> ChirpResult<i64>;

    /// Counts the users `user_id` follows.
    async fn get_followee_count(&self, user_id: UserId) -> ChirpResult<i64>;

    /// Checks whether `follower_id` follows `followee_id`.
    async fn is_following(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool>;
}
