//! User storage trait definition.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, NewUser, PublicUser, User, UserId};

/// Cache-aside access to users and the follow graph.
#[async_trait]
pub trait UserStorage: Interface + Send + Sync {
    /// Stores a new user.
    async fn insert_user(&self, user: &NewUser) -> ChirpResult<User>;

    /// Gets the public projection of a user, hydrated for `viewer`.
    async fn get_user_by_id(&self, id: UserId, viewer: Option<UserId>) -> ChirpResult<PublicUser>;

    /// Gets every existing user among `ids`. Unknown IDs are skipped.
    async fn get_users_by_ids(
        &self,
        ids: &[UserId],
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;

    /// Gets the full user row by email, always from the store.
    async fn get_user_by_email(&self, email: &str) -> ChirpResult<User>;

    /// Stamps the user's last login time.
    async fn update_last_login_time(&self, id: UserId) -> ChirpResult<()>;

    /// Makes `follower_id` follow `followee_id`. Following twice is a no-op.
    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()>;

    /// Removes the follow edge. Unfollowing twice is a no-op.
    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()>;

    /// Users following `id`.
    async fn get_followers(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;

    /// Users `id` follows.
    async fn get_followees(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;

    /// IDs of the users `id` follows.
    async fn get_followee_ids(&self, id: UserId) -> ChirpResult<Vec<UserId>>;

    /// Full-text search over usernames and display names.
    async fn search_users(
        &self,
        query: &str,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;
}
