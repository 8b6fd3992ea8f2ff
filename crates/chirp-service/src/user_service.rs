//! User service trait definition.

use crate::dto::RegisterUserRequest;
use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, PublicUser, User, UserId};

/// User service trait.
///
/// User lists come back ordered by username.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Registers a user. `password_hash` is produced by the caller.
    async fn register_user(
        &self,
        request: RegisterUserRequest,
        password_hash: String,
    ) -> ChirpResult<User>;

    /// Gets a user as seen by `viewer`.
    async fn get_user(&self, id: UserId, viewer: Option<UserId>) -> ChirpResult<PublicUser>;

    /// Loads the credentials for a login attempt and records the login.
    ///
    /// Always reads the store; the returned row predates the login stamp.
    async fn get_user_for_login(&self, email: &str) -> ChirpResult<User>;

    /// Makes `follower_id` follow `followee_id`.
    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()>;

    /// Makes `follower_id` stop following `followee_id`.
    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()>;

    /// Lists the followers of `id`.
    async fn get_followers(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;

    /// Lists the users `id` follows.
    async fn get_followees(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;

    /// Searches users by username and display name.
    async fn search_users(
        &self,
        query: &str,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>>;
}
