//! UserDao trait: user row access.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, NewUser, User, UserId, UserProfile};

/// Low-level user data access object.
#[async_trait]
pub trait UserDao: Interface + Send + Sync {
    /// Finds the public part of a user. `None` means the row does not exist.
    async fn get_public_user_by_id(&self, id: UserId) -> ChirpResult<Option<UserProfile>>;

    /// Finds the full user row, credentials included, by email.
    async fn get_user_by_email(&self, email: &str) -> ChirpResult<Option<User>>;

    /// Inserts a user. The store assigns the ID and creation time.
    async fn insert_user(&self, user: &NewUser) -> ChirpResult<User>;

    /// Stamps the user's last login time with the current time.
    async fn update_user_last_login_time(&self, id: UserId) -> ChirpResult<()>;
}
