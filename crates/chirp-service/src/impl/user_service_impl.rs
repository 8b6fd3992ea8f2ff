//! User service implementation.

use crate::dto::RegisterUserRequest;
use crate::storage::UserStorage;
use crate::user_service::UserService;
use async_trait::async_trait;
use chirp_core::{ChirpError, ChirpResult, PublicUser, User, UserId, ValidateExt};
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

fn by_username(users: &mut [PublicUser]) {
    users.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
}

/// User service component.
#[derive(Component)]
#[shaku(interface = UserService)]
pub struct UserServiceImpl {
    #[shaku(inject)]
    user_storage: Arc<dyn UserStorage>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    #[must_use]
    pub fn new(user_storage: Arc<dyn UserStorage>) -> Self {
        Self { user_storage }
    }

    fn reject_self_follow(followee_id: UserId, follower_id: UserId) -> ChirpResult<()> {
        if followee_id == follower_id {
            return Err(ChirpError::validation("Users cannot follow themselves"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn register_user(
        &self,
        request: RegisterUserRequest,
        password_hash: String,
    ) -> ChirpResult<User> {
        debug!("Registering user: {}", request.username);
        request.validate_request()?;

        let user = self
            .user_storage
            .insert_user(&request.into_new_user(password_hash))
            .await?;

        info!("User registered: {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, id: UserId, viewer: Option<UserId>) -> ChirpResult<PublicUser> {
        self.user_storage.get_user_by_id(id, viewer).await
    }

    async fn get_user_for_login(&self, email: &str) -> ChirpResult<User> {
        let user = self
            .user_storage
            .get_user_by_email(&email.trim().to_lowercase())
            .await?;
        self.user_storage.update_last_login_time(user.id).await?;
        debug!("Login recorded for user: {}", user.id);
        Ok(user)
    }

    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()> {
        Self::reject_self_follow(followee_id, follower_id)?;
        self.user_storage.follow_user(followee_id, follower_id).await
    }

    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()> {
        Self::reject_self_follow(followee_id, follower_id)?;
        self.user_storage.unfollow_user(followee_id, follower_id).await
    }

    async fn get_followers(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        let mut users = self.user_storage.get_followers(id, viewer).await?;
        by_username(&mut users);
        Ok(users)
    }

    async fn get_followees(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        let mut users = self.user_storage.get_followees(id, viewer).await?;
        by_username(&mut users);
        Ok(users)
    }

    async fn search_users(
        &self,
        query: &str,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ChirpError::validation("Search query cannot be empty"));
        }

        let mut users = self.user_storage.search_users(query, viewer).await?;
        by_username(&mut users);
        Ok(users)
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}
