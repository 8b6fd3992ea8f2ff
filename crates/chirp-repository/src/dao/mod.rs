//! DAO (Data Access Object) layer.
//!
//! Trait definitions live here, implementations under `impl/`, organized by
//! technology.

pub mod follow_dao;
pub mod r#impl;
pub mod like_dao;
pub mod search_dao;
pub mod tweet_dao;
pub mod user_dao;

pub use follow_dao::FollowDao;
pub use like_dao::LikeDao;
pub use r#impl::*;
pub use search_dao::SearchDao;
pub use tweet_dao::TweetDao;
pub use user_dao::UserDao;
