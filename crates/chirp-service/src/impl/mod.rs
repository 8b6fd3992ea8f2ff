//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `tweet_service.rs`).

pub mod tweet_service_impl;
pub mod user_service_impl;

pub use tweet_service_impl::TweetServiceImpl;
pub use user_service_impl::UserServiceImpl;
