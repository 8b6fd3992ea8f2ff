//! Storage orchestrator implementations.

pub mod tweet_storage_impl;
pub mod user_storage_impl;

pub use tweet_storage_impl::{TweetStorageImpl, TweetStorageImplParameters};
pub use user_storage_impl::{UserStorageImpl, UserStorageImplParameters};
