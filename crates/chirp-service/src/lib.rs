//! # Chirp Service
//!
//! Cache-aside storage orchestration for Chirp and the thin services on top.
//!
//! ```text
//! TweetService / UserService         (validation, ownership, ordering)
//!   ↓
//! TweetStorage / UserStorage         (cache-aside, hydration, counters)
//!   ↓                    ↓
//! CacheAccessor          DAOs        (Redis or in-memory / MySQL)
//! ```
//!
//! [`bootstrap::build_storage_module`] wires everything from an
//! [`AppConfig`](chirp_config::AppConfig).

pub mod bootstrap;
pub mod cache;
pub mod di;
pub mod dto;
pub mod r#impl;
pub mod storage;
pub mod tweet_service;
pub mod user_service;

pub use bootstrap::build_storage_module;
pub use cache::*;
pub use di::{ServiceResolver, StorageModule, StorageResolver};
pub use dto::*;
pub use r#impl::*;
pub use storage::*;
pub use tweet_service::*;
pub use user_service::*;
