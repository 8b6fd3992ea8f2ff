//! # Chirp Repository
//!
//! Relational data access for Chirp. Each DAO is a narrow trait over one
//! table family with a MySQL implementation behind it:
//!
//! ```text
//! TweetStorage / UserStorage        (chirp-service, cache-aside)
//!   ↓  Arc<dyn TweetDao>, Arc<dyn LikeDao>, Arc<dyn UserDao>, Arc<dyn FollowDao>
//! MySqlTweetDaoImpl, …              (dao/impl/mysql)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! MySQL
//! ```
//!
//! Every lookup reports "no rows" as `Ok(None)` (or an empty collection) and any
//! other failure as an error, so callers can tell absence from breakage.
//! Edge mutations (`follow_user`, `like_tweet`, …) are idempotent and return
//! whether the edge actually changed.

pub mod dao;
pub mod pool;

pub use dao::*;
pub use pool::*;
