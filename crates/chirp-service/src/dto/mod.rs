//! Data Transfer Objects (DTOs).

mod tweet_dto;
mod user_dto;

pub use tweet_dto::*;
pub use user_dto::*;
