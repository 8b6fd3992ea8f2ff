//! Tweet-related DTOs.

use chirp_core::validation::rules::not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maximum tweet length, in characters.
pub const MAX_TWEET_LENGTH: u64 = 280;

/// Request to post a tweet.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTweetRequest {
    #[validate(
        length(min = 1, max = 280, message = "Tweet must be 1-280 characters"),
        custom(function = "not_blank", message = "Tweet cannot be blank")
    )]
    pub content: String,
}

impl CreateTweetRequest {
    /// Creates a request for `content`.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
