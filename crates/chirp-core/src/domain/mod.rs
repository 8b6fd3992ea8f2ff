//! # Chirp Domain
//!
//! Stored records (what the DAOs return and the identity caches hold) and the
//! hydrated entities the storage layer hands to its callers.

mod tweet;
mod user;

pub use tweet::*;
pub use user::*;
