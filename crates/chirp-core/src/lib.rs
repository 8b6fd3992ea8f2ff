//! # Chirp Core
//!
//! Core types, errors and concurrency primitives shared by every layer of Chirp:
//! the error taxonomy, typed identifiers, the tweet/user domain model, and the
//! bounded [`WorkerPool`] the storage layer fans hydration work out to.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;
pub mod worker_pool;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;
pub use worker_pool::WorkerPool;

// Re-export shaku for dependency injection
pub use shaku::{module, Component, HasComponent, Interface};
