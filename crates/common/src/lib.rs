//! Common types, protocol definitions, and errors shared across the OmniRewards crates.

pub mod auth;
pub mod error;
pub mod protocol;

pub use error::ServiceError;
