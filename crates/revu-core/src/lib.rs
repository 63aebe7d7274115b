//! # Revu Core
//!
//! The domain layer of the review-collection backend.
//! This crate contains the rate limiter and review session rules with zero
//! infrastructure dependencies; storage and time are injected through ports.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
