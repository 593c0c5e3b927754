//! # Agora Core
//!
//! The domain layer of the Agora backend: users, posts and votes.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
