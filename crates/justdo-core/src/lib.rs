//! # JustDo Core
//!
//! The domain layer of the JustDo task API.
//! This crate contains entities, ports and use cases with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
