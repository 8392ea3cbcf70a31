//! Storage for the review assignment service.
//!
//! This crate provides the store abstraction for teams, users, pull requests
//! and the reviewer relation. Mutations of pull requests go through a
//! [`ReviewTransaction`] so that a whole operation either commits or leaves
//! the store untouched. Two backends are provided: PostgreSQL for deployments
//! and an in-memory store for tests and local runs.

mod error;
mod memory;
mod postgres;
mod schema;
mod traits;

pub use error::*;
pub use memory::*;
pub use postgres::*;
pub use schema::*;
pub use traits::*;
