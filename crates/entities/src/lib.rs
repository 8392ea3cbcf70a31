//! Core entity definitions for the review assignment service.
//!
//! This crate defines the data types shared by the store, the wire protocol
//! and the server: teams and their members, users, pull requests and the
//! reviewer statistics derived from them.

mod pull_request;
mod team;
mod user;

pub use pull_request::*;
pub use team::*;
pub use user::*;
