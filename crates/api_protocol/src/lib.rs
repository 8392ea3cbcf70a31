//! HTTP protocol definitions for the review assignment service.
//!
//! This crate defines the JSON bodies exchanged with clients: validated
//! request types, response envelopes, and the error codes returned on
//! failure.

mod error;
pub mod requests;
pub mod responses;
mod types;

pub use error::*;
pub use types::*;
