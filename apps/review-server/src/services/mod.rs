//! Business logic behind the HTTP handlers.

pub mod assignment;
pub mod directory;

pub use assignment::{AssignmentEngine, AssignmentError, AssignmentResult, Reassignment};
