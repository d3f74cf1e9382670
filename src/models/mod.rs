//! Data models for the project intake service.
//!
//! Field names match the browser form's multipart field names.

mod project;

pub use project::*;
