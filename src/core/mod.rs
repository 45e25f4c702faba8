//! Core types shared by every resolver component.
//!
//! - [`IncludeError`] is returned by all library operations
//! - [`FetchFailure`] describes why a remote document could not be fetched
//! - [`ErrorContext`] and [`user_friendly_error`] format failures for the CLI
//! - [`Document`] and [`Origin`] describe one resolved source text

pub mod document;
pub mod error;

pub use document::{Document, Origin};
pub use error::{ErrorContext, FetchFailure, IncludeError, user_friendly_error};

/// Result alias used by library operations.
pub type Result<T, E = IncludeError> = std::result::Result<T, E>;
