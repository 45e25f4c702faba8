//! Cross-platform utilities
//!
//! - [`fs`] - path normalization, atomic writes, idempotent directory creation
//! - [`backoff`] - retry delay schedule for remote fetches

pub mod backoff;
pub mod fs;

pub use fs::{absolutize, atomic_write, ensure_dir, normalize_path, resolve_relative};
