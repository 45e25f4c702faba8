//! Integration test suite for lygia-resolver
//!
//! End-to-end tests of resolution, caching and invalidation through the
//! public API, plus the `lygia` binary. No test touches the network: library
//! documents come from an in-memory fetcher or a pre-seeded cache.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **flatten**: Recursive flattening of local and library includes
//! - **remote_cache**: Cache hits, misses, de-duplication and failures
//! - **invalidation**: Dependency graph queries after resolution
//! - **cli**: The `lygia` binary

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod flatten;
mod invalidation;
mod remote_cache;
