//! lygia-resolver - `#include` resolution for shader sources
//!
//! Flattens GLSL/WGSL shaders by replacing every `#include "..."` line with
//! the fully resolved text of its target. Targets are either local files,
//! resolved relative to the including document, or documents of the
//! [lygia](https://lygia.xyz) shader library, addressed with the `lygia/`
//! namespace prefix and served from an on-disk cache that is filled from the
//! network on demand.
//!
//! ```glsl
//! #include "lygia/color/space/rgb2hsv.glsl"   // library document
//! #include "common/noise.glsl"                // local, next to this file
//! ```
//!
//! # Architecture Overview
//!
//! - [`directive`] - Line scanner and target classification
//! - [`source`] - Local file reader
//! - [`cache`] - Cache-backed remote content store with per-path fetch
//!   de-duplication and retry
//! - [`resolver`] - Recursive resolver, include graph and invalidation
//! - [`pattern`] - Glob filter selecting shader files
//! - [`config`] - `lygia.toml` loading
//! - [`core`] - Error types and shared document types
//! - [`cli`] - The `lygia` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use lygia_resolver::config::ResolverConfig;
//! use lygia_resolver::resolver::Resolver;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ResolverConfig::load_with_optional(None).await?;
//! let resolver = Resolver::new(&config)?;
//!
//! let flattened = resolver.resolve_file(Path::new("shaders/main.frag")).await?;
//! println!("{flattened}");
//!
//! // After shaders/common/noise.glsl changes on disk:
//! let changed = resolver.canonical_identifier("shaders/common/noise.glsl");
//! for root in resolver.on_dependency_changed(&changed) {
//!     println!("rebuild {root}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod directive;
pub mod pattern;
pub mod resolver;
pub mod source;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
