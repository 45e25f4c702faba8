//! Global constants used throughout the resolver.
//!
//! Defaults for the remote library, the on-disk cache layout, and the
//! network retry policy live here so the config layer, the cache, and the
//! CLI agree on them.

use std::time::Duration;

/// Reserved namespace keyword that routes an include to the remote library.
pub const DEFAULT_NAMESPACE: &str = "lygia";

/// Base URL the virtual pathname is appended to when fetching.
pub const DEFAULT_REMOTE_BASE: &str = "https://lygia.xyz";

/// Cache directory name, created under the working directory by default.
pub const DEFAULT_CACHE_DIR_NAME: &str = ".lygia-cache";

/// Project configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lygia.toml";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "LYGIA_CACHE_DIR";

/// Literal prefix of a recognized include directive (after trimming).
pub const INCLUDE_PREFIX: &str = "#include \"";

/// Default timeout for a single remote fetch attempt (30 seconds).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first failed fetch attempt.
///
/// Only transient failures (transport errors, timeouts, 5xx) are retried.
pub const DEFAULT_FETCH_RETRIES: u32 = 2;

/// Starting delay for exponential backoff between fetch attempts (100ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Maximum backoff delay between fetch attempts (2 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Multiplier applied to the CPU core count for default flatten parallelism.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Core count assumed when `std::thread::available_parallelism()` fails.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// File name of the persisted dependency graph snapshot inside the cache root.
pub const GRAPH_SNAPSHOT_FILE: &str = ".graph.json";

/// Directory holding cross-process lock files inside the cache root.
pub const LOCKS_DIR: &str = ".locks";

/// Shader file patterns processed when no `include` list is configured.
pub const DEFAULT_SHADER_PATTERNS: &[&str] =
    &["**/*.glsl", "**/*.wgsl", "**/*.vert", "**/*.frag", "**/*.vs", "**/*.fs"];
