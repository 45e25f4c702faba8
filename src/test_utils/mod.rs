//! Test utilities for the resolver.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite:
//!
//! - [`init_test_logging`] turns on tracing output for a test run
//! - [`StaticFetcher`] serves library documents from memory and counts requests
//! - [`ShaderProject`] lays out shader files and a cache in a temp directory
//!
//! # Example
//!
//! ```rust,no_run
//! use lygia_resolver::resolver::Resolver;
//! use lygia_resolver::test_utils::{ShaderProject, StaticFetcher};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let project = ShaderProject::new()?;
//! let main = project.write("main.frag", "#include \"lygia/math/const.glsl\"\n")?;
//!
//! let fetcher = StaticFetcher::new().with_document("/math/const.glsl", "#define PI 3.14");
//! let resolver = Resolver::with_fetcher(&project.config(), fetcher)?;
//! let flattened = resolver.resolve_file(&main).await?;
//! assert!(flattened.starts_with("#define PI"));
//! # Ok(())
//! # }
//! ```

pub mod fetcher;
pub mod fixtures;

pub use fetcher::StaticFetcher;
pub use fixtures::ShaderProject;

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` unset, `RUST_LOG` decides;
/// with neither, tests run silently.
///
/// ```bash
/// RUST_LOG=lygia_resolver=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
