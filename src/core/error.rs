//! Error handling for the include resolver
//!
//! This module provides the strongly-typed error returned by every library
//! operation, plus user-friendly error reporting for the CLI. The design
//! mirrors two needs:
//! 1. **Typed errors** so callers can tell a missing local file from a
//!    network failure or an include cycle
//! 2. **Readable messages** with suggestions when the CLI reports a failure
//!
//! # Fatal and non-fatal errors
//!
//! - [`IncludeError::LocalRead`], [`IncludeError::Fetch`] and
//!   [`IncludeError::CyclicInclude`] abort the whole resolution of the
//!   top-level document; no partial output is ever returned.
//! - [`IncludeError::CacheWrite`] is constructed when a fetched document
//!   cannot be persisted. The remote store logs it and keeps serving the
//!   in-memory bytes, so it never reaches the resolver's caller.
//! - Malformed but recognizable directives are not errors at all; see
//!   [`crate::directive::DirectiveAnomaly`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use lygia_resolver::core::{IncludeError, user_friendly_error};
//!
//! let error = IncludeError::CyclicInclude {
//!     chain: "/shaders/a.glsl -> /shaders/b.glsl -> /shaders/a.glsl".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a remote fetch did not produce a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-success status code.
    Status(u16),
    /// The request never completed (DNS, TLS, connection reset, body decoding).
    Transport(String),
    /// The attempt exceeded the configured fetch timeout.
    Timeout(Duration),
}

impl FetchFailure {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Client errors such as 404 are final; server errors, transport failures
    /// and timeouts are worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Status(code) => *code >= 500,
            Self::Transport(_) | Self::Timeout(_) => true,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Transport(reason) => write!(f, "{reason}"),
            Self::Timeout(after) => write!(f, "timed out after {}ms", after.as_millis()),
        }
    }
}

/// The error type for resolver operations.
///
/// Every variant carries the identifier, path or URL needed to tell the user
/// which document failed and why.
#[derive(Error, Debug)]
pub enum IncludeError {
    /// A local include could not be read.
    ///
    /// `path` is the resolved absolute path, after joining the token with the
    /// directory of the including document.
    #[error("Failed to read local include {}: {source}", path.display())]
    LocalRead {
        /// Resolved absolute path of the include target
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A remote document could not be fetched.
    #[error("Failed to fetch {url}: {cause}")]
    Fetch {
        /// Full URL that was requested
        url: String,
        /// Status code, transport failure, or timeout
        cause: FetchFailure,
    },

    /// An include target is already being resolved further up the chain.
    ///
    /// `chain` lists the active documents followed by the repeated target,
    /// joined with ` -> `.
    #[error("Cyclic include detected: {chain}")]
    CyclicInclude {
        /// The include chain that closes the cycle
        chain: String,
    },

    /// A fetched document could not be persisted to the cache.
    #[error("Failed to write cache entry {}: {source}", path.display())]
    CacheWrite {
        /// Cache file that could not be written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration (bad glob, unreadable config file, bad URL).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn clone_io(error: &std::io::Error) -> std::io::Error {
    std::io::Error::new(error.kind(), error.to_string())
}

impl Clone for IncludeError {
    fn clone(&self) -> Self {
        match self {
            Self::LocalRead {
                path,
                source,
            } => Self::LocalRead {
                path: path.clone(),
                source: clone_io(source),
            },
            Self::Fetch {
                url,
                cause,
            } => Self::Fetch {
                url: url.clone(),
                cause: cause.clone(),
            },
            Self::CyclicInclude {
                chain,
            } => Self::CyclicInclude {
                chain: chain.clone(),
            },
            Self::CacheWrite {
                path,
                source,
            } => Self::CacheWrite {
                path: path.clone(),
                source: clone_io(source),
            },
            Self::Config {
                message,
            } => Self::Config {
                message: message.clone(),
            },
            Self::Io(e) => Self::Io(clone_io(e)),
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps an [`IncludeError`] and adds an optional suggestion
/// and details line. It is how the CLI presents failures.
///
/// # Examples
///
/// ```rust,no_run
/// use lygia_resolver::core::{ErrorContext, IncludeError};
///
/// let context = ErrorContext::new(IncludeError::Other { message: "boom".into() })
///     .with_suggestion("Run with --verbose for more information");
/// eprintln!("{context}");
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: IncludeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: IncludeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`IncludeError`] anywhere in the `anyhow` chain, then falls back
/// to [`std::io::Error`] and [`toml::de::Error`], and finally to the plain
/// message of the outermost error.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(include_error) = error.chain().find_map(|e| e.downcast_ref::<IncludeError>()) {
        return create_error_context(include_error.clone());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(IncludeError::Config {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your lygia.toml file");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(IncludeError::Io(clone_io(io_error)))
            .with_suggestion("Check file and directory permissions");
    }

    let details = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();
    let context = ErrorContext::new(IncludeError::Other {
        message: error.to_string(),
    });
    if details.is_empty() {
        context
    } else {
        context.with_details(details.join(": "))
    }
}

fn create_error_context(error: IncludeError) -> ErrorContext {
    match &error {
        IncludeError::LocalRead {
            source,
            ..
        } if source.kind() == std::io::ErrorKind::NotFound => ErrorContext::new(error)
            .with_suggestion(
                "Local includes are resolved relative to the including file's directory; check the path spelling",
            ),
        IncludeError::LocalRead {
            ..
        } => ErrorContext::new(error).with_suggestion("Check that the file is readable UTF-8 text"),
        IncludeError::Fetch {
            cause: FetchFailure::Status(404),
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the include path against the library index at https://lygia.xyz"),
        IncludeError::Fetch {
            cause: FetchFailure::Timeout(_),
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Increase fetch_timeout_secs in lygia.toml or check your connection"),
        IncludeError::Fetch {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check your network connection; cached documents keep working offline"),
        IncludeError::CyclicInclude {
            ..
        } => ErrorContext::new(error)
            .with_details("A file may not include itself, directly or through other includes")
            .with_suggestion("Remove one of the includes in the chain"),
        IncludeError::CacheWrite {
            ..
        } => ErrorContext::new(error).with_suggestion("Check permissions on the cache directory"),
        IncludeError::Config {
            ..
        } => ErrorContext::new(error).with_suggestion("Check lygia.toml and command-line options"),
        IncludeError::Io(_)
        | IncludeError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
