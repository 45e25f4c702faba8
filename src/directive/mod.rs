//! Include directive scanning and classification.
//!
//! Shader sources are line oriented. A line is an include directive when,
//! after trimming surrounding whitespace, it begins with the literal
//! `#include "`. Everything after that prefix is reduced to a path token by
//! removing *every* quote, semicolon and whitespace character, so slightly
//! malformed directives are still honored:
//!
//! ```text
//! #include "lygia/math/const.glsl"        -> lygia/math/const.glsl
//!   #include "lygia/math/const.glsl" ;    -> lygia/math/const.glsl
//! #include "common/ noise.glsl""          -> common/noise.glsl
//! float x; #include "a.glsl"              -> (not a directive)
//! ```
//!
//! The tolerated malformations are reported as [`DirectiveAnomaly`] values and
//! never fail a resolution. Classification of the extracted token into a
//! remote or local target lives in [`target`].

pub mod target;

pub use target::{IncludeTarget, VirtualPath, classify};

use crate::constants::INCLUDE_PREFIX;

/// A recognized include directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// The line exactly as it appeared in the document.
    pub raw_line: String,
    /// The path token with quotes, semicolons and whitespace removed.
    pub path_token: String,
}

/// A malformation absorbed by the permissive token extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveAnomaly {
    /// One or more `;` after (or inside) the quoted path.
    StraySemicolon,
    /// Missing closing quote, or more than one.
    UnbalancedQuotes,
    /// Whitespace inside or after the quoted path.
    EmbeddedWhitespace,
}

impl IncludeDirective {
    /// Text following the `#include "` prefix, before any stripping.
    fn remainder(&self) -> &str {
        self.raw_line.trim().strip_prefix(INCLUDE_PREFIX).unwrap_or_default()
    }

    /// Malformations that were tolerated while extracting the token.
    ///
    /// An empty list means the directive was exactly `#include "<path>"`.
    #[must_use]
    pub fn anomalies(&self) -> Vec<DirectiveAnomaly> {
        let remainder = self.remainder();
        let mut anomalies = Vec::new();
        if remainder.contains(';') {
            anomalies.push(DirectiveAnomaly::StraySemicolon);
        }
        let closes_with_quote = remainder.trim_end_matches([';', ' ', '\t']).ends_with('"');
        if remainder.matches('"').count() != 1 || !closes_with_quote {
            anomalies.push(DirectiveAnomaly::UnbalancedQuotes);
        }
        if remainder.chars().any(char::is_whitespace) {
            anomalies.push(DirectiveAnomaly::EmbeddedWhitespace);
        }
        anomalies
    }
}

/// Recognize an include directive on a single line.
///
/// Returns `None` for ordinary lines, for directives that do not start the
/// trimmed line, and for directives whose path is empty once stripped.
///
/// # Examples
///
/// ```
/// use lygia_resolver::directive::scan_line;
///
/// let directive = scan_line("  #include \"lygia/foo.glsl\" ;  ").unwrap();
/// assert_eq!(directive.path_token, "lygia/foo.glsl");
/// assert!(scan_line("vec3 color = vec3(1.0);").is_none());
/// ```
#[must_use]
pub fn scan_line(line: &str) -> Option<IncludeDirective> {
    let remainder = line.trim().strip_prefix(INCLUDE_PREFIX)?;
    let path_token: String =
        remainder.chars().filter(|c| *c != '"' && *c != ';' && !c.is_whitespace()).collect();

    if path_token.is_empty() {
        tracing::warn!("Ignoring include directive with an empty path: {}", line.trim());
        return None;
    }

    Some(IncludeDirective {
        raw_line: line.to_string(),
        path_token,
    })
}

/// Split text into lines on `\n`, dropping a trailing `\r` from each line.
///
/// A trailing newline yields a final empty line, so joining the result with
/// `\n` reproduces LF-terminated input exactly.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Find every include directive in `text`, with its zero-based line index.
#[must_use]
pub fn scan(text: &str) -> Vec<(usize, IncludeDirective)> {
    split_lines(text)
        .enumerate()
        .filter_map(|(index, line)| scan_line(line).map(|directive| (index, directive)))
        .collect()
}
