//! Luming - a line-oriented layout notation for UI structure
//!
//! This library parses Luming source into statements and templates, expands
//! the templates into a runtime tree, and renders that tree as an HTML preview
//! or as framework component files.
//!
//! # Example
//!
//! ```rust
//! use luming::{compile, CompileOptions};
//!
//! let result = compile("tab: bg blue; rd 8\ntab + tab", &CompileOptions::default());
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.roots.len(), 2);
//! assert_eq!(result.roots[0].id, "tab_1");
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generator;
pub mod parser;
pub mod renderer;
pub mod style;
pub mod template;

pub use config::{Config, ConfigError};
pub use diagnostics::{Diagnostic, Level};
pub use error::{LexError, ParseError, SyntaxError};
pub use generator::{generate_files, write_files, Framework, GenerateConfig, GeneratedFile};
pub use parser::{parse, parse_with_resolver, ParsedDocument};
pub use renderer::{render_preview_html, PreviewConfig};
pub use style::{ShorthandResolver, StyleDeclaration, StyleResolver};
pub use template::{RuntimeLayout, RuntimeNode};

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur around a compilation: reading input, loading
/// configuration and writing output
#[derive(Debug, Error)]
pub enum LumingError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read stdin: {0}")]
    Stdin(std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// What the caller intends to do with the result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    #[default]
    Preview,
    Generate,
}

/// Options for one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Forwarded to the result; does not change parsing or expansion
    pub mode: CompileMode,
    /// Explicit roots, used when the source has no structure statements
    pub root_names: Vec<String>,
}

impl CompileOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compile mode
    pub fn with_mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the root names
    pub fn with_root_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Append one root name
    pub fn with_root(mut self, name: impl Into<String>) -> Self {
        self.root_names.push(name.into());
        self
    }
}

/// Everything produced by one compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileResult {
    pub mode: CompileMode,
    pub document: ParsedDocument,
    pub roots: Vec<RuntimeNode>,
    pub scenes: Vec<RuntimeLayout>,
    /// Parse diagnostics followed by expansion diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileResult {
    /// True when any diagnostic is an error
    pub fn has_errors(&self) -> bool {
        diagnostics::has_errors(&self.diagnostics)
    }
}

/// Compile source with the built-in shorthand dictionary
///
/// Compilation never fails: problems are reported as diagnostics.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult {
    compile_with_resolver(source, options, &ShorthandResolver)
}

/// Compile source, resolving style tokens with `resolver`
///
/// # Example
///
/// ```rust
/// use luming::{compile_with_resolver, CompileOptions, StyleDeclaration};
///
/// let raw = |token: &str| Some(StyleDeclaration::new("x-raw", token));
/// let result = compile_with_resolver("box: anything", &CompileOptions::default(), &raw);
/// assert_eq!(result.roots[0].styles["x-raw"], "anything");
/// ```
pub fn compile_with_resolver(
    source: &str,
    options: &CompileOptions,
    resolver: &dyn StyleResolver,
) -> CompileResult {
    let document = parse_with_resolver(source, resolver);
    let expansion = template::expand(&document, options);

    let mut diagnostics = document.diagnostics.clone();
    diagnostics.extend(expansion.diagnostics);
    tracing::debug!(
        statements = document.statements.len(),
        templates = document.templates.len(),
        diagnostics = diagnostics.len(),
        "compiled"
    );

    CompileResult {
        mode: options.mode,
        document,
        roots: expansion.roots,
        scenes: expansion.scenes,
        diagnostics,
    }
}
