//! Error and diagnostic types
//!
//! Two layers: [`CheckError`] aborts a run (the mapping or the store is not
//! usable at all), while [`Diagnostic`] records a recoverable problem that was
//! skipped and reported alongside the results.

use serde::Serialize;
use thiserror::Error;

/// Fatal errors
#[derive(Debug, Error)]
pub enum CheckError {
    /// Error parsing the mapping document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Mapping document could not be read
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid template syntax
    #[error("Invalid template {template:?}: {message}")]
    InvalidTemplate { template: String, message: String },

    /// The relational store could not be opened
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invalid option value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

impl CheckError {
    pub(crate) fn invalid_template(template: &str, message: impl Into<String>) -> Self {
        CheckError::InvalidTemplate {
            template: template.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for fatal operations
pub type CheckResult<T> = Result<T, CheckError>;

/// A relational query failed
///
/// Carries the driver's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A recoverable problem found while indexing, compiling or materializing
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A rule is missing a sub-declaration; the affected part was skipped
    #[error("rule {rule}: {detail}")]
    ExtractionGap { rule: String, detail: String },

    /// Rows lacked (or had NULL in) a column required by a template placeholder
    #[error(
        "predicate {predicate}, rule {rule}: {rows} row(s) could not bind column '{column}' into {template}"
    )]
    BindingGap {
        predicate: String,
        rule: String,
        template: String,
        column: String,
        rows: usize,
    },

    /// Query execution failed for a predicate's logical source
    #[error("predicate {predicate}, rule {rule}: query failed: {error}")]
    QueryError {
        predicate: String,
        rule: String,
        error: QueryError,
    },

    /// Two placeholders with no literal between them; matching is greedy
    #[error("rule {rule}: template {template} has no separator between {{{first}}} and {{{second}}}")]
    AmbiguousTemplate {
        rule: String,
        template: String,
        first: String,
        second: String,
    },

    /// The same placeholder name appears more than once
    #[error("rule {rule}: template {template} repeats placeholder {{{name}}}")]
    DuplicatePlaceholder {
        rule: String,
        template: String,
        name: String,
    },

    /// A declared template failed to compile
    #[error("rule {rule}: invalid template {template}: {message}")]
    InvalidTemplate {
        rule: String,
        template: String,
        message: String,
    },

    /// A materialized identifier does not match its own template
    #[error("predicate {predicate}: identifier {identifier} does not match {template}")]
    VerificationMismatch {
        predicate: String,
        identifier: String,
        template: String,
    },
}

impl Diagnostic {
    /// Record a template of `rule` that failed to compile
    pub(crate) fn invalid_template(rule: &str, template: &str, err: CheckError) -> Self {
        let message = match err {
            CheckError::InvalidTemplate { message, .. } => message,
            other => other.to_string(),
        };
        Diagnostic::InvalidTemplate {
            rule: rule.to_string(),
            template: template.to_string(),
            message,
        }
    }

    /// Short machine-friendly category name
    pub fn category(&self) -> &'static str {
        match self {
            Diagnostic::ExtractionGap { .. } => "extraction_gap",
            Diagnostic::BindingGap { .. } => "binding_gap",
            Diagnostic::QueryError { .. } => "query_error",
            Diagnostic::AmbiguousTemplate { .. } => "ambiguous_template",
            Diagnostic::DuplicatePlaceholder { .. } => "duplicate_placeholder",
            Diagnostic::InvalidTemplate { .. } => "invalid_template",
            Diagnostic::VerificationMismatch { .. } => "verification_mismatch",
        }
    }
}
