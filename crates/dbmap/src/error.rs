//! Error types for dbmap

use thiserror::Error;

/// Result type alias for dbmap operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for mapping and database operations.
///
/// Variants fall into three classes:
/// - usage errors ([`Unsupported`](DbError::Unsupported), [`NoUsableField`](DbError::NoUsableField),
///   [`EmptyInList`](DbError::EmptyInList), [`ArgumentMismatch`](DbError::ArgumentMismatch),
///   [`DuplicateName`](DbError::DuplicateName)) — programming mistakes, never retryable;
/// - not-found ([`NotFound`](DbError::NotFound)) — recoverable, the caller decides;
/// - collaborator errors (the rest) — failures of the underlying client or
///   configuration source, wrapped with enough context to diagnose.
#[derive(Debug, Error)]
pub enum DbError {
    /// Operation not defined for the input or dialect
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A mapping produced zero usable columns
    #[error("No usable field in struct")]
    NoUsableField,

    /// An IN-list was built from an empty collection
    #[error("Need arguments of in condition")]
    EmptyInList,

    /// Placeholder count does not match bound argument count
    #[error("Placeholder count {placeholders} does not match argument count {args}")]
    ArgumentMismatch { placeholders: usize, args: usize },

    /// A registry name was registered twice
    #[error("Connection name already registered: {0}")]
    DuplicateName(String),

    /// Entry or row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Raw failure reported by the underlying client
    #[error("Client error: {0}")]
    Client(String),

    /// Statement execution error, carrying the offending SQL text
    #[error("Execute error for `{sql}`: {message}")]
    Execute { sql: String, message: String },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration source error, carrying the section name
    #[error("Config error in section '{section}': {message}")]
    Config { section: String, message: String },
}

impl DbError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a client error
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error for a named section
    pub fn config(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            section: section.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a usage error (caller bug, never retryable)
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::Unsupported(_)
                | Self::NoUsableField
                | Self::EmptyInList
                | Self::ArgumentMismatch { .. }
                | Self::DuplicateName(_)
        )
    }

    /// Attach the offending statement text to a raw client failure.
    ///
    /// Usage and not-found errors pass through unchanged; an error that
    /// already carries a statement is not re-wrapped.
    pub fn with_statement(self, sql: &str) -> Self {
        match self {
            Self::Client(message) => Self::Execute {
                sql: sql.to_string(),
                message,
            },
            other => other,
        }
    }
}
