//! Error types and error code constants for irwalk.
//!
//! Every failure during a walk is fatal: the tree is rewritten as the walker
//! descends, so there is no point at which a half-finished rewrite could be
//! resumed or rolled back. [`WalkError`] is the single error type returned by
//! the walker, the expander collaborators and the CLI front door.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (unreadable input, malformed JSON, bad config)
//! - `3`: Structural errors (arity, singleton, unknown kind, leaf shape, expansion)
//! - `4`: Walk aborted by the callback
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// The tree does not have the shape a dispatch rule requires.
    StructuralError = 3,
    /// The callback cancelled the walk.
    Aborted = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Error raised while walking or rewriting an IR tree.
#[derive(Debug, Error)]
pub enum WalkError {
    /// A positional or special rule needed exactly one replacement node.
    #[error("expected exactly one node from {site}, got {count}")]
    NonSingletonResult { site: String, count: usize },

    /// A composite did not have the child count its rule requires.
    #[error("`{kind}` expects {expected} children, found {found}")]
    StructuralArity {
        kind: String,
        expected: String,
        found: usize,
    },

    /// No dispatch rule exists for the composite's kind.
    #[error("unknown node kind `{kind}` in {node}")]
    UnknownNodeKind { kind: String, node: String },

    /// A function body did not come back as a body or block composite.
    #[error("function body must be a body or block node, found {found}")]
    MalformedFunctionBody { found: String },

    /// A leaf value matched none of the recognized leaf shapes.
    #[error("unsupported leaf value: {shape}")]
    UnsupportedLeafType { shape: String },

    /// The decompression collaborator could not expand an opaque unit.
    #[error("cannot expand opaque unit ({format}): {message}")]
    Expansion { format: String, message: String },

    /// The callback cancelled the walk.
    #[error("walk aborted: {message}")]
    Aborted { message: String },

    /// The tree nests deeper than the configured limit.
    #[error("tree nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    /// Input could not be read or decoded.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Result type for walk operations.
pub type WalkResult<T> = Result<T, WalkError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&WalkError> for OutputErrorCode {
    fn from(err: &WalkError) -> Self {
        match err {
            WalkError::NonSingletonResult { .. }
            | WalkError::StructuralArity { .. }
            | WalkError::UnknownNodeKind { .. }
            | WalkError::MalformedFunctionBody { .. }
            | WalkError::UnsupportedLeafType { .. }
            | WalkError::Expansion { .. }
            | WalkError::NestingTooDeep { .. } => OutputErrorCode::StructuralError,
            WalkError::Aborted { .. } => OutputErrorCode::Aborted,
            WalkError::InvalidInput { .. } => OutputErrorCode::InvalidArguments,
            WalkError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<WalkError> for OutputErrorCode {
    fn from(err: WalkError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl WalkError {
    /// Create a non-singleton error for the given site.
    pub fn non_singleton(site: impl Into<String>, count: usize) -> Self {
        WalkError::NonSingletonResult {
            site: site.into(),
            count,
        }
    }

    /// Create an arity error.
    pub fn arity(kind: impl Into<String>, expected: impl Into<String>, found: usize) -> Self {
        WalkError::StructuralArity {
            kind: kind.into(),
            expected: expected.into(),
            found,
        }
    }

    /// Create a callback abort. Callbacks return this to stop the walk.
    pub fn aborted(message: impl Into<String>) -> Self {
        WalkError::Aborted {
            message: message.into(),
        }
    }

    /// Create an expansion failure.
    pub fn expansion(format: impl Into<String>, message: impl Into<String>) -> Self {
        WalkError::Expansion {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        WalkError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        WalkError::Internal {
            message: message.into(),
        }
    }

    /// Get the output error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

impl From<serde_json::Error> for WalkError {
    fn from(err: serde_json::Error) -> Self {
        WalkError::invalid_input(format!("JSON error: {}", err))
    }
}

// ============================================================================
// Tests
// ============================================================================
