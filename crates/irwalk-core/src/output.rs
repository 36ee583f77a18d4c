//! JSON output types for CLI responses.
//!
//! Every CLI response carries `status` and `schema_version` so consumers can
//! detect incompatible changes. Output is deterministic: the same tree
//! produces identical bytes.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::context::TraversalContext;
use crate::error::{OutputErrorCode, WalkError};
use crate::node::Node;

/// Schema version of all JSON responses.
pub const SCHEMA_VERSION: &str = "1";

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a WalkError.
    pub fn from_error(err: &WalkError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let details = match err {
            WalkError::UnknownNodeKind { kind, node } => {
                Some(serde_json::json!({ "kind": kind, "node": node }))
            }
            WalkError::StructuralArity {
                kind,
                expected,
                found,
            } => Some(serde_json::json!({
                "kind": kind,
                "expected": expected,
                "found": found,
            })),
            WalkError::NonSingletonResult { site, count } => {
                Some(serde_json::json!({ "site": site, "count": count }))
            }
            _ => None,
        };
        ErrorInfo {
            code,
            message: err.to_string(),
            details,
        }
    }
}

/// Response for any failed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(err: &WalkError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Response for the `walk` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Number of callback invocations.
    pub visited: usize,
    /// The rewritten tree.
    pub tree: Node,
}

impl WalkResponse {
    pub fn new(tree: Node, visited: usize) -> Self {
        WalkResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            visited,
            tree,
        }
    }
}

/// One visited node in a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Kind name for composites, leaf shape otherwise.
    pub label: String,
    /// S-expression rendering of the node as the callback saw it.
    pub node: String,
    #[serde(flatten)]
    pub context: TraversalContext,
}

/// Response for the `trace` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Visited nodes in visit order.
    pub entries: Vec<TraceEntry>,
}

impl TraceResponse {
    pub fn new(entries: Vec<TraceEntry>) -> Self {
        TraceResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            entries,
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for CLI, ensuring consistency.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
