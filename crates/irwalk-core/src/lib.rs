//! Core infrastructure for irwalk.
//!
//! This crate provides the language-agnostic pieces the walker is built on:
//! - IR node model (composites, leaves, aggregates, opaque units)
//! - Traversal context and its derivation rules
//! - Error types and error codes
//! - Walker configuration
//! - JSON output types for CLI responses

pub mod config;
pub mod context;
pub mod error;
pub mod node;
pub mod output;

pub use config::{Verbosity, WalkConfig};
pub use context::TraversalContext;
pub use error::{OutputErrorCode, WalkError, WalkResult};
pub use node::{Aggregate, Composite, Leaf, Node, NodeKind, OpaqueUnit, Scalar, TypeTag};
