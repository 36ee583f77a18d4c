//! irwalk: callback-driven rewriting engine for compiler IR trees.
//!
//! A client supplies a callback; the engine walks a program tree in
//! pre-order, offers every node to the callback, and rebuilds the tree from
//! whatever the callback returns, recursing by per-kind rules where the
//! callback has no opinion.

// Core infrastructure - re-exported from irwalk-core
pub use irwalk_core::config;
pub use irwalk_core::context;
pub use irwalk_core::error;
pub use irwalk_core::node;
pub use irwalk_core::output;

// Walker - re-exported from irwalk-walk
pub use irwalk_walk::callback;
pub use irwalk_walk::callbacks;
pub use irwalk_walk::dispatch;
pub use irwalk_walk::expand;
pub use irwalk_walk::walker;

pub use irwalk_core::{Node, NodeKind, TraversalContext, WalkConfig, WalkError, WalkResult};
pub use irwalk_walk::{from_fn, Callback, Rewrite, Walker};

// Front door
pub mod cli;
