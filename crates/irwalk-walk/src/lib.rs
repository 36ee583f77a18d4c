// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Callback-driven walker and rewrite dispatcher for irwalk IR trees.
//!
//! This crate provides:
//! - [`Callback`]: the client contract, offered every node before recursion
//! - [`Walker`]: pre-order traversal that rebuilds the tree as it goes
//! - [`Rule`]: the per-kind recursion table
//! - [`Expander`]: expansion of opaque units into walkable composites
//! - Built-in callbacks: [`Identity`], [`Counting`], [`ContextRecorder`]
//!
//! # Example
//!
//! Replace every read of `x` with `y`, leaving assignment targets alone:
//!
//! ```
//! use irwalk_core::{Leaf, Node, NodeKind};
//! use irwalk_walk::{from_fn, Rewrite, Walker};
//!
//! let tree = Node::composite(NodeKind::Body, vec![
//!     Node::composite(NodeKind::Assign, vec![Node::symbol("x"), Node::symbol("x")]),
//! ]);
//! let mut rename = from_fn(|node, _: &mut (), cx| {
//!     Ok(match node {
//!         Node::Leaf(Leaf::Symbol(name)) if name == "x" && cx.is_read => {
//!             Rewrite::with(Node::symbol("y"))
//!         }
//!         _ => Rewrite::Descend,
//!     })
//! });
//!
//! let out = Walker::default().walk(tree, &mut rename, &mut ()).unwrap();
//! assert_eq!(out.to_string(), "(body (assign x y))");
//! ```

pub mod callback;
pub mod callbacks;
pub mod dispatch;
pub mod expand;
pub mod walker;

pub use callback::{from_fn, Callback, Rewrite};
pub use callbacks::{ContextRecorder, Counting, Identity};
pub use dispatch::{single, Arity, Rule};
pub use expand::{Expander, JsonExpander, NoExpander, JSON_FORMAT};
pub use walker::Walker;
