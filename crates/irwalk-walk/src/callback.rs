// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Callback contract for tree rewriting.
//!
//! The walker offers every node to a single client callback before it looks
//! at the node's structure. The callback either declines ([`Rewrite::Descend`])
//! or replaces the node outright ([`Rewrite::Replace`]).
//!
//! # Replacement Semantics
//!
//! A replacement suppresses structural recursion into the original node's
//! children, and the walker does not recurse into the replacement either: a
//! callback that wants its replacement walked must do so itself.
//!
//! Most positions in the tree hold exactly one node, so most replacements
//! must contain exactly one node. Only statement and argument lists accept
//! zero nodes (removal) or several (expansion).
//!
//! # Callback State
//!
//! The `state` argument is owned by the client and passed unchanged to every
//! invocation. The engine never inspects it and drops its borrow when the walk
//! returns.
//!
//! Any closure with the right signature is a callback; [`from_fn`] pins the
//! signature so closure parameters need no annotations:
//!
//! ```
//! use irwalk_core::{Node, NodeKind, WalkConfig};
//! use irwalk_walk::{from_fn, Rewrite, Walker};
//!
//! let tree = Node::composite(NodeKind::Tuple, vec![Node::symbol("a"), Node::symbol("b")]);
//! let mut symbols = Vec::new();
//! let mut collect = from_fn(|node, seen: &mut Vec<String>, _cx| {
//!     if node.is_symbol() {
//!         seen.push(node.to_string());
//!     }
//!     Ok(Rewrite::Descend)
//! });
//!
//! let walker = Walker::new(WalkConfig::default());
//! walker.walk(tree, &mut collect, &mut symbols).unwrap();
//! assert_eq!(symbols, vec!["a", "b"]);
//! ```

use irwalk_core::{Node, TraversalContext, WalkResult};

/// What a callback wants done with the node it was offered.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// No opinion: recurse into the node's structure.
    Descend,
    /// Replace the node with these nodes, without recursing into them.
    Replace(Vec<Node>),
}

impl Rewrite {
    /// Replace the node with a single node.
    pub fn with(node: Node) -> Self {
        Rewrite::Replace(vec![node])
    }

    /// Remove the node. Only valid inside statement and argument lists.
    pub fn remove() -> Self {
        Rewrite::Replace(Vec::new())
    }

    /// Replace the node with several nodes. Only valid inside statement and
    /// argument lists.
    pub fn flatten(nodes: Vec<Node>) -> Self {
        Rewrite::Replace(nodes)
    }

    /// Returns true if this is the `Descend` variant.
    pub fn is_descend(&self) -> bool {
        matches!(self, Self::Descend)
    }
}

impl From<Node> for Rewrite {
    fn from(node: Node) -> Self {
        Rewrite::with(node)
    }
}

impl From<Option<Vec<Node>>> for Rewrite {
    fn from(replacement: Option<Vec<Node>>) -> Self {
        match replacement {
            Some(nodes) => Rewrite::Replace(nodes),
            None => Rewrite::Descend,
        }
    }
}

/// Client-supplied function that inspects or replaces nodes.
///
/// Returning an error aborts the whole walk; use
/// [`WalkError::aborted`](irwalk_core::WalkError::aborted) for deliberate
/// cancellation.
pub trait Callback<S: ?Sized> {
    /// Offer `node` to the callback. `cx` carries the top-level statement
    /// index, the top-level-root flag and the read/write flag.
    fn visit(&mut self, node: &Node, state: &mut S, cx: &TraversalContext)
        -> WalkResult<Rewrite>;
}

impl<S: ?Sized, F> Callback<S> for F
where
    F: FnMut(&Node, &mut S, &TraversalContext) -> WalkResult<Rewrite>,
{
    fn visit(
        &mut self,
        node: &Node,
        state: &mut S,
        cx: &TraversalContext,
    ) -> WalkResult<Rewrite> {
        self(node, state, cx)
    }
}

/// Pin a closure to the callback signature.
pub fn from_fn<S: ?Sized, F>(f: F) -> F
where
    F: FnMut(&Node, &mut S, &TraversalContext) -> WalkResult<Rewrite>,
{
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_constructors() {
        assert!(Rewrite::Descend.is_descend());
        assert_eq!(Rewrite::with(Node::int(1)), Rewrite::Replace(vec![Node::int(1)]));
        assert_eq!(Rewrite::remove(), Rewrite::Replace(vec![]));
        assert!(!Rewrite::flatten(vec![Node::int(1), Node::int(2)]).is_descend());
    }

    #[test]
    fn optional_replacement_converts() {
        assert_eq!(Rewrite::from(None::<Vec<Node>>), Rewrite::Descend);
        assert_eq!(
            Rewrite::from(Some(vec![Node::nothing()])),
            Rewrite::with(Node::nothing())
        );
        assert_eq!(Rewrite::from(Node::symbol("y")), Rewrite::with(Node::symbol("y")));
    }

    #[test]
    fn closures_are_callbacks() {
        let mut calls = 0usize;
        let mut cb = from_fn(|_node, count: &mut usize, cx| {
            *count += cx.depth;
            Ok(Rewrite::Descend)
        });
        let cx = TraversalContext::root();
        assert!(cb.visit(&Node::nothing(), &mut calls, &cx).unwrap().is_descend());
        assert!(cb.visit(&Node::nothing(), &mut calls, &cx).unwrap().is_descend());
        assert_eq!(calls, 2);
    }
}
