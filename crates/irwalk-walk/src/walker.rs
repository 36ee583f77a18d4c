// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The walker: offers each node to the callback, then recurses by rule.
//!
//! For every node it reaches, the walker:
//!
//! 1. expands an opaque unit into its composite through the [`Expander`];
//! 2. offers the node to the [`Callback`]; a replacement is returned as is;
//! 3. otherwise rebuilds the node: composites by their [`Rule`](crate::Rule),
//!    aggregates element by element, leaves unchanged.
//!
//! The tree is consumed and rebuilt; nothing is shared between input and
//! output, so a failed walk leaves no partially rewritten tree behind.
//!
//! Recursion depth is bounded by [`WalkConfig::max_nesting`], not by the
//! caller's thread stack: when the stack runs low the walker continues on a
//! heap-allocated segment.

use tracing::{debug, trace};

use irwalk_core::{
    Aggregate, Leaf, Node, TraversalContext, Verbosity, WalkConfig, WalkError, WalkResult,
};

use crate::callback::{Callback, Rewrite};
use crate::dispatch::{dispatch, single, Recurse};
use crate::expand::{Expander, NoExpander};

/// Remaining stack below which a nesting level switches to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated for deep trees.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Tree walker configured with an expander for opaque units.
#[derive(Debug, Clone)]
pub struct Walker<E = NoExpander> {
    config: WalkConfig,
    expander: E,
}

impl Walker {
    /// Create a walker that rejects opaque units.
    pub fn new(config: WalkConfig) -> Self {
        Walker {
            config,
            expander: NoExpander,
        }
    }
}

impl Default for Walker {
    fn default() -> Self {
        Walker::new(WalkConfig::default())
    }
}

impl<E: Expander> Walker<E> {
    /// Use `expander` for opaque units.
    pub fn with_expander<X: Expander>(self, expander: X) -> Walker<X> {
        Walker {
            config: self.config,
            expander,
        }
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walk `root` and return the rewritten tree.
    ///
    /// The root position holds exactly one node: a callback that removes or
    /// expands the root fails with [`WalkError::NonSingletonResult`].
    pub fn walk<S, C>(&self, root: Node, callback: &mut C, state: &mut S) -> WalkResult<Node>
    where
        S: ?Sized,
        C: Callback<S>,
    {
        let traced = self.config.traces(Verbosity::Summary);
        if traced {
            debug!("walk started at `{}`", root.label_str());
        }
        let nodes = self.visit(root, TraversalContext::root(), callback, state)?;
        let root = single(nodes, || "the root".to_string())?;
        if traced {
            debug!("walk finished at `{}`", root.label_str());
        }
        Ok(root)
    }

    /// Rewrite `root` in place.
    ///
    /// On error `root` is left exactly as it was.
    pub fn rewrite<S, C>(&self, root: &mut Node, callback: &mut C, state: &mut S) -> WalkResult<()>
    where
        S: ?Sized,
        C: Callback<S>,
    {
        *root = self.walk(root.clone(), callback, state)?;
        Ok(())
    }

    /// Walk a single node in context `cx`.
    ///
    /// Returns whatever the node became: one node after structural recursion,
    /// or the callback's replacement, which may hold any number of nodes.
    /// Callbacks use this to walk their own replacements.
    pub fn visit<S, C>(
        &self,
        node: Node,
        cx: TraversalContext,
        callback: &mut C,
        state: &mut S,
    ) -> WalkResult<Vec<Node>>
    where
        S: ?Sized,
        C: Callback<S>,
    {
        let mut pass = Pass {
            walker: self,
            callback,
            state,
            nesting: 0,
        };
        pass.recurse(node, cx)
    }
}

/// State of one walk.
struct Pass<'a, E, C, S: ?Sized> {
    walker: &'a Walker<E>,
    callback: &'a mut C,
    state: &'a mut S,
    nesting: usize,
}

impl<E, C, S> Pass<'_, E, C, S>
where
    E: Expander,
    C: Callback<S>,
    S: ?Sized,
{
    fn visit_node(&mut self, node: Node, cx: TraversalContext) -> WalkResult<Vec<Node>> {
        let walker = self.walker;
        let config = &walker.config;
        let node = match node {
            Node::Opaque(unit) => {
                if config.traces(Verbosity::Summary) {
                    debug!("expanding opaque unit ({})", unit.format);
                }
                Node::Composite(walker.expander.expand(&unit)?)
            }
            other => other,
        };

        if config.traces(Verbosity::Nodes) {
            trace!(
                depth = cx.depth,
                top_level_index = cx.top_level_index,
                is_top_level_root = cx.is_top_level_root,
                is_read = cx.is_read,
                "visit {}",
                node
            );
        }

        if let Rewrite::Replace(nodes) = self.callback.visit(&node, self.state, &cx)? {
            return Ok(nodes);
        }

        let rebuilt = match node {
            Node::Composite(c) => Node::Composite(dispatch(self, c, cx)?),
            Node::Aggregate(agg) => Node::Aggregate(self.aggregate(agg, cx)?),
            Node::Leaf(Leaf::Unrecognized(value)) => {
                return Err(WalkError::UnsupportedLeafType {
                    shape: value.to_string(),
                })
            }
            Node::Leaf(leaf) => Node::Leaf(leaf),
            Node::Opaque(unit) => {
                return Err(WalkError::internal(format!(
                    "opaque unit ({}) reached dispatch unexpanded",
                    unit.format
                )))
            }
        };
        Ok(vec![rebuilt])
    }

    /// Walk each element; the aggregate keeps its type name and size.
    fn aggregate(&mut self, agg: Aggregate, cx: TraversalContext) -> WalkResult<Aggregate> {
        let Aggregate {
            type_name,
            elements,
        } = agg;
        let mut rebuilt = Vec::with_capacity(elements.len());
        for (i, element) in elements.into_iter().enumerate() {
            let nodes = self.recurse(element, cx.nested())?;
            rebuilt.push(single(nodes, || format!("`{}` element {}", type_name, i))?);
        }
        Ok(Aggregate {
            type_name,
            elements: rebuilt,
        })
    }
}

impl<E, C, S> Recurse for Pass<'_, E, C, S>
where
    E: Expander,
    C: Callback<S>,
    S: ?Sized,
{
    fn recurse(&mut self, node: Node, cx: TraversalContext) -> WalkResult<Vec<Node>> {
        let limit = self.walker.config.max_nesting;
        if self.nesting >= limit {
            return Err(WalkError::NestingTooDeep { limit });
        }
        self.nesting += 1;
        // Grow the stack on the heap for deeply nested trees
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.visit_node(node, cx)
        });
        self.nesting -= 1;
        result
    }

    fn config(&self) -> &WalkConfig {
        &self.walker.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::from_fn;
    use crate::expand::JsonExpander;
    use irwalk_core::{NodeKind, OpaqueUnit};

    fn keep() -> impl FnMut(&Node, &mut (), &TraversalContext) -> WalkResult<Rewrite> {
        |_, _, _| Ok(Rewrite::Descend)
    }

    #[test]
    fn leaves_pass_through() {
        let walker = Walker::default();
        let out = walker.walk(Node::int(7), &mut keep(), &mut ()).unwrap();
        assert_eq!(out, Node::int(7));
    }

    #[test]
    fn root_replacement_must_be_single() {
        let walker = Walker::default();
        let mut drop_all = from_fn(|_, _: &mut (), _| Ok(Rewrite::remove()));
        let err = walker.walk(Node::int(7), &mut drop_all, &mut ()).unwrap_err();
        assert!(matches!(
            err,
            WalkError::NonSingletonResult { ref site, count: 0 } if site == "the root"
        ));
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let mut tree = Node::int(0);
        for _ in 0..10 {
            tree = Node::composite(NodeKind::Tuple, vec![tree]);
        }
        let walker = Walker::new(WalkConfig::new().with_max_nesting(5));
        let err = walker.walk(tree.clone(), &mut keep(), &mut ()).unwrap_err();
        assert!(matches!(err, WalkError::NestingTooDeep { limit: 5 }));

        let walker = Walker::new(WalkConfig::new().with_max_nesting(11));
        assert_eq!(walker.walk(tree.clone(), &mut keep(), &mut ()).unwrap(), tree);
    }

    #[test]
    fn opaque_units_need_an_expander() {
        let body = Node::composite(NodeKind::Body, vec![Node::int(1)]);
        let unit = Node::Opaque(OpaqueUnit::new("json", serde_json::to_string(&body).unwrap()));

        let err = Walker::default()
            .walk(unit.clone(), &mut keep(), &mut ())
            .unwrap_err();
        assert!(matches!(err, WalkError::Expansion { .. }));

        let walker = Walker::default().with_expander(JsonExpander);
        assert_eq!(walker.walk(unit, &mut keep(), &mut ()).unwrap(), body);
    }

    #[test]
    fn rewrite_commits_only_on_success() {
        let walker = Walker::default();
        let mut tree = Node::composite(NodeKind::Tuple, vec![Node::symbol("a")]);
        let mut rename = from_fn(|node, _: &mut (), _| {
            Ok(match node {
                Node::Leaf(Leaf::Symbol(name)) => Rewrite::with(Node::symbol(format!("{}1", name))),
                _ => Rewrite::Descend,
            })
        });
        walker.rewrite(&mut tree, &mut rename, &mut ()).unwrap();
        assert_eq!(tree.to_string(), "(tuple a1)");

        let mut fail = from_fn(|node, _: &mut (), _| {
            if node.is_symbol() {
                Err(WalkError::aborted("stop"))
            } else {
                Ok(Rewrite::Descend)
            }
        });
        assert!(walker.rewrite(&mut tree, &mut fail, &mut ()).is_err());
        assert_eq!(tree.to_string(), "(tuple a1)");
    }
}
