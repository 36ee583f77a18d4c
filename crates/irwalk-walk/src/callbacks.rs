// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Built-in callbacks.

use irwalk_core::output::TraceEntry;
use irwalk_core::{Node, TraversalContext, WalkResult};

use crate::callback::{Callback, Rewrite};

/// Declines every node. Walking with it rebuilds the tree unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<S: ?Sized> Callback<S> for Identity {
    fn visit(
        &mut self,
        _node: &Node,
        _state: &mut S,
        _cx: &TraversalContext,
    ) -> WalkResult<Rewrite> {
        Ok(Rewrite::Descend)
    }
}

/// Counts callback invocations into a `usize` state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counting;

impl Callback<usize> for Counting {
    fn visit(
        &mut self,
        _node: &Node,
        count: &mut usize,
        _cx: &TraversalContext,
    ) -> WalkResult<Rewrite> {
        *count += 1;
        Ok(Rewrite::Descend)
    }
}

/// Records every offered node with the context it was offered in.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextRecorder;

impl Callback<Vec<TraceEntry>> for ContextRecorder {
    fn visit(
        &mut self,
        node: &Node,
        entries: &mut Vec<TraceEntry>,
        cx: &TraversalContext,
    ) -> WalkResult<Rewrite> {
        entries.push(TraceEntry {
            label: node.label_str().to_string(),
            node: node.to_string(),
            context: *cx,
        });
        Ok(Rewrite::Descend)
    }
}
