//! Traversal context threaded through every recursive step of a walk.
//!
//! The context answers three questions for the callback: which top-level
//! statement of the enclosing function body a node belongs to, whether the
//! node *is* that statement, and whether the node is read or written.
//!
//! # Derivation Rules
//!
//! | Recursion into | `depth` | `top_level_index` | `is_top_level_root` | `is_read` |
//! |---|---|---|---|---|
//! | function body | kept | reset to 0 | false | kept |
//! | element of a statement list, index 0 | kept | emitted so far + 1 | true | kept |
//! | element of a statement list, index > 0 | kept | kept | false | kept |
//! | statements of a body or block, call arguments | +1 | kept | false | kept |
//! | assignment target, parameter | kept | kept | false | false |
//! | anything else | kept | kept | false | kept |

use serde::{Deserialize, Serialize};

/// Position and role of the node currently being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraversalContext {
    /// Nesting depth, starting at 1 for the root.
    pub depth: usize,
    /// 1-based index of the enclosing top-level statement, or
    /// [`TraversalContext::UNASSIGNED`].
    pub top_level_index: usize,
    /// True when the node is itself a top-level statement.
    pub is_top_level_root: bool,
    /// False when the node is an assignment target or a parameter.
    pub is_read: bool,
}

impl TraversalContext {
    /// Sentinel index: no statement position assigned yet.
    pub const UNASSIGNED: usize = 0;

    /// Context for the root of a walk.
    pub fn root() -> Self {
        TraversalContext {
            depth: 1,
            top_level_index: Self::UNASSIGNED,
            is_top_level_root: false,
            is_read: true,
        }
    }

    /// Whether a statement list recursed with this context is the
    /// top-level statement sequence.
    pub fn is_unassigned(&self) -> bool {
        self.top_level_index == Self::UNASSIGNED
    }

    /// Context for an ordinary child.
    pub fn nested(self) -> Self {
        TraversalContext {
            is_top_level_root: false,
            ..self
        }
    }

    /// Context one level deeper (nested blocks, call arguments).
    pub fn deeper(self) -> Self {
        TraversalContext {
            depth: self.depth + 1,
            ..self.nested()
        }
    }

    /// Context for the body of a function definition.
    ///
    /// The body node stays at the function's depth; its statements are one
    /// level deeper, like those of any statement list.
    pub fn function_body(self) -> Self {
        TraversalContext {
            top_level_index: Self::UNASSIGNED,
            ..self.nested()
        }
    }

    /// Context for a write target.
    pub fn writing(self) -> Self {
        TraversalContext {
            is_read: false,
            ..self.nested()
        }
    }

    /// Context for the next element of a statement list.
    ///
    /// `emitted` is the number of statements already placed in the rebuilt
    /// list, so positions follow the output even when earlier elements were
    /// removed or expanded.
    pub fn sequence_element(self, emitted: usize) -> Self {
        if self.is_unassigned() {
            TraversalContext {
                top_level_index: emitted + 1,
                is_top_level_root: true,
                ..self
            }
        } else {
            self.nested()
        }
    }
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self::root()
    }
}
