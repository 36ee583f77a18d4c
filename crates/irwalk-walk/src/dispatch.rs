// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-kind recursion rules.
//!
//! [`Rule::for_kind`] maps every [`NodeKind`] to the rule that decides which
//! children the walker descends into, in which context, and how the node is
//! reassembled afterwards. The match is exhaustive: adding a kind without a
//! rule does not compile.
//!
//! | Kind | Rule |
//! |---|---|
//! | `function_def`, `lambda` | [`Rule::Function`] |
//! | `body`, `block`, `field_access`, `return`, `branch_args` | [`Rule::Sequence`] |
//! | `assign`, `add_assign` | [`Rule::Assign`] |
//! | `type_assert` | [`Rule::Positional`], child 0 |
//! | `call`, `call1` | [`Rule::Call`] |
//! | `index_get`, `new`, `for`, `typed_comprehension`, `comprehension`, `range`, `tuple`, `foreign_call`, `index_ref` | [`Rule::EachChild`] |
//! | `goto_if_not`, `type_goto`, `array_size` | [`Rule::Positional`], children 0 and 1 of exactly 2 |
//! | `alloc` | [`Rule::Alloc`] |
//! | `copy` | [`Rule::CopyToCall`] |
//! | `line`, `copy_ast`, `bounds_check`, `enter`, `leave`, `current_exception`, `address_of`, `vcat`, `meta`, `const` | [`Rule::Skip`] |
//! | anything else | [`Rule::Reject`] |
//!
//! Rules rewrite the composite's kind and children; the annotation is never
//! touched.

use std::fmt;
use std::mem;

use tracing::debug;

use irwalk_core::{
    Composite, Node, NodeKind, TraversalContext, Verbosity, WalkConfig, WalkError, WalkResult,
};

/// Child count a rule requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    AtLeast(usize),
    Exactly(usize),
}

impl Arity {
    /// Whether `found` children satisfy this arity.
    pub fn admits(self, found: usize) -> bool {
        match self {
            Arity::AtLeast(n) => found >= n,
            Arity::Exactly(n) => found == n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Exactly(n) => write!(f, "exactly {}", n),
        }
    }
}

/// How the walker recurses into a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Children form a statement or argument list. Each child may come back
    /// as zero, one or several nodes; the results are concatenated.
    Sequence,
    /// Every child is walked and must come back as exactly one node.
    EachChild,
    /// Only the listed children are walked, each as exactly one node.
    Positional {
        indices: &'static [usize],
        arity: Arity,
    },
    /// Parameters (written, one node each), then the body, which must come
    /// back as a `body` or `block` node. The body is the last child.
    Function,
    /// Target (written) and value, one node each.
    Assign,
    /// Callee unless it is a bare symbol, then the arguments as a list one
    /// level deeper.
    Call,
    /// Element type untouched, dimensions as a list.
    Alloc,
    /// Rewrite into a call to the configured copy routine, then apply
    /// [`Rule::Call`].
    CopyToCall,
    /// Offered to the callback only; children are never inspected.
    Skip,
    /// No rule: the walk fails with [`WalkError::UnknownNodeKind`].
    Reject,
}

impl Rule {
    /// The rule for `kind`.
    pub fn for_kind(kind: &NodeKind) -> Rule {
        match kind {
            NodeKind::FunctionDef | NodeKind::Lambda => Rule::Function,
            NodeKind::Body
            | NodeKind::Block
            | NodeKind::FieldAccess
            | NodeKind::Return
            | NodeKind::BranchArgs => Rule::Sequence,
            NodeKind::Assign | NodeKind::AddAssign => Rule::Assign,
            NodeKind::TypeAssert => Rule::Positional {
                indices: &[0],
                arity: Arity::AtLeast(1),
            },
            NodeKind::Call | NodeKind::Call1 => Rule::Call,
            NodeKind::IndexGet
            | NodeKind::New
            | NodeKind::For
            | NodeKind::TypedComprehension
            | NodeKind::Comprehension
            | NodeKind::Range
            | NodeKind::Tuple
            | NodeKind::ForeignCall
            | NodeKind::IndexRef => Rule::EachChild,
            NodeKind::GotoIfNot | NodeKind::TypeGoto | NodeKind::ArraySize => Rule::Positional {
                indices: &[0, 1],
                arity: Arity::Exactly(2),
            },
            NodeKind::Alloc => Rule::Alloc,
            NodeKind::Copy => Rule::CopyToCall,
            NodeKind::Line
            | NodeKind::CopyAst
            | NodeKind::BoundsCheck
            | NodeKind::Enter
            | NodeKind::Leave
            | NodeKind::CurrentException
            | NodeKind::AddressOf
            | NodeKind::VCat
            | NodeKind::Meta
            | NodeKind::Const => Rule::Skip,
            NodeKind::Other(_) => Rule::Reject,
        }
    }
}

/// Unwrap a result that must hold exactly one node.
///
/// `site` describes the position for the error message and is only
/// evaluated on failure.
pub fn single(nodes: Vec<Node>, site: impl FnOnce() -> String) -> WalkResult<Node> {
    let [node]: [Node; 1] = nodes
        .try_into()
        .map_err(|rest: Vec<Node>| WalkError::non_singleton(site(), rest.len()))?;
    Ok(node)
}

/// Recursive entry point the rules call back into.
pub(crate) trait Recurse {
    /// Walk `node` in context `cx`.
    fn recurse(&mut self, node: Node, cx: TraversalContext) -> WalkResult<Vec<Node>>;

    fn config(&self) -> &WalkConfig;
}

/// Apply the rule for `composite`'s kind.
pub(crate) fn dispatch<R: Recurse>(
    r: &mut R,
    composite: Composite,
    cx: TraversalContext,
) -> WalkResult<Composite> {
    let rule = Rule::for_kind(&composite.kind);
    apply(r, rule, composite, cx)
}

fn apply<R: Recurse>(
    r: &mut R,
    rule: Rule,
    mut c: Composite,
    cx: TraversalContext,
) -> WalkResult<Composite> {
    match rule {
        Rule::Sequence => {
            let list_cx = if c.kind.is_statement_list() {
                cx.deeper()
            } else {
                cx
            };
            let children = mem::take(&mut c.children);
            c.children = sequence(r, children, list_cx)?;
            Ok(c)
        }
        Rule::EachChild => {
            for (i, child) in c.children.iter_mut().enumerate() {
                let node = mem::take(child);
                *child = one(r, node, cx.nested(), || format!("`{}` child {}", c.kind, i))?;
            }
            Ok(c)
        }
        Rule::Positional { indices, arity } => {
            check_arity(&c, arity)?;
            for &i in indices {
                let node = mem::take(&mut c.children[i]);
                c.children[i] = one(r, node, cx.nested(), || format!("`{}` child {}", c.kind, i))?;
            }
            Ok(c)
        }
        Rule::Function => function(r, c, cx),
        Rule::Assign => {
            check_arity(&c, Arity::Exactly(2))?;
            let target = mem::take(&mut c.children[0]);
            c.children[0] = one(r, target, cx.writing(), || format!("`{}` target", c.kind))?;
            let value = mem::take(&mut c.children[1]);
            c.children[1] = one(r, value, cx.nested(), || format!("`{}` value", c.kind))?;
            Ok(c)
        }
        Rule::Call => {
            check_arity(&c, Arity::AtLeast(1))?;
            let mut args = mem::take(&mut c.children);
            let rest = args.split_off(1);
            let mut callee = args;
            if !callee[0].is_symbol() {
                let node = mem::take(&mut callee[0]);
                callee[0] = one(r, node, cx.nested(), || format!("`{}` callee", c.kind))?;
            }
            callee.extend(sequence(r, rest, cx.deeper())?);
            c.children = callee;
            Ok(c)
        }
        Rule::Alloc => {
            check_arity(&c, Arity::AtLeast(1))?;
            let dims = c.children.split_off(1);
            let dims = sequence(r, dims, cx)?;
            c.children.extend(dims);
            Ok(c)
        }
        Rule::CopyToCall => {
            let routine = r.config().copy_routine.clone();
            if r.config().traces(Verbosity::Summary) {
                debug!("rewriting copy marker into a call to {}", routine);
            }
            let mut children = Vec::with_capacity(c.children.len() + 1);
            children.push(Node::symbol(routine));
            children.append(&mut c.children);
            let call = c.with_kind(NodeKind::Call, children);
            apply(r, Rule::Call, call, cx)
        }
        Rule::Skip => Ok(c),
        Rule::Reject => {
            if r.config().traces(Verbosity::Summary) {
                debug!("no dispatch rule for `{}`", c.kind);
            }
            Err(WalkError::UnknownNodeKind {
                kind: c.kind.to_string(),
                node: Node::Composite(c).to_string(),
            })
        }
    }
}

/// Walk a function definition: parameters, then the body.
fn function<R: Recurse>(
    r: &mut R,
    mut c: Composite,
    cx: TraversalContext,
) -> WalkResult<Composite> {
    let Some(body) = c.children.pop() else {
        return Err(WalkError::arity(c.kind.as_str(), Arity::AtLeast(1).to_string(), 0));
    };
    for (i, param) in c.children.iter_mut().enumerate() {
        let node = mem::take(param);
        *param = one(r, node, cx.writing(), || format!("`{}` parameter {}", c.kind, i))?;
    }
    let body = one(r, body, cx.function_body(), || format!("`{}` body", c.kind))?;
    match &body {
        Node::Composite(b) if b.kind.is_statement_list() => {}
        other => {
            return Err(WalkError::MalformedFunctionBody {
                found: other.to_string(),
            })
        }
    }
    c.children.push(body);
    Ok(c)
}

/// Walk a statement or argument list.
///
/// Each element's context comes from [`TraversalContext::sequence_element`]
/// with the number of nodes emitted so far, so top-level positions track the
/// rebuilt list.
fn sequence<R: Recurse>(
    r: &mut R,
    children: Vec<Node>,
    cx: TraversalContext,
) -> WalkResult<Vec<Node>> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        let element_cx = cx.sequence_element(out.len());
        out.extend(r.recurse(child, element_cx)?);
    }
    Ok(out)
}

fn one<R: Recurse>(
    r: &mut R,
    node: Node,
    cx: TraversalContext,
    site: impl FnOnce() -> String,
) -> WalkResult<Node> {
    single(r.recurse(node, cx)?, site)
}

fn check_arity(c: &Composite, arity: Arity) -> WalkResult<()> {
    if arity.admits(c.children.len()) {
        Ok(())
    } else {
        Err(WalkError::arity(
            c.kind.as_str(),
            arity.to_string(),
            c.children.len(),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
