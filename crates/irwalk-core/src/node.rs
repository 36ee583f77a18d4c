//! IR node model.
//!
//! A program tree is made of [`Node`] values:
//!
//! - [`Composite`]: a [`NodeKind`] tag, an ordered child list and an optional
//!   [`TypeTag`] annotation. The kind selects the walker's dispatch rule.
//! - [`Leaf`]: atomic values (symbols, literals, labels, ...). Offered to the
//!   callback, never decomposed.
//! - [`Aggregate`]: a fixed-size tuple of values tagged with its original
//!   aggregate type. Each element is walked individually.
//! - [`OpaqueUnit`]: a condensed function body that must be expanded into a
//!   composite before it can be walked.
//!
//! Nodes own their children, so a program is always a tree: a subtree that
//! appears under two parents is two independent copies.
//!
//! # JSON Format
//!
//! All node types derive `serde`. Kinds are written as their snake_case name:
//!
//! ```
//! use irwalk_core::node::{Node, NodeKind};
//!
//! let json = r#"{"composite": {"kind": "call", "children": [
//!     {"leaf": {"symbol": "f"}},
//!     {"leaf": {"symbol": "x"}}
//! ]}}"#;
//! let node: Node = serde_json::from_str(json).unwrap();
//! assert_eq!(node.kind(), Some(&NodeKind::Call));
//! assert_eq!(node.to_string(), "(call f x)");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Type annotations
// ============================================================================

/// Type annotation attached to a composite node.
///
/// The walker never inspects annotations; it carries them over unchanged
/// whenever a composite's kind or children are rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    /// Create a new type tag.
    pub fn new(name: impl Into<String>) -> Self {
        TypeTag(name.into())
    }

    /// The type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Node kinds
// ============================================================================

/// Generates [`NodeKind`] together with its name table.
///
/// Each entry maps a variant to the snake_case name used in JSON and in the
/// s-expression rendering.
macro_rules! node_kinds {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $name:literal
        ),* $(,)?
    ) => {
        /// Discriminator selecting a composite's traversal and rewrite rule.
        ///
        /// The set is closed: any name outside the table decodes to
        /// [`NodeKind::Other`], which the walker rejects.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum NodeKind {
            $(
                $(#[$meta])*
                $variant,
            )*
            /// A kind with no dispatch rule.
            Other(String),
        }

        impl NodeKind {
            /// The snake_case name of this kind.
            pub fn as_str(&self) -> &str {
                match self {
                    $( NodeKind::$variant => $name, )*
                    NodeKind::Other(name) => name,
                }
            }

            /// Look up a kind by name. Unknown names become [`NodeKind::Other`].
            pub fn from_name(name: &str) -> Self {
                match name {
                    $( $name => NodeKind::$variant, )*
                    other => NodeKind::Other(other.to_string()),
                }
            }
        }
    };
}

node_kinds! {
    /// Named function definition: parameters followed by the body.
    FunctionDef => "function_def",
    /// Anonymous function: parameters followed by the body.
    Lambda => "lambda",
    /// Statement list forming a function body.
    Body => "body",
    /// Nested statement list.
    Block => "block",
    /// Field access chain.
    FieldAccess => "field_access",
    Return => "return",
    /// Argument list of a conditional branch.
    BranchArgs => "branch_args",
    /// Plain assignment `lhs = rhs`.
    Assign => "assign",
    /// Augmented assignment `lhs += rhs`.
    AddAssign => "add_assign",
    /// Type assertion `value::Type`.
    TypeAssert => "type_assert",
    Call => "call",
    /// Legacy call form with 1-based argument semantics.
    Call1 => "call1",
    IndexGet => "index_get",
    /// Object allocation.
    New => "new",
    For => "for",
    TypedComprehension => "typed_comprehension",
    Comprehension => "comprehension",
    Range => "range",
    /// Tuple literal.
    Tuple => "tuple",
    /// Call through a foreign function interface.
    ForeignCall => "foreign_call",
    IndexRef => "index_ref",
    /// Branch to a label unless the condition holds.
    GotoIfNot => "goto_if_not",
    /// Branch on a type test.
    TypeGoto => "type_goto",
    /// Array dimension query.
    ArraySize => "array_size",
    /// Array allocation: element type followed by the dimensions.
    Alloc => "alloc",
    /// Array copy marker, rewritten into a call to the copy routine.
    Copy => "copy",
    /// Line information marker.
    Line => "line",
    /// Wrapper around a copied AST fragment.
    CopyAst => "copy_ast",
    /// Bounds-check elision marker.
    BoundsCheck => "bounds_check",
    /// Exception region entry.
    Enter => "enter",
    /// Exception region exit.
    Leave => "leave",
    /// The exception currently being handled.
    CurrentException => "current_exception",
    AddressOf => "address_of",
    /// Vector concatenation literal.
    VCat => "vcat",
    /// Meta annotation.
    Meta => "meta",
    /// Constant declaration.
    Const => "const",
}

impl NodeKind {
    /// Whether this kind is a statement list (a function body or a nested block).
    pub fn is_statement_list(&self) -> bool {
        matches!(self, NodeKind::Body | NodeKind::Block)
    }

    /// Whether this kind defines a function.
    pub fn is_function(&self) -> bool {
        matches!(self, NodeKind::FunctionDef | NodeKind::Lambda)
    }
}

impl From<String> for NodeKind {
    fn from(name: String) -> Self {
        NodeKind::from_name(&name)
    }
}

impl From<&str> for NodeKind {
    fn from(name: &str) -> Self {
        NodeKind::from_name(name)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Composite
// ============================================================================

/// A node with a kind tag and an ordered list of children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    /// Selects the dispatch rule.
    pub kind: NodeKind,
    /// Ordered children. Arity is checked by each dispatch rule, not here.
    #[serde(default)]
    pub children: Vec<Node>,
    /// Type annotation, preserved across rewrites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeTag>,
}

impl Composite {
    /// Create an unannotated composite.
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Composite {
            kind,
            children,
            annotation: None,
        }
    }

    /// Attach a type annotation.
    pub fn annotated(mut self, tag: TypeTag) -> Self {
        self.annotation = Some(tag);
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn annotation(&self) -> Option<&TypeTag> {
        self.annotation.as_ref()
    }

    /// Replace the children, keeping kind and annotation.
    pub fn with_children(self, children: Vec<Node>) -> Self {
        Composite { children, ..self }
    }

    /// Replace kind and children, keeping the annotation.
    pub fn with_kind(self, kind: NodeKind, children: Vec<Node>) -> Self {
        Composite {
            kind,
            children,
            annotation: self.annotation,
        }
    }
}

impl From<Composite> for Node {
    fn from(composite: Composite) -> Self {
        Node::Composite(composite)
    }
}

// ============================================================================
// Leaves
// ============================================================================

/// Primitive scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Atomic tree value. Never decomposed by the walker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaf {
    /// Reference to a named variable or function.
    Symbol(String),
    /// Source-level literal text (strings, characters).
    Literal(String),
    /// Branch target label.
    Label(u32),
    /// Field name in a field access.
    Field(String),
    /// Module-qualified reference.
    Global { module: String, name: String },
    /// Quoted constant. The quoted tree is data and is not walked.
    Quoted(Box<Node>),
    Scalar(Scalar),
    /// The unit value.
    Nothing,
    /// A value in none of the shapes above.
    #[serde(untagged)]
    Unrecognized(serde_json::Value),
}

impl Leaf {
    /// Short name of the leaf shape.
    pub fn shape(&self) -> &'static str {
        match self {
            Leaf::Symbol(_) => "symbol",
            Leaf::Literal(_) => "literal",
            Leaf::Label(_) => "label",
            Leaf::Field(_) => "field",
            Leaf::Global { .. } => "global",
            Leaf::Quoted(_) => "quoted",
            Leaf::Scalar(_) => "scalar",
            Leaf::Nothing => "nothing",
            Leaf::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Symbol(name) => f.write_str(name),
            Leaf::Literal(text) => write!(f, "{:?}", text),
            Leaf::Label(n) => write!(f, "#{}", n),
            Leaf::Field(name) => write!(f, ".{}", name),
            Leaf::Global { module, name } => write!(f, "{}.{}", module, name),
            Leaf::Quoted(node) => write!(f, "'{}", node),
            Leaf::Scalar(v) => write!(f, "{}", v),
            Leaf::Nothing => f.write_str("nothing"),
            Leaf::Unrecognized(value) => write!(f, "?{}", value),
        }
    }
}

// ============================================================================
// Aggregates and opaque units
// ============================================================================

/// Fixed-size heterogeneous tuple of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Name of the original aggregate type; kept when the tuple is rebuilt.
    pub type_name: String,
    #[serde(default)]
    pub elements: Vec<Node>,
}

impl Aggregate {
    pub fn new(type_name: impl Into<String>, elements: Vec<Node>) -> Self {
        Aggregate {
            type_name: type_name.into(),
            elements,
        }
    }
}

/// A condensed function body awaiting expansion.
///
/// `format` names the encoding so an expander can refuse units it does not
/// understand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueUnit {
    pub format: String,
    pub payload: String,
}

impl OpaqueUnit {
    pub fn new(format: impl Into<String>, payload: impl Into<String>) -> Self {
        OpaqueUnit {
            format: format.into(),
            payload: payload.into(),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// One element of the program tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Composite(Composite),
    Leaf(Leaf),
    Aggregate(Aggregate),
    Opaque(OpaqueUnit),
}

impl Default for Node {
    fn default() -> Self {
        Node::Leaf(Leaf::Nothing)
    }
}

impl Node {
    /// Create an unannotated composite node.
    pub fn composite(kind: NodeKind, children: Vec<Node>) -> Self {
        Node::Composite(Composite::new(kind, children))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Node::Leaf(Leaf::Symbol(name.into()))
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Node::Leaf(Leaf::Literal(text.into()))
    }

    pub fn label(n: u32) -> Self {
        Node::Leaf(Leaf::Label(n))
    }

    pub fn field(name: impl Into<String>) -> Self {
        Node::Leaf(Leaf::Field(name.into()))
    }

    pub fn global(module: impl Into<String>, name: impl Into<String>) -> Self {
        Node::Leaf(Leaf::Global {
            module: module.into(),
            name: name.into(),
        })
    }

    pub fn int(v: i64) -> Self {
        Node::Leaf(Leaf::Scalar(Scalar::Int(v)))
    }

    pub fn nothing() -> Self {
        Node::Leaf(Leaf::Nothing)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Composite(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Whether this node is a bare symbol reference.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Node::Leaf(Leaf::Symbol(_)))
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Node::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// The composite kind, if this is a composite.
    pub fn kind(&self) -> Option<&NodeKind> {
        self.as_composite().map(Composite::kind)
    }

    /// The composite children; empty for every other shape.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Composite(c) => c.children(),
            _ => &[],
        }
    }

    /// Short label used in traces: the kind name for composites, the
    /// shape name otherwise.
    pub fn label_str(&self) -> &str {
        match self {
            Node::Composite(c) => c.kind.as_str(),
            Node::Leaf(leaf) => leaf.shape(),
            Node::Aggregate(_) => "aggregate",
            Node::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Composite(c) => {
                write!(f, "({}", c.kind)?;
                for child in &c.children {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")?;
                if let Some(tag) = &c.annotation {
                    write!(f, "::{}", tag)?;
                }
                Ok(())
            }
            Node::Leaf(leaf) => write!(f, "{}", leaf),
            Node::Aggregate(agg) => {
                write!(f, "{{{}", agg.type_name)?;
                for element in &agg.elements {
                    write!(f, " {}", element)?;
                }
                f.write_str("}")
            }
            Node::Opaque(unit) => write!(f, "<opaque {}>", unit.format),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_json_names() {
        assert_eq!(NodeKind::GotoIfNot.as_str(), "goto_if_not");
        assert_eq!(NodeKind::from_name("add_assign"), NodeKind::AddAssign);
        assert_eq!(NodeKind::from("vcat"), NodeKind::VCat);
        assert_eq!(String::from(NodeKind::Call1), "call1");
    }

    #[test]
    fn unknown_kind_names_become_other() {
        let kind = NodeKind::from_name("splatnew");
        assert_eq!(kind, NodeKind::Other("splatnew".to_string()));
        assert_eq!(kind.as_str(), "splatnew");
    }

    #[test]
    fn with_kind_keeps_annotation() {
        let c = Composite::new(NodeKind::Copy, vec![Node::symbol("a")])
            .annotated(TypeTag::new("Array{Float64,1}"));
        let c = c.with_kind(NodeKind::Call, vec![Node::symbol("copy"), Node::symbol("a")]);
        assert_eq!(c.kind(), &NodeKind::Call);
        assert_eq!(c.children().len(), 2);
        assert_eq!(c.annotation().map(TypeTag::as_str), Some("Array{Float64,1}"));
    }

    #[test]
    fn with_children_keeps_kind() {
        let c = Composite::new(NodeKind::Block, vec![]).with_children(vec![Node::int(1)]);
        assert_eq!(c.kind(), &NodeKind::Block);
        assert_eq!(c.children(), &[Node::int(1)]);
    }

    #[test]
    fn display_renders_s_expressions() {
        let node = Node::Composite(
            Composite::new(
                NodeKind::Assign,
                vec![
                    Node::symbol("x"),
                    Node::composite(
                        NodeKind::Call,
                        vec![Node::global("Base", "sin"), Node::int(3), Node::literal("s")],
                    ),
                ],
            )
            .annotated(TypeTag::new("Int")),
        );
        assert_eq!(node.to_string(), r#"(assign x (call Base.sin 3 "s"))::Int"#);

        let agg = Node::Aggregate(Aggregate::new("Pair", vec![Node::label(2), Node::field("f")]));
        assert_eq!(agg.to_string(), "{Pair #2 .f}");
    }

    #[test]
    fn json_decodes_every_leaf_shape() {
        let json = serde_json::json!({"composite": {"kind": "tuple", "children": [
            {"leaf": {"symbol": "x"}},
            {"leaf": {"literal": "hi"}},
            {"leaf": {"label": 4}},
            {"leaf": {"field": "len"}},
            {"leaf": {"global": {"module": "Base", "name": "pi"}}},
            {"leaf": {"quoted": {"leaf": {"symbol": "q"}}}},
            {"leaf": {"scalar": {"float": 1.5}}},
            {"leaf": "nothing"}
        ]}});
        let node: Node = serde_json::from_value(json).unwrap();
        let shapes: Vec<&str> = node.children().iter().map(Node::label_str).collect();
        assert_eq!(
            shapes,
            vec!["symbol", "literal", "label", "field", "global", "quoted", "scalar", "nothing"]
        );
    }

    #[test]
    fn json_keeps_unrecognized_leaf_shapes() {
        let json = serde_json::json!({"leaf": {"bigint": "123456789012345678901234567890"}});
        let node: Node = serde_json::from_value(json).unwrap();
        match node {
            Node::Leaf(Leaf::Unrecognized(value)) => assert!(value.get("bigint").is_some()),
            other => panic!("expected unrecognized leaf, got {:?}", other),
        }
    }

    #[test]
    fn json_round_trips_annotations_and_unknown_kinds() {
        let node = Node::Composite(
            Composite::new(NodeKind::from_name("splatnew"), vec![Node::nothing()])
                .annotated(TypeTag::new("T")),
        );
        let text = serde_json::to_string(&node).unwrap();
        assert!(text.contains(r#""kind":"splatnew""#));
        let back: Node = serde_json::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn default_node_is_nothing() {
        assert_eq!(Node::default(), Node::nothing());
        assert!(Node::default().is_leaf());
        assert!(Node::default().children().is_empty());
    }
}
