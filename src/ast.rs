//! AST input model
//!
//! The tagged expression trees the inference engine consumes. Producing
//! them from source is the parser's job and out of scope here; tests and
//! embedders construct nodes directly. Every node carries the 1-indexed
//! source line for diagnostics.

/// One expression node.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
}

impl Node {
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Self { kind, line }
    }
}

/// Expression forms the inference engine understands.
#[derive(Debug, Clone)]
pub enum NodeKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BoolLiteral(bool),
    NullLiteral,
    ArrayLiteral(Vec<Node>),

    /// Variable read, name without the `$` sigil.
    Variable(String),
    /// `$variable = value`.
    Assignment { variable: String, value: Box<Node> },

    BinaryOp {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `condition ? if_true : if_false`.
    Conditional {
        condition: Box<Node>,
        if_true: Box<Node>,
        if_false: Box<Node>,
    },

    /// Free function call by (possibly relative) name.
    Call { function: String, args: Vec<Node> },
    /// `$object->method(...)`.
    MethodCall {
        object: Box<Node>,
        method: String,
        args: Vec<Node>,
    },
    /// `ClassName::method(...)`.
    StaticCall {
        class: String,
        method: String,
        args: Vec<Node>,
    },
    /// `$object->property`.
    PropertyAccess { object: Box<Node>, property: String },
    /// `new ClassName(...)`.
    New { class: String, args: Vec<Node> },
}

/// Binary operators with distinct typing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    BoolAnd,
    BoolOr,
}

impl BinaryOperator {
    /// Comparison and boolean operators always produce bool.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::BoolAnd
                | BinaryOperator::BoolOr
        )
    }
}
