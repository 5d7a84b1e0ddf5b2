//! Syntax tree consumed by the evaluator.
//!
//! The front end builds one root [`Block`] per program. Nodes are immutable
//! once built. Function declarations sit behind `Rc` because a closure created
//! at runtime keeps its declaration alive independently of the tree.

#![expect(
    clippy::disallowed_types,
    reason = "Rc shares a FunctionDecl between the tree and runtime closures"
)]

use std::rc::Rc;

use crate::{Name, Token};

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical (both operands are always evaluated)
    And,
    Or,
}

impl BinaryOp {
    /// Source-level spelling, used in error messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
        }
    }
}

/// Ordered statement list; also the program root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Node>,
}

impl Block {
    pub fn new(statements: Vec<Node>) -> Self {
        Block { statements }
    }
}

/// Named function or lambda.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    /// `None` for lambdas.
    pub name: Option<Name>,
    pub params: Vec<Name>,
    pub body: Block,
    /// The `func`/`lambda` keyword or the function's name.
    pub token: Token,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

/// One `pattern -> body` arm of a `match`.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchCase {
    pub pattern: Node,
    pub body: Node,
}

/// A syntax node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Nil,

    // Variables
    /// Variable reference.
    Var { name: Name, token: Token },
    /// `let name = value`: introduces a binding in the current scope.
    VarAssign {
        name: Name,
        value: Box<Node>,
        token: Token,
    },
    /// `name = value`: mutates an existing binding somewhere in the chain.
    VarReassign {
        name: Name,
        value: Box<Node>,
        token: Token,
    },

    // Operators
    BinOp {
        op: BinaryOp,
        token: Token,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        token: Token,
        operand: Box<Node>,
    },

    // Control flow
    Block(Block),
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    /// `condition ? then_expr : else_expr`
    Conditional {
        condition: Box<Node>,
        then_expr: Box<Node>,
        else_expr: Box<Node>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    /// `for var = start to end [step step] { body }`
    For {
        var: Name,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Block,
        token: Token,
    },
    /// Body runs first; loops again while `condition` is falsy.
    RepeatUntil {
        body: Box<Node>,
        condition: Box<Node>,
    },
    Match {
        scrutinee: Box<Node>,
        cases: Vec<MatchCase>,
        token: Token,
    },

    // Functions
    FuncDef(Rc<FunctionDecl>),
    Lambda(Rc<FunctionDecl>),
    FuncCall {
        callee: Box<Node>,
        args: Vec<Node>,
        token: Token,
    },
    Return { value: Box<Node>, token: Token },

    // Collections
    Array(Vec<Node>),
    Dict { entries: Vec<(Node, Node)>, token: Token },
    ArrayAccess {
        array: Name,
        index: Box<Node>,
        token: Token,
    },
    ArrayAssign {
        array: Name,
        index: Box<Node>,
        value: Box<Node>,
        token: Token,
    },

    // Output
    Print { value: Box<Node>, token: Token },
}

impl Node {
    /// Variant name, for tracing.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Node::Integer(_) => "Integer",
            Node::Float(_) => "Float",
            Node::String(_) => "String",
            Node::Boolean(_) => "Boolean",
            Node::Nil => "Nil",
            Node::Var { .. } => "Var",
            Node::VarAssign { .. } => "VarAssign",
            Node::VarReassign { .. } => "VarReassign",
            Node::BinOp { .. } => "BinOp",
            Node::UnaryOp { .. } => "UnaryOp",
            Node::Block(_) => "Block",
            Node::If { .. } => "If",
            Node::Conditional { .. } => "Conditional",
            Node::While { .. } => "While",
            Node::For { .. } => "For",
            Node::RepeatUntil { .. } => "RepeatUntil",
            Node::Match { .. } => "Match",
            Node::FuncDef(_) => "FuncDef",
            Node::Lambda(_) => "Lambda",
            Node::FuncCall { .. } => "FuncCall",
            Node::Return { .. } => "Return",
            Node::Array(_) => "Array",
            Node::Dict { .. } => "Dict",
            Node::ArrayAccess { .. } => "ArrayAccess",
            Node::ArrayAssign { .. } => "ArrayAssign",
            Node::Print { .. } => "Print",
        }
    }
}
