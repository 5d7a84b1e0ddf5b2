//! Runtime error taxonomy.
//!
//! `EvalErrorKind` carries the structured data for each failure and owns the
//! user-facing message text. `EvalError` pairs a kind with the token the
//! failure is attributed to and renders the full report line:
//!
//! ```text
//! [line 3] Error at 'x': Undefined variable 'x'
//! ```
//!
//! Constructors are `#[cold]` free functions so error paths stay out of the
//! hot evaluation loop.

use std::fmt;

use flux_ir::Token;

/// Result of an evaluation step that produces a plain value.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Variables
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Cannot reassign undefined variable '{name}'")]
    UndefinedReassign { name: String },

    // Arithmetic
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Remainder by zero")]
    RemainderByZero,
    #[error("Integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },

    // Operator typing
    #[error("Operands must be numbers")]
    NumericOperands,
    #[error("Operand must be a number")]
    NumericOperand,
    #[error("Operands must be two numbers, two strings, or a string and another type for '+'")]
    InvalidConcat,

    // Calls
    #[error("Expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("Can only call functions, got: {type_name}")]
    NotCallable { type_name: &'static str },
    #[error("Maximum recursion depth exceeded (limit: {limit})")]
    StackOverflow { limit: usize },

    // Collections
    #[error("Cannot index non-array type: {type_name}")]
    NotIndexable { type_name: &'static str },
    #[error("Cannot assign to non-array type: {type_name}")]
    NotIndexAssignable { type_name: &'static str },
    #[error("Array index must be an integer, got {type_name}")]
    NonIntegerIndex { type_name: &'static str },
    #[error("Array index {index} out of bounds")]
    IndexOutOfBounds { index: i64 },
    #[error("Unhashable dict key: {type_name}")]
    UnhashableKey { type_name: &'static str },

    // Control flow
    #[error("No matching case found")]
    NoMatchingCase,
    #[error("{bound} value must be a number")]
    NonNumericLoopBound { bound: LoopBound },
    #[error("Step cannot be zero")]
    ZeroStep,

    // Builtins
    #[error("'{name}' expected {expected} {}, got {got}", argument_noun(*.expected))]
    BuiltinArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("'{name}' cannot be applied to 'nil'")]
    NilArgument { name: &'static str },
    #[error("'{name}' expects {expected}, but got {type_name}")]
    BuiltinArgType {
        name: &'static str,
        expected: &'static str,
        type_name: &'static str,
    },

    /// A failure outside the modeled taxonomy, e.g. a caught panic.
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

fn argument_noun(count: usize) -> &'static str {
    if count == 1 {
        "argument"
    } else {
        "arguments"
    }
}

/// Which bound of a counted `for` loop was not numeric.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopBound {
    Start,
    End,
    Step,
}

impl fmt::Display for LoopBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopBound::Start => "Start",
            LoopBound::End => "End",
            LoopBound::Step => "Step",
        })
    }
}

/// A runtime error attributed to a source token.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// `None` only for internal errors raised outside any node.
    pub token: Option<Token>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, token: &Token) -> Self {
        EvalError {
            kind,
            token: Some(token.clone()),
        }
    }

    /// An error with no source location.
    pub fn unlocated(kind: EvalErrorKind) -> Self {
        EvalError { kind, token: None }
    }

    /// Source line, when located.
    pub fn line(&self) -> Option<u32> {
        self.token.as_ref().map(|t| t.line)
    }

    /// Message text without the location prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(
                f,
                "[line {}] Error at '{}': {}",
                token.line, token.lexeme, self.kind
            ),
            None => write!(f, "Error: {}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

// Variables

#[cold]
pub fn undefined_variable(token: &Token) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedVariable {
            name: token.lexeme.clone(),
        },
        token,
    )
}

#[cold]
pub fn undefined_reassign(token: &Token) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedReassign {
            name: token.lexeme.clone(),
        },
        token,
    )
}

// Calls

#[cold]
pub fn arity_mismatch(expected: usize, got: usize, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::ArityMismatch { expected, got }, token)
}

#[cold]
pub fn not_callable(type_name: &'static str, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable { type_name }, token)
}

#[cold]
pub fn recursion_limit_exceeded(limit: usize, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::StackOverflow { limit }, token)
}

// Collections

#[cold]
pub fn not_indexable(type_name: &'static str, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NotIndexable { type_name }, token)
}

#[cold]
pub fn not_index_assignable(type_name: &'static str, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NotIndexAssignable { type_name }, token)
}

#[cold]
pub fn non_integer_index(type_name: &'static str, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NonIntegerIndex { type_name }, token)
}

#[cold]
pub fn index_out_of_bounds(index: i64, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::IndexOutOfBounds { index }, token)
}

#[cold]
pub fn unhashable_key(type_name: &'static str, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::UnhashableKey { type_name }, token)
}

// Control flow

#[cold]
pub fn no_matching_case(token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NoMatchingCase, token)
}

#[cold]
pub fn non_numeric_loop_bound(bound: LoopBound, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NonNumericLoopBound { bound }, token)
}

#[cold]
pub fn zero_step(token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::ZeroStep, token)
}

// Builtins

#[cold]
pub fn builtin_arity(name: &'static str, expected: usize, got: usize, token: &Token) -> EvalError {
    EvalError::new(
        EvalErrorKind::BuiltinArity {
            name,
            expected,
            got,
        },
        token,
    )
}

#[cold]
pub fn nil_argument(name: &'static str, token: &Token) -> EvalError {
    EvalError::new(EvalErrorKind::NilArgument { name }, token)
}

#[cold]
pub fn builtin_arg_type(
    name: &'static str,
    expected: &'static str,
    type_name: &'static str,
    token: &Token,
) -> EvalError {
    EvalError::new(
        EvalErrorKind::BuiltinArgType {
            name,
            expected,
            type_name,
        },
        token,
    )
}

// Internal

#[cold]
pub fn internal_error(detail: impl Into<String>) -> EvalError {
    EvalError::unlocated(EvalErrorKind::Internal {
        detail: detail.into(),
    })
}
