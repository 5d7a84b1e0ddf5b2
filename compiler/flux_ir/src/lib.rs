//! Flux IR - the interface the evaluator consumes.
//!
//! - [`Name`] / [`StringInterner`]: interned identifiers
//! - [`Token`]: line and lexeme for error messages
//! - [`Node`] / [`Block`]: the syntax tree, immutable once built
//! - [`AstBuilder`]: tree construction without a parser
//!
//! Lexing and parsing live outside this workspace; whatever front end is used
//! only has to produce these types.

mod ast;
pub mod builder;
mod interner;
mod name;
mod token;

pub use ast::{BinaryOp, Block, FunctionDecl, MatchCase, Node, UnaryOp};
pub use builder::AstBuilder;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use token::{Token, TokenKind};
