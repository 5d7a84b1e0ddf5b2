//! Programmatic tree construction.
//!
//! The evaluator has no parser of its own; tests and embedders assemble
//! programs with [`AstBuilder`]. Every token the builder creates is stamped
//! with the builder's current line, which callers move with [`AstBuilder::line`].

#![expect(
    clippy::disallowed_types,
    reason = "FuncDef/Lambda nodes hold Rc<FunctionDecl>"
)]

use std::cell::Cell;
use std::rc::Rc;

use crate::{BinaryOp, Block, FunctionDecl, MatchCase, Name, Node, StringInterner, Token, UnaryOp};

pub struct AstBuilder<'a> {
    interner: &'a StringInterner,
    line: Cell<u32>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        AstBuilder {
            interner,
            line: Cell::new(1),
        }
    }

    /// Stamp subsequently built tokens with `line`.
    pub fn line(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn ident(&self, text: &str) -> Token {
        Token::ident(text, self.line.get())
    }

    fn keyword(&self, text: &str) -> Token {
        Token::keyword(text, self.line.get())
    }

    // Literals

    pub fn int(&self, value: i64) -> Node {
        Node::Integer(value)
    }

    pub fn float(&self, value: f64) -> Node {
        Node::Float(value)
    }

    pub fn string(&self, value: &str) -> Node {
        Node::String(value.to_owned())
    }

    pub fn boolean(&self, value: bool) -> Node {
        Node::Boolean(value)
    }

    pub fn nil(&self) -> Node {
        Node::Nil
    }

    // Variables

    pub fn var(&self, name: &str) -> Node {
        Node::Var {
            name: self.name(name),
            token: self.ident(name),
        }
    }

    /// `let name = value`
    pub fn let_(&self, name: &str, value: Node) -> Node {
        Node::VarAssign {
            name: self.name(name),
            value: Box::new(value),
            token: self.ident(name),
        }
    }

    /// `name = value`
    pub fn assign(&self, name: &str, value: Node) -> Node {
        Node::VarReassign {
            name: self.name(name),
            value: Box::new(value),
            token: self.ident(name),
        }
    }

    // Operators

    pub fn binary(&self, op: BinaryOp, left: Node, right: Node) -> Node {
        Node::BinOp {
            op,
            token: Token::operator(op.as_symbol(), self.line.get()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(&self, left: Node, right: Node) -> Node {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn sub(&self, left: Node, right: Node) -> Node {
        self.binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(&self, left: Node, right: Node) -> Node {
        self.binary(BinaryOp::Mul, left, right)
    }

    pub fn unary(&self, op: UnaryOp, operand: Node) -> Node {
        Node::UnaryOp {
            op,
            token: Token::operator(op.as_symbol(), self.line.get()),
            operand: Box::new(operand),
        }
    }

    // Control flow

    pub fn block(&self, statements: Vec<Node>) -> Block {
        Block::new(statements)
    }

    /// A nested `{ ... }` statement.
    pub fn scope(&self, statements: Vec<Node>) -> Node {
        Node::Block(Block::new(statements))
    }

    pub fn if_(&self, condition: Node, then_branch: Vec<Node>, else_branch: Option<Node>) -> Node {
        Node::If {
            condition: Box::new(condition),
            then_branch: Box::new(self.scope(then_branch)),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn conditional(&self, condition: Node, then_expr: Node, else_expr: Node) -> Node {
        Node::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn while_(&self, condition: Node, body: Vec<Node>) -> Node {
        Node::While {
            condition: Box::new(condition),
            body: Box::new(self.scope(body)),
        }
    }

    pub fn for_(&self, var: &str, start: Node, end: Node, step: Option<Node>, body: Vec<Node>) -> Node {
        Node::For {
            var: self.name(var),
            start: Box::new(start),
            end: Box::new(end),
            step: step.map(Box::new),
            body: Block::new(body),
            token: self.ident(var),
        }
    }

    pub fn repeat_until(&self, body: Vec<Node>, condition: Node) -> Node {
        Node::RepeatUntil {
            body: Box::new(self.scope(body)),
            condition: Box::new(condition),
        }
    }

    pub fn match_(&self, scrutinee: Node, cases: Vec<(Node, Node)>) -> Node {
        Node::Match {
            scrutinee: Box::new(scrutinee),
            cases: cases
                .into_iter()
                .map(|(pattern, body)| MatchCase { pattern, body })
                .collect(),
            token: self.keyword("match"),
        }
    }

    // Functions

    fn decl(&self, name: Option<&str>, params: &[&str], body: Vec<Node>) -> Rc<FunctionDecl> {
        Rc::new(FunctionDecl {
            name: name.map(|n| self.name(n)),
            params: params.iter().map(|p| self.name(p)).collect(),
            body: Block::new(body),
            token: name.map_or_else(|| self.keyword("lambda"), |n| self.ident(n)),
        })
    }

    pub fn func(&self, name: &str, params: &[&str], body: Vec<Node>) -> Node {
        Node::FuncDef(self.decl(Some(name), params, body))
    }

    pub fn lambda(&self, params: &[&str], body: Vec<Node>) -> Node {
        Node::Lambda(self.decl(None, params, body))
    }

    /// Call a function by name.
    pub fn call(&self, callee: &str, args: Vec<Node>) -> Node {
        Node::FuncCall {
            callee: Box::new(self.var(callee)),
            args,
            token: self.ident(callee),
        }
    }

    /// Call the value of an arbitrary expression.
    pub fn call_expr(&self, callee: Node, args: Vec<Node>) -> Node {
        Node::FuncCall {
            callee: Box::new(callee),
            args,
            token: Token::new(crate::TokenKind::Punctuation, "(", self.line.get()),
        }
    }

    pub fn ret(&self, value: Node) -> Node {
        Node::Return {
            value: Box::new(value),
            token: self.keyword("return"),
        }
    }

    // Collections

    pub fn array(&self, elements: Vec<Node>) -> Node {
        Node::Array(elements)
    }

    pub fn dict(&self, entries: Vec<(Node, Node)>) -> Node {
        Node::Dict {
            entries,
            token: Token::new(crate::TokenKind::Punctuation, "{", self.line.get()),
        }
    }

    /// `array[index]`
    pub fn index(&self, array: &str, index: Node) -> Node {
        Node::ArrayAccess {
            array: self.name(array),
            index: Box::new(index),
            token: self.ident(array),
        }
    }

    /// `array[index] = value`
    pub fn index_assign(&self, array: &str, index: Node, value: Node) -> Node {
        Node::ArrayAssign {
            array: self.name(array),
            index: Box::new(index),
            value: Box::new(value),
            token: self.ident(array),
        }
    }

    pub fn print(&self, value: Node) -> Node {
        Node::Print {
            value: Box::new(value),
            token: self.keyword("print"),
        }
    }
}
