//! Function values: user closures and host builtins.

#![expect(
    clippy::disallowed_types,
    reason = "FunctionDecl is shared with the syntax tree through Rc"
)]

use std::fmt;
use std::rc::Rc;

use flux_ir::{Block, FunctionDecl, Name, StringInterner, Token};

use super::Value;
use crate::environment::{EnvId, ScopePin};
use crate::errors::EvalError;

/// A user-defined function or lambda paired with its defining scope.
///
/// Identity is the allocation: two `FunctionValue`s built from the same
/// declaration in different scopes are different functions.
pub struct FunctionValue {
    decl: Rc<FunctionDecl>,
    closure: ScopePin,
    /// `<function name(a, b)>`, computed once so display needs no interner.
    label: String,
}

impl FunctionValue {
    pub fn new(decl: Rc<FunctionDecl>, closure: ScopePin, interner: &StringInterner) -> Self {
        let label = function_label(&decl, interner);
        FunctionValue {
            decl,
            closure,
            label,
        }
    }

    pub fn params(&self) -> &[Name] {
        &self.decl.params
    }

    pub fn arity(&self) -> usize {
        self.decl.arity()
    }

    pub fn body(&self) -> &Block {
        &self.decl.body
    }

    /// Scope the function was defined in; parent of every call scope.
    pub fn closure(&self) -> EnvId {
        self.closure.env()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("label", &self.label)
            .field("closure", &self.closure.env())
            .finish_non_exhaustive()
    }
}

fn function_label(decl: &FunctionDecl, interner: &StringInterner) -> String {
    let mut label = match decl.name {
        Some(name) => format!("<function {}(", interner.lookup(name)),
        None => String::from("<anonymous function("),
    };
    for (i, param) in decl.params.iter().enumerate() {
        if i > 0 {
            label.push_str(", ");
        }
        label.push_str(interner.lookup(*param));
    }
    label.push_str(")>");
    label
}

/// Native routine signature: evaluated arguments plus the call-site token.
pub type BuiltinFn = fn(&[Value], &Token) -> Result<Value, EvalError>;

/// A host-provided function, identified by name.
#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl BuiltinFunction {
    #[inline]
    pub fn call(&self, args: &[Value], token: &Token) -> Result<Value, EvalError> {
        (self.func)(args, token)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}
