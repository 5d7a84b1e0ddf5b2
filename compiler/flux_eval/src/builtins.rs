//! Host-provided functions.
//!
//! A fixed registry, installed into the global scope before user code runs.
//! Each routine gets the evaluated arguments and the call-site token.

use flux_ir::{StringInterner, Token};

use crate::environment::Environment;
use crate::errors::{builtin_arg_type, builtin_arity, nil_argument, EvalResult};
use crate::value::{BuiltinFunction, Value};

/// Every builtin, in installation order.
pub const BUILTINS: &[BuiltinFunction] = &[BuiltinFunction {
    name: "len",
    func: builtin_len,
}];

/// Find a builtin by name.
pub fn lookup(name: &str) -> Option<BuiltinFunction> {
    BUILTINS.iter().find(|b| b.name == name).copied()
}

/// Bind every builtin in the global scope.
pub(crate) fn install(env: &mut Environment, interner: &StringInterner) {
    let global = env.global();
    for builtin in BUILTINS {
        env.define(global, interner.intern(builtin.name), Value::Builtin(*builtin));
    }
}

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// `len(x)`: element count of an array or dict, character count of a string.
fn builtin_len(args: &[Value], token: &Token) -> EvalResult {
    let [arg] = args else {
        return Err(builtin_arity("len", 1, args.len(), token));
    };
    match arg {
        Value::Str(s) => Ok(count(s.chars().count())),
        Value::Array(items) => Ok(count(items.borrow().len())),
        Value::Dict(dict) => Ok(count(dict.len())),
        Value::Nil => Err(nil_argument("len", token)),
        other => Err(builtin_arg_type(
            "len",
            "an array, string, or dictionary",
            other.type_name(),
            token,
        )),
    }
}
