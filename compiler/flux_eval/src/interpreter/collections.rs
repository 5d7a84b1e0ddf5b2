//! Array and dict literals, indexed reads and writes.

use flux_ir::{Name, Node, Token};

use super::{EvalFlow, Flow, Interpreter};
use crate::environment::EnvId;
use crate::errors::{
    index_out_of_bounds, non_integer_index, not_index_assignable, not_indexable, unhashable_key,
    EvalResult,
};
use crate::value::DictValue;
use crate::Value;

impl Interpreter {
    /// Elements are evaluated left to right.
    pub(super) fn eval_array(&mut self, elements: &[Node], env: EnvId) -> EvalFlow {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(try_value!(self.eval(element, env, false)));
        }
        Ok(Flow::Value(Value::array(values)))
    }

    /// Each entry evaluates its key, then its value.
    pub(super) fn eval_dict(
        &mut self,
        entries: &[(Node, Node)],
        token: &Token,
        env: EnvId,
    ) -> EvalFlow {
        let mut dict = DictValue::new();
        for (key, value) in entries {
            let key = try_value!(self.eval(key, env, false));
            let value = try_value!(self.eval(value, env, false));
            if !key.is_hashable() {
                return Err(unhashable_key(key.type_name(), token));
            }
            dict.insert(key, value);
        }
        Ok(Flow::Value(Value::dict(dict)))
    }

    /// `array[index]`
    pub(super) fn eval_index(
        &mut self,
        array: Name,
        index: &Node,
        token: &Token,
        env: EnvId,
    ) -> EvalFlow {
        let target = self.env.get(env, array, token)?;
        let index = try_value!(self.eval(index, env, false));

        let Value::Array(elements) = &target else {
            return Err(not_indexable(target.type_name(), token));
        };
        let elements = elements.borrow();
        let slot = checked_index(&index, elements.len(), token)?;
        Ok(Flow::Value(elements[slot].clone()))
    }

    /// `array[index] = value`; yields the stored value.
    pub(super) fn eval_index_assign(
        &mut self,
        array: Name,
        index: &Node,
        value: &Node,
        token: &Token,
        env: EnvId,
    ) -> EvalFlow {
        let target = self.env.get(env, array, token)?;
        let index = try_value!(self.eval(index, env, false));
        let value = try_value!(self.eval(value, env, false));

        let Value::Array(elements) = &target else {
            return Err(not_index_assignable(target.type_name(), token));
        };
        let mut elements = elements.borrow_mut();
        let slot = checked_index(&index, elements.len(), token)?;
        elements[slot] = value.clone();
        Ok(Flow::Value(value))
    }
}

/// Validate `index` against an array of `len` elements.
fn checked_index(index: &Value, len: usize, token: &Token) -> EvalResult<usize> {
    let Value::Int(n) = index else {
        return Err(non_integer_index(index.type_name(), token));
    };
    usize::try_from(*n)
        .ok()
        .filter(|&slot| slot < len)
        .ok_or_else(|| index_out_of_bounds(*n, token))
}
