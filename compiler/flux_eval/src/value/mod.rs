//! Runtime values.
//!
//! `Value` is a closed sum over the language's data kinds. Scalars are stored
//! inline; strings, dicts and functions sit behind [`Heap`] (immutable,
//! refcounted) and arrays behind [`Shared`] (mutable, refcounted) so that
//! cloning a `Value` never deep-copies.
//!
//! [`Display`](fmt::Display) is the canonical stringification used by `print`
//! and by string concatenation. Arrays can contain themselves, so rendering
//! and comparison track the collections they are inside of.

// Rc/RefCell are the implementation of Heap<T> and Shared<T>.
#![expect(
    clippy::disallowed_types,
    reason = "Rc/RefCell are the implementation of Heap<T> and Shared<T>"
)]

mod dict;
mod function;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use smallvec::SmallVec;

use flux_stack::ensure_sufficient_stack;

pub use dict::DictValue;
pub use function::{BuiltinFn, BuiltinFunction, FunctionValue};

/// Immutable reference-counted payload.
#[repr(transparent)]
pub struct Heap<T: ?Sized>(Rc<T>);

impl<T> Heap<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    #[inline]
    pub(crate) fn strong_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }

    /// Address of the allocation, for identity sets.
    #[inline]
    pub(crate) fn addr(this: &Self) -> usize {
        Rc::as_ptr(&this.0).cast::<()>() as usize
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Mutable reference-counted payload. Aliases observe each other's writes.
#[repr(transparent)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    #[inline]
    pub(crate) fn strong_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }

    /// Address of the allocation, for identity sets.
    #[inline]
    pub(crate) fn addr(this: &Self) -> usize {
        Rc::as_ptr(&this.0).cast::<()>() as usize
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

/// Collections currently being rendered, by address.
type Rendering = SmallVec<[usize; 8]>;

/// Pairs of collections currently being compared, by address.
type Comparing = SmallVec<[(usize, usize); 8]>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(Heap<String>),
    Bool(bool),
    Nil,
    Array(Shared<Vec<Value>>),
    Dict(Heap<DictValue>),
    Function(Heap<FunctionValue>),
    Builtin(BuiltinFunction),
}

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Shared::new(elements))
    }

    #[inline]
    pub fn dict(dict: DictValue) -> Self {
        Value::Dict(Heap::new(dict))
    }

    #[inline]
    pub fn function(function: FunctionValue) -> Self {
        Value::Function(Heap::new(function))
    }

    /// Truthiness: `nil`, `false`, numeric zero and `""` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Dict(_) | Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// Type name used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Whether the value may be used as a dict key.
    pub const fn is_hashable(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Dict(_))
    }

    /// Structural equality without type coercion, except that `Int` and
    /// `Float` compare numerically.
    ///
    /// A pair of collections met again while still being compared is taken
    /// as equal, so self-containing arrays compare without looping.
    pub fn equals(&self, other: &Value) -> bool {
        self.equals_in(other, &mut Comparing::new())
    }

    fn equals_in(&self, other: &Value, comparing: &mut Comparing) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                int_to_f64(*a) == *b
            }
            (Value::Str(a), Value::Str(b)) => a.as_str() == b.as_str(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Array(a), Value::Array(b)) => {
                if Shared::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Shared::addr(a), Shared::addr(b));
                if comparing.contains(&pair) {
                    return true;
                }
                comparing.push(pair);
                let (a, b) = (a.borrow(), b.borrow());
                let equal = a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| {
                        ensure_sufficient_stack(|| x.equals_in(y, comparing))
                    });
                comparing.pop();
                equal
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Heap::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Heap::addr(a), Heap::addr(b));
                if comparing.contains(&pair) {
                    return true;
                }
                comparing.push(pair);
                let equal = a.equals_by(b, |x, y| {
                    ensure_sufficient_stack(|| x.equals_in(y, comparing))
                });
                comparing.pop();
                equal
            }
            (Value::Function(a), Value::Function(b)) => Heap::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }

    /// Render as an element of an array or dict: strings are quoted.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, open: &mut Rendering) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "'{}'", s.as_str()),
            other => ensure_sufficient_stack(|| other.render(f, open)),
        }
    }

    /// Canonical text. A collection met again inside itself renders as
    /// `[...]` or `{...}`.
    fn render(&self, f: &mut fmt::Formatter<'_>, open: &mut Rendering) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => fmt_float(*x, f),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Nil => f.write_str("nil"),
            Value::Array(elements) => {
                let addr = Shared::addr(elements);
                if open.contains(&addr) {
                    return f.write_str("[...]");
                }
                open.push(addr);
                f.write_str("[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    element.fmt_nested(f, open)?;
                }
                open.pop();
                f.write_str("]")
            }
            Value::Dict(dict) => {
                let addr = Heap::addr(dict);
                if open.contains(&addr) {
                    return f.write_str("{...}");
                }
                open.push(addr);
                f.write_str("{")?;
                for (i, (key, value)) in dict.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    key.fmt_nested(f, open)?;
                    f.write_str(": ")?;
                    value.fmt_nested(f, open)?;
                }
                open.pop();
                f.write_str("}")
            }
            Value::Function(function) => f.write_str(function.label()),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Rendering::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Nil => f.write_str("Nil"),
            Value::Array(_) => write!(f, "Array({self})"),
            Value::Dict(_) => write!(f, "Dict({self})"),
            Value::Function(function) => write!(f, "Function({})", function.label()),
            Value::Builtin(builtin) => write!(f, "Builtin({})", builtin.name),
        }
    }
}

/// Integral floats print without a fractional part. Others print with the
/// shortest digits that read back exactly, switching to an exponent below
/// `1e-4` (`1.5e-07`).
fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "inf" } else { "-inf" });
    }
    if x == 0.0 {
        // Covers -0.0 as well.
        return f.write_str("0");
    }
    if x.fract() == 0.0 {
        return write!(f, "{x:.0}");
    }
    let scientific = format!("{x:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exponent) if exponent < -4 => {
                write!(f, "{mantissa}e-{:02}", exponent.unsigned_abs())
            }
            _ => write!(f, "{x}"),
        },
        None => write!(f, "{x}"),
    }
}

/// Lossy widening used wherever an `Int` meets a `Float`.
#[expect(
    clippy::cast_precision_loss,
    reason = "mixed int/float arithmetic widens to f64 like the language does"
)]
#[inline]
pub(crate) fn int_to_f64(n: i64) -> f64 {
    n as f64
}
