//! Runtime values
//!
//! `Value` is what flows through member invocation and the evaluation stack of
//! built functions. `ValueKind` is the declared-type side: parameter, return,
//! field and property kinds are all `ValueKind`s fixed at registration time.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{ReflectError, ReflectResult};

/// Declared kind of a parameter, return value, field or property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value (methods returning nothing, null)
    Void,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// String
    String,
    /// Object reference
    Object,
    /// Accepts any runtime value
    Any,
}

impl ValueKind {
    /// Name used in messages and listings
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Any => "any",
        }
    }

    /// Whether a runtime value may be bound to a slot of this kind.
    ///
    /// `Object` slots accept null references.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value.kind()) {
            (ValueKind::Any, _) => true,
            (ValueKind::Object, ValueKind::Void) => true,
            (declared, actual) => *declared == actual,
        }
    }

    /// Default value stored in a fresh field slot of this kind
    pub fn default_value(&self) -> Value {
        match self {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::String => Value::Str(String::new()),
            ValueKind::Void | ValueKind::Object | ValueKind::Any => Value::Null,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime value
///
/// Equality is reflexive: floats compare by bit pattern (so `NaN == NaN` and
/// `0.0 != -0.0`), objects by identity.
#[derive(Debug, Clone)]
pub enum Value {
    /// Null / no value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Object instance
    Object(Instance),
}

impl Value {
    /// Runtime kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Void,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload, if any
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Instance payload, if any
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Object(obj) => write!(f, "{}", obj.type_name()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Object(v)
    }
}

/// Check an argument list against declared kinds.
///
/// Arity is checked first, then each argument in order; the first mismatch wins.
pub(crate) fn check_arguments(target: &str, expected: &[ValueKind], args: &[Value]) -> ReflectResult<()> {
    if expected.len() != args.len() {
        return Err(ReflectError::ArityMismatch {
            target: target.to_string(),
            expected: expected.len(),
            got: args.len(),
        });
    }
    for (index, (kind, arg)) in expected.iter().zip(args).enumerate() {
        if !kind.accepts(arg) {
            return Err(ReflectError::TypeMismatch {
                target: format!("{} argument {}", target, index),
                expected: *kind,
                got: arg.kind(),
            });
        }
    }
    Ok(())
}

#[derive(Debug)]
struct ObjectData {
    type_name: String,
    fields: RwLock<FxHashMap<String, Value>>,
}

/// Handle to an object conforming to a registered type.
///
/// Clones share the same object; equality is identity.
#[derive(Debug, Clone)]
pub struct Instance(Arc<ObjectData>);

impl Instance {
    /// Create an instance of `type_name` with the given field slots
    pub fn new(type_name: impl Into<String>, fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self(Arc::new(ObjectData {
            type_name: type_name.into(),
            fields: RwLock::new(fields.into_iter().collect()),
        }))
    }

    /// Name of the type this instance conforms to
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Read a field slot
    pub fn field(&self, name: &str) -> Option<Value> {
        self.0.fields.read().get(name).cloned()
    }

    /// Write a field slot, returning the previous value
    pub fn set_field(&self, name: &str, value: Value) -> Option<Value> {
        self.0.fields.write().insert(name.to_string(), value)
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
