//! Stack operations and function specs

use std::fmt;

use crate::value::ValueKind;

/// One operation of the evaluation-stack machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackOp {
    /// Push the argument at this index
    PushArgument(usize),
    /// Pop two values, push their sum
    Add,
    /// Pop the top value and return it
    Return,
}

impl StackOp {
    /// Values consumed from the stack
    pub fn pops(&self) -> usize {
        match self {
            StackOp::PushArgument(_) => 0,
            StackOp::Add => 2,
            StackOp::Return => 1,
        }
    }

    /// Values produced onto the stack
    pub fn pushes(&self) -> usize {
        match self {
            StackOp::PushArgument(_) | StackOp::Add => 1,
            StackOp::Return => 0,
        }
    }
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackOp::PushArgument(index) => write!(f, "ldarg.{}", index),
            StackOp::Add => f.write_str("add"),
            StackOp::Return => f.write_str("ret"),
        }
    }
}

/// Unvalidated description of a dynamic function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    /// Function name
    pub name: String,
    /// Declared parameter kinds, in order
    pub parameters: Vec<ValueKind>,
    /// Declared return kind
    pub return_kind: ValueKind,
    /// Op sequence
    pub ops: Vec<StackOp>,
}

impl FunctionSpec {
    /// Create a spec from its parts
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ValueKind>,
        return_kind: ValueKind,
        ops: Vec<StackOp>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_kind,
            ops,
        }
    }

    /// Disassembly, one op per line
    pub fn listing(&self) -> String {
        self.ops
            .iter()
            .enumerate()
            .map(|(i, op)| format!("IL_{:04}: {}", i, op))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
