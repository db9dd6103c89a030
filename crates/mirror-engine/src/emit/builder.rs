//! IL-generator style construction of function specs
//!
//! The builder only records ops. Structural checks happen once, in
//! `BuiltFunction::build`, so a builder can hold an unbalanced sequence while
//! it is being assembled.

use super::op::{FunctionSpec, StackOp};
use crate::value::ValueKind;

/// Builder for constructing a `FunctionSpec` op by op
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    parameters: Vec<ValueKind>,
    return_kind: ValueKind,
    /// Ops emitted so far (pre-allocated)
    ops: Vec<StackOp>,
}

impl FunctionBuilder {
    /// Create a builder for a function with these parameter and return kinds
    pub fn new(name: impl Into<String>, parameters: Vec<ValueKind>, return_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_kind,
            ops: Vec::with_capacity(8),
        }
    }

    /// Number of ops emitted so far
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if nothing was emitted yet
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Emit any op
    pub fn emit(&mut self, op: StackOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Emit `PushArgument(index)`
    pub fn emit_load_arg(&mut self, index: usize) -> &mut Self {
        self.emit(StackOp::PushArgument(index))
    }

    /// Emit `Add`
    pub fn emit_add(&mut self) -> &mut Self {
        self.emit(StackOp::Add)
    }

    /// Emit `Return`
    pub fn emit_return(&mut self) -> &mut Self {
        self.emit(StackOp::Return)
    }

    /// Consume the builder
    pub fn finish(self) -> FunctionSpec {
        FunctionSpec::new(self.name, self.parameters, self.return_kind, self.ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_ops_in_order() {
        let mut builder = FunctionBuilder::new("Sum", vec![ValueKind::Int, ValueKind::Int], ValueKind::Int);
        assert!(builder.is_empty());

        builder.emit_load_arg(0).emit_load_arg(1).emit_add().emit_return();
        assert_eq!(builder.len(), 4);

        let spec = builder.finish();
        assert_eq!(spec.name, "Sum");
        assert_eq!(
            spec.ops,
            vec![StackOp::PushArgument(0), StackOp::PushArgument(1), StackOp::Add, StackOp::Return]
        );
    }

    #[test]
    fn test_builder_keeps_unbalanced_sequences() {
        let mut builder = FunctionBuilder::new("Broken", vec![], ValueKind::Int);
        builder.emit(StackOp::Add);
        assert_eq!(builder.finish().ops, vec![StackOp::Add]);
    }
}
