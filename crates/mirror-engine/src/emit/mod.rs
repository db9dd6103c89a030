//! Dynamic function builder
//!
//! Functions are described as a short sequence of evaluation-stack ops,
//! verified once, then interpreted per call:
//!
//! ```ignore
//! let mut builder = FunctionBuilder::new("Sum", vec![ValueKind::Int, ValueKind::Int], ValueKind::Int);
//! builder.emit_load_arg(0).emit_load_arg(1).emit_add().emit_return();
//! let sum = BuiltFunction::build(builder.finish())?;
//! assert_eq!(sum.invoke(&[Value::Int(1), Value::Int(2)])?, Value::Int(3));
//! ```

mod builder;
mod function;
mod op;

pub use builder::FunctionBuilder;
pub use function::BuiltFunction;
pub use op::{FunctionSpec, StackOp};
