//! Verified functions and their interpreter
//!
//! `BuiltFunction::build` walks the op sequence once with a symbolic depth
//! counter. Anything that passes is balanced: every op finds the values it
//! needs, and the sequence ends in a single `Return` with exactly one value on
//! the stack. Operand kinds are only known per call, so `Add` operand kinds and
//! the return kind are checked during interpretation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::op::{FunctionSpec, StackOp};
use crate::config::EmitConfig;
use crate::error::{BoxError, ReflectError, ReflectResult};
use crate::reflect::{MethodDefinition, Visibility};
use crate::value::{check_arguments, Instance, Value, ValueKind};

/// Global counter for built function IDs
static NEXT_FUNCTION_ID: AtomicUsize = AtomicUsize::new(1);

/// Generate a unique function ID
fn generate_function_id() -> usize {
    NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed)
}

/// A validated function ready for invocation
#[derive(Debug, Clone)]
pub struct BuiltFunction {
    id: usize,
    spec: FunctionSpec,
    /// Deepest stack reached by the op sequence
    max_stack: usize,
}

/// Interpreter state for one invocation
#[derive(Debug)]
enum Execution {
    Running,
    Returned(Value),
    Faulted(ReflectError),
}

fn malformed(spec: &FunctionSpec, reason: impl Into<String>) -> ReflectError {
    ReflectError::MalformedSpec {
        function: spec.name.clone(),
        reason: reason.into(),
    }
}

/// Check a spec and return its maximum stack depth
fn verify(spec: &FunctionSpec, config: &EmitConfig) -> ReflectResult<usize> {
    if spec.ops.len() > config.max_ops {
        return Err(malformed(
            spec,
            format!("{} ops exceed the limit of {}", spec.ops.len(), config.max_ops),
        ));
    }

    let last = spec.ops.len().saturating_sub(1);
    let mut depth = 0usize;
    let mut max_stack = 0usize;

    for (position, op) in spec.ops.iter().enumerate() {
        if let StackOp::PushArgument(index) = op {
            if *index >= spec.parameters.len() {
                return Err(ReflectError::InvalidArgumentIndex {
                    index: *index,
                    param_count: spec.parameters.len(),
                    position,
                });
            }
        }

        if depth < op.pops() {
            return Err(ReflectError::StackUnderflow {
                position,
                needed: op.pops(),
                depth,
            });
        }

        if *op == StackOp::Return {
            if depth > 1 {
                return Err(malformed(
                    spec,
                    format!("Return at op {} leaves {} values on the stack", position, depth - 1),
                ));
            }
            if position != last {
                return Err(malformed(spec, format!("op {} follows Return", position + 1)));
            }
        }

        depth = depth - op.pops() + op.pushes();
        max_stack = max_stack.max(depth);
        if max_stack > config.max_stack_depth {
            return Err(malformed(
                spec,
                format!("stack depth exceeds the limit of {}", config.max_stack_depth),
            ));
        }
    }

    match spec.ops.last() {
        Some(StackOp::Return) => Ok(max_stack),
        _ => Err(malformed(spec, "does not end in Return")),
    }
}

/// Add two stack values
fn add_values(function: &str, lhs: Value, rhs: Value) -> ReflectResult<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::Str(mut a), Value::Str(b)) => {
            a.push_str(&b);
            Ok(Value::Str(a))
        }
        // The left operand sets the kind the right one must match.
        (a, b) => Err(ReflectError::TypeMismatch {
            target: format!("{} add {}, {}", function, a.kind(), b.kind()),
            expected: a.kind(),
            got: b.kind(),
        }),
    }
}

impl BuiltFunction {
    /// Validate a spec with the default limits
    pub fn build(spec: FunctionSpec) -> ReflectResult<Self> {
        Self::build_with(spec, &EmitConfig::default())
    }

    /// Validate a spec against configured limits
    pub fn build_with(spec: FunctionSpec, config: &EmitConfig) -> ReflectResult<Self> {
        let max_stack = verify(&spec, config)?;
        let id = generate_function_id();
        tracing::debug!(
            "Built function '{}' (id {}, {} ops, max stack {})",
            spec.name,
            id,
            spec.ops.len(),
            max_stack
        );
        Ok(Self { id, spec, max_stack })
    }

    /// Unique function ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Declared parameter kinds
    pub fn parameters(&self) -> &[ValueKind] {
        &self.spec.parameters
    }

    /// Declared return kind
    pub fn return_kind(&self) -> ValueKind {
        self.spec.return_kind
    }

    /// Deepest stack reached by the op sequence
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// The validated spec
    pub fn spec(&self) -> &FunctionSpec {
        &self.spec
    }

    /// Run the function on a fresh stack
    pub fn invoke(&self, args: &[Value]) -> ReflectResult<Value> {
        check_arguments(&self.spec.name, &self.spec.parameters, args)?;
        tracing::trace!("Invoking built function '{}' (id {})", self.spec.name, self.id);

        let mut stack: Vec<Value> = Vec::with_capacity(self.max_stack);
        let mut state = Execution::Running;
        for (position, op) in self.spec.ops.iter().enumerate() {
            state = self.step(position, *op, args, &mut stack);
            if !matches!(state, Execution::Running) {
                break;
            }
        }

        match state {
            Execution::Returned(value) if self.spec.return_kind.accepts(&value) => Ok(value),
            Execution::Returned(value) => Err(ReflectError::ReturnTypeMismatch {
                function: self.spec.name.clone(),
                expected: self.spec.return_kind,
                got: value.kind(),
            }),
            Execution::Faulted(err) => Err(err),
            Execution::Running => Err(malformed(&self.spec, "ran past the last op")),
        }
    }

    fn step(&self, position: usize, op: StackOp, args: &[Value], stack: &mut Vec<Value>) -> Execution {
        let underflow = |needed: usize, depth: usize| {
            Execution::Faulted(ReflectError::StackUnderflow { position, needed, depth })
        };
        match op {
            StackOp::PushArgument(index) => match args.get(index) {
                Some(arg) => {
                    stack.push(arg.clone());
                    Execution::Running
                }
                None => Execution::Faulted(ReflectError::InvalidArgumentIndex {
                    index,
                    param_count: args.len(),
                    position,
                }),
            },
            StackOp::Add => {
                let depth = stack.len();
                match (stack.pop(), stack.pop()) {
                    (Some(rhs), Some(lhs)) => match add_values(&self.spec.name, lhs, rhs) {
                        Ok(sum) => {
                            stack.push(sum);
                            Execution::Running
                        }
                        Err(err) => Execution::Faulted(err),
                    },
                    _ => underflow(2, depth),
                }
            }
            StackOp::Return => match stack.pop() {
                Some(value) => Execution::Returned(value),
                None => underflow(1, 0),
            },
        }
    }

    /// Wrap as a static method so the function can be registered on a type.
    ///
    /// Parameters are named `arg0`, `arg1`, ... in declaration order.
    pub fn into_member(self, visibility: Visibility) -> MethodDefinition {
        let name = self.spec.name.clone();
        let return_kind = self.spec.return_kind;
        let parameters = self.spec.parameters.clone();
        let function = Arc::new(self);

        let body = move |_: Option<&Instance>, args: &[Value]| -> Result<Value, BoxError> {
            function.invoke(args).map_err(BoxError::from)
        };
        let method = parameters
            .into_iter()
            .enumerate()
            .fold(MethodDefinition::new(name, return_kind, body).static_(), |m, (i, kind)| {
                m.param(format!("arg{}", i), kind)
            });

        match visibility {
            Visibility::Public => method,
            Visibility::NonPublic => method.private(),
        }
    }
}
