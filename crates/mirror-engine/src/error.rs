//! Error types for the catalog and the function builder

use thiserror::Error;

use crate::value::ValueKind;

/// Boxed failure raised by a member's underlying callable
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reflection and emission errors
///
/// Build-time errors (`InvalidArgumentIndex`, `StackUnderflow`,
/// `MalformedSpec`) keep a `BuiltFunction` from ever being created. Every other
/// variant is raised per call and leaves the catalog untouched.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// Type was never registered with the catalog
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Wrong number of arguments
    #[error("Arity mismatch for '{target}': expected {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Member or function name
        target: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Runtime kind disagrees with the declared kind
    #[error("Type mismatch in '{target}': expected {expected}, got {got}")]
    TypeMismatch {
        /// Where the mismatch happened (member, parameter or operation)
        target: String,
        /// Declared kind
        expected: ValueKind,
        /// Runtime kind
        got: ValueKind,
    },

    /// Non-static member invoked without an instance
    #[error("Member '{0}' is not static and requires an instance")]
    MissingInstance(String),

    /// No constructor accepts the supplied arguments
    #[error("No constructor of '{type_name}' accepts ({args})")]
    NoMatchingConstructor {
        /// Type being constructed
        type_name: String,
        /// Kinds of the supplied arguments, comma separated
        args: String,
    },

    /// The underlying callable failed
    #[error("Invocation of '{member}' failed: {cause}")]
    InvocationFailed {
        /// Member whose callable failed
        member: String,
        /// Failure raised by the callable
        #[source]
        cause: BoxError,
    },

    /// `PushArgument` refers past the parameter list
    #[error("Argument index {index} out of range at op {position} ({param_count} parameter(s))")]
    InvalidArgumentIndex {
        /// Offending index
        index: usize,
        /// Declared parameter count
        param_count: usize,
        /// Position of the op in the sequence
        position: usize,
    },

    /// An op needs more values than the evaluation stack holds
    #[error("Stack underflow at op {position}: needs {needed}, depth is {depth}")]
    StackUnderflow {
        /// Position of the op in the sequence
        position: usize,
        /// Values the op consumes
        needed: usize,
        /// Depth before the op
        depth: usize,
    },

    /// Structurally invalid op sequence
    #[error("Malformed function spec '{function}': {reason}")]
    MalformedSpec {
        /// Function name
        function: String,
        /// What is wrong with it
        reason: String,
    },

    /// Returned value does not have the declared return kind
    #[error("Function '{function}' returned {got}, declared {expected}")]
    ReturnTypeMismatch {
        /// Function name
        function: String,
        /// Declared return kind
        expected: ValueKind,
        /// Kind actually produced
        got: ValueKind,
    },

    /// Instance does not conform to the member's declaring type
    #[error("Member '{member}' belongs to '{expected}', instance is '{got}'")]
    WrongInstanceType {
        /// Member being accessed
        member: String,
        /// Declaring type
        expected: String,
        /// Type of the supplied instance
        got: String,
    },

    /// No member with that name passes the lookup filter
    #[error("Type '{type_name}' has no member '{member}' matching the lookup")]
    MemberNotFound {
        /// Type searched
        type_name: String,
        /// Requested member name
        member: String,
    },

    /// Operation does not apply to this member shape
    #[error("Cannot {operation} '{member}': it is a {shape}")]
    UnsupportedMember {
        /// Member name
        member: String,
        /// Attempted operation
        operation: &'static str,
        /// Member shape
        shape: &'static str,
    },

    /// Write through a readonly field or a property without setter
    #[error("Member '{0}' is read-only")]
    ReadOnlyMember(String),

    /// Rejected type registration
    #[error("Invalid type definition: {0}")]
    InvalidDefinition(String),
}

/// Result alias used across the engine
pub type ReflectResult<T> = Result<T, ReflectError>;

impl ReflectError {
    /// True for errors raised while validating a function spec
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgumentIndex { .. } | Self::StackUnderflow { .. } | Self::MalformedSpec { .. }
        )
    }
}
