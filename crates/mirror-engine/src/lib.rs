//! Mirror Engine
//!
//! Runtime type introspection and dynamic function construction:
//!
//! - `reflect`: type catalog, descriptors, member invocation, attributes
//! - `emit`: stack-op function builder, verifier and interpreter
//! - `config`: `mirror.toml` settings for both

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod emit;
pub mod error;
pub mod reflect;
pub mod value;

pub use config::{CatalogConfig, ConfigError, EmitConfig, EngineConfig};
pub use emit::{BuiltFunction, FunctionBuilder, FunctionSpec, StackOp};
pub use error::{BoxError, ReflectError, ReflectResult};
pub use reflect::{
    AttributeInstance, BindingFlags, HasAttributes, MemberDescriptor, MemberKind, TypeCatalog,
    TypeDefinition, TypeDescriptor, Visibility,
};
pub use value::{Instance, Value, ValueKind};
