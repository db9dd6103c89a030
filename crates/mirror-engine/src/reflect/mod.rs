//! Runtime type catalog
//!
//! Types are registered up front as `TypeDefinition`s and described on demand.
//! Descriptors answer structural questions (members, parameters, attributes);
//! the catalog invokes members and constructs instances.
//!
//! ## Usage
//!
//! ```ignore
//! let catalog = TypeCatalog::new();
//! catalog.register(
//!     TypeDefinition::new("ReflectionDemo")
//!         .with_method(MethodDefinition::new("DemoMethod1", ValueKind::String, |_, _| {
//!             Ok(Value::from("Demo Method 1"))
//!         })),
//! )?;
//!
//! let ty = catalog.describe("ReflectionDemo")?;
//! let obj = catalog.construct(&ty, &[])?;
//! let method = ty.find_member("DemoMethod1", BindingFlags::DEFAULT).unwrap();
//! catalog.invoke(method, Some(&obj), &[])?;
//! ```

mod binding;
mod catalog;
mod introspection;
mod metadata;
mod type_builder;

pub use binding::{BindingFlags, Visibility};
pub use catalog::TypeCatalog;
pub use introspection::{
    ConstructorFn, GetterFn, MemberDescriptor, MemberKind, MethodFn, ParameterDescriptor,
    PropertyAccess, SetterFn, TypeDescriptor,
};
pub use metadata::{AttributeInstance, HasAttributes};
pub use type_builder::{
    ConstructorDefinition, FieldDefinition, MethodDefinition, PropertyDefinition, TypeDefinition,
    CONSTRUCTOR_NAME,
};
