//! Type definitions supplied by the host at registration time
//!
//! A `TypeDefinition` is the mutable, builder-style counterpart of a
//! `TypeDescriptor`. The host declares members in order; the catalog walks the
//! definition once per `describe` (or once per process with caching enabled).
//!
//! ```ignore
//! let def = TypeDefinition::new("ReflectionDemo")
//!     .with_property(PropertyDefinition::auto("DemoProperty", ValueKind::String))
//!     .with_field(FieldDefinition::new("demoField", ValueKind::Int).private())
//!     .with_method(MethodDefinition::new("DemoMethod1", ValueKind::Void, |_, _| Ok(Value::Null)));
//! ```

use std::sync::Arc;

use super::binding::Visibility;
use super::introspection::{
    ConstructorFn, GetterFn, MemberDescriptor, MemberKind, MethodFn, ParameterDescriptor,
    PropertyAccess, SetterFn, TypeDescriptor,
};
use super::metadata::AttributeInstance;
use crate::error::{BoxError, ReflectError, ReflectResult};
use crate::value::{Instance, Value, ValueKind};

/// Name given to constructor members
pub const CONSTRUCTOR_NAME: &str = ".ctor";

fn parameters(params: &[(String, ValueKind)]) -> Vec<ParameterDescriptor> {
    params
        .iter()
        .enumerate()
        .map(|(index, (name, kind))| ParameterDescriptor {
            name: name.clone(),
            kind: *kind,
            index,
        })
        .collect()
}

/// Definition for a method
#[derive(Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Parameters (name, kind)
    pub parameters: Vec<(String, ValueKind)>,
    /// Return kind
    pub return_kind: ValueKind,
    /// Visibility
    pub visibility: Visibility,
    /// Whether this is a static method
    pub is_static: bool,
    /// Attached attributes
    pub attributes: Vec<AttributeInstance>,
    body: MethodFn,
}

impl MethodDefinition {
    /// Create a public instance method
    pub fn new<F>(name: impl Into<String>, return_kind: ValueKind, body: F) -> Self
    where
        F: Fn(Option<&Instance>, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::from_callable(name, return_kind, Arc::new(body))
    }

    /// Create a public instance method from a shared callable
    pub fn from_callable(name: impl Into<String>, return_kind: ValueKind, body: MethodFn) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_kind,
            visibility: Visibility::Public,
            is_static: false,
            attributes: Vec::new(),
            body,
        }
    }

    /// Append a parameter
    pub fn param(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.parameters.push((name.into(), kind));
        self
    }

    /// Mark as non-public
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    /// Mark as static
    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach an attribute
    pub fn attribute(mut self, attribute: AttributeInstance) -> Self {
        self.attributes.push(attribute);
        self
    }

    fn describe(&self, declaring_type: &str) -> MemberDescriptor {
        MemberDescriptor {
            name: self.name.clone(),
            declaring_type: declaring_type.to_string(),
            visibility: self.visibility,
            is_static: self.is_static,
            kind: MemberKind::Method {
                parameters: parameters(&self.parameters),
                return_kind: self.return_kind,
                callable: Arc::clone(&self.body),
            },
            attributes: self.attributes.clone(),
        }
    }
}

/// Definition for a field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Declared kind
    pub kind: ValueKind,
    /// Initial value (defaults to the kind's default)
    pub initial_value: Option<Value>,
    /// Visibility
    pub visibility: Visibility,
    /// Whether this is a static field
    pub is_static: bool,
    /// Whether this field is readonly
    pub is_readonly: bool,
    /// Attached attributes
    pub attributes: Vec<AttributeInstance>,
}

impl FieldDefinition {
    /// Create a public instance field
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            initial_value: None,
            visibility: Visibility::Public,
            is_static: false,
            is_readonly: false,
            attributes: Vec::new(),
        }
    }

    /// Set the initial value
    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Mark as non-public
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    /// Mark as static
    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as readonly
    pub fn readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    /// Attach an attribute
    pub fn attribute(mut self, attribute: AttributeInstance) -> Self {
        self.attributes.push(attribute);
        self
    }

    fn describe(&self, declaring_type: &str) -> MemberDescriptor {
        MemberDescriptor {
            name: self.name.clone(),
            declaring_type: declaring_type.to_string(),
            visibility: self.visibility,
            is_static: self.is_static,
            kind: MemberKind::Field {
                kind: self.kind,
                is_readonly: self.is_readonly,
                initial: self
                    .initial_value
                    .clone()
                    .unwrap_or_else(|| self.kind.default_value()),
            },
            attributes: self.attributes.clone(),
        }
    }
}

/// Definition for a property
#[derive(Clone)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    /// Declared kind
    pub kind: ValueKind,
    /// Visibility
    pub visibility: Visibility,
    /// Whether this is a static property
    pub is_static: bool,
    /// Attached attributes
    pub attributes: Vec<AttributeInstance>,
    access: PropertyAccess,
}

impl PropertyDefinition {
    /// Auto-property with getter and setter (`{ get; set; }`)
    pub fn auto(name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        Self {
            access: PropertyAccess::Auto {
                slot: format!("<{}>k__BackingField", name),
                writable: true,
            },
            name,
            kind,
            visibility: Visibility::Public,
            is_static: false,
            attributes: Vec::new(),
        }
    }

    /// Getter-only computed property (`Prop => expr`)
    pub fn computed<G>(name: impl Into<String>, kind: ValueKind, getter: G) -> Self
    where
        G: Fn(Option<&Instance>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            is_static: false,
            attributes: Vec::new(),
            access: PropertyAccess::Computed {
                getter: Arc::new(getter) as GetterFn,
                setter: None,
            },
        }
    }

    /// Add a setter to a computed property, or keep an auto-property writable
    pub fn with_setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(Option<&Instance>, Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        match &mut self.access {
            PropertyAccess::Computed { setter: slot, .. } => *slot = Some(Arc::new(setter) as SetterFn),
            PropertyAccess::Auto { writable, .. } => *writable = true,
        }
        self
    }

    /// Remove the setter of an auto-property (`{ get; }`)
    pub fn read_only(mut self) -> Self {
        match &mut self.access {
            PropertyAccess::Auto { writable, .. } => *writable = false,
            PropertyAccess::Computed { setter, .. } => *setter = None,
        }
        self
    }

    /// Mark as non-public
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    /// Mark as static
    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach an attribute
    pub fn attribute(mut self, attribute: AttributeInstance) -> Self {
        self.attributes.push(attribute);
        self
    }

    fn describe(&self, declaring_type: &str) -> MemberDescriptor {
        MemberDescriptor {
            name: self.name.clone(),
            declaring_type: declaring_type.to_string(),
            visibility: self.visibility,
            is_static: self.is_static,
            kind: MemberKind::Property {
                kind: self.kind,
                access: self.access.clone(),
            },
            attributes: self.attributes.clone(),
        }
    }
}

/// Definition for a constructor
#[derive(Clone)]
pub struct ConstructorDefinition {
    /// Parameters (name, kind)
    pub parameters: Vec<(String, ValueKind)>,
    /// Visibility
    pub visibility: Visibility,
    body: ConstructorFn,
}

impl ConstructorDefinition {
    /// Create a public constructor
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters: Vec::new(),
            visibility: Visibility::Public,
            body: Arc::new(body),
        }
    }

    /// Public parameterless constructor that only initializes fields
    pub fn empty() -> Self {
        Self::new(|_, _| Ok(()))
    }

    /// Append a parameter
    pub fn param(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.parameters.push((name.into(), kind));
        self
    }

    /// Mark as non-public
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    fn describe(&self, declaring_type: &str) -> MemberDescriptor {
        MemberDescriptor {
            name: CONSTRUCTOR_NAME.to_string(),
            declaring_type: declaring_type.to_string(),
            visibility: self.visibility,
            is_static: false,
            kind: MemberKind::Constructor {
                parameters: parameters(&self.parameters),
                callable: Arc::clone(&self.body),
            },
            attributes: Vec::new(),
        }
    }
}

#[derive(Clone)]
enum MemberDefinition {
    Method(MethodDefinition),
    Field(FieldDefinition),
    Property(PropertyDefinition),
    Constructor(ConstructorDefinition),
}

/// Definition of a type to register with the catalog
#[derive(Clone)]
pub struct TypeDefinition {
    /// Type name
    pub name: String,
    /// Attached attributes
    pub attributes: Vec<AttributeInstance>,
    members: Vec<MemberDefinition>,
}

impl TypeDefinition {
    /// Create an empty type definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodDefinition) -> Self {
        self.members.push(MemberDefinition::Method(method));
        self
    }

    /// Add a static method
    pub fn with_static_method(self, method: MethodDefinition) -> Self {
        self.with_method(method.static_())
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.members.push(MemberDefinition::Field(field));
        self
    }

    /// Add a property
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.members.push(MemberDefinition::Property(property));
        self
    }

    /// Add a constructor
    pub fn with_constructor(mut self, constructor: ConstructorDefinition) -> Self {
        self.members.push(MemberDefinition::Constructor(constructor));
        self
    }

    /// Attach an attribute to the type
    pub fn with_attribute(mut self, attribute: AttributeInstance) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Number of declared members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Static fields with their initial values, for the catalog's static storage
    pub(crate) fn static_slots(&self) -> Vec<(String, Value)> {
        self.members
            .iter()
            .filter_map(|m| match m {
                MemberDefinition::Field(f) if f.is_static => Some((
                    f.name.clone(),
                    f.initial_value.clone().unwrap_or_else(|| f.kind.default_value()),
                )),
                MemberDefinition::Property(p) if p.is_static => match &p.access {
                    PropertyAccess::Auto { slot, .. } => Some((slot.clone(), p.kind.default_value())),
                    PropertyAccess::Computed { .. } => None,
                },
                _ => None,
            })
            .collect()
    }

    /// Check the definition before registration
    pub(crate) fn validate(&self) -> ReflectResult<()> {
        if self.name.trim().is_empty() {
            return Err(ReflectError::InvalidDefinition(
                "type name cannot be empty".to_string(),
            ));
        }
        for member in &self.members {
            let name = match member {
                MemberDefinition::Method(m) => &m.name,
                MemberDefinition::Field(f) => &f.name,
                MemberDefinition::Property(p) => &p.name,
                MemberDefinition::Constructor(_) => continue,
            };
            if name.trim().is_empty() {
                return Err(ReflectError::InvalidDefinition(format!(
                    "member of '{}' has an empty name",
                    self.name
                )));
            }
            if let MemberDefinition::Field(f) = member {
                if let Some(initial) = &f.initial_value {
                    if !f.kind.accepts(initial) {
                        return Err(ReflectError::InvalidDefinition(format!(
                            "initial value of '{}.{}' is {}, declared {}",
                            self.name,
                            f.name,
                            initial.kind(),
                            f.kind
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk the declared members and build the immutable descriptor
    pub fn describe(&self) -> TypeDescriptor {
        let members = self
            .members
            .iter()
            .map(|m| match m {
                MemberDefinition::Method(def) => def.describe(&self.name),
                MemberDefinition::Field(def) => def.describe(&self.name),
                MemberDefinition::Property(def) => def.describe(&self.name),
                MemberDefinition::Constructor(def) => def.describe(&self.name),
            })
            .collect();
        TypeDescriptor::new(self.name.clone(), members, self.attributes.clone())
    }
}
