//! Type and member descriptors
//!
//! Descriptors are the immutable, queryable side of the catalog. They are
//! derived from a registered `TypeDefinition` by `TypeCatalog::describe` and
//! never change afterwards. Parameter and return kinds are copied from the
//! definition; nothing is inferred at call time.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::binding::{BindingFlags, Visibility};
use super::metadata::{AttributeInstance, HasAttributes};
use crate::error::BoxError;
use crate::value::{Instance, Value, ValueKind};

/// Body of a method: receives the instance (None for static) and the arguments
pub type MethodFn = Arc<dyn Fn(Option<&Instance>, &[Value]) -> Result<Value, BoxError> + Send + Sync>;

/// Body of a constructor: initializes a freshly allocated instance
pub type ConstructorFn = Arc<dyn Fn(&Instance, &[Value]) -> Result<(), BoxError> + Send + Sync>;

/// Computed property getter
pub type GetterFn = Arc<dyn Fn(Option<&Instance>) -> Result<Value, BoxError> + Send + Sync>;

/// Computed property setter
pub type SetterFn = Arc<dyn Fn(Option<&Instance>, Value) -> Result<(), BoxError> + Send + Sync>;

/// Parameter information
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Declared kind
    pub kind: ValueKind,
    /// Position in the parameter list
    pub index: usize,
}

/// How a property reads and writes its value
#[derive(Clone)]
pub enum PropertyAccess {
    /// Auto-property backed by a hidden storage slot
    Auto {
        /// Name of the backing slot
        slot: String,
        /// Whether a setter exists
        writable: bool,
    },
    /// Getter (and optional setter) implemented by the host
    Computed {
        /// Getter body
        getter: GetterFn,
        /// Setter body, if any
        setter: Option<SetterFn>,
    },
}

impl PropertyAccess {
    /// Whether the property can be assigned
    pub fn is_writable(&self) -> bool {
        match self {
            PropertyAccess::Auto { writable, .. } => *writable,
            PropertyAccess::Computed { setter, .. } => setter.is_some(),
        }
    }
}

impl fmt::Debug for PropertyAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyAccess::Auto { slot, writable } => f
                .debug_struct("Auto")
                .field("slot", slot)
                .field("writable", writable)
                .finish(),
            PropertyAccess::Computed { setter, .. } => f
                .debug_struct("Computed")
                .field("has_setter", &setter.is_some())
                .finish(),
        }
    }
}

impl PartialEq for PropertyAccess {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                PropertyAccess::Auto { slot: a, writable: wa },
                PropertyAccess::Auto { slot: b, writable: wb },
            ) => a == b && wa == wb,
            (
                PropertyAccess::Computed { setter: a, .. },
                PropertyAccess::Computed { setter: b, .. },
            ) => a.is_some() == b.is_some(),
            _ => false,
        }
    }
}

/// Member shape
#[derive(Clone)]
pub enum MemberKind {
    /// Callable method
    Method {
        /// Ordered parameters
        parameters: Vec<ParameterDescriptor>,
        /// Declared return kind
        return_kind: ValueKind,
        /// Method body
        callable: MethodFn,
    },
    /// Data slot
    Field {
        /// Declared kind
        kind: ValueKind,
        /// Assignable only during construction
        is_readonly: bool,
        /// Value stored in a fresh slot
        initial: Value,
    },
    /// Property with accessors
    Property {
        /// Declared kind
        kind: ValueKind,
        /// Accessors
        access: PropertyAccess,
    },
    /// Instance constructor
    Constructor {
        /// Ordered parameters
        parameters: Vec<ParameterDescriptor>,
        /// Initializer body
        callable: ConstructorFn,
    },
}

impl MemberKind {
    /// Short name of the shape
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Method { .. } => "method",
            MemberKind::Field { .. } => "field",
            MemberKind::Property { .. } => "property",
            MemberKind::Constructor { .. } => "constructor",
        }
    }
}

impl fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method { parameters, return_kind, .. } => f
                .debug_struct("Method")
                .field("parameters", parameters)
                .field("return_kind", return_kind)
                .finish(),
            MemberKind::Field { kind, is_readonly, initial } => f
                .debug_struct("Field")
                .field("kind", kind)
                .field("is_readonly", is_readonly)
                .field("initial", initial)
                .finish(),
            MemberKind::Property { kind, access } => f
                .debug_struct("Property")
                .field("kind", kind)
                .field("access", access)
                .finish(),
            MemberKind::Constructor { parameters, .. } => f
                .debug_struct("Constructor")
                .field("parameters", parameters)
                .finish(),
        }
    }
}

// Structural equality: callables are opaque and ignored.
impl PartialEq for MemberKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                MemberKind::Method { parameters: pa, return_kind: ra, .. },
                MemberKind::Method { parameters: pb, return_kind: rb, .. },
            ) => pa == pb && ra == rb,
            (
                MemberKind::Field { kind: ka, is_readonly: ra, initial: ia },
                MemberKind::Field { kind: kb, is_readonly: rb, initial: ib },
            ) => ka == kb && ra == rb && ia == ib,
            (
                MemberKind::Property { kind: ka, access: aa },
                MemberKind::Property { kind: kb, access: ab },
            ) => ka == kb && aa == ab,
            (
                MemberKind::Constructor { parameters: pa, .. },
                MemberKind::Constructor { parameters: pb, .. },
            ) => pa == pb,
            _ => false,
        }
    }
}

/// Member information for reflection
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    /// Member name (".ctor" for constructors)
    pub name: String,
    /// Name of the declaring type
    pub declaring_type: String,
    /// Declared visibility
    pub visibility: Visibility,
    /// Whether the member is static
    pub is_static: bool,
    /// Shape and signature
    pub kind: MemberKind,
    /// Attached attributes
    pub attributes: Vec<AttributeInstance>,
}

impl MemberDescriptor {
    /// Parameters for methods and constructors, empty otherwise
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        match &self.kind {
            MemberKind::Method { parameters, .. } | MemberKind::Constructor { parameters, .. } => parameters,
            MemberKind::Field { .. } | MemberKind::Property { .. } => &[],
        }
    }

    /// Kind of the value produced by invoking or reading this member
    pub fn value_kind(&self) -> ValueKind {
        match &self.kind {
            MemberKind::Method { return_kind, .. } => *return_kind,
            MemberKind::Field { kind, .. } | MemberKind::Property { kind, .. } => *kind,
            MemberKind::Constructor { .. } => ValueKind::Object,
        }
    }

    /// Check the member shape
    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    /// Check the member shape
    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    /// Check the member shape
    pub fn is_property(&self) -> bool {
        matches!(self.kind, MemberKind::Property { .. })
    }

    /// Check the member shape
    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MemberKind::Constructor { .. })
    }

    /// Check visibility
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the parameter list accepts these argument kinds
    pub fn accepts_kinds(&self, kinds: &[ValueKind]) -> bool {
        let params = self.parameters();
        params.len() == kinds.len()
            && params
                .iter()
                .zip(kinds)
                .all(|(p, k)| match (p.kind, *k) {
                    (ValueKind::Any, _) | (ValueKind::Object, ValueKind::Void) => true,
                    (declared, actual) => declared == actual,
                })
    }

    /// Signature line, e.g. `int DemoMethod1(int a, int b)`
    pub fn signature(&self) -> String {
        let params = self
            .parameters()
            .iter()
            .map(|p| format!("{} {}", p.kind, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        match &self.kind {
            MemberKind::Method { return_kind, .. } => format!("{} {}({})", return_kind, self.name, params),
            MemberKind::Constructor { .. } => format!("{}({})", self.declaring_type, params),
            MemberKind::Field { kind, .. } | MemberKind::Property { kind, .. } => {
                format!("{} {}", kind, self.name)
            }
        }
    }
}

impl HasAttributes for MemberDescriptor {
    fn attributes(&self) -> &[AttributeInstance] {
        &self.attributes
    }
}

/// Runtime type description
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Type name
    pub name: String,
    /// Members in declaration order
    members: Vec<MemberDescriptor>,
    /// Attached attributes
    attributes: Vec<AttributeInstance>,
    /// Member name to positions in `members` (overloads share a name)
    member_indices: FxHashMap<String, Vec<usize>>,
}

impl TypeDescriptor {
    /// Assemble a descriptor and build its name index
    pub(crate) fn new(
        name: String,
        members: Vec<MemberDescriptor>,
        attributes: Vec<AttributeInstance>,
    ) -> Self {
        let mut member_indices: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (index, member) in members.iter().enumerate() {
            if !member.is_constructor() {
                member_indices.entry(member.name.clone()).or_default().push(index);
            }
        }
        Self {
            name,
            members,
            attributes,
            member_indices,
        }
    }

    /// All members in declaration order
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Find a member by exact name. With overloads, the first declared match wins.
    pub fn find_member(&self, name: &str, flags: BindingFlags) -> Option<&MemberDescriptor> {
        self.member_indices
            .get(name)?
            .iter()
            .map(|&i| &self.members[i])
            .find(|m| flags.matches(m.visibility, m.is_static))
    }

    /// Find a method overload by name and parameter kinds
    pub fn find_method(
        &self,
        name: &str,
        flags: BindingFlags,
        kinds: &[ValueKind],
    ) -> Option<&MemberDescriptor> {
        self.member_indices
            .get(name)?
            .iter()
            .map(|&i| &self.members[i])
            .filter(|m| m.is_method() && flags.matches(m.visibility, m.is_static))
            .find(|m| m.accepts_kinds(kinds))
    }

    fn filtered<'a>(
        &'a self,
        flags: BindingFlags,
        pred: impl Fn(&MemberDescriptor) -> bool + 'a,
    ) -> impl Iterator<Item = &'a MemberDescriptor> + 'a {
        self.members
            .iter()
            .filter(move |m| pred(*m) && flags.matches(m.visibility, m.is_static))
    }

    /// Methods passing the filter, in declaration order
    pub fn methods(&self, flags: BindingFlags) -> Vec<&MemberDescriptor> {
        self.filtered(flags, MemberDescriptor::is_method).collect()
    }

    /// Fields passing the filter, in declaration order
    pub fn fields(&self, flags: BindingFlags) -> Vec<&MemberDescriptor> {
        self.filtered(flags, MemberDescriptor::is_field).collect()
    }

    /// Properties passing the filter, in declaration order
    pub fn properties(&self, flags: BindingFlags) -> Vec<&MemberDescriptor> {
        self.filtered(flags, MemberDescriptor::is_property).collect()
    }

    /// Declared constructors in declaration order
    pub fn constructors(&self) -> Vec<&MemberDescriptor> {
        self.members.iter().filter(|m| m.is_constructor()).collect()
    }

    /// Storage slots a fresh instance starts with: instance fields and
    /// instance auto-property backing slots.
    pub fn instance_slots(&self) -> Vec<(String, Value)> {
        self.members
            .iter()
            .filter(|m| !m.is_static)
            .filter_map(|m| match &m.kind {
                MemberKind::Field { initial, .. } => Some((m.name.clone(), initial.clone())),
                MemberKind::Property {
                    kind,
                    access: PropertyAccess::Auto { slot, .. },
                } => Some((slot.clone(), kind.default_value())),
                _ => None,
            })
            .collect()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.members == other.members && self.attributes == other.attributes
    }
}

impl HasAttributes for TypeDescriptor {
    fn attributes(&self) -> &[AttributeInstance] {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, visibility: Visibility, params: &[(&str, ValueKind)], ret: ValueKind) -> MemberDescriptor {
        MemberDescriptor {
            name: name.to_string(),
            declaring_type: "ReflectionDemo".to_string(),
            visibility,
            is_static: false,
            kind: MemberKind::Method {
                parameters: params
                    .iter()
                    .enumerate()
                    .map(|(index, (n, k))| ParameterDescriptor {
                        name: n.to_string(),
                        kind: *k,
                        index,
                    })
                    .collect(),
                return_kind: ret,
                callable: Arc::new(|_, _| Ok(Value::Null)),
            },
            attributes: Vec::new(),
        }
    }

    fn demo() -> TypeDescriptor {
        TypeDescriptor::new(
            "ReflectionDemo".to_string(),
            vec![
                method("DemoMethod1", Visibility::Public, &[], ValueKind::Void),
                method(
                    "DemoMethod1",
                    Visibility::NonPublic,
                    &[("a", ValueKind::Int), ("b", ValueKind::Int)],
                    ValueKind::Int,
                ),
                MemberDescriptor {
                    name: "demoField".to_string(),
                    declaring_type: "ReflectionDemo".to_string(),
                    visibility: Visibility::NonPublic,
                    is_static: false,
                    kind: MemberKind::Field {
                        kind: ValueKind::Int,
                        is_readonly: false,
                        initial: Value::Int(0),
                    },
                    attributes: Vec::new(),
                },
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_find_member_respects_visibility() {
        let ty = demo();

        let public = ty.find_member("DemoMethod1", BindingFlags::DEFAULT).unwrap();
        assert!(public.parameters().is_empty());

        let private = ty
            .find_member("DemoMethod1", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .unwrap();
        assert_eq!(private.parameters().len(), 2);

        assert!(ty.find_member("demoField", BindingFlags::DEFAULT).is_none());
        assert!(ty.find_member("demoField", BindingFlags::ALL).is_some());
        assert!(ty.find_member("missing", BindingFlags::ALL).is_none());
    }

    #[test]
    fn test_find_method_by_kinds() {
        let ty = demo();
        let found = ty
            .find_method("DemoMethod1", BindingFlags::ALL, &[ValueKind::Int, ValueKind::Int])
            .unwrap();
        assert_eq!(found.value_kind(), ValueKind::Int);
        assert!(ty.find_method("DemoMethod1", BindingFlags::ALL, &[ValueKind::String]).is_none());
    }

    #[test]
    fn test_enumeration_order() {
        let ty = demo();
        let methods = ty.methods(BindingFlags::ALL);
        assert_eq!(methods.len(), 2);
        assert!(methods[0].is_public());
        assert_eq!(ty.methods(BindingFlags::DEFAULT).len(), 1);
        assert!(ty.fields(BindingFlags::DEFAULT).is_empty());
        assert_eq!(ty.fields(BindingFlags::ALL).len(), 1);
    }

    #[test]
    fn test_signature() {
        let ty = demo();
        let private = ty.find_method("DemoMethod1", BindingFlags::ALL, &[ValueKind::Int, ValueKind::Int]).unwrap();
        assert_eq!(private.signature(), "int DemoMethod1(int a, int b)");
    }

    #[test]
    fn test_structural_equality_ignores_callables() {
        assert_eq!(demo(), demo());
        assert_eq!(demo().instance_slots(), vec![("demoField".to_string(), Value::Int(0))]);
    }
}
