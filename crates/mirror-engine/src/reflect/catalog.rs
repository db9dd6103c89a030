//! Type catalog
//!
//! Owns registered type definitions, the descriptor cache and static field
//! storage. All three tables sit behind `parking_lot::RwLock`, so a catalog can
//! be shared across threads. Racing `describe` calls for the same type converge
//! on the first descriptor inserted into the cache. A descriptor is only cached
//! while the definition it was built from is still the registered one.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::binding::BindingFlags;
use super::introspection::{MemberDescriptor, MemberKind, PropertyAccess, TypeDescriptor};
use super::type_builder::TypeDefinition;
use crate::config::CatalogConfig;
use crate::error::{ReflectError, ReflectResult};
use crate::value::{check_arguments, Instance, Value, ValueKind};

#[derive(Default)]
struct TypeTable {
    definitions: FxHashMap<String, Arc<TypeDefinition>>,
    /// Registration order
    order: Vec<String>,
}

/// A cached descriptor and the definition it was built from
struct CachedDescriptor {
    definition: Arc<TypeDefinition>,
    descriptor: Arc<TypeDescriptor>,
}

/// Registry of introspectable types
pub struct TypeCatalog {
    config: CatalogConfig,
    types: RwLock<TypeTable>,
    /// Lock order: `cache` before `types`
    cache: RwLock<FxHashMap<String, CachedDescriptor>>,
    /// (declaring type, slot) -> value
    statics: RwLock<FxHashMap<(String, String), Value>>,
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.types.read().order)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    /// Create an empty catalog with default settings
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Create an empty catalog
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            config,
            types: RwLock::new(TypeTable::default()),
            cache: RwLock::new(FxHashMap::default()),
            statics: RwLock::new(FxHashMap::default()),
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a type definition.
    ///
    /// Registering an existing name replaces the definition, drops its cached
    /// descriptor and resets its static storage.
    pub fn register(&self, definition: TypeDefinition) -> ReflectResult<()> {
        definition.validate()?;
        let name = definition.name.clone();

        {
            let mut statics = self.statics.write();
            statics.retain(|(owner, _), _| *owner != name);
            for (slot, value) in definition.static_slots() {
                statics.insert((name.clone(), slot), value);
            }
        }

        let replaced = {
            let mut types = self.types.write();
            let replaced = types
                .definitions
                .insert(name.clone(), Arc::new(definition))
                .is_some();
            if !replaced {
                types.order.push(name.clone());
            }
            replaced
        };
        self.cache.write().remove(&name);

        if replaced {
            tracing::debug!("Replaced type definition '{}'", name);
        } else {
            tracing::debug!("Registered type '{}'", name);
        }
        Ok(())
    }

    /// Check if a type is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.types.read().definitions.contains_key(name)
    }

    /// Registered type names in registration order
    pub fn type_names(&self) -> Vec<String> {
        self.types.read().order.clone()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.read().order.len()
    }

    /// Check if no type is registered
    pub fn is_empty(&self) -> bool {
        self.types.read().order.is_empty()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Describe a registered type
    pub fn describe(&self, name: &str) -> ReflectResult<Arc<TypeDescriptor>> {
        if self.config.cache_descriptors {
            if let Some(hit) = self.cache.read().get(name) {
                return Ok(Arc::clone(&hit.descriptor));
            }
        }

        let definition = self
            .types
            .read()
            .definitions
            .get(name)
            .cloned()
            .ok_or_else(|| ReflectError::UnknownType(name.to_string()))?;

        let descriptor = Arc::new(definition.describe());
        tracing::debug!(
            "Built descriptor for '{}' ({} members)",
            name,
            descriptor.members().len()
        );

        if !self.config.cache_descriptors {
            return Ok(descriptor);
        }

        let mut cache = self.cache.write();
        // `register` may have swapped the definition while we were building.
        let current = match self.types.read().definitions.get(name) {
            Some(current) => Arc::ptr_eq(current, &definition),
            None => false,
        };
        if !current {
            tracing::trace!("Definition of '{}' changed during describe, not caching", name);
            return Ok(descriptor);
        }

        let entry = cache
            .entry(name.to_string())
            .or_insert_with(|| CachedDescriptor {
                definition: Arc::clone(&definition),
                descriptor: Arc::clone(&descriptor),
            });
        if !Arc::ptr_eq(&entry.definition, &definition) {
            *entry = CachedDescriptor { definition, descriptor };
        }
        Ok(Arc::clone(&entry.descriptor))
    }

    /// Describe the type an instance conforms to
    pub fn describe_instance(&self, instance: &Instance) -> ReflectResult<Arc<TypeDescriptor>> {
        self.describe(instance.type_name())
    }

    /// Describe every registered type in registration order
    pub fn describe_all(&self) -> ReflectResult<Vec<Arc<TypeDescriptor>>> {
        self.type_names().iter().map(|name| self.describe(name)).collect()
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Invoke a member.
    ///
    /// Methods run their body, fields and properties are read (no arguments),
    /// constructors build a new instance and ignore `instance`.
    pub fn invoke(
        &self,
        member: &MemberDescriptor,
        instance: Option<&Instance>,
        args: &[Value],
    ) -> ReflectResult<Value> {
        if member.is_constructor() {
            return self.run_constructor(member, args).map(Value::Object);
        }

        let receiver = Self::receiver(member, instance)?;
        let kinds: Vec<ValueKind> = member.parameters().iter().map(|p| p.kind).collect();
        check_arguments(&member.name, &kinds, args)?;

        tracing::trace!(
            "Invoking {} {}.{}",
            member.kind.as_str(),
            member.declaring_type,
            member.name
        );

        match &member.kind {
            MemberKind::Method { callable, .. } => {
                let value = callable(receiver, args).map_err(|cause| ReflectError::InvocationFailed {
                    member: member.name.clone(),
                    cause,
                })?;
                Self::check_result(member, value)
            }
            MemberKind::Field { .. } | MemberKind::Property { .. } => self.read_member(member, receiver),
            MemberKind::Constructor { .. } => self.run_constructor(member, args).map(Value::Object),
        }
    }

    /// Find a member by name and invoke it.
    ///
    /// Overloads are resolved by argument kinds first, then by name alone.
    pub fn invoke_by_name(
        &self,
        type_name: &str,
        member: &str,
        flags: BindingFlags,
        instance: Option<&Instance>,
        args: &[Value],
    ) -> ReflectResult<Value> {
        let descriptor = self.describe(type_name)?;
        let kinds: Vec<ValueKind> = args.iter().map(Value::kind).collect();
        let found = descriptor
            .find_method(member, flags, &kinds)
            .or_else(|| descriptor.find_member(member, flags))
            .ok_or_else(|| ReflectError::MemberNotFound {
                type_name: type_name.to_string(),
                member: member.to_string(),
            })?;
        self.invoke(found, instance, args)
    }

    /// Read a field or property
    pub fn get_value(&self, member: &MemberDescriptor, instance: Option<&Instance>) -> ReflectResult<Value> {
        if !(member.is_field() || member.is_property()) {
            return Err(ReflectError::UnsupportedMember {
                member: member.name.clone(),
                operation: "read",
                shape: member.kind.as_str(),
            });
        }
        let receiver = Self::receiver(member, instance)?;
        self.read_member(member, receiver)
    }

    /// Write a field or property
    pub fn set_value(
        &self,
        member: &MemberDescriptor,
        instance: Option<&Instance>,
        value: Value,
    ) -> ReflectResult<()> {
        if !(member.is_field() || member.is_property()) {
            return Err(ReflectError::UnsupportedMember {
                member: member.name.clone(),
                operation: "write",
                shape: member.kind.as_str(),
            });
        }
        let receiver = Self::receiver(member, instance)?;
        let kind = member.value_kind();
        if !kind.accepts(&value) {
            return Err(ReflectError::TypeMismatch {
                target: member.name.clone(),
                expected: kind,
                got: value.kind(),
            });
        }

        match &member.kind {
            MemberKind::Field { is_readonly: true, .. } => Err(ReflectError::ReadOnlyMember(member.name.clone())),
            MemberKind::Field { .. } => {
                self.write_slot(member, receiver, &member.name, value);
                Ok(())
            }
            MemberKind::Property { access, .. } => match access {
                PropertyAccess::Auto { writable: false, .. } => {
                    Err(ReflectError::ReadOnlyMember(member.name.clone()))
                }
                PropertyAccess::Auto { slot, .. } => {
                    self.write_slot(member, receiver, slot, value);
                    Ok(())
                }
                PropertyAccess::Computed { setter: None, .. } => {
                    Err(ReflectError::ReadOnlyMember(member.name.clone()))
                }
                PropertyAccess::Computed { setter: Some(setter), .. } => {
                    setter(receiver, value).map_err(|cause| ReflectError::InvocationFailed {
                        member: member.name.clone(),
                        cause,
                    })
                }
            },
            MemberKind::Method { .. } | MemberKind::Constructor { .. } => Err(ReflectError::UnsupportedMember {
                member: member.name.clone(),
                operation: "write",
                shape: member.kind.as_str(),
            }),
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Construct an instance with the first public constructor accepting `args`.
    ///
    /// A type without declared constructors has an implicit public
    /// parameterless one.
    pub fn construct(&self, descriptor: &TypeDescriptor, args: &[Value]) -> ReflectResult<Instance> {
        let constructors = descriptor.constructors();
        if constructors.is_empty() && args.is_empty() {
            return Ok(Instance::new(descriptor.name.clone(), descriptor.instance_slots()));
        }

        let kinds: Vec<ValueKind> = args.iter().map(Value::kind).collect();
        let chosen = constructors
            .into_iter()
            .filter(|c| c.is_public())
            .find(|c| {
                let params = c.parameters();
                params.len() == args.len() && params.iter().zip(args).all(|(p, a)| p.kind.accepts(a))
            })
            .ok_or_else(|| ReflectError::NoMatchingConstructor {
                type_name: descriptor.name.clone(),
                args: kinds.iter().map(ValueKind::as_str).collect::<Vec<_>>().join(", "),
            })?;

        self.build_instance(descriptor, chosen, args)
    }

    /// `describe` + parameterless `construct`
    pub fn instantiate(&self, name: &str) -> ReflectResult<Instance> {
        let descriptor = self.describe(name)?;
        self.construct(&descriptor, &[])
    }

    fn run_constructor(&self, member: &MemberDescriptor, args: &[Value]) -> ReflectResult<Instance> {
        let descriptor = self.describe(&member.declaring_type)?;
        let kinds: Vec<ValueKind> = member.parameters().iter().map(|p| p.kind).collect();
        check_arguments(&member.declaring_type, &kinds, args)?;
        self.build_instance(&descriptor, member, args)
    }

    fn build_instance(
        &self,
        descriptor: &TypeDescriptor,
        constructor: &MemberDescriptor,
        args: &[Value],
    ) -> ReflectResult<Instance> {
        let MemberKind::Constructor { callable, .. } = &constructor.kind else {
            return Err(ReflectError::UnsupportedMember {
                member: constructor.name.clone(),
                operation: "construct with",
                shape: constructor.kind.as_str(),
            });
        };

        let instance = Instance::new(descriptor.name.clone(), descriptor.instance_slots());
        callable(&instance, args).map_err(|cause| ReflectError::InvocationFailed {
            member: format!("{}.{}", descriptor.name, constructor.name),
            cause,
        })?;
        tracing::trace!("Constructed instance of '{}'", descriptor.name);
        Ok(instance)
    }

    // ========================================================================
    // Slot access
    // ========================================================================

    /// Resolve the receiver for a member: `None` for statics, the checked
    /// instance otherwise.
    fn receiver<'a>(
        member: &MemberDescriptor,
        instance: Option<&'a Instance>,
    ) -> ReflectResult<Option<&'a Instance>> {
        if member.is_static {
            return Ok(None);
        }
        let instance = instance.ok_or_else(|| ReflectError::MissingInstance(member.name.clone()))?;
        if instance.type_name() != member.declaring_type {
            return Err(ReflectError::WrongInstanceType {
                member: member.name.clone(),
                expected: member.declaring_type.clone(),
                got: instance.type_name().to_string(),
            });
        }
        Ok(Some(instance))
    }

    fn read_member(&self, member: &MemberDescriptor, receiver: Option<&Instance>) -> ReflectResult<Value> {
        match &member.kind {
            MemberKind::Field { .. } => Ok(self.read_slot(member, receiver, &member.name)),
            MemberKind::Property { access, .. } => match access {
                PropertyAccess::Auto { slot, .. } => Ok(self.read_slot(member, receiver, slot)),
                PropertyAccess::Computed { getter, .. } => {
                    let value = getter(receiver).map_err(|cause| ReflectError::InvocationFailed {
                        member: member.name.clone(),
                        cause,
                    })?;
                    Self::check_result(member, value)
                }
            },
            MemberKind::Method { .. } | MemberKind::Constructor { .. } => Err(ReflectError::UnsupportedMember {
                member: member.name.clone(),
                operation: "read",
                shape: member.kind.as_str(),
            }),
        }
    }

    /// Host callables must return what the member declares
    fn check_result(member: &MemberDescriptor, value: Value) -> ReflectResult<Value> {
        let expected = member.value_kind();
        if expected.accepts(&value) {
            Ok(value)
        } else {
            Err(ReflectError::ReturnTypeMismatch {
                function: member.name.clone(),
                expected,
                got: value.kind(),
            })
        }
    }

    fn read_slot(&self, member: &MemberDescriptor, receiver: Option<&Instance>, slot: &str) -> Value {
        let stored = match receiver {
            Some(instance) => instance.field(slot),
            None => self
                .statics
                .read()
                .get(&(member.declaring_type.clone(), slot.to_string()))
                .cloned(),
        };
        stored.unwrap_or_else(|| member.value_kind().default_value())
    }

    fn write_slot(&self, member: &MemberDescriptor, receiver: Option<&Instance>, slot: &str, value: Value) {
        match receiver {
            Some(instance) => {
                instance.set_field(slot, value);
            }
            None => {
                self.statics
                    .write()
                    .insert((member.declaring_type.clone(), slot.to_string()), value);
            }
        }
    }
}
