//! Walkthrough types registered by every command

use std::time::{SystemTime, UNIX_EPOCH};

use mirror_engine::reflect::{
    ConstructorDefinition, FieldDefinition, MethodDefinition, PropertyDefinition,
};
use mirror_engine::{
    AttributeInstance, CatalogConfig, FunctionBuilder, FunctionSpec, ReflectResult, TypeCatalog,
    TypeDefinition, Value, ValueKind,
};

/// Name of the type that hosts built functions
pub const DYNAMIC_TYPE: &str = "DynamicType";

/// Name of the built adder method
pub const DYNAMIC_METHOD: &str = "DynamicMethod";

/// A readonly field assigned once, in the constructor
fn readonly_demo() -> TypeDefinition {
    TypeDefinition::new("ReadonlyDemo")
        .with_field(FieldDefinition::new("random", ValueKind::Int).private().readonly())
        .with_constructor(ConstructorDefinition::new(|obj, _| {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or_default();
            obj.set_field("random", Value::Int(i64::from(seed)));
            Ok(())
        }))
}

/// Expression-bodied members
fn arrow_operator_demo() -> TypeDefinition {
    TypeDefinition::new("ArrowOperatorDemo")
        .with_property(PropertyDefinition::computed("DemoProperty", ValueKind::Int, |_| {
            Ok(Value::Int(10))
        }))
        .with_method(MethodDefinition::new("DemoMethod", ValueKind::Int, |_, _| {
            Ok(Value::Int(10 + 25))
        }))
}

fn property_initializer_demo() -> TypeDefinition {
    TypeDefinition::new("PropertyInitializerDemo")
        .with_property(PropertyDefinition::auto("A", ValueKind::Int))
        .with_property(PropertyDefinition::auto("B", ValueKind::String))
}

fn reflection_demo() -> TypeDefinition {
    TypeDefinition::new("ReflectionDemo")
        .with_property(PropertyDefinition::auto("DemoProperty", ValueKind::String))
        .with_field(FieldDefinition::new("demoField", ValueKind::Int).private())
        .with_method(MethodDefinition::new("DemoMethod1", ValueKind::Void, |_, _| {
            println!("Demo Method 1");
            Ok(Value::Null)
        }))
        .with_method(
            MethodDefinition::new("DemoMethod1", ValueKind::Int, |_, args| {
                match (&args[0], &args[1]) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
                    _ => Err("DemoMethod1 expects two ints".into()),
                }
            })
            .param("a", ValueKind::Int)
            .param("b", ValueKind::Int)
            .private(),
        )
}

fn obsolete_demo() -> TypeDefinition {
    TypeDefinition::new("ObsoleteDemo").with_method(
        MethodDefinition::new("ObsoleteMethod", ValueKind::Void, |_, _| Ok(Value::Null))
            .attribute(AttributeInstance::new("Obsolete")),
    )
}

fn developer_attribute_demo() -> TypeDefinition {
    TypeDefinition::new("DeveloperAttributeDemo").with_attribute(
        AttributeInstance::new("Developer")
            .with("Name", "A")
            .with("Email", "a@a.com"),
    )
}

/// Build a catalog holding every walkthrough type
pub fn catalog(config: &CatalogConfig) -> ReflectResult<TypeCatalog> {
    let catalog = TypeCatalog::with_config(config.clone());
    for definition in [
        readonly_demo(),
        arrow_operator_demo(),
        property_initializer_demo(),
        reflection_demo(),
        obsolete_demo(),
        developer_attribute_demo(),
    ] {
        catalog.register(definition)?;
    }
    Ok(catalog)
}

/// `int name(int, int)`: ldarg.0, ldarg.1, add, ret
pub fn adder_spec(name: &str) -> FunctionSpec {
    let mut builder = FunctionBuilder::new(name, vec![ValueKind::Int, ValueKind::Int], ValueKind::Int);
    builder.emit_load_arg(0).emit_load_arg(1).emit_add().emit_return();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_engine::{BindingFlags, BuiltFunction, HasAttributes};

    #[test]
    fn test_catalog_registers_all_types() {
        let catalog = catalog(&CatalogConfig::default()).unwrap();
        assert_eq!(
            catalog.type_names(),
            vec![
                "ReadonlyDemo",
                "ArrowOperatorDemo",
                "PropertyInitializerDemo",
                "ReflectionDemo",
                "ObsoleteDemo",
                "DeveloperAttributeDemo",
            ]
        );
    }

    #[test]
    fn test_readonly_field_set_by_constructor() {
        let catalog = catalog(&CatalogConfig::default()).unwrap();
        let obj = catalog.instantiate("ReadonlyDemo").unwrap();
        assert!(obj.field("random").and_then(|v| v.as_int()).is_some());
    }

    #[test]
    fn test_private_demo_method() {
        let catalog = catalog(&CatalogConfig::default()).unwrap();
        let obj = catalog.instantiate("ReflectionDemo").unwrap();
        let sum = catalog
            .invoke_by_name(
                "ReflectionDemo",
                "DemoMethod1",
                BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE,
                Some(&obj),
                &[Value::Int(2), Value::Int(3)],
            )
            .unwrap();
        assert_eq!(sum, Value::Int(5));
    }

    #[test]
    fn test_developer_attribute() {
        let catalog = catalog(&CatalogConfig::default()).unwrap();
        let ty = catalog.describe("DeveloperAttributeDemo").unwrap();
        let dev = ty.get_attribute("Developer").unwrap();
        assert_eq!(dev.get("Email"), Some(&Value::from("a@a.com")));
    }

    #[test]
    fn test_adder_spec() {
        let adder = BuiltFunction::build(adder_spec("Sum")).unwrap();
        assert_eq!(adder.invoke(&[Value::Int(1), Value::Int(2)]).unwrap(), Value::Int(3));
    }
}
