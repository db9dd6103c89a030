//! Type Catalog Integration Tests
//!
//! Exercises the catalog through the public API only:
//! - Registration and description
//! - Member lookup with binding flags
//! - Invocation of methods, fields and properties
//! - Construction and attributes
//! - Concurrent describe
//!
//! # Running Tests
//! ```bash
//! cargo test --test catalog_tests
//! ```

use mirror_engine::reflect::{
    ConstructorDefinition, FieldDefinition, MethodDefinition, PropertyDefinition,
};
use mirror_engine::{
    AttributeInstance, BindingFlags, CatalogConfig, HasAttributes, Instance, ReflectError, TypeCatalog,
    TypeDefinition, Value, ValueKind,
};
use std::sync::Arc;
use std::thread;

fn reflection_demo() -> TypeDefinition {
    TypeDefinition::new("ReflectionDemo")
        .with_property(PropertyDefinition::auto("DemoProperty", ValueKind::String))
        .with_field(FieldDefinition::new("demoField", ValueKind::Int).private())
        .with_method(MethodDefinition::new("DemoMethod1", ValueKind::String, |_, _| {
            Ok(Value::from("Demo Method 1"))
        }))
        .with_method(
            MethodDefinition::new("DemoMethod1", ValueKind::Int, |_, args| {
                match (&args[0], &args[1]) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                    _ => Err("expected two ints".into()),
                }
            })
            .param("a", ValueKind::Int)
            .param("b", ValueKind::Int)
            .private(),
        )
        .with_method(
            MethodDefinition::new("Greet", ValueKind::String, |obj, args| {
                let name = obj
                    .and_then(|o| o.field("<DemoProperty>k__BackingField"))
                    .unwrap_or(Value::Null);
                Ok(Value::from(format!("{}, {}", args[0], name)))
            })
            .param("greeting", ValueKind::String),
        )
}

fn developer_demo() -> TypeDefinition {
    TypeDefinition::new("DeveloperAttributeDemo")
        .with_attribute(
            AttributeInstance::new("Developer")
                .with("Name", "A")
                .with("Email", "a@a.com"),
        )
        .with_method(
            MethodDefinition::new("Work", ValueKind::Void, |_, _| Ok(Value::Null))
                .attribute(AttributeInstance::new("Developer").with("Name", "B")),
        )
}

fn catalog() -> TypeCatalog {
    let catalog = TypeCatalog::new();
    catalog.register(reflection_demo()).unwrap();
    catalog.register(developer_demo()).unwrap();
    catalog
}

mod describe {
    use super::*;

    #[test]
    fn test_describe_is_idempotent() {
        let catalog = catalog();
        let first = catalog.describe("ReflectionDemo").unwrap();
        let second = catalog.describe("ReflectionDemo").unwrap();

        assert_eq!(*first, *second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_describe_unknown() {
        let catalog = catalog();
        assert!(matches!(
            catalog.describe("MissingType"),
            Err(ReflectError::UnknownType(_))
        ));
    }

    #[test]
    fn test_describe_instance_matches_describe() {
        let catalog = catalog();
        let obj = catalog.instantiate("ReflectionDemo").unwrap();
        let by_instance = catalog.describe_instance(&obj).unwrap();
        let by_name = catalog.describe("ReflectionDemo").unwrap();
        assert!(Arc::ptr_eq(&by_instance, &by_name));
    }

    #[test]
    fn test_member_enumeration_in_declaration_order() {
        let catalog = catalog();
        let ty = catalog.describe("ReflectionDemo").unwrap();

        let all: Vec<_> = ty.methods(BindingFlags::ALL).iter().map(|m| m.signature()).collect();
        assert_eq!(
            all,
            vec![
                "string DemoMethod1()",
                "int DemoMethod1(int a, int b)",
                "string Greet(string greeting)",
            ]
        );
        assert_eq!(ty.methods(BindingFlags::DEFAULT).len(), 2);
        assert_eq!(ty.fields(BindingFlags::ALL).len(), 1);
        assert_eq!(ty.properties(BindingFlags::DEFAULT).len(), 1);
        assert!(ty.constructors().is_empty());
    }

    #[test]
    fn test_concurrent_describe_converges() {
        let catalog = Arc::new(catalog());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || catalog.describe("ReflectionDemo").unwrap())
            })
            .collect();

        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = catalog.describe("ReflectionDemo").unwrap();
        for descriptor in &descriptors {
            assert_eq!(**descriptor, *cached);
        }
    }

    fn wide_type(name: &str, fields: usize) -> TypeDefinition {
        (0..fields).fold(TypeDefinition::new(name), |ty, i| {
            ty.with_field(FieldDefinition::new(format!("f{}", i), ValueKind::Int))
        })
    }

    #[test]
    fn test_reregister_during_describe_never_caches_old_definition() {
        let catalog = Arc::new(TypeCatalog::new());
        for _ in 0..100 {
            catalog.register(wide_type("Wide", 500)).unwrap();

            let reader = {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || catalog.describe("Wide").unwrap())
            };
            let writer = {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || catalog.register(wide_type("Wide", 1)).unwrap())
            };
            reader.join().unwrap();
            writer.join().unwrap();

            assert_eq!(catalog.describe("Wide").unwrap().members().len(), 1);
        }
    }

    #[test]
    fn test_nan_initial_value_describes_equal() {
        let catalog = TypeCatalog::new();
        catalog
            .register(
                TypeDefinition::new("Measure")
                    .with_field(FieldDefinition::new("reading", ValueKind::Float).initial_value(f64::NAN)),
            )
            .unwrap();

        let first = catalog.describe("Measure").unwrap();
        let second = catalog.describe("Measure").unwrap();
        assert_eq!(*first, *second);

        let uncached = TypeCatalog::with_config(CatalogConfig { cache_descriptors: false });
        uncached
            .register(
                TypeDefinition::new("Measure")
                    .with_field(FieldDefinition::new("reading", ValueKind::Float).initial_value(f64::NAN)),
            )
            .unwrap();
        assert_eq!(*uncached.describe("Measure").unwrap(), *uncached.describe("Measure").unwrap());
    }
}

mod lookup {
    use super::*;

    #[test]
    fn test_find_member_missing_name() {
        let catalog = catalog();
        let ty = catalog.describe("ReflectionDemo").unwrap();

        assert!(ty.find_member("NoSuchMember", BindingFlags::DEFAULT).is_none());
        assert!(ty
            .find_member("NoSuchMember", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .is_none());
    }

    #[test]
    fn test_private_members_need_non_public_flag() {
        let catalog = catalog();
        let ty = catalog.describe("ReflectionDemo").unwrap();

        assert!(ty.find_member("demoField", BindingFlags::DEFAULT).is_none());
        let field = ty
            .find_member("demoField", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .unwrap();
        assert!(!field.is_public());
        assert!(field.is_field());
    }

    #[test]
    fn test_invoke_by_name_resolves_overloads() {
        let catalog = catalog();
        let obj = catalog.instantiate("ReflectionDemo").unwrap();

        let text = catalog
            .invoke_by_name("ReflectionDemo", "DemoMethod1", BindingFlags::ALL, Some(&obj), &[])
            .unwrap();
        assert_eq!(text, Value::from("Demo Method 1"));

        let sum = catalog
            .invoke_by_name(
                "ReflectionDemo",
                "DemoMethod1",
                BindingFlags::ALL,
                Some(&obj),
                &[Value::Int(5), Value::Int(6)],
            )
            .unwrap();
        assert_eq!(sum, Value::Int(11));

        assert!(matches!(
            catalog.invoke_by_name("ReflectionDemo", "Nope", BindingFlags::ALL, Some(&obj), &[]),
            Err(ReflectError::MemberNotFound { .. })
        ));
    }
}

mod invoke {
    use super::*;

    #[test]
    fn test_missing_instance() {
        let catalog = catalog();
        let ty = catalog.describe("ReflectionDemo").unwrap();
        let method = ty.find_member("DemoMethod1", BindingFlags::DEFAULT).unwrap();

        assert!(matches!(
            catalog.invoke(method, None, &[]),
            Err(ReflectError::MissingInstance(name)) if name == "DemoMethod1"
        ));
    }

    #[test]
    fn test_instance_state_flows_into_methods() {
        let catalog = catalog();
        let ty = catalog.describe("ReflectionDemo").unwrap();
        let obj = catalog.construct(&ty, &[]).unwrap();

        let prop = ty.find_member("DemoProperty", BindingFlags::DEFAULT).unwrap();
        catalog.set_value(prop, Some(&obj), Value::from("World")).unwrap();

        let greet = ty.find_member("Greet", BindingFlags::DEFAULT).unwrap();
        let out = catalog.invoke(greet, Some(&obj), &[Value::from("Hello")]).unwrap();
        assert_eq!(out, Value::from("Hello, World"));
    }

    #[test]
    fn test_errors_leave_catalog_usable() {
        let catalog = catalog();
        let ty = catalog.describe("ReflectionDemo").unwrap();
        let obj = catalog.construct(&ty, &[]).unwrap();
        let adder = ty
            .find_method("DemoMethod1", BindingFlags::ALL, &[ValueKind::Int, ValueKind::Int])
            .unwrap();

        assert!(catalog.invoke(adder, Some(&obj), &[Value::Int(1)]).is_err());
        assert!(catalog.invoke(adder, Some(&obj), &[Value::Int(1), Value::Bool(true)]).is_err());
        assert_eq!(
            catalog.invoke(adder, Some(&obj), &[Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_static_method_ignores_instance() {
        let catalog = TypeCatalog::new();
        catalog
            .register(TypeDefinition::new("MathDemo").with_static_method(
                MethodDefinition::new("Twice", ValueKind::Int, |_, args| {
                    Ok(Value::Int(args[0].as_int().unwrap_or_default() * 2))
                })
                .param("x", ValueKind::Int),
            ))
            .unwrap();
        let ty = catalog.describe("MathDemo").unwrap();
        let twice = ty.find_member("Twice", BindingFlags::STATIC | BindingFlags::PUBLIC).unwrap();

        assert_eq!(catalog.invoke(twice, None, &[Value::Int(21)]).unwrap(), Value::Int(42));
        let unrelated = Instance::new("Other", []);
        assert_eq!(
            catalog.invoke(twice, Some(&unrelated), &[Value::Int(1)]).unwrap(),
            Value::Int(2)
        );
    }
}

mod construct {
    use super::*;

    #[test]
    fn test_property_initializers() {
        let catalog = TypeCatalog::new();
        catalog
            .register(
                TypeDefinition::new("PropertyInitializerDemo")
                    .with_property(PropertyDefinition::auto("Number", ValueKind::Int))
                    .with_constructor(
                        ConstructorDefinition::new(|obj, args| {
                            obj.set_field("<Number>k__BackingField", args[0].clone());
                            Ok(())
                        })
                        .param("number", ValueKind::Int),
                    ),
            )
            .unwrap();
        let ty = catalog.describe("PropertyInitializerDemo").unwrap();

        let obj = catalog.construct(&ty, &[Value::Int(7)]).unwrap();
        let prop = ty.find_member("Number", BindingFlags::DEFAULT).unwrap();
        assert_eq!(catalog.get_value(prop, Some(&obj)).unwrap(), Value::Int(7));

        assert!(matches!(
            catalog.construct(&ty, &[]),
            Err(ReflectError::NoMatchingConstructor { args, .. }) if args.is_empty()
        ));
        assert!(matches!(
            catalog.construct(&ty, &[Value::Int(1), Value::from("x")]),
            Err(ReflectError::NoMatchingConstructor { args, .. }) if args == "int, string"
        ));
    }

    #[test]
    fn test_failing_constructor() {
        let catalog = TypeCatalog::new();
        catalog
            .register(
                TypeDefinition::new("Fragile")
                    .with_constructor(ConstructorDefinition::new(|_, _| Err("not today".into()))),
            )
            .unwrap();

        match catalog.instantiate("Fragile") {
            Err(ReflectError::InvocationFailed { member, cause }) => {
                assert_eq!(member, "Fragile..ctor");
                assert_eq!(cause.to_string(), "not today");
            }
            other => panic!("unexpected result: {:?}", other.map(|o| o.type_name().to_string())),
        }
    }
}

mod attributes {
    use super::*;

    #[test]
    fn test_developer_attribute_round_trip() {
        let catalog = catalog();
        let ty = catalog.describe("DeveloperAttributeDemo").unwrap();
        let dev = ty.get_attribute("Developer").unwrap();

        assert_eq!(dev.name, "Developer");
        assert_eq!(
            dev.fields(),
            &[
                ("Name".to_string(), Value::from("A")),
                ("Email".to_string(), Value::from("a@a.com")),
            ]
        );
    }

    #[test]
    fn test_member_attributes_are_separate() {
        let catalog = catalog();
        let ty = catalog.describe("DeveloperAttributeDemo").unwrap();
        let work = ty.find_member("Work", BindingFlags::DEFAULT).unwrap();

        let dev = work.get_attribute("Developer").unwrap();
        assert_eq!(dev.get("Name"), Some(&Value::from("B")));
        assert_eq!(dev.get("Email"), None);
        assert!(work.get_attribute("developer").is_none());
    }
}
