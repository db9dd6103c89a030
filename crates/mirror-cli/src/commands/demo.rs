//! `mirror demo`: replay the reflection and emission walkthrough.

use anyhow::Context;
use mirror_engine::reflect::MemberDescriptor;
use mirror_engine::{
    BindingFlags, BuiltFunction, EngineConfig, HasAttributes, Instance, TypeCatalog, TypeDefinition,
    Value, ValueKind, Visibility,
};

use crate::walkthrough::{self, DYNAMIC_METHOD, DYNAMIC_TYPE};

fn section(title: &str) {
    println!();
    println!("== {} ==", title);
}

fn print_member(member: &MemberDescriptor) {
    println!("  {}", member.signature());
    for param in member.parameters() {
        println!("    #{} {}: {}", param.index, param.name, param.kind);
    }
}

/// Invoke through the catalog, warning about obsolete members first
fn call(
    catalog: &TypeCatalog,
    member: &MemberDescriptor,
    instance: Option<&Instance>,
    args: &[Value],
) -> anyhow::Result<Value> {
    if member.has_attribute("Obsolete") {
        tracing::warn!("'{}.{}' is obsolete", member.declaring_type, member.name);
    }
    catalog
        .invoke(member, instance, args)
        .with_context(|| format!("Failed to invoke {}.{}", member.declaring_type, member.name))
}

pub fn execute(config: &EngineConfig) -> anyhow::Result<()> {
    let catalog = walkthrough::catalog(&config.catalog)?;

    section("Default values");
    for kind in [ValueKind::Int, ValueKind::Bool, ValueKind::Object] {
        println!("  default({}) = {}", kind, kind.default_value());
    }

    section("Readonly fields and expression-bodied members");
    let readonly = catalog.instantiate("ReadonlyDemo")?;
    let readonly_ty = catalog.describe_instance(&readonly)?;
    if let Some(random) = readonly_ty.find_member("random", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE) {
        println!("  ReadonlyDemo.random = {}", catalog.get_value(random, Some(&readonly))?);
        if let Err(err) = catalog.set_value(random, Some(&readonly), Value::Int(0)) {
            println!("  {}", err);
        }
    }

    let arrow = catalog.instantiate("ArrowOperatorDemo")?;
    let arrow_ty = catalog.describe("ArrowOperatorDemo")?;
    for name in ["DemoProperty", "DemoMethod"] {
        if let Some(member) = arrow_ty.find_member(name, BindingFlags::DEFAULT) {
            println!("  {} -> {}", member.signature(), call(&catalog, member, Some(&arrow), &[])?);
        }
    }

    section("Property initializers");
    let init_ty = catalog.describe("PropertyInitializerDemo")?;
    let initializers: [&[(&str, Value)]; 3] = [
        &[("A", Value::Int(10))],
        &[("B", Value::from("Hello"))],
        &[("A", Value::Int(10)), ("B", Value::from("Hello"))],
    ];
    for assignments in initializers {
        let obj = catalog.construct(&init_ty, &[])?;
        for (name, value) in assignments {
            if let Some(prop) = init_ty.find_member(name, BindingFlags::DEFAULT) {
                catalog.set_value(prop, Some(&obj), value.clone())?;
            }
        }
        let shown = init_ty
            .properties(BindingFlags::DEFAULT)
            .into_iter()
            .map(|p| -> anyhow::Result<String> {
                Ok(format!("{} = {}", p.name, catalog.get_value(p, Some(&obj))?))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        println!("  {{ {} }}", shown.join(", "));
    }

    section("Reflection");
    let ty = catalog.describe("ReflectionDemo")?;
    let by_instance = catalog.describe_instance(&catalog.construct(&ty, &[])?)?;
    println!("  describe == describe_instance: {}", *ty == *by_instance);

    println!("  Public methods:");
    for method in ty.methods(BindingFlags::DEFAULT) {
        print_member(method);
    }
    println!("  Public fields: {}", ty.fields(BindingFlags::DEFAULT).len());

    let obj = catalog.instantiate("ReflectionDemo")?;
    if let Some(method) = ty.find_member("DemoMethod1", BindingFlags::DEFAULT) {
        call(&catalog, method, Some(&obj), &[])?;
    }

    let hidden = ty
        .find_method(
            "DemoMethod1",
            BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE,
            &[ValueKind::Int, ValueKind::Int],
        )
        .context("non-public DemoMethod1 not found")?;
    let sum = call(&catalog, hidden, Some(&obj), &[Value::Int(2), Value::Int(3)])?;
    println!("  {} with (2, 3) -> {}", hidden.signature(), sum);

    println!("  Types:");
    for name in catalog.type_names() {
        println!("    {}", name);
    }

    section("Attributes");
    let obsolete_ty = catalog.describe("ObsoleteDemo")?;
    let obsolete = catalog.instantiate("ObsoleteDemo")?;
    for method in obsolete_ty.methods(BindingFlags::DEFAULT) {
        println!("  {} [{}]", method.signature(), method.attribute_names().join(", "));
        call(&catalog, method, Some(&obsolete), &[])?;
    }

    let developer_ty = catalog.describe("DeveloperAttributeDemo")?;
    let developer = developer_ty
        .get_attribute("Developer")
        .context("DeveloperAttributeDemo has no Developer attribute")?;
    let field = |key: &str| developer.get(key).map(Value::to_string).unwrap_or_default();
    println!("  {} {}", field("Name"), field("Email"));

    section("Dynamic method");
    let built = BuiltFunction::build_with(walkthrough::adder_spec(DYNAMIC_METHOD), &config.emit)?;
    println!("{}", indent(&built.spec().listing()));
    catalog.register(TypeDefinition::new(DYNAMIC_TYPE).with_method(built.into_member(Visibility::Public)))?;

    let result = catalog.invoke_by_name(
        DYNAMIC_TYPE,
        DYNAMIC_METHOD,
        BindingFlags::PUBLIC | BindingFlags::STATIC,
        None,
        &[Value::Int(1), Value::Int(2)],
    )?;
    println!("  {}.{}(1, 2) = {}", DYNAMIC_TYPE, DYNAMIC_METHOD, result);

    Ok(())
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("  {}", l)).collect::<Vec<_>>().join("\n")
}
