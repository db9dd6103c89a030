//! `mirror types`: list the walkthrough types and their members.

use mirror_engine::{BindingFlags, EngineConfig, HasAttributes};

use crate::walkthrough;

pub fn execute(config: &EngineConfig, all: bool) -> anyhow::Result<()> {
    let catalog = walkthrough::catalog(&config.catalog)?;
    let flags = if all { BindingFlags::ALL } else { BindingFlags::DEFAULT };

    for ty in catalog.describe_all()? {
        let tags = ty.attribute_names();
        if tags.is_empty() {
            println!("{}", ty.name);
        } else {
            println!("{} [{}]", ty.name, tags.join(", "));
        }

        for ctor in ty.constructors() {
            if all || ctor.is_public() {
                println!("  {:<10} {:<11} {}", "ctor", ctor.visibility.as_str(), ctor.signature());
            }
        }
        for member in ty.members().iter().filter(|m| !m.is_constructor()) {
            if !flags.matches(member.visibility, member.is_static) {
                continue;
            }
            let modifier = if member.is_static { " static" } else { "" };
            println!(
                "  {:<10} {:<11} {}{}",
                member.kind.as_str(),
                member.visibility.as_str(),
                member.signature(),
                modifier
            );
        }
    }

    Ok(())
}
