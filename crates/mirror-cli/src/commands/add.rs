//! `mirror add`: build the adder and run it once.

use mirror_engine::{BuiltFunction, EngineConfig, Value};

use crate::walkthrough;

pub fn execute(config: &EngineConfig, a: i64, b: i64) -> anyhow::Result<()> {
    let adder = BuiltFunction::build_with(walkthrough::adder_spec("Add"), &config.emit)?;
    let sum = adder.invoke(&[Value::Int(a), Value::Int(b)])?;
    println!("{}", sum);
    Ok(())
}
