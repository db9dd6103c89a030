pub mod add;
pub mod demo;
pub mod types;
