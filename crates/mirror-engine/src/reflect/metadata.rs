//! Attribute records attached to types and members
//!
//! An attribute is a tag name plus ordered key/value pairs, e.g.
//! `Developer { Name = "A", Email = "a@a.com" }`. Records are immutable once
//! attached; lookups are exact-match on the tag name.

use crate::value::Value;

/// A single attached attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInstance {
    /// Tag name
    pub name: String,
    /// Key/value payload in declaration order
    fields: Vec<(String, Value)>,
}

impl AttributeInstance {
    /// Create an attribute with no payload (a marker like `Obsolete`)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a key/value pair. Setting an existing key replaces its value in place.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Look up a payload value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// All key/value pairs in declaration order
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Payload keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

/// Anything that carries attached attributes
pub trait HasAttributes {
    /// All attached attributes in attachment order
    fn attributes(&self) -> &[AttributeInstance];

    /// Exact-match lookup by tag name
    fn get_attribute(&self, name: &str) -> Option<&AttributeInstance> {
        self.attributes().iter().find(|a| a.name == name)
    }

    /// Check if a tag is attached
    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Names of all attached tags
    fn attribute_names(&self) -> Vec<&str> {
        self.attributes().iter().map(|a| a.name.as_str()).collect()
    }
}
