//! Structural schema contracts
//!
//! A contract pairs a typed Rust structure with a closed JSON Schema. The JSON
//! Schema is sent to the model backend to constrain generation, and is used
//! again to validate whatever comes back before it is deserialized.

use std::fmt;
use std::marker::PhantomData;

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Contract Trait
// ─────────────────────────────────────────────────────────────────

/// A response shape the model must return for one workflow type.
pub trait SchemaContract: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Schema name sent to the backend (`[a-zA-Z0-9_-]+`).
    const NAME: &'static str;

    /// Closed JSON Schema describing the exact shape.
    fn definition() -> Value;
}

// ─────────────────────────────────────────────────────────────────
// Compiled Schema
// ─────────────────────────────────────────────────────────────────

/// A compiled, strict schema for contract `T`.
pub struct StructuralSchema<T> {
    definition: Value,
    validator: JSONSchema,
    _contract: PhantomData<fn() -> T>,
}

impl<T: SchemaContract> StructuralSchema<T> {
    /// Compile the contract's JSON Schema
    pub fn compile() -> Result<Self> {
        let definition = T::definition();
        let validator = JSONSchema::compile(&definition).map_err(|e| {
            Error::Internal(format!("Schema '{}' does not compile: {}", T::NAME, e))
        })?;

        Ok(Self {
            definition,
            validator,
            _contract: PhantomData,
        })
    }

    pub fn name(&self) -> &'static str {
        T::NAME
    }

    /// The JSON Schema sent to the backend
    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// Parse and validate raw model content into `T`.
    ///
    /// Rejects non-JSON content, missing required fields, unexpected extra
    /// fields and enumerated fields outside their declared values.
    pub fn validate(&self, content: &str) -> Result<T> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            Error::schema_violation(T::NAME, format!("content is not valid JSON: {}", e))
        })?;

        self.check(&value)?;

        serde_json::from_value(value).map_err(|e| Error::schema_violation(T::NAME, e.to_string()))
    }

    /// Check an already-parsed value against the schema.
    pub fn check(&self, value: &Value) -> Result<()> {
        if let Err(errors) = self.validator.validate(value) {
            let message = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{} (at {})", e, path)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::schema_violation(T::NAME, message));
        }
        Ok(())
    }

    /// Canonical serialization of a conforming value.
    pub fn serialize(&self, parsed: &T) -> Result<String> {
        Ok(serde_json::to_string(parsed)?)
    }
}

impl<T> fmt::Debug for StructuralSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralSchema")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────
// Schema Builders
// ─────────────────────────────────────────────────────────────────

/// Closed object: every property required, nothing else allowed.
pub(crate) fn object(properties: Vec<(&str, Value)>) -> Value {
    let required: Vec<Value> = properties.iter().map(|(k, _)| json!(k)).collect();
    let mut props = Map::new();
    for (key, schema) in properties {
        props.insert(key.to_string(), schema);
    }

    json!({
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false,
    })
}

pub(crate) fn string() -> Value {
    json!({ "type": "string" })
}

pub(crate) fn boolean() -> Value {
    json!({ "type": "boolean" })
}

pub(crate) fn enumeration(values: &[&str]) -> Value {
    json!({ "type": "string", "enum": values })
}

pub(crate) fn array(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Escape hatch every contract carries: questions back to the requester
/// instead of fabricated content.
pub(crate) fn questions() -> Value {
    array(string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_closed() {
        let schema = object(vec![("a", string()), ("b", boolean())]);
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["required"], json!(["a", "b"]));
    }

    #[test]
    fn test_enumeration_lists_values() {
        let schema = enumeration(&["Draft", "Approved"]);
        assert_eq!(schema["enum"], json!(["Draft", "Approved"]));
    }
}
