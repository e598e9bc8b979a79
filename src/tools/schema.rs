//! Input schemas for tool definitions
//!
//! A schema is a flat list of named fields. It renders to JSON schema for the
//! LLM and validates incoming arguments, filling defaults for missing
//! optional fields.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ToolError;

/// Type of a single input field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    String,
    /// A string restricted to a closed set of values
    Enum { values: &'static [&'static str] },
}

/// One named field of a tool's input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Declared input shape of a tool
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON schema object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = match &field.kind {
                FieldKind::String => json!({ "type": "string" }),
                FieldKind::Enum { values } => json!({ "type": "string", "enum": values }),
            };
            prop["description"] = Value::String(field.description.clone());
            if let Some(default) = &field.default {
                prop["default"] = default.clone();
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(field.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Check `input` against the schema and return the normalized arguments.
    ///
    /// `null` counts as an empty object. Missing or `null` optional fields
    /// take their default; unknown keys are dropped.
    pub fn validate(&self, input: Value) -> Result<Value, ToolError> {
        let mut given = match input {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::validation(format!(
                    "expected an object, got {}",
                    json_type(&other)
                )))
            }
        };

        let mut normalized = Map::new();
        for field in &self.fields {
            match given.remove(&field.name) {
                Some(Value::Null) | None => {
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.clone(), default.clone());
                    } else if field.required {
                        return Err(ToolError::validation(format!(
                            "missing required field `{}`",
                            field.name
                        )));
                    }
                }
                Some(value) => {
                    check_kind(field, &value)?;
                    normalized.insert(field.name.clone(), value);
                }
            }
        }

        if !given.is_empty() {
            let ignored: Vec<&String> = given.keys().collect();
            debug!(?ignored, "Ignoring unknown tool input fields");
        }

        Ok(Value::Object(normalized))
    }
}

fn check_kind(field: &FieldSpec, value: &Value) -> Result<(), ToolError> {
    let ok = match &field.kind {
        FieldKind::String => value.is_string(),
        FieldKind::Enum { values } => {
            let Some(s) = value.as_str() else {
                return Err(ToolError::validation(format!(
                    "field `{}` must be a string, got {}",
                    field.name,
                    json_type(value)
                )));
            };
            if !values.contains(&s) {
                return Err(ToolError::validation(format!(
                    "field `{}` must be one of [{}], got \"{}\"",
                    field.name,
                    values.join(", "),
                    s
                )));
            }
            true
        }
    };

    if ok {
        Ok(())
    } else {
        Err(ToolError::validation(format!(
            "field `{}` has wrong type {}",
            field.name,
            json_type(value)
        )))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build an input schema
pub fn object_schema() -> SchemaBuilder {
    SchemaBuilder::default()
}

/// Schema builder for tool definitions
#[derive(Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    /// Add a required string field
    pub fn required_string(self, name: &str, description: &str) -> Self {
        self.field(name, FieldKind::String, description, true, None)
    }

    /// Add an optional enum field with a default value
    pub fn enum_with_default(
        self,
        name: &str,
        values: &'static [&'static str],
        default: &'static str,
        description: &str,
    ) -> Self {
        debug_assert!(values.contains(&default), "default must be a member");
        self.field(
            name,
            FieldKind::Enum { values },
            description,
            false,
            Some(Value::String(default.to_string())),
        )
    }

    fn field(
        mut self,
        name: &str,
        kind: FieldKind,
        description: &str,
        required: bool,
        default: Option<Value>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required,
            default,
        });
        self
    }

    /// Build the final schema
    pub fn build(self) -> InputSchema {
        InputSchema {
            fields: self.fields,
        }
    }
}
