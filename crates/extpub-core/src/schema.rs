//! Declarative publish-options schemas
//!
//! Each provider describes the fields an operator must fill in before a
//! document can be sent to its platform (title, tags, canonical URL, ...).
//! The schema is purely descriptive metadata consumed by an admin UI; the
//! core never interprets the values, it only checks that the schema itself
//! is well-formed at registration time.

use serde::{Deserialize, Serialize};

/// Kind of a publish-options field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form text
    String,
    /// URL-shaped text
    Url,
    /// True/false flag
    Boolean,
    /// Ordered list of strings (e.g., tags)
    StringArray,
}

/// One field in a provider's publish-options schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the key in the options object
    pub name: String,

    /// Human-readable label for the UI
    pub label: String,

    /// Field kind
    pub kind: FieldKind,

    /// Whether the operator must supply a value
    #[serde(default)]
    pub required: bool,

    /// Optional help text shown next to the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Maximum number of entries (only meaningful for `StringArray`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    /// Default value, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldSpec {
    /// Create a field with the given name, label and kind
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            help: None,
            max: None,
            default: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Limit the number of entries (for array fields)
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Set a default value
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// A provider's full publish-options schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsSchema {
    /// Ordered list of fields, in the order the UI should render them
    pub fields: Vec<FieldSpec>,
}

impl OptionsSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field to the schema
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Check that the schema is well-formed
    ///
    /// Rejects empty field names, duplicate field names, and zero-entry
    /// array limits. This is the dynamic half of the registration-time
    /// capability contract; the static half is the trait itself.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut seen = std::collections::HashSet::new();

        for field in &self.fields {
            if field.name.is_empty() {
                return Err(crate::Error::invalid_input("Schema field name cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(crate::Error::invalid_input(format!(
                    "Duplicate schema field: {}",
                    field.name
                )));
            }
            if field.max == Some(0) {
                return Err(crate::Error::invalid_input(format!(
                    "Schema field {} has a zero max",
                    field.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder_and_validate() {
        let schema = OptionsSchema::new()
            .with_field(FieldSpec::new("title", "Title", FieldKind::String).required())
            .with_field(FieldSpec::new("tags", "Tags (up to 4)", FieldKind::StringArray).with_max(4));

        assert_eq!(schema.fields.len(), 2);
        assert!(schema.validate().is_ok());
        assert!(schema.fields[0].required);
        assert_eq!(schema.fields[1].max, Some(4));
    }

    #[test]
    fn test_schema_rejects_duplicate_fields() {
        let schema = OptionsSchema::new()
            .with_field(FieldSpec::new("title", "Title", FieldKind::String))
            .with_field(FieldSpec::new("title", "Title again", FieldKind::String));

        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_schema_rejects_empty_name() {
        let schema = OptionsSchema::new().with_field(FieldSpec::new("", "Broken", FieldKind::String));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_schema_rejects_zero_max() {
        let schema =
            OptionsSchema::new().with_field(FieldSpec::new("tags", "Tags", FieldKind::StringArray).with_max(0));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_field_kind_serialization() {
        let json = serde_json::to_string(&FieldKind::StringArray).unwrap();
        assert_eq!(json, r#""string_array""#);
    }
}
