use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    Hour,
    Integer,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_required")]
    pub required: bool,
    pub labels: Vec<String>,
}

fn default_required() -> bool {
    true
}

impl FieldDescriptor {
    fn new(name: &str, field_type: FieldType, required: bool, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required,
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ColumnSchema {
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

pub const REQUIRED_FIELDS: [(&str, FieldType); 3] = [
    ("date", FieldType::Date),
    ("checkpoint", FieldType::Text),
    ("count", FieldType::Integer),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRegistry {
    pub schemas: Vec<ColumnSchema>,
}

impl HeaderRegistry {
    pub fn new(schemas: Vec<ColumnSchema>) -> Result<Self, ExtractError> {
        let registry = Self { schemas };
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ExtractError> {
        let registry: Self = serde_json::from_str(json)
            .map_err(|error| ExtractError::InvalidRegistry(error.to_string()))?;
        registry.validate()?;
        Ok(registry)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.schemas.iter().find(|schema| schema.name == name)
    }

    fn validate(&self) -> Result<(), ExtractError> {
        if self.schemas.is_empty() {
            return Err(ExtractError::InvalidRegistry(
                "registry must contain at least one schema".to_string(),
            ));
        }

        let mut schema_names = HashSet::new();
        for schema in &self.schemas {
            if !schema_names.insert(schema.name.as_str()) {
                return Err(ExtractError::InvalidRegistry(format!(
                    "duplicate schema name '{}'",
                    schema.name
                )));
            }
            validate_schema(schema)?;
        }

        Ok(())
    }
}

fn validate_schema(schema: &ColumnSchema) -> Result<(), ExtractError> {
    let invalid = |message: String| {
        ExtractError::InvalidRegistry(format!("schema '{}': {message}", schema.name))
    };

    if schema.is_empty() {
        return Err(invalid("has no fields".to_string()));
    }

    let mut field_names = HashSet::new();
    for field in &schema.fields {
        if !field_names.insert(field.name.as_str()) {
            return Err(invalid(format!("duplicate field '{}'", field.name)));
        }
        if field.labels.iter().all(|label| label.trim().is_empty()) {
            return Err(invalid(format!("field '{}' has no header labels", field.name)));
        }
    }

    for (name, field_type) in REQUIRED_FIELDS {
        match schema.field(name) {
            Some(field) if field.field_type == field_type && field.required => {}
            Some(_) => {
                return Err(invalid(format!(
                    "field '{name}' must be a required {field_type:?} field"
                )));
            }
            None => return Err(invalid(format!("missing required field '{name}'"))),
        }
    }

    Ok(())
}

impl Default for HeaderRegistry {
    fn default() -> Self {
        use FieldType::{Date, Hour, Integer, Text};

        Self {
            schemas: vec![
                ColumnSchema {
                    name: "tsa-throughput-v1".to_string(),
                    fields: vec![
                        FieldDescriptor::new("date", Date, true, &["date"]),
                        FieldDescriptor::new("hour", Hour, false, &["hour", "hour of day"]),
                        FieldDescriptor::new(
                            "airport",
                            Text,
                            false,
                            &["airport", "airport code"],
                        ),
                        FieldDescriptor::new(
                            "airport_name",
                            Text,
                            false,
                            &["airport name", "name"],
                        ),
                        FieldDescriptor::new("city", Text, false, &["city"]),
                        FieldDescriptor::new("state", Text, false, &["state"]),
                        FieldDescriptor::new("checkpoint", Text, true, &["checkpoint"]),
                        FieldDescriptor::new(
                            "count",
                            Integer,
                            true,
                            &["total throughput", "throughput", "total"],
                        ),
                    ],
                },
                ColumnSchema {
                    name: "tsa-throughput-compact".to_string(),
                    fields: vec![
                        FieldDescriptor::new("date", Date, true, &["date"]),
                        FieldDescriptor::new("hour", Hour, false, &["hour", "hour of day"]),
                        FieldDescriptor::new("checkpoint", Text, true, &["checkpoint"]),
                        FieldDescriptor::new(
                            "count",
                            Integer,
                            true,
                            &["throughput", "total throughput", "count"],
                        ),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HeaderRegistry;
    use crate::error::ExtractError;

    #[test]
    fn default_registry_is_valid() {
        let registry = HeaderRegistry::default();
        HeaderRegistry::new(registry.schemas.clone()).expect("default registry validates");
        assert!(registry.get("tsa-throughput-v1").is_some());
        assert_eq!(registry.get("tsa-throughput-v1").map(|s| s.len()), Some(8));
    }

    #[test]
    fn loads_registry_from_json() {
        let json = r#"{
            "schemas": [{
                "name": "custom",
                "fields": [
                    {"name": "checkpoint", "type": "text", "labels": ["Lane"]},
                    {"name": "date", "type": "date", "labels": ["Day"]},
                    {"name": "count", "type": "integer", "labels": ["Travelers"]},
                    {"name": "note", "type": "text", "required": false, "labels": ["Note"]}
                ]
            }]
        }"#;
        let registry = HeaderRegistry::from_json_str(json).expect("registry should load");
        let schema = registry.get("custom").expect("custom schema");
        assert_eq!(schema.len(), 4);
        assert!(schema.fields[0].required);
        assert!(!schema.fields[3].required);
    }

    #[test]
    fn rejects_schema_without_count() {
        let json = r#"{
            "schemas": [{
                "name": "broken",
                "fields": [
                    {"name": "date", "type": "date", "labels": ["Date"]},
                    {"name": "checkpoint", "type": "text", "labels": ["Checkpoint"]}
                ]
            }]
        }"#;
        let err = HeaderRegistry::from_json_str(json).expect_err("count is mandatory");
        assert!(matches!(err, ExtractError::InvalidRegistry(message) if message.contains("'count'")));
    }

    #[test]
    fn rejects_optional_required_field_and_empty_registry() {
        let json = r#"{
            "schemas": [{
                "name": "loose",
                "fields": [
                    {"name": "date", "type": "date", "labels": ["Date"]},
                    {"name": "checkpoint", "type": "text", "required": false, "labels": ["Checkpoint"]},
                    {"name": "count", "type": "integer", "labels": ["Count"]}
                ]
            }]
        }"#;
        assert!(HeaderRegistry::from_json_str(json).is_err());
        assert!(HeaderRegistry::from_json_str(r#"{"schemas": []}"#).is_err());
    }
}
