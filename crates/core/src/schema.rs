//! Declarative schemas for model-produced JSON.
//!
//! One [`ObjectSchema`] per report section (and per list item inside it)
//! feeds three consumers: the alias/prune normalization pass, the
//! validator, and the JSON Schema sent to the model provider as the strict
//! output format.

use serde_json::{json, Map, Value};

/// Primitive or list type a field must carry.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    StringList,
    ObjectList(&'static ObjectSchema),
}

impl FieldType {
    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::StringList => "an array of strings",
            Self::ObjectList(_) => "an array of objects",
        }
    }
}

/// A required field of an object.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldSpec {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::String,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Integer,
        }
    }

    pub const fn string_list(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::StringList,
        }
    }

    pub const fn object_list(name: &'static str, item: &'static ObjectSchema) -> Self {
        Self {
            name,
            ty: FieldType::ObjectList(item),
        }
    }
}

/// Required fields of an object plus the near-miss key names that are
/// renamed onto them before validation.
#[derive(Debug)]
pub struct ObjectSchema {
    pub fields: &'static [FieldSpec],
    /// `(alias, canonical)` pairs. An alias is only applied when the
    /// canonical key is absent.
    pub aliases: &'static [(&'static str, &'static str)],
}

/// The first way a payload failed its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("expected a JSON object at `{path}`")]
    NotAnObject { path: String },

    #[error("missing required field `{path}`")]
    Missing { path: String },

    #[error("field `{path}` must be {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },
}

impl SchemaViolation {
    /// Dotted path of the offending field, e.g. `components[0].printTime`.
    pub fn path(&self) -> &str {
        match self {
            Self::NotAnObject { path } | Self::Missing { path } | Self::WrongType { path, .. } => {
                path
            }
        }
    }
}

const ROOT: &str = "$";

fn join(parent: &str, field: &str) -> String {
    if parent == ROOT {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

impl ObjectSchema {
    /// Rename aliased keys and drop keys the schema does not know,
    /// recursing into object lists. Non-object values are returned as-is so
    /// that validation reports them.
    pub fn normalize(&self, value: Value) -> Value {
        let Value::Object(mut map) = value else {
            return value;
        };

        for (alias, canonical) in self.aliases {
            if !map.contains_key(*canonical) {
                if let Some(v) = map.remove(*alias) {
                    map.insert((*canonical).to_string(), v);
                }
            }
        }

        let mut out = Map::with_capacity(self.fields.len());
        for field in self.fields {
            let Some(v) = map.remove(field.name) else {
                continue;
            };
            let v = match (field.ty, v) {
                (FieldType::ObjectList(item), Value::Array(items)) => {
                    Value::Array(items.into_iter().map(|i| item.normalize(i)).collect())
                }
                (_, v) => v,
            };
            out.insert(field.name.to_string(), v);
        }
        Value::Object(out)
    }

    /// Check every required field, in declaration order, stopping at the
    /// first violation.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, ROOT)
    }

    /// [`normalize`](Self::normalize) then [`validate`](Self::validate).
    pub fn conform(&self, value: Value) -> Result<Value, SchemaViolation> {
        let normalized = self.normalize(value);
        self.validate(&normalized)?;
        Ok(normalized)
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let map = value.as_object().ok_or_else(|| SchemaViolation::NotAnObject {
            path: path.to_string(),
        })?;

        for field in self.fields {
            let field_path = join(path, field.name);
            let v = map.get(field.name).ok_or_else(|| SchemaViolation::Missing {
                path: field_path.clone(),
            })?;
            check_type(field.ty, v, &field_path)?;
        }
        Ok(())
    }

    /// Render as a JSON Schema object with every key required and no
    /// additional properties.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields {
            properties.insert(field.name.to_string(), field_json_schema(field.ty));
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

fn check_type(ty: FieldType, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let wrong = || SchemaViolation::WrongType {
        path: path.to_string(),
        expected: ty.describe(),
    };

    match ty {
        FieldType::String if value.is_string() => Ok(()),
        FieldType::Integer if value.is_i64() || value.is_u64() => Ok(()),
        FieldType::Number if value.is_number() => Ok(()),
        FieldType::Boolean if value.is_boolean() => Ok(()),
        FieldType::StringList => {
            let items = value.as_array().ok_or_else(wrong)?;
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    return Err(SchemaViolation::WrongType {
                        path: format!("{path}[{i}]"),
                        expected: "a string",
                    });
                }
            }
            Ok(())
        }
        FieldType::ObjectList(item_schema) => {
            let items = value.as_array().ok_or_else(wrong)?;
            for (i, item) in items.iter().enumerate() {
                item_schema.validate_at(item, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        _ => Err(wrong()),
    }
}

fn field_json_schema(ty: FieldType) -> Value {
    match ty {
        FieldType::String => json!({ "type": "string" }),
        FieldType::Integer => json!({ "type": "integer" }),
        FieldType::Number => json!({ "type": "number" }),
        FieldType::Boolean => json!({ "type": "boolean" }),
        FieldType::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        FieldType::ObjectList(item) => json!({ "type": "array", "items": item.to_json_schema() }),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    static ITEM: ObjectSchema = ObjectSchema {
        fields: &[FieldSpec::string("part"), FieldSpec::integer("quantity")],
        aliases: &[("name", "part"), ("qty", "quantity")],
    };

    static ROOT_SCHEMA: ObjectSchema = ObjectSchema {
        fields: &[
            FieldSpec::string("title"),
            FieldSpec::object_list("parts", &ITEM),
            FieldSpec::string_list("tags"),
        ],
        aliases: &[("name", "title")],
    };

    fn valid() -> Value {
        json!({
            "title": "Bench PSU",
            "parts": [{ "part": "Buck converter", "quantity": 2 }],
            "tags": ["power"]
        })
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(ROOT_SCHEMA.validate(&valid()).is_ok());
    }

    #[test]
    fn reports_first_missing_top_level_key() {
        let mut payload = valid();
        payload.as_object_mut().unwrap().remove("parts");
        let err = ROOT_SCHEMA.validate(&payload).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::Missing {
                path: "parts".into()
            }
        );
        assert!(err.to_string().contains("parts"));
    }

    #[test]
    fn reports_nested_path_for_list_items() {
        let payload = json!({
            "title": "Bench PSU",
            "parts": [
                { "part": "Buck converter", "quantity": 2 },
                { "part": "Banana jack" }
            ],
            "tags": []
        });
        let err = ROOT_SCHEMA.validate(&payload).unwrap_err();
        assert_eq!(err.path(), "parts[1].quantity");
    }

    #[test]
    fn rejects_wrong_primitive_type() {
        let payload = json!({
            "title": "Bench PSU",
            "parts": [{ "part": "Buck converter", "quantity": "2" }],
            "tags": []
        });
        assert_matches!(
            ROOT_SCHEMA.validate(&payload),
            Err(SchemaViolation::WrongType { path, expected: "an integer" }) if path == "parts[0].quantity"
        );
    }

    #[test]
    fn rejects_non_string_list_entries() {
        let payload = json!({ "title": "x", "parts": [], "tags": ["ok", 3] });
        assert_eq!(ROOT_SCHEMA.validate(&payload).unwrap_err().path(), "tags[1]");
    }

    #[test]
    fn rejects_non_object_root() {
        assert_matches!(
            ROOT_SCHEMA.validate(&json!([1, 2])),
            Err(SchemaViolation::NotAnObject { .. })
        );
    }

    #[test]
    fn normalize_applies_aliases_and_prunes_unknown_keys() {
        let payload = json!({
            "name": "Bench PSU",
            "parts": [{ "name": "Buck converter", "qty": 2, "color": "red" }],
            "tags": [],
            "extra": true
        });
        let out = ROOT_SCHEMA.conform(payload).unwrap();
        assert_eq!(out["title"], "Bench PSU");
        assert_eq!(out["parts"][0]["part"], "Buck converter");
        assert_eq!(out["parts"][0]["quantity"], 2);
        assert!(out.get("extra").is_none());
        assert!(out["parts"][0].get("color").is_none());
    }

    #[test]
    fn alias_never_overrides_canonical_key() {
        let payload = json!({ "title": "Real", "name": "Alias", "parts": [], "tags": [] });
        let out = ROOT_SCHEMA.conform(payload).unwrap();
        assert_eq!(out["title"], "Real");
    }

    #[test]
    fn json_schema_is_strict() {
        let schema = ROOT_SCHEMA.to_json_schema();
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["title", "parts", "tags"]));
        assert_eq!(schema["properties"]["parts"]["items"]["additionalProperties"], false);
        assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
    }
}
