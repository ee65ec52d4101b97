//! Runtime type descriptors for operation parameters and return values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enum_codec::{EnumRejection, EnumType};

/// Describes the JSON shape a parameter or return value must have.
///
/// Only `Optional` and `Any` accept `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypeDescriptor {
    Any,
    Bool,
    /// A whole number that fits in `i64` or `u64`.
    Integer,
    /// Any JSON number.
    Float,
    String,
    Enum(EnumType),
    Array { items: Box<TypeDescriptor> },
    /// Object with arbitrary string keys and uniformly typed values.
    Map { values: Box<TypeDescriptor> },
    Record(RecordType),
    Optional { inner: Box<TypeDescriptor> },
}

/// A name paired with a type: an operation parameter or a record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl NamedType {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A structured value with named fields. Unknown fields are ignored on
/// decode and missing ones keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<NamedType>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<NamedType>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }
}

/// Operation reply type.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    Void,
    Value(TypeDescriptor),
}

impl ReturnType {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnType::Void)
    }
}

impl From<Option<TypeDescriptor>> for ReturnType {
    fn from(ty: Option<TypeDescriptor>) -> Self {
        ty.map(ReturnType::Value).unwrap_or(ReturnType::Void)
    }
}

/// One step into a JSON value. Paths render as `root.key[index]`, the same
/// way for decode errors and encode mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// `parent` extended by this segment. A key on an empty parent is the
    /// key alone.
    pub fn append_to(&self, parent: &str) -> String {
        match self {
            PathSegment::Key(key) if parent.is_empty() => key.clone(),
            PathSegment::Key(key) => format!("{}.{}", parent, key),
            PathSegment::Index(i) => format!("{}[{}]", parent, i),
        }
    }
}

/// A value that does not conform to a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Enum { path: String, rejection: EnumRejection },
    Type { path: String, expected: String, found: String },
}

impl TypeDescriptor {
    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn array(items: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            items: Box::new(items),
        }
    }

    pub fn map(values: TypeDescriptor) -> Self {
        TypeDescriptor::Map {
            values: Box::new(values),
        }
    }

    /// Value an argument slot holds when the payload does not mention it.
    pub fn default_value(&self) -> Value {
        match self {
            TypeDescriptor::Any | TypeDescriptor::Optional { .. } => Value::Null,
            TypeDescriptor::Bool => Value::Bool(false),
            TypeDescriptor::Integer => Value::from(0),
            TypeDescriptor::Float => Value::from(0.0),
            TypeDescriptor::String => Value::String(String::new()),
            TypeDescriptor::Enum(e) => e.default_value(),
            TypeDescriptor::Array { .. } => Value::Array(Vec::new()),
            TypeDescriptor::Map { .. } => Value::Object(Map::new()),
            TypeDescriptor::Record(r) => Value::Object(
                r.fields
                    .iter()
                    .map(|f| (f.name.clone(), f.ty.default_value()))
                    .collect(),
            ),
        }
    }

    /// Short human-readable name used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TypeDescriptor::Any => "any value".into(),
            TypeDescriptor::Bool => "a boolean".into(),
            TypeDescriptor::Integer => "an integer".into(),
            TypeDescriptor::Float => "a number".into(),
            TypeDescriptor::String => "a string".into(),
            TypeDescriptor::Enum(e) => format!("enum {}", e.name),
            TypeDescriptor::Array { items } => format!("an array of {}", items.describe()),
            TypeDescriptor::Map { values } => format!("a map of {}", values.describe()),
            TypeDescriptor::Record(r) => format!("record {}", r.name),
            TypeDescriptor::Optional { inner } => format!("{} or null", inner.describe()),
        }
    }

    /// Validate an already materialized value against this descriptor.
    ///
    /// Record fields missing from `value` are accepted; extra fields are not
    /// inspected.
    pub fn check(&self, value: &Value) -> Result<(), Mismatch> {
        self.check_at("$", value)
    }

    fn check_at(&self, path: &str, value: &Value) -> Result<(), Mismatch> {
        let ok = match (self, value) {
            (TypeDescriptor::Any, _) => true,
            (TypeDescriptor::Optional { .. }, Value::Null) => true,
            (TypeDescriptor::Optional { inner }, v) => return inner.check_at(path, v),
            (TypeDescriptor::Bool, Value::Bool(_)) => true,
            (TypeDescriptor::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (TypeDescriptor::Float, Value::Number(_)) => true,
            (TypeDescriptor::String, Value::String(_)) => true,
            (TypeDescriptor::Enum(e), v) => {
                return e.decode(v).map(|_| ()).map_err(|rejection| Mismatch::Enum {
                    path: path.to_string(),
                    rejection,
                });
            }
            (TypeDescriptor::Array { items }, Value::Array(elements)) => {
                for (i, element) in elements.iter().enumerate() {
                    items.check_at(&PathSegment::Index(i).append_to(path), element)?;
                }
                true
            }
            (TypeDescriptor::Map { values }, Value::Object(entries)) => {
                for (key, entry) in entries {
                    values.check_at(&PathSegment::Key(key.clone()).append_to(path), entry)?;
                }
                true
            }
            (TypeDescriptor::Record(record), Value::Object(entries)) => {
                for field in &record.fields {
                    if let Some(entry) = entries.get(&field.name) {
                        let child = PathSegment::Key(field.name.clone()).append_to(path);
                        field.ty.check_at(&child, entry)?;
                    }
                }
                true
            }
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(Mismatch::Type {
                path: path.to_string(),
                expected: self.describe(),
                found: json_kind(value).to_string(),
            })
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> TypeDescriptor {
        TypeDescriptor::Record(RecordType::new(
            "Address",
            vec![
                NamedType::new("city", TypeDescriptor::String),
                NamedType::new("zip", TypeDescriptor::optional(TypeDescriptor::Integer)),
            ],
        ))
    }

    #[test]
    fn test_default_values() {
        assert_eq!(TypeDescriptor::Integer.default_value(), json!(0));
        assert_eq!(TypeDescriptor::Bool.default_value(), json!(false));
        assert_eq!(TypeDescriptor::String.default_value(), json!(""));
        assert_eq!(
            TypeDescriptor::optional(TypeDescriptor::String).default_value(),
            Value::Null
        );
        assert_eq!(address().default_value(), json!({"city": "", "zip": null}));
    }

    #[test]
    fn test_check_nested_enum_reports_path() {
        let ty = TypeDescriptor::array(TypeDescriptor::Enum(EnumType::new(
            "Color",
            ["Red", "Green"],
        )));
        assert!(ty.check(&json!(["Red", "Green"])).is_ok());
        match ty.check(&json!(["Red", 1])) {
            Err(Mismatch::Enum { path, rejection }) => {
                assert_eq!(path, "$[1]");
                assert_eq!(rejection.found, "1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_path_rendering() {
        assert_eq!(PathSegment::Key("a".into()).append_to(""), "a");
        assert_eq!(PathSegment::Key("b".into()).append_to("$"), "$.b");
        assert_eq!(PathSegment::Index(2).append_to("xs"), "xs[2]");
    }

    #[test]
    fn test_check_rejects_null_for_required() {
        assert!(TypeDescriptor::String.check(&Value::Null).is_err());
        assert!(TypeDescriptor::Any.check(&Value::Null).is_ok());
    }

    #[test]
    fn test_check_integer_rejects_fraction() {
        assert!(TypeDescriptor::Integer.check(&json!(3)).is_ok());
        assert!(TypeDescriptor::Integer.check(&json!(3.5)).is_err());
        assert!(TypeDescriptor::Float.check(&json!(3)).is_ok());
    }

    #[test]
    fn test_check_record_allows_missing_fields() {
        assert!(address().check(&json!({"city": "Oslo"})).is_ok());
        match address().check(&json!({"city": "Oslo", "zip": "0150"})) {
            Err(Mismatch::Type { path, .. }) => assert_eq!(path, "$.zip"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_descriptor_json_form() {
        let ty: TypeDescriptor = serde_json::from_value(json!({
            "type": "array",
            "items": {"type": "enum", "name": "Color", "variants": ["Red"]}
        }))
        .unwrap();
        assert_eq!(
            ty,
            TypeDescriptor::array(TypeDescriptor::Enum(EnumType::new("Color", ["Red"])))
        );
    }
}
