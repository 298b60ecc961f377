use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Prefix used by OpenAPI component references.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Marker substring in a schema `description` that flags a persisted entity.
pub const MODEL_MARKER: &str = "Model";

/// Strip the `#/components/schemas/` prefix from a `$ref`, if present.
pub fn ref_name(reference: &str) -> &str {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .unwrap_or(reference)
}

/// Build a `$ref` pointing at a component schema.
pub fn schema_ref(name: &str) -> String {
    format!("{SCHEMA_REF_PREFIX}{name}")
}

/// A `type` keyword: a single name, or an OpenAPI 3.1 union such as
/// `[string, "null"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Single(String),
    Union(Vec<String>),
}

impl TypeSpec {
    /// The type examples are generated for: the first non-`null` member.
    pub fn primary(&self) -> Option<&str> {
        match self {
            TypeSpec::Single(name) => Some(name.as_str()),
            TypeSpec::Union(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null")
                .or_else(|| names.first().map(String::as_str)),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::Single(name.to_string())
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// One property of a registry schema.
///
/// Only the keys the resolver understands are typed; everything else
/// (`format`, `nullable`, `enum`, ...) rides along in `extra` so a derived
/// schema can copy the definition verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<TypeSpec>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    /// `Some(Value::Null)` for an explicit `example: null`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shape of a property as far as example resolution is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind<'a> {
    /// Plain leaf value
    Scalar,
    /// Array of plain leaf values
    ArrayOfScalar,
    /// `$ref` to another schema
    SingleRelation(&'a str),
    /// `items.$ref` to another schema
    ArrayOfRelation(&'a str),
}

impl<'a> PropertyKind<'a> {
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            PropertyKind::ArrayOfScalar | PropertyKind::ArrayOfRelation(_)
        )
    }

    /// Name of the related schema, if this property is a relation.
    pub fn relation(&self) -> Option<&'a str> {
        match self {
            PropertyKind::SingleRelation(name) | PropertyKind::ArrayOfRelation(name) => Some(*name),
            _ => None,
        }
    }
}

impl Property {
    /// Classify the property once; `items.$ref` wins over a sibling `$ref`.
    pub fn kind(&self) -> PropertyKind<'_> {
        match &self.items {
            Some(items) => match items.reference.as_deref().or(self.reference.as_deref()) {
                Some(reference) => PropertyKind::ArrayOfRelation(ref_name(reference)),
                None => PropertyKind::ArrayOfScalar,
            },
            None => match self.reference.as_deref() {
                Some(reference) => PropertyKind::SingleRelation(ref_name(reference)),
                None => PropertyKind::Scalar,
            },
        }
    }

    /// The declared example for a leaf (or for the items of an array).
    pub fn leaf_example(&self) -> Option<&Value> {
        match &self.items {
            Some(items) => items.example.as_ref(),
            None => self.example.as_ref(),
        }
    }

    /// The declared type for a leaf (or for the items of an array).
    pub fn leaf_type(&self) -> Option<&str> {
        let declared = match &self.items {
            Some(items) => items.property_type.as_ref(),
            None => self.property_type.as_ref(),
        };
        declared.and_then(TypeSpec::primary)
    }
}

/// `fields` metadata consumed by the `serialized(...)` directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit: Option<Vec<String>>,
}

/// A named schema definition in the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Curated example; short-circuits resolution when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// relation name -> fields to keep (serializer schemas only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<IndexMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldSelection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaEntry {
    /// Persisted entities get stricter relation-expansion gating than DTOs.
    pub fn is_model(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| d.contains(MODEL_MARKER))
            .unwrap_or(false)
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prop(value: Value) -> Property {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_property_kind_scalar() {
        let p = prop(json!({"type": "string", "example": "x"}));
        assert_eq!(p.kind(), PropertyKind::Scalar);
        assert_eq!(p.leaf_example(), Some(&json!("x")));
    }

    #[test]
    fn test_property_kind_single_relation_strips_prefix() {
        let p = prop(json!({"$ref": "#/components/schemas/User"}));
        assert_eq!(p.kind(), PropertyKind::SingleRelation("User"));
    }

    #[test]
    fn test_property_kind_array_of_relation() {
        let p = prop(json!({"type": "array", "items": {"$ref": "Comment"}}));
        assert_eq!(p.kind(), PropertyKind::ArrayOfRelation("Comment"));
        assert!(p.kind().is_array());
    }

    #[test]
    fn test_property_kind_array_of_scalar() {
        let p = prop(json!({"type": "array", "items": {"type": "string", "example": "tag"}}));
        assert_eq!(p.kind(), PropertyKind::ArrayOfScalar);
        assert_eq!(p.leaf_example(), Some(&json!("tag")));
        assert_eq!(p.leaf_type(), Some("string"));
    }

    #[test]
    fn test_property_keeps_unknown_keys() {
        let p = prop(json!({"type": "string", "format": "uuid", "nullable": true}));
        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back, json!({"type": "string", "format": "uuid", "nullable": true}));
    }

    #[test]
    fn test_type_union_uses_first_non_null_member() {
        let p = prop(json!({"type": ["null", "integer"]}));
        assert_eq!(p.leaf_type(), Some("integer"));
        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back, json!({"type": ["null", "integer"]}));

        let only_null = prop(json!({"type": ["null"]}));
        assert_eq!(only_null.leaf_type(), Some("null"));
    }

    #[test]
    fn test_explicit_null_example_is_present() {
        let p = prop(json!({"type": "string", "example": null}));
        assert_eq!(p.leaf_example(), Some(&Value::Null));
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"type": "string", "example": null})
        );

        let missing = prop(json!({"type": "string"}));
        assert_eq!(missing.leaf_example(), None);
    }

    #[test]
    fn test_is_model() {
        let entry: SchemaEntry =
            serde_json::from_value(json!({"type": "object", "description": "User Model"})).unwrap();
        assert!(entry.is_model());
        let dto: SchemaEntry = serde_json::from_value(json!({"type": "object"})).unwrap();
        assert!(!dto.is_model());
    }
}
