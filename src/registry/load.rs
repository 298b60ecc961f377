use super::types::{Property, SchemaEntry};
use anyhow::Context;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::path::Path;

/// Name of the built-in pagination metadata schema.
pub const PAGINATION_META: &str = "PaginationMeta";

/// Read-only lookup of schema definitions by name.
///
/// Built once per documentation run and shared by reference with the resolver
/// and the custom-schema synthesizer; nothing in the crate mutates it after
/// construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    pub fn new(schemas: IndexMap<String, SchemaEntry>) -> Self {
        Self { schemas }
    }

    /// Build a registry from a JSON value.
    ///
    /// Accepts either a bare `name -> schema` mapping or a full OpenAPI
    /// document, in which case `components.schemas` is used.
    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        let schemas = match value.pointer("/components/schemas") {
            Some(inner) => inner.clone(),
            None => value,
        };
        let schemas: IndexMap<String, SchemaEntry> =
            serde_json::from_value(schemas).context("invalid schema registry document")?;
        Ok(Self { schemas })
    }

    /// Add the built-in `PaginationMeta` schema unless one is already defined.
    pub fn with_pagination_meta(mut self) -> Self {
        if !self.schemas.contains_key(PAGINATION_META) {
            self.schemas
                .insert(PAGINATION_META.to_string(), pagination_meta_schema());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// True when `name` exists and is flagged as a persisted entity.
    pub fn is_model(&self, name: &str) -> bool {
        self.get(name).map(SchemaEntry::is_model).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

/// Load a schema registry from a YAML or JSON file.
pub fn load_registry(file_path: &Path) -> anyhow::Result<SchemaRegistry> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read schema registry {}", file_path.display()))?;
    let is_yaml = file_path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false);
    let value: Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", file_path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", file_path.display()))?
    };
    SchemaRegistry::from_value(value)
}

fn pagination_meta_schema() -> SchemaEntry {
    let fields = [
        ("total", "number", json!(100)),
        ("page", "number", json!(2)),
        ("perPage", "number", json!(10)),
        ("currentPage", "number", json!(3)),
        ("lastPage", "number", json!(10)),
        ("firstPage", "number", json!(1)),
        ("lastPageUrl", "string", json!("/?page=10")),
        ("firstPageUrl", "string", json!("/?page=1")),
        ("nextPageUrl", "string", json!("/?page=6")),
        ("previousPageUrl", "string", json!("/?page=5")),
    ];
    let properties = fields
        .into_iter()
        .map(|(name, ty, example)| {
            let mut extra = serde_json::Map::new();
            extra.insert("nullable".to_string(), Value::Bool(false));
            let property = Property {
                property_type: Some(ty.into()),
                example: Some(example),
                extra,
                ..Property::default()
            };
            (name.to_string(), property)
        })
        .collect();

    SchemaEntry {
        schema_type: Some("object".into()),
        properties,
        ..SchemaEntry::default()
    }
}
