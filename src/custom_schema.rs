//! # Custom Schema Synthesizer
//!
//! Derives a filtered, route-specific variant of a registry schema when an
//! annotation narrows or extends the base model, and names it
//! `{Method}{RouteSegments}{Base}`:
//!
//! ```text
//! GET /users/:id/comments  <Comment[]>.only(id,body)  ->  GetUsersCommentsComment
//! ```
//!
//! Derived schemas are collected in a [`CustomSchemas`] accumulator owned by
//! one generation unit and emitted into `components.schemas` afterwards.

use crate::directive::Filters;
use crate::dummy_value::{example_for_field, example_for_type, is_primitive_type};
use crate::registry::{schema_ref, SchemaRegistry, TypeSpec};
use crate::resolver::{is_dropped, top_level_relation_requested, ResolutionContext};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// A filtered copy of a base schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

/// One `append(...)` entry, resolved once so the derived schema and the
/// response example agree.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendedField {
    /// Property definition for the derived schema
    pub schema: Value,
    /// Value merged into the example payload
    pub example: Value,
}

/// Resolve `append(...)` entries into property definitions and examples.
///
/// - a primitive type name (`"number"`) becomes a property of that type with
///   a synthesized example: field dictionary for the key, else the type
///   table, else `"example <type>"`
/// - any other string is a literal string example
/// - an object is taken as a ready-made property definition
/// - other literals are examples of their own JSON type
pub fn appended_fields(append: &Map<String, Value>) -> IndexMap<String, AppendedField> {
    append
        .iter()
        .map(|(key, value)| (key.clone(), appended_field(key, value)))
        .collect()
}

fn appended_field(key: &str, value: &Value) -> AppendedField {
    match value {
        Value::String(ty) if is_primitive_type(ty) => {
            let example = [example_for_field(key), example_for_type(ty)]
                .into_iter()
                .find(|v| !v.is_null())
                .unwrap_or_else(|| json!(format!("example {ty}")));
            AppendedField {
                schema: json!({"type": ty, "example": example}),
                example,
            }
        }
        Value::String(_) => AppendedField {
            schema: json!({"type": "string", "example": value}),
            example: value.clone(),
        },
        Value::Object(definition) => {
            let example = match definition.get("example") {
                Some(example) => example.clone(),
                None => definition
                    .get("type")
                    .and_then(Value::as_str)
                    .map(example_for_type)
                    .unwrap_or(Value::Null),
            };
            AppendedField {
                schema: value.clone(),
                example,
            }
        }
        literal => AppendedField {
            schema: json!({"type": json_type(literal), "example": literal}),
            example: literal.clone(),
        },
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::String(_) => "string",
        Value::Null => "null",
    }
}

/// Derive a filtered schema from `base`.
///
/// With a non-empty `only`, properties are the intersection of `only` with
/// the base properties in base order. Otherwise the resolver's top-level drop
/// rules and relation gate apply, one level deep. Appended fields are merged
/// last. Returns `None` for an unknown base or an empty result.
pub fn synthesize(
    registry: &SchemaRegistry,
    base: &str,
    filters: &Filters,
    appended: &IndexMap<String, AppendedField>,
) -> Option<DerivedSchema> {
    let entry = registry.get(base)?;
    let top = ResolutionContext::default();
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (key, property) in &entry.properties {
        let keep = if filters.only.is_empty() {
            !is_dropped(key, filters, &top)
                && property
                    .kind()
                    .relation()
                    .map(|related| top_level_relation_requested(registry, key, related, filters))
                    .unwrap_or(true)
        } else {
            filters.only_contains(key)
        };
        if !keep {
            continue;
        }
        match serde_json::to_value(property) {
            Ok(definition) => {
                properties.insert(key.clone(), definition);
            }
            Err(err) => {
                warn!(schema = %base, property = %key, error = %err, "could not copy property definition");
                continue;
            }
        }
        if entry.is_required(key) {
            required.push(key.clone());
        }
    }

    for (key, field) in appended {
        properties.insert(key.clone(), field.schema.clone());
    }

    if properties.is_empty() {
        debug!(schema = %base, "derived schema has no properties");
        return None;
    }

    Some(DerivedSchema {
        schema_type: entry
            .schema_type
            .as_ref()
            .and_then(TypeSpec::primary)
            .unwrap_or("object")
            .to_string(),
        description: format!("Custom schema for {base}"),
        properties,
        required,
    })
}

/// `get` / `GET` -> `Get`
pub fn normalize_method(method: &str) -> String {
    let lower = method.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn is_path_parameter(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('{')
}

/// Derived schema name for a (method, route, base) triple.
///
/// Path parameters (`:id`, `{id}`) are dropped; every other segment is
/// capitalized and lower-cased independently.
pub fn derived_schema_name(method: &str, route: &str, base: &str) -> String {
    let method = normalize_method(method);
    let prefix = if method.is_empty() {
        "Unknown".to_string()
    } else {
        method
    };
    let route_name: String = route
        .split('/')
        .filter(|segment| !segment.is_empty() && !is_path_parameter(segment))
        .map(normalize_method)
        .collect();
    format!("{prefix}{route_name}{base}")
}

/// The (method, route, base) triple a derived schema belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaOrigin {
    pub method: String,
    pub route: String,
    pub base: String,
}

/// A derived schema that had to be renamed while merging accumulators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub requested: String,
    pub assigned: String,
    pub origin: SchemaOrigin,
}

/// Derived schemas collected during one generation unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomSchemas {
    entries: IndexMap<String, (SchemaOrigin, DerivedSchema)>,
}

impl CustomSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a derived schema and return the name it was stored under.
    ///
    /// The same origin replaces its previous definition. A name that clashes
    /// with a registry schema or with another origin gets a `_N` suffix.
    pub fn register(
        &mut self,
        registry: &SchemaRegistry,
        name: &str,
        origin: SchemaOrigin,
        schema: DerivedSchema,
    ) -> String {
        let assigned = self.available_name(registry, name, &origin);
        if assigned != name {
            warn!(
                requested = %name,
                assigned = %assigned,
                base = %origin.base,
                route = %origin.route,
                "derived schema name collision, renaming"
            );
        }
        self.entries.insert(assigned.clone(), (origin, schema));
        assigned
    }

    fn available_name(&self, registry: &SchemaRegistry, name: &str, origin: &SchemaOrigin) -> String {
        let free = |candidate: &str| {
            !registry.contains(candidate)
                && self
                    .entries
                    .get(candidate)
                    .map(|(existing, _)| existing == origin)
                    .unwrap_or(true)
        };
        if free(name) {
            return name.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{name}_{counter}");
            if free(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Fold another accumulator into this one.
    ///
    /// Identical definitions under the same name are deduplicated. Diverging
    /// definitions from a different origin are renamed and reported.
    pub fn merge(&mut self, registry: &SchemaRegistry, other: CustomSchemas) -> Vec<MergeConflict> {
        let mut conflicts = Vec::new();
        for (name, (origin, schema)) in other.entries {
            if let Some((_, existing)) = self.entries.get(&name) {
                if *existing == schema {
                    continue;
                }
            }
            let assigned = self.register(registry, &name, origin.clone(), schema);
            if assigned != name {
                conflicts.push(MergeConflict {
                    requested: name,
                    assigned,
                    origin,
                });
            }
        }
        conflicts
    }

    pub fn get(&self, name: &str) -> Option<&DerivedSchema> {
        self.entries.get(name).map(|(_, schema)| schema)
    }

    pub fn origin(&self, name: &str) -> Option<&SchemaOrigin> {
        self.entries.get(name).map(|(origin, _)| origin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `name -> definition`, ready for `components.schemas`.
    pub fn to_components(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(name, (_, schema))| {
                serde_json::to_value(schema)
                    .ok()
                    .map(|value| (name.clone(), value))
            })
            .collect()
    }
}

/// Point every `$ref` to `from` at `to` instead.
pub fn rename_schema_refs(value: &mut Value, from: &str, to: &str) {
    let old = schema_ref(from);
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(reference)) = obj.get_mut("$ref") {
                if *reference == old {
                    *reference = schema_ref(to);
                }
            }
            for (_, v) in obj.iter_mut() {
                rename_schema_refs(v, from, to);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                rename_schema_refs(v, from, to);
            }
        }
        _ => {}
    }
}
