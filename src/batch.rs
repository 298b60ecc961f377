//! # Batch Generation
//!
//! Resolves many route annotations at once. Annotations are grouped by
//! route; each group runs its own [`ExampleGenerator`] with its own
//! derived-schema accumulator, and the accumulators are merged afterwards.
//! A derived schema renamed during the merge has its `$ref`s rewritten in the
//! responses of the group that produced it.
//!
//! Annotation files are YAML or JSON lists:
//!
//! ```yaml
//! - method: GET
//!   route: /users/:id/comments
//!   line: "<Comment[]>.only(id,body).paginated(items,page_info)"
//! - method: DELETE
//!   route: /users/:id
//!   line: Deleted
//! ```

use crate::config::GeneratorConfig;
use crate::custom_schema::{rename_schema_refs, CustomSchemas, MergeConflict};
use crate::generator::ExampleGenerator;
use crate::registry::SchemaRegistry;
use anyhow::Context;
use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// One annotation attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAnnotation {
    #[serde(
        serialize_with = "serialize_method",
        deserialize_with = "deserialize_method"
    )]
    pub method: Method,
    pub route: String,
    pub line: String,
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

fn deserialize_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Method::from_bytes(raw.trim().to_uppercase().as_bytes()).map_err(serde::de::Error::custom)
}

/// The response generated for one [`RouteAnnotation`]
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub annotation: RouteAnnotation,
    pub response: Value,
}

/// Everything a batch run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    /// One entry per input annotation, in input order
    pub responses: Vec<RouteResponse>,
    pub custom_schemas: CustomSchemas,
    pub conflicts: Vec<MergeConflict>,
}

impl BatchOutput {
    /// JSON document with responses, derived components and conflicts.
    pub fn to_json(&self) -> Value {
        let responses: Vec<Value> = self
            .responses
            .iter()
            .map(|r| {
                json!({
                    "method": r.annotation.method.as_str(),
                    "route": r.annotation.route,
                    "line": r.annotation.line,
                    "response": r.response,
                })
            })
            .collect();
        let conflicts: Vec<Value> = self
            .conflicts
            .iter()
            .map(|c| {
                json!({
                    "requested": c.requested,
                    "assigned": c.assigned,
                    "method": c.origin.method,
                    "route": c.origin.route,
                    "base": c.origin.base,
                })
            })
            .collect();
        json!({
            "responses": responses,
            "components": {"schemas": self.custom_schemas.to_components()},
            "conflicts": conflicts,
        })
    }
}

/// Resolve every annotation, one generator per route.
pub fn generate_batch(
    registry: &SchemaRegistry,
    config: &GeneratorConfig,
    annotations: &[RouteAnnotation],
) -> BatchOutput {
    let mut groups: IndexMap<&str, Vec<(usize, &RouteAnnotation)>> = IndexMap::new();
    for (index, annotation) in annotations.iter().enumerate() {
        groups
            .entry(annotation.route.as_str())
            .or_default()
            .push((index, annotation));
    }

    let mut responses: Vec<Option<Value>> = vec![None; annotations.len()];
    let mut merged = CustomSchemas::new();
    let mut conflicts = Vec::new();

    for (route, group) in groups {
        debug!(route = %route, annotations = group.len(), "resolving route group");
        let mut generator = ExampleGenerator::with_config(registry, config.clone());
        generator.set_current_route(route);
        let mut produced = Vec::with_capacity(group.len());
        for (index, annotation) in group {
            generator.set_current_method(annotation.method.as_str());
            produced.push((index, generator.response_for(&annotation.line)));
        }

        let unit_conflicts = merged.merge(registry, generator.take_custom_schemas());
        for conflict in &unit_conflicts {
            warn!(
                requested = %conflict.requested,
                assigned = %conflict.assigned,
                route = %route,
                "derived schema renamed while merging"
            );
            for (_, response) in produced.iter_mut() {
                rename_schema_refs(response, &conflict.requested, &conflict.assigned);
            }
        }
        conflicts.extend(unit_conflicts);

        for (index, response) in produced {
            responses[index] = Some(response);
        }
    }

    info!(
        annotations = annotations.len(),
        custom_schemas = merged.len(),
        conflicts = conflicts.len(),
        "batch generation finished"
    );

    BatchOutput {
        responses: annotations
            .iter()
            .zip(responses)
            .map(|(annotation, response)| RouteResponse {
                annotation: annotation.clone(),
                response: response.unwrap_or(Value::Null),
            })
            .collect(),
        custom_schemas: merged,
        conflicts,
    }
}

/// Load route annotations from a YAML or JSON file.
pub fn load_annotations(file_path: &Path) -> anyhow::Result<Vec<RouteAnnotation>> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read annotations {}", file_path.display()))?;
    let is_yaml = file_path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false);
    let annotations = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", file_path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", file_path.display()))?
    };
    Ok(annotations)
}
