//! # Schema Example Resolver
//!
//! Expands a registry schema into an example value tree under
//! include / exclude / only filters.
//!
//! ## Drop rules
//!
//! Applied to every property, in this order:
//!
//! 1. `exclude` names the key, or `parent.key` inside a relation
//! 2. `password` / `password_confirmation` unless `include` or `only` names it
//! 3. `created_at` / `updated_at` / `deleted_at` when `exclude` has `timestamps`
//! 4. `only` is non-empty and does not name the key (`parent.key` when nested)
//!
//! ## Relation gating
//!
//! - Top level: a relation to a Model schema is expanded only when `include`
//!   has `relations` or the key itself.
//! - Nested: a relation is expanded only when `include` has
//!   `parent.relations` or `parent.key`.
//! - Entering a Model schema inside a relation additionally requires one of
//!   `relations`, `parent`, `parent.relations` or `first.relations`.
//!
//! A skipped relation is reported as `None` and its key is omitted from the
//! owning object. That is different from a literal `null` example.
//!
//! ## Termination
//!
//! The visited chain is consulted before descending: a schema that already
//! appears in the chain is only entered again when `include` names that exact
//! relation path. [`GeneratorConfig::max_depth`](crate::config::GeneratorConfig)
//! is a hard ceiling on top of that.

use crate::directive::Filters;
use crate::dummy_value::example_for_leaf;
use crate::registry::SchemaRegistry;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

const PASSWORD_KEYS: [&str; 2] = ["password", "password_confirmation"];
const TIMESTAMP_KEYS: [&str; 3] = ["created_at", "updated_at", "deleted_at"];
const TIMESTAMPS_TOKEN: &str = "timestamps";
const RELATIONS_TOKEN: &str = "relations";

/// Failures while expanding a schema.
///
/// These never escape an annotation: the generator logs them and falls back to
/// an empty example.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("relation depth {depth} exceeds the limit of {max} at `{path}` ({schema})")]
    DepthExceeded {
        schema: String,
        path: String,
        depth: usize,
        max: usize,
    },
}

/// Where a recursive walk currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Dotted path of the relation being expanded; empty at the top level
    pub parent: String,
    /// Top-level relation key that started the current nested walk
    pub first: String,
    /// Schema names entered along the current chain
    pub visited: Vec<String>,
}

impl ResolutionContext {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_empty()
    }

    /// `parent.key`, or just `key` at the top level.
    pub fn path_to(&self, key: &str) -> String {
        if self.parent.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.parent)
        }
    }

    fn child(&self, key: &str, current_schema: &str) -> Self {
        let mut visited = self.visited.clone();
        visited.push(current_schema.to_string());
        ResolutionContext {
            parent: self.path_to(key),
            first: if self.parent.is_empty() {
                key.to_string()
            } else {
                self.first.clone()
            },
            visited,
        }
    }
}

/// Filter-aware example expansion over a read-only registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a SchemaRegistry,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a SchemaRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
        }
    }

    /// Resolve a schema from the top level.
    ///
    /// Unknown schemas give an empty object.
    pub fn resolve(&self, schema: &str, filters: &Filters) -> Result<Value, ResolveError> {
        let resolved = self.resolve_in(schema, filters, &ResolutionContext::default())?;
        Ok(resolved.unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Resolve a schema at an arbitrary point of a walk.
    ///
    /// `Ok(None)` means "omit the owning key".
    pub fn resolve_in(
        &self,
        schema: &str,
        filters: &Filters,
        ctx: &ResolutionContext,
    ) -> Result<Option<Value>, ResolveError> {
        let Some(entry) = self.registry.get(schema) else {
            debug!(schema = %schema, "unknown schema, using empty example");
            return Ok(Some(Value::Object(Map::new())));
        };

        if let Some(example) = &entry.example {
            return Ok(Some(example.clone()));
        }

        if !ctx.is_top_level() && entry.is_model() && !self.model_requested(filters, ctx) {
            debug!(schema = %schema, path = %ctx.parent, "model relation not requested, skipping");
            return Ok(None);
        }

        let mut props = Map::new();
        for (key, property) in &entry.properties {
            if is_dropped(key, filters, ctx) {
                continue;
            }

            let kind = property.kind();
            let value = match kind.relation() {
                None => match property.leaf_example() {
                    Some(example) => example.clone(),
                    None => match example_for_leaf(key, property.leaf_type()) {
                        Value::Null => continue,
                        synthesized => synthesized,
                    },
                },
                Some(related) => {
                    if !self.relation_requested(key, related, filters, ctx) {
                        continue;
                    }
                    let child = ctx.child(key, schema);
                    if child.visited.iter().any(|v| v == related) && !filters.includes(&child.parent) {
                        debug!(schema = %related, path = %child.parent, "cyclic relation, skipping");
                        continue;
                    }
                    if child.visited.len() > self.max_depth {
                        return Err(ResolveError::DepthExceeded {
                            schema: related.to_string(),
                            path: child.parent,
                            depth: child.visited.len(),
                            max: self.max_depth,
                        });
                    }
                    match self.resolve_in(related, filters, &child)? {
                        Some(value) => value,
                        None => continue,
                    }
                }
            };

            let value = if kind.is_array() {
                Value::Array(vec![value])
            } else {
                value
            };
            props.insert(key.clone(), value);
        }

        Ok(Some(Value::Object(props)))
    }

    fn model_requested(&self, filters: &Filters, ctx: &ResolutionContext) -> bool {
        filters.includes(RELATIONS_TOKEN)
            || filters.includes(&ctx.parent)
            || filters.includes(&format!("{}.{RELATIONS_TOKEN}", ctx.parent))
            || filters.includes(&format!("{}.{RELATIONS_TOKEN}", ctx.first))
    }

    fn relation_requested(
        &self,
        key: &str,
        related: &str,
        filters: &Filters,
        ctx: &ResolutionContext,
    ) -> bool {
        if ctx.is_top_level() {
            top_level_relation_requested(self.registry, key, related, filters)
        } else {
            filters.includes(&format!("{}.{RELATIONS_TOKEN}", ctx.parent))
                || filters.includes(&ctx.path_to(key))
        }
    }
}

/// Top-level gate: relations to Model schemas must be asked for.
pub(crate) fn top_level_relation_requested(
    registry: &SchemaRegistry,
    key: &str,
    related: &str,
    filters: &Filters,
) -> bool {
    !registry.is_model(related) || filters.includes(RELATIONS_TOKEN) || filters.includes(key)
}

/// Exclude / password / timestamp / only rules shared with the custom schema
/// synthesizer.
pub(crate) fn is_dropped(key: &str, filters: &Filters, ctx: &ResolutionContext) -> bool {
    let path = ctx.path_to(key);
    if filters.excludes(key) || (!ctx.is_top_level() && filters.excludes(&path)) {
        return true;
    }
    if PASSWORD_KEYS.contains(&key) && !filters.includes(key) && !filters.only_contains(key) {
        return true;
    }
    if TIMESTAMP_KEYS.contains(&key) && filters.excludes(TIMESTAMPS_TOKEN) {
        return true;
    }
    !filters.only.is_empty() && !filters.only_contains(&path)
}
