//! # Response Generator
//!
//! Front end that turns annotation lines into OpenAPI response content
//! fragments.
//!
//! ## Output shapes
//!
//! ```text
//! "Just text"                      -> {content: {text/plain: {example}}}
//! "<User>"                         -> {content: {<media>: {schema: {$ref}, example: {...}}}}
//! "<User[]>"                       -> schema {type: array, items: {$ref}}, example [{...}]
//! "<User[]>.paginated(items,info)" -> schema {type: object, properties: {items, info}},
//!                                     example {items: [{...}], info: {...}}
//! ```
//!
//! When an annotation carries filters and a route is set, the schema points
//! at a derived schema recorded in the generator's [`CustomSchemas`]
//! accumulator instead of the base schema.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = load_registry(Path::new("schemas.yaml"))?.with_pagination_meta();
//! let mut generator = ExampleGenerator::new(&registry);
//! generator.set_current_route("/users/:id/comments");
//! generator.set_current_method("get");
//! let response = generator.response_for("<Comment[]>.only(id,body).paginated()");
//! let components = generator.take_custom_schemas().to_components();
//! ```

use crate::config::GeneratorConfig;
use crate::custom_schema::{
    appended_fields, derived_schema_name, normalize_method, synthesize, AppendedField,
    CustomSchemas, SchemaOrigin,
};
use crate::directive::{parse_annotation, Annotation, Directive, Filters};
use crate::registry::{schema_ref, SchemaRegistry};
use crate::resolver::Resolver;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::mem;
use tracing::{debug, warn};

const TEXT_PLAIN: &str = "text/plain";

/// Resolves annotation lines against a read-only registry.
///
/// Route and method are ambient context for naming derived schemas; set them
/// before each [`response_for`](Self::response_for) call.
#[derive(Debug)]
pub struct ExampleGenerator<'a> {
    registry: &'a SchemaRegistry,
    config: GeneratorConfig,
    current_route: Option<String>,
    current_method: Option<String>,
    custom_schemas: CustomSchemas,
}

impl<'a> ExampleGenerator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self::with_config(registry, GeneratorConfig::default())
    }

    pub fn with_config(registry: &'a SchemaRegistry, config: GeneratorConfig) -> Self {
        Self {
            registry,
            config,
            current_route: None,
            current_method: None,
            custom_schemas: CustomSchemas::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Route used for derived schema names; empty clears it.
    pub fn set_current_route(&mut self, route: impl Into<String>) {
        let route = route.into();
        self.current_route = if route.trim().is_empty() {
            None
        } else {
            Some(route)
        };
    }

    /// HTTP verb used for derived schema names, stored as `Get` / `Post` / ...
    pub fn set_current_method(&mut self, method: &str) {
        let method = normalize_method(method);
        self.current_method = if method.is_empty() { None } else { Some(method) };
    }

    pub fn current_route(&self) -> Option<&str> {
        self.current_route.as_deref()
    }

    pub fn current_method(&self) -> Option<&str> {
        self.current_method.as_deref()
    }

    /// Derived schemas recorded so far.
    pub fn custom_schemas(&self) -> &CustomSchemas {
        &self.custom_schemas
    }

    /// Hand over the accumulator and start a fresh one.
    pub fn take_custom_schemas(&mut self) -> CustomSchemas {
        mem::take(&mut self.custom_schemas)
    }

    /// Full response content fragment for one annotation line.
    pub fn response_for(&mut self, line: &str) -> Value {
        let directive = match parse_annotation(line) {
            Annotation::Text(text) => {
                let mut media = Map::new();
                media.insert(TEXT_PLAIN.to_string(), json!({"example": text}));
                return json!({"content": media});
            }
            Annotation::Schema(directive) => directive,
        };

        let filters = self.effective_filters(&directive);
        let appended = appended_fields(&directive.append.fields);
        let example = self.shaped_example(&directive, &filters, &appended);
        let schema_name = self.schema_name_for(&directive, &filters, &appended);
        let schema = self.response_schema(&directive, &schema_name);

        let mut media = Map::new();
        media.insert(
            self.config.media_type.clone(),
            json!({"schema": schema, "example": example}),
        );
        json!({"content": media})
    }

    /// Example payload only. Plain-text lines come back as strings and no
    /// derived schemas are recorded.
    pub fn example_for(&self, line: &str) -> Value {
        match parse_annotation(line) {
            Annotation::Text(text) => Value::String(text),
            Annotation::Schema(directive) => {
                let filters = self.effective_filters(&directive);
                let appended = appended_fields(&directive.append.fields);
                self.shaped_example(&directive, &filters, &appended)
            }
        }
    }

    /// Replace every string leaf of a JSON template with its example.
    ///
    /// Array elements that resolve to arrays are spliced into the parent
    /// array, one level deep.
    pub fn resolve_json_refs(&self, template: &Value) -> Value {
        match template {
            Value::String(line) => self.example_for(line),
            Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(key, value)| (key.clone(), self.resolve_json_refs(value)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .flat_map(|item| match self.resolve_json_refs(item) {
                        Value::Array(inner) => inner,
                        other => vec![other],
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Serializer metadata replaces the inline filters when the serializer
    /// is known.
    fn effective_filters(&self, directive: &Directive) -> Filters {
        let Some(name) = &directive.serializer else {
            return directive.filters.clone();
        };
        match self.registry.get(name) {
            Some(serializer) => Filters::from_serializer(serializer),
            None => {
                warn!(serializer = %name, schema = %directive.reference, "unknown serializer, keeping inline filters");
                directive.filters.clone()
            }
        }
    }

    /// Top-level resolution boundary: failures are logged and give `{}`.
    fn resolve_or_empty(&self, schema: &str, filters: &Filters) -> Value {
        let resolver = Resolver::new(self.registry, self.config.max_depth);
        match resolver.resolve(schema, filters) {
            Ok(example) => example,
            Err(err) => {
                warn!(schema = %schema, error = %err, "example resolution failed, using empty example");
                Value::Object(Map::new())
            }
        }
    }

    fn base_example(
        &self,
        directive: &Directive,
        filters: &Filters,
        appended: &IndexMap<String, AppendedField>,
    ) -> Value {
        let mut example = self.resolve_or_empty(&directive.reference, filters);
        if appended.is_empty() {
            return example;
        }
        match &mut example {
            Value::Object(obj) => {
                for (key, field) in appended {
                    obj.insert(key.clone(), field.example.clone());
                }
            }
            _ => {
                debug!(schema = %directive.reference, "curated example is not an object, append ignored");
            }
        }
        example
    }

    fn shaped_example(
        &self,
        directive: &Directive,
        filters: &Filters,
        appended: &IndexMap<String, AppendedField>,
    ) -> Value {
        let example = self.base_example(directive, filters, appended);
        if !directive.is_array {
            return example;
        }
        if !directive.paginated {
            return Value::Array(vec![example]);
        }
        let mut envelope = Map::new();
        envelope.insert(directive.pagination.data.clone(), Value::Array(vec![example]));
        envelope.insert(
            directive.pagination.meta.clone(),
            self.resolve_or_empty(&self.config.pagination_schema, &Filters::default()),
        );
        Value::Object(envelope)
    }

    /// Base name, or the derived name when filters apply within a route.
    fn schema_name_for(
        &mut self,
        directive: &Directive,
        filters: &Filters,
        appended: &IndexMap<String, AppendedField>,
    ) -> String {
        let base = &directive.reference;
        if !directive.has_filters() {
            return base.clone();
        }
        let Some(route) = self.current_route.clone() else {
            return base.clone();
        };
        let method = self.current_method.clone().unwrap_or_default();
        let name = derived_schema_name(&method, &route, base);

        match synthesize(self.registry, base, filters, appended) {
            Some(schema) => {
                let origin = SchemaOrigin {
                    method,
                    route,
                    base: base.clone(),
                };
                let assigned = self.custom_schemas.register(self.registry, &name, origin, schema);
                debug!(schema = %base, derived = %assigned, "recorded derived schema");
                assigned
            }
            None => {
                debug!(schema = %base, derived = %name, "nothing to derive, referencing base schema");
                base.clone()
            }
        }
    }

    fn response_schema(&self, directive: &Directive, schema_name: &str) -> Value {
        let item = json!({"$ref": schema_ref(schema_name)});
        if !directive.is_array {
            return item;
        }
        let array = json!({"type": "array", "items": item});
        if !directive.paginated {
            return array;
        }
        let mut properties = Map::new();
        properties.insert(directive.pagination.data.clone(), array);
        properties.insert(
            directive.pagination.meta.clone(),
            json!({"$ref": schema_ref(&self.config.pagination_schema)}),
        );
        json!({"type": "object", "properties": properties})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_value(json!({
            "User": {
                "type": "object",
                "description": "User Model",
                "properties": {
                    "id": {"type": "integer", "example": 1},
                    "name": {"type": "string", "example": "Jane"},
                    "password": {"type": "string", "example": "secret"}
                }
            },
            "UserSerializer": {
                "type": "object",
                "fields": {"pick": ["id"]}
            },
            "Token": {"type": "string", "example": "abc123"}
        }))
        .unwrap()
        .with_pagination_meta()
    }

    #[test]
    fn test_plain_text_response() {
        let registry = registry();
        let mut generator = ExampleGenerator::new(&registry);
        assert_eq!(
            generator.response_for("Deleted"),
            json!({"content": {"text/plain": {"example": "Deleted"}}})
        );
        assert_eq!(generator.example_for("Deleted"), json!("Deleted"));
    }

    #[test]
    fn test_single_object_response() {
        let registry = registry();
        let mut generator = ExampleGenerator::new(&registry);
        let response = generator.response_for("<User>");
        let media = &response["content"]["application/json"];
        assert_eq!(media["schema"], json!({"$ref": "#/components/schemas/User"}));
        assert_eq!(media["example"], json!({"id": 1, "name": "Jane"}));
        assert!(generator.custom_schemas().is_empty());
    }

    #[test]
    fn test_filters_without_route_keep_base_schema() {
        let registry = registry();
        let mut generator = ExampleGenerator::new(&registry);
        let response = generator.response_for("<User>.only(id)");
        let media = &response["content"]["application/json"];
        assert_eq!(media["schema"], json!({"$ref": "#/components/schemas/User"}));
        assert_eq!(media["example"], json!({"id": 1}));
        assert!(generator.custom_schemas().is_empty());
    }

    #[test]
    fn test_set_current_method_normalizes() {
        let registry = registry();
        let mut generator = ExampleGenerator::new(&registry);
        generator.set_current_method("DELETE");
        assert_eq!(generator.current_method(), Some("Delete"));
        generator.set_current_route("");
        assert_eq!(generator.current_route(), None);
    }

    #[test]
    fn test_serializer_overrides_filters() {
        let registry = registry();
        let generator = ExampleGenerator::new(&registry);
        assert_eq!(
            generator.example_for(r#"<User>.only(name).serialized("UserSerializer")"#),
            json!({"id": 1})
        );
    }

    #[test]
    fn test_unknown_serializer_keeps_inline_filters() {
        let registry = registry();
        let generator = ExampleGenerator::new(&registry);
        assert_eq!(
            generator.example_for("<User>.only(name).serialized(Nope)"),
            json!({"name": "Jane"})
        );
    }

    #[test]
    fn test_curated_scalar_example_ignores_append() {
        let registry = registry();
        let generator = ExampleGenerator::new(&registry);
        assert_eq!(
            generator.example_for(r#"<Token>.append("extra": 1)"#),
            json!("abc123")
        );
    }

    #[test]
    fn test_custom_media_type() {
        let registry = registry();
        let config = GeneratorConfig {
            media_type: "application/vnd.api+json".to_string(),
            ..GeneratorConfig::default()
        };
        let mut generator = ExampleGenerator::with_config(&registry, config);
        let response = generator.response_for("<User>");
        assert!(response["content"]["application/vnd.api+json"].is_object());
    }

    #[test]
    fn test_resolve_json_refs_flattens_arrays() {
        let registry = registry();
        let generator = ExampleGenerator::new(&registry);
        let template = json!({
            "owner": "<User>.only(id)",
            "members": ["<User[]>.only(name)", "plain"],
            "count": 2
        });
        assert_eq!(
            generator.resolve_json_refs(&template),
            json!({
                "owner": {"id": 1},
                "members": [{"name": "Jane"}, "plain"],
                "count": 2
            })
        );
    }
}
