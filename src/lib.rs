//! # brrtdoc
//!
//! **brrtdoc** turns one-line response annotations from route documentation
//! comments into OpenAPI response fragments: a schema reference plus a
//! realistic, fully expanded example payload.
//!
//! ```text
//! <Comment[]>.with(user).exclude(timestamps).paginated(items, page_info)
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`registry`]** - Read-only schema registry (models, DTOs, relations) and its loader
//! - **[`dummy_value`]** - Example values for primitive types and well-known field names
//! - **[`directive`]** - Annotation parser (bracket-tag and method-call modifier syntax)
//! - **[`resolver`]** - Recursive example expansion under include/exclude/only filters
//! - **[`custom_schema`]** - Derived, route-specific schemas and their collision-safe names
//! - **[`generator`]** - Response assembly with route/method context
//! - **[`batch`]** - Per-route generation units with merged derived schemas
//! - **[`config`]** / **[`logging`]** - Environment-driven settings and tracing setup
//! - **[`cli`]** - The `brrtdoc` command
//!
//! ### Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Gen as ExampleGenerator
//!     participant Parser as directive::parse_annotation
//!     participant Resolver as Resolver
//!     participant Synth as custom_schema::synthesize
//!     participant Acc as CustomSchemas
//!
//!     Caller->>Gen: set_current_route / set_current_method
//!     Caller->>Gen: response_for(line)
//!     Gen->>Parser: parse line
//!     Parser-->>Gen: Directive (ref, filters, append, pagination)
//!     Gen->>Resolver: resolve(ref, filters)
//!     Resolver->>Resolver: walk properties and relations
//!     Resolver-->>Gen: example value
//!     alt filters present and route set
//!         Gen->>Synth: synthesize(ref, filters, append)
//!         Synth-->>Gen: DerivedSchema
//!         Gen->>Acc: register(name, origin, schema)
//!     end
//!     Gen-->>Caller: {content: {media: {schema, example}}}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brrtdoc::{load_registry, ExampleGenerator};
//! use std::path::Path;
//!
//! let registry = load_registry(Path::new("schemas.yaml"))?.with_pagination_meta();
//! let mut generator = ExampleGenerator::new(&registry);
//!
//! generator.set_current_route("/users/:id/comments");
//! generator.set_current_method("get");
//! let response = generator.response_for("<Comment[]>.only(id,body)");
//!
//! // Derived schemas to add under components.schemas
//! let components = generator.take_custom_schemas().to_components();
//! ```
//!
//! ## Filters
//!
//! | Modifier | Meaning |
//! |---|---|
//! | `with(a, a.relations)` | expand relations (dotted paths, `relations` = all) |
//! | `exclude(x, timestamps)` | drop keys; `timestamps` drops created/updated/deleted_at |
//! | `only(id, a.id)` | allow-list |
//! | `append("k": "number")` | add keys to the example and derived schema |
//! | `paginated(data, meta)` | wrap arrays in a pagination envelope |
//! | `serialized(Name)` | take filters from a serializer schema |
//!
//! Password fields are never shown unless asked for, and relations to Model
//! schemas are only expanded on request.

pub mod batch;
pub mod cli;
pub mod config;
pub mod custom_schema;
pub mod directive;
pub mod dummy_value;
pub mod generator;
pub mod logging;
pub mod registry;
pub mod resolver;

pub use batch::{generate_batch, BatchOutput, RouteAnnotation};
pub use config::GeneratorConfig;
pub use custom_schema::{derived_schema_name, CustomSchemas, DerivedSchema, MergeConflict};
pub use directive::{parse_annotation, Annotation, Directive, Filters};
pub use generator::ExampleGenerator;
pub use registry::{load_registry, SchemaEntry, SchemaRegistry};
pub use resolver::{ResolveError, Resolver};
