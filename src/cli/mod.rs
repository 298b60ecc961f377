//! # CLI Module
//!
//! Command-line front end for resolving response annotations.
//!
//! ## Commands
//!
//! ### `resolve`
//!
//! Resolve a single annotation line against a schema registry:
//!
//! ```bash
//! brrtdoc resolve --schemas schemas.yaml --route /users/:id/comments --method get \
//!     "<Comment[]>.only(id,body).paginated(items,page_info)"
//! ```
//!
//! Options:
//! - `--schemas <FILE>` - Schema registry, YAML or JSON (required)
//! - `--route <ROUTE>` - Route used to name derived schemas
//! - `--method <METHOD>` - HTTP method used to name derived schemas
//! - `--example-only` - Print only the example payload
//!
//! Prints `{"response": ..., "components": {"schemas": ...}}`, or just the
//! example with `--example-only`.
//!
//! ### `batch`
//!
//! Resolve a YAML/JSON list of `{method, route, line}` annotations:
//!
//! ```bash
//! brrtdoc batch --schemas schemas.yaml --annotations routes.yaml
//! ```
//!
//! Prints responses in input order, the merged derived schemas and any
//! naming conflicts found while merging.
//!
//! ## Logging
//!
//! Logs go to stderr and are configured through `BRRTDOC_LOG_*` variables,
//! see [`crate::logging`].

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
