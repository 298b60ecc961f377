//! # Generator Configuration
//!
//! Environment-driven knobs for example generation.
//!
//! ## Environment Variables
//!
//! ### `BRRTDOC_MAX_DEPTH`
//!
//! Hard ceiling on relation nesting while expanding examples. A walk that
//! goes deeper is abandoned and the annotation falls back to an empty
//! example. Default: `10`.
//!
//! ### `BRRTDOC_PAGINATION_SCHEMA`
//!
//! Schema used for the metadata half of paginated envelopes.
//! Default: `PaginationMeta`.
//!
//! ### `BRRTDOC_MEDIA_TYPE`
//!
//! Media type key of generated schema responses. Default: `application/json`.
//!
//! ```bash
//! export BRRTDOC_MAX_DEPTH=4
//! brrtdoc resolve --schemas schemas.yaml "<User>.with(posts)"
//! ```

use crate::registry::PAGINATION_META;
use std::env;

const DEFAULT_MAX_DEPTH: usize = 10;
const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Example generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Maximum relation depth followed by the resolver
    pub max_depth: usize,
    /// Schema resolved under the meta key of paginated responses
    pub pagination_schema: String,
    /// Media type for non plain-text responses
    pub media_type: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            pagination_schema: PAGINATION_META.to_string(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_depth = env::var("BRRTDOC_MAX_DEPTH")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|depth: &usize| *depth > 0)
            .unwrap_or(defaults.max_depth);
        let pagination_schema = non_empty_var("BRRTDOC_PAGINATION_SCHEMA")
            .unwrap_or(defaults.pagination_schema);
        let media_type = non_empty_var("BRRTDOC_MEDIA_TYPE").unwrap_or(defaults.media_type);
        GeneratorConfig {
            max_depth,
            pagination_schema,
            media_type,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
