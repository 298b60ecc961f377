//! # Directive Parser
//!
//! Turns one annotation line into a structured [`Annotation`].
//!
//! An annotation references a schema between angle brackets and carries
//! optional modifiers:
//!
//! ```text
//! <Comment[]>.with(user, user.relations).exclude(timestamps).paginated(items, page_info)
//! <User> only(id,name) append("bonus": "number")
//! ```
//!
//! Every modifier (`with`, `exclude`, `append`, `only`, `paginated`,
//! `serialized`) can be written as a bracket tag `tag(value)` anywhere in the
//! line or as a method call `.tag(value)` after the reference. Both forms are
//! extracted in independent passes; the bracket tag wins when both are
//! present. Method-call values lose whitespace and quote characters.
//!
//! Parsing is pure: the route/method context lives in
//! [`ExampleGenerator`](crate::generator::ExampleGenerator).

use crate::registry::SchemaEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;


static BRACKET_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(with|exclude|append|only|paginated|serialized)\(([^()]*)\)")
        .expect("bracket tag regex should be valid")
});

static METHOD_CALL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(with|exclude|append|only|paginated|serialized)\(([^)]*)\)")
        .expect("method call regex should be valid")
});

/// Default envelope key for paginated data.
pub const DEFAULT_DATA_NAME: &str = "data";
/// Default envelope key for pagination metadata.
pub const DEFAULT_META_NAME: &str = "meta";

/// Modifier tags recognized in an annotation line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    With,
    Exclude,
    Append,
    Only,
    Paginated,
    Serialized,
}

impl Modifier {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "with" => Some(Modifier::With),
            "exclude" => Some(Modifier::Exclude),
            "append" => Some(Modifier::Append),
            "only" => Some(Modifier::Only),
            "paginated" => Some(Modifier::Paginated),
            "serialized" => Some(Modifier::Serialized),
            _ => None,
        }
    }
}

/// Syntax a modifier was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    BracketTag,
    MethodCall,
}

/// include / exclude / only token sets.
///
/// Tokens are dotted paths (`comment.id`) or the sentinels `relations`
/// (include) and `timestamps` (exclude).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
    /// Allow-list; empty means no restriction.
    pub only: BTreeSet<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.only.is_empty()
    }

    pub fn includes(&self, token: &str) -> bool {
        self.include.contains(token)
    }

    pub fn excludes(&self, token: &str) -> bool {
        self.exclude.contains(token)
    }

    pub fn only_contains(&self, token: &str) -> bool {
        self.only.contains(token)
    }

    /// Filters dictated by a serializer schema's `fields` / `relations`.
    ///
    /// `fields.pick` becomes the allow-list, `fields.omit` the exclusions.
    /// Each relation is included and allow-listed together with its
    /// `relation.field` paths.
    pub fn from_serializer(serializer: &SchemaEntry) -> Self {
        let mut filters = Filters::default();
        if let Some(fields) = &serializer.fields {
            filters
                .only
                .extend(fields.pick.iter().flatten().cloned());
            filters
                .exclude
                .extend(fields.omit.iter().flatten().cloned());
        }
        if let Some(relations) = &serializer.relations {
            for (relation, fields) in relations {
                filters.include.insert(relation.clone());
                filters.only.insert(relation.clone());
                filters
                    .only
                    .extend(fields.iter().map(|field| format!("{relation}.{field}")));
            }
        }
        filters
    }
}

/// Parsed `append(...)` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Append {
    /// Extra fields, in declaration order.
    pub fields: Map<String, Value>,
    /// Original text when the payload could not be parsed.
    pub raw: Option<String>,
}

impl Append {
    /// Parse partial object-literal content (`"a": 1, b: "number"`).
    ///
    /// Strict JSON is tried first, then YAML flow syntax which also accepts
    /// unquoted keys. Anything else keeps the raw text and merges nothing.
    pub fn parse(payload: &str) -> Self {
        let wrapped = format!("{{{payload}}}");
        let parsed = serde_json::from_str::<Value>(&wrapped)
            .ok()
            .or_else(|| serde_yaml::from_str::<Value>(&wrapped).ok());
        match parsed {
            Some(Value::Object(fields)) => Append { fields, raw: None },
            _ => {
                warn!(payload = %payload, "append payload is not an object literal; keeping raw text");
                Append {
                    fields: Map::new(),
                    raw: Some(payload.to_string()),
                }
            }
        }
    }

    pub fn is_present(&self) -> bool {
        !self.fields.is_empty() || self.raw.is_some()
    }
}

/// Envelope keys for paginated array responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationNames {
    pub data: String,
    pub meta: String,
}

impl Default for PaginationNames {
    fn default() -> Self {
        Self {
            data: DEFAULT_DATA_NAME.to_string(),
            meta: DEFAULT_META_NAME.to_string(),
        }
    }
}

impl PaginationNames {
    /// `paginated(items, page_info)`; a missing argument keeps its default.
    fn from_args(args: &str) -> Self {
        let mut parts = args.split(',').map(strip_quotes);
        let mut names = Self::default();
        if let Some(data) = parts.next().filter(|s| !s.is_empty()) {
            names.data = data;
        }
        if let Some(meta) = parts.next().filter(|s| !s.is_empty()) {
            names.meta = meta;
        }
        names
    }
}

/// A schema reference plus its modifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directive {
    /// Text between the first `<` and the last `>`
    pub raw_ref: String,
    /// Schema name with any `[]` suffix removed
    pub reference: String,
    pub is_array: bool,
    pub filters: Filters,
    pub append: Append,
    pub paginated: bool,
    pub pagination: PaginationNames,
    pub serializer: Option<String>,
}

impl Directive {
    /// True when any modifier that warrants a derived schema is present.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty() || self.serializer.is_some() || self.append.is_present()
    }
}

/// Result of parsing one annotation line
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// No `<...>` reference: the line is a plain-text example.
    Text(String),
    Schema(Directive),
}

/// Parse one annotation line.
pub fn parse_annotation(line: &str) -> Annotation {
    let raw_ref = raw_reference(line);
    if raw_ref.is_empty() {
        return Annotation::Text(line.to_string());
    }

    let (reference, is_array) = match raw_ref.strip_suffix("[]") {
        Some(stripped) => (stripped.to_string(), true),
        None => (raw_ref.to_string(), false),
    };

    let modifiers = merge_passes(
        extract(line, &BRACKET_TAG_REGEX, Syntax::BracketTag),
        extract(line, &METHOD_CALL_REGEX, Syntax::MethodCall),
    );

    let list = |m: Modifier| modifiers.get(&m).map(|v| tokens(v)).unwrap_or_default();
    let filters = Filters {
        include: list(Modifier::With),
        exclude: list(Modifier::Exclude),
        only: list(Modifier::Only),
    };

    let append = modifiers
        .get(&Modifier::Append)
        .map(|payload| Append::parse(payload))
        .unwrap_or_default();

    let (paginated, pagination) = match modifiers.get(&Modifier::Paginated) {
        Some(args) => (true, PaginationNames::from_args(args)),
        None => (false, PaginationNames::default()),
    };

    let serializer = modifiers
        .get(&Modifier::Serialized)
        .map(|name| strip_quotes(name))
        .filter(|name| !name.is_empty());

    Annotation::Schema(Directive {
        raw_ref: raw_ref.to_string(),
        reference,
        is_array,
        filters,
        append,
        paginated,
        pagination,
        serializer,
    })
}

/// Substring between the first `<` and the last `>`; empty when absent.
fn raw_reference(line: &str) -> &str {
    match (line.find('<'), line.rfind('>')) {
        (Some(start), Some(end)) if start < end => &line[start + 1..end],
        _ => "",
    }
}

type Modifiers = HashMap<Modifier, String>;

/// One extraction pass; the first occurrence of each tag wins.
fn extract(line: &str, regex: &Regex, syntax: Syntax) -> Modifiers {
    let mut found = Modifiers::new();
    for caps in regex.captures_iter(line) {
        let (Some(tag), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        // `\b` also matches after a dot; those belong to the method-call pass.
        if syntax == Syntax::BracketTag && line[..tag.start()].ends_with('.') {
            continue;
        }
        let Some(modifier) = Modifier::parse(tag.as_str()) else {
            continue;
        };
        let value = match (syntax, modifier) {
            (_, Modifier::Append) => value.as_str().trim().to_string(),
            (Syntax::MethodCall, _) => value
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
                .collect(),
            (Syntax::BracketTag, _) => value.as_str().trim().to_string(),
        };
        found.entry(modifier).or_insert(value);
    }
    found
}

fn merge_passes(bracket: Modifiers, method: Modifiers) -> Modifiers {
    let mut merged = method;
    merged.extend(bracket);
    merged
}

fn tokens(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(strip_quotes)
        .filter(|token| !token.is_empty())
        .collect()
}

fn strip_quotes(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
