// dummy_value.rs

use convert_case::{Case, Casing};
use rand::Rng;
use serde_json::{json, Map, Value};

const DATETIME_EXAMPLE: &str = "2021-03-23T16:13:08.489+01:00";
const DATE_EXAMPLE: &str = "2021-03-23";

/// Primitive type names that [`example_for_type`] knows how to fill.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "string",
    "number",
    "integer",
    "boolean",
    "date",
    "date-time",
    "datetime",
    "DateTime",
    "object",
];

pub fn is_primitive_type(ty: &str) -> bool {
    PRIMITIVE_TYPES.contains(&ty)
}

/// Example value for a primitive OpenAPI type.
///
/// Numbers are a pseudo-random integer in `[0, 1000)`; only appended type
/// names go through this path, registry leaves use [`example_for_leaf`].
/// Unknown types give `Value::Null` so the caller can pick its own fallback.
pub fn example_for_type(ty: &str) -> Value {
    match ty {
        "string" => example_for_field("title"),
        "number" | "integer" => json!(rand::thread_rng().gen_range(0..1000)),
        "boolean" => Value::Bool(true),
        "date" => json!(DATE_EXAMPLE),
        "date-time" | "datetime" | "DateTime" => json!(DATETIME_EXAMPLE),
        "object" => Value::Object(Map::new()),
        _ => Value::Null,
    }
}

/// Example value for a well-known field name.
///
/// Tries the exact name first, then its snake_case form (`firstName` ->
/// `first_name`). Unmatched names give `Value::Null`.
pub fn example_for_field(field: &str) -> Value {
    lookup_field(field)
        .or_else(|| lookup_field(&field.to_case(Case::Snake)))
        .unwrap_or(Value::Null)
}

/// Example value for a validator rule attached to a string field.
pub fn example_for_rule(rule: &str) -> Value {
    match rule {
        "email" => json!("user@example.com"),
        _ => json!("Some string"),
    }
}

/// Example for either a primitive type name or a field name.
pub fn example_for(name_or_type: &str) -> Value {
    match example_for_type(name_or_type) {
        Value::Null => example_for_field(name_or_type),
        value => value,
    }
}

/// Example for a leaf property that carries no `example` literal.
///
/// String-typed leaves prefer the field dictionary; everything else goes by
/// type. Numeric leaves are derived from the field name, so repeated runs
/// emit the same document.
pub fn example_for_leaf(field: &str, ty: Option<&str>) -> Value {
    match ty {
        Some("string") | None => match example_for_field(field) {
            Value::Null => ty.map(example_for_type).unwrap_or(Value::Null),
            value => value,
        },
        Some("number" | "integer") => stable_number(field),
        Some(other) => example_for_type(other),
    }
}

/// FNV-1a over the field name, folded into `[0, 1000)`.
fn stable_number(field: &str) -> Value {
    let hash = field.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
        (acc ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    json!(hash % 1000)
}

fn lookup_field(field: &str) -> Option<Value> {
    let value = match field {
        "datetime" | "DateTime" => json!(DATETIME_EXAMPLE),
        "date" => json!(DATE_EXAMPLE),
        "title" => json!("Lorem Ipsum"),
        "year" => json!(2023),
        "description" => json!("Lorem ipsum dolor sit amet"),
        "name" | "full_name" => json!("John Doe"),
        "first_name" => json!("John"),
        "last_name" => json!("Doe"),
        "email" => json!("johndoe@example.com"),
        "address" | "street" => json!("1028 Farland Street"),
        "country" => json!("United States of America"),
        "country_code" => json!("US"),
        "zip" => json!(60617),
        "city" => json!("Chicago"),
        "password" | "password_confirmation" => json!("S3cur3P4s5word!"),
        "lat" => json!(41.705),
        "long" => json!(-87.475),
        "price" => json!(10.5),
        "avatar" => json!("https://example.com/avatar.png"),
        "url" => json!("https://example.com"),
        _ => return None,
    };
    Some(value)
}
