#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use brrtdoc::SchemaRegistry;
use serde_json::Value;

/// Blog registry: three Model schemas with relations in both directions, a
/// plain DTO, a serializer and a schema with a curated example. Every leaf
/// carries an explicit example so outputs are deterministic.
pub const BLOG_SCHEMAS: &str = r##"
User:
  type: object
  description: User Model
  required: [id, name, email, password]
  properties:
    id: {type: integer, example: 1}
    name: {type: string, example: Jane Doe}
    email: {type: string, example: jane@example.com}
    password: {type: string, example: hunter2}
    password_confirmation: {type: string, example: hunter2}
    profile: {$ref: "#/components/schemas/Profile"}
    posts:
      type: array
      items: {$ref: "#/components/schemas/Post"}
    created_at: {type: string, format: date-time, example: "2021-03-23T16:13:08.489+01:00"}
    updated_at: {type: string, format: date-time, example: "2021-03-24T10:00:00.000+01:00"}
    deleted_at: {type: string, format: date-time, example: "2021-03-25T10:00:00.000+01:00"}
Profile:
  type: object
  description: Public profile
  properties:
    bio: {type: string, example: Writes about Rust}
    avatar: {type: string, example: "https://example.com/jane.png"}
Post:
  type: object
  description: Post Model
  required: [id, title]
  properties:
    id: {type: integer, example: 10}
    title: {type: string, example: Hello}
    author: {$ref: "#/components/schemas/User"}
    comments:
      type: array
      items: {$ref: Comment}
    tags:
      type: array
      items: {type: string, example: rust}
Comment:
  type: object
  description: Comment Model
  required: [id, body]
  properties:
    id: {type: integer, example: 100}
    body: {type: string, example: Nice post}
    user: {$ref: "#/components/schemas/User"}
    replies:
      type: array
      items: {$ref: "#/components/schemas/Comment"}
    created_at: {type: string, format: date-time, example: "2021-03-23T16:13:08.489+01:00"}
Account:
  type: object
  properties:
    id: {type: integer, example: 7}
    bonus: {type: string, example: none}
CommentSerializer:
  type: object
  fields:
    pick: [id, body]
  relations:
    user: [id, name]
Health:
  type: object
  example: {status: ok}
"##;

pub fn blog_registry() -> SchemaRegistry {
    let value: Value = serde_yaml::from_str(BLOG_SCHEMAS).expect("fixture should be valid YAML");
    SchemaRegistry::from_value(value)
        .expect("fixture should be a valid registry")
        .with_pagination_meta()
}

pub fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
