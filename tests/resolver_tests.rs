#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use brrtdoc::{Filters, ResolveError, Resolver, SchemaRegistry};
use common::{blog_registry, keys};
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn with(include: &[&str]) -> Filters {
    Filters {
        include: set(include),
        ..Filters::default()
    }
}

fn resolve(schema: &str, filters: &Filters) -> Value {
    let registry = blog_registry();
    Resolver::new(&registry, 10).resolve(schema, filters).unwrap()
}

#[test]
fn test_unknown_schema_is_empty_object() {
    assert_eq!(resolve("Ghost", &Filters::default()), json!({}));
    assert_eq!(resolve("Ghost", &with(&["relations"])), json!({}));
}

#[test]
fn test_curated_example_bypasses_filters() {
    let filters = Filters {
        only: set(&["nothing"]),
        ..Filters::default()
    };
    assert_eq!(resolve("Health", &filters), json!({"status": "ok"}));
}

#[test]
fn test_default_user_example() {
    let user = resolve("User", &Filters::default());
    assert_eq!(
        keys(&user),
        ["id", "name", "email", "profile", "created_at", "updated_at", "deleted_at"]
    );
    assert_eq!(
        user["profile"],
        json!({"bio": "Writes about Rust", "avatar": "https://example.com/jane.png"})
    );
}

#[test]
fn test_passwords_hidden_unless_requested() {
    let combos = [
        Filters::default(),
        Filters {
            exclude: set(&["email"]),
            ..Filters::default()
        },
        Filters {
            only: set(&["id", "name"]),
            ..Filters::default()
        },
        Filters {
            exclude: set(&["timestamps"]),
            only: set(&["id", "password_confirmation_x"]),
            ..Filters::default()
        },
    ];
    for filters in &combos {
        let user = resolve("User", filters);
        assert!(user.get("password").is_none(), "{filters:?}");
        assert!(user.get("password_confirmation").is_none(), "{filters:?}");
    }

    let user = resolve("User", &with(&["password"]));
    assert_eq!(user["password"], json!("hunter2"));
    assert!(user.get("password_confirmation").is_none());

    let only = Filters {
        only: set(&["id", "password"]),
        ..Filters::default()
    };
    assert_eq!(keys(&resolve("User", &only)), ["id", "password"]);
}

#[test]
fn test_only_keeps_registry_order() {
    let filters = Filters {
        only: set(&["name", "id"]),
        ..Filters::default()
    };
    let user = resolve("User", &filters);
    assert_eq!(keys(&user), ["id", "name"]);
}

#[test]
fn test_exclude_timestamps_removes_exactly_three_keys() {
    let all = resolve("User", &Filters::default());
    let trimmed = resolve(
        "User",
        &Filters {
            exclude: set(&["timestamps"]),
            ..Filters::default()
        },
    );
    let removed: Vec<&str> = keys(&all)
        .into_iter()
        .filter(|k| !keys(&trimmed).contains(k))
        .collect();
    assert_eq!(removed, ["created_at", "updated_at", "deleted_at"]);
}

#[test]
fn test_model_relation_needs_include() {
    let post = resolve("Post", &Filters::default());
    assert!(post.get("author").is_none());
    assert!(post.get("comments").is_none());
    assert_eq!(post["tags"], json!(["rust"]));

    let post = resolve("Post", &with(&["author"]));
    assert_eq!(post["author"]["id"], json!(1));
    // nested relations of the author stay closed
    assert!(post["author"].get("posts").is_none());
    assert!(post["author"].get("profile").is_none());
}

#[test]
fn test_relations_sentinel_opens_top_level_only() {
    let post = resolve("Post", &with(&["relations"]));
    assert_eq!(post["author"]["name"], json!("Jane Doe"));
    let comments = post["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["body"], json!("Nice post"));
    assert!(comments[0].get("user").is_none());
}

#[test]
fn test_first_relation_wildcard_reaches_nested_models() {
    let post = resolve("Post", &with(&["comments", "comments.relations"]));
    let comment = &post["comments"][0];
    assert_eq!(comment["user"]["id"], json!(1));
    assert!(comment["user"].get("profile").is_none());
    // the comment schema is already on the chain
    assert!(comment.get("replies").is_none());
}

#[test]
fn test_nested_exclude_and_only_use_dotted_paths() {
    let filters = Filters {
        include: set(&["comments"]),
        exclude: set(&["comments.body"]),
        ..Filters::default()
    };
    let post = resolve("Post", &filters);
    assert_eq!(keys(&post["comments"][0]), ["id", "created_at"]);

    let filters = Filters {
        include: set(&["comments"]),
        only: set(&["title", "comments", "comments.body"]),
        ..Filters::default()
    };
    let post = resolve("Post", &filters);
    assert_eq!(post, json!({"title": "Hello", "comments": [{"body": "Nice post"}]}));
}

#[test]
fn test_self_reference_without_explicit_path_terminates() {
    let comment = resolve("Comment", &with(&["relations"]));
    assert_eq!(comment["user"]["email"], json!("jane@example.com"));
    assert!(comment.get("replies").is_none());
}

#[test]
fn test_explicit_self_reference_chain() {
    let comment = resolve(
        "Comment",
        &with(&["replies", "replies.replies", "replies.replies.replies"]),
    );
    let deepest = &comment["replies"][0]["replies"][0]["replies"][0];
    assert_eq!(deepest["id"], json!(100));
    assert!(deepest.get("replies").is_none());
}

#[test]
fn test_depth_ceiling_is_an_error() {
    let registry = blog_registry();
    let err = Resolver::new(&registry, 2)
        .resolve(
            "Comment",
            &with(&["replies", "replies.replies", "replies.replies.replies"]),
        )
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::DepthExceeded {
            schema: "Comment".to_string(),
            path: "replies.replies.replies".to_string(),
            depth: 3,
            max: 2,
        }
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let registry = blog_registry();
    let resolver = Resolver::new(&registry, 10);
    let filters = with(&["posts", "posts.relations", "profile"]);
    let first = resolver.resolve("User", &filters).unwrap();
    let second = resolver.resolve("User", &filters).unwrap();
    assert_eq!(first, second);
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn test_numeric_leaves_without_examples_are_stable() {
    let registry = SchemaRegistry::from_value(json!({
        "Order": {
            "type": "object",
            "properties": {
                "id": {"type": "integer"},
                "total": {"type": "number"}
            }
        }
    }))
    .unwrap();
    let resolver = Resolver::new(&registry, 10);
    let first = resolver.resolve("Order", &Filters::default()).unwrap();
    assert!(first["id"].is_u64() && first["total"].is_u64());
    for _ in 0..5 {
        assert_eq!(resolver.resolve("Order", &Filters::default()).unwrap(), first);
    }

    let fresh = SchemaRegistry::from_value(json!({
        "Order": {"type": "object", "properties": {"id": {"type": "integer"}, "total": {"type": "number"}}}
    }))
    .unwrap();
    assert_eq!(
        Resolver::new(&fresh, 10).resolve("Order", &Filters::default()).unwrap(),
        first
    );
}

#[test]
fn test_explicit_null_example_is_kept() {
    let registry = SchemaRegistry::from_value(json!({
        "Profile": {
            "type": "object",
            "properties": {
                "name": {"type": "string", "example": null},
                "email": {"type": "string"}
            }
        }
    }))
    .unwrap();
    let value = Resolver::new(&registry, 10)
        .resolve("Profile", &Filters::default())
        .unwrap();
    assert_eq!(value, json!({"name": null, "email": "johndoe@example.com"}));
}
