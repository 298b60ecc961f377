#![allow(clippy::unwrap_used, clippy::expect_used)]

use brrtdoc::{parse_annotation, Annotation};
use serde_json::json;

fn directive(line: &str) -> brrtdoc::Directive {
    match parse_annotation(line) {
        Annotation::Schema(d) => d,
        Annotation::Text(t) => panic!("expected a directive, got {t:?}"),
    }
}

#[test]
fn test_both_syntaxes_agree() {
    let bracket = directive("<Comment[]> with(user) exclude(timestamps) only(id,body)");
    let method = directive("<Comment[]>.with(user).exclude(timestamps).only(id, body)");
    assert_eq!(bracket.filters, method.filters);
    assert!(bracket.is_array && method.is_array);
}

#[test]
fn test_mixed_syntaxes_combine() {
    let d = directive(r#"<User> with(posts).exclude("email").append("bonus": "number")"#);
    assert!(d.filters.includes("posts"));
    assert!(d.filters.excludes("email"));
    assert_eq!(d.append.fields["bonus"], json!("number"));
}

#[test]
fn test_reference_spans_first_and_last_angle() {
    let d = directive("returns <User> or <Admin>");
    assert_eq!(d.raw_ref, "User> or <Admin");
}

#[test]
fn test_modifiers_outside_reference_without_angles_are_text() {
    assert_eq!(
        parse_annotation("only(id) with(posts)"),
        Annotation::Text("only(id) with(posts)".to_string())
    );
}
