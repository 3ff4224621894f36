//! Query-string serialization and parsing against the public contract.

use ordmap::{ordmap, OrderedMap, QueryError, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn flat_map_serializes_to_pairs() {
    let map = ordmap! { "apple" => "red", "lemon" => "yellow" };
    insta::assert_snapshot!(map.to_query_string(), @"apple=red&lemon=yellow");
}

#[test]
fn array_values_serialize_with_indices() {
    let map = ordmap! {
        "apple" => vec!["red", "yellow"],
        "lemon" => vec!["green", "yellow"],
    };
    insta::assert_snapshot!(
        map.to_query_string(),
        @"apple[0]=red&apple[1]=yellow&lemon[0]=green&lemon[1]=yellow"
    );
}

#[test]
fn nested_maps_serialize_with_bracketed_keys() {
    let map = ordmap! {
        "fruits" => ordmap! {
            "apple" => vec!["red", "yellow"],
            "lemon" => vec!["green", "yellow"],
        },
    };
    insta::assert_snapshot!(
        map.to_query_string(),
        @"fruits[apple][0]=red&fruits[apple][1]=yellow&fruits[lemon][0]=green&fruits[lemon][1]=yellow"
    );
}

#[test]
fn empty_map_serializes_to_empty_string() {
    assert_eq!(OrderedMap::new().to_query_string(), "");
}

#[test]
fn null_values_are_skipped() {
    let map = ordmap! { "a" => "x", "gone" => Value::Null, "b" => "y" };
    assert_eq!(map.to_query_string(), "a=x&b=y");
}

#[test]
fn numbers_and_bools_render_as_plain_text() {
    let map = ordmap! { "page" => 1, "limit" => 50, "debug" => true };
    assert_eq!(map.to_query_string(), "page=1&limit=50&debug=true");
}

#[test]
fn reserved_characters_are_percent_encoded() {
    let map = ordmap! { "q" => "a&b=c", "path key" => "x/y" };
    assert_eq!(map.to_query_string(), "q=a%26b%3Dc&path%20key=x%2Fy");
}

#[test]
fn unicode_values_are_percent_encoded() {
    let map = ordmap! { "name" => "café" };
    assert_eq!(map.to_query_string(), "name=caf%C3%A9");
}

#[test]
fn deeply_nested_composite_keys() {
    let map = ordmap! {
        "a" => ordmap! { "b" => ordmap! { "c" => vec!["deep"] } },
    };
    assert_eq!(map.to_query_string(), "a[b][c][0]=deep");
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn parse_flat_pairs() {
    let parsed = OrderedMap::from_query_string("apple=red&lemon=yellow").unwrap();
    assert_eq!(parsed, ordmap! { "apple" => "red", "lemon" => "yellow" });
}

#[test]
fn parse_empty_input_yields_empty_map() {
    assert_eq!(OrderedMap::from_query_string("").unwrap(), OrderedMap::new());
}

#[test]
fn parse_preserves_first_seen_key_order() {
    let parsed = OrderedMap::from_query_string("z=1&a=2&m=3").unwrap();
    assert_eq!(parsed.get_keys(), vec!["z", "a", "m"]);
}

#[test]
fn parse_decodes_percent_escapes() {
    let parsed = OrderedMap::from_query_string("q=a%26b%3Dc&name=caf%C3%A9").unwrap();
    assert_eq!(parsed, ordmap! { "q" => "a&b=c", "name" => "café" });
}

#[test]
fn parse_repeated_scalar_key_keeps_last_value() {
    let parsed = OrderedMap::from_query_string("a=1&a=2").unwrap();
    assert_eq!(parsed, ordmap! { "a" => "2" });
}

#[test]
fn canonical_nested_form_round_trips() {
    let source = ordmap! {
        "fruits" => ordmap! {
            "apple" => vec!["red", "yellow"],
            "lemon" => vec!["green", "yellow"],
        },
    };
    let parsed = OrderedMap::from_query_string(&source.to_query_string()).unwrap();
    assert_eq!(parsed, source);
}

#[test]
fn parse_errors_surface_immediately() {
    assert!(matches!(
        OrderedMap::from_query_string("a[0=x").unwrap_err(),
        QueryError::UnterminatedBracket { .. }
    ));
    assert!(matches!(
        OrderedMap::from_query_string("a[0]b=x").unwrap_err(),
        QueryError::TextAfterBracket { .. }
    ));
    assert!(matches!(
        OrderedMap::from_query_string("a[1]=x").unwrap_err(),
        QueryError::SparseIndex { index: 1, .. }
    ));
    assert!(matches!(
        OrderedMap::from_query_string("a[0]=x&a[b]=y").unwrap_err(),
        QueryError::ShapeConflict { .. }
    ));
}

#[test]
fn parse_error_messages_name_the_offending_path() {
    let err = OrderedMap::from_query_string("pets[3]=cat").unwrap_err();
    assert_eq!(
        err.to_string(),
        "array index 3 in `pets[3]` skips ahead of next free slot 0"
    );
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn flat_string_maps_survive_a_round_trip(
        entries in proptest::collection::vec(("[a-zA-Z0-9_]{1,10}", ".*"), 0..12),
    ) {
        let mut map = OrderedMap::new();
        for (key, value) in &entries {
            map.set(key.clone(), value.clone());
        }
        let parsed = OrderedMap::from_query_string(&map.to_query_string()).unwrap();
        prop_assert_eq!(parsed, map);
    }

    #[test]
    fn string_array_maps_survive_a_round_trip(
        key in "[a-z]{1,8}",
        items in proptest::collection::vec(".*", 1..6),
    ) {
        let mut map = OrderedMap::new();
        map.set(key, items.clone());
        let parsed = OrderedMap::from_query_string(&map.to_query_string()).unwrap();
        prop_assert_eq!(parsed, map);
    }

    #[test]
    fn serialized_form_never_contains_raw_reserved_characters(
        key in "[a-z]{1,8}",
        value in ".*",
    ) {
        let mut map = OrderedMap::new();
        map.set(key, value);
        let serialized = map.to_query_string();
        // One pair: exactly one `=`, no stray `&`, and brackets only come
        // from structure (absent here).
        prop_assert_eq!(serialized.matches('=').count(), 1);
        prop_assert!(!serialized.contains('&'));
        prop_assert!(!serialized.contains('['));
    }
}
