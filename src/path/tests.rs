use pretty_assertions::assert_eq;

use super::*;
use crate::cow_yaml::parse_yaml_str;

fn yaml(input: &str) -> Yaml {
    parse_yaml_str(input).unwrap().remove(0)
}

#[test]
fn empty_path_returns_value() {
    let value = yaml("{a: 1}");
    assert_eq!(traverse("get_param", &value, &[]).unwrap(), value);
}

#[test]
fn mapping_and_sequence_steps() {
    let value = yaml("{servers: [{name: web}, {name: db}]}");
    let path = [Yaml::string("servers"), Yaml::Integer(1), Yaml::string("name")];
    assert_eq!(traverse("get_param", &value, &path).unwrap(), Yaml::string("db"));
}

#[test]
fn negative_index_counts_from_end() {
    let value = yaml("[a, b, c]");
    assert_eq!(traverse("get_attr", &value, &[Yaml::Integer(-1)]).unwrap(), Yaml::string("c"));
    assert_eq!(
        traverse("get_attr", &value, &[Yaml::Integer(-4)]),
        Err(TraversalError::OutOfBounds { index: -4 })
    );
}

#[test]
fn integer_keys_in_mappings() {
    let value = yaml("{1: one, 2: two}");
    assert_eq!(traverse("get_param", &value, &[Yaml::Integer(2)]).unwrap(), Yaml::string("two"));
}

#[test]
fn scalar_is_not_traversable() {
    let value = yaml("{name: web}");
    let err = traverse("get_param", &value, &[Yaml::string("name"), Yaml::Integer(0)]).unwrap_err();
    assert_eq!(
        err,
        TraversalError::NotTraversable {
            fn_name: "get_param".to_string(),
            type_name: "string",
        }
    );
    assert_eq!(err.to_string(), "\"get_param\" can't traverse path");
}

#[test]
fn key_must_be_string_or_integer() {
    let value = yaml("{a: 1}");
    let err = traverse("get_attr", &value, &[Yaml::Boolean(true)]).unwrap_err();
    assert_eq!(err.to_string(), "Path components in \"get_attr\" must be strings");

    let list = yaml("[a, b]");
    let err = traverse("get_attr", &list, &[Yaml::Null]).unwrap_err();
    assert_eq!(
        err,
        TraversalError::InvalidKey {
            fn_name: "get_attr".to_string(),
            type_name: "null",
        }
    );
}

#[test]
fn string_index_into_list() {
    let value = yaml("[a, b]");
    assert_eq!(
        traverse("get_param", &value, &[Yaml::string("0")]),
        Err(TraversalError::NonIntegerIndex { key: "0".to_string() })
    );
}

#[test]
fn failures_degrade_to_empty_string() {
    let value = yaml("{a: {b: 1}}");
    assert_eq!(
        traverse_or_empty("get_param", &value, &[Yaml::string("missing")]),
        Yaml::empty_string()
    );
    assert_eq!(
        traverse_or_empty("get_param", &value, &[Yaml::string("a"), Yaml::string("b")]),
        Yaml::Integer(1)
    );
}
