use pretty_assertions::assert_eq;

use super::*;
use crate::cow_yaml::parse_yaml_str;

fn yaml(input: &str) -> Yaml {
    parse_yaml_str(input).unwrap().remove(0)
}

#[test]
fn scalars() {
    let parser = JsonParser::new();
    assert_eq!(parser.parse("null").unwrap(), Yaml::Null);
    assert_eq!(parser.parse(" true ").unwrap(), Yaml::Boolean(true));
    assert_eq!(parser.parse("-42").unwrap(), Yaml::Integer(-42));
    assert_eq!(parser.parse("1.5e3").unwrap(), Yaml::Real(Rc::new("1.5e3".to_string())));
    assert_eq!(parser.parse(r#""a\"bA""#).unwrap(), Yaml::string("a\"bA"));
}

#[test]
fn nested_object_keeps_member_order() {
    let parser = JsonParser::new();
    let value = parser.parse(r#"{"zone": "az1", "tags": ["a", "b"], "size": {"ram": 512}}"#).unwrap();
    assert_eq!(value, yaml("{zone: az1, tags: [a, b], size: {ram: 512}}"));
}

#[test]
fn empty_collections() {
    let parser = JsonParser::new();
    assert_eq!(parser.parse("[]").unwrap(), Yaml::from_vec(vec![]));
    assert_eq!(parser.parse("{ }").unwrap(), Yaml::empty_mapping());
}

#[test]
fn rejects_trailing_input() {
    let parser = JsonParser::new();
    let err = parser.parse(r#"{"a": 1} extra"#).unwrap_err();
    assert!(err.to_string().starts_with("invalid JSON: "));
}

#[test]
fn rejects_bare_words() {
    let parser = JsonParser::new();
    assert!(parser.parse("hello").is_err());
}

#[test]
fn shared_parser() {
    assert_eq!(parse_json(r#"{"a": [1, "b"]}"#).unwrap(), JsonParser::new().parse(r#"{"a": [1, "b"]}"#).unwrap());
    assert!(parse_json("{").is_err());
    assert_eq!(parse_json("[]").unwrap(), Yaml::from_vec(Vec::new()));
}
