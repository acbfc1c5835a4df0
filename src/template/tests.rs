use pretty_assertions::assert_eq;

use super::*;
use crate::{cow_yaml::parse_yaml_str, error::ErrorKind};

fn yaml(input: &str) -> Yaml {
    parse_yaml_str(input).unwrap().remove(0)
}

fn template(input: &str) -> Template {
    Template::new(yaml(input), LinkedHashMap::new()).unwrap()
}

const WORDPRESS: &str = "
heat_template_version: 2013-05-23
description: Simple WordPress server
parameters:
  flavor:
    type: string
resources:
  server:
    type: OS::Nova::Server
    properties:
      flavor: {get_param: flavor}
    metadata: {tier: web}
outputs:
  url:
    description: The site
    value: {get_attr: [server, first_address]}
";

#[test]
fn sections_by_hot_name() {
    let tmpl = template(WORDPRESS);
    assert_eq!(tmpl.section(VERSION).unwrap(), Yaml::string("2013-05-23"));
    assert_eq!(tmpl.section(DESCRIPTION).unwrap(), Yaml::string("Simple WordPress server"));
    assert_eq!(tmpl.section(PARAMETER_GROUPS).unwrap(), Yaml::empty_mapping());
}

#[test]
fn sections_by_cfn_name() {
    let tmpl = template(WORDPRESS);
    assert_eq!(tmpl.section("AWSTemplateFormatVersion").unwrap(), Yaml::string("2013-05-23"));
    assert_eq!(tmpl.section("Description").unwrap(), tmpl.section(DESCRIPTION).unwrap());
    assert_eq!(tmpl.section("Resources").unwrap(), tmpl.section(RESOURCES).unwrap());
    assert_eq!(tmpl.section("Mappings").unwrap(), Yaml::empty_mapping());
    assert_eq!(tmpl.section(UNDEFINED).unwrap(), Yaml::empty_mapping());
}

#[test]
fn section_defaults() {
    let tmpl = template("{}");
    assert_eq!(tmpl.section(VERSION).unwrap(), Yaml::Null);
    assert_eq!(tmpl.section(DESCRIPTION).unwrap(), Yaml::string("No description"));
    assert_eq!(tmpl.section(RESOURCES).unwrap(), Yaml::empty_mapping());
    assert_eq!(tmpl.section(OUTPUTS).unwrap(), Yaml::empty_mapping());
}

#[test]
fn parameters_section_is_not_accessible() {
    for tmpl in [template(WORDPRESS), template("{}")] {
        for name in [PARAMETERS, "Parameters"] {
            let err = tmpl.section(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidSection);
            assert_eq!(err.to_string(), "Section parameters can not be accessed directly.");
        }
    }
}

#[test]
fn unknown_sections() {
    let tmpl = template(WORDPRESS);
    for name in ["Conditions", "heat_template", "RESOURCES", ""] {
        let err = tmpl.section(name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSection);
        assert_eq!(err.to_string(), format!("\"{}\" is not a valid template section", name));
    }
}

#[test]
fn resource_attributes_are_translated() {
    let tmpl = template(WORDPRESS);
    let resources = tmpl.section(RESOURCES).unwrap();
    assert_eq!(
        resources,
        yaml(
            "
server:
  Type: OS::Nova::Server
  Properties:
    flavor: {get_param: flavor}
  metadata: {tier: web}
"
        )
    );
}

#[test]
fn output_attributes_are_translated() {
    let tmpl = template(WORDPRESS);
    let outputs = tmpl.section(OUTPUTS).unwrap();
    assert_eq!(
        outputs,
        yaml("{url: {Description: The site, Value: {get_attr: [server, first_address]}}}")
    );
}

#[test]
fn translation_is_idempotent() {
    let once = template(WORDPRESS).section(RESOURCES).unwrap();
    let mut doc = Mapping::new();
    doc.insert(Yaml::string(RESOURCES), once.clone());
    let twice = Template::new(Yaml::from_mapping(doc), LinkedHashMap::new())
        .unwrap()
        .section(RESOURCES)
        .unwrap();
    assert_eq!(once, twice);
}

#[test]
fn malformed_sections() {
    let err = template("outputs: {url: just a string}").section(OUTPUTS).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTemplate);

    assert_eq!(template("resources:").section(RESOURCES).unwrap(), Yaml::empty_mapping());
}

#[test]
fn malformed_resources_rejected_on_construction() {
    for input in ["resources: [server]", "resources: {server: just a string}"] {
        let err = Template::new(yaml(input), LinkedHashMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTemplate);
    }

    let tmpl = template("resources: {server: {type: OS::Nova::Server}}");
    assert!(tmpl.declares_resource("server"));
    assert!(!tmpl.declares_resource("volume"));
    assert!(!template("resources:").declares_resource("server"));
}

#[test]
fn template_must_be_a_map() {
    let err = Template::new(yaml("[a, b]"), LinkedHashMap::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTemplate);

    let empty = Template::new(Yaml::Null, LinkedHashMap::new()).unwrap();
    assert_eq!(empty.section(DESCRIPTION).unwrap(), Yaml::string(DEFAULT_DESCRIPTION));
}

#[test]
fn param_schemata_in_document_order() {
    let tmpl = template("parameters: {b: {type: string}, a: {type: number}, c: {type: json}}");
    let schemata = tmpl.param_schemata().unwrap();
    let names = schemata.keys().map(String::as_str).collect::<Vec<_>>();
    assert_eq!(names, vec!["b", "a", "c"]);

    assert!(template("parameters:").param_schemata().unwrap().is_empty());
}

#[test]
fn function_table() {
    let tmpl = template("{}");
    let names = tmpl.functions().iter().map(|(name, _)| *name).collect::<Vec<_>>();
    assert_eq!(names.len(), 15);
    for name in ["get_param", "get_attr", "get_file", "str_replace", "Fn::Select", "Fn::ResourceFacade"] {
        assert!(names.contains(&name), "{}", name);
    }
    assert_eq!(tmpl.function_kind("str_replace"), Some(FunctionKind::StrReplace));
    assert_eq!(tmpl.function_kind("Fn::Replace"), Some(FunctionKind::Replace));
    assert_eq!(tmpl.function_kind("Fn::If"), None);
}

#[test]
fn parse_builds_function_nodes() {
    let tmpl = template("{}");
    let node = tmpl.parse(&yaml("{a: {get_param: x}, b: [1, {get_file: f}], get_attr: plain}")).unwrap();

    let Node::Mapping(entries) = node else {
        panic!("expected mapping");
    };
    let a = entries.get(&Yaml::string("a")).unwrap();
    assert_eq!(a.as_function().unwrap().name(), "get_param");

    let Node::Sequence(items) = entries.get(&Yaml::string("b")).unwrap() else {
        panic!("expected sequence");
    };
    assert_eq!(items[0], Node::Scalar(Yaml::Integer(1)));
    assert_eq!(items[1].as_function().unwrap().name(), "get_file");

    // Keys are never functions, even when they match one.
    assert_eq!(
        entries.get(&Yaml::string("get_attr")).unwrap(),
        &Node::Scalar(Yaml::string("plain"))
    );
}

#[test]
fn parse_reports_nested_argument_errors() {
    let tmpl = template("{}");
    let err = tmpl.parse(&yaml("{str_replace: {template: {get_attr: [x]}, params: {}}}")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Arguments to \"get_attr\" must be of the form [resource_name, attribute, (path), ...]"
    );
}
