use pretty_assertions::assert_eq;

use super::*;
use crate::{cow_yaml::parse_yaml_str, error::ErrorKind};

fn yaml(input: &str) -> Yaml {
    parse_yaml_str(input).unwrap().remove(0)
}

fn stack_state(input: &str) -> StackState {
    let template = Template::new(yaml(input), LinkedHashMap::new()).unwrap();
    let parameters = template.parameters(None, &LinkedHashMap::new(), true).unwrap();
    StackState::new(template, parameters)
}

const TEMPLATE: &str = "
heat_template_version: 2013-05-23
parameters:
  greeting:
    type: string
    default: hello
resources:
  web:
    type: OS::Nova::Server
outputs:
  message:
    value: {str_replace: {template: greeting world, params: {greeting: {get_param: greeting}}}}
  address:
    description: Web server address
    value: {get_attr: [web, first_address]}
  note:
    description: No value here
";

#[test]
fn action_names() {
    assert_eq!(ResourceAction::from_name("create"), Some(ResourceAction::Create));
    assert_eq!(ResourceAction::from_name("ROLLBACK"), Some(ResourceAction::Rollback));
    assert_eq!(ResourceAction::from_name("DESTROY"), None);
    assert!(ResourceAction::Resume.attributes_available());
    assert!(!ResourceAction::Delete.attributes_available());
    assert!(!ResourceAction::Init.attributes_available());
}

#[test]
fn outputs_before_resources_exist() {
    let stack = stack_state(TEMPLATE);
    let outputs = stack.outputs().unwrap();
    assert_eq!(
        Yaml::from_mapping(outputs),
        yaml("{message: hello world, address: '', note: null}")
    );
}

#[test]
fn outputs_with_resource_state() {
    let stack = stack_state(TEMPLATE).with_resource(
        "web",
        ResourceState::new(ResourceAction::Create).with_attribute("first_address", Yaml::string("10.0.0.4")),
    );
    let outputs = stack.outputs().unwrap();
    assert_eq!(outputs.get(&Yaml::string("address")), Some(&Yaml::string("10.0.0.4")));
}

#[test]
fn references_default_to_resource_name() {
    let stack = stack_state(TEMPLATE);
    assert_eq!(stack.resource_reference("web"), Some("web".to_string()));
    assert_eq!(stack.resource_reference("db"), None);
    assert_eq!(stack.resource_attribute("web", "first_address"), Some(Yaml::Null));
    assert_eq!(stack.resource_attribute("db", "first_address"), None);

    let stack = stack.with_resource("web", ResourceState::new(ResourceAction::Create).with_reference_id("abc"));
    assert_eq!(stack.resource_reference("web"), Some("abc".to_string()));
}

#[test]
fn defaults_for_plain_stacks() {
    let stack = stack_state("{}");
    assert_eq!(stack.availability_zones(), vec!["nova".to_string()]);
    assert!(stack.parent_resource().is_none());
}

#[test]
fn output_errors_propagate() {
    let stack = stack_state("outputs: {bad: {value: {get_file: missing}}}");
    assert_eq!(stack.outputs().unwrap_err().kind(), ErrorKind::NotFound);
}
