use std::{fs, io, path::Path};

use pretty_assertions::assert_eq;

use super::*;

macro_rules! testlist {
    ($($name:ident,)*) => {
    $(
        #[test]
        fn $name() {
            run_test(stringify!($name))
        }
    )*
    }
}

testlist! {
    cfn_functions,
    empty_template,
    get_attr_resources,
    get_file_content,
    get_file_missing,
    invalid_parameter,
    missing_parameter,
    no_validate,
    nested_get_param,
    pseudo_parameters,
    resource_facade,
    simple_outputs,
    str_replace_output,
    unknown_parameter,
    user_parameters,
}

fn run_test(name: &str) {
    let rootdir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let test_data_dir = rootdir.join("src/process_template/tests/testdata");

    let test_file = test_data_dir.join(format!("tests/{}.yaml", name));
    let test_env_file = test_data_dir.join(format!("tests/{}-env.yaml", name));
    let expected_file = test_data_dir.join(format!("expected/{}.txt", name));
    let actual_dir = test_data_dir.join("actual");
    let actual_file = actual_dir.join(format!("{}.txt", name));

    let test = fs::read_to_string(&test_file).unwrap();
    let test_env = fs::read_to_string(&test_env_file);
    let test_env = match test_env {
        Ok(test_env) => test_env,
        Err(err) if err.kind() == io::ErrorKind::NotFound => "".to_string(),
        _ => test_env.unwrap(),
    };
    let env = StackEnvironment::from_yaml_str(&test_env).unwrap();

    let result = process_yaml_template(&test, &env);

    fs::create_dir_all(actual_dir).unwrap();
    fs::write(actual_file, format_result(&result)).unwrap();

    let expected = fs::read_to_string(expected_file).unwrap();
    match expected.strip_prefix("ERROR: ") {
        Some(message) => {
            let err = result.expect_err("expected an error");
            assert_eq!(message.trim_end(), format!("{:#}", err));
        }
        None => {
            let expected = parse_yaml_str(&expected).unwrap().remove(0);
            assert_eq!(expected, result.unwrap());
        }
    }
}

fn format_result(result: &Result<Yaml, Error>) -> String {
    match result {
        Err(err) => format!("ERROR: {:#}\n", err),
        Ok(output) => yaml_emit_to_string(&[output.clone()]).unwrap(),
    }
}

#[test]
fn environment_from_yaml() {
    let env = StackEnvironment::from_yaml_str(
        "
stack_name: teststack
stack_id: 5f1c
tenant: demo
validate: false
parameters: {flavor: m1.large, count: 3}
files: {setup.sh: echo hi}
availability_zones: [az1, az2]
resources:
  server:
    action: update
    reference_id: 9a2f
    attributes: {first_address: 10.0.0.4}
  volume: {}
parent_resource:
  metadata: {role: db}
  deletion_policy: Retain
",
    )
    .unwrap();

    assert_eq!(env.stack_identifier(), Some(StackIdentifier::new("demo", "teststack", "5f1c")));
    assert!(!env.validate);
    assert_eq!(env.parameters.get("count"), Some(&Yaml::Integer(3)));
    assert_eq!(env.files.get("setup.sh").map(String::as_str), Some("echo hi"));
    assert_eq!(env.availability_zones, Some(vec!["az1".to_string(), "az2".to_string()]));

    let server = env.resources.get("server").unwrap();
    assert_eq!(server.action, ResourceAction::Update);
    assert_eq!(server.reference_id.as_deref(), Some("9a2f"));
    assert_eq!(server.attributes.get("first_address"), Some(&Yaml::string("10.0.0.4")));
    assert_eq!(env.resources.get("volume").unwrap().action, ResourceAction::Create);

    let parent = env.parent_resource.unwrap();
    assert_eq!(parent.deletion_policy, Some(Yaml::string("Retain")));
    assert_eq!(parent.update_policy, None);
}

#[test]
fn empty_environment() {
    let env = StackEnvironment::from_yaml_str("").unwrap();
    assert_eq!(env, StackEnvironment::default());
    assert!(env.validate);
    assert_eq!(env.stack_identifier(), None);
}

#[test]
fn environment_errors() {
    let err = StackEnvironment::from_yaml_str("[a]").unwrap_err();
    assert_eq!(err.to_string(), "environment must be a map, found list");

    let err = StackEnvironment::from_yaml_str("resources: {server: {action: EXPLODE}}").unwrap_err();
    assert_eq!(
        format!("{:#}", err),
        "invalid state for resource \"server\": unknown resource action \"EXPLODE\""
    );

    assert!(StackEnvironment::from_yaml_str("a: 1\n---\nb: 2\n").is_err());
}

#[test]
fn template_must_be_single_document() {
    let err = process_yaml_template("a: 1\n---\nb: 2\n", &StackEnvironment::default()).unwrap_err();
    assert_eq!(err.to_string(), "template yaml must only have a single document");
}

#[test]
fn emitted_output_parses_back() {
    let template = "
description: Emission
outputs:
  list: {value: [1, two, {three: 3}]}
";
    let out = process_yaml_template_str(template, &StackEnvironment::default()).unwrap();
    let parsed = parse_yaml_str(&out).unwrap().remove(0);
    assert_eq!(parsed, process_yaml_template(template, &StackEnvironment::default()).unwrap());
}
