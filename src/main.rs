// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod variable_arg;

use std::{fs, path::PathBuf};

use anyhow::{Context, Error};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hotresolve::{
    process_yaml_template,
    yaml_utils::{yaml_emit_to_file, yaml_emit_to_string},
    StackEnvironment,
};
use variable_arg::{VariableArg, VariableValue};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();

    let template_path = matches
        .get_one::<PathBuf>("template")
        .context("missing template argument")?;
    let template_string = fs::read_to_string(template_path)
        .with_context(|| format!("failed to read template {}", template_path.display()))?;

    let env = build_environment(&matches)?;
    info!(template = %template_path.display(), "resolving template");
    let result = process_yaml_template(&template_string, &env)?;

    match matches.get_one::<PathBuf>("output") {
        Some(output) => yaml_emit_to_file(&[result], output)?,
        None => print!("{}", yaml_emit_to_string(&[result])?),
    }
    Ok(())
}

fn command() -> Command {
    Command::new("hotresolve")
        .about("Resolves the outputs of a HOT template")
        .arg(
            Arg::new("template")
                .help("Template file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("env")
                .help("Environment file: parameters, files and resource states")
                .short('e')
                .long("env")
                .value_name("ENV")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("param")
                .help("Parameter value, as a string")
                .short('p')
                .long("param")
                .value_name("NAME=VALUE")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("yaml-param")
                .help("Parameter value, parsed as YAML")
                .short('y')
                .long("yaml-param")
                .value_name("NAME=YAML")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("file")
                .help("File made available to get_file under KEY")
                .short('f')
                .long("file")
                .value_name("KEY=PATH")
                .action(ArgAction::Append),
        )
        .arg(Arg::new("stack-name").long("stack-name").value_name("NAME"))
        .arg(Arg::new("stack-id").long("stack-id").value_name("ID"))
        .arg(Arg::new("region").long("region").value_name("REGION"))
        .arg(
            Arg::new("no-validate")
                .help("Skip parameter constraint checks")
                .long("no-validate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .help("Output file (default: stdout)")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn build_environment(matches: &ArgMatches) -> Result<StackEnvironment, Error> {
    let mut env = match matches.get_one::<PathBuf>("env") {
        Some(path) => {
            let input = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            StackEnvironment::from_yaml_str(&input).with_context(|| format!("invalid environment {}", path.display()))?
        }
        None => StackEnvironment::default(),
    };

    // -p and -y are applied in command line order.
    let mut vars = variable_args(matches, "param", VariableValue::String)?;
    vars.extend(variable_args(matches, "yaml-param", VariableValue::Yaml)?);
    vars.sort();
    for var in vars {
        let value = var.value.to_yaml()?;
        env.parameters.insert(var.name, value);
    }

    for file in variable_args(matches, "file", VariableValue::String)? {
        let VariableValue::String(path) = file.value else {
            continue;
        };
        let content = fs::read_to_string(&path).with_context(|| format!("failed to read file {}", path))?;
        env.files.insert(file.name, content);
    }

    if let Some(stack_name) = matches.get_one::<String>("stack-name") {
        env.stack_name = Some(stack_name.clone());
    }
    if let Some(stack_id) = matches.get_one::<String>("stack-id") {
        env.stack_id = Some(stack_id.clone());
    }
    if let Some(region) = matches.get_one::<String>("region") {
        env.region = Some(region.clone());
    }
    if matches.get_flag("no-validate") {
        env.validate = false;
    }

    Ok(env)
}

fn variable_args(matches: &ArgMatches, id: &str, value: fn(String) -> VariableValue) -> Result<Vec<VariableArg>, Error> {
    let (Some(indices), Some(args)) = (matches.indices_of(id), matches.get_many::<String>(id)) else {
        return Ok(Vec::new());
    };
    indices
        .zip(args)
        .map(|(index, arg)| VariableArg::parse(index, arg, value))
        .collect()
}
