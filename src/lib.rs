// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Resolution of HOT (Heat Orchestration Template) documents: section access,
//! CFN name translation, parameters and intrinsic functions.

pub mod cow_yaml;
pub mod error;
pub mod function;
pub mod json_parser;
pub mod parameters;
pub mod path;
pub mod process_template;
pub mod stack;
pub mod template;
pub mod yaml_utils;

pub use cow_yaml::Yaml;
pub use error::{Error, ErrorKind, Result};
pub use function::{Function, FunctionKind, Node};
pub use parameters::{ParamSchema, ParamType, Parameter, Parameters};
pub use process_template::{process_yaml_template, process_yaml_template_str, StackEnvironment};
pub use stack::{ResourceAction, ResourceState, Stack, StackIdentifier, StackState};
pub use template::Template;
