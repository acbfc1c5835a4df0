// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::cmp::Ordering;

use anyhow::{anyhow, Context, Error};
use hotresolve::{cow_yaml::parse_yaml_str, Yaml};

pub enum VariableValue {
    String(String),
    Yaml(String),
}

impl VariableValue {
    pub fn to_yaml(&self) -> Result<Yaml, Error> {
        match self {
            VariableValue::String(value) => Ok(Yaml::string(value.as_str())),
            VariableValue::Yaml(value) => {
                let docs = parse_yaml_str(value).with_context(|| format!("invalid yaml value \"{}\"", value))?;
                match docs.into_iter().next() {
                    Some(doc) => Ok(doc),
                    None => Ok(Yaml::Null),
                }
            }
        }
    }
}

// Used to sort args from clap.
pub struct VariableArg {
    pub index: usize,
    pub name: String,
    pub value: VariableValue,
}

impl VariableArg {
    /// Splits a `NAME=VALUE` argument.
    pub fn parse(index: usize, arg: &str, value: fn(String) -> VariableValue) -> Result<VariableArg, Error> {
        let (name, rest) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected NAME=VALUE, found \"{}\"", arg))?;
        if name.is_empty() {
            return Err(anyhow!("missing name in \"{}\"", arg));
        }
        Ok(VariableArg {
            index,
            name: name.to_string(),
            value: value(rest.to_string()),
        })
    }
}

impl PartialEq for VariableArg {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl PartialOrd for VariableArg {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariableArg {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl Eq for VariableArg {}
