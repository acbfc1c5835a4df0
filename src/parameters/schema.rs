// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    cow_yaml::Yaml,
    error::{Error, Result},
    json_parser::parse_json,
};

use super::constraints::Constraint;

pub const TYPE: &str = "type";
pub const DESCRIPTION: &str = "description";
pub const DEFAULT: &str = "default";
pub const SCHEMA: &str = "schema";
pub const CONSTRAINTS: &str = "constraints";
pub const HIDDEN: &str = "hidden";
pub const LABEL: &str = "label";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Number,
    /// `comma_delimited_list`
    List,
    /// `json`
    Map,
}

impl ParamType {
    const ALL: [ParamType; 4] = [ParamType::String, ParamType::Number, ParamType::List, ParamType::Map];

    pub fn from_name(name: &str) -> Option<ParamType> {
        Self::ALL.into_iter().find(|param_type| param_type.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::List => "comma_delimited_list",
            ParamType::Map => "json",
        }
    }

    /// Converts a raw parameter value into this type's canonical form.
    pub fn coerce(self, value: &Yaml) -> std::result::Result<Yaml, String> {
        match self {
            ParamType::String => match value {
                Yaml::Null => Ok(Yaml::empty_string()),
                Yaml::String(_) => Ok(value.clone()),
                _ => value
                    .to_scalar_string()
                    .map(Yaml::string)
                    .ok_or_else(|| format!("Value must be a string, found {}", value.type_name())),
            },
            ParamType::Number => match value {
                Yaml::Integer(_) | Yaml::Real(_) => Ok(value.clone()),
                Yaml::String(text) => parse_number(text).ok_or_else(|| format!("\"{}\" is not a number", text)),
                _ => Err(format!("Value must be a number, found {}", value.type_name())),
            },
            ParamType::List => match value {
                Yaml::Null => Ok(Yaml::from_vec(Vec::new())),
                Yaml::Array(_) => Ok(value.clone()),
                Yaml::Hash(_) => Err("Value must be a comma-delimited list string".to_string()),
                _ => {
                    let text = value.to_scalar_string().unwrap_or_default();
                    if text.is_empty() {
                        return Ok(Yaml::from_vec(Vec::new()));
                    }
                    Ok(Yaml::from_vec(text.split(',').map(Yaml::from).collect()))
                }
            },
            ParamType::Map => match value {
                Yaml::Null => Ok(Yaml::empty_mapping()),
                Yaml::Hash(_) | Yaml::Array(_) => Ok(value.clone()),
                Yaml::String(text) if text.trim().is_empty() => Ok(Yaml::empty_mapping()),
                Yaml::String(text) => match parse_json(text) {
                    Ok(parsed @ (Yaml::Hash(_) | Yaml::Array(_))) => Ok(parsed),
                    Ok(_) => Err("Value must be a JSON object or array".to_string()),
                    Err(err) => Err(format!("Value must be valid JSON: {}", err)),
                },
                _ => Err(format!("Value must be valid JSON, found {}", value.type_name())),
            },
        }
    }
}

fn parse_number(text: &str) -> Option<Yaml> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(Yaml::Integer(value));
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(Yaml::Real(text.to_string().into())),
        _ => None,
    }
}

/// Declared type, default and constraints of one template parameter.
#[derive(Clone, Debug)]
pub struct ParamSchema {
    pub param_type: ParamType,
    pub description: Option<String>,
    pub default: Option<Yaml>,
    pub schema: Option<Yaml>,
    pub constraints: Vec<Constraint>,
    pub hidden: bool,
    pub label: Option<String>,
}

impl ParamSchema {
    pub fn new(param_type: ParamType) -> ParamSchema {
        ParamSchema {
            param_type,
            description: None,
            default: None,
            schema: None,
            constraints: Vec::new(),
            hidden: false,
            label: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> ParamSchema {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Yaml) -> ParamSchema {
        self.default = Some(default);
        self
    }

    pub fn set_default(&mut self, default: Yaml) {
        self.default = Some(default);
    }

    pub fn from_yaml(raw: &Yaml) -> Result<ParamSchema> {
        if !matches!(raw, Yaml::Hash(_)) {
            return Err(Error::invalid_schema(format!(
                "Parameter schema must be a map, found {}",
                raw.type_name()
            )));
        }

        let param_type = match raw.get(TYPE) {
            None | Some(Yaml::Null) => return Err(Error::invalid_schema("Missing parameter type")),
            Some(type_name) => type_name
                .as_str()
                .and_then(ParamType::from_name)
                .ok_or_else(|| Error::invalid_schema(format!("Invalid type ({})", type_name)))?,
        };

        let mut schema = ParamSchema::new(param_type);
        schema.description = optional_string(raw, DESCRIPTION)?;
        schema.label = optional_string(raw, LABEL)?;
        schema.default = raw.get(DEFAULT).filter(|value| !value.is_null()).cloned();
        schema.schema = raw.get(SCHEMA).filter(|value| !value.is_null()).cloned();

        schema.hidden = match raw.get(HIDDEN) {
            None | Some(Yaml::Null) => false,
            Some(Yaml::Boolean(hidden)) => *hidden,
            Some(other) => {
                return Err(Error::invalid_schema(format!(
                    "\"{}\" must be a boolean, found {}",
                    HIDDEN, other
                )))
            }
        };

        match raw.get(CONSTRAINTS) {
            None | Some(Yaml::Null) => {}
            Some(Yaml::Array(entries)) => {
                for entry in entries.iter() {
                    schema.constraints.extend(Constraint::parse_list(entry, param_type)?);
                }
            }
            Some(other) => {
                return Err(Error::invalid_schema(format!(
                    "Invalid parameter constraints, expected a list, found {}",
                    other.type_name()
                )))
            }
        }

        Ok(schema)
    }

    /// Checks an already coerced value against every constraint, in order.
    pub fn validate_value(&self, value: &Yaml) -> std::result::Result<(), String> {
        for constraint in &self.constraints {
            constraint.validate(value)?;
        }
        Ok(())
    }
}

fn optional_string(raw: &Yaml, key: &str) -> Result<Option<String>> {
    match raw.get(key) {
        None | Some(Yaml::Null) => Ok(None),
        Some(value) => value
            .to_scalar_string()
            .map(Some)
            .ok_or_else(|| Error::invalid_schema(format!("\"{}\" must be a string", key))),
    }
}
