// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use regex::Regex;
use tracing::debug;

use crate::{
    cow_yaml::Yaml,
    error::{Error, Result},
};

use super::schema::ParamType;

pub const DESCRIPTION: &str = "description";
pub const RANGE: &str = "range";
pub const LENGTH: &str = "length";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const ALLOWED_VALUES: &str = "allowed_values";
pub const ALLOWED_PATTERN: &str = "allowed_pattern";
pub const CUSTOM_CONSTRAINT: &str = "custom_constraint";

#[derive(Clone, Debug)]
pub enum Constraint {
    Range {
        min: Option<f64>,
        max: Option<f64>,
        description: Option<String>,
    },
    Length {
        min: Option<f64>,
        max: Option<f64>,
        description: Option<String>,
    },
    AllowedValues {
        values: Vec<Yaml>,
        description: Option<String>,
    },
    AllowedPattern {
        pattern: String,
        regex: Regex,
        description: Option<String>,
    },
    CustomConstraint {
        name: String,
        description: Option<String>,
    },
}

impl Constraint {
    /// Builds the constraints of one `constraints` list entry. Each recognized key yields one constraint.
    pub fn parse_list(entry: &Yaml, param_type: ParamType) -> Result<Vec<Constraint>> {
        if !matches!(entry, Yaml::Hash(_)) {
            return Err(Error::invalid_schema(format!(
                "Invalid parameter constraints, expected a map, found {}",
                entry.type_name()
            )));
        }

        let description = entry.get(DESCRIPTION).and_then(Yaml::to_scalar_string);
        let mut constraints = Vec::new();

        if let Some(cdef) = entry.get(RANGE) {
            constraints.push(Constraint::Range {
                min: Self::get_num(MIN, cdef)?,
                max: Self::get_num(MAX, cdef)?,
                description: description.clone(),
            });
        }
        if let Some(cdef) = entry.get(LENGTH) {
            constraints.push(Constraint::Length {
                min: Self::get_num(MIN, cdef)?,
                max: Self::get_num(MAX, cdef)?,
                description: description.clone(),
            });
        }
        if let Some(cdef) = entry.get(ALLOWED_VALUES) {
            let Some(values) = cdef.as_vec() else {
                return Err(Error::invalid_schema(format!("\"{}\" must be a list", ALLOWED_VALUES)));
            };
            constraints.push(Constraint::AllowedValues {
                values: values.to_vec(),
                description: description.clone(),
            });
        }
        if let Some(cdef) = entry.get(ALLOWED_PATTERN) {
            let Some(pattern) = cdef.as_str() else {
                return Err(Error::invalid_schema(format!("\"{}\" must be a string", ALLOWED_PATTERN)));
            };
            let regex = Regex::new(&format!("^(?:{})$", pattern))
                .map_err(|err| Error::invalid_schema(format!("Invalid {} \"{}\": {}", ALLOWED_PATTERN, pattern, err)))?;
            constraints.push(Constraint::AllowedPattern {
                pattern: pattern.to_string(),
                regex,
                description: description.clone(),
            });
        }
        if let Some(cdef) = entry.get(CUSTOM_CONSTRAINT) {
            let Some(name) = cdef.as_str() else {
                return Err(Error::invalid_schema(format!("\"{}\" must be a string", CUSTOM_CONSTRAINT)));
            };
            constraints.push(Constraint::CustomConstraint {
                name: name.to_string(),
                description,
            });
        }

        for constraint in &constraints {
            if !constraint.valid_for(param_type) {
                return Err(Error::invalid_schema(format!(
                    "{} constraint invalid for parameter type {}",
                    constraint.name(),
                    param_type.name()
                )));
            }
        }
        Ok(constraints)
    }

    /// Reads an optional bound from a `range` or `length` definition.
    pub fn get_num(key: &str, cdef: &Yaml) -> Result<Option<f64>> {
        let value = match cdef {
            Yaml::Null => return Ok(None),
            Yaml::Hash(_) => cdef.get(key),
            _ => {
                return Err(Error::invalid_schema(format!(
                    "Constraint bounds must be a map, found {}",
                    cdef.type_name()
                )))
            }
        };

        match value {
            None | Some(Yaml::Null) => Ok(None),
            Some(Yaml::String(text)) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| Error::invalid_schema(format!("\"{}\" must be a number, found \"{}\"", key, text))),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| Error::invalid_schema(format!("\"{}\" must be a number, found {}", key, value))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Range { .. } => RANGE,
            Constraint::Length { .. } => LENGTH,
            Constraint::AllowedValues { .. } => ALLOWED_VALUES,
            Constraint::AllowedPattern { .. } => ALLOWED_PATTERN,
            Constraint::CustomConstraint { .. } => CUSTOM_CONSTRAINT,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Constraint::Range { description, .. }
            | Constraint::Length { description, .. }
            | Constraint::AllowedValues { description, .. }
            | Constraint::AllowedPattern { description, .. }
            | Constraint::CustomConstraint { description, .. } => description.as_deref(),
        }
    }

    pub fn valid_for(&self, param_type: ParamType) -> bool {
        match self {
            Constraint::Range { .. } => param_type == ParamType::Number,
            Constraint::Length { .. } => {
                matches!(param_type, ParamType::String | ParamType::List | ParamType::Map)
            }
            Constraint::AllowedValues { .. } => {
                matches!(param_type, ParamType::String | ParamType::Number | ParamType::List)
            }
            Constraint::AllowedPattern { .. } => param_type == ParamType::String,
            Constraint::CustomConstraint { .. } => true,
        }
    }

    /// Checks a coerced value. The constraint's description, when present, replaces the failure message.
    pub fn validate(&self, value: &Yaml) -> std::result::Result<(), String> {
        self.check(value)
            .map_err(|message| self.description().map_or(message, str::to_string))
    }

    fn check(&self, value: &Yaml) -> std::result::Result<(), String> {
        match self {
            Constraint::Range { min, max, .. } => {
                let Some(number) = value.as_f64() else {
                    return Err(format!("\"{}\" is not a number", value));
                };
                if out_of_range(number, *min, *max) {
                    return Err(format!(
                        "{} is out of range (min: {}, max: {})",
                        value,
                        format_bound(*min),
                        format_bound(*max)
                    ));
                }
                Ok(())
            }
            Constraint::Length { min, max, .. } => {
                let length = match value {
                    Yaml::String(text) => text.chars().count(),
                    Yaml::Array(list) => list.len(),
                    Yaml::Hash(map) => map.len(),
                    _ => return Err(format!("{} has no length", value.type_name())),
                };
                if out_of_range(length as f64, *min, *max) {
                    return Err(format!(
                        "length ({}) is out of range (min: {}, max: {})",
                        length,
                        format_bound(*min),
                        format_bound(*max)
                    ));
                }
                Ok(())
            }
            Constraint::AllowedValues { values, .. } => {
                let items = match value {
                    Yaml::Array(list) => list.as_slice(),
                    _ => std::slice::from_ref(value),
                };
                for item in items {
                    if !values.iter().any(|allowed| same_value(allowed, item)) {
                        return Err(format!(
                            "\"{}\" is not an allowed value {}",
                            item,
                            Yaml::from_vec(values.clone())
                        ));
                    }
                }
                Ok(())
            }
            Constraint::AllowedPattern { pattern, regex, .. } => {
                let text = value.to_scalar_string().unwrap_or_default();
                if !regex.is_match(&text) {
                    return Err(format!("\"{}\" does not match pattern \"{}\"", text, pattern));
                }
                Ok(())
            }
            Constraint::CustomConstraint { name, .. } => {
                debug!(constraint = name.as_str(), "no validator registered for custom constraint");
                Ok(())
            }
        }
    }
}

fn out_of_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(false, |min| value < min) || max.map_or(false, |max| value > max)
}

fn format_bound(bound: Option<f64>) -> String {
    match bound {
        None => "None".to_string(),
        Some(bound) if bound.fract() == 0.0 && bound.abs() < 1e15 => format!("{}", bound as i64),
        Some(bound) => bound.to_string(),
    }
}

// Allowed values are compared by their text, or numerically when both sides are numbers.
fn same_value(allowed: &Yaml, value: &Yaml) -> bool {
    if let (Some(a), Some(b)) = (number_of(allowed), number_of(value)) {
        return a == b;
    }
    match (allowed.to_scalar_string(), value.to_scalar_string()) {
        (Some(a), Some(b)) => a == b,
        _ => allowed == value,
    }
}

fn number_of(value: &Yaml) -> Option<f64> {
    match value {
        Yaml::Integer(_) | Yaml::Real(_) => value.as_f64(),
        _ => None,
    }
}
