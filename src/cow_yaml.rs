// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Provides copy-on-write variant of a YAML object.

mod loader;

use std::{fmt, rc::Rc};

use hashlink::LinkedHashMap;

pub use loader::parse_yaml_str;

pub type Mapping = LinkedHashMap<Yaml, Yaml>;

#[derive(Clone, PartialEq, PartialOrd, Debug, Eq, Ord, Hash)]
pub enum Yaml {
    // Numbers that don't fit in an i64 (e.g. floating point).
    Real(Rc<String>),
    Integer(i64),
    String(Rc<String>),
    Boolean(bool),
    Array(Rc<Vec<Yaml>>),
    Hash(Rc<Mapping>),
    Null,
}

impl Yaml {
    pub fn string(value: impl Into<String>) -> Yaml {
        Yaml::String(Rc::new(value.into()))
    }

    pub fn empty_string() -> Yaml {
        Yaml::string(String::new())
    }

    pub fn empty_mapping() -> Yaml {
        Yaml::Hash(Rc::new(Mapping::new()))
    }

    pub fn from_mapping(map: Mapping) -> Yaml {
        Yaml::Hash(Rc::new(map))
    }

    pub fn from_vec(values: Vec<Yaml>) -> Yaml {
        Yaml::Array(Rc::new(values))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Yaml::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Yaml::Hash(map) => Some(map.as_ref()),
            _ => None,
        }
    }

    pub fn as_vec(&self) -> Option<&[Yaml]> {
        match self {
            Yaml::Array(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Yaml::Integer(value) => Some(*value as f64),
            Yaml::Real(value) => value.parse().ok(),
            _ => None,
        }
    }

    /// Looks up a string key in a mapping. Returns `None` for non-mappings.
    pub fn get(&self, key: &str) -> Option<&Yaml> {
        self.as_mapping()?.get(&Yaml::string(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Yaml::Null)
    }

    /// True for values that carry nothing: null, empty strings and collections, zero and false.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Yaml::Null => true,
            Yaml::Boolean(value) => !value,
            Yaml::Integer(value) => *value == 0,
            Yaml::Real(value) => value.parse::<f64>().map_or(false, |value| value == 0.0),
            Yaml::String(value) => value.is_empty(),
            Yaml::Array(list) => list.is_empty(),
            Yaml::Hash(map) => map.is_empty(),
        }
    }

    /// Text form of a scalar. Collections and null have none.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Yaml::String(value) => Some(value.as_ref().clone()),
            Yaml::Integer(value) => Some(value.to_string()),
            Yaml::Real(value) => Some(value.as_ref().clone()),
            Yaml::Boolean(value) => Some(value.to_string()),
            Yaml::Array(_) | Yaml::Hash(_) | Yaml::Null => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Yaml::Real(_) => "number",
            Yaml::Integer(_) => "integer",
            Yaml::String(_) => "string",
            Yaml::Boolean(_) => "bool",
            Yaml::Array(_) => "list",
            Yaml::Hash(_) => "map",
            Yaml::Null => "null",
        }
    }
}

impl From<&str> for Yaml {
    fn from(value: &str) -> Self {
        Yaml::string(value)
    }
}

impl From<String> for Yaml {
    fn from(value: String) -> Self {
        Yaml::string(value)
    }
}

impl From<i64> for Yaml {
    fn from(value: i64) -> Self {
        Yaml::Integer(value)
    }
}

// Flow-style rendering, used in error and log messages.
impl fmt::Display for Yaml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yaml::Real(value) => f.write_str(value),
            Yaml::Integer(value) => write!(f, "{}", value),
            Yaml::String(value) => f.write_str(value),
            Yaml::Boolean(value) => write!(f, "{}", value),
            Yaml::Null => f.write_str("null"),
            Yaml::Array(list) => {
                f.write_str("[")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Yaml::Hash(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}
