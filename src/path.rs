// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Walks a path of keys through nested mappings and sequences.

#[cfg(test)]
mod tests;

use thiserror::Error;
use tracing::debug;

use crate::cow_yaml::Yaml;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TraversalError {
    #[error("\"{fn_name}\" can't traverse path")]
    NotTraversable { fn_name: String, type_name: &'static str },

    #[error("Path components in \"{fn_name}\" must be strings")]
    InvalidKey { fn_name: String, type_name: &'static str },

    #[error("key {key} not found")]
    MissingKey { key: String },

    #[error("list index {key} is not an integer")]
    NonIntegerIndex { key: String },

    #[error("index {index} is out of bounds")]
    OutOfBounds { index: i64 },
}

pub fn traverse(fn_name: &str, value: &Yaml, path: &[Yaml]) -> Result<Yaml, TraversalError> {
    let mut current = value.clone();
    for key in path {
        current = step(fn_name, &current, key)?;
    }
    Ok(current)
}

/// Like [`traverse`], but a path that cannot be followed resolves to an empty string.
pub fn traverse_or_empty(fn_name: &str, value: &Yaml, path: &[Yaml]) -> Yaml {
    match traverse(fn_name, value, path) {
        Ok(value) => value,
        Err(err) => {
            debug!(fn_name, error = %err, "path traversal failed, resolving to empty string");
            Yaml::empty_string()
        }
    }
}

fn step(fn_name: &str, collection: &Yaml, key: &Yaml) -> Result<Yaml, TraversalError> {
    let invalid_key = || TraversalError::InvalidKey {
        fn_name: fn_name.to_string(),
        type_name: key.type_name(),
    };

    match collection {
        Yaml::Hash(map) => {
            if !matches!(key, Yaml::String(_) | Yaml::Integer(_)) {
                return Err(invalid_key());
            }
            match map.get(key) {
                Some(value) => Ok(value.clone()),
                None => Err(TraversalError::MissingKey { key: key.to_string() }),
            }
        }
        Yaml::Array(list) => {
            let index = match key {
                Yaml::Integer(index) => *index,
                Yaml::String(_) => return Err(TraversalError::NonIntegerIndex { key: key.to_string() }),
                _ => return Err(invalid_key()),
            };

            // Negative indices count back from the end.
            let len = list.len() as i64;
            let position = if index < 0 { len + index } else { index };
            if position < 0 || position >= len {
                return Err(TraversalError::OutOfBounds { index });
            }
            Ok(list[position as usize].clone())
        }
        _ => Err(TraversalError::NotTraversable {
            fn_name: fn_name.to_string(),
            type_name: collection.type_name(),
        }),
    }
}
