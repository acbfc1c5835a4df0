// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::rc::Rc;

use anyhow::{anyhow, Error};
use saphyr::YamlLoader;

use super::{Mapping, Yaml};

pub fn parse_yaml_str(input: &str) -> Result<Vec<Yaml>, Error> {
    let docs = YamlLoader::load_from_str(input)?;
    docs.iter().map(convert_node).collect()
}

fn convert_node(node: &saphyr::Yaml) -> Result<Yaml, Error> {
    match node {
        saphyr::Yaml::Real(value) => Ok(Yaml::Real(Rc::new(value.clone()))),
        saphyr::Yaml::Integer(value) => Ok(Yaml::Integer(*value)),
        saphyr::Yaml::String(value) => Ok(Yaml::String(Rc::new(value.clone()))),
        saphyr::Yaml::Boolean(value) => Ok(Yaml::Boolean(*value)),
        saphyr::Yaml::Null => Ok(Yaml::Null),
        saphyr::Yaml::Array(values) => convert_sequence(values),
        saphyr::Yaml::Hash(entries) => convert_mapping(entries),
        saphyr::Yaml::Alias(_) => Err(anyhow!("yaml aliases not supported")),
        _ => Err(anyhow!("invalid yaml value")),
    }
}

fn convert_sequence(values: &[saphyr::Yaml]) -> Result<Yaml, Error> {
    let values = values.iter().map(convert_node).collect::<Result<Vec<_>, _>>()?;
    Ok(Yaml::Array(Rc::new(values)))
}

fn convert_mapping<'a>(entries: impl IntoIterator<Item = (&'a saphyr::Yaml, &'a saphyr::Yaml)>) -> Result<Yaml, Error> {
    let mut map = Mapping::new();
    for (key, value) in entries {
        let key = convert_node(key)?;
        let value = convert_node(value)?;
        map.insert(key, value);
    }
    Ok(Yaml::Hash(Rc::new(map)))
}
