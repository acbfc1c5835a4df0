// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fs, path::Path};

use anyhow::{Context, Error};
use saphyr::YamlEmitter;

use crate::cow_yaml::{parse_yaml_str, Yaml};

pub fn yaml_emit_to_string(docs: &[Yaml]) -> Result<String, Error> {
    let mut out_str = String::new();
    let mut emitter = YamlEmitter::new(&mut out_str);
    for doc in docs {
        emitter.dump(&to_saphyr(doc))?;
    }
    out_str.push('\n');
    Ok(out_str)
}

pub fn yaml_emit_to_file(docs: &[Yaml], filename: &Path) -> Result<(), Error> {
    let out = yaml_emit_to_string(docs)?;
    fs::write(filename, out).with_context(|| format!("failed to write {}", filename.display()))?;
    Ok(())
}

pub fn yaml_load_from_file(filename: &Path) -> Result<Vec<Yaml>, Error> {
    let input = fs::read_to_string(filename).with_context(|| format!("failed to read {}", filename.display()))?;
    let docs = parse_yaml_str(&input).with_context(|| format!("failed to parse {}", filename.display()))?;
    Ok(docs)
}

fn to_saphyr(value: &Yaml) -> saphyr::Yaml {
    match value {
        Yaml::Real(value) => saphyr::Yaml::Real(value.as_ref().clone()),
        Yaml::Integer(value) => saphyr::Yaml::Integer(*value),
        Yaml::String(value) => saphyr::Yaml::String(value.as_ref().clone()),
        Yaml::Boolean(value) => saphyr::Yaml::Boolean(*value),
        Yaml::Array(values) => saphyr::Yaml::Array(values.iter().map(to_saphyr).collect()),
        Yaml::Hash(entries) => saphyr::Yaml::Hash(
            entries
                .iter()
                .map(|(key, value)| (to_saphyr(key), to_saphyr(value)))
                .collect(),
        ),
        Yaml::Null => saphyr::Yaml::Null,
    }
}
