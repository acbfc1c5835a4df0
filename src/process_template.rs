// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use anyhow::{anyhow, Context, Error};
use hashlink::LinkedHashMap;
use tracing::debug;

use crate::{
    cow_yaml::{parse_yaml_str, Mapping, Yaml},
    stack::{ResourceAction, ResourceState, Stack, StackIdentifier, StackState},
    template::{Template, DESCRIPTION},
    yaml_utils::yaml_emit_to_string,
};

pub const RESULT_DESCRIPTION: &str = "description";
pub const RESULT_OUTPUTS: &str = "outputs";

/// Everything a template is resolved against, besides the template itself.
#[derive(Clone, Debug, PartialEq)]
pub struct StackEnvironment {
    pub stack_name: Option<String>,
    pub stack_id: Option<String>,
    pub tenant: Option<String>,
    pub region: Option<String>,
    pub validate: bool,
    pub parameters: LinkedHashMap<String, Yaml>,
    pub files: LinkedHashMap<String, String>,
    pub availability_zones: Option<Vec<String>>,
    pub resources: LinkedHashMap<String, ResourceState>,
    pub parent_resource: Option<ResourceState>,
}

impl Default for StackEnvironment {
    fn default() -> Self {
        StackEnvironment {
            stack_name: None,
            stack_id: None,
            tenant: None,
            region: None,
            validate: true,
            parameters: LinkedHashMap::new(),
            files: LinkedHashMap::new(),
            availability_zones: None,
            resources: LinkedHashMap::new(),
            parent_resource: None,
        }
    }
}

impl StackEnvironment {
    pub fn from_yaml_str(input: &str) -> Result<StackEnvironment, Error> {
        let docs = parse_yaml_str(input)?;
        match &docs[..] {
            [] => Ok(StackEnvironment::default()),
            [doc] => StackEnvironment::from_yaml(doc),
            _ => Err(anyhow!("environment yaml must only have a single document")),
        }
    }

    pub fn from_yaml(doc: &Yaml) -> Result<StackEnvironment, Error> {
        let mut env = StackEnvironment::default();
        if doc.is_null() {
            return Ok(env);
        }
        if doc.as_mapping().is_none() {
            return Err(anyhow!("environment must be a map, found {}", doc.type_name()));
        }

        env.stack_name = optional_string(doc, "stack_name")?;
        env.stack_id = optional_string(doc, "stack_id")?;
        env.tenant = optional_string(doc, "tenant")?;
        env.region = optional_string(doc, "region")?;

        env.validate = match doc.get("validate") {
            None | Some(Yaml::Null) => true,
            Some(Yaml::Boolean(validate)) => *validate,
            Some(other) => return Err(anyhow!("\"validate\" must be a boolean, found {}", other)),
        };

        for (name, value) in string_keyed(doc, "parameters")? {
            env.parameters.insert(name, value.clone());
        }

        for (key, content) in string_keyed(doc, "files")? {
            let content = content
                .to_scalar_string()
                .ok_or_else(|| anyhow!("content of file \"{}\" must be a string", key))?;
            env.files.insert(key, content);
        }

        if let Some(zones) = doc.get("availability_zones").filter(|zones| !zones.is_null()) {
            let zones = zones
                .as_vec()
                .ok_or_else(|| anyhow!("\"availability_zones\" must be a list"))?
                .iter()
                .map(|zone| zone.to_scalar_string().ok_or_else(|| anyhow!("availability zones must be strings")))
                .collect::<Result<Vec<_>, _>>()?;
            env.availability_zones = Some(zones);
        }

        for (name, state) in string_keyed(doc, "resources")? {
            let state = resource_state(state).with_context(|| format!("invalid state for resource \"{}\"", name))?;
            env.resources.insert(name, state);
        }

        if let Some(parent) = doc.get("parent_resource").filter(|parent| !parent.is_null()) {
            let state = parent_resource_state(parent).context("invalid parent_resource")?;
            env.parent_resource = Some(state);
        }

        Ok(env)
    }

    /// The stack identifier, when a stack name or id is known.
    pub fn stack_identifier(&self) -> Option<StackIdentifier> {
        if self.stack_name.is_none() && self.stack_id.is_none() {
            return None;
        }
        Some(StackIdentifier::new(
            self.tenant.clone().unwrap_or_default(),
            self.stack_name.clone().unwrap_or_default(),
            self.stack_id.clone().unwrap_or_default(),
        ))
    }
}

fn optional_string(doc: &Yaml, key: &str) -> Result<Option<String>, Error> {
    match doc.get(key) {
        None | Some(Yaml::Null) => Ok(None),
        Some(value) => value
            .to_scalar_string()
            .map(Some)
            .ok_or_else(|| anyhow!("\"{}\" must be a string", key)),
    }
}

// Entries of an optional map whose keys must be strings.
fn string_keyed<'a>(doc: &'a Yaml, key: &str) -> Result<Vec<(String, &'a Yaml)>, Error> {
    let entries = match doc.get(key) {
        None | Some(Yaml::Null) => return Ok(Vec::new()),
        Some(Yaml::Hash(entries)) => entries,
        Some(other) => return Err(anyhow!("\"{}\" must be a map, found {}", key, other.type_name())),
    };

    entries
        .iter()
        .map(|(name, value)| match name.to_scalar_string() {
            Some(name) => Ok((name, value)),
            None => Err(anyhow!("keys of \"{}\" must be strings", key)),
        })
        .collect()
}

fn resource_state(doc: &Yaml) -> Result<ResourceState, Error> {
    let action = match optional_string(doc, "action")? {
        None => ResourceAction::Create,
        Some(name) => ResourceAction::from_name(&name).ok_or_else(|| anyhow!("unknown resource action \"{}\"", name))?,
    };

    let mut state = ResourceState::new(action);
    state.reference_id = optional_string(doc, "reference_id")?;
    for (name, value) in string_keyed(doc, "attributes")? {
        state.attributes.insert(name, value.clone());
    }
    Ok(state)
}

fn parent_resource_state(doc: &Yaml) -> Result<ResourceState, Error> {
    if doc.as_mapping().is_none() {
        return Err(anyhow!("must be a map, found {}", doc.type_name()));
    }

    let mut state = ResourceState::new(ResourceAction::Create);
    if let Some(metadata) = doc.get("metadata").filter(|metadata| !metadata.is_null()) {
        state.metadata = metadata.clone();
    }
    state.update_policy = doc.get("update_policy").filter(|policy| !policy.is_null()).cloned();
    state.deletion_policy = doc.get("deletion_policy").filter(|policy| !policy.is_null()).cloned();
    Ok(state)
}

pub fn process_yaml_template_str(template_string: &str, env: &StackEnvironment) -> Result<String, Error> {
    let doc = process_yaml_template(template_string, env)?;
    let out_str = yaml_emit_to_string(&[doc])?;
    Ok(out_str)
}

/// Resolves the outputs of a template.
///
/// The result is a map with the template's description and the resolved value of each output.
pub fn process_yaml_template(template_string: &str, env: &StackEnvironment) -> Result<Yaml, Error> {
    let docs = parse_yaml_str(template_string)?;
    let doc = match &docs[..] {
        [] => Yaml::Null,
        [doc] => doc.clone(),
        _ => return Err(anyhow!("template yaml must only have a single document")),
    };

    let template = Template::new(doc, env.files.clone())?;
    let stack_identifier = env.stack_identifier();
    let mut parameters = template.parameters(stack_identifier.as_ref(), &env.parameters, env.validate)?;
    if let Some(region) = &env.region {
        parameters.set_region(region);
    }

    let mut stack = StackState::new(template, parameters);
    for (name, state) in env.resources.iter() {
        stack = stack.with_resource(name.clone(), state.clone());
    }
    if let Some(zones) = &env.availability_zones {
        stack = stack.with_availability_zones(zones.clone());
    }
    if let Some(parent) = &env.parent_resource {
        stack = stack.with_parent_resource(parent.clone());
    }

    let description = stack.template().section(DESCRIPTION)?;
    let outputs = stack.outputs()?;
    debug!(outputs = outputs.len(), "resolved template outputs");

    let mut result = Mapping::new();
    result.insert(Yaml::string(RESULT_DESCRIPTION), description);
    result.insert(Yaml::string(RESULT_OUTPUTS), Yaml::from_mapping(outputs));
    Ok(Yaml::from_mapping(result))
}
