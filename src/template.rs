// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! HOT template documents: section access, translation of CFN names and the
//! function table used to parse template values.

#[cfg(test)]
mod tests;

use hashlink::LinkedHashMap;
use tracing::trace;

use crate::{
    cow_yaml::{Mapping, Yaml},
    error::{Error, Result},
    function::{FunctionKind, Node},
    parameters::{ParamSchema, Parameters},
    stack::StackIdentifier,
};

pub const VERSION: &str = "heat_template_version";
pub const DESCRIPTION: &str = "description";
pub const PARAMETER_GROUPS: &str = "parameter_groups";
pub const PARAMETERS: &str = "parameters";
pub const RESOURCES: &str = "resources";
pub const OUTPUTS: &str = "outputs";
pub const UNDEFINED: &str = "__undefined__";

pub const SECTIONS: &[&str] = &[
    VERSION,
    DESCRIPTION,
    PARAMETER_GROUPS,
    PARAMETERS,
    RESOURCES,
    OUTPUTS,
    UNDEFINED,
];

pub const SECTIONS_NO_DIRECT_ACCESS: &[&str] = &[PARAMETERS];

pub const DEFAULT_DESCRIPTION: &str = "No description";

pub const RESOURCE_TYPE: &str = "Type";
pub const RESOURCE_PROPERTIES: &str = "Properties";
pub const OUTPUT_DESCRIPTION: &str = "Description";
pub const OUTPUT_VALUE: &str = "Value";

const CFN_TO_HOT_SECTIONS: &[(&str, &str)] = &[
    ("AWSTemplateFormatVersion", VERSION),
    ("Description", DESCRIPTION),
    ("Parameters", PARAMETERS),
    ("Mappings", UNDEFINED),
    ("Resources", RESOURCES),
    ("Outputs", OUTPUTS),
];

const HOT_TO_CFN_RESOURCE_ATTRS: &[(&str, &str)] = &[("type", RESOURCE_TYPE), ("properties", RESOURCE_PROPERTIES)];

const HOT_TO_CFN_OUTPUT_ATTRS: &[(&str, &str)] = &[("description", OUTPUT_DESCRIPTION), ("value", OUTPUT_VALUE)];

pub const FUNCTIONS: &[(&str, FunctionKind)] = &[
    ("Fn::FindInMap", FunctionKind::FindInMap),
    ("Fn::GetAZs", FunctionKind::GetAZs),
    ("get_param", FunctionKind::GetParam),
    ("get_resource", FunctionKind::ResourceRef),
    ("Ref", FunctionKind::Ref),
    ("get_attr", FunctionKind::GetAtt),
    ("Fn::Select", FunctionKind::Select),
    ("Fn::Join", FunctionKind::Join),
    ("Fn::Split", FunctionKind::Split),
    ("str_replace", FunctionKind::StrReplace),
    ("Fn::Replace", FunctionKind::Replace),
    ("Fn::Base64", FunctionKind::Base64),
    ("Fn::MemberListToMap", FunctionKind::MemberListToMap),
    ("Fn::ResourceFacade", FunctionKind::ResourceFacade),
    ("get_file", FunctionKind::GetFile),
];

pub fn translate<'a>(name: &'a str, table: &[(&str, &'a str)], default: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(default, |(_, to)| *to)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    doc: Yaml,
    files: LinkedHashMap<String, String>,
}

impl Template {
    pub fn new(doc: Yaml, files: LinkedHashMap<String, String>) -> Result<Template> {
        let doc = match doc {
            Yaml::Hash(_) => doc,
            Yaml::Null => Yaml::empty_mapping(),
            _ => {
                return Err(Error::invalid_template(format!(
                    "The template must be a map, found {}",
                    doc.type_name()
                )))
            }
        };
        translate_entries(RESOURCES, doc.get(RESOURCES), HOT_TO_CFN_RESOURCE_ATTRS)?;
        Ok(Template { doc, files })
    }

    /// Whether the `resources` section names this resource.
    pub fn declares_resource(&self, resource_name: &str) -> bool {
        self.doc
            .get(RESOURCES)
            .and_then(|resources| resources.get(resource_name))
            .is_some()
    }

    pub fn files(&self) -> &LinkedHashMap<String, String> {
        &self.files
    }

    /// Gets a section of the template, by its HOT or CFN name.
    pub fn section(&self, name: &str) -> Result<Yaml> {
        let section = translate(name, CFN_TO_HOT_SECTIONS, name);

        if !SECTIONS.contains(&section) {
            return Err(Error::InvalidSection {
                section: section.to_string(),
            });
        }
        if SECTIONS_NO_DIRECT_ACCESS.contains(&section) {
            return Err(Error::SectionAccessDenied {
                section: section.to_string(),
            });
        }

        match section {
            VERSION => Ok(self.doc.get(VERSION).cloned().unwrap_or(Yaml::Null)),
            UNDEFINED => Ok(Yaml::empty_mapping()),
            DESCRIPTION => Ok(self
                .doc
                .get(DESCRIPTION)
                .cloned()
                .unwrap_or_else(|| Yaml::string(DEFAULT_DESCRIPTION))),
            RESOURCES => translate_entries(RESOURCES, self.doc.get(RESOURCES), HOT_TO_CFN_RESOURCE_ATTRS),
            OUTPUTS => translate_entries(OUTPUTS, self.doc.get(OUTPUTS), HOT_TO_CFN_OUTPUT_ATTRS),
            _ => Ok(self.doc.get(section).cloned().unwrap_or_else(Yaml::empty_mapping)),
        }
    }

    pub fn param_schemata(&self) -> Result<LinkedHashMap<String, ParamSchema>> {
        let mut schemata = LinkedHashMap::new();
        let params = match self.doc.get(PARAMETERS) {
            None | Some(Yaml::Null) => return Ok(schemata),
            Some(Yaml::Hash(params)) => params,
            Some(other) => {
                return Err(Error::invalid_template(format!(
                    "The \"{}\" section must be a map, found {}",
                    PARAMETERS,
                    other.type_name()
                )))
            }
        };

        for (name, schema) in params.iter() {
            let Some(name) = name.as_str() else {
                return Err(Error::invalid_template(format!("Parameter name {} must be a string", name)));
            };
            schemata.insert(name.to_string(), ParamSchema::from_yaml(schema)?);
        }
        Ok(schemata)
    }

    pub fn parameters(
        &self,
        stack_identifier: Option<&StackIdentifier>,
        user_params: &LinkedHashMap<String, Yaml>,
        validate_value: bool,
    ) -> Result<Parameters> {
        Parameters::new(stack_identifier, self, user_params, validate_value)
    }

    pub fn functions(&self) -> &'static [(&'static str, FunctionKind)] {
        FUNCTIONS
    }

    pub fn function_kind(&self, name: &str) -> Option<FunctionKind> {
        FUNCTIONS.iter().find(|(fn_name, _)| *fn_name == name).map(|(_, kind)| *kind)
    }

    /// Parses a raw template value into a function tree.
    ///
    /// A mapping with exactly one key naming a function becomes that function,
    /// with its value parsed as the arguments. Mapping keys are never parsed.
    pub fn parse(&self, raw: &Yaml) -> Result<Node> {
        match raw {
            Yaml::Array(items) => {
                let items = items.iter().map(|item| self.parse(item)).collect::<Result<Vec<_>>>()?;
                Ok(Node::Sequence(items))
            }
            Yaml::Hash(map) => {
                if map.len() == 1 {
                    if let Some((Yaml::String(key), value)) = map.iter().next() {
                        if let Some(kind) = self.function_kind(key) {
                            let args = self.parse(value)?;
                            let function = kind.construct(key, args)?;
                            trace!(function = key.as_str(), "parsed function");
                            return Ok(Node::Function(Box::new(function)));
                        }
                    }
                }

                let mut entries = LinkedHashMap::new();
                for (key, value) in map.iter() {
                    entries.insert(key.clone(), self.parse(value)?);
                }
                Ok(Node::Mapping(entries))
            }
            _ => Ok(Node::Scalar(raw.clone())),
        }
    }
}

// Renames the attributes of each entry of the resources or outputs section.
fn translate_entries(section: &str, entries: Option<&Yaml>, table: &[(&str, &'static str)]) -> Result<Yaml> {
    let entries = match entries {
        None | Some(Yaml::Null) => return Ok(Yaml::empty_mapping()),
        Some(Yaml::Hash(entries)) => entries,
        Some(other) => {
            return Err(Error::invalid_template(format!(
                "The \"{}\" section must be a map, found {}",
                section,
                other.type_name()
            )))
        }
    };

    let mut translated = Mapping::new();
    for (name, attrs) in entries.iter() {
        let Some(attrs) = attrs.as_mapping() else {
            return Err(Error::invalid_template(format!(
                "Each entry of \"{}\" must be a map, \"{}\" is a {}",
                section,
                name,
                attrs.type_name()
            )));
        };

        let mut entry = Mapping::new();
        for (attr, value) in attrs.iter() {
            let attr = match attr.as_str() {
                Some(attr) => Yaml::string(translate(attr, table, attr)),
                None => attr.clone(),
            };
            entry.insert(attr, value.clone());
        }
        translated.insert(name.clone(), Yaml::from_mapping(entry));
    }
    Ok(Yaml::from_mapping(translated))
}
