// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Functions native to the HOT dialect.

use crate::{
    cow_yaml::Yaml,
    error::{Error, Result},
    path::traverse_or_empty,
    stack::Stack,
};

use super::{resolve_string, Node};

const STR_REPLACE_PARAMS: &str = "params";
const STR_REPLACE_TEMPLATE: &str = "template";

const STR_REPLACE_EXAMPLE: &str = "str_replace:
  template: This is var1 template var2
  params:
    var1: a
    var2: string";

/// `get_param: <name>` or `get_param: [<name>, <path>...]`
#[derive(Clone, Debug, PartialEq)]
pub struct GetParam {
    pub(crate) fn_name: String,
    args: Node,
}

impl GetParam {
    pub fn new(fn_name: String, args: Node) -> GetParam {
        GetParam { fn_name, args }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let args = self.args.resolve(stack)?;

        if args.is_empty_value() {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("Function \"{}\" must have arguments", self.fn_name),
            ));
        }

        let (param_name, path) = match &args {
            Yaml::String(_) => (&args, &[][..]),
            // Not empty, checked above.
            Yaml::Array(items) => (&items[0], &items[1..]),
            _ => {
                return Err(Error::invalid_argument(
                    &self.fn_name,
                    format!("Argument to \"{}\" must be string or list", self.fn_name),
                ))
            }
        };

        let Some(param_name) = param_name.as_str() else {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("Parameter name in \"{}\" must be string", self.fn_name),
            ));
        };

        let parameter = stack.parameters().value(param_name)?;
        Ok(traverse_or_empty(&self.fn_name, &parameter, path))
    }
}

/// `get_attr: [<resource>, <attribute>, <path>...]`
#[derive(Clone, Debug, PartialEq)]
pub struct GetAtt {
    pub(crate) fn_name: String,
    resource_name: Node,
    attribute: Node,
    path_components: Vec<Node>,
}

impl GetAtt {
    pub fn parse(fn_name: String, args: Node) -> Result<GetAtt> {
        let Node::Sequence(items) = args else {
            return Err(Error::invalid_argument(
                &fn_name,
                format!("Argument to \"{}\" must be a list", fn_name),
            ));
        };

        let mut items = items.into_iter();
        let (Some(resource_name), Some(attribute)) = (items.next(), items.next()) else {
            return Err(Error::invalid_argument(
                &fn_name,
                format!(
                    "Arguments to \"{}\" must be of the form [resource_name, attribute, (path), ...]",
                    fn_name
                ),
            ));
        };

        Ok(GetAtt {
            fn_name,
            resource_name,
            attribute,
            path_components: items.collect(),
        })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let resource_name = resolve_string(
            &self.fn_name,
            &self.resource_name,
            stack,
            &format!("Resource name in \"{}\" must be a string", self.fn_name),
        )?;
        let attribute = resolve_string(
            &self.fn_name,
            &self.attribute,
            stack,
            &format!("Attribute name in \"{}\" must be a string", self.fn_name),
        )?;

        let Some(value) = stack.resource_attribute(&resource_name, &attribute) else {
            return Err(Error::InvalidTemplateReference {
                resource: resource_name,
                key: self.fn_name.clone(),
            });
        };
        if value.is_null() {
            return Ok(Yaml::empty_string());
        }

        let path = self
            .path_components
            .iter()
            .map(|component| component.resolve(stack))
            .collect::<Result<Vec<_>>>()?;
        Ok(traverse_or_empty(&self.fn_name, &value, &path))
    }
}

/// String substitution, in both the `str_replace` mapping form and the `Fn::Replace` list form.
#[derive(Clone, Debug, PartialEq)]
pub struct Replace {
    pub(crate) fn_name: String,
    mapping: Node,
    string: Node,
}

impl Replace {
    pub fn parse_mapping(fn_name: String, args: Node) -> Result<Replace> {
        let Node::Mapping(mut entries) = args else {
            return Err(Error::invalid_argument(
                &fn_name,
                format!("Arguments to \"{}\" must be a map", fn_name),
            ));
        };

        let mapping = entries.remove(&Yaml::string(STR_REPLACE_PARAMS));
        let string = entries.remove(&Yaml::string(STR_REPLACE_TEMPLATE));
        match (mapping, string) {
            (Some(mapping), Some(string)) => Ok(Replace {
                fn_name,
                mapping,
                string,
            }),
            _ => Err(Error::invalid_argument(
                &fn_name,
                format!("\"str_replace\" syntax should be {}", STR_REPLACE_EXAMPLE),
            )),
        }
    }

    pub fn parse_list(fn_name: String, args: Node) -> Result<Replace> {
        let usage = format!("Arguments to \"{}\" must be of the form [param_map, template]", fn_name);
        let [mapping, string] = super::expect_args::<2>(&fn_name, args, &usage)?;
        Ok(Replace {
            fn_name,
            mapping,
            string,
        })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let template = self.string.resolve(stack)?;
        let mapping = self.mapping.resolve(stack)?;

        let Yaml::String(template) = template else {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("\"{}\" template must be a string", self.fn_name),
            ));
        };
        let Yaml::Hash(mapping) = mapping else {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("\"{}\" params must be a map", self.fn_name),
            ));
        };

        let mut string = template.as_ref().clone();
        for (placeholder, value) in mapping.iter() {
            let Some(placeholder) = placeholder.as_str() else {
                return Err(Error::invalid_argument(
                    &self.fn_name,
                    format!("\"{}\" param placeholders must be strings", self.fn_name),
                ));
            };
            let value = match value {
                Yaml::Null => String::new(),
                _ => value.to_scalar_string().ok_or_else(|| {
                    Error::invalid_argument(
                        &self.fn_name,
                        format!("\"{}\" params must be strings or numbers", self.fn_name),
                    )
                })?,
            };
            string = string.replace(placeholder, &value);
        }

        Ok(Yaml::string(string))
    }
}

/// `get_file: <key>`, the raw content of a file shipped alongside the template.
#[derive(Clone, Debug, PartialEq)]
pub struct GetFile {
    pub(crate) fn_name: String,
    args: Node,
}

impl GetFile {
    pub fn new(fn_name: String, args: Node) -> GetFile {
        GetFile { fn_name, args }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let key = resolve_string(
            &self.fn_name,
            &self.args,
            stack,
            &format!("Argument to \"{}\" must be a string", self.fn_name),
        )?;

        match stack.template().files().get(&key) {
            Some(content) => Ok(Yaml::string(content.clone())),
            None => Err(Error::NotFound {
                fn_name: self.fn_name.clone(),
                section: "files".to_string(),
                key,
            }),
        }
    }
}
