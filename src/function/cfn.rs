// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Functions carried over from the CloudFormation-compatible dialect and
// registered unchanged in the HOT function table.

use std::collections::BTreeMap;

use hashlink::LinkedHashMap;

use crate::{
    cow_yaml::{Mapping, Yaml},
    error::{Error, Result},
    json_parser::parse_json,
    stack::Stack,
};

use super::{expect_args, resolve_string, Node};

const MEMBER_LIST_EXAMPLE: &str =
    r#"{"Fn::MemberListToMap": ["Name", "Value", [".member.0.Name=key", ".member.0.Value=door"]]}"#;

const MEMBER_PREFIX: &str = ".member.";

const DEFAULT_DELETION_POLICY: &str = "Delete";

/// `Fn::FindInMap: [<map>, <key>, <value>]`, a lookup in the template's `Mappings` section.
#[derive(Clone, Debug, PartialEq)]
pub struct FindInMap {
    pub(crate) fn_name: String,
    map_name: Node,
    key: Node,
    value: Node,
}

impl FindInMap {
    pub fn parse(fn_name: String, args: Node) -> Result<FindInMap> {
        let usage = format!("Arguments to \"{}\" must be of the form [map_name, key, value]", fn_name);
        let [map_name, key, value] = expect_args::<3>(&fn_name, args, &usage)?;
        Ok(FindInMap {
            fn_name,
            map_name,
            key,
            value,
        })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let map_name = self.map_name.resolve(stack)?;
        let key = self.key.resolve(stack)?;
        let value = self.value.resolve(stack)?;

        let mappings = stack.template().section("Mappings")?;
        let found = mappings
            .as_mapping()
            .and_then(|maps| maps.get(&map_name))
            .and_then(|map| map.as_mapping()?.get(&key))
            .and_then(|entry| entry.as_mapping()?.get(&value));

        match found {
            Some(found) => Ok(found.clone()),
            None => Err(Error::NotFound {
                fn_name: self.fn_name.clone(),
                section: "Mappings".to_string(),
                key: format!("{}.{}.{}", map_name, key, value),
            }),
        }
    }
}

/// `Fn::GetAZs: <region>`. The region is accepted but not used for scoping.
#[derive(Clone, Debug, PartialEq)]
pub struct GetAZs {
    pub(crate) fn_name: String,
    #[allow(dead_code)]
    args: Node,
}

impl GetAZs {
    pub fn new(fn_name: String, args: Node) -> GetAZs {
        GetAZs { fn_name, args }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let zones = stack.availability_zones().into_iter().map(Yaml::from).collect();
        Ok(Yaml::from_vec(zones))
    }
}

/// `get_resource: <name>`, the reference id of a resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceRef {
    pub(crate) fn_name: String,
    args: Node,
}

impl ResourceRef {
    pub fn new(fn_name: String, args: Node) -> ResourceRef {
        ResourceRef { fn_name, args }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let resource_name = resolve_string(
            &self.fn_name,
            &self.args,
            stack,
            &format!("Argument to \"{}\" must be a string", self.fn_name),
        )?;
        reference_id(&self.fn_name, resource_name, stack)
    }
}

/// `Ref: <name>`, a resource reference when the name is a resource, otherwise a parameter value.
#[derive(Clone, Debug, PartialEq)]
pub struct Ref {
    pub(crate) fn_name: String,
    args: Node,
}

impl Ref {
    pub fn new(fn_name: String, args: Node) -> Ref {
        Ref { fn_name, args }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let name = resolve_string(
            &self.fn_name,
            &self.args,
            stack,
            &format!("Argument to \"{}\" must be a string", self.fn_name),
        )?;

        if let Some(reference) = stack.resource_reference(&name) {
            return Ok(Yaml::string(reference));
        }
        if stack.parameters().contains(&name) {
            return stack.parameters().value(&name);
        }
        Err(Error::InvalidTemplateReference {
            resource: name,
            key: self.fn_name.clone(),
        })
    }
}

fn reference_id(fn_name: &str, resource_name: String, stack: &dyn Stack) -> Result<Yaml> {
    match stack.resource_reference(&resource_name) {
        Some(reference) => Ok(Yaml::string(reference)),
        None => Err(Error::InvalidTemplateReference {
            resource: resource_name,
            key: fn_name.to_string(),
        }),
    }
}

/// `Fn::Select: [<index>, <collection>]`
#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub(crate) fn_name: String,
    index: Node,
    collection: Node,
}

impl Select {
    pub fn parse(fn_name: String, args: Node) -> Result<Select> {
        let usage = format!("Arguments to \"{}\" must be of the form [index, collection]", fn_name);
        let [index, collection] = expect_args::<2>(&fn_name, args, &usage)?;
        Ok(Select {
            fn_name,
            index,
            collection,
        })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let index = Self::to_index(self.index.resolve(stack)?);
        let mut collection = self.collection.resolve(stack)?;

        // Fn::GetAZs and friends may legitimately produce an empty string.
        if let Yaml::String(value) = &collection {
            if value.is_empty() {
                return Ok(Yaml::empty_string());
            }
            collection = parse_json(value).map_err(|err| {
                Error::invalid_argument(
                    &self.fn_name,
                    format!("\"{}\" is not a valid JSON string: {}", self.fn_name, err),
                )
            })?;
        }

        match &collection {
            Yaml::Hash(map) => {
                if !matches!(index, Yaml::String(_)) {
                    return Err(Error::invalid_argument(
                        &self.fn_name,
                        format!("Index to \"{}\" must be a string", self.fn_name),
                    ));
                }
                Ok(map.get(&index).cloned().unwrap_or_else(Yaml::empty_string))
            }
            Yaml::Array(list) => {
                let Yaml::Integer(index) = index else {
                    return Err(Error::invalid_argument(
                        &self.fn_name,
                        format!("Index to \"{}\" must be an integer", self.fn_name),
                    ));
                };
                let len = list.len() as i64;
                let position = if index < 0 { len + index } else { index };
                if position < 0 || position >= len {
                    return Ok(Yaml::empty_string());
                }
                Ok(list[position as usize].clone())
            }
            Yaml::Null => Ok(Yaml::empty_string()),
            _ => Err(Error::invalid_argument(
                &self.fn_name,
                format!("Arguments to \"{}\" not fully resolved", self.fn_name),
            )),
        }
    }

    // Numeric strings and reals become integer indices; anything else is kept.
    fn to_index(index: Yaml) -> Yaml {
        let converted = match &index {
            Yaml::String(value) => value.trim().parse::<i64>().ok(),
            Yaml::Real(value) => value.parse::<f64>().ok().map(|value| value.trunc() as i64),
            Yaml::Boolean(value) => Some(i64::from(*value)),
            _ => None,
        };
        converted.map_or(index, Yaml::Integer)
    }
}

/// `Fn::Join: [<delimiter>, <list>]`
#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub(crate) fn_name: String,
    delim: Node,
    strings: Node,
}

impl Join {
    pub fn parse(fn_name: String, args: Node) -> Result<Join> {
        let usage = format!("Arguments to \"{}\" must be of the form [delimiter, list]", fn_name);
        let [delim, strings] = expect_args::<2>(&fn_name, args, &usage)?;
        Ok(Join {
            fn_name,
            delim,
            strings,
        })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let strings = match self.strings.resolve(stack)? {
            Yaml::Null => Vec::new(),
            Yaml::Array(list) => list.as_ref().clone(),
            _ => {
                return Err(Error::invalid_argument(
                    &self.fn_name,
                    format!("\"{}\" must operate on a list", self.fn_name),
                ))
            }
        };

        let delim = resolve_string(
            &self.fn_name,
            &self.delim,
            stack,
            &format!("\"{}\" delimiter must be a string", self.fn_name),
        )?;

        let mut items = Vec::with_capacity(strings.len());
        for item in &strings {
            match item {
                Yaml::Null => items.push(String::new()),
                Yaml::String(value) => items.push(value.as_ref().clone()),
                _ => {
                    return Err(Error::invalid_argument(
                        &self.fn_name,
                        format!("Items to join must be strings, found {}", item.type_name()),
                    ))
                }
            }
        }

        Ok(Yaml::string(items.join(delim.as_str())))
    }
}

/// `Fn::Split: [<delimiter>, <string>]`. The delimiter must be written literally.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub(crate) fn_name: String,
    delim: Node,
    string: Node,
}

impl Split {
    pub fn parse(fn_name: String, args: Node) -> Result<Split> {
        let usage = format!(
            "Incorrect arguments to \"{}\" should be: [\"<delimiter>\", \"<string>\"]",
            fn_name
        );
        let [delim, string] = expect_args::<2>(&fn_name, args, &usage)?;
        Ok(Split { fn_name, delim, string })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let Some(delim) = self.delim.as_literal_str() else {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("Delimiter for \"{}\" must be string", self.fn_name),
            ));
        };
        if delim.is_empty() {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("Delimiter for \"{}\" must not be empty", self.fn_name),
            ));
        }

        let string = match self.string.resolve(stack)? {
            Yaml::String(value) => value,
            other => {
                return Err(Error::invalid_argument(
                    &self.fn_name,
                    format!("String to split must be string; got {}", other.type_name()),
                ))
            }
        };

        let parts = string.split(delim).map(Yaml::from).collect();
        Ok(Yaml::from_vec(parts))
    }
}

/// `Fn::Base64: <string>`. The string is passed through as is.
#[derive(Clone, Debug, PartialEq)]
pub struct Base64 {
    pub(crate) fn_name: String,
    args: Node,
}

impl Base64 {
    pub fn new(fn_name: String, args: Node) -> Base64 {
        Base64 { fn_name, args }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let value = resolve_string(
            &self.fn_name,
            &self.args,
            stack,
            &format!("Arguments to \"{}\" must be a string", self.fn_name),
        )?;
        Ok(Yaml::string(value))
    }
}

/// `Fn::MemberListToMap: [<key name>, <value name>, [".member.<n>.<field>=<value>", ...]]`
///
/// Converts an AWS-style member list into a mapping from each member's
/// `<key name>` field to its `<value name>` field.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberListToMap {
    pub(crate) fn_name: String,
    key_name: String,
    value_name: String,
    list: Node,
}

impl MemberListToMap {
    pub fn parse(fn_name: String, args: Node) -> Result<MemberListToMap> {
        let usage = format!("Wrong Arguments try: \"{}\"", MEMBER_LIST_EXAMPLE);
        let [key_name, value_name, list] = expect_args::<3>(&fn_name, args, &usage)?;

        let (Some(key_name), Some(value_name)) = (key_name.as_literal_str(), value_name.as_literal_str()) else {
            return Err(Error::invalid_argument(&fn_name, usage));
        };

        Ok(MemberListToMap {
            key_name: key_name.to_string(),
            value_name: value_name.to_string(),
            fn_name,
            list,
        })
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let Yaml::Array(member_list) = self.list.resolve(stack)? else {
            return Err(Error::invalid_argument(&self.fn_name, "Member list must be a list"));
        };

        let mut partials = LinkedHashMap::new();
        for item in member_list.iter() {
            let Some(item) = item.as_str() else {
                return Err(Error::invalid_argument(&self.fn_name, "Member list items must be strings"));
            };
            let Some((name, value)) = item.split_once('=') else {
                return Err(Error::invalid_argument(
                    &self.fn_name,
                    format!("Member list item \"{}\" is not of the form name=value", item),
                ));
            };
            partials.insert(name.to_string(), value.to_string());
        }

        // Group ".member.<n>.<field>" entries by member number, in ascending order.
        let mut members: BTreeMap<u64, LinkedHashMap<&str, &str>> = BTreeMap::new();
        for (name, value) in partials.iter() {
            let Some((index, field)) = Self::member_field(name) else {
                continue;
            };
            members.entry(index).or_default().insert(field, value.as_str());
        }

        let mut map = Mapping::new();
        for fields in members.values() {
            if let (Some(key), Some(value)) = (fields.get(self.key_name.as_str()), fields.get(self.value_name.as_str())) {
                map.insert(Yaml::from(*key), Yaml::from(*value));
            }
        }
        Ok(Yaml::from_mapping(map))
    }

    fn member_field(name: &str) -> Option<(u64, &str)> {
        let rest = name.strip_prefix(MEMBER_PREFIX)?;
        let (index, field) = rest.split_once('.')?;
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some((index.parse().ok()?, field))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacadeAttribute {
    Metadata,
    DeletionPolicy,
    UpdatePolicy,
}

impl FacadeAttribute {
    const ALL: [FacadeAttribute; 3] = [
        FacadeAttribute::Metadata,
        FacadeAttribute::DeletionPolicy,
        FacadeAttribute::UpdatePolicy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FacadeAttribute::Metadata => "Metadata",
            FacadeAttribute::DeletionPolicy => "DeletionPolicy",
            FacadeAttribute::UpdatePolicy => "UpdatePolicy",
        }
    }

    pub fn from_name(name: &str) -> Option<FacadeAttribute> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }
}

/// `Fn::ResourceFacade: <attribute>`, an attribute of the resource that owns this (nested) stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceFacade {
    pub(crate) fn_name: String,
    attribute: FacadeAttribute,
}

impl ResourceFacade {
    pub fn parse(fn_name: String, args: Node) -> Result<ResourceFacade> {
        match args.as_literal_str().and_then(FacadeAttribute::from_name) {
            Some(attribute) => Ok(ResourceFacade { fn_name, attribute }),
            None => {
                let names = FacadeAttribute::ALL.map(FacadeAttribute::name).join(", ");
                Err(Error::invalid_argument(
                    &fn_name,
                    format!("Incorrect arguments to \"{}\" should be: {}", fn_name, names),
                ))
            }
        }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        let Some(parent) = stack.parent_resource() else {
            return Err(Error::invalid_argument(
                &self.fn_name,
                format!("\"{}\" is only available in a nested stack", self.fn_name),
            ));
        };

        let value = match self.attribute {
            FacadeAttribute::Metadata => parent.metadata.clone(),
            FacadeAttribute::UpdatePolicy => parent.update_policy.clone().unwrap_or_else(Yaml::empty_mapping),
            FacadeAttribute::DeletionPolicy => parent
                .deletion_policy
                .clone()
                .unwrap_or_else(|| Yaml::string(DEFAULT_DELETION_POLICY)),
        };
        Ok(value)
    }
}
