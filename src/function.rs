// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Intrinsic functions and the argument trees they are parsed into.
//!
//! A template value is parsed once into a [`Node`] tree. Wherever the raw
//! document holds a mapping with exactly one key naming a registered function,
//! the tree holds a [`Function`] instead, with its arguments parsed the same
//! way. Resolving a node resolves its children first.

mod cfn;
mod hot;


use hashlink::LinkedHashMap;

use crate::{
    cow_yaml::{Mapping, Yaml},
    error::{Error, Result},
    stack::Stack,
};

pub use cfn::{
    Base64, FacadeAttribute, FindInMap, GetAZs, Join, MemberListToMap, Ref, ResourceFacade, ResourceRef, Select,
    Split,
};
pub use hot::{GetAtt, GetFile, GetParam, Replace};

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(Yaml),
    Sequence(Vec<Node>),
    Mapping(LinkedHashMap<Yaml, Node>),
    Function(Box<Function>),
}

impl Node {
    pub fn resolve(&self, stack: &dyn Stack) -> Result<Yaml> {
        match self {
            Node::Scalar(value) => Ok(value.clone()),
            Node::Sequence(items) => {
                let values = items.iter().map(|item| item.resolve(stack)).collect::<Result<Vec<_>>>()?;
                Ok(Yaml::from_vec(values))
            }
            Node::Mapping(entries) => {
                let mut map = Mapping::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.resolve(stack)?);
                }
                Ok(Yaml::from_mapping(map))
            }
            Node::Function(function) => function.result(stack),
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Node::Function(function) => Some(function.as_ref()),
            _ => None,
        }
    }

    /// The string of a literal (unparsed, unresolved) scalar.
    fn as_literal_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(value) => value.as_str(),
            _ => None,
        }
    }
}

/// Tag for each function implementation, as registered in a template's function table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    FindInMap,
    GetAZs,
    GetParam,
    ResourceRef,
    Ref,
    GetAtt,
    Select,
    Join,
    Split,
    StrReplace,
    Replace,
    Base64,
    MemberListToMap,
    ResourceFacade,
    GetFile,
}

impl FunctionKind {
    /// Builds the function node, checking argument shape where the function requires it.
    pub fn construct(self, fn_name: &str, args: Node) -> Result<Function> {
        let fn_name = fn_name.to_string();
        let function = match self {
            FunctionKind::FindInMap => Function::FindInMap(FindInMap::parse(fn_name, args)?),
            FunctionKind::GetAZs => Function::GetAZs(GetAZs::new(fn_name, args)),
            FunctionKind::GetParam => Function::GetParam(GetParam::new(fn_name, args)),
            FunctionKind::ResourceRef => Function::ResourceRef(ResourceRef::new(fn_name, args)),
            FunctionKind::Ref => Function::Ref(Ref::new(fn_name, args)),
            FunctionKind::GetAtt => Function::GetAtt(GetAtt::parse(fn_name, args)?),
            FunctionKind::Select => Function::Select(Select::parse(fn_name, args)?),
            FunctionKind::Join => Function::Join(Join::parse(fn_name, args)?),
            FunctionKind::Split => Function::Split(Split::parse(fn_name, args)?),
            FunctionKind::StrReplace => Function::Replace(Replace::parse_mapping(fn_name, args)?),
            FunctionKind::Replace => Function::Replace(Replace::parse_list(fn_name, args)?),
            FunctionKind::Base64 => Function::Base64(Base64::new(fn_name, args)),
            FunctionKind::MemberListToMap => Function::MemberListToMap(MemberListToMap::parse(fn_name, args)?),
            FunctionKind::ResourceFacade => Function::ResourceFacade(ResourceFacade::parse(fn_name, args)?),
            FunctionKind::GetFile => Function::GetFile(GetFile::new(fn_name, args)),
        };
        Ok(function)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Function {
    FindInMap(FindInMap),
    GetAZs(GetAZs),
    GetParam(GetParam),
    ResourceRef(ResourceRef),
    Ref(Ref),
    GetAtt(GetAtt),
    Select(Select),
    Join(Join),
    Split(Split),
    Replace(Replace),
    Base64(Base64),
    MemberListToMap(MemberListToMap),
    ResourceFacade(ResourceFacade),
    GetFile(GetFile),
}

impl Function {
    /// The name the function was invoked by in the document.
    pub fn name(&self) -> &str {
        match self {
            Function::FindInMap(f) => &f.fn_name,
            Function::GetAZs(f) => &f.fn_name,
            Function::GetParam(f) => &f.fn_name,
            Function::ResourceRef(f) => &f.fn_name,
            Function::Ref(f) => &f.fn_name,
            Function::GetAtt(f) => &f.fn_name,
            Function::Select(f) => &f.fn_name,
            Function::Join(f) => &f.fn_name,
            Function::Split(f) => &f.fn_name,
            Function::Replace(f) => &f.fn_name,
            Function::Base64(f) => &f.fn_name,
            Function::MemberListToMap(f) => &f.fn_name,
            Function::ResourceFacade(f) => &f.fn_name,
            Function::GetFile(f) => &f.fn_name,
        }
    }

    pub fn result(&self, stack: &dyn Stack) -> Result<Yaml> {
        match self {
            Function::FindInMap(f) => f.result(stack),
            Function::GetAZs(f) => f.result(stack),
            Function::GetParam(f) => f.result(stack),
            Function::ResourceRef(f) => f.result(stack),
            Function::Ref(f) => f.result(stack),
            Function::GetAtt(f) => f.result(stack),
            Function::Select(f) => f.result(stack),
            Function::Join(f) => f.result(stack),
            Function::Split(f) => f.result(stack),
            Function::Replace(f) => f.result(stack),
            Function::Base64(f) => f.result(stack),
            Function::MemberListToMap(f) => f.result(stack),
            Function::ResourceFacade(f) => f.result(stack),
            Function::GetFile(f) => f.result(stack),
        }
    }
}

// Splits a sequence argument into exactly N nodes.
fn expect_args<const N: usize>(fn_name: &str, args: Node, usage: &str) -> Result<[Node; N]> {
    let Node::Sequence(items) = args else {
        return Err(Error::invalid_argument(fn_name, usage));
    };
    <[Node; N]>::try_from(items).map_err(|_| Error::invalid_argument(fn_name, usage))
}

fn resolve_string(fn_name: &str, node: &Node, stack: &dyn Stack, message: &str) -> Result<String> {
    match node.resolve(stack)? {
        Yaml::String(value) => Ok(value.as_ref().clone()),
        _ => Err(Error::invalid_argument(fn_name, message)),
    }
}
