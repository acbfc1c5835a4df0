// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Template parameters bound to user values, plus the stack pseudo-parameters.

mod constraints;
mod schema;


use hashlink::LinkedHashMap;
use tracing::debug;

use crate::{
    cow_yaml::Yaml,
    error::{Error, Result},
    stack::StackIdentifier,
    template::Template,
};

pub use constraints::Constraint;
pub use schema::{ParamSchema, ParamType};

pub const PARAM_STACK_ID: &str = "OS::stack_id";
pub const PARAM_STACK_NAME: &str = "OS::stack_name";
pub const PARAM_REGION: &str = "OS::region";

pub const PSEUDO_PARAMETERS: &[&str] = &[PARAM_STACK_ID, PARAM_STACK_NAME, PARAM_REGION];

pub const DEFAULT_REGION: &str = "RegionOne";

const HIDDEN_VALUE: &str = "******";

#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    schema: ParamSchema,
    user_value: Option<Yaml>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, schema: ParamSchema, user_value: Option<Yaml>) -> Parameter {
        Parameter {
            name: name.into(),
            schema,
            user_value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn has_value(&self) -> bool {
        self.raw_value().is_some()
    }

    fn raw_value(&self) -> Option<&Yaml> {
        self.user_value.as_ref().or(self.schema.default.as_ref())
    }

    /// The user value, else the default, coerced to the parameter's type.
    pub fn value(&self) -> Result<Yaml> {
        let raw = self.raw_value().ok_or_else(|| Error::UserParameterMissing {
            key: self.name.clone(),
        })?;
        self.schema
            .param_type
            .coerce(raw)
            .map_err(|message| self.invalid(message))
    }

    pub fn validate(&self) -> Result<()> {
        let value = self.value()?;
        self.schema.validate_value(&value).map_err(|message| self.invalid(message))
    }

    /// The value as it may appear in logs and messages.
    pub fn display_value(&self) -> String {
        if self.schema.hidden {
            return HIDDEN_VALUE.to_string();
        }
        self.raw_value().map(|value| value.to_string()).unwrap_or_default()
    }

    fn invalid(&self, message: String) -> Error {
        Error::InvalidParameter {
            key: self.name.clone(),
            message,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Parameters {
    params: LinkedHashMap<String, Parameter>,
}

impl Parameters {
    /// Binds user values to the template's parameters.
    ///
    /// Pseudo-parameters come first, then the template's parameters in document order.
    pub fn new(
        stack_identifier: Option<&StackIdentifier>,
        template: &Template,
        user_params: &LinkedHashMap<String, Yaml>,
        validate_value: bool,
    ) -> Result<Parameters> {
        let schemata = template.param_schemata()?;

        if let Some(key) = user_params.keys().find(|key| !schemata.contains_key(*key)) {
            return Err(Error::UnknownUserParameter { key: key.clone() });
        }

        let mut params = LinkedHashMap::new();
        for param in pseudo_parameters(stack_identifier) {
            params.insert(param.name.clone(), param);
        }
        for (name, schema) in schemata {
            let user_value = user_params.get(&name).cloned();
            params.insert(name.clone(), Parameter::new(name, schema, user_value));
        }

        let parameters = Parameters { params };
        for param in parameters.iter() {
            if validate_value {
                param.validate()?;
            }
            debug!(parameter = param.name(), value = %param.display_value(), "bound parameter");
        }
        Ok(parameters)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Result<Yaml> {
        match self.params.get(name) {
            Some(param) => param.value(),
            None => Err(Error::UserParameterMissing { key: name.to_string() }),
        }
    }

    /// Sets the `OS::stack_id` pseudo-parameter to the identifier's stack id.
    pub fn set_stack_id(&mut self, stack_identifier: Option<&StackIdentifier>) -> Result<()> {
        let Some(stack_identifier) = stack_identifier else {
            return Err(Error::InvalidStackIdentifier);
        };
        if let Some(param) = self.params.get_mut(PARAM_STACK_ID) {
            param.schema.set_default(Yaml::string(stack_identifier.stack_id.as_str()));
        }
        Ok(())
    }

    pub fn set_region(&mut self, region: &str) {
        if let Some(param) = self.params.get_mut(PARAM_REGION) {
            param.schema.set_default(Yaml::string(region));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

fn pseudo_parameters(stack_identifier: Option<&StackIdentifier>) -> Vec<Parameter> {
    let stack_id = stack_identifier.map_or("", |ident| ident.stack_id.as_str());
    let stack_name = stack_identifier.map_or("", |ident| ident.stack_name.as_str());

    let mut params = vec![Parameter::new(
        PARAM_STACK_ID,
        ParamSchema::new(ParamType::String)
            .with_description("Stack ID")
            .with_default(Yaml::string(stack_id)),
        None,
    )];
    if !stack_name.is_empty() {
        params.push(Parameter::new(
            PARAM_STACK_NAME,
            ParamSchema::new(ParamType::String)
                .with_description("Stack Name")
                .with_default(Yaml::string(stack_name)),
            None,
        ));
    }
    params.push(Parameter::new(
        PARAM_REGION,
        ParamSchema::new(ParamType::String)
            .with_description("Region Name")
            .with_default(Yaml::string(DEFAULT_REGION)),
        None,
    ));
    params
}
