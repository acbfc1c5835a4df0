// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! The runtime state intrinsic functions resolve against.

#[cfg(test)]
mod tests;

use hashlink::LinkedHashMap;

use crate::{
    cow_yaml::{Mapping, Yaml},
    error::Result,
    parameters::Parameters,
    template::{Template, OUTPUTS, OUTPUT_VALUE},
};

pub const DEFAULT_AVAILABILITY_ZONE: &str = "nova";

/// Identifies a stack: owning tenant, name and id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackIdentifier {
    pub tenant: String,
    pub stack_name: String,
    pub stack_id: String,
}

impl StackIdentifier {
    pub fn new(tenant: impl Into<String>, stack_name: impl Into<String>, stack_id: impl Into<String>) -> Self {
        StackIdentifier {
            tenant: tenant.into(),
            stack_name: stack_name.into(),
            stack_id: stack_id.into(),
        }
    }
}

/// What a function may ask of the stack it is evaluated in.
pub trait Stack {
    fn template(&self) -> &Template;

    fn parameters(&self) -> &Parameters;

    /// `None` when the resource doesn't exist. `Some(Yaml::Null)` when the
    /// resource exists but the attribute isn't available (yet).
    fn resource_attribute(&self, resource_name: &str, attribute: &str) -> Option<Yaml>;

    fn resource_reference(&self, resource_name: &str) -> Option<String>;

    fn availability_zones(&self) -> Vec<String> {
        vec![DEFAULT_AVAILABILITY_ZONE.to_string()]
    }

    /// The resource this stack is nested in, if any.
    fn parent_resource(&self) -> Option<&ResourceState> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    Init,
    Create,
    Delete,
    Update,
    Rollback,
    Suspend,
    Resume,
    Adopt,
}

impl ResourceAction {
    const ALL: [ResourceAction; 8] = [
        ResourceAction::Init,
        ResourceAction::Create,
        ResourceAction::Delete,
        ResourceAction::Update,
        ResourceAction::Rollback,
        ResourceAction::Suspend,
        ResourceAction::Resume,
        ResourceAction::Adopt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceAction::Init => "INIT",
            ResourceAction::Create => "CREATE",
            ResourceAction::Delete => "DELETE",
            ResourceAction::Update => "UPDATE",
            ResourceAction::Rollback => "ROLLBACK",
            ResourceAction::Suspend => "SUSPEND",
            ResourceAction::Resume => "RESUME",
            ResourceAction::Adopt => "ADOPT",
        }
    }

    pub fn from_name(name: &str) -> Option<ResourceAction> {
        let name = name.to_ascii_uppercase();
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// Whether attributes can be read from a resource in this state.
    pub fn attributes_available(self) -> bool {
        matches!(
            self,
            ResourceAction::Create
                | ResourceAction::Adopt
                | ResourceAction::Suspend
                | ResourceAction::Resume
                | ResourceAction::Update
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceState {
    pub action: ResourceAction,
    pub reference_id: Option<String>,
    pub attributes: LinkedHashMap<String, Yaml>,
    pub metadata: Yaml,
    pub update_policy: Option<Yaml>,
    pub deletion_policy: Option<Yaml>,
}

impl ResourceState {
    pub fn new(action: ResourceAction) -> Self {
        ResourceState {
            action,
            reference_id: None,
            attributes: LinkedHashMap::new(),
            metadata: Yaml::empty_mapping(),
            update_policy: None,
            deletion_policy: None,
        }
    }

    pub fn with_reference_id(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Yaml) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    fn attribute(&self, name: &str) -> Yaml {
        if !self.action.attributes_available() {
            return Yaml::Null;
        }
        self.attributes.get(name).cloned().unwrap_or(Yaml::Null)
    }
}

/// An in-memory [`Stack`]: a template, its bound parameters and the known resource states.
#[derive(Clone, Debug)]
pub struct StackState {
    template: Template,
    parameters: Parameters,
    resources: LinkedHashMap<String, ResourceState>,
    availability_zones: Vec<String>,
    parent_resource: Option<ResourceState>,
}

impl StackState {
    pub fn new(template: Template, parameters: Parameters) -> Self {
        StackState {
            template,
            parameters,
            resources: LinkedHashMap::new(),
            availability_zones: vec![DEFAULT_AVAILABILITY_ZONE.to_string()],
            parent_resource: None,
        }
    }

    pub fn with_resource(mut self, name: impl Into<String>, state: ResourceState) -> Self {
        self.resources.insert(name.into(), state);
        self
    }

    pub fn with_availability_zones(mut self, zones: Vec<String>) -> Self {
        self.availability_zones = zones;
        self
    }

    pub fn with_parent_resource(mut self, parent: ResourceState) -> Self {
        self.parent_resource = Some(parent);
        self
    }

    /// Parses and resolves a raw template value.
    pub fn resolve(&self, raw: &Yaml) -> Result<Yaml> {
        let node = self.template.parse(raw)?;
        node.resolve(self)
    }

    /// Resolves the value of every output, in template order.
    pub fn outputs(&self) -> Result<Mapping> {
        let outputs = self.template.section(OUTPUTS)?;
        let mut resolved = Mapping::new();
        if let Some(outputs) = outputs.as_mapping() {
            for (name, output) in outputs.iter() {
                let value = match output.get(OUTPUT_VALUE) {
                    Some(value) => self.resolve(value)?,
                    None => Yaml::Null,
                };
                resolved.insert(name.clone(), value);
            }
        }
        Ok(resolved)
    }

    // Resources declared by the template exist even before any state is recorded for them.
    fn declares_resource(&self, resource_name: &str) -> bool {
        self.resources.contains_key(resource_name) || self.template.declares_resource(resource_name)
    }
}

impl Stack for StackState {
    fn template(&self) -> &Template {
        &self.template
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn resource_attribute(&self, resource_name: &str, attribute: &str) -> Option<Yaml> {
        match self.resources.get(resource_name) {
            Some(state) => Some(state.attribute(attribute)),
            None if self.declares_resource(resource_name) => Some(Yaml::Null),
            None => None,
        }
    }

    fn resource_reference(&self, resource_name: &str) -> Option<String> {
        match self.resources.get(resource_name) {
            Some(state) => Some(
                state
                    .reference_id
                    .clone()
                    .unwrap_or_else(|| resource_name.to_string()),
            ),
            None if self.declares_resource(resource_name) => Some(resource_name.to_string()),
            None => None,
        }
    }

    fn availability_zones(&self) -> Vec<String> {
        self.availability_zones.clone()
    }

    fn parent_resource(&self) -> Option<&ResourceState> {
        self.parent_resource.as_ref()
    }
}
