// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::output::Output;
use crate::infrastructure::constants::{
    TYPE_ADDON, TYPE_CLUSTER, TYPE_POLICY, TYPE_ROLE, TYPE_ROLE_POLICY_ATTACHMENT,
};
use crate::shared::error::{Result, StackError};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Cluster,
    Role,
    Policy,
    RolePolicyAttachment,
    Addon,
}

impl ResourceKind {
    pub fn type_token(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => TYPE_CLUSTER,
            ResourceKind::Role => TYPE_ROLE,
            ResourceKind::Policy => TYPE_POLICY,
            ResourceKind::RolePolicyAttachment => TYPE_ROLE_POLICY_ATTACHMENT,
            ResourceKind::Addon => TYPE_ADDON,
        }
    }

    /// Attributes the engine assigns once the resource exists.
    pub fn output_attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Cluster => &["name", "oidcProviderUrl", "oidcProviderArn"],
            ResourceKind::Role => &["arn", "name", "uniqueId"],
            ResourceKind::Policy => &["arn", "name", "policyId"],
            ResourceKind::RolePolicyAttachment => &["id"],
            ResourceKind::Addon => &["arn", "id"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "EKS Cluster",
            ResourceKind::Role => "IAM Role",
            ResourceKind::Policy => "IAM Policy",
            ResourceKind::RolePolicyAttachment => "Policy Attachment",
            ResourceKind::Addon => "EKS Add-on",
        }
    }
}

/// Unique identity of a declared resource within a stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Urn {
    pub kind: ResourceKind,
    pub name: String,
}

impl Urn {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.kind.type_token(), self.name)
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Desired state of one resource. Property values may be deferred.
#[derive(Debug, Clone)]
pub struct ResourceDecl {
    urn: Urn,
    properties: BTreeMap<String, Output<Value>>,
    depends_on: BTreeSet<Urn>,
}

impl ResourceDecl {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            urn: Urn::new(kind, name),
            properties: BTreeMap::new(),
            depends_on: BTreeSet::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Output<Value>) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_literal(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_property(key, Output::known(value.into()))
    }

    /// Ordering constraint with no data flowing between the two resources.
    pub fn depends_on(mut self, urn: Urn) -> Self {
        self.depends_on.insert(urn);
        self
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn kind(&self) -> ResourceKind {
        self.urn.kind
    }

    pub fn name(&self) -> &str {
        &self.urn.name
    }

    pub fn properties(&self) -> &BTreeMap<String, Output<Value>> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Output<Value>> {
        self.properties.get(key)
    }

    /// Every resource that must exist before this one can be applied.
    pub fn dependencies(&self) -> BTreeSet<Urn> {
        let mut deps: BTreeSet<Urn> = self
            .properties
            .values()
            .flat_map(|p| p.resources())
            .collect();
        deps.extend(self.depends_on.iter().cloned());
        deps.remove(&self.urn);
        deps
    }

    /// Reference to an attribute of this resource for use by later declarations.
    pub fn output<T: DeserializeOwned + Send + Sync + 'static>(&self, attribute: &str) -> Output<T> {
        Output::attribute(self.urn.clone(), attribute)
    }

    /// Whether `attribute` can be read from this resource once applied.
    /// Inputs are echoed back as outputs.
    pub fn exposes(&self, attribute: &str) -> bool {
        self.kind().output_attributes().contains(&attribute) || self.properties.contains_key(attribute)
    }
}

/// An ordered set of declarations sharing one stack name.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    resources: Vec<ResourceDecl>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&mut self, decl: ResourceDecl) -> Result<()> {
        if self.get(decl.urn()).is_some() {
            return Err(StackError::DuplicateResource(decl.urn().to_string()));
        }
        self.resources.push(decl);
        Ok(())
    }

    pub fn get(&self, urn: &Urn) -> Option<&ResourceDecl> {
        self.resources.iter().find(|r| r.urn() == urn)
    }

    pub fn resources(&self) -> &[ResourceDecl] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
