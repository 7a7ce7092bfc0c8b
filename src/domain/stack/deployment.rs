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

use crate::domain::output::{AttributeRef, OutputSource};
use crate::domain::stack::declaration::{ResourceDecl, ResourceKind, Stack, Urn};
use crate::domain::stack::plan::Plan;
use crate::infrastructure::constants::UNKNOWN_MARKER;
use crate::infrastructure::engine::ProvisioningEngine;
use crate::shared::error::{Result, StackError};
use futures::future::try_join_all;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A property as seen by the engine: either a concrete value or a
/// placeholder for something a dependency has not produced yet.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Known(Value),
    Unknown,
}

impl PropertyValue {
    pub fn is_known(&self) -> bool {
        matches!(self, PropertyValue::Known(_))
    }

    pub fn as_known(&self) -> Option<&Value> {
        match self {
            PropertyValue::Known(v) => Some(v),
            PropertyValue::Unknown => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_known().and_then(|v| v.as_str())
    }
}

impl From<Option<Value>> for PropertyValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(PropertyValue::Unknown, PropertyValue::Known)
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Known(v) => v.serialize(serializer),
            PropertyValue::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A declaration with its deferred inputs evaluated against current state.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedResource {
    pub urn: Urn,
    pub depends_on: Vec<Urn>,
    pub properties: PropertyMap,
}

impl ResolvedResource {
    pub fn kind(&self) -> ResourceKind {
        self.urn.kind
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn unknown_properties(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, v)| !v.is_known())
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Outputs recorded so far, keyed by resource.
#[derive(Debug, Clone, Default)]
pub struct StackState {
    outputs: BTreeMap<Urn, PropertyMap>,
}

impl StackState {
    pub fn record(&mut self, urn: Urn, outputs: PropertyMap) {
        self.outputs.insert(urn, outputs);
    }

    pub fn outputs(&self, urn: &Urn) -> Option<&PropertyMap> {
        self.outputs.get(urn)
    }
}

impl OutputSource for StackState {
    fn lookup(&self, attr: &AttributeRef) -> Option<Value> {
        self.outputs
            .get(&attr.urn)
            .and_then(|o| o.get(&attr.attribute))
            .and_then(|v| v.as_known().cloned())
    }
}

pub fn resolve_resource(decl: &ResourceDecl, state: &StackState) -> Result<ResolvedResource> {
    let mut properties = PropertyMap::new();
    for (key, output) in decl.properties() {
        properties.insert(key.clone(), output.resolve(state)?.into());
    }
    Ok(ResolvedResource {
        urn: decl.urn().clone(),
        depends_on: decl.dependencies().into_iter().collect(),
        properties,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceResult {
    pub step: usize,
    pub level: usize,
    pub resource: ResolvedResource,
    pub outputs: PropertyMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub stack: String,
    pub engine: String,
    pub results: Vec<ResourceResult>,
}

impl DeploymentReport {
    pub fn get(&self, urn: &Urn) -> Option<&ResourceResult> {
        self.results.iter().find(|r| &r.resource.urn == urn)
    }

    pub fn output(&self, urn: &Urn, attribute: &str) -> Option<&PropertyValue> {
        self.get(urn).and_then(|r| r.outputs.get(attribute))
    }

    /// `<urn>.<property>` for every input still unknown.
    pub fn unresolved(&self) -> Vec<String> {
        self.results
            .iter()
            .flat_map(|r| {
                r.resource
                    .unknown_properties()
                    .into_iter()
                    .map(move |p| format!("{}.{}", r.resource.urn, p))
            })
            .collect()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved().is_empty()
    }
}

/// Walks a stack's plan and hands each resource to the engine once
/// everything it reads has been produced.
pub struct Deployment<'a> {
    stack: &'a Stack,
    engine: &'a dyn ProvisioningEngine,
}

impl<'a> Deployment<'a> {
    pub fn new(stack: &'a Stack, engine: &'a dyn ProvisioningEngine) -> Self {
        Self { stack, engine }
    }

    pub async fn run(&self) -> Result<DeploymentReport> {
        let plan = Plan::build(self.stack)?;
        let mut state = StackState::default();
        let mut results = Vec::with_capacity(plan.steps().len());

        info!(
            stack = self.stack.name(),
            engine = self.engine.name(),
            resources = self.stack.len(),
            "running deployment"
        );

        for (level, members) in plan.levels().iter().enumerate() {
            let resolved = members
                .iter()
                .map(|urn| {
                    let decl = self.stack.get(urn).ok_or_else(|| {
                        StackError::unknown_resource(urn.to_string(), self.stack.name())
                    })?;
                    resolve_resource(decl, &state)
                })
                .collect::<Result<Vec<_>>>()?;

            let outputs =
                try_join_all(resolved.iter().map(|resource| self.engine.register(resource))).await?;

            for (resource, outputs) in resolved.into_iter().zip(outputs) {
                let step = plan.step(&resource.urn).map(|s| s.index).unwrap_or_default();
                debug!(
                    urn = %resource.urn,
                    level,
                    unknown = resource.unknown_properties().len(),
                    "registered resource"
                );
                state.record(resource.urn.clone(), outputs.clone());
                results.push(ResourceResult {
                    step,
                    level,
                    resource,
                    outputs,
                });
            }
        }

        Ok(DeploymentReport {
            stack: self.stack.name().to_string(),
            engine: self.engine.name().to_string(),
            results,
        })
    }
}
