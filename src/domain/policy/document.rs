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

//! IAM policy document model
//!
//! Field order and the single-value/array distinction are kept exactly as
//! IAM documents are usually written, so a document serializes back to the
//! same text it was built from.

use crate::infrastructure::constants::POLICY_VERSION;
use crate::shared::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// IAM accepts either a bare string or an array in most positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn one(value: impl Into<T>) -> Self {
        OneOrMany::One(value.into())
    }

    pub fn many<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        OneOrMany::Many(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(v) => v.as_slice(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// `{ "<test>": { "<variable>": <values> } }`
pub type ConditionBlock = BTreeMap<String, BTreeMap<String, OneOrMany<String>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(rename = "AWS", default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<OneOrMany<String>>,
    #[serde(rename = "Federated", default, skip_serializing_if = "Option::is_none")]
    pub federated: Option<OneOrMany<String>>,
    #[serde(rename = "Service", default, skip_serializing_if = "Option::is_none")]
    pub service: Option<OneOrMany<String>>,
}

impl Principal {
    pub fn federated(identifier: impl Into<String>) -> Self {
        Self {
            federated: Some(OneOrMany::one(identifier)),
            ..Default::default()
        }
    }

    /// Number of principal identifiers across all principal types.
    pub fn identifier_count(&self) -> usize {
        [&self.aws, &self.federated, &self.service]
            .iter()
            .filter_map(|p| p.as_ref())
            .map(|p| p.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    pub action: OneOrMany<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionBlock>,
}

impl Statement {
    pub fn allow(action: OneOrMany<String>) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            action,
            resource: None,
            principal: None,
            condition: None,
        }
    }

    pub fn on(mut self, resource: OneOrMany<String>) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_condition(
        mut self,
        test: impl Into<String>,
        variable: impl Into<String>,
        values: OneOrMany<String>,
    ) -> Self {
        self.condition
            .get_or_insert_with(BTreeMap::new)
            .entry(test.into())
            .or_default()
            .insert(variable.into(), values);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    /// Canonical compact form, the text handed to IAM.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
