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

use crate::domain::config::PolicyConf;
use crate::domain::policy::PolicyDocument;
use crate::domain::stack::{ResourceDecl, ResourceKind};
use crate::shared::error::StackError;

pub struct PolicyBuilder {
    resource_name: String,
    policy_name: String,
    path: String,
    description: String,
    document: PolicyDocument,
}

impl PolicyBuilder {
    pub fn new(
        resource_name: impl Into<String>,
        policy_name: impl Into<String>,
        document: PolicyDocument,
        conf: &PolicyConf,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            policy_name: policy_name.into(),
            path: conf.path.clone(),
            description: conf.description.clone(),
            document,
        }
    }

    pub fn build(&self) -> Result<ResourceDecl, StackError> {
        if !self.path.starts_with('/') || !self.path.ends_with('/') {
            return Err(StackError::config_error(format!(
                "policy path must begin and end with '/': {}",
                self.path
            )));
        }

        if self.document.statement.is_empty() {
            return Err(StackError::config_error(format!(
                "policy {} has no statements",
                self.policy_name
            )));
        }

        Ok(ResourceDecl::new(ResourceKind::Policy, &self.resource_name)
            .with_literal("name", self.policy_name.as_str())
            .with_literal("path", self.path.as_str())
            .with_literal("description", self.description.as_str())
            .with_literal("policy", self.document.to_json()?))
    }
}
