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

use super::ProvisioningEngine;
use crate::domain::identity::{AwsAccount, ClusterIdentity};
use crate::domain::output::AttributeRef;
use crate::domain::stack::{PropertyMap, PropertyValue, ResolvedResource, ResourceKind, Urn};
use crate::infrastructure::constants::POLICY_PATH;
use crate::shared::error::StackError;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Engine that applies nothing.
///
/// Inputs are echoed back as outputs, seeded values stand in for what a real
/// driver would report (the cluster identity, most often), IAM ARNs are
/// derived when the account is known, and everything else stays unknown.
#[derive(Debug, Clone, Default)]
pub struct PreviewEngine {
    seeded: BTreeMap<AttributeRef, Value>,
    account: Option<AwsAccount>,
}

impl PreviewEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, urn: Urn, attribute: &str, value: impl Into<Value>) -> Self {
        self.seeded
            .insert(AttributeRef::new(urn, attribute), value.into());
        self
    }

    /// Seed a cluster resource's outputs. Also learns the account from the
    /// OIDC provider ARN unless one was set explicitly.
    pub fn with_cluster_identity(mut self, cluster: &Urn, identity: &ClusterIdentity) -> Self {
        if self.account.is_none() {
            self.account = identity.account();
        }
        self.with_output(cluster.clone(), "name", identity.name.clone())
            .with_output(
                cluster.clone(),
                "oidcProviderUrl",
                identity.oidc_provider_url.clone(),
            )
            .with_output(
                cluster.clone(),
                "oidcProviderArn",
                identity.oidc_provider_arn.clone(),
            )
    }

    pub fn with_account(mut self, account: AwsAccount) -> Self {
        self.account = Some(account);
        self
    }

    pub fn account(&self) -> Option<&AwsAccount> {
        self.account.as_ref()
    }

    fn derive(&self, resource: &ResolvedResource, attribute: &str) -> Option<Value> {
        let account = self.account.as_ref()?;
        let kind = match (resource.kind(), attribute) {
            (ResourceKind::Role, "arn") => "role",
            (ResourceKind::Policy, "arn") => "policy",
            _ => return None,
        };
        let name = resource.property("name")?.as_str()?;
        let path = resource
            .property("path")
            .and_then(|p| p.as_str())
            .unwrap_or(POLICY_PATH);
        Some(Value::String(account.iam_arn(kind, path, name)))
    }
}

#[async_trait::async_trait]
impl ProvisioningEngine for PreviewEngine {
    fn name(&self) -> &str {
        "preview"
    }

    async fn register(&self, resource: &ResolvedResource) -> Result<PropertyMap, StackError> {
        let mut outputs = resource.properties.clone();

        for attribute in resource.kind().output_attributes() {
            let seeded = self
                .seeded
                .get(&AttributeRef::new(resource.urn.clone(), *attribute))
                .cloned();

            let value = match seeded {
                Some(v) => PropertyValue::Known(v),
                None => match outputs.get(*attribute) {
                    Some(PropertyValue::Known(v)) => PropertyValue::Known(v.clone()),
                    _ => self.derive(resource, attribute).into(),
                },
            };
            outputs.insert((*attribute).to_string(), value);
        }

        debug!(urn = %resource.urn, "previewed resource");
        Ok(outputs)
    }
}
