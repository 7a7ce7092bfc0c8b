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
use crate::domain::policy::PolicyDocument;
use crate::domain::stack::{ResourceDecl, ResourceKind};
use crate::shared::error::StackError;
use serde_json::Value;

/// IAM role whose trust policy is only known once the cluster exists.
pub struct RoleBuilder {
    resource_name: String,
    role_name: String,
    trust_policy: Output<PolicyDocument>,
}

impl RoleBuilder {
    pub fn new(
        resource_name: impl Into<String>,
        role_name: impl Into<String>,
        trust_policy: Output<PolicyDocument>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            role_name: role_name.into(),
            trust_policy,
        }
    }

    pub fn build(&self) -> Result<ResourceDecl, StackError> {
        if self.role_name.is_empty() {
            return Err(StackError::config_error("role name must not be empty"));
        }

        // IAM takes the trust policy as a JSON string, not a nested object.
        let assume_role_policy = self
            .trust_policy
            .clone()
            .try_apply(|doc| doc.to_json().map(Value::String));

        Ok(ResourceDecl::new(ResourceKind::Role, &self.resource_name)
            .with_literal("name", self.role_name.as_str())
            .with_property("assumeRolePolicy", assume_role_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::output::AttributeRef;
    use crate::domain::policy::TrustPolicyBuilder;
    use crate::domain::stack::Urn;
    use std::collections::BTreeMap;

    #[test]
    fn test_trust_policy_is_serialized_once_known() {
        let cluster = Urn::new(ResourceKind::Cluster, "my-cluster");
        let trust = TrustPolicyBuilder::default().build_deferred(
            Output::attribute(cluster.clone(), "oidcProviderUrl"),
            Output::attribute(cluster.clone(), "oidcProviderArn"),
        );
        let decl = RoleBuilder::new("role", "dev-role", trust).build().unwrap();

        let assume = decl.property("assumeRolePolicy").unwrap();
        assert!(decl.dependencies().contains(&cluster));

        let mut source = BTreeMap::new();
        source.insert(
            AttributeRef::new(cluster.clone(), "oidcProviderUrl"),
            Value::from("https://x.example.com"),
        );
        source.insert(
            AttributeRef::new(cluster, "oidcProviderArn"),
            Value::from("arn:aws:iam::111:oidc-provider/x.example.com"),
        );
        let text = assume.resolve(&source).unwrap().unwrap();
        let doc = PolicyDocument::from_json(text.as_str().unwrap()).unwrap();
        assert_eq!(doc.statement.len(), 1);
    }

    #[test]
    fn test_empty_role_name_is_rejected() {
        let trust = Output::known(PolicyDocument::new(vec![]));
        assert!(RoleBuilder::new("role", "", trust).build().is_err());
    }
}
