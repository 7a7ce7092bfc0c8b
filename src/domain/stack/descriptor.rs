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

use crate::domain::config::StackConf;
use crate::domain::policy::{ebs_csi_driver_policy, TrustPolicyBuilder};
use crate::domain::stack::declaration::{ResourceKind, Stack, Urn};
use crate::domain::stack::deployment::{Deployment, DeploymentReport};
use crate::domain::stack::naming::NamingPolicy;
use crate::domain::stack::plan::Plan;
use crate::domain::stack::validator::StackValidator;
use crate::infrastructure::aws::{
    AddonBuilder, AttachmentBuilder, ClusterBuilder, PolicyBuilder, RoleBuilder,
};
use crate::infrastructure::engine::ProvisioningEngine;
use crate::shared::error::StackError;
use tracing::info;

/// The five declarations of the EBS CSI driver stack, with handles to each.
#[derive(Debug, Clone)]
pub struct DeclaredStack {
    pub stack: Stack,
    pub cluster: Urn,
    pub role: Urn,
    pub policy: Urn,
    pub attachment: Urn,
    pub addon: Urn,
}

impl DeclaredStack {
    pub fn plan(&self) -> Result<Plan, StackError> {
        Plan::build(&self.stack)
    }
}

pub struct StackDescriptor {
    conf: StackConf,
    naming: NamingPolicy,
    validator: StackValidator,
}

impl StackDescriptor {
    pub fn new(conf: StackConf) -> Result<Self, StackError> {
        let validator = StackValidator::new()?;
        validator.validate_conf(&conf)?;

        Ok(Self {
            naming: NamingPolicy::new(conf.stack.as_str()),
            conf,
            validator,
        })
    }

    pub fn conf(&self) -> &StackConf {
        &self.conf
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    pub fn validator(&self) -> &StackValidator {
        &self.validator
    }

    pub fn cluster_urn(&self) -> Urn {
        Urn::new(ResourceKind::Cluster, self.conf.cluster.name.as_str())
    }

    pub fn role_urn(&self) -> Urn {
        Urn::new(ResourceKind::Role, self.naming.role_name())
    }

    pub fn trust_policy_builder(&self) -> TrustPolicyBuilder {
        TrustPolicyBuilder::new(self.conf.service_account())
    }

    /// Declares cluster, role, policy, attachment and add-on.
    ///
    /// Nothing is resolved here: the trust policy waits on the cluster's
    /// OIDC provider, the attachment on the role and policy, and the add-on
    /// on the cluster name and role ARN.
    pub fn declare(&self) -> Result<DeclaredStack, StackError> {
        let mut stack = Stack::new(self.naming.stack());

        let cluster = ClusterBuilder::from_conf(&self.conf.cluster).build()?;

        let trust_policy = self.trust_policy_builder().build_deferred(
            cluster.output("oidcProviderUrl"),
            cluster.output("oidcProviderArn"),
        );
        let role = RoleBuilder::new(
            self.naming.role_name(),
            self.naming.role_name(),
            trust_policy,
        )
        .build()?;

        let policy = PolicyBuilder::new(
            self.naming.policy_name(),
            self.naming.policy_name(),
            ebs_csi_driver_policy(),
            &self.conf.policy,
        )
        .build()?;

        let attachment =
            AttachmentBuilder::new(self.naming.attachment_name(), &role, &policy).build()?;
        let addon = AddonBuilder::new(self.conf.addon.clone(), &cluster, &role).build()?;

        let (cluster_urn, role_urn, policy_urn, attachment_urn, addon_urn) = (
            cluster.urn().clone(),
            role.urn().clone(),
            policy.urn().clone(),
            attachment.urn().clone(),
            addon.urn().clone(),
        );

        for decl in [cluster, role, policy, attachment, addon] {
            stack.add(decl)?;
        }
        self.validator.validate_stack(&stack)?;

        info!(
            stack = stack.name(),
            resources = stack.len(),
            "declared EBS CSI driver stack"
        );

        Ok(DeclaredStack {
            stack,
            cluster: cluster_urn,
            role: role_urn,
            policy: policy_urn,
            attachment: attachment_urn,
            addon: addon_urn,
        })
    }

    /// Declares the stack and runs it through `engine`.
    pub async fn preview(
        &self,
        engine: &dyn ProvisioningEngine,
    ) -> Result<(DeclaredStack, DeploymentReport), StackError> {
        let declared = self.declare()?;
        let report = Deployment::new(&declared.stack, engine).run().await?;
        self.validator.validate_report(&declared.stack, &report)?;
        Ok((declared, report))
    }
}
