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

use crate::domain::config::AddonConf;
use crate::domain::stack::{ResourceDecl, ResourceKind};
use crate::shared::error::StackError;

/// EKS add-on installed on `cluster`, running as `role`.
pub struct AddonBuilder<'a> {
    conf: AddonConf,
    cluster: &'a ResourceDecl,
    role: &'a ResourceDecl,
}

impl<'a> AddonBuilder<'a> {
    pub fn new(conf: AddonConf, cluster: &'a ResourceDecl, role: &'a ResourceDecl) -> Self {
        Self {
            conf,
            cluster,
            role,
        }
    }

    pub fn build(&self) -> Result<ResourceDecl, StackError> {
        if self.cluster.kind() != ResourceKind::Cluster {
            return Err(StackError::validation_error(format!(
                "add-on target must be a cluster, got {}",
                self.cluster.urn()
            )));
        }
        if self.role.kind() != ResourceKind::Role {
            return Err(StackError::validation_error(format!(
                "add-on service account role must be an IAM role, got {}",
                self.role.urn()
            )));
        }

        Ok(ResourceDecl::new(ResourceKind::Addon, &self.conf.resource_name)
            .with_property(
                "clusterName",
                self.cluster.output::<String>("name").into_value(),
            )
            .with_literal("addonName", self.conf.name.as_str())
            .with_literal("addonVersion", self.conf.version.as_str())
            .with_literal("resolveConflicts", self.conf.resolve_conflicts.as_str())
            .with_property(
                "serviceAccountRoleArn",
                self.role.output::<String>("arn").into_value(),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::output::Output;
    use crate::domain::policy::PolicyDocument;
    use crate::infrastructure::aws::{ClusterBuilder, RoleBuilder};
    use std::collections::BTreeSet;

    #[test]
    fn test_addon_defaults() {
        let cluster = ClusterBuilder::new("my-cluster").build().unwrap();
        let role = RoleBuilder::new("role", "r", Output::known(PolicyDocument::new(vec![])))
            .build()
            .unwrap();

        let decl = AddonBuilder::new(AddonConf::default(), &cluster, &role)
            .build()
            .unwrap();

        assert_eq!(decl.name(), "aws-ebs-csi-driver-addon");
        assert_eq!(
            decl.property("clusterName").unwrap().resources(),
            BTreeSet::from([cluster.urn().clone()])
        );
        assert_eq!(
            decl.property("serviceAccountRoleArn").unwrap().resources(),
            BTreeSet::from([role.urn().clone()])
        );
        assert!(decl.property("resolveConflicts").unwrap().is_constant());
    }

    #[test]
    fn test_swapped_cluster_and_role_are_rejected() {
        let cluster = ClusterBuilder::new("my-cluster").build().unwrap();
        let role = RoleBuilder::new("role", "r", Output::known(PolicyDocument::new(vec![])))
            .build()
            .unwrap();
        let result = AddonBuilder::new(AddonConf::default(), &role, &cluster).build();
        assert!(result.is_err());
    }
}
