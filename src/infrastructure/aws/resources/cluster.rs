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

use crate::domain::config::ClusterConf;
use crate::domain::stack::{ResourceDecl, ResourceKind};
use crate::shared::error::StackError;

pub struct ClusterBuilder {
    name: String,
    create_oidc_provider: bool,
}

impl ClusterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_oidc_provider: true,
        }
    }

    pub fn from_conf(conf: &ClusterConf) -> Self {
        Self::new(conf.name.clone()).create_oidc_provider(conf.create_oidc_provider)
    }

    pub fn create_oidc_provider(mut self, enabled: bool) -> Self {
        self.create_oidc_provider = enabled;
        self
    }

    pub fn build(&self) -> Result<ResourceDecl, StackError> {
        if self.name.trim().is_empty() {
            return Err(StackError::config_error("cluster name must not be empty"));
        }

        // Without an OIDC provider there is nothing for the role to trust.
        if !self.create_oidc_provider {
            return Err(StackError::config_error(format!(
                "cluster '{}' must create an OIDC provider for the CSI driver role",
                self.name
            )));
        }

        Ok(ResourceDecl::new(ResourceKind::Cluster, &self.name)
            .with_literal("createOidcProvider", self.create_oidc_provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_requests_oidc_provider() {
        let decl = ClusterBuilder::new("my-cluster").build().unwrap();
        assert_eq!(decl.kind(), ResourceKind::Cluster);
        assert!(decl.dependencies().is_empty());
        assert!(decl.property("createOidcProvider").unwrap().is_constant());
    }

    #[test]
    fn test_cluster_without_oidc_provider_is_rejected() {
        let result = ClusterBuilder::new("my-cluster")
            .create_oidc_provider(false)
            .build();
        assert!(matches!(result, Err(StackError::ConfigError(_))));
    }
}
