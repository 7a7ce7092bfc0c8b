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

//! Stack configuration file (TOML)

use crate::domain::policy::ServiceAccountRef;
use crate::infrastructure::constants::{
    ADDON_NAME, ADDON_RESOURCE_NAME, ADDON_VERSION, CLUSTER_RESOURCE_NAME, DEFAULT_STACK_NAME,
    POLICY_DESCRIPTION, POLICY_PATH, SERVICE_ACCOUNT_NAME, SERVICE_ACCOUNT_NAMESPACE,
};
use crate::shared::error::StackError;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;

// ============================================================================
// Main stack configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConf {
    pub stack: String,
    pub cluster: ClusterConf,
    pub service_account: ServiceAccountConf,
    pub addon: AddonConf,
    pub policy: PolicyConf,
    pub kubernetes: KubernetesConf,
}

impl Default for StackConf {
    fn default() -> Self {
        Self {
            stack: DEFAULT_STACK_NAME.to_string(),
            cluster: ClusterConf::default(),
            service_account: ServiceAccountConf::default(),
            addon: AddonConf::default(),
            policy: PolicyConf::default(),
            kubernetes: KubernetesConf::default(),
        }
    }
}

impl StackConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> anyhow::Result<Self> {
        let content = read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.as_ref(), e))?;

        let conf: Self =
            toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;

        Ok(conf)
    }

    pub fn service_account(&self) -> ServiceAccountRef {
        ServiceAccountRef::new(
            self.service_account.namespace.clone(),
            self.service_account.name.clone(),
        )
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConf {
    /// Logical name of the cluster resource
    pub name: String,
    pub create_oidc_provider: bool,
}

impl Default for ClusterConf {
    fn default() -> Self {
        Self {
            name: CLUSTER_RESOURCE_NAME.to_string(),
            create_oidc_provider: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceAccountConf {
    pub namespace: String,
    pub name: String,
}

impl Default for ServiceAccountConf {
    fn default() -> Self {
        Self {
            namespace: SERVICE_ACCOUNT_NAMESPACE.to_string(),
            name: SERVICE_ACCOUNT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonConf {
    /// Logical name of the add-on resource
    pub resource_name: String,
    pub name: String,
    pub version: String,
    pub resolve_conflicts: ResolveConflicts,
}

impl Default for AddonConf {
    fn default() -> Self {
        Self {
            resource_name: ADDON_RESOURCE_NAME.to_string(),
            name: ADDON_NAME.to_string(),
            version: ADDON_VERSION.to_string(),
            resolve_conflicts: ResolveConflicts::Overwrite,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConf {
    pub path: String,
    pub description: String,
}

impl Default for PolicyConf {
    fn default() -> Self {
        Self {
            path: POLICY_PATH.to_string(),
            description: POLICY_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConf {
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
}

// ============================================================================
// Add-on conflict resolution
// ============================================================================

/// What EKS does when the add-on's fields collide with existing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolveConflicts {
    None,
    #[default]
    Overwrite,
    Preserve,
}

impl ResolveConflicts {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveConflicts::None => "NONE",
            ResolveConflicts::Overwrite => "OVERWRITE",
            ResolveConflicts::Preserve => "PRESERVE",
        }
    }
}

impl std::str::FromStr for ResolveConflicts {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(ResolveConflicts::None),
            "OVERWRITE" => Ok(ResolveConflicts::Overwrite),
            "PRESERVE" => Ok(ResolveConflicts::Preserve),
            _ => Err(StackError::ConfigError(format!(
                "Invalid resolve_conflicts mode: {} (expected NONE, OVERWRITE or PRESERVE)",
                s
            ))),
        }
    }
}
