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

use crate::infrastructure::constants::{
    ADDON_WORKLOAD_NAMESPACE, CONTROLLER_DEPLOYMENT_NAME, NODE_DAEMONSET_NAME,
    ROLE_ARN_ANNOTATION,
};
use crate::infrastructure::kubernetes::client::{AddonKubeClient, AddonKubeClientImpl};
use crate::shared::error::StackError;
use backon::{ConstantBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, info};

/// How the controller's service account is bound to an IAM role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleBindingState {
    /// Annotated with the role we expected.
    Matches(String),
    /// Annotated, and no expectation was given.
    Annotated(String),
    Mismatch { expected: String, actual: String },
    Unannotated,
    ServiceAccountMissing,
}

impl RoleBindingState {
    pub fn is_bound(&self) -> bool {
        matches!(
            self,
            RoleBindingState::Matches(_) | RoleBindingState::Annotated(_)
        )
    }

    pub fn role_arn(&self) -> Option<&str> {
        match self {
            RoleBindingState::Matches(arn) | RoleBindingState::Annotated(arn) => Some(arn),
            RoleBindingState::Mismatch { actual, .. } => Some(actual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadStatus {
    pub name: String,
    pub desired: u32,
    pub ready: u32,
}

impl WorkloadStatus {
    pub fn is_ready(&self) -> bool {
        self.desired > 0 && self.ready >= self.desired
    }
}

#[derive(Debug, Clone)]
pub struct AddonStatus {
    pub namespace: String,
    pub service_account: String,
    pub role_binding: RoleBindingState,
    pub controller: Option<WorkloadStatus>,
    pub node: Option<WorkloadStatus>,
}

impl AddonStatus {
    pub fn is_ready(&self) -> bool {
        self.role_binding.is_bound()
            && self.controller.as_ref().is_some_and(|c| c.is_ready())
            && self.node.as_ref().is_some_and(|n| n.is_ready())
    }

    fn summary(&self) -> String {
        let workload = |w: &Option<WorkloadStatus>| match w {
            Some(w) => format!("{}/{}", w.ready, w.desired),
            None => "missing".to_string(),
        };
        format!(
            "role binding {:?}, controller {}, node {}",
            self.role_binding,
            workload(&self.controller),
            workload(&self.node)
        )
    }
}

/// Checks what the add-on actually installed in the cluster.
pub struct AddonInspector {
    client: Box<dyn AddonKubeClient>,
    service_account: String,
}

impl AddonInspector {
    pub fn new(client: Box<dyn AddonKubeClient>, service_account: impl Into<String>) -> Self {
        Self {
            client,
            service_account: service_account.into(),
        }
    }

    pub async fn new_with_config(
        namespace: String,
        service_account: String,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, StackError> {
        let client =
            AddonKubeClientImpl::new_with_config(namespace, kubeconfig_path, context).await?;
        Ok(Self::new(Box::new(client), service_account))
    }

    pub fn namespace(&self) -> &str {
        self.client.namespace()
    }

    pub async fn inspect(&self, expected_role_arn: Option<&str>) -> Result<AddonStatus, StackError> {
        let role_binding = match self.client.get_service_account(&self.service_account).await {
            Ok(sa) => {
                let annotation = sa
                    .metadata
                    .annotations
                    .as_ref()
                    .and_then(|a| a.get(ROLE_ARN_ANNOTATION))
                    .cloned();
                match (annotation, expected_role_arn) {
                    (None, _) => RoleBindingState::Unannotated,
                    (Some(actual), Some(expected)) if actual == expected => {
                        RoleBindingState::Matches(actual)
                    }
                    (Some(actual), Some(expected)) => RoleBindingState::Mismatch {
                        expected: expected.to_string(),
                        actual,
                    },
                    (Some(actual), None) => RoleBindingState::Annotated(actual),
                }
            }
            Err(StackError::NotFound { .. }) => RoleBindingState::ServiceAccountMissing,
            Err(e) => return Err(e),
        };

        let controller = match self
            .client
            .get_deployment(ADDON_WORKLOAD_NAMESPACE, CONTROLLER_DEPLOYMENT_NAME)
            .await {
            Ok(deployment) => {
                let desired = deployment
                    .spec
                    .as_ref()
                    .and_then(|s| s.replicas)
                    .unwrap_or(0) as u32;
                let ready = deployment
                    .status
                    .as_ref()
                    .and_then(|s| s.ready_replicas)
                    .unwrap_or(0) as u32;
                Some(WorkloadStatus {
                    name: deployment.metadata.name.clone().unwrap_or_default(),
                    desired,
                    ready,
                })
            }
            Err(StackError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let node = match self
            .client
            .get_daemonset(ADDON_WORKLOAD_NAMESPACE, NODE_DAEMONSET_NAME)
            .await {
            Ok(ds) => {
                let (desired, ready) = ds
                    .status
                    .as_ref()
                    .map(|s| (s.desired_number_scheduled, s.number_ready))
                    .unwrap_or((0, 0));
                Some(WorkloadStatus {
                    name: ds.metadata.name.clone().unwrap_or_default(),
                    desired: desired.max(0) as u32,
                    ready: ready.max(0) as u32,
                })
            }
            Err(StackError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(AddonStatus {
            namespace: self.client.namespace().to_string(),
            service_account: self.service_account.clone(),
            role_binding,
            controller,
            node,
        })
    }

    /// Polls until the add-on is ready. A service account bound to the wrong
    /// role fails at once; anything else is retried until `max_wait`, which
    /// also bounds time spent inside slow API calls.
    pub async fn wait_until_ready(
        &self,
        expected_role_arn: Option<&str>,
        interval: Duration,
        max_wait: Duration,
    ) -> Result<AddonStatus, StackError> {
        let max_times = (max_wait.as_millis() / interval.as_millis().max(1)).max(1) as usize;
        let backoff = ConstantBuilder::default()
            .with_delay(interval)
            .with_max_times(max_times);

        let poll = (move || async move {
            let status = self.inspect(expected_role_arn).await?;
            if let RoleBindingState::Mismatch { expected, actual } = &status.role_binding {
                return Err(StackError::validation_error(format!(
                    "service account {}/{} is bound to {} instead of {}",
                    status.namespace, status.service_account, actual, expected
                )));
            }
            if status.is_ready() {
                Ok(status)
            } else {
                Err(StackError::Timeout(format!(
                    "add-on not ready after {:?}: {}",
                    max_wait,
                    status.summary()
                )))
            }
        })
        .retry(backoff)
        .when(|e| matches!(e, StackError::Timeout(_)))
        .notify(|e, delay| debug!(error = %e, ?delay, "add-on not ready yet"));

        let status = tokio::time::timeout(max_wait, poll)
            .await
            .map_err(|_| {
                StackError::Timeout(format!("add-on not ready after {:?}", max_wait))
            })??;

        info!(namespace = status.namespace.as_str(), "EBS CSI add-on is ready");
        Ok(status)
    }
}
