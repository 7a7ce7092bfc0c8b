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

use crate::shared::error::StackError;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{Api, Client};

/// Read-only view of the workloads the EBS CSI add-on installs.
///
/// The service account lives in the client's namespace. The controller and
/// node workloads are looked up in the namespace passed in, since EKS
/// installs them in `kube-system` whatever service account is configured.
#[async_trait::async_trait]
pub trait AddonKubeClient: Send + Sync {
    async fn get_service_account(&self, name: &str) -> Result<ServiceAccount, StackError>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, StackError>;

    async fn get_daemonset(&self, namespace: &str, name: &str) -> Result<DaemonSet, StackError>;

    fn namespace(&self) -> &str;
}

pub struct AddonKubeClientImpl {
    client: Client,
    namespace: String,
}

impl AddonKubeClientImpl {
    pub async fn new(namespace: String) -> Result<Self, StackError> {
        let client = Client::try_default().await.map_err(|e| {
            StackError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    pub async fn new_with_config(
        namespace: String,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, StackError> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        // Nothing selected: fall back to in-cluster config or the default kubeconfig.
        if kubeconfig_path.is_none() && context.is_none() {
            return Self::new(namespace).await;
        }

        let kubeconfig = if let Some(path) = kubeconfig_path {
            Kubeconfig::read_from(path)
                .map_err(|e| StackError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        } else {
            Kubeconfig::read()
                .map_err(|e| StackError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        };

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                StackError::KubeError(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            StackError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    fn map_get_error(kind: &str, namespace: &str, name: &str, e: kube::Error) -> StackError {
        match e {
            kube::Error::Api(ae) if ae.code == 404 => StackError::not_found(kind, name, namespace),
            kube::Error::Api(ae) => StackError::KubeError(ae.message),
            e => StackError::KubeError(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl AddonKubeClient for AddonKubeClientImpl {
    async fn get_service_account(&self, name: &str) -> Result<ServiceAccount, StackError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_get_error("ServiceAccount", &self.namespace, name, e))
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, StackError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_get_error("Deployment", namespace, name, e))
    }

    async fn get_daemonset(&self, namespace: &str, name: &str) -> Result<DaemonSet, StackError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_get_error("DaemonSet", namespace, name, e))
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}
