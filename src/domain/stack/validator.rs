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
use crate::domain::identity::{AwsAccount, ClusterIdentity};
use crate::domain::policy::{strip_https_scheme, PolicyDocument};
use crate::domain::stack::declaration::{ResourceKind, Stack, Urn};
use crate::domain::stack::deployment::DeploymentReport;
use crate::domain::stack::naming::NamingPolicy;
use crate::infrastructure::constants::{IAM_NAME_MAX_LEN, IAM_POLICY_NAME_MAX_LEN};
use crate::shared::error::StackError;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const STACK_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.-]*$";
const IAM_NAME_PATTERN: &str = r"^[\w+=,.@-]+$";
const ADDON_VERSION_PATTERN: &str = r"^v\d+\.\d+\.\d+-eksbuild\.\d+$";
const DNS_LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const DNS_SUBDOMAIN_PATTERN: &str = r"^[a-z0-9]([-a-z0-9.]*[a-z0-9])?$";

pub struct StackValidator {
    stack_name: Regex,
    iam_name: Regex,
    addon_version: Regex,
    dns_label: Regex,
    dns_subdomain: Regex,
}

impl StackValidator {
    pub fn new() -> Result<Self, StackError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                StackError::validation_error(format!("invalid pattern {}: {}", pattern, e))
            })
        };

        Ok(Self {
            stack_name: compile(STACK_NAME_PATTERN)?,
            iam_name: compile(IAM_NAME_PATTERN)?,
            addon_version: compile(ADDON_VERSION_PATTERN)?,
            dns_label: compile(DNS_LABEL_PATTERN)?,
            dns_subdomain: compile(DNS_SUBDOMAIN_PATTERN)?,
        })
    }

    /// Checks a configuration before anything is declared from it.
    pub fn validate_conf(&self, conf: &StackConf) -> Result<(), StackError> {
        if !self.stack_name.is_match(&conf.stack) {
            return Err(StackError::ConfigError(format!(
                "Invalid stack name '{}': must start with a letter or digit and contain only letters, digits, '-', '_' or '.'",
                conf.stack
            )));
        }

        let naming = NamingPolicy::new(conf.stack.as_str());
        self.validate_iam_name("role", &naming.role_name(), IAM_NAME_MAX_LEN)?;
        self.validate_iam_name("policy", &naming.policy_name(), IAM_POLICY_NAME_MAX_LEN)?;

        if !conf.cluster.create_oidc_provider {
            return Err(StackError::ConfigError(
                "cluster.create_oidc_provider must be true: the driver role is trusted through the cluster's OIDC provider".to_string(),
            ));
        }

        if conf.addon.name.trim().is_empty() {
            return Err(StackError::ConfigError(
                "addon.name must not be empty".to_string(),
            ));
        }

        if !self.addon_version.is_match(&conf.addon.version) {
            return Err(StackError::ConfigError(format!(
                "Invalid add-on version '{}': expected v<major>.<minor>.<patch>-eksbuild.<n>",
                conf.addon.version
            )));
        }

        let namespace = &conf.service_account.namespace;
        if namespace.len() > 63 || !self.dns_label.is_match(namespace) {
            return Err(StackError::ConfigError(format!(
                "Invalid service account namespace '{}': must be a DNS-1123 label",
                namespace
            )));
        }

        let sa_name = &conf.service_account.name;
        if sa_name.len() > 253 || !self.dns_subdomain.is_match(sa_name) {
            return Err(StackError::ConfigError(format!(
                "Invalid service account name '{}': must be a DNS-1123 subdomain",
                sa_name
            )));
        }

        if !conf.policy.path.starts_with('/') || !conf.policy.path.ends_with('/') {
            return Err(StackError::ConfigError(format!(
                "Invalid policy path '{}': must begin and end with '/'",
                conf.policy.path
            )));
        }

        Ok(())
    }

    fn validate_iam_name(&self, what: &str, name: &str, max_len: usize) -> Result<(), StackError> {
        if name.len() > max_len {
            return Err(StackError::ConfigError(format!(
                "IAM {} name '{}' is {} characters long (max {}); use a shorter stack name",
                what,
                name,
                name.len(),
                max_len
            )));
        }
        if !self.iam_name.is_match(name) {
            return Err(StackError::ConfigError(format!(
                "IAM {} name '{}' contains characters IAM does not accept",
                what, name
            )));
        }
        Ok(())
    }

    /// Checks a cluster identity supplied from outside (flags or a seeded preview).
    ///
    /// A URL without `https://` is accepted here and flagged once, when the
    /// trust policy is built from it.
    pub fn validate_identity(&self, identity: &ClusterIdentity) -> Result<(), StackError> {
        if !AwsAccount::is_valid_oidc_provider_arn(&identity.oidc_provider_arn) {
            return Err(StackError::validation_error(format!(
                "Invalid OIDC provider ARN '{}': expected arn:<partition>:iam::<account>:oidc-provider/<issuer>",
                identity.oidc_provider_arn
            )));
        }

        // The missing-scheme case is reported by the trust builder.
        if !identity.has_https_url() {
            return Ok(());
        }

        if let Some(path) = identity.provider_path() {
            if path != strip_https_scheme(&identity.oidc_provider_url) {
                warn!(
                    url = identity.oidc_provider_url.as_str(),
                    arn = identity.oidc_provider_arn.as_str(),
                    "OIDC provider URL and ARN name different issuers"
                );
            }
        }

        Ok(())
    }

    /// Every add-on must run as a role trusted by the cluster it is installed on.
    pub fn validate_stack(&self, stack: &Stack) -> Result<(), StackError> {
        for addon in stack
            .resources()
            .iter()
            .filter(|r| r.kind() == ResourceKind::Addon)
        {
            let clusters = addon
                .property("clusterName")
                .map(|p| p.resources())
                .unwrap_or_default();
            let roles = addon
                .property("serviceAccountRoleArn")
                .map(|p| p.resources())
                .unwrap_or_default();

            if clusters.len() != 1 {
                return Err(StackError::validation_error(format!(
                    "{} must target exactly one declared cluster",
                    addon.urn()
                )));
            }

            for role_urn in roles.iter().filter(|u| u.kind == ResourceKind::Role) {
                let role = stack.get(role_urn).ok_or_else(|| {
                    StackError::unknown_resource(role_urn.to_string(), addon.urn().to_string())
                })?;
                let trusted: BTreeSet<Urn> = role
                    .property("assumeRolePolicy")
                    .map(|p| p.resources())
                    .unwrap_or_default();

                if trusted != clusters {
                    return Err(StackError::validation_error(format!(
                        "{} runs as {} whose trust policy does not reference the add-on's cluster",
                        addon.urn(),
                        role_urn
                    )));
                }
            }
        }

        Ok(())
    }

    /// After resolution: the trust principal must be the cluster's OIDC provider.
    /// Values still unknown are skipped.
    pub fn validate_report(&self, stack: &Stack, report: &DeploymentReport) -> Result<(), StackError> {
        for addon in stack
            .resources()
            .iter()
            .filter(|r| r.kind() == ResourceKind::Addon)
        {
            let Some(cluster) = addon
                .property("clusterName")
                .and_then(|p| p.resources().into_iter().next())
            else {
                continue;
            };
            let Some(provider_arn) = report
                .output(&cluster, "oidcProviderArn")
                .and_then(|v| v.as_str())
            else {
                debug!(cluster = %cluster, "OIDC provider ARN unknown, skipping trust check");
                continue;
            };

            let roles = addon
                .property("serviceAccountRoleArn")
                .map(|p| p.resources())
                .unwrap_or_default();

            for role in roles {
                let Some(trust_json) = report
                    .get(&role)
                    .and_then(|r| r.resource.property("assumeRolePolicy"))
                    .and_then(|v| v.as_str())
                else {
                    continue;
                };

                let document = PolicyDocument::from_json(trust_json)?;
                let principals: Vec<&String> = document
                    .statement
                    .iter()
                    .filter_map(|s| s.principal.as_ref())
                    .filter_map(|p| p.federated.as_ref())
                    .flat_map(|f| f.as_slice())
                    .collect();

                if principals.is_empty() || principals.iter().any(|p| p.as_str() != provider_arn) {
                    return Err(StackError::validation_error(format!(
                        "{} trusts {:?} but {} uses OIDC provider {}",
                        role, principals, cluster, provider_arn
                    )));
                }
            }
        }

        Ok(())
    }
}
