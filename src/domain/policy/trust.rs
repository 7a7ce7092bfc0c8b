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

use crate::domain::identity::ClusterIdentity;
use crate::domain::output::Output;
use crate::domain::policy::document::{OneOrMany, PolicyDocument, Principal, Statement};
use crate::infrastructure::constants::{
    ACTION_ASSUME_ROLE_WITH_WEB_IDENTITY, CONDITION_STRING_EQUALS, OIDC_SUBJECT_CLAIM_SUFFIX,
    OIDC_URL_SCHEME, SERVICE_ACCOUNT_NAME, SERVICE_ACCOUNT_NAMESPACE,
    SERVICE_ACCOUNT_SUBJECT_PREFIX,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The Kubernetes service account allowed to assume the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountRef {
    pub namespace: String,
    pub name: String,
}

impl ServiceAccountRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `system:serviceaccount:<namespace>:<name>`, the token's `sub` claim.
    pub fn subject(&self) -> String {
        format!(
            "{}:{}:{}",
            SERVICE_ACCOUNT_SUBJECT_PREFIX, self.namespace, self.name
        )
    }
}

impl Default for ServiceAccountRef {
    fn default() -> Self {
        Self::new(SERVICE_ACCOUNT_NAMESPACE, SERVICE_ACCOUNT_NAME)
    }
}

/// Removes a single leading `https://`. Anything else is returned untouched.
pub fn strip_https_scheme(url: &str) -> &str {
    url.strip_prefix(OIDC_URL_SCHEME).unwrap_or(url)
}

/// `<issuer host and path>:sub`
pub fn subject_claim_key(oidc_provider_url: &str) -> String {
    format!(
        "{}{}",
        strip_https_scheme(oidc_provider_url),
        OIDC_SUBJECT_CLAIM_SUFFIX
    )
}

/// Builds the web-identity trust policy binding a role to one service account.
#[derive(Debug, Clone, Default)]
pub struct TrustPolicyBuilder {
    service_account: ServiceAccountRef,
}

impl TrustPolicyBuilder {
    pub fn new(service_account: ServiceAccountRef) -> Self {
        Self { service_account }
    }

    pub fn service_account(&self) -> &ServiceAccountRef {
        &self.service_account
    }

    pub fn build(&self, oidc_provider_url: &str, oidc_provider_arn: &str) -> PolicyDocument {
        // The condition key is only meaningful for https issuers; other
        // shapes are passed through as-is and flagged.
        if !oidc_provider_url.starts_with(OIDC_URL_SCHEME) {
            warn!(
                url = oidc_provider_url,
                "OIDC provider URL has no https:// prefix; trust condition key will not match the issuer"
            );
        }

        let statement = Statement::allow(OneOrMany::one(ACTION_ASSUME_ROLE_WITH_WEB_IDENTITY))
            .with_principal(Principal::federated(oidc_provider_arn))
            .with_condition(
                CONDITION_STRING_EQUALS,
                subject_claim_key(oidc_provider_url),
                OneOrMany::one(self.service_account.subject()),
            );

        PolicyDocument::new(vec![statement])
    }

    pub fn build_for(&self, identity: &ClusterIdentity) -> PolicyDocument {
        self.build(&identity.oidc_provider_url, &identity.oidc_provider_arn)
    }

    /// Deferred form: evaluates once both the URL and the ARN are known.
    pub fn build_deferred(
        &self,
        oidc_provider_url: Output<String>,
        oidc_provider_arn: Output<String>,
    ) -> Output<PolicyDocument> {
        let builder = self.clone();
        oidc_provider_url
            .zip(oidc_provider_arn)
            .apply(move |(url, arn)| builder.build(&url, &arn))
    }
}
