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

use crate::infrastructure::constants::OIDC_URL_SCHEME;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn oidc_provider_arn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^arn:(aws[a-zA-Z-]*):iam::(\d+):oidc-provider/(.+)$")
            .expect("OIDC provider ARN pattern is a valid regex")
    })
}

/// Identity of a provisioned cluster as seen by IAM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdentity {
    pub name: String,
    pub oidc_provider_url: String,
    pub oidc_provider_arn: String,
}

impl ClusterIdentity {
    pub fn new(
        name: impl Into<String>,
        oidc_provider_url: impl Into<String>,
        oidc_provider_arn: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            oidc_provider_url: oidc_provider_url.into(),
            oidc_provider_arn: oidc_provider_arn.into(),
        }
    }

    pub fn has_https_url(&self) -> bool {
        self.oidc_provider_url.starts_with(OIDC_URL_SCHEME)
    }

    /// The provider path IAM registered, e.g. `oidc.eks.region.amazonaws.com/id/EXAMPLE`.
    pub fn provider_path(&self) -> Option<&str> {
        oidc_provider_arn_regex()
            .captures(&self.oidc_provider_arn)
            .and_then(|c| c.get(3))
            .map(|m| m.as_str())
    }

    pub fn account(&self) -> Option<AwsAccount> {
        AwsAccount::from_oidc_provider_arn(&self.oidc_provider_arn)
    }
}

/// Partition and account id, enough to build IAM ARNs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsAccount {
    pub partition: String,
    pub account_id: String,
}

impl AwsAccount {
    pub fn new(partition: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            account_id: account_id.into(),
        }
    }

    pub fn from_oidc_provider_arn(arn: &str) -> Option<Self> {
        let caps = oidc_provider_arn_regex().captures(arn)?;
        Some(Self::new(caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    pub fn is_valid_oidc_provider_arn(arn: &str) -> bool {
        oidc_provider_arn_regex().is_match(arn)
    }

    /// `arn:<partition>:iam::<account>:<kind><path><name>`; `path` must start and end with `/`.
    pub fn iam_arn(&self, kind: &str, path: &str, name: &str) -> String {
        format!(
            "arn:{}:iam::{}:{}{}{}",
            self.partition, self.account_id, kind, path, name
        )
    }
}
