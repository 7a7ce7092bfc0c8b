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

//! Desired-state manifest handed to an external provisioning engine

use crate::domain::stack::declaration::{ResourceKind, Urn};
use crate::domain::stack::deployment::{DeploymentReport, PropertyMap};
use crate::shared::error::StackError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(StackError::ConfigError(format!(
                "Invalid output format: {} (expected json or yaml)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    pub urn: Urn,
    #[serde(rename = "type")]
    pub type_token: &'static str,
    pub name: String,
    pub depends_on: Vec<Urn>,
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredStateManifest {
    pub stack: String,
    pub generated_at: DateTime<Utc>,
    pub resources: Vec<ManifestResource>,
}

impl DesiredStateManifest {
    /// Builds a manifest from a preview. The role's trust policy must be
    /// resolved; other unknown values are written as `[unknown]` for the
    /// engine to fill in.
    pub fn from_report(report: &DeploymentReport) -> Result<Self, StackError> {
        for result in &report.results {
            if result.resource.kind() != ResourceKind::Role {
                continue;
            }
            let known = result
                .resource
                .property("assumeRolePolicy")
                .map(|p| p.is_known())
                .unwrap_or(false);
            if !known {
                return Err(StackError::unresolved(format!(
                    "{}.assumeRolePolicy (supply the cluster's OIDC provider URL and ARN)",
                    result.resource.urn
                )));
            }
        }

        let resources = report
            .results
            .iter()
            .map(|r| ManifestResource {
                urn: r.resource.urn.clone(),
                type_token: r.resource.kind().type_token(),
                name: r.resource.urn.name.clone(),
                depends_on: r.resource.depends_on.clone(),
                properties: r.resource.properties.clone(),
            })
            .collect();

        Ok(Self {
            stack: report.stack.clone(),
            generated_at: Utc::now(),
            resources,
        })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, StackError> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }
}
