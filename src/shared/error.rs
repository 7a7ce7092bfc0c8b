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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Kubernetes API error: {0}")]
    KubeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {resource_type} '{name}' in namespace '{namespace}'")]
    NotFound {
        resource_type: String,
        name: String,
        namespace: String,
    },

    #[error("Resource declared twice: {0}")]
    DuplicateResource(String),

    #[error("Reference to undeclared resource: {urn} (referenced by {referenced_by})")]
    UnknownResource { urn: String, referenced_by: String },

    #[error("Dependency cycle between resources: {0}")]
    DependencyCycle(String),

    #[error("Value not yet known: {0}")]
    Unresolved(String),

    #[error("Provisioning engine error: {0}")]
    EngineError(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<kube::Error> for StackError {
    fn from(err: kube::Error) -> Self {
        StackError::KubeError(err.to_string())
    }
}

impl StackError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn validation_error(context: impl Into<String>) -> Self {
        Self::ValidationError(context.into())
    }

    pub fn unresolved(what: impl Into<String>) -> Self {
        Self::Unresolved(what.into())
    }

    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn unknown_resource(urn: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::UnknownResource {
            urn: urn.into(),
            referenced_by: referenced_by.into(),
        }
    }
}
