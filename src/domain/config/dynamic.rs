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

use crate::domain::config::stack::{ResolveConflicts, StackConf};
use crate::shared::error::StackError;
use std::collections::HashMap;
use tracing::warn;

const KNOWN_KEYS: &[&str] = &[
    "stack.name",
    "cluster.name",
    "cluster.create-oidc-provider",
    "service-account.namespace",
    "service-account.name",
    "addon.resource-name",
    "addon.name",
    "addon.version",
    "addon.resolve-conflicts",
    "policy.path",
    "policy.description",
    "kubernetes.config.file",
    "kubernetes.context",
];

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();

    for config in configs {
        let parts: Vec<&str> = config.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ));
        }

        let key = parts[0].trim();
        let value = parts[1].trim();

        if key.is_empty() {
            return Err(format!("Empty key in config: '{}'", config));
        }

        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

pub fn apply_to_stack_conf(
    configs: &HashMap<String, String>,
    conf: &mut StackConf,
) -> Result<(), StackError> {
    for key in configs.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!(key = key.as_str(), "ignoring unknown dynamic property");
        }
    }

    if let Some(stack) = configs.get("stack.name") {
        conf.stack = stack.clone();
    }

    if let Some(name) = configs.get("cluster.name") {
        conf.cluster.name = name.clone();
    }

    if let Some(flag) = configs.get("cluster.create-oidc-provider") {
        conf.cluster.create_oidc_provider = flag.parse::<bool>().map_err(|_| {
            StackError::ConfigError(format!(
                "cluster.create-oidc-provider must be true or false, got '{}'",
                flag
            ))
        })?;
    }

    if let Some(namespace) = configs.get("service-account.namespace") {
        conf.service_account.namespace = namespace.clone();
    }

    if let Some(name) = configs.get("service-account.name") {
        conf.service_account.name = name.clone();
    }

    if let Some(name) = configs.get("addon.resource-name") {
        conf.addon.resource_name = name.clone();
    }

    if let Some(name) = configs.get("addon.name") {
        conf.addon.name = name.clone();
    }

    if let Some(version) = configs.get("addon.version") {
        conf.addon.version = version.clone();
    }

    if let Some(mode) = configs.get("addon.resolve-conflicts") {
        conf.addon.resolve_conflicts = mode.parse::<ResolveConflicts>()?;
    }

    if let Some(path) = configs.get("policy.path") {
        conf.policy.path = path.clone();
    }

    if let Some(description) = configs.get("policy.description") {
        conf.policy.description = description.clone();
    }

    if let Some(file) = configs.get("kubernetes.config.file") {
        conf.kubernetes.kubeconfig = Some(file.clone());
    }

    if let Some(context) = configs.get("kubernetes.context") {
        conf.kubernetes.context = Some(context.clone());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[&str]) -> HashMap<String, String> {
        let owned: Vec<String> = pairs.iter().map(|s| s.to_string()).collect();
        parse_dynamic_configs(&owned).unwrap()
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        let err = parse_dynamic_configs(&["addon.version".to_string()]).unwrap_err();
        assert!(err.contains("Expected 'key=value'"));
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        assert!(parse_dynamic_configs(&["=v1".to_string()]).is_err());
    }

    #[test]
    fn test_value_may_contain_equals() {
        let map = props(&["policy.description=a=b"]);
        assert_eq!(map.get("policy.description").unwrap(), "a=b");
    }

    #[test]
    fn test_apply_overrides() {
        let mut conf = StackConf::default();
        let map = props(&[
            "stack.name=prod",
            "addon.version=v1.20.0-eksbuild.1",
            "addon.resolve-conflicts=preserve",
            "service-account.namespace=storage",
        ]);
        apply_to_stack_conf(&map, &mut conf).unwrap();

        assert_eq!(conf.stack, "prod");
        assert_eq!(conf.addon.version, "v1.20.0-eksbuild.1");
        assert_eq!(conf.addon.resolve_conflicts, ResolveConflicts::Preserve);
        assert_eq!(conf.service_account.namespace, "storage");
        assert_eq!(conf.service_account.name, "ebs-csi-controller-sa");
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut conf = StackConf::default();
        let map = props(&["cluster.create-oidc-provider=maybe"]);
        assert!(apply_to_stack_conf(&map, &mut conf).is_err());

        let map = props(&["addon.resolve-conflicts=REPLACE"]);
        assert!(apply_to_stack_conf(&map, &mut conf).is_err());
    }
}
