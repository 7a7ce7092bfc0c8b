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

use ebs_csi_stack::domain::stack::{OutputFormat, PropertyMap, ResolvedResource};
use ebs_csi_stack::*;
use std::io::Write;

mod test_utils {
    use super::*;

    pub const URL: &str = "https://oidc.eks.us-west-2.amazonaws.com/id/EXAMPLE";
    pub const ARN: &str =
        "arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-west-2.amazonaws.com/id/EXAMPLE";

    pub fn descriptor(stack: &str) -> StackDescriptor {
        let mut conf = StackConf::default();
        conf.stack = stack.to_string();
        StackDescriptor::new(conf).unwrap()
    }

    pub fn identity() -> ClusterIdentity {
        ClusterIdentity::new("prod-eks", URL, ARN)
    }

    pub fn seeded_engine(descriptor: &StackDescriptor) -> PreviewEngine {
        PreviewEngine::new().with_cluster_identity(&descriptor.cluster_urn(), &identity())
    }

    /// Engine that refuses one resource kind.
    pub struct FailingEngine(pub ResourceKind);

    #[async_trait::async_trait]
    impl ProvisioningEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        async fn register(&self, resource: &ResolvedResource) -> Result<PropertyMap> {
            if resource.kind() == self.0 {
                return Err(StackError::EngineError(format!(
                    "{} already exists",
                    resource.urn
                )));
            }
            PreviewEngine::new().register(resource).await
        }
    }
}

#[test]
fn test_declare_builds_five_resources() {
    let declared = test_utils::descriptor("dev").declare().unwrap();

    assert_eq!(declared.stack.len(), 5);
    assert_eq!(declared.cluster, Urn::new(ResourceKind::Cluster, "my-cluster"));
    assert_eq!(
        declared.role,
        Urn::new(ResourceKind::Role, "dev-AmazonEKS_EBS_CSI_DriverRole")
    );
    assert_eq!(
        declared.policy,
        Urn::new(ResourceKind::Policy, "dev-AmazonEKS_EBS_CSI_Driver_Policy")
    );
    assert_eq!(
        declared.attachment,
        Urn::new(ResourceKind::RolePolicyAttachment, "dev-csi-driver-policy")
    );
    assert_eq!(
        declared.addon,
        Urn::new(ResourceKind::Addon, "aws-ebs-csi-driver-addon")
    );
}

#[test]
fn test_plan_orders_by_data_dependencies() {
    let declared = test_utils::descriptor("dev").declare().unwrap();
    let plan = declared.plan().unwrap();

    assert_eq!(plan.levels().len(), 3);
    assert_eq!(
        plan.levels()[0],
        vec![declared.cluster.clone(), declared.policy.clone()]
    );
    assert_eq!(plan.levels()[1], vec![declared.role.clone()]);
    assert_eq!(
        plan.levels()[2],
        vec![declared.attachment.clone(), declared.addon.clone()]
    );

    let attachment = plan.step(&declared.attachment).unwrap();
    assert_eq!(
        attachment.depends_on,
        vec![declared.role.clone(), declared.policy.clone()]
    );
    let addon = plan.step(&declared.addon).unwrap();
    assert_eq!(
        addon.depends_on,
        vec![declared.cluster.clone(), declared.role.clone()]
    );
}

#[test]
fn test_add_on_and_role_share_the_cluster() {
    let declared = test_utils::descriptor("dev").declare().unwrap();
    let role = declared.stack.get(&declared.role).unwrap();
    let addon = declared.stack.get(&declared.addon).unwrap();

    let trusted = role.property("assumeRolePolicy").unwrap().resources();
    let targeted = addon.property("clusterName").unwrap().resources();
    assert_eq!(trusted, targeted);
}

#[test]
fn test_mismatched_cluster_is_rejected() {
    let validator = StackValidator::new().unwrap();
    let mut stack = Stack::new("dev");

    let a = ClusterBuilder::new("a").build().unwrap();
    let b = ClusterBuilder::new("b").build().unwrap();
    let trust = TrustPolicyBuilder::default()
        .build_deferred(a.output("oidcProviderUrl"), a.output("oidcProviderArn"));
    let role = RoleBuilder::new("r", "r", trust).build().unwrap();
    let addon = AddonBuilder::new(StackConf::default().addon, &b, &role)
        .build()
        .unwrap();

    for decl in [a, b, role, addon] {
        stack.add(decl).unwrap();
    }

    let err = validator.validate_stack(&stack).unwrap_err();
    assert!(matches!(err, StackError::ValidationError(_)));
}

#[tokio::test]
async fn test_preview_without_identity_leaves_values_unknown() {
    let descriptor = test_utils::descriptor("dev");
    let (declared, report) = descriptor.preview(&PreviewEngine::new()).await.unwrap();

    assert!(!report.is_fully_resolved());
    let unresolved = report.unresolved();
    assert_eq!(unresolved.len(), 4);
    assert!(unresolved
        .iter()
        .any(|u| u.ends_with("assumeRolePolicy")));

    let role = report.get(&declared.role).unwrap();
    assert_eq!(
        role.resource.property("assumeRolePolicy"),
        Some(&PropertyValue::Unknown)
    );
    // Inputs that need no dependency are known straight away
    assert_eq!(
        role.resource.property("name").and_then(|v| v.as_str()),
        Some("dev-AmazonEKS_EBS_CSI_DriverRole")
    );
}

#[tokio::test]
async fn test_preview_with_identity_resolves_every_input() {
    let descriptor = test_utils::descriptor("prod");
    let engine = test_utils::seeded_engine(&descriptor);
    let (declared, report) = descriptor.preview(&engine).await.unwrap();

    assert!(report.is_fully_resolved(), "{:?}", report.unresolved());

    let role = report.get(&declared.role).unwrap();
    let trust = role
        .resource
        .property("assumeRolePolicy")
        .and_then(|v| v.as_str())
        .unwrap();
    let doc = PolicyDocument::from_json(trust).unwrap();
    assert_eq!(
        doc,
        TrustPolicyBuilder::default().build_for(&test_utils::identity())
    );

    let role_arn = "arn:aws:iam::123456789012:role/prod-AmazonEKS_EBS_CSI_DriverRole";
    assert_eq!(
        report.output(&declared.role, "arn").and_then(|v| v.as_str()),
        Some(role_arn)
    );

    let addon = report.get(&declared.addon).unwrap();
    assert_eq!(
        addon.resource.property("clusterName").and_then(|v| v.as_str()),
        Some("prod-eks")
    );
    assert_eq!(
        addon
            .resource
            .property("serviceAccountRoleArn")
            .and_then(|v| v.as_str()),
        Some(role_arn)
    );
    assert_eq!(
        addon
            .resource
            .property("resolveConflicts")
            .and_then(|v| v.as_str()),
        Some("OVERWRITE")
    );

    let attachment = report.get(&declared.attachment).unwrap();
    assert_eq!(
        attachment
            .resource
            .property("policyArn")
            .and_then(|v| v.as_str()),
        Some("arn:aws:iam::123456789012:policy/prod-AmazonEKS_EBS_CSI_Driver_Policy")
    );
}

#[tokio::test]
async fn test_seeded_role_arn_wins_over_derived() {
    let descriptor = test_utils::descriptor("dev");
    let engine = test_utils::seeded_engine(&descriptor).with_output(
        descriptor.role_urn(),
        "arn",
        "arn:aws:iam::123456789012:role/imported",
    );
    let (declared, report) = descriptor.preview(&engine).await.unwrap();

    let addon = report.get(&declared.addon).unwrap();
    assert_eq!(
        addon
            .resource
            .property("serviceAccountRoleArn")
            .and_then(|v| v.as_str()),
        Some("arn:aws:iam::123456789012:role/imported")
    );
}

#[tokio::test]
async fn test_engine_failure_is_surfaced() {
    let descriptor = test_utils::descriptor("dev");
    let engine = test_utils::FailingEngine(ResourceKind::Role);

    let err = descriptor.preview(&engine).await.unwrap_err();
    assert!(matches!(err, StackError::EngineError(_)));
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_manifest_requires_resolved_trust_policy() {
    let descriptor = test_utils::descriptor("dev");
    let (_, report) = descriptor.preview(&PreviewEngine::new()).await.unwrap();
    let err = DesiredStateManifest::from_report(&report).unwrap_err();
    assert!(matches!(err, StackError::Unresolved(_)));
}

#[tokio::test]
async fn test_manifest_renders_json_and_yaml() {
    let descriptor = test_utils::descriptor("dev");
    let engine = test_utils::seeded_engine(&descriptor);
    let (_, report) = descriptor.preview(&engine).await.unwrap();
    let manifest = DesiredStateManifest::from_report(&report).unwrap();

    let json = manifest.render(OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["stack"], "dev");
    assert_eq!(value["resources"].as_array().unwrap().len(), 5);
    assert_eq!(value["resources"][0]["type"], "eks:index:Cluster");
    assert_eq!(
        value["resources"][0]["urn"],
        "eks:index:Cluster::my-cluster"
    );
    assert!(value["generatedAt"].is_string());

    let yaml = manifest.render(OutputFormat::Yaml).unwrap();
    assert!(yaml.contains("addonName: aws-ebs-csi-driver"));
    assert!(yaml.contains("addonVersion: v1.11.4-eksbuild.1"));
}

#[test]
fn test_output_format_parse() {
    assert_eq!("YAML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
    assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert!("xml".parse::<OutputFormat>().is_err());
}

#[test]
fn test_conf_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
stack = "staging"

[service_account]
namespace = "storage"

[addon]
version = "v1.20.0-eksbuild.1"
resolve_conflicts = "PRESERVE"
"#
    )
    .unwrap();

    let conf = StackConf::from(file.path().to_str().unwrap()).unwrap();
    assert_eq!(conf.stack, "staging");
    assert_eq!(conf.service_account.namespace, "storage");
    assert_eq!(conf.service_account.name, "ebs-csi-controller-sa");
    assert_eq!(conf.addon.version, "v1.20.0-eksbuild.1");
    assert_eq!(conf.addon.resolve_conflicts, ResolveConflicts::Preserve);
    assert_eq!(conf.addon.name, "aws-ebs-csi-driver");
    assert_eq!(conf.cluster.name, "my-cluster");

    let descriptor = StackDescriptor::new(conf).unwrap();
    assert_eq!(
        descriptor.naming().role_name(),
        "staging-AmazonEKS_EBS_CSI_DriverRole"
    );
    assert_eq!(
        descriptor.trust_policy_builder().service_account().subject(),
        "system:serviceaccount:storage:ebs-csi-controller-sa"
    );
}

#[test]
fn test_invalid_conf_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "stack = [").unwrap();
    assert!(StackConf::from(file.path().to_str().unwrap()).is_err());
    assert!(StackConf::from("/nonexistent/ebs-csi-stack.toml").is_err());
}

#[test]
fn test_invalid_conf_is_rejected_by_descriptor() {
    let mut conf = StackConf::default();
    conf.addon.version = "latest".to_string();
    assert!(matches!(
        StackDescriptor::new(conf),
        Err(StackError::ConfigError(_))
    ));
}
