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

use ebs_csi_stack::domain::policy::{strip_https_scheme, subject_claim_key, Effect};
use ebs_csi_stack::*;
use serde_json::json;
use std::collections::BTreeMap;

mod test_utils {
    use super::*;

    pub const URL: &str = "https://x.example.com";
    pub const ARN: &str = "arn:aws:iam::111:oidc-provider/x.example.com";

    pub fn identity() -> ClusterIdentity {
        ClusterIdentity::new("my-cluster", URL, ARN)
    }
}

#[test]
fn test_strip_removes_exactly_one_https_prefix() {
    assert_eq!(
        strip_https_scheme("https://oidc.eks.region.amazonaws.com/id/EXAMPLE"),
        "oidc.eks.region.amazonaws.com/id/EXAMPLE"
    );
    assert_eq!(strip_https_scheme("https://https://a"), "https://a");
    assert_eq!(strip_https_scheme("https://a/https://b"), "a/https://b");
}

#[test]
fn test_url_without_https_is_left_untouched() {
    assert_eq!(strip_https_scheme("http://a.example.com"), "http://a.example.com");
    assert_eq!(strip_https_scheme("a.example.com"), "a.example.com");
    assert_eq!(strip_https_scheme("HTTPS://a"), "HTTPS://a");
}

#[test]
fn test_subject_claim_key_for_eks_issuer() {
    assert_eq!(
        subject_claim_key("https://oidc.eks.region.amazonaws.com/id/EXAMPLE"),
        "oidc.eks.region.amazonaws.com/id/EXAMPLE:sub"
    );
}

#[test]
fn test_trust_policy_has_one_principal_and_one_action() {
    let doc = TrustPolicyBuilder::default().build_for(&test_utils::identity());

    assert_eq!(doc.statement.len(), 1);
    let statement = &doc.statement[0];
    assert_eq!(statement.effect, Effect::Allow);
    assert_eq!(statement.action.as_slice(), ["sts:AssumeRoleWithWebIdentity"]);

    let principal = statement.principal.as_ref().unwrap();
    assert_eq!(principal.identifier_count(), 1);
    assert_eq!(
        principal.federated.as_ref().unwrap().as_slice(),
        [test_utils::ARN]
    );
}

#[test]
fn test_default_service_account_subject() {
    let builder = TrustPolicyBuilder::default();
    assert_eq!(
        builder.service_account().subject(),
        "system:serviceaccount:kube-system:ebs-csi-controller-sa"
    );

    let custom = ServiceAccountRef::new("storage", "csi-sa");
    assert_eq!(custom.subject(), "system:serviceaccount:storage:csi-sa");
}

#[test]
fn test_end_to_end_trust_condition() {
    let doc = TrustPolicyBuilder::default().build_for(&test_utils::identity());
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(
        value["Statement"][0]["Condition"],
        json!({"StringEquals": {"x.example.com:sub": "system:serviceaccount:kube-system:ebs-csi-controller-sa"}})
    );
    assert_eq!(
        value["Statement"][0]["Principal"],
        json!({"Federated": test_utils::ARN})
    );
    assert_eq!(value["Version"], json!("2012-10-17"));
}

#[test]
fn test_trust_policy_keeps_malformed_key_for_non_https_url() {
    let doc = TrustPolicyBuilder::default().build("x.example.com", test_utils::ARN);
    let value = serde_json::to_value(&doc).unwrap();
    assert!(value["Statement"][0]["Condition"]["StringEquals"]
        .get("x.example.com:sub")
        .is_some());

    let doc = TrustPolicyBuilder::default().build("http://x.example.com", test_utils::ARN);
    let value = serde_json::to_value(&doc).unwrap();
    assert!(value["Statement"][0]["Condition"]["StringEquals"]
        .get("http://x.example.com:sub")
        .is_some());
}

#[test]
fn test_deferred_trust_policy_waits_for_url_and_arn() {
    let cluster = Urn::new(ResourceKind::Cluster, "my-cluster");
    let doc = TrustPolicyBuilder::default().build_deferred(
        Output::attribute(cluster.clone(), "oidcProviderUrl"),
        Output::attribute(cluster.clone(), "oidcProviderArn"),
    );
    assert_eq!(doc.resources().len(), 1);

    let mut source = BTreeMap::new();
    source.insert(
        AttributeRef::new(cluster.clone(), "oidcProviderUrl"),
        json!(test_utils::URL),
    );
    assert!(doc.resolve(&source).unwrap().is_none());

    source.insert(
        AttributeRef::new(cluster, "oidcProviderArn"),
        json!(test_utils::ARN),
    );
    let resolved = doc.resolve(&source).unwrap().unwrap();
    assert_eq!(
        resolved,
        TrustPolicyBuilder::default().build_for(&test_utils::identity())
    );
}

#[test]
fn test_trust_policy_json_round_trip() {
    let doc = TrustPolicyBuilder::default().build_for(&test_utils::identity());
    let text = doc.to_json().unwrap();
    assert_eq!(PolicyDocument::from_json(&text).unwrap(), doc);
}

#[test]
fn test_permission_policy_is_stable() {
    let first = ebs_csi_driver_policy().to_json().unwrap();
    let second = ebs_csi_driver_policy().to_json().unwrap();
    assert_eq!(first, second);

    let reparsed = PolicyDocument::from_json(&first).unwrap();
    assert_eq!(reparsed.to_json().unwrap(), first);
}

#[test]
fn test_permission_policy_statements() {
    let doc = ebs_csi_driver_policy();
    assert_eq!(doc.version, "2012-10-17");
    assert_eq!(doc.statement.len(), 9);
    assert!(doc.statement.iter().all(|s| s.effect == Effect::Allow));

    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["Statement"][0]["Resource"], json!("*"));
    assert_eq!(
        value["Statement"][1]["Condition"],
        json!({"StringEquals": {"ec2:CreateAction": ["CreateVolume", "CreateSnapshot"]}})
    );
    assert_eq!(
        value["Statement"][3]["Condition"],
        json!({"StringLike": {"aws:RequestTag/ebs.csi.aws.com/cluster": "true"}})
    );
    assert_eq!(
        value["Statement"][8]["Action"],
        json!(["ec2:DeleteSnapshot"])
    );
}
