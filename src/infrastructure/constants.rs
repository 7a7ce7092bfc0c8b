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

/// Stack defaults
pub const DEFAULT_STACK_NAME: &str = "dev";
pub const CONF_FILE_ENV: &str = "EBS_CSI_STACK_CONF";

/// Cluster resource
pub const CLUSTER_RESOURCE_NAME: &str = "my-cluster";

/// Add-on identity
pub const ADDON_RESOURCE_NAME: &str = "aws-ebs-csi-driver-addon";
pub const ADDON_NAME: &str = "aws-ebs-csi-driver";
pub const ADDON_VERSION: &str = "v1.11.4-eksbuild.1";
pub const ADDON_RESOLVE_CONFLICTS: &str = "OVERWRITE";

/// Service account the controller runs as
pub const SERVICE_ACCOUNT_NAMESPACE: &str = "kube-system";
pub const SERVICE_ACCOUNT_NAME: &str = "ebs-csi-controller-sa";

/// Naming suffixes appended to the stack name
pub const ROLE_NAME_SUFFIX: &str = "-AmazonEKS_EBS_CSI_DriverRole";
pub const POLICY_NAME_SUFFIX: &str = "-AmazonEKS_EBS_CSI_Driver_Policy";
pub const ATTACHMENT_NAME_SUFFIX: &str = "-csi-driver-policy";

/// IAM limits
pub const IAM_NAME_MAX_LEN: usize = 64;
pub const IAM_POLICY_NAME_MAX_LEN: usize = 128;

/// Policy documents
pub const POLICY_VERSION: &str = "2012-10-17";
pub const POLICY_PATH: &str = "/";
pub const POLICY_DESCRIPTION: &str = "A policy for Amazon EBS CSI Driver permissions";
pub const ACTION_ASSUME_ROLE_WITH_WEB_IDENTITY: &str = "sts:AssumeRoleWithWebIdentity";
pub const CONDITION_STRING_EQUALS: &str = "StringEquals";
pub const CONDITION_STRING_LIKE: &str = "StringLike";

/// OIDC federation formats
pub const OIDC_URL_SCHEME: &str = "https://";
pub const OIDC_SUBJECT_CLAIM_SUFFIX: &str = ":sub";
pub const SERVICE_ACCOUNT_SUBJECT_PREFIX: &str = "system:serviceaccount";

/// Resource type tokens
pub const TYPE_CLUSTER: &str = "eks:index:Cluster";
pub const TYPE_ROLE: &str = "aws:iam/role:Role";
pub const TYPE_POLICY: &str = "aws:iam/policy:Policy";
pub const TYPE_ROLE_POLICY_ATTACHMENT: &str = "aws:iam/rolePolicyAttachment:RolePolicyAttachment";
pub const TYPE_ADDON: &str = "aws:eks/addon:Addon";

/// Marker rendered in place of values the engine has not produced yet
pub const UNKNOWN_MARKER: &str = "[unknown]";

/// In-cluster workloads installed by the add-on, always in kube-system
pub const ADDON_WORKLOAD_NAMESPACE: &str = "kube-system";
pub const ROLE_ARN_ANNOTATION: &str = "eks.amazonaws.com/role-arn";
pub const CONTROLLER_DEPLOYMENT_NAME: &str = "ebs-csi-controller";
pub const NODE_DAEMONSET_NAME: &str = "ebs-csi-node";

/// Readiness polling
pub const READY_POLL_INTERVAL_SECONDS: u64 = 5;
pub const READY_MAX_WAIT_SECONDS: u64 = 300;
