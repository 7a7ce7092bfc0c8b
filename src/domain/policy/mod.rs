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

//! IAM policy documents

pub mod document;
pub mod permissions;
pub mod trust;

pub use self::document::{ConditionBlock, Effect, OneOrMany, PolicyDocument, Principal, Statement};
pub use self::permissions::ebs_csi_driver_policy;
pub use self::trust::{
    strip_https_scheme, subject_claim_key, ServiceAccountRef, TrustPolicyBuilder,
};
