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

use crate::domain::stack::{ResourceDecl, ResourceKind};
use crate::shared::error::StackError;

/// Binds one policy to one role. Both sides are taken from the declarations
/// so the attachment waits for them.
pub struct AttachmentBuilder<'a> {
    resource_name: String,
    role: &'a ResourceDecl,
    policy: &'a ResourceDecl,
}

impl<'a> AttachmentBuilder<'a> {
    pub fn new(
        resource_name: impl Into<String>,
        role: &'a ResourceDecl,
        policy: &'a ResourceDecl,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            role,
            policy,
        }
    }

    pub fn build(&self) -> Result<ResourceDecl, StackError> {
        if self.role.kind() != ResourceKind::Role {
            return Err(StackError::validation_error(format!(
                "attachment role must be an IAM role, got {}",
                self.role.urn()
            )));
        }
        if self.policy.kind() != ResourceKind::Policy {
            return Err(StackError::validation_error(format!(
                "attachment policy must be an IAM policy, got {}",
                self.policy.urn()
            )));
        }

        Ok(
            ResourceDecl::new(ResourceKind::RolePolicyAttachment, &self.resource_name)
                .with_property("role", self.role.output::<String>("name").into_value())
                .with_property("policyArn", self.policy.output::<String>("arn").into_value()),
        )
    }
}
