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

use crate::infrastructure::constants::{
    ATTACHMENT_NAME_SUFFIX, POLICY_NAME_SUFFIX, ROLE_NAME_SUFFIX,
};

/// Stack-prefixed names for the IAM resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    stack: String,
}

impl NamingPolicy {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
        }
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn role_name(&self) -> String {
        format!("{}{}", self.stack, ROLE_NAME_SUFFIX)
    }

    pub fn policy_name(&self) -> String {
        format!("{}{}", self.stack, POLICY_NAME_SUFFIX)
    }

    pub fn attachment_name(&self) -> String {
        format!("{}{}", self.stack, ATTACHMENT_NAME_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_carry_stack_prefix() {
        let naming = NamingPolicy::new("prod");
        assert_eq!(naming.role_name(), "prod-AmazonEKS_EBS_CSI_DriverRole");
        assert_eq!(naming.policy_name(), "prod-AmazonEKS_EBS_CSI_Driver_Policy");
        assert_eq!(naming.attachment_name(), "prod-csi-driver-policy");
    }

    #[test]
    fn test_different_stacks_do_not_collide() {
        let dev = NamingPolicy::new("dev");
        let prod = NamingPolicy::new("prod");
        assert_ne!(dev.role_name(), prod.role_name());
        assert_ne!(dev.policy_name(), prod.policy_name());
    }
}
