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

//! Provisioning engine seam
//!
//! Declarations never talk to a cloud API directly. They are handed, in plan
//! order, to a [`ProvisioningEngine`], which reconciles them and reports the
//! outputs it produced.

pub mod preview;

pub use preview::PreviewEngine;

use crate::domain::stack::{PropertyMap, ResolvedResource};
use crate::shared::error::StackError;

#[async_trait::async_trait]
pub trait ProvisioningEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Reconcile one resource and return every output attribute, known or not.
    async fn register(&self, resource: &ResolvedResource) -> Result<PropertyMap, StackError>;
}
