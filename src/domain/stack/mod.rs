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

//! Stack domain: declarations, planning and deployment

pub mod declaration;
pub mod deployment;
pub mod descriptor;
pub mod manifest;
pub mod naming;
pub mod plan;
pub mod validator;

pub use self::declaration::{ResourceDecl, ResourceKind, Stack, Urn};
pub use self::deployment::{
    resolve_resource, Deployment, DeploymentReport, PropertyMap, PropertyValue, ResolvedResource,
    ResourceResult, StackState,
};
pub use self::descriptor::{DeclaredStack, StackDescriptor};
pub use self::manifest::{DesiredStateManifest, ManifestResource, OutputFormat};
pub use self::naming::NamingPolicy;
pub use self::plan::{Plan, PlanStep};
pub use self::validator::StackValidator;
