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

use crate::domain::stack::declaration::{Stack, Urn};
use crate::shared::error::{Result, StackError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct PlanStep {
    pub index: usize,
    pub level: usize,
    pub urn: Urn,
    pub depends_on: Vec<Urn>,
}

/// Dependency-ordered execution plan.
///
/// Resources in the same level have no dependency on each other and may be
/// applied in parallel. Within a level, declaration order is kept.
#[derive(Debug, Clone)]
pub struct Plan {
    steps: Vec<PlanStep>,
    levels: Vec<Vec<Urn>>,
}

impl Plan {
    pub fn build(stack: &Stack) -> Result<Self> {
        let position: BTreeMap<&Urn, usize> = stack
            .resources()
            .iter()
            .enumerate()
            .map(|(i, r)| (r.urn(), i))
            .collect();

        let mut deps: Vec<BTreeSet<usize>> = Vec::with_capacity(stack.len());
        for decl in stack.resources() {
            let mut resolved = BTreeSet::new();
            for urn in decl.dependencies() {
                let index = position.get(&urn).copied().ok_or_else(|| {
                    StackError::unknown_resource(urn.to_string(), decl.urn().to_string())
                })?;
                resolved.insert(index);
            }

            for property in decl.properties().values() {
                for attr in property.attributes() {
                    let Some(&index) = position.get(&attr.urn) else {
                        continue;
                    };
                    let target = &stack.resources()[index];
                    if !target.exposes(&attr.attribute) {
                        return Err(StackError::validation_error(format!(
                            "{} reads '{}' which {} does not expose",
                            decl.urn(),
                            attr.attribute,
                            target.urn()
                        )));
                    }
                }
            }
            deps.push(resolved);
        }

        let mut remaining: Vec<usize> = deps.iter().map(|d| d.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); deps.len()];
        for (i, d) in deps.iter().enumerate() {
            for &dep in d {
                dependents[dep].push(i);
            }
        }

        let mut current: Vec<usize> = (0..deps.len()).filter(|&i| remaining[i] == 0).collect();
        let mut levels: Vec<Vec<usize>> = Vec::new();
        let mut placed = 0;

        while !current.is_empty() {
            placed += current.len();
            let mut next = Vec::new();
            for &i in &current {
                for &dependent in &dependents[i] {
                    remaining[dependent] -= 1;
                    if remaining[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            next.sort_unstable();
            levels.push(current);
            current = next;
        }

        if placed < deps.len() {
            let stuck: Vec<String> = remaining
                .iter()
                .enumerate()
                .filter(|(_, r)| **r > 0)
                .map(|(i, _)| stack.resources()[i].urn().to_string())
                .collect();
            return Err(StackError::DependencyCycle(stuck.join(", ")));
        }

        let mut steps = Vec::with_capacity(deps.len());
        for (level, members) in levels.iter().enumerate() {
            for &i in members {
                steps.push(PlanStep {
                    index: steps.len() + 1,
                    level,
                    urn: stack.resources()[i].urn().clone(),
                    depends_on: deps[i]
                        .iter()
                        .map(|&d| stack.resources()[d].urn().clone())
                        .collect(),
                });
            }
        }

        let levels: Vec<Vec<Urn>> = levels
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .map(|i| stack.resources()[i].urn().clone())
                    .collect()
            })
            .collect();

        debug!(
            stack = stack.name(),
            steps = steps.len(),
            levels = levels.len(),
            "built execution plan"
        );

        Ok(Self { steps, levels })
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn levels(&self) -> &[Vec<Urn>] {
        &self.levels
    }

    pub fn step(&self, urn: &Urn) -> Option<&PlanStep> {
        self.steps.iter().find(|s| &s.urn == urn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::output::Output;
    use crate::domain::stack::declaration::{ResourceDecl, ResourceKind};

    fn decl(kind: ResourceKind, name: &str) -> ResourceDecl {
        ResourceDecl::new(kind, name)
    }

    #[test]
    fn test_independent_resources_share_a_level() {
        let mut stack = Stack::new("dev");
        let cluster = decl(ResourceKind::Cluster, "c");
        let policy = decl(ResourceKind::Policy, "p");
        let role = decl(ResourceKind::Role, "r").with_property(
            "assumeRolePolicy",
            cluster.output::<String>("oidcProviderArn").into_value(),
        );
        stack.add(cluster).unwrap();
        stack.add(role).unwrap();
        stack.add(policy).unwrap();

        let plan = Plan::build(&stack).unwrap();
        assert_eq!(plan.levels().len(), 2);
        assert_eq!(
            plan.levels()[0],
            vec![
                Urn::new(ResourceKind::Cluster, "c"),
                Urn::new(ResourceKind::Policy, "p")
            ]
        );
        assert_eq!(plan.levels()[1], vec![Urn::new(ResourceKind::Role, "r")]);
        assert_eq!(plan.steps()[2].index, 3);
    }

    #[test]
    fn test_undeclared_reference_is_rejected() {
        let mut stack = Stack::new("dev");
        let ghost: Output<String> = Output::attribute(Urn::new(ResourceKind::Role, "ghost"), "arn");
        stack
            .add(
                decl(ResourceKind::Addon, "a")
                    .with_property("serviceAccountRoleArn", ghost.into_value()),
            )
            .unwrap();

        let err = Plan::build(&stack).unwrap_err();
        assert!(matches!(err, StackError::UnknownResource { .. }));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let a = Urn::new(ResourceKind::Role, "a");
        let b = Urn::new(ResourceKind::Policy, "b");
        let mut stack = Stack::new("dev");
        stack
            .add(ResourceDecl::new(ResourceKind::Role, "a").depends_on(b))
            .unwrap();
        stack
            .add(ResourceDecl::new(ResourceKind::Policy, "b").depends_on(a))
            .unwrap();

        let err = Plan::build(&stack).unwrap_err();
        assert!(matches!(err, StackError::DependencyCycle(_)));
    }

    #[test]
    fn test_unexposed_attribute_is_rejected() {
        let mut stack = Stack::new("dev");
        let cluster = decl(ResourceKind::Cluster, "c");
        let role = decl(ResourceKind::Role, "r")
            .with_property("bogus", cluster.output::<String>("kubeconfig").into_value());
        stack.add(cluster).unwrap();
        stack.add(role).unwrap();

        assert!(matches!(
            Plan::build(&stack).unwrap_err(),
            StackError::ValidationError(_)
        ));
    }

    #[test]
    fn test_duplicate_urn_is_rejected() {
        let mut stack = Stack::new("dev");
        stack.add(decl(ResourceKind::Role, "r")).unwrap();
        assert!(matches!(
            stack.add(decl(ResourceKind::Role, "r")).unwrap_err(),
            StackError::DuplicateResource(_)
        ));
    }
}
