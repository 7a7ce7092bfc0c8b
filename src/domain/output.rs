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

//! Deferred values
//!
//! An [`Output`] is a node in the stack's dependency graph: it records which
//! resource attributes it reads and how to compute its value once they are
//! known. Nothing blocks; evaluating an output whose inputs are still missing
//! simply yields `None`.

use crate::domain::stack::Urn;
use crate::shared::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// One output attribute of a declared resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeRef {
    pub urn: Urn,
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(urn: Urn, attribute: impl Into<String>) -> Self {
        Self {
            urn,
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.urn, self.attribute)
    }
}

/// Where deferred values look up the attributes they depend on.
pub trait OutputSource {
    /// Returns `None` while the attribute is still unknown.
    fn lookup(&self, attr: &AttributeRef) -> Option<Value>;
}

impl OutputSource for BTreeMap<AttributeRef, Value> {
    fn lookup(&self, attr: &AttributeRef) -> Option<Value> {
        self.get(attr).cloned()
    }
}

type Eval<T> = Arc<dyn Fn(&dyn OutputSource) -> Result<Option<T>> + Send + Sync>;

/// A value that may only become known after other resources are provisioned.
pub struct Output<T> {
    attributes: BTreeSet<AttributeRef>,
    eval: Eval<T>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            eval: Arc::clone(&self.eval),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// A value known at declaration time.
    pub fn known(value: T) -> Self {
        Self {
            attributes: BTreeSet::new(),
            eval: Arc::new(move |_| Ok(Some(value.clone()))),
        }
    }
}

impl<T: DeserializeOwned + Send + Sync + 'static> Output<T> {
    /// A value read from an attribute of another resource.
    pub fn attribute(urn: Urn, attribute: impl Into<String>) -> Self {
        let attr = AttributeRef::new(urn, attribute);
        let attributes = BTreeSet::from([attr.clone()]);
        Self {
            attributes,
            eval: Arc::new(move |source| match source.lookup(&attr) {
                Some(value) => Ok(Some(serde_json::from_value(value)?)),
                None => Ok(None),
            }),
        }
    }
}

impl<T: Send + Sync + 'static> Output<T> {
    /// Transform the value once it is known.
    pub fn apply<U, F>(self, f: F) -> Output<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let eval = self.eval;
        Output {
            attributes: self.attributes,
            eval: Arc::new(move |source| Ok(eval(source)?.map(&f))),
        }
    }

    /// Like [`Output::apply`] for transformations that can fail.
    pub fn try_apply<U, F>(self, f: F) -> Output<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let eval = self.eval;
        Output {
            attributes: self.attributes,
            eval: Arc::new(move |source| match eval(source)? {
                Some(value) => f(value).map(Some),
                None => Ok(None),
            }),
        }
    }

    /// Combine two outputs; the pair is known only when both sides are.
    pub fn zip<U: Send + Sync + 'static>(self, other: Output<U>) -> Output<(T, U)> {
        let mut attributes = self.attributes;
        attributes.extend(other.attributes);
        let (left, right) = (self.eval, other.eval);
        Output {
            attributes,
            eval: Arc::new(move |source| {
                let left = left(source)?;
                let right = right(source)?;
                Ok(left.zip(right))
            }),
        }
    }

    /// Combine any number of outputs of the same type.
    pub fn all(outputs: Vec<Output<T>>) -> Output<Vec<T>> {
        let attributes = outputs
            .iter()
            .flat_map(|o| o.attributes.iter().cloned())
            .collect();
        let evals: Vec<Eval<T>> = outputs.into_iter().map(|o| o.eval).collect();
        Output {
            attributes,
            eval: Arc::new(move |source| {
                let mut values = Vec::with_capacity(evals.len());
                for eval in &evals {
                    match eval(source)? {
                        Some(value) => values.push(value),
                        None => return Ok(None),
                    }
                }
                Ok(Some(values))
            }),
        }
    }

    pub fn resolve(&self, source: &dyn OutputSource) -> Result<Option<T>> {
        (self.eval)(source)
    }

    pub fn attributes(&self) -> &BTreeSet<AttributeRef> {
        &self.attributes
    }

    /// Resources this value waits on.
    pub fn resources(&self) -> BTreeSet<Urn> {
        self.attributes.iter().map(|a| a.urn.clone()).collect()
    }

    pub fn is_constant(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<T: Serialize + Send + Sync + 'static> Output<T> {
    pub fn into_value(self) -> Output<Value> {
        self.try_apply(|value| Ok(serde_json::to_value(value)?))
    }
}
