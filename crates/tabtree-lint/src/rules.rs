// Dweve Tabtree - Tab-indented Object Graph Persistence
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Property rules
//!
//! A [`Rules`] value is a composed set of checks on one property. A
//! [`RuleBook`] attaches rules to the properties of concrete types; a type
//! without rules for a property inherits those of its nearest supertype.

use crate::violation::{ConstraintViolation, Severity};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tabtree_core::{NodeId, Schema, TtError, TtResult, TypeKey, Value};
use tabtree_repo::Repository;
use tracing::trace;

/// Step function for a cycle guard: the next node along a chain of links,
/// or `None` at the end of the chain.
pub type NextFn = Arc<dyn Fn(&mut Repository, NodeId) -> TtResult<Option<NodeId>> + Send + Sync>;

#[derive(Clone)]
enum Check {
    NotNull,
    Range { min: f64, max: f64 },
    Precision(usize),
    Length { min: usize, max: usize },
    Pattern(Regex),
    SingleLine,
    Exclude(Vec<String>),
    NonEmpty,
    NoCycle(NextFn),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::NotNull => write!(f, "NotNull"),
            Check::Range { min, max } => write!(f, "Range({}, {})", min, max),
            Check::Precision(digits) => write!(f, "Precision({})", digits),
            Check::Length { min, max } => write!(f, "Length({}, {})", min, max),
            Check::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Check::SingleLine => write!(f, "SingleLine"),
            Check::Exclude(values) => write!(f, "Exclude({:?})", values),
            Check::NonEmpty => write!(f, "NonEmpty"),
            Check::NoCycle(_) => write!(f, "NoCycle"),
        }
    }
}

/// Composed checks on one property.
///
/// ```rust
/// use tabtree_lint::Rules;
///
/// let name = Rules::new().not_null().length(1, 64).single_line();
/// let superclass = Rules::new().no_cycle("superclass");
/// let version = Rules::new().range(1.0, 99.0).warning();
/// ```
///
/// Every check except `not_null` and `non_empty` passes on a null value.
#[derive(Debug, Clone)]
pub struct Rules {
    checks: Vec<Check>,
    severity: Severity,
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            severity: Severity::Error,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.checks.push(Check::NotNull);
        self
    }

    /// Numeric value within `min..=max`.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.checks.push(Check::Range { min, max });
        self
    }

    /// At most `digits` digits after the decimal point.
    pub fn precision(mut self, digits: usize) -> Self {
        self.checks.push(Check::Precision(digits));
        self
    }

    /// String length in characters within `min..=max`.
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.checks.push(Check::Length { min, max });
        self
    }

    /// The whole string must match `pattern`.
    pub fn pattern(mut self, pattern: &str) -> TtResult<Self> {
        let re = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| TtError::schema(format!("invalid rule pattern '{}': {}", pattern, e)))?;
        self.checks.push(Check::Pattern(re));
        Ok(self)
    }

    pub fn single_line(mut self) -> Self {
        self.checks.push(Check::SingleLine);
        self
    }

    /// Reject the given enum constants or strings.
    pub fn exclude<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks
            .push(Check::Exclude(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Lists, link lists and strings must not be empty.
    pub fn non_empty(mut self) -> Self {
        self.checks.push(Check::NonEmpty);
        self
    }

    /// Following the link `property` from the node must never come back to
    /// a node already seen.
    pub fn no_cycle(self, property: impl Into<String>) -> Self {
        let property = property.into();
        self.no_cycle_with(Arc::new(move |repo: &mut Repository, node: NodeId| {
            repo.link_get(node, &property)
        }))
    }

    /// Cycle guard over an arbitrary chain.
    pub fn no_cycle_with(mut self, next: NextFn) -> Self {
        self.checks.push(Check::NoCycle(next));
        self
    }

    /// Report violations of these rules as warnings.
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Apply every check to `value`, the current value of `field` on `node`.
    pub fn check(
        &self,
        repo: &mut Repository,
        node: NodeId,
        field: &str,
        value: &Value,
    ) -> Vec<ConstraintViolation> {
        let mut out = Vec::new();
        for check in &self.checks {
            if let Some((rule_id, message)) = run(check, repo, node, value) {
                out.push(
                    ConstraintViolation::new(self.severity, node, message, rule_id)
                        .with_field(field),
                );
            }
        }
        out
    }
}

fn run(
    check: &Check,
    repo: &mut Repository,
    node: NodeId,
    value: &Value,
) -> Option<(&'static str, String)> {
    match check {
        Check::NotNull => {
            let missing = match value {
                Value::Null => true,
                Value::Link(link) => link.is_unset(),
                _ => false,
            };
            missing.then(|| ("not-null", "must not be null".to_string()))
        }
        Check::Range { min, max } => {
            let n = value.as_f64()?;
            (n < *min || n > *max)
                .then(|| ("range", format!("{} is outside {}..={}", n, min, max)))
        }
        Check::Precision(digits) => {
            let n = value.as_f64()?;
            let decimals = fraction_digits(n);
            (decimals > *digits).then(|| {
                (
                    "precision",
                    format!("{} has {} decimals, at most {} allowed", n, decimals, digits),
                )
            })
        }
        Check::Length { min, max } => {
            let len = text_of(value)?.chars().count();
            (len < *min || len > *max)
                .then(|| ("length", format!("length {} is outside {}..={}", len, min, max)))
        }
        Check::Pattern(re) => {
            let text = text_of(value)?;
            (!re.is_match(text)).then(|| {
                (
                    "pattern",
                    format!("'{}' does not match {}", text, re.as_str()),
                )
            })
        }
        Check::SingleLine => text_of(value)?
            .contains('\n')
            .then(|| ("single-line", "must not span several lines".to_string())),
        Check::Exclude(excluded) => {
            let text = value.as_str()?;
            excluded
                .iter()
                .any(|e| e == text)
                .then(|| ("exclude", format!("'{}' is not allowed here", text)))
        }
        Check::NonEmpty => {
            let empty = match value {
                Value::String(s) => s.is_empty(),
                other => other.is_empty(),
            };
            empty.then(|| ("non-empty", "must not be empty".to_string()))
        }
        Check::NoCycle(next) => find_cycle(repo, node, next.as_ref()).then(|| {
            (
                "no-cycle",
                "following this link leads back to a node already visited".to_string(),
            )
        }),
    }
}

fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn fraction_digits(n: f64) -> usize {
    let text = n.to_string();
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len(),
        None => 0,
    }
}

/// Walk the chain from `start`. A dead end or a failure while walking
/// counts as no cycle.
fn find_cycle(
    repo: &mut Repository,
    start: NodeId,
    next: &(dyn Fn(&mut Repository, NodeId) -> TtResult<Option<NodeId>> + Send + Sync),
) -> bool {
    let mut visited = HashSet::new();
    visited.insert(start);
    let mut current = start;
    loop {
        match next(repo, current) {
            Ok(Some(following)) => {
                if !visited.insert(following) {
                    return true;
                }
                current = following;
            }
            Ok(None) => return false,
            Err(e) => {
                trace!(error = %e, "cycle guard stopped at unresolvable link");
                return false;
            }
        }
    }
}

/// Rules per type and property.
#[derive(Debug, Clone)]
pub struct RuleBook {
    schema: Arc<Schema>,
    rules: HashMap<TypeKey, HashMap<String, Rules>>,
}

impl RuleBook {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            rules: HashMap::new(),
        }
    }

    /// Attach `rules` to `property` of `type_name`, replacing rules the type
    /// itself declared for it. Subtypes inherit them unless they override.
    pub fn add(&mut self, type_name: &str, property: &str, rules: Rules) -> TtResult<&mut Self> {
        let key = self.schema.require_type(type_name)?;
        self.schema.object(key).require(property)?;
        self.rules
            .entry(key)
            .or_default()
            .insert(property.to_string(), rules);
        Ok(self)
    }

    /// Rules for `property` on `ty`, from the type or its nearest supertype
    /// declaring any.
    pub fn rules_for(&self, ty: TypeKey, property: &str) -> Option<&Rules> {
        self.schema
            .lineage(ty)
            .find_map(|key| self.rules.get(&key).and_then(|map| map.get(property)))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
