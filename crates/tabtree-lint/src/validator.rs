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

//! Graph validator

use crate::rules::RuleBook;
use crate::violation::{ConstraintViolation, Severity};
use std::collections::{HashMap, HashSet};
use tabtree_core::{NodeId, PropertyDescriptor, TtResult, Value, ValueKind};
use tabtree_repo::Repository;
use tracing::{debug, warn};

/// Maximum number of violations to collect before stopping.
const MAX_VIOLATIONS: usize = 10_000;

/// Whole-node check registered on a [`Validator`].
pub trait NodeRule: Send + Sync {
    /// Rule identifier
    fn id(&self) -> &str;

    /// Rule description
    fn description(&self) -> &str;

    /// Check one node. Called once for every node reached by the walk.
    fn check(&self, repo: &Repository, node: NodeId) -> Vec<ConstraintViolation>;
}

/// Configuration for the validator
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Minimum severity to report
    pub min_severity: Severity,
    /// Maximum number of violations to collect (default: 10,000)
    pub max_violations: usize,
    /// Check that link paths match the pattern declared for their slot
    pub check_link_patterns: bool,
    /// Check that elements of one list have distinct ids that can appear
    /// in a path
    pub check_unique_ids: bool,
    /// Resolve every link, loading other documents as needed
    pub check_link_targets: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Warning,
            max_violations: MAX_VIOLATIONS,
            check_link_patterns: true,
            check_unique_ids: true,
            check_link_targets: false,
        }
    }
}

/// Walks object graphs from their roots and applies rules to every node.
///
/// Each node is visited once. The walk descends into owned children only;
/// link targets belong to their own documents and are validated when those
/// documents are.
pub struct Validator {
    config: ValidatorConfig,
    rules: RuleBook,
    node_rules: Vec<Box<dyn NodeRule>>,
}

impl Validator {
    pub fn new(rules: RuleBook) -> Self {
        Self::with_config(rules, ValidatorConfig::default())
    }

    pub fn with_config(rules: RuleBook, config: ValidatorConfig) -> Self {
        Self {
            config,
            rules,
            node_rules: Vec::new(),
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn NodeRule>) {
        self.node_rules.push(rule);
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Validate everything reachable from `roots` through containment.
    pub fn validate(
        &self,
        repo: &mut Repository,
        roots: &[NodeId],
    ) -> TtResult<Vec<ConstraintViolation>> {
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        let mut violations = Vec::new();
        let mut nodes = 0usize;

        'walk: while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            nodes += 1;
            let found = self.check_node(repo, node)?;
            if !found.is_empty() {
                let location = location_of(repo, node);
                for violation in found {
                    if violation.severity() < self.config.min_severity {
                        continue;
                    }
                    if violations.len() >= self.config.max_violations {
                        warn!(
                            max = self.config.max_violations,
                            "violation limit reached, validation stopped"
                        );
                        break 'walk;
                    }
                    violations.push(violation.with_location(location.clone()));
                }
            }
            let children = repo.graph().child_nodes(node)?;
            stack.extend(children.into_iter().rev());
        }

        debug!(nodes, violations = violations.len(), "validation finished");
        Ok(violations)
    }

    fn check_node(
        &self,
        repo: &mut Repository,
        node: NodeId,
    ) -> TtResult<Vec<ConstraintViolation>> {
        let ty = repo.graph().type_key(node)?;
        let properties: Vec<PropertyDescriptor> = repo.graph().type_of(node)?.properties().to_vec();
        let mut out = Vec::new();

        for prop in &properties {
            if let Some(rules) = self.rules.rules_for(ty, prop.name()) {
                let value = repo.graph().node(node)?.values()[prop.slot].clone();
                out.extend(rules.check(repo, node, prop.name(), &value));
            }
            if prop.is_link() && prop.is_persistent() {
                if self.config.check_link_patterns {
                    check_link_paths(repo, node, prop, &mut out);
                }
                if self.config.check_link_targets {
                    check_link_targets(repo, node, prop, &mut out);
                }
            }
            if self.config.check_unique_ids && prop.is_containment() && prop.is_list() {
                check_unique_ids(repo, node, prop, &mut out)?;
            }
        }

        for rule in &self.node_rules {
            out.extend(rule.check(repo, node));
        }
        Ok(out)
    }
}

fn location_of(repo: &Repository, node: NodeId) -> String {
    let graph = repo.graph();
    let path = graph.path_of(node).unwrap_or_default();
    let file = graph
        .document_file(node)
        .ok()
        .flatten()
        .and_then(|f| f.file_name().map(|n| n.to_string_lossy().into_owned()));
    match file {
        Some(file) => format!("{}{}", file, path),
        None => path,
    }
}

fn check_link_paths(
    repo: &Repository,
    node: NodeId,
    prop: &PropertyDescriptor,
    out: &mut Vec<ConstraintViolation>,
) {
    let Some(decl) = prop.kind().link_schema() else {
        return;
    };
    let paths = match prop.kind() {
        ValueKind::Link(_) => repo.link_path(node, prop.name()).map(|p| p.into_iter().collect()),
        _ => repo.graph().link_list_paths(node, prop.name()),
    };
    match paths {
        Ok(paths) => {
            for path in paths {
                if !decl.accepts(&path) {
                    out.push(
                        ConstraintViolation::error(
                            node,
                            format!(
                                "path '{}' does not match {}",
                                path,
                                decl.pattern_source.as_deref().unwrap_or("")
                            ),
                            "link-pattern",
                        )
                        .with_field(prop.name()),
                    );
                }
            }
        }
        Err(e) => out.push(
            ConstraintViolation::error(node, e.message, "link-path").with_field(prop.name()),
        ),
    }
}

fn check_link_targets(
    repo: &mut Repository,
    node: NodeId,
    prop: &PropertyDescriptor,
    out: &mut Vec<ConstraintViolation>,
) {
    let resolved = match prop.kind() {
        ValueKind::Link(_) => repo.link_get(node, prop.name()).map(|_| ()),
        _ => repo.link_list_targets(node, prop.name()).map(|_| ()),
    };
    if let Err(e) = resolved {
        out.push(
            ConstraintViolation::error(node, e.to_string(), "dangling-link")
                .with_field(prop.name()),
        );
    }
}

fn check_unique_ids(
    repo: &Repository,
    node: NodeId,
    prop: &PropertyDescriptor,
    out: &mut Vec<ConstraintViolation>,
) -> TtResult<()> {
    let graph = repo.graph();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for child in graph.children(node, prop.name())? {
        if let Some(id) = graph.id_of(child)? {
            if !is_path_safe(&id) {
                out.push(
                    ConstraintViolation::error(
                        node,
                        format!("id '{}' cannot be used in a path", id),
                        "id-syntax",
                    )
                    .with_field(prop.name()),
                );
            }
            *seen.entry(id).or_default() += 1;
        }
    }
    let mut duplicates: Vec<(String, usize)> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    for (id, count) in duplicates {
        out.push(
            ConstraintViolation::error(
                node,
                format!("id '{}' is used by {} elements", id, count),
                "unique-id",
            )
            .with_field(prop.name()),
        );
    }
    Ok(())
}

/// Path segments are split on `/` and `#`, and `.`/`..` navigate.
fn is_path_safe(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '#'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use tabtree_test::fixtures;

    fn shop() -> (Repository, NodeId) {
        let mut repo = Repository::new(fixtures::meta_schema().unwrap());
        let shop = fixtures::shop_model(repo.graph_mut()).unwrap();
        (repo, shop)
    }

    fn book(repo: &Repository) -> RuleBook {
        RuleBook::new(repo.schema().clone())
    }

    struct NoAbstractLeaves;

    impl NodeRule for NoAbstractLeaves {
        fn id(&self) -> &str {
            "abstract-leaf"
        }
        fn description(&self) -> &str {
            "Abstract entities need subclasses"
        }
        fn check(&self, repo: &Repository, node: NodeId) -> Vec<ConstraintViolation> {
            let graph = repo.graph();
            let is_abstract = graph
                .get(node, "abstract_entity")
                .ok()
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let leaf = graph
                .get(node, "subclasses")
                .map(Value::is_empty)
                .unwrap_or(false);
            if is_abstract && leaf {
                vec![ConstraintViolation::warning(
                    node,
                    "abstract entity without subclasses",
                    self.id(),
                )]
            } else {
                vec![]
            }
        }
    }

    // ==================== Walk ====================

    #[test]
    fn test_valid_model_has_no_violations() {
        let (mut repo, shop) = shop();
        let validator = Validator::new(book(&repo));
        assert!(validator.validate(&mut repo, &[shop]).unwrap().is_empty());
    }

    #[test]
    fn test_rules_apply_to_every_node() {
        let (mut repo, shop) = shop();
        let mut rules = book(&repo);
        rules
            .add("meta.Attribute", "datatype", Rules::new().exclude(["Float"]))
            .unwrap();
        let validator = Validator::new(rules);
        let found = validator.validate(&mut repo, &[shop]).unwrap();
        let locations: Vec<&str> = found.iter().map(|v| v.location()).collect();
        assert_eq!(
            locations,
            [
                "#/entities/Order/attributes/total",
                "#/entities/Order/attributes/tax"
            ]
        );
        assert!(found.iter().all(|v| v.field() == Some("datatype")));
    }

    #[test]
    fn test_roots_visited_once() {
        let (mut repo, shop) = shop();
        let order = repo.get_from_path(shop, "#/entities/Order").unwrap();
        let mut rules = book(&repo);
        rules
            .add("meta.Role", "name", Rules::new().length(10, 20))
            .unwrap();
        let validator = Validator::new(rules);
        let found = validator.validate(&mut repo, &[shop, order, shop]).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_min_severity_and_limit() {
        let (mut repo, shop) = shop();
        let mut rules = book(&repo);
        rules
            .add("meta.NamedElement", "name", Rules::new().length(50, 60).warning())
            .unwrap()
            .add("meta.Attribute", "length", Rules::new().not_null())
            .unwrap();

        let all = Validator::new(rules.clone())
            .validate(&mut repo, &[shop])
            .unwrap();
        assert_eq!(all.len(), 11 + 4);

        let errors_only = Validator::with_config(
            rules.clone(),
            ValidatorConfig {
                min_severity: Severity::Error,
                ..ValidatorConfig::default()
            },
        )
        .validate(&mut repo, &[shop])
        .unwrap();
        assert_eq!(errors_only.len(), 4);

        let limited = Validator::with_config(
            rules,
            ValidatorConfig {
                max_violations: 3,
                ..ValidatorConfig::default()
            },
        )
        .validate(&mut repo, &[shop])
        .unwrap();
        assert_eq!(limited.len(), 3);
    }

    #[test]
    fn test_link_targets_are_not_walked() {
        let mut repo = Repository::new(fixtures::meta_schema().unwrap());
        let shop = fixtures::shop_model(repo.graph_mut()).unwrap();
        let customer = repo.get_from_path(shop, "#/entities/Customer").unwrap();
        let billing = fixtures::billing_model(repo.graph_mut(), customer).unwrap();

        let mut rules = book(&repo);
        rules
            .add("meta.Entity", "name", Rules::new().pattern("Invoice").unwrap())
            .unwrap();
        // the billing document has no file, so its cross-document path
        // cannot be written yet
        let validator = Validator::with_config(
            rules,
            ValidatorConfig {
                check_link_patterns: false,
                ..ValidatorConfig::default()
            },
        );
        assert!(validator.validate(&mut repo, &[billing]).unwrap().is_empty());

        let found = Validator::new(book(&repo))
            .validate(&mut repo, &[billing])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id(), "link-path");
    }

    // ==================== Built-in checks ====================

    #[test]
    fn test_duplicate_ids() {
        let (mut repo, shop) = shop();
        let party = repo.get_from_path(shop, "#/entities/Party").unwrap();
        repo.set(party, "name", "Order").unwrap();
        let found = Validator::new(book(&repo))
            .validate(&mut repo, &[shop])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id(), "unique-id");
        assert_eq!(found[0].field(), Some("entities"));
        assert_eq!(found[0].message(), "id 'Order' is used by 2 elements");
    }

    #[test]
    fn test_ids_must_fit_in_paths() {
        let (mut repo, shop) = shop();
        let party = repo.get_from_path(shop, "#/entities/Party").unwrap();
        repo.set(party, "name", "Party/Old").unwrap();
        let order = repo.get_from_path(shop, "#/entities/Order").unwrap();
        repo.set(order, "name", "..").unwrap();
        let config = ValidatorConfig {
            check_link_patterns: false,
            ..ValidatorConfig::default()
        };
        let found = Validator::with_config(book(&repo), config)
            .validate(&mut repo, &[shop])
            .unwrap();
        let messages: Vec<&str> = found
            .iter()
            .filter(|v| v.rule_id() == "id-syntax")
            .map(|v| v.message())
            .collect();
        assert_eq!(
            messages,
            [
                "id 'Party/Old' cannot be used in a path",
                "id '..' cannot be used in a path"
            ]
        );
        assert!(is_path_safe("Customer"));
        assert!(!is_path_safe("a#b"));
        assert!(!is_path_safe(""));
    }

    #[test]
    fn test_link_pattern_mismatch() {
        let (mut repo, shop) = shop();
        let order = repo.get_from_path(shop, "#/entities/Order").unwrap();
        repo.graph_mut()
            .link_set_path(order, "superclass", Some("../../entities/Party".to_string()))
            .unwrap();
        let found = Validator::new(book(&repo))
            .validate(&mut repo, &[shop])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id(), "link-pattern");
        assert_eq!(found[0].location(), "#/entities/Order");
    }

    #[test]
    fn test_dangling_links_checked_on_request() {
        let (mut repo, shop) = shop();
        let order = repo.get_from_path(shop, "#/entities/Order").unwrap();
        repo.graph_mut()
            .link_set_path(order, "superclass", Some("../entities/Nobody".to_string()))
            .unwrap();

        let lenient = Validator::new(book(&repo));
        assert!(lenient.validate(&mut repo, &[shop]).unwrap().is_empty());

        let strict = Validator::with_config(
            book(&repo),
            ValidatorConfig {
                check_link_targets: true,
                ..ValidatorConfig::default()
            },
        );
        let found = strict.validate(&mut repo, &[shop]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id(), "dangling-link");
    }

    #[test]
    fn test_node_rule() {
        let (mut repo, shop) = shop();
        let mut validator = Validator::new(book(&repo));
        validator.add_rule(Box::new(NoAbstractLeaves));
        assert!(validator.validate(&mut repo, &[shop]).unwrap().is_empty());

        let customer = repo.get_from_path(shop, "#/entities/Customer").unwrap();
        repo.link_set(customer, "superclass", None).unwrap();
        let found = validator.validate(&mut repo, &[shop]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_id(), "abstract-leaf");
        assert_eq!(found[0].location(), "#/entities/Party");
    }

    #[test]
    fn test_location_includes_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repo, shop) = shop();
        repo.write(dir.path(), shop).unwrap();
        let mut rules = book(&repo);
        rules
            .add("meta.Model", "version", Rules::new().range(2.0, 3.0))
            .unwrap();
        let found = Validator::new(rules).validate(&mut repo, &[shop]).unwrap();
        assert_eq!(
            found[0].to_string(),
            "shop.tt#: [range] error: version: 1 is outside 2..=3"
        );
    }
}
