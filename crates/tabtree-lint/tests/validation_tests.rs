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

//! Validation of models read back from files.

use tabtree_core::NodeId;
use tabtree_lint::{has_errors, validate, RuleBook, Rules, Severity, Validator, ValidatorConfig};
use tabtree_repo::Repository;
use tabtree_test::fixtures;
use tempfile::TempDir;

fn meta_rules(repo: &Repository) -> RuleBook {
    let mut rules = RuleBook::new(repo.schema().clone());
    rules
        .add(
            "meta.NamedElement",
            "name",
            Rules::new()
                .not_null()
                .single_line()
                .pattern("[A-Za-z_][A-Za-z0-9_]*")
                .unwrap(),
        )
        .unwrap()
        .add("meta.Entity", "superclass", Rules::new().no_cycle("superclass"))
        .unwrap()
        .add("meta.Model", "entities", Rules::new().non_empty())
        .unwrap()
        .add("meta.Model", "description", Rules::new().single_line().warning())
        .unwrap()
        .add("meta.Attribute", "length", Rules::new().range(1.0, 4096.0))
        .unwrap();
    rules
}

fn read_back(repo: &mut Repository, dir: &TempDir, root: NodeId) -> NodeId {
    let file = repo.write(dir.path(), root).unwrap();
    repo.clear();
    repo.read(file).unwrap()
}

// =============================================================================
// Valid models
// =============================================================================

#[test]
fn test_shop_model_is_valid() {
    let dir = TempDir::new().unwrap();
    let mut repo = Repository::new(fixtures::meta_schema().unwrap());
    let shop = fixtures::shop_model(repo.graph_mut()).unwrap();
    let shop = read_back(&mut repo, &dir, shop);

    let rules = meta_rules(&repo);
    let violations = validate(&mut repo, rules, &[shop]).unwrap();
    assert!(violations.is_empty(), "{:?}", violations);
}

#[test]
fn test_chain_model_is_valid() {
    let mut repo = Repository::new(fixtures::meta_schema().unwrap());
    let chain = fixtures::chain_model(repo.graph_mut(), 50).unwrap();
    let rules = meta_rules(&repo);
    assert!(validate(&mut repo, rules, &[chain]).unwrap().is_empty());
}

// =============================================================================
// Broken models
// =============================================================================

#[test]
fn test_multiline_description_warns() {
    let mut repo = Repository::new(fixtures::meta_schema().unwrap());
    let notes = fixtures::notes_model(repo.graph_mut()).unwrap();
    let rules = meta_rules(&repo);
    let violations = validate(&mut repo, rules, &[notes]).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity(), Severity::Warning);
    assert_eq!(violations[0].field(), Some("description"));
    assert!(!has_errors(&violations));
}

#[test]
fn test_superclass_cycle_after_read() {
    let dir = TempDir::new().unwrap();
    let mut repo = Repository::new(fixtures::meta_schema().unwrap());
    let chain = fixtures::chain_model(repo.graph_mut(), 4).unwrap();
    let chain = read_back(&mut repo, &dir, chain);

    let first = repo.get_from_path(chain, "#/entities/E0").unwrap();
    let last = repo.get_from_path(chain, "#/entities/E3").unwrap();
    repo.link_set(first, "superclass", Some(last)).unwrap();

    let rules = meta_rules(&repo);
    let violations = validate(&mut repo, rules, &[chain]).unwrap();
    let cycles: Vec<_> = violations
        .iter()
        .filter(|v| v.rule_id() == "no-cycle")
        .collect();
    assert_eq!(cycles.len(), 4);
    assert!(has_errors(&violations));
    assert!(cycles[0].to_string().starts_with("chain.tt#/entities/E0: [no-cycle] error"));
}

#[test]
fn test_cross_document_links_resolved_on_request() {
    let dir = TempDir::new().unwrap();
    let mut repo = Repository::new(fixtures::meta_schema().unwrap());
    let shop = fixtures::shop_model(repo.graph_mut()).unwrap();
    let customer = repo.get_from_path(shop, "#/entities/Customer").unwrap();
    let billing = fixtures::billing_model(repo.graph_mut(), customer).unwrap();
    repo.assign(dir.path(), billing).unwrap();
    let shop_file = repo.write(dir.path(), shop).unwrap();
    let billing_file = repo.save(billing).unwrap();
    repo.clear();
    std::fs::remove_file(&shop_file).unwrap();

    let mut repo = Repository::with_config(
        fixtures::meta_schema().unwrap(),
        tabtree_repo::RepositoryConfig::builder()
            .preload_references(false)
            .build(),
    );
    let billing = repo.read(&billing_file).unwrap();

    let rules = meta_rules(&repo);
    assert!(validate(&mut repo, rules, &[billing]).unwrap().is_empty());

    let strict = Validator::with_config(
        meta_rules(&repo),
        ValidatorConfig {
            check_link_targets: true,
            ..ValidatorConfig::default()
        },
    );
    let violations = strict.validate(&mut repo, &[billing]).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_id(), "dangling-link");
    assert_eq!(violations[0].field(), Some("target"));
}
