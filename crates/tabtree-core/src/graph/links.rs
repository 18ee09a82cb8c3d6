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

//! Links and link lists with bidirectional consistency.
//!
//! Setting a link clears the opposite side of the previous target, installs
//! the new target and points the new target's opposite back at the owner.
//! The `internal_*` operations change only the local side; they are what
//! the opposite side is updated with.

use super::{DocumentResolver, Graph, NodeId};
use crate::error::{TtError, TtResult};
use crate::schema::{LinkSchema, ValueKind};
use crate::value::{Link, Value};
use std::sync::Arc;
use tracing::{trace, warn};

impl Graph {
    fn link_decl(
        &self,
        owner: NodeId,
        property: &str,
        list: bool,
    ) -> TtResult<(usize, LinkSchema)> {
        let desc = self.type_of(owner)?.require(property)?;
        match (&desc.kind, list) {
            (ValueKind::Link(link), false) | (ValueKind::LinkList(link), true) => {
                Ok((desc.slot, link.clone()))
            }
            _ => Err(TtError::schema(format!(
                "property '{}' is not a {}",
                property,
                if list { "link list" } else { "link" }
            ))),
        }
    }

    fn link_at(&self, owner: NodeId, slot: usize) -> TtResult<Link> {
        match &self.node(owner)?.values[slot] {
            Value::Link(link) => Ok(link.clone()),
            _ => Ok(Link::default()),
        }
    }

    fn link_at_mut(&mut self, owner: NodeId, slot: usize) -> TtResult<&mut Link> {
        let value = &mut self.node_mut(owner)?.values[slot];
        if !matches!(value, Value::Link(_)) {
            *value = Value::Link(Link::default());
        }
        match value {
            Value::Link(link) => Ok(link),
            _ => Err(TtError::schema("link slot holds a non-link value")),
        }
    }

    fn links_at(&self, owner: NodeId, slot: usize) -> TtResult<Vec<Link>> {
        match &self.node(owner)?.values[slot] {
            Value::LinkList(links) => Ok(links.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn links_at_mut(&mut self, owner: NodeId, slot: usize) -> TtResult<&mut Vec<Link>> {
        let value = &mut self.node_mut(owner)?.values[slot];
        if !matches!(value, Value::LinkList(_)) {
            *value = Value::LinkList(Vec::new());
        }
        match value {
            Value::LinkList(links) => Ok(links),
            _ => Err(TtError::schema("link list slot holds a non-link value")),
        }
    }

    fn check_target(&self, link: &LinkSchema, target: NodeId) -> TtResult<()> {
        let ty = self.type_key(target)?;
        if !self.schema().is_subtype(ty, link.target) {
            return Err(TtError::schema(format!(
                "'{}' is not a valid link target, expected '{}'",
                self.schema().object(ty).qualified_name,
                self.schema().object(link.target).qualified_name
            )));
        }
        Ok(())
    }

    /// Resolve one link value: a live handle wins, otherwise the stored
    /// path is navigated from the owner.
    fn resolve(
        &mut self,
        owner: NodeId,
        link: &Link,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<Option<NodeId>> {
        if let Some(target) = link.target {
            if self.contains(target) {
                return Ok(Some(target));
            }
        }
        match &link.path {
            Some(path) => self.navigate(owner, path, resolver).map(Some),
            None => Ok(None),
        }
    }

    /// Like `resolve`, but an unresolvable path counts as no target.
    fn resolve_quiet(
        &mut self,
        owner: NodeId,
        link: &Link,
        resolver: &mut dyn DocumentResolver,
    ) -> Option<NodeId> {
        match self.resolve(owner, link, resolver) {
            Ok(target) => target,
            Err(e) => {
                trace!(path = ?link.path, error = %e, "link does not resolve");
                None
            }
        }
    }

    // ==================== Single links ====================

    /// Dereference a link, loading the target document through `resolver`
    /// when the link only holds a cross-file path.
    pub fn link_get(
        &mut self,
        owner: NodeId,
        property: &str,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<Option<NodeId>> {
        let (slot, _) = self.link_decl(owner, property, false)?;
        let link = self.link_at(owner, slot)?;
        let target = self.resolve(owner, &link, resolver)?;
        if let Some(target) = target {
            if link.target != Some(target) {
                self.link_at_mut(owner, slot)?.target = Some(target);
            }
        }
        Ok(target)
    }

    /// Point a link at `target` (or unset it) keeping both sides consistent.
    pub fn link_set(
        &mut self,
        owner: NodeId,
        property: &str,
        target: Option<NodeId>,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<()> {
        let (slot, decl) = self.link_decl(owner, property, false)?;
        if let Some(target) = target {
            self.check_target(&decl, target)?;
        }
        let current = self.link_at(owner, slot)?;
        let old = match self.resolve(owner, &current, resolver) {
            Ok(old) => old,
            Err(e) => {
                warn!(
                    property,
                    path = ?current.path,
                    error = %e,
                    "previous link target cannot be resolved, dropping it"
                );
                None
            }
        };
        if old != target {
            if let (Some(old), Some(opposite)) = (old, &decl.opposite) {
                self.opposite_detach(old, opposite, owner, resolver)?;
            }
        }
        self.install(owner, slot, target)?;
        if let (Some(target), Some(opposite)) = (target, &decl.opposite) {
            self.opposite_attach(target, opposite, owner, resolver)?;
        }
        Ok(())
    }

    /// Store a raw path without resolving it. Opposite sides are not
    /// touched; this is how links come out of a read.
    pub fn link_set_path(
        &mut self,
        owner: NodeId,
        property: &str,
        path: Option<String>,
    ) -> TtResult<()> {
        let (slot, decl) = self.link_decl(owner, property, false)?;
        if let Some(path) = &path {
            check_pattern(&decl, property, path);
        }
        *self.link_at_mut(owner, slot)? = Link { path, target: None };
        self.touch(owner)
    }

    /// The path a link is written as. Synthesized from the live target
    /// when there is one, otherwise the stored path.
    pub fn link_path(&self, owner: NodeId, property: &str) -> TtResult<Option<String>> {
        let (slot, decl) = self.link_decl(owner, property, false)?;
        let link = self.link_at(owner, slot)?;
        self.path_of_link(owner, &decl, &link)
    }

    fn path_of_link(
        &self,
        owner: NodeId,
        decl: &LinkSchema,
        link: &Link,
    ) -> TtResult<Option<String>> {
        match link.target {
            Some(target) if self.contains(target) => {
                match self.synthesize_path(owner, target, decl) {
                    Ok(path) => Ok(Some(path)),
                    Err(e) if link.path.is_some() => {
                        trace!(error = %e, "falling back to stored link path");
                        Ok(link.path.clone())
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Ok(link.path.clone()),
        }
    }

    /// Install `target` on the owner's side only.
    pub fn internal_set(
        &mut self,
        owner: NodeId,
        property: &str,
        target: Option<NodeId>,
    ) -> TtResult<()> {
        let (slot, _) = self.link_decl(owner, property, false)?;
        self.install(owner, slot, target)
    }

    /// Unset the owner's side if it currently points at `target`.
    pub fn internal_unset(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<()> {
        let (slot, _) = self.link_decl(owner, property, false)?;
        let link = self.link_at(owner, slot)?;
        if self.resolve_quiet(owner, &link, resolver) == Some(target) {
            self.install(owner, slot, None)?;
        }
        Ok(())
    }

    fn install(&mut self, owner: NodeId, slot: usize, target: Option<NodeId>) -> TtResult<()> {
        *self.link_at_mut(owner, slot)? = Link { path: None, target };
        self.touch(owner)
    }

    // ==================== Link lists ====================

    /// Resolve every entry of a link list, in order.
    pub fn link_list_targets(
        &mut self,
        owner: NodeId,
        property: &str,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<Vec<NodeId>> {
        let (slot, _) = self.link_decl(owner, property, true)?;
        let links = self.links_at(owner, slot)?;
        let mut out = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            if let Some(target) = self.resolve(owner, link, resolver)? {
                if link.target != Some(target) {
                    if let Some(entry) = self.links_at_mut(owner, slot)?.get_mut(i) {
                        entry.target = Some(target);
                    }
                }
                out.push(target);
            }
        }
        Ok(out)
    }

    /// Paths of every entry, as they are written.
    pub fn link_list_paths(&self, owner: NodeId, property: &str) -> TtResult<Vec<String>> {
        let (slot, decl) = self.link_decl(owner, property, true)?;
        let mut out = Vec::new();
        for link in self.links_at(owner, slot)? {
            if let Some(path) = self.path_of_link(owner, &decl, &link)? {
                out.push(path);
            }
        }
        Ok(out)
    }

    /// Append `target` keeping both sides consistent. Adding a target that
    /// is already present does nothing.
    pub fn link_list_add(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<()> {
        let (_, decl) = self.link_decl(owner, property, true)?;
        self.check_target(&decl, target)?;
        if self.link_list_contains(owner, property, target, resolver)? {
            return Ok(());
        }
        self.internal_add(owner, property, target)?;
        if let Some(opposite) = &decl.opposite {
            self.opposite_attach(target, opposite, owner, resolver)?;
        }
        Ok(())
    }

    /// Append a raw path without resolving it.
    pub fn link_list_add_path(
        &mut self,
        owner: NodeId,
        property: &str,
        path: impl Into<String>,
    ) -> TtResult<()> {
        let (slot, decl) = self.link_decl(owner, property, true)?;
        let path = path.into();
        check_pattern(&decl, property, &path);
        self.links_at_mut(owner, slot)?.push(Link::from_path(path));
        self.touch(owner)
    }

    /// Remove `target`, clearing the opposite side. Returns whether the
    /// target was present.
    pub fn link_list_remove(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<bool> {
        let (_, decl) = self.link_decl(owner, property, true)?;
        let removed = self.internal_remove(owner, property, target, resolver)?;
        if removed {
            if let Some(opposite) = &decl.opposite {
                self.opposite_detach(target, opposite, owner, resolver)?;
            }
        }
        Ok(removed)
    }

    pub fn link_list_contains(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<bool> {
        let (slot, _) = self.link_decl(owner, property, true)?;
        for link in self.links_at(owner, slot)? {
            if self.resolve_quiet(owner, &link, resolver) == Some(target) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Membership test by path, without resolving anything.
    pub fn link_list_contains_path(
        &self,
        owner: NodeId,
        property: &str,
        path: &str,
    ) -> TtResult<bool> {
        Ok(self
            .link_list_paths(owner, property)?
            .iter()
            .any(|p| p == path))
    }

    /// Append `target` on the owner's side only.
    pub fn internal_add(&mut self, owner: NodeId, property: &str, target: NodeId) -> TtResult<()> {
        let (slot, _) = self.link_decl(owner, property, true)?;
        self.links_at_mut(owner, slot)?.push(Link::to(target));
        self.touch(owner)
    }

    /// Remove every entry resolving to `target` on the owner's side only.
    pub fn internal_remove(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<bool> {
        let (slot, _) = self.link_decl(owner, property, true)?;
        let links = self.links_at(owner, slot)?;
        let mut kept = Vec::with_capacity(links.len());
        let mut removed = false;
        for link in links {
            if self.resolve_quiet(owner, &link, resolver) == Some(target) {
                removed = true;
            } else {
                kept.push(link);
            }
        }
        if removed {
            *self.links_at_mut(owner, slot)? = kept;
            self.touch(owner)?;
        }
        Ok(removed)
    }

    // ==================== Opposite sides ====================

    fn opposite_attach(
        &mut self,
        target: NodeId,
        opposite: &str,
        owner: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<()> {
        if self.type_of(target)?.require(opposite)?.is_list() {
            if !self.link_list_contains(target, opposite, owner, resolver)? {
                self.internal_add(target, opposite, owner)?;
            }
            Ok(())
        } else {
            self.internal_set(target, opposite, Some(owner))
        }
    }

    fn opposite_detach(
        &mut self,
        target: NodeId,
        opposite: &str,
        owner: NodeId,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<()> {
        if !self.contains(target) {
            return Ok(());
        }
        if self.type_of(target)?.require(opposite)?.is_list() {
            self.internal_remove(target, opposite, owner, resolver)?;
            Ok(())
        } else {
            self.internal_unset(target, opposite, owner, resolver)
        }
    }

    // ==================== Deletion and eviction support ====================

    /// Delete a node: clear its outgoing links (cleaning up opposite
    /// sides), delete its children, detach it from its container and free
    /// it. Its handle is stale afterwards.
    pub fn delete(&mut self, id: NodeId, resolver: &mut dyn DocumentResolver) -> TtResult<()> {
        let schema = Arc::clone(self.schema());
        let object = schema.object(self.type_key(id)?);
        for prop in object.properties() {
            match &prop.kind {
                ValueKind::Link(_) => self.link_set(id, &prop.name, None, resolver)?,
                ValueKind::LinkList(_) => {
                    let links = self.links_at(id, prop.slot)?;
                    for link in links {
                        if let Some(target) = self.resolve_quiet(id, &link, resolver) {
                            self.link_list_remove(id, &prop.name, target, resolver)?;
                        }
                    }
                    self.links_at_mut(id, prop.slot)?.clear();
                }
                _ => {}
            }
        }
        for child in self.child_nodes(id)? {
            self.delete(child, resolver)?;
        }
        self.detach(id)?;
        self.free_node(id);
        Ok(())
    }

    /// Give every live link that points into the tree of `root` from
    /// outside it a stored path, so it can be re-resolved after the tree is
    /// discarded and read again.
    pub fn materialize_paths_into(&mut self, root: NodeId) -> TtResult<usize> {
        let inside = self.tree_set(root)?;
        let schema = Arc::clone(self.schema());
        let mut updates: Vec<(NodeId, usize, Option<usize>, String)> = Vec::new();
        for owner in self.live_nodes().collect::<Vec<_>>() {
            if inside.contains(&owner) {
                continue;
            }
            let node = self.node(owner)?;
            let object = schema.object(node.ty);
            for prop in object.properties() {
                let Some(decl) = prop.kind.link_schema() else {
                    continue;
                };
                let entries: Vec<(Option<usize>, &Link)> = match &node.values[prop.slot] {
                    Value::Link(link) => vec![(None, link)],
                    Value::LinkList(links) => links
                        .iter()
                        .enumerate()
                        .map(|(i, l)| (Some(i), l))
                        .collect(),
                    _ => Vec::new(),
                };
                for (index, link) in entries {
                    let Some(target) = link.target else { continue };
                    if !inside.contains(&target) {
                        continue;
                    }
                    match self.synthesize_path(owner, target, decl) {
                        Ok(path) => updates.push((owner, prop.slot, index, path)),
                        Err(e) => warn!(
                            property = prop.name.as_str(),
                            error = %e,
                            "cannot record path of link into evicted document"
                        ),
                    }
                }
            }
        }
        let count = updates.len();
        for (owner, slot, index, path) in updates {
            match index {
                None => self.link_at_mut(owner, slot)?.path = Some(path),
                Some(i) => {
                    if let Some(link) = self.links_at_mut(owner, slot)?.get_mut(i) {
                        link.path = Some(path);
                    }
                }
            }
        }
        Ok(count)
    }
}

/// True for paths of the form `file#/...`.
pub(crate) fn is_cross_file(path: &str) -> bool {
    matches!(path.find('#'), Some(i) if i > 0)
}

pub(crate) fn check_pattern(decl: &LinkSchema, property: &str, path: &str) {
    if !decl.accepts(path) {
        warn!(
            property,
            path,
            pattern = decl.pattern_source.as_deref().unwrap_or(""),
            "link path does not match declared pattern"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{library_schema, sample};
    use super::super::Detached;
    use super::*;
    use std::path::PathBuf;

    // ==================== Single link tests ====================

    #[test]
    fn test_set_wires_opposite() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, _]) = sample(&mut graph);
        graph.link_set(one, "sequel", Some(two), &mut Detached).unwrap();
        assert_eq!(graph.link_get(one, "sequel", &mut Detached).unwrap(), Some(two));
        assert_eq!(graph.link_get(two, "prequel", &mut Detached).unwrap(), Some(one));
    }

    #[test]
    fn test_unset_clears_opposite() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, _]) = sample(&mut graph);
        graph.link_set(one, "sequel", Some(two), &mut Detached).unwrap();
        graph.link_set(one, "sequel", None, &mut Detached).unwrap();
        assert_eq!(graph.link_get(one, "sequel", &mut Detached).unwrap(), None);
        assert_eq!(graph.link_get(two, "prequel", &mut Detached).unwrap(), None);
    }

    #[test]
    fn test_retarget_clears_previous_opposite() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, three]) = sample(&mut graph);
        graph.link_set(one, "sequel", Some(two), &mut Detached).unwrap();
        graph.link_set(one, "sequel", Some(three), &mut Detached).unwrap();
        assert_eq!(graph.link_get(two, "prequel", &mut Detached).unwrap(), None);
        assert_eq!(graph.link_get(three, "prequel", &mut Detached).unwrap(), Some(one));
    }

    #[test]
    fn test_internal_set_is_one_sided() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, _]) = sample(&mut graph);
        graph.internal_set(one, "sequel", Some(two)).unwrap();
        assert_eq!(graph.link_get(two, "prequel", &mut Detached).unwrap(), None);
        graph.internal_unset(one, "sequel", two, &mut Detached).unwrap();
        assert_eq!(graph.link_get(one, "sequel", &mut Detached).unwrap(), None);
    }

    #[test]
    fn test_set_rejects_wrong_target_type() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, ..]) = sample(&mut graph);
        assert!(graph.link_set(one, "sequel", Some(lib), &mut Detached).is_err());
        assert!(graph.link_set(one, "title", None, &mut Detached).is_err());
    }

    #[test]
    fn test_path_only_link_resolves_lazily() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, _]) = sample(&mut graph);
        graph
            .link_set_path(one, "sequel", Some("../books/two".to_string()))
            .unwrap();
        assert_eq!(
            graph.link_path(one, "sequel").unwrap().as_deref(),
            Some("../books/two")
        );
        assert_eq!(graph.link_get(one, "sequel", &mut Detached).unwrap(), Some(two));
    }

    #[test]
    fn test_synthesized_path_prefers_pattern_match() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, three]) = sample(&mut graph);
        graph.link_set(one, "sequel", Some(two), &mut Detached).unwrap();
        assert_eq!(
            graph.link_path(one, "sequel").unwrap().as_deref(),
            Some("../books/two")
        );
        // "../../shelves/b/books/three" does not match, the absolute form does
        graph.link_set(one, "sequel", Some(three), &mut Detached).unwrap();
        assert_eq!(
            graph.link_path(one, "sequel").unwrap().as_deref(),
            Some("#/shelves/b/books/three")
        );
        // prequel has no pattern: the nearest form is used
        assert_eq!(
            graph.link_path(three, "prequel").unwrap().as_deref(),
            Some("../../shelves/a/books/one")
        );
    }

    // ==================== Link list tests ====================

    #[test]
    fn test_link_list_add_remove_bidirectional() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, three]) = sample(&mut graph);
        graph.link_list_add(one, "cites", two, &mut Detached).unwrap();
        graph.link_list_add(one, "cites", three, &mut Detached).unwrap();
        graph.link_list_add(one, "cites", three, &mut Detached).unwrap();
        assert_eq!(
            graph.link_list_targets(one, "cites", &mut Detached).unwrap(),
            vec![two, three]
        );
        assert!(graph.link_list_contains(three, "cited_by", one, &mut Detached).unwrap());
        assert!(graph.link_list_remove(one, "cites", three, &mut Detached).unwrap());
        assert!(!graph.link_list_contains(three, "cited_by", one, &mut Detached).unwrap());
        assert!(!graph.link_list_remove(one, "cites", three, &mut Detached).unwrap());
    }

    #[test]
    fn test_link_list_contains_path() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, two, _]) = sample(&mut graph);
        graph.link_list_add(one, "cites", two, &mut Detached).unwrap();
        assert!(graph.link_list_contains_path(one, "cites", "../books/two").unwrap());
        graph.link_list_add_path(one, "cites", "#/shelves/b/books/three").unwrap();
        assert!(graph
            .link_list_contains_path(one, "cites", "#/shelves/b/books/three")
            .unwrap());
        assert_eq!(graph.link_list_paths(one, "cites").unwrap().len(), 2);
    }

    // ==================== Delete tests ====================

    #[test]
    fn test_delete_cleans_opposites_and_detaches() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, two, three]) = sample(&mut graph);
        graph.link_set(one, "sequel", Some(two), &mut Detached).unwrap();
        graph.link_list_add(three, "cites", two, &mut Detached).unwrap();
        graph.delete(two, &mut Detached).unwrap();
        assert!(!graph.contains(two));
        assert_eq!(graph.link_get(one, "sequel", &mut Detached).unwrap(), None);
        assert!(graph
            .link_list_targets(three, "cites", &mut Detached)
            .unwrap()
            .is_empty());
        let shelf = graph.container(one).unwrap().unwrap();
        assert_eq!(graph.children(shelf, "books").unwrap(), vec![one]);
        assert_eq!(graph.descendants(lib).unwrap().len(), 5);
    }

    #[test]
    fn test_delete_subtree() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, two, three]) = sample(&mut graph);
        graph.link_set(three, "sequel", Some(one), &mut Detached).unwrap();
        let shelf_a = graph.container(one).unwrap().unwrap();
        graph.delete(shelf_a, &mut Detached).unwrap();
        assert!(!graph.contains(one) && !graph.contains(two));
        assert_eq!(graph.link_get(three, "sequel", &mut Detached).unwrap(), None);
        assert_eq!(graph.children(lib, "shelves").unwrap().len(), 1);
    }

    // ==================== Cross-document tests ====================

    #[test]
    fn test_materialize_paths_into_other_document() {
        let mut graph = Graph::new(library_schema());
        let (lib_a, [one, ..]) = sample(&mut graph);
        let (lib_b, [_, _, other_three]) = sample(&mut graph);
        graph
            .set_document_file(lib_a, Some(PathBuf::from("/data/a/city.tt")))
            .unwrap();
        graph
            .set_document_file(lib_b, Some(PathBuf::from("/data/b/city.tt")))
            .unwrap();
        graph.link_list_add(one, "cites", other_three, &mut Detached).unwrap();
        assert_eq!(
            graph.link_list_paths(one, "cites").unwrap(),
            vec!["../b/city.tt#/shelves/b/books/three".to_string()]
        );
        let count = graph.materialize_paths_into(lib_b).unwrap();
        assert_eq!(count, 1);
        graph.discard_tree(lib_b).unwrap();
        assert_eq!(
            graph.link_list_paths(one, "cites").unwrap(),
            vec!["../b/city.tt#/shelves/b/books/three".to_string()]
        );
        assert!(graph.link_list_targets(one, "cites", &mut Detached).is_err());
    }

    #[test]
    fn test_cross_document_link_needs_files() {
        let mut graph = Graph::new(library_schema());
        let (_, [one, ..]) = sample(&mut graph);
        let (_, [_, _, other]) = sample(&mut graph);
        graph.link_list_add(one, "cites", other, &mut Detached).unwrap();
        let err = graph.link_list_paths(one, "cites").unwrap_err();
        assert_eq!(err.kind, crate::error::TtErrorKind::Unsaved);
    }

    #[test]
    fn test_is_cross_file() {
        assert!(is_cross_file("other.tt#/a/b"));
        assert!(!is_cross_file("#/a/b"));
        assert!(!is_cross_file("../a/b"));
    }
}
