/*
 * registry.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Tagliacarte, a cross-platform email client.
 *
 * Tagliacarte is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tagliacarte is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tagliacarte.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Identity-keyed node store and root set.
//!
//! All node insertion goes through [`Registry::put`], which enforces one node per
//! identifier: a dummy is replaced by its real counterpart (links transferred verbatim),
//! never duplicated.

use crate::config::DummyType;
use crate::message_id::MessageId;
use crate::thread::node::{NodeKind, Placeholder, ThreadNode};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct Registry {
    nodes: HashMap<MessageId, ThreadNode>,
    roots: BTreeSet<MessageId>,
    dummy_type: DummyType,
}

impl Registry {
    pub fn new(dummy_type: DummyType) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: BTreeSet::new(),
            dummy_type,
        }
    }

    pub fn get(&self, id: &MessageId) -> Option<&ThreadNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &MessageId) -> Option<&mut ThreadNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `node` under `id`. An existing node's parent link, children and filled flag
    /// are carried over, so promoting a dummy (or re-inserting a real node) loses no links.
    pub fn put(&mut self, id: MessageId, mut node: ThreadNode) {
        if let Some(previous) = self.nodes.remove(&id) {
            if previous.is_dummy() && !node.is_dummy() {
                log::debug!("promoting dummy {} ({} children)", id, previous.children.len());
            }
            node.parent = previous.parent;
            node.children = previous.children;
            node.filled = previous.filled;
        }
        self.nodes.insert(id, node);
    }

    /// Node for `id`, creating a dummy of the configured type if absent.
    /// Returns true when a dummy was created.
    pub fn ensure(&mut self, id: &MessageId) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.nodes
            .insert(id.clone(), ThreadNode::dummy(id.clone(), self.dummy_type));
        true
    }

    pub fn remove(&mut self, id: &MessageId) -> Option<ThreadNode> {
        self.roots.remove(id);
        self.nodes.remove(id)
    }

    /// Turn a real node back into a dummy, keeping its links. Returns the position it had.
    pub fn demote(&mut self, id: &MessageId) -> Option<usize> {
        let dummy_type = self.dummy_type;
        let node = self.nodes.get_mut(id)?;
        let position = node.position()?;
        node.kind = NodeKind::Dummy(Placeholder { dummy_type });
        Some(position)
    }

    pub fn roots(&self) -> impl Iterator<Item = &MessageId> {
        self.roots.iter()
    }

    pub fn is_root(&self, id: &MessageId) -> bool {
        self.roots.contains(id)
    }

    /// Adds `id` to the root set unless it has a parent link (or is unknown).
    pub fn add_root(&mut self, id: &MessageId) -> bool {
        match self.nodes.get(id) {
            Some(node) if node.parent.is_none() => self.roots.insert(id.clone()),
            _ => false,
        }
    }

    pub fn remove_root(&mut self, id: &MessageId) -> bool {
        self.roots.remove(id)
    }

    /// Children of `id` whose parent link points back to `id` (the tree as currently linked).
    pub fn linked_children(&self, id: &MessageId) -> Vec<&MessageId> {
        match self.nodes.get(id) {
            Some(node) => node
                .children
                .iter()
                .filter(|c| self.nodes.get(*c).and_then(|n| n.parent_id()) == Some(id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether `ancestor` is reached by following parent links upward from `id`
    /// (including `id` itself).
    pub fn is_ancestor(&self, ancestor: &MessageId, id: &MessageId) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                return false;
            }
            cursor = self.nodes.get(current).and_then(|n| n.parent_id());
        }
        false
    }

    /// Clear the filled flag on `id` and every ancestor.
    pub fn unfill_upward(&mut self, id: &MessageId) {
        let mut seen = HashSet::new();
        let mut cursor = Some(id.clone());
        while let Some(current) = cursor {
            if !seen.insert(current.clone()) {
                break;
            }
            cursor = match self.nodes.get_mut(&current) {
                Some(node) => {
                    node.filled = false;
                    node.parent_id().cloned()
                }
                None => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::node::{ParentLink, Quality, RealMessage};

    fn id(s: &str) -> MessageId {
        MessageId::new(s)
    }

    fn real(s: &str, position: usize) -> ThreadNode {
        ThreadNode::real(
            id(s),
            RealMessage {
                position,
                timestamp: None,
                size: None,
                subject: None,
            },
        )
    }

    #[test]
    fn put_promotes_dummy_and_keeps_links() {
        let mut r = Registry::new(DummyType::Stub);
        assert!(r.ensure(&id("x@h")));
        assert!(!r.ensure(&id("x@h")));
        {
            let dummy = r.get_mut(&id("x@h")).unwrap();
            dummy.add_child(&id("c1@h"));
            dummy.add_child(&id("c2@h"));
            dummy.parent = Some(ParentLink::new(id("p@h"), Quality::Reference));
        }
        r.put(id("x@h"), real("x@h", 4));
        let node = r.get(&id("x@h")).unwrap();
        assert!(!node.is_dummy());
        assert_eq!(node.position(), Some(4));
        assert_eq!(node.child_ids(), &[id("c1@h"), id("c2@h")]);
        assert_eq!(node.parent_id(), Some(&id("p@h")));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn roots_exclude_linked_nodes() {
        let mut r = Registry::new(DummyType::Stub);
        r.put(id("a@h"), real("a@h", 0));
        assert!(r.add_root(&id("a@h")));
        r.get_mut(&id("a@h")).unwrap().parent =
            Some(ParentLink::new(id("z@h"), Quality::Reply));
        r.remove_root(&id("a@h"));
        assert!(!r.add_root(&id("a@h")));
        assert!(!r.add_root(&id("unknown@h")));
        assert_eq!(r.roots().count(), 0);
    }

    #[test]
    fn demote_keeps_links() {
        let mut r = Registry::new(DummyType::Envelope);
        r.put(id("a@h"), real("a@h", 2));
        r.get_mut(&id("a@h")).unwrap().add_child(&id("b@h"));
        assert_eq!(r.demote(&id("a@h")), Some(2));
        let node = r.get(&id("a@h")).unwrap();
        assert!(node.is_dummy());
        assert_eq!(node.child_ids(), &[id("b@h")]);
        assert_eq!(r.demote(&id("a@h")), None);
    }

    #[test]
    fn ancestor_walk_survives_cycles() {
        let mut r = Registry::new(DummyType::Stub);
        r.ensure(&id("a@h"));
        r.ensure(&id("b@h"));
        r.get_mut(&id("a@h")).unwrap().parent = Some(ParentLink::new(id("b@h"), Quality::Reply));
        r.get_mut(&id("b@h")).unwrap().parent = Some(ParentLink::new(id("a@h"), Quality::Reply));
        assert!(r.is_ancestor(&id("b@h"), &id("a@h")));
        assert!(!r.is_ancestor(&id("c@h"), &id("a@h")));
        r.get_mut(&id("a@h")).unwrap().filled = true;
        r.unfill_upward(&id("a@h"));
        assert!(!r.get(&id("a@h")).unwrap().is_filled());
    }
}
