/*
 * render.rs
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

//! Walking and printing threads.

use crate::message_id::MessageId;
use crate::store::Folder;
use crate::thread::ThreadIndex;
use std::collections::HashSet;

impl<F: Folder> ThreadIndex<F> {
    /// Identifiers of the subtree under `root` in preorder, following linked children only.
    pub fn thread_ids(&self, root: &MessageId) -> Vec<MessageId> {
        self.preorder(root).into_iter().map(|(id, _)| id).collect()
    }

    /// Folder positions of the real messages in the thread under `root`.
    pub fn thread_messages(&self, root: &MessageId) -> Vec<usize> {
        self.preorder(root)
            .into_iter()
            .filter_map(|(id, _)| self.registry.get(&id).and_then(|n| n.position()))
            .collect()
    }

    /// Number of real messages in the thread.
    pub fn message_count(&self, root: &MessageId) -> usize {
        self.thread_messages(root).len()
    }

    /// One line per node, indented two spaces per level; dummies are marked with `*`.
    pub fn thread_to_string(&self, root: &MessageId) -> String {
        let mut out = String::new();
        for (id, depth) in self.preorder(root) {
            let Some(node) = self.registry.get(&id) else {
                continue;
            };
            out.push_str(&"  ".repeat(depth));
            if node.is_dummy() {
                out.push_str("* ");
            }
            out.push_str(&node.label());
            out.push('\n');
        }
        out
    }

    fn preorder(&self, root: &MessageId) -> Vec<(MessageId, usize)> {
        let mut out = Vec::new();
        if !self.registry.contains(root) {
            return out;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![(root.clone(), 0)];
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let children = self.registry.linked_children(&id);
            stack.extend(children.into_iter().rev().map(|c| (c.clone(), depth + 1)));
            out.push((id, depth));
        }
        out
    }
}
