/*
 * builder.rs
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

//! Folds one message's threading headers into the registry.

use crate::message_id::MessageId;
use crate::thread::node::{ParentLink, Quality, RealMessage, ThreadNode};
use crate::thread::registry::Registry;

/// A located message ready to be threaded.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub id: MessageId,
    pub message: RealMessage,
    /// First msg-id of In-Reply-To.
    pub reply_to: Option<MessageId>,
    /// References, oldest first.
    pub references: Vec<MessageId>,
}

/// What [`absorb`] did with an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorbed {
    Threaded,
    /// Another folder position already owns this identifier; the message was ignored.
    Duplicate { existing: usize },
}

/// Thread one message. Re-absorbing the same message with unchanged headers leaves the
/// registry unchanged.
pub fn absorb(registry: &mut Registry, incoming: Incoming) -> Absorbed {
    let Incoming {
        id,
        message,
        reply_to,
        references,
    } = incoming;

    if let Some(existing) = registry.get(&id).and_then(|n| n.position()) {
        if existing != message.position {
            log::debug!(
                "duplicate message id {} at {} (first seen at {})",
                id,
                message.position,
                existing
            );
            return Absorbed::Duplicate { existing };
        }
    }
    registry.put(id.clone(), ThreadNode::real(id.clone(), message));

    let mut linked = false;
    if let Some(parent) = reply_to.filter(|p| *p != id) {
        if registry.ensure(&parent) {
            registry.add_root(&parent);
        }
        linked |= link(registry, &id, &parent, Quality::Reply);
    }

    if !references.is_empty() {
        let mut chain: Vec<MessageId> = references.into_iter().filter(|r| *r != id).collect();
        chain.dedup();
        chain.push(id.clone());
        for r in &chain {
            registry.ensure(r);
        }
        for pair in chain.windows(2) {
            let (ancestor, descendant) = (&pair[0], &pair[1]);
            linked |= link(registry, descendant, ancestor, Quality::Reference);
        }
        registry.add_root(&chain[0]);
    }

    if !linked {
        registry.add_root(&id);
    }
    Absorbed::Threaded
}

/// Record a `Guess` link from `child` to `parent`, creating dummies as needed.
pub fn guess(registry: &mut Registry, child: &MessageId, parent: &MessageId) -> bool {
    if child == parent {
        return false;
    }
    registry.ensure(child);
    if registry.ensure(parent) {
        registry.add_root(parent);
    }
    let linked = link(registry, child, parent, Quality::Guess);
    if !linked {
        registry.add_root(child);
    }
    linked
}

/// Declare `parent` as an ancestor of `child`: append to the parent's child set and
/// set/upgrade the child's link when the quality rule allows. Links that would make
/// `child` its own ancestor, or whose parent is already one of `child`'s children, are
/// refused. Returns true if `child` ends up with any parent.
fn link(registry: &mut Registry, child: &MessageId, parent: &MessageId, quality: Quality) -> bool {
    let has_parent = |r: &Registry| r.get(child).map(|n| n.parent.is_some()).unwrap_or(false);
    if registry
        .get(child)
        .map(|n| n.children.contains(parent))
        .unwrap_or(false)
    {
        log::debug!("refusing {:?} link {} -> {}: parent is a child", quality, child, parent);
        return has_parent(registry);
    }
    if registry.is_ancestor(child, parent) {
        log::debug!("refusing {:?} link {} -> {}: would form a cycle", quality, child, parent);
        return has_parent(registry);
    }

    let added = match registry.get_mut(parent) {
        Some(node) => node.add_child(child),
        None => false,
    };

    let mut relinked = false;
    if let Some(node) = registry.get_mut(child) {
        let replace = match &node.parent {
            None => true,
            Some(current) => current.yields_to(parent, quality),
        };
        if replace {
            relinked = node.parent.as_ref().map(|l| &l.parent) != Some(parent);
            node.parent = Some(ParentLink::new(parent.clone(), quality));
        }
    }
    registry.remove_root(child);

    if added || relinked {
        registry.unfill_upward(parent);
    }
    true
}
