/*
 * scanner.rs
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

//! Windowed thread completion.
//!
//! Completing a thread never parses the whole folder. After threading the target, the
//! subtree under its root is walked for dummy nodes; only if some are found does the scan
//! walk backward from the target, realizing headers of at most `window` older entries and
//! stopping early once every dummy is resolved or entries fall outside `timespan`.

use crate::config::{Timespan, Window};
use crate::message_id::MessageId;
use crate::store::Folder;
use crate::thread::{ThreadError, ThreadIndex, ThreadNode};
use chrono::{DateTime, FixedOffset, TimeDelta};
use std::collections::HashSet;

impl<F: Folder> ThreadIndex<F> {
    /// Thread the message at `position` and fill in as much of its thread as the configured
    /// window and timespan allow. Returns the thread root, which may still have dummies below
    /// it when the bounds run out.
    ///
    /// Fails only if the target's own header cannot be read; load failures further back end
    /// the scan early instead.
    pub fn complete_thread(&mut self, position: usize) -> Result<&ThreadNode, ThreadError> {
        let target = self.absorb(position)?;
        self.drain_deferred();

        let root = self.find_root(&target);
        if self.fully_scanned || self.is_filled(&root) {
            return self.node(&root);
        }

        let mut missing = self.fill(&root);
        if missing.is_empty() {
            return self.node(&root);
        }
        log::debug!("thread of {} has {} unresolved ancestors", target, missing.len());

        let exhaustive = self.scan_backward(position, &target, &mut missing);
        if exhaustive && position + 1 == self.folder.message_count() {
            log::debug!("{} fully scanned", self.folder.name());
            self.fully_scanned = true;
        }
        let root = self.find_root(&target);
        self.node(&root)
    }

    /// Absorb every folder entry (bulk threading). Afterwards `complete_thread` no longer
    /// scans. Entries whose header cannot be read are skipped and keep the folder from
    /// counting as fully scanned.
    pub fn thread_all(&mut self) -> Vec<&ThreadNode> {
        self.drain_deferred();
        let mut complete = true;
        for position in 0..self.folder.message_count() {
            if self.absorbed.contains(&position) {
                continue;
            }
            if let Err(e) = self.absorb(position) {
                log::warn!("cannot thread message {} of {}: {}", position, self.folder.name(), e);
                complete = false;
            }
        }
        if complete {
            self.fully_scanned = true;
        }
        self.known_roots()
    }

    fn node(&self, id: &MessageId) -> Result<&ThreadNode, ThreadError> {
        self.registry
            .get(id)
            .ok_or_else(|| ThreadError::UnknownId(id.clone()))
    }

    fn is_filled(&self, id: &MessageId) -> bool {
        self.registry.get(id).map(|n| n.is_filled()).unwrap_or(false)
    }

    /// Follow parent links to the top. A revisited node ends the walk and is the root.
    pub(crate) fn find_root(&self, id: &MessageId) -> MessageId {
        let mut seen = HashSet::new();
        let mut current = id.clone();
        loop {
            if !seen.insert(current.clone()) {
                log::warn!("{}", ThreadError::CyclicParentage(current.clone()));
                return current;
            }
            match self.registry.get(&current).and_then(|n| n.parent_id()) {
                Some(parent) if self.registry.contains(parent) => current = parent.clone(),
                _ => return current,
            }
        }
    }

    /// Mark the unfilled part of the subtree under `root` filled and return its dummies.
    /// Filled nodes are not descended into.
    fn fill(&mut self, root: &MessageId) -> HashSet<MessageId> {
        let mut missing = HashSet::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                log::warn!("{}", ThreadError::CyclicParentage(id));
                continue;
            }
            let Some(node) = self.registry.get_mut(&id) else {
                continue;
            };
            if node.filled {
                continue;
            }
            node.filled = true;
            if node.is_dummy() {
                missing.insert(id.clone());
            }
            stack.extend(self.registry.linked_children(&id).into_iter().cloned());
        }
        missing
    }

    /// Walk backward from just before `position` down to the window floor, absorbing entries
    /// not yet threaded, until `missing` is empty or an entry predates the timespan.
    /// Returns true if every entry before `position` was threaded (or is deleted).
    fn scan_backward(
        &mut self,
        position: usize,
        target: &MessageId,
        missing: &mut HashSet<MessageId>,
    ) -> bool {
        let floor = match self.config.window {
            Window::Unbounded => 0,
            Window::Entries(n) => position.saturating_sub(n),
        };
        let earliest = self.earliest(target);

        let mut cursor = position;
        let mut realized = 0;
        let mut interrupted = false;
        while cursor > floor && !missing.is_empty() {
            cursor -= 1;
            let Some(message) = self.folder.message_at(cursor) else {
                interrupted = true;
                break;
            };
            if message.is_deleted() {
                continue;
            }
            if !self.absorbed.contains(&cursor) {
                if !message.header.is_realized() {
                    realized += 1;
                }
                match self.absorb(cursor) {
                    Ok(id) => {
                        if missing.remove(&id) {
                            log::debug!("found {} at {}", id, cursor);
                        }
                    }
                    Err(e) => {
                        log::warn!("thread scan of {} stopped at {}: {}", self.folder.name(), cursor, e);
                        interrupted = true;
                        break;
                    }
                }
                let registry = &self.registry;
                missing.retain(|id| registry.get(id).map(|n| n.is_dummy()).unwrap_or(false));
            }
            if let (Some(limit), Some(ts)) = (earliest, self.folder.timestamp(cursor)) {
                if ts < limit {
                    log::debug!("thread scan passed timespan at {}", cursor);
                    interrupted = true;
                    break;
                }
            }
        }
        log::debug!(
            "thread scan for {}: positions {}..{}, {} headers loaded, {} still missing",
            target,
            cursor,
            position,
            realized,
            missing.len()
        );
        cursor == 0 && !interrupted
    }

    fn earliest(&self, target: &MessageId) -> Option<DateTime<FixedOffset>> {
        let Timespan::Seconds(secs) = self.config.timespan else {
            return None;
        };
        let timestamp = self.registry.get(target).and_then(|n| n.timestamp())?;
        let span = TimeDelta::try_seconds(i64::try_from(secs).ok()?)?;
        timestamp.checked_sub_signed(span)
    }
}
