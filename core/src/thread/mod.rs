/*
 * mod.rs
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

//! Thread index: registry of thread nodes over one folder, deferred work queues, and the
//! windowed completion scan.
//!
//! The index is single-threaded (`!Send`, since delayed headers are `Rc`-shared). Hosts that
//! thread from several tasks must put the whole index behind one lock.

mod builder;
mod error;
mod node;
mod registry;
mod render;
mod scanner;

pub use builder::{Absorbed, Incoming};
pub use error::ThreadError;
pub use node::{NodeKind, ParentLink, Placeholder, Quality, RealMessage, ThreadNode};
pub use registry::Registry;

use crate::config::ThreadConfig;
use crate::message_id::MessageId;
use crate::store::Folder;
use std::collections::{HashSet, VecDeque};

pub struct ThreadIndex<F: Folder> {
    folder: F,
    config: ThreadConfig,
    registry: Registry,
    /// Folder positions already folded into the registry.
    absorbed: HashSet<usize>,
    to_thread: VecDeque<usize>,
    to_unthread: VecDeque<MessageId>,
    fully_scanned: bool,
}

impl<F: Folder> ThreadIndex<F> {
    pub fn new(folder: F, config: ThreadConfig) -> Self {
        Self {
            registry: Registry::new(config.dummy_type),
            folder,
            config,
            absorbed: HashSet::new(),
            to_thread: VecDeque::new(),
            to_unthread: VecDeque::new(),
            fully_scanned: false,
        }
    }

    pub fn folder(&self) -> &F {
        &self.folder
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn lookup(&self, id: &MessageId) -> Option<&ThreadNode> {
        self.registry.get(id)
    }

    /// True once [`ThreadIndex::thread_all`] has absorbed every folder entry.
    pub fn is_fully_scanned(&self) -> bool {
        self.fully_scanned
    }

    /// All current roots, including dummies and messages flagged deleted.
    pub fn known_roots(&self) -> Vec<&ThreadNode> {
        self.registry
            .roots()
            .filter_map(|id| self.registry.get(id))
            .collect()
    }

    /// Queue a message whose header became available after it was skipped. Processed at the
    /// start of the next `complete_thread` or `thread_all`.
    pub fn mark_for_threading(&mut self, position: usize) {
        self.to_thread.push_back(position);
    }

    /// Queue a message leaving the folder. Its node turns back into a dummy (links kept).
    pub fn mark_for_unthreading(&mut self, id: MessageId) {
        self.to_unthread.push_back(id);
    }

    /// Fold the message at `position` into the registry, realizing its header if needed.
    pub fn absorb(&mut self, position: usize) -> Result<MessageId, ThreadError> {
        let message = self
            .folder
            .message_at(position)
            .ok_or(ThreadError::NoSuchMessage(position))?;
        let (id, header) = message.thread_headers(self.folder.name())?;
        let incoming = Incoming {
            id: id.clone(),
            message: RealMessage {
                position,
                timestamp: message.timestamp(),
                size: message.size(),
                subject: header.subject.clone(),
            },
            reply_to: header.in_reply_to.clone(),
            references: header.references.clone(),
        };
        builder::absorb(&mut self.registry, incoming);
        self.absorbed.insert(position);
        Ok(id)
    }

    /// Record that `child` probably follows `parent` without header evidence. Header links
    /// always take precedence over guesses.
    pub fn guess(&mut self, child: &MessageId, parent: &MessageId) -> bool {
        builder::guess(&mut self.registry, child, parent)
    }

    fn drain_deferred(&mut self) {
        while let Some(position) = self.to_thread.pop_front() {
            if let Err(e) = self.absorb(position) {
                log::warn!("deferred threading of message {} failed: {}", position, e);
            }
        }
        while let Some(id) = self.to_unthread.pop_front() {
            self.unthread(&id);
        }
    }

    fn unthread(&mut self, id: &MessageId) {
        match self.registry.demote(id) {
            Some(position) => {
                self.absorbed.remove(&position);
                self.registry.unfill_upward(id);
                log::debug!("unthreaded {} (was message {})", id, position);
            }
            None => log::debug!("unthread {}: no threaded message with this id", id),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory folder whose headers count their realizations.

    use crate::mime::{parse_thread_headers, ThreadHeaders};
    use crate::store::{
        CheapMetadata, Delayed, Flag, Folder, FolderMessage, Loader, StoreError,
    };
    use bytes::Bytes;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    struct RawHeader {
        raw: Vec<u8>,
        position: usize,
        loads: Rc<Cell<usize>>,
        broken: Rc<Cell<bool>>,
    }

    impl Loader<ThreadHeaders> for RawHeader {
        fn load(&self) -> Result<ThreadHeaders, StoreError> {
            if self.broken.get() {
                return Err(StoreError::new("read error"));
            }
            self.loads.set(self.loads.get() + 1);
            Ok(parse_thread_headers(&self.raw))
        }
        fn label(&self) -> String {
            format!("memory#{}", self.position)
        }
        fn describe(&self) -> String {
            format!("entry {}", self.position)
        }
        fn cheap_metadata(&self) -> CheapMetadata {
            CheapMetadata {
                approximate_size: Some(self.raw.len() as u64),
                approximate_timestamp: None,
            }
        }
    }

    pub struct MemoryFolder {
        messages: Vec<FolderMessage>,
        loads: Vec<Rc<Cell<usize>>>,
        broken: Vec<Rc<Cell<bool>>>,
    }

    impl MemoryFolder {
        pub fn new(headers: &[&str]) -> Self {
            let mut folder = Self {
                messages: Vec::new(),
                loads: Vec::new(),
                broken: Vec::new(),
            };
            for (position, h) in headers.iter().enumerate() {
                let loads = Rc::new(Cell::new(0));
                let broken = Rc::new(Cell::new(false));
                let mut raw = h.replace("\n", "\r\n").into_bytes();
                raw.extend_from_slice(b"\r\n");
                let header = Delayed::new(RawHeader {
                    raw,
                    position,
                    loads: Rc::clone(&loads),
                    broken: Rc::clone(&broken),
                });
                let body = Delayed::realized(Bytes::new(), CheapMetadata::default());
                folder
                    .messages
                    .push(FolderMessage::new(position, HashSet::new(), header, body));
                folder.loads.push(loads);
                folder.broken.push(broken);
            }
            folder
        }

        pub fn loads(&self, position: usize) -> usize {
            self.loads[position].get()
        }

        pub fn total_loads(&self) -> usize {
            self.loads.iter().map(|l| l.get()).sum()
        }

        pub fn break_entry(&self, position: usize) {
            self.broken[position].set(true);
        }

        pub fn delete(&self, position: usize) {
            self.messages[position].set_flag(Flag::Deleted);
        }
    }

    impl Folder for MemoryFolder {
        fn name(&self) -> &str {
            "memory"
        }

        fn message_count(&self) -> usize {
            self.messages.len()
        }

        fn message_at(&self, position: usize) -> Option<&FolderMessage> {
            self.messages.get(position)
        }
    }
}
