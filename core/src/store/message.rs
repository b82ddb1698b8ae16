/*
 * message.rs
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

//! Folder entries as seen by the thread index.

use crate::message_id::{synthesize_message_id, MessageId};
use crate::mime::ThreadHeaders;
use crate::store::delayed::{Delayed, LoadFailure};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::cell::RefCell;
use std::collections::HashSet;

/// Message flags (e.g. Seen, Answered).
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum Flag {
    Seen,
    Answered,
    Flagged,
    Deleted,
    Draft,
    Custom(String),
}

/// One message in a folder: sequence position, flags, and delayed header/body.
#[derive(Debug)]
pub struct FolderMessage {
    pub position: usize,
    flags: RefCell<HashSet<Flag>>,
    pub header: Delayed<ThreadHeaders>,
    pub body: Delayed<Bytes>,
}

impl FolderMessage {
    pub fn new(
        position: usize,
        flags: HashSet<Flag>,
        header: Delayed<ThreadHeaders>,
        body: Delayed<Bytes>,
    ) -> Self {
        Self {
            position,
            flags: RefCell::new(flags),
            header,
            body,
        }
    }

    pub fn has_flag(&self, flag: &Flag) -> bool {
        self.flags.borrow().contains(flag)
    }

    pub fn set_flag(&self, flag: Flag) {
        self.flags.borrow_mut().insert(flag);
    }

    pub fn clear_flag(&self, flag: &Flag) {
        self.flags.borrow_mut().remove(flag);
    }

    pub fn is_deleted(&self) -> bool {
        self.has_flag(&Flag::Deleted)
    }

    /// Date header if the header is realized, else the cheap (index) timestamp.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.header
            .peek()
            .and_then(|h| h.date)
            .or_else(|| self.header.cheap_metadata().approximate_timestamp)
    }

    pub fn size(&self) -> Option<u64> {
        self.header
            .cheap_metadata()
            .approximate_size
            .or_else(|| self.header.peek().and_then(|h| h.content_length))
    }

    /// Realize the header (only) and return it with the message identifier, synthesized
    /// from `folder_name` and the position when Message-ID is absent or malformed.
    pub fn thread_headers(
        &self,
        folder_name: &str,
    ) -> Result<(MessageId, std::rc::Rc<ThreadHeaders>), LoadFailure> {
        let header = self.header.realize()?;
        let id = header
            .message_id
            .clone()
            .unwrap_or_else(|| synthesize_message_id(folder_name, self.position));
        Ok((id, header))
    }
}
