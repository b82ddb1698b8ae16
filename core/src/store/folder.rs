/*
 * folder.rs
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

//! Folder trait: an ordered, randomly accessible sequence of messages with delayed headers.
//!
//! Backends (mbox, Maildir, ...) implement this trait; the thread index only ever talks to
//! a folder through it. Calls are synchronous; the only blocking work is realizing a delayed
//! header or body.

use crate::store::message::FolderMessage;
use chrono::{DateTime, FixedOffset};

pub trait Folder {
    /// Name used in logs and for synthesized message ids (usually the folder path).
    fn name(&self) -> &str;

    fn message_count(&self) -> usize;

    fn message_at(&self, position: usize) -> Option<&FolderMessage>;

    /// Never triggers loading.
    fn is_header_realized(&self, position: usize) -> bool {
        self.message_at(position)
            .map(|m| m.header.is_realized())
            .unwrap_or(false)
    }

    /// Never triggers loading; unknown when neither the header nor index metadata has a date.
    fn timestamp(&self, position: usize) -> Option<DateTime<FixedOffset>> {
        self.message_at(position).and_then(|m| m.timestamp())
    }
}
