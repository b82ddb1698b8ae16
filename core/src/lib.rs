/*
 * lib.rs
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

//! Thread index for tagliacarte folders.
//!
//! Builds reply/reference threads from Message-Id, In-Reply-To and References headers
//! without parsing whole folders: headers are realized lazily, unknown ancestors are
//! held as dummy nodes, and completing a thread scans only a bounded window of
//! older folder entries.

pub mod config;
pub mod localstorage;
pub mod message_id;
pub mod mime;
pub mod store;
pub mod thread;

pub use config::{DummyType, ThreadConfig, Timespan, Window};
pub use localstorage::{MaildirFolder, MboxFolder};
pub use message_id::MessageId;
pub use thread::{ThreadError, ThreadIndex, ThreadNode};
