/*
 * error.rs
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

//! Thread index errors.

use crate::message_id::MessageId;
use crate::store::LoadFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThreadError {
    /// Reading a message header from the store failed.
    #[error(transparent)]
    Load(#[from] LoadFailure),
    #[error("no message at position {0}")]
    NoSuchMessage(usize),
    #[error("{0} is not in the thread index")]
    UnknownId(MessageId),
    /// Logged, not returned: a walk revisited this node.
    #[error("cyclic parentage at {0}; treating it as the thread root")]
    CyclicParentage(MessageId),
    #[error("malformed timespan {0:?}")]
    MalformedTimespan(String),
    #[error("malformed window {0:?}")]
    MalformedWindow(String),
}
