/*
 * node.rs
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

//! Thread nodes: real messages and dummy placeholders, linked by identifier.

use crate::config::DummyType;
use crate::message_id::MessageId;
use chrono::{DateTime, FixedOffset};

/// How a parent link was established. Ordered `Guess < Reference < Reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quality {
    /// External evidence only (no header names the parent).
    Guess,
    /// Adjacent entries in a References chain.
    Reference,
    /// In-Reply-To.
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub parent: MessageId,
    pub quality: Quality,
}

impl ParentLink {
    pub fn new(parent: MessageId, quality: Quality) -> Self {
        Self { parent, quality }
    }

    /// Whether a proposed link may replace this one. A link to the same parent is only
    /// ever upgraded; a different parent needs at least the current quality.
    pub fn yields_to(&self, parent: &MessageId, quality: Quality) -> bool {
        if self.parent == *parent {
            quality > self.quality
        } else {
            quality >= self.quality
        }
    }
}

/// A message located in the folder. Whether its header is still delayed is tracked by
/// the folder, see [`Folder::is_header_realized`](crate::store::Folder::is_header_realized).
#[derive(Debug, Clone, PartialEq)]
pub struct RealMessage {
    pub position: usize,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub size: Option<u64>,
    pub subject: Option<String>,
}

/// Stand-in for an identifier that was referenced but not located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub dummy_type: DummyType,
}

impl Placeholder {
    pub fn display_text(&self, id: &MessageId) -> String {
        match self.dummy_type {
            DummyType::Stub => id.to_string(),
            DummyType::Envelope => "(message not available)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Real(RealMessage),
    Dummy(Placeholder),
}

/// Node of the thread forest. Links are identifiers into the registry, never references.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadNode {
    id: MessageId,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) children: Vec<MessageId>,
    pub(crate) filled: bool,
    pub(crate) kind: NodeKind,
}

impl ThreadNode {
    pub fn real(id: MessageId, message: RealMessage) -> Self {
        Self::with_kind(id, NodeKind::Real(message))
    }

    pub fn dummy(id: MessageId, dummy_type: DummyType) -> Self {
        Self::with_kind(id, NodeKind::Dummy(Placeholder { dummy_type }))
    }

    fn with_kind(id: MessageId, kind: NodeKind) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            filled: false,
            kind,
        }
    }

    pub fn message_id(&self) -> &MessageId {
        &self.id
    }

    pub fn parent_link(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub fn parent_id(&self) -> Option<&MessageId> {
        self.parent.as_ref().map(|l| &l.parent)
    }

    /// Every node that ever named this one as its ancestor, in first-seen order. Use
    /// [`crate::ThreadIndex::thread_ids`] for the tree as currently linked.
    pub fn child_ids(&self) -> &[MessageId] {
        &self.children
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, NodeKind::Dummy(_))
    }

    pub fn message(&self) -> Option<&RealMessage> {
        match &self.kind {
            NodeKind::Real(m) => Some(m),
            NodeKind::Dummy(_) => None,
        }
    }

    pub fn position(&self) -> Option<usize> {
        self.message().map(|m| m.position)
    }

    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.message().and_then(|m| m.timestamp)
    }

    /// One-line label: the subject for real messages, placeholder text for dummies.
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::Real(m) => m
                .subject
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
            NodeKind::Dummy(p) => p.display_text(&self.id),
        }
    }

    pub(crate) fn add_child(&mut self, child: &MessageId) -> bool {
        if self.children.contains(child) {
            return false;
        }
        self.children.push(child.clone());
        true
    }
}
