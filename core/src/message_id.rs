/*
 * message_id.rs
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

//! Message identifier used as the thread registry key (Message-Id header value, or synthesized).

use sha2::{Digest, Sha256};
use std::fmt;

const SYNTHESIZED_DOMAIN: &str = "synthesized.invalid";

/// Folder-unique message identifier. Stored without angle brackets; displayed as `<id>`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MessageId(String);

impl MessageId {
    /// Accepts `local@domain` or `<local@domain>`; surrounding whitespace is ignored.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        let inner = trimmed
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(trimmed);
        Self(inner.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for ids made up by [`synthesize_message_id`].
    pub fn is_synthesized(&self) -> bool {
        let Some(local) = self
            .0
            .strip_prefix("tc.")
            .and_then(|rest| rest.strip_suffix(SYNTHESIZED_DOMAIN))
            .and_then(|rest| rest.strip_suffix('@'))
        else {
            return false;
        };
        match local.split_once('.') {
            Some((position, tag)) => {
                !position.is_empty()
                    && position.bytes().all(|b| b.is_ascii_digit())
                    && tag.len() == 16
                    && tag.bytes().all(|b| b.is_ascii_hexdigit())
            }
            None => false,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Build a stable id for a message without a usable Message-Id header.
/// Deterministic for a given folder name and position.
pub fn synthesize_message_id(folder_name: &str, position: usize) -> MessageId {
    let digest = Sha256::digest(folder_name.as_bytes());
    let tag: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    MessageId(format!("tc.{}.{}@{}", position, tag, SYNTHESIZED_DOMAIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_brackets_are_stripped() {
        let a = MessageId::new("<abc@example.com>");
        let b = MessageId::new("  abc@example.com ");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "abc@example.com");
        assert_eq!(a.to_string(), "<abc@example.com>");
    }

    #[test]
    fn synthesized_ids_are_stable_per_folder_and_position() {
        let a = synthesize_message_id("/var/mail/inbox", 3);
        let b = synthesize_message_id("/var/mail/inbox", 3);
        let c = synthesize_message_id("/var/mail/inbox", 4);
        let d = synthesize_message_id("/var/mail/sent", 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.is_synthesized());
        assert!(a.as_str().starts_with("tc.3."));
        assert!(!MessageId::new("<x@y>").is_synthesized());
    }

    #[test]
    fn header_ids_in_the_synthesized_domain_are_real() {
        assert!(!MessageId::new("<x@synthesized.invalid>").is_synthesized());
        assert!(!MessageId::new("<x@notsynthesized.invalid>").is_synthesized());
        assert!(!MessageId::new("<tc.1.abc@synthesized.invalid>").is_synthesized());
        assert!(!MessageId::new("<tc.1.0123456789abcdef@notsynthesized.invalid>").is_synthesized());
        assert!(synthesize_message_id("inbox", 12).is_synthesized());
    }
}
