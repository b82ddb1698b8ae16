/*
 * message_id_list.rs
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

//! RFC 5322 msg-id lists (References, In-Reply-To).
//!
//! Real-world In-Reply-To values often carry free text around the id
//! ("your message of ... <id>"), so anything outside angle brackets is skipped
//! rather than rejected.

use crate::message_id::MessageId;

/// All angle-bracketed msg-ids in `value`, in document order. Tokens without a
/// `local@domain` shape are dropped.
pub fn parse_message_id_list(value: &str) -> Vec<MessageId> {
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < len {
        skip_cfws(bytes, len, &mut pos);
        if pos >= len {
            break;
        }
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        pos += 1;
        let start = pos;
        while pos < len && bytes[pos] != b'>' && bytes[pos] != b'<' {
            pos += 1;
        }
        if pos >= len {
            break;
        }
        if bytes[pos] == b'<' {
            // unterminated token; restart at the new bracket
            continue;
        }
        let inner = &value[start..pos];
        pos += 1;
        if let Some(id) = msg_id(inner) {
            out.push(id);
        }
    }
    out
}

/// First msg-id in `value` (In-Reply-To semantics).
pub fn first_message_id(value: &str) -> Option<MessageId> {
    parse_message_id_list(value).into_iter().next()
}

fn msg_id(inner: &str) -> Option<MessageId> {
    let compact: String = inner.chars().filter(|c| !c.is_whitespace()).collect();
    let at = compact.rfind('@')?;
    if at == 0 || at + 1 >= compact.len() {
        return None;
    }
    Some(MessageId::new(compact))
}

fn skip_cfws(bytes: &[u8], len: usize, pos: &mut usize) {
    while *pos < len {
        let b = bytes[*pos];
        if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' || b == b',' {
            *pos += 1;
        } else if b == b'(' {
            *pos += 1;
            let mut depth = 1;
            while *pos < len && depth > 0 {
                if bytes[*pos] == b'(' {
                    depth += 1;
                } else if bytes[*pos] == b')' {
                    depth -= 1;
                } else if bytes[*pos] == b'\\' && *pos + 1 < len {
                    *pos += 2;
                    continue;
                }
                *pos += 1;
            }
        } else {
            break;
        }
    }
}
