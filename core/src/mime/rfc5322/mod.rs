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

//! RFC 5322 header block: locate the end of the header section and iterate unfolded fields.

mod date_time;
mod message_id_list;
mod thread_headers;

pub use date_time::{parse_from_line_date, parse_rfc5322_date};
pub use message_id_list::{first_message_id, parse_message_id_list};
pub use thread_headers::{parse_thread_headers, ThreadHeaders};

/// Length of the header section including the blank line that ends it.
/// Returns None if `raw` holds no complete header section yet.
pub fn header_block_len(raw: &[u8]) -> Option<usize> {
    if raw.starts_with(b"\r\n") {
        return Some(2);
    }
    if raw.starts_with(b"\n") {
        return Some(1);
    }
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\n' {
            match raw.get(i + 1) {
                Some(b'\n') => return Some(i + 2),
                Some(b'\r') if raw.get(i + 2) == Some(&b'\n') => return Some(i + 3),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Unfolded header fields (name, value) in document order. Stops at the first blank line.
pub(crate) fn header_fields(raw: &[u8]) -> Vec<(String, String)> {
    let end = header_block_len(raw).unwrap_or(raw.len());
    let text = String::from_utf8_lossy(&raw[..end]);
    let mut fields: Vec<(String, String)> = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            // continuation of the previous field
            if let Some((_, value)) = fields.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some(colon) = line.find(':') {
            let name = line[..colon].trim();
            if name.is_empty() || name.contains(' ') {
                continue;
            }
            fields.push((name.to_string(), line[colon + 1..].trim().to_string()));
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_block_ends_at_blank_line() {
        assert_eq!(header_block_len(b"A: b\n\nbody"), Some(6));
        assert_eq!(header_block_len(b"A: b\r\n\r\nbody"), Some(8));
        assert_eq!(header_block_len(b"\nbody"), Some(1));
        assert_eq!(header_block_len(b"A: b\nC: d\n"), None);
    }

    #[test]
    fn folded_fields_are_joined() {
        let raw = b"References: <a@x>\n\t<b@x>\nSubject:  hello \nX Bad: no\n\nRefs: <c@x>\n";
        let fields = header_fields(raw);
        assert_eq!(
            fields,
            vec![
                ("References".to_string(), "<a@x> <b@x>".to_string()),
                ("Subject".to_string(), "hello".to_string()),
            ]
        );
    }
}
