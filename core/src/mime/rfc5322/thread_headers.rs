/*
 * thread_headers.rs
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

//! Subject, Message-ID, References, In-Reply-To (plus Date and size hints) for threading.

use super::date_time::parse_rfc5322_date;
use super::header_fields;
use super::message_id_list::{first_message_id, parse_message_id_list};
use crate::message_id::MessageId;
use chrono::{DateTime, FixedOffset};

/// Header fields consumed by the thread index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadHeaders {
    pub message_id: Option<MessageId>,
    /// First msg-id of In-Reply-To.
    pub in_reply_to: Option<MessageId>,
    /// References msg-ids, oldest first.
    pub references: Vec<MessageId>,
    pub subject: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub content_length: Option<u64>,
    pub lines: Option<u64>,
}

impl ThreadHeaders {
    pub fn has_threading_headers(&self) -> bool {
        self.in_reply_to.is_some() || !self.references.is_empty()
    }
}

/// Read thread headers from the start of a raw message (the body, if present, is ignored).
/// Repeated fields: the first Message-ID / In-Reply-To wins, References accumulate.
pub fn parse_thread_headers(raw: &[u8]) -> ThreadHeaders {
    let mut out = ThreadHeaders::default();
    for (name, value) in header_fields(raw) {
        match name.to_ascii_lowercase().as_str() {
            "message-id" if out.message_id.is_none() => {
                out.message_id = first_message_id(&value);
            }
            "in-reply-to" if out.in_reply_to.is_none() => {
                out.in_reply_to = first_message_id(&value);
            }
            "references" => out.references.extend(parse_message_id_list(&value)),
            "subject" if out.subject.is_none() => out.subject = Some(value),
            "date" if out.date.is_none() => out.date = parse_rfc5322_date(&value),
            "content-length" => out.content_length = value.parse().ok(),
            "lines" => out.lines = value.parse().ok(),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threading_fields() {
        let raw = b"Message-ID: <c@x>\r\n\
In-Reply-To: <b@x> (Bob's message)\r\n\
References: <a@x>\r\n <b@x>\r\n\
Subject: Re: plans\r\n\
Date: Fri, 21 Nov 1997 09:55:06 -0600\r\n\
Content-Length: 120\r\n\
\r\n\
Message-ID: <not-a-header@x>\r\n";
        let th = parse_thread_headers(raw);
        assert_eq!(th.message_id, Some(MessageId::new("c@x")));
        assert_eq!(th.in_reply_to, Some(MessageId::new("b@x")));
        assert_eq!(th.references, vec![MessageId::new("a@x"), MessageId::new("b@x")]);
        assert_eq!(th.subject.as_deref(), Some("Re: plans"));
        assert_eq!(th.date.map(|d| d.timestamp()), Some(880127706));
        assert_eq!(th.content_length, Some(120));
        assert!(th.has_threading_headers());
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let th = parse_thread_headers(b"MESSAGE-ID: <m@x>\nin-reply-to: <p@x>\n\n");
        assert_eq!(th.message_id, Some(MessageId::new("m@x")));
        assert_eq!(th.in_reply_to, Some(MessageId::new("p@x")));
    }

    #[test]
    fn malformed_message_id_is_absent() {
        let th = parse_thread_headers(b"Message-ID: nonsense\nSubject: hi\n\n");
        assert!(th.message_id.is_none());
        assert!(!th.has_threading_headers());
    }
}
