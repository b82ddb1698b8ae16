/*
 * filename.rs
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

//! Maildir filename parsing.
//! Format: <timestamp>.<unique>,S=<size>:2,<flags>  e.g. 1733356800000.12345.1,S=4523:2,SF

use crate::store::Flag;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::collections::HashSet;

/// Above this the delivery timestamp is taken to be in milliseconds.
const MILLIS_THRESHOLD: u64 = 100_000_000_000;

/// Parsed Maildir filename (timestamp, unique part, size, flags).
#[derive(Debug, Clone, PartialEq)]
pub struct MaildirFilename {
    pub timestamp: u64,
    pub unique_part: String,
    pub size: Option<u64>,
    pub flags: HashSet<Flag>,
}

impl MaildirFilename {
    /// Parse a Maildir filename from cur/ or new/.
    pub fn parse(filename: &str) -> Option<Self> {
        let (base, flags_part) = match filename.find(":2,") {
            Some(i) => (&filename[..i], &filename[i + 3..]),
            None => (filename, ""),
        };

        let (base, size) = match base.find(",S=") {
            Some(i) => {
                let rest = &base[i + 3..];
                let digits = rest.split(',').next().unwrap_or(rest);
                (&base[..i], Some(digits.parse().ok()?))
            }
            None => (base, None),
        };

        let (timestamp, unique_part) = base.split_once('.')?;
        let timestamp: u64 = timestamp.parse().ok()?;

        let flags = flags_part
            .chars()
            .filter_map(|c| match c {
                'D' => Some(Flag::Draft),
                'F' => Some(Flag::Flagged),
                'R' => Some(Flag::Answered),
                'S' => Some(Flag::Seen),
                'T' => Some(Flag::Deleted),
                'a'..='z' => Some(Flag::Custom(c.to_string())),
                _ => None,
            })
            .collect();

        Some(Self {
            timestamp,
            unique_part: unique_part.to_string(),
            size,
            flags,
        })
    }

    /// Delivery time encoded in the name (seconds, or milliseconds for large values).
    pub fn delivered(&self) -> Option<DateTime<FixedOffset>> {
        let ts = i64::try_from(self.timestamp).ok()?;
        let utc = if self.timestamp > MILLIS_THRESHOLD {
            Utc.timestamp_millis_opt(ts).single()?
        } else {
            Utc.timestamp_opt(ts, 0).single()?
        };
        Some(utc.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_name() {
        let f = MaildirFilename::parse("1733356800000.12345.1,S=4523:2,SFT").unwrap();
        assert_eq!(f.timestamp, 1733356800000);
        assert_eq!(f.unique_part, "12345.1");
        assert_eq!(f.size, Some(4523));
        assert!(f.flags.contains(&Flag::Seen));
        assert!(f.flags.contains(&Flag::Flagged));
        assert!(f.flags.contains(&Flag::Deleted));
        assert_eq!(f.delivered().map(|d| d.timestamp()), Some(1733356800));
    }

    #[test]
    fn parses_bare_new_name() {
        let f = MaildirFilename::parse("1583136000.M1P2.host").unwrap();
        assert_eq!(f.size, None);
        assert!(f.flags.is_empty());
        assert_eq!(f.delivered().map(|d| d.timestamp()), Some(1583136000));
    }

    #[test]
    fn rejects_foreign_names() {
        assert!(MaildirFilename::parse("README").is_none());
        assert!(MaildirFilename::parse("abc.def").is_none());
        assert!(MaildirFilename::parse("1.x,S=big:2,").is_none());
    }
}
