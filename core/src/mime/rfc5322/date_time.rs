/*
 * date_time.rs
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

//! Dates: RFC 5322 Date header (section 3.3, with obsolete forms) and mbox From_ line dates.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

const OBSOLETE_ZONES: &[(&str, &str)] = &[
    (" GMT", " +0000"),
    (" UTC", " +0000"),
    (" UT", " +0000"),
    (" EST", " -0500"),
    (" EDT", " -0400"),
    (" CST", " -0600"),
    (" CDT", " -0500"),
    (" MST", " -0700"),
    (" MDT", " -0600"),
    (" PST", " -0800"),
    (" PDT", " -0700"),
];

const MONTHS: &[&str] = &[
    " Jan ", " Feb ", " Mar ", " Apr ", " May ", " Jun ",
    " Jul ", " Aug ", " Sep ", " Oct ", " Nov ", " Dec ",
];

/// Parse an RFC 5322 date-time (e.g. "Fri, 21 Nov 1997 09:55:06 -0600").
/// Returns None on parse failure.
pub fn parse_rfc5322_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = strip_trailing_comment(value.trim());
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .or_else(|| parse_obsolete_date(value))
}

/// Parse the asctime date of an mbox From_ line ("From sender Fri Nov 21 09:55:06 1997").
/// From_ dates carry no zone and are taken as UTC.
pub fn parse_from_line_date(line: &str) -> Option<DateTime<FixedOffset>> {
    let rest = line.trim_end().strip_prefix("From ")?;
    let mut tokens = rest.split_whitespace();
    tokens.next()?; // envelope sender
    let date: Vec<&str> = tokens.take(5).collect();
    if date.len() < 5 {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&date.join(" "), "%a %b %e %H:%M:%S %Y").ok()?;
    FixedOffset::east_opt(0)?.from_local_datetime(&naive).single()
}

/// "... -0600 (CST)" carries a comment that chrono refuses.
fn strip_trailing_comment(value: &str) -> &str {
    match value.rfind('(') {
        Some(i) if value.ends_with(')') => value[..i].trim_end(),
        _ => value,
    }
}

/// Obsolete formats: optional day-of-week, 2-digit year, optional seconds, legacy zone names.
fn parse_obsolete_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = match value.find(',') {
        Some(i) => value[i + 1..].trim(),
        None => value,
    };
    let value = convert_obsolete_timezone(value);
    let value = convert_two_digit_year(&value);
    DateTime::parse_from_str(&value, "%d %b %Y %H:%M %z")
        .or_else(|_| DateTime::parse_from_str(&value, "%d %b %Y %H:%M:%S %z"))
        .ok()
}

/// RFC 5322 4.3: 00-49 -> 2000-2049, 50-99 -> 1950-1999.
/// Only a 2-digit token following a month abbreviation is rewritten.
fn convert_two_digit_year(s: &str) -> String {
    let padded = format!(" {}", s);
    for month in MONTHS {
        if let Some(i) = padded.find(month) {
            let after = i + month.len();
            let bytes = padded.as_bytes();
            let two_digits = after + 2 <= bytes.len()
                && bytes[after].is_ascii_digit()
                && bytes[after + 1].is_ascii_digit()
                && (after + 2 == bytes.len() || !bytes[after + 2].is_ascii_digit());
            if two_digits {
                let yy = u32::from(bytes[after] - b'0') * 10 + u32::from(bytes[after + 1] - b'0');
                let full = if yy <= 49 { 2000 + yy } else { 1900 + yy };
                let mut out = padded.clone();
                out.replace_range(after..after + 2, &full.to_string());
                return out.trim_start().to_string();
            }
            break;
        }
    }
    s.to_string()
}

fn convert_obsolete_timezone(s: &str) -> String {
    for (name, offset) in OBSOLETE_ZONES {
        if let Some(stripped) = s.strip_suffix(name) {
            return format!("{}{}", stripped, offset);
        }
    }
    s.to_string()
}
