/*
 * config.rs
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

//! Thread index configuration: placeholder type, scan window, and scan timespan.
//!
//! Values come from the host application's settings (JSON) or are built in code. Malformed
//! window and timespan strings are not fatal: they are logged and the default is used.

use crate::thread::ThreadError;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 24.0 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: f64 = 7.0 * SECONDS_PER_DAY;

const DEFAULT_WINDOW: usize = 10;
const DEFAULT_TIMESPAN_SECS: u64 = 3 * 24 * 3600;

/// Kind of node created for an identifier that is referenced but not (yet) in the folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DummyType {
    /// Bare placeholder; rendered by its identifier.
    #[default]
    Stub,
    /// Placeholder that renders like an envelope whose message is not available.
    Envelope,
}

/// How many older folder entries a thread completion may examine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Entries(usize),
    Unbounded,
}

impl Default for Window {
    fn default() -> Self {
        Window::Entries(DEFAULT_WINDOW)
    }
}

impl FromStr for Window {
    type Err = ThreadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("unbounded") {
            return Ok(Window::Unbounded);
        }
        s.parse()
            .map(Window::Entries)
            .map_err(|_| ThreadError::MalformedWindow(s.to_string()))
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Entries(n) => write!(f, "{}", n),
            Window::Unbounded => write!(f, "ALL"),
        }
    }
}

/// Maximum age difference, relative to the target message, that a completion scan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timespan {
    Seconds(u64),
    Unbounded,
}

impl Default for Timespan {
    fn default() -> Self {
        Timespan::Seconds(DEFAULT_TIMESPAN_SECS)
    }
}

impl FromStr for Timespan {
    type Err = ThreadError;

    /// Accepts `EVER`/`unbounded`, a bare number of seconds, or a non-negative number
    /// followed by `hour(s)`, `day(s)` or `week(s)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || ThreadError::MalformedTimespan(s.to_string());
        if s.eq_ignore_ascii_case("ever") || s.eq_ignore_ascii_case("unbounded") {
            return Ok(Timespan::Unbounded);
        }
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let number: f64 = number.parse().map_err(|_| malformed())?;
        if !number.is_finite() || number < 0.0 {
            return Err(malformed());
        }
        let scale = match unit.trim().to_ascii_lowercase().as_str() {
            "" => 1.0,
            "hour" | "hours" => SECONDS_PER_HOUR,
            "day" | "days" => SECONDS_PER_DAY,
            "week" | "weeks" => SECONDS_PER_WEEK,
            _ => return Err(malformed()),
        };
        Ok(Timespan::Seconds((number * scale).round() as u64))
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timespan::Seconds(s) => write!(f, "{} seconds", s),
            Timespan::Unbounded => write!(f, "EVER"),
        }
    }
}

/// Options recognized by the thread index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    pub dummy_type: DummyType,
    #[serde(deserialize_with = "lenient_window")]
    pub window: Window,
    #[serde(deserialize_with = "lenient_timespan")]
    pub timespan: Timespan,
}

impl ThreadConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    pub fn with_timespan(mut self, timespan: Timespan) -> Self {
        self.timespan = timespan;
        self
    }

    pub fn with_dummy_type(mut self, dummy_type: DummyType) -> Self {
        self.dummy_type = dummy_type;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Number(u64),
    Text(String),
}

fn lenient_window<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Window, D::Error> {
    Ok(match RawOption::deserialize(deserializer)? {
        RawOption::Number(n) => Window::Entries(n as usize),
        RawOption::Text(s) => s.parse().unwrap_or_else(|e| {
            log::warn!("{}; using window {}", e, Window::default());
            Window::default()
        }),
    })
}

fn lenient_timespan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timespan, D::Error> {
    Ok(match RawOption::deserialize(deserializer)? {
        RawOption::Number(n) => Timespan::Seconds(n),
        RawOption::Text(s) => s.parse().unwrap_or_else(|e| {
            log::warn!("{}; using timespan {}", e, Timespan::default());
            Timespan::default()
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ThreadConfig::default();
        assert_eq!(c.dummy_type, DummyType::Stub);
        assert_eq!(c.window, Window::Entries(10));
        assert_eq!(c.timespan, Timespan::Seconds(259_200));
    }

    #[test]
    fn timespan_units() {
        assert_eq!("3 days".parse::<Timespan>().unwrap(), Timespan::Seconds(259_200));
        assert_eq!("1 week".parse::<Timespan>().unwrap(), Timespan::Seconds(604_800));
        assert_eq!("12hours".parse::<Timespan>().unwrap(), Timespan::Seconds(43_200));
        assert_eq!("1.5 Hour".parse::<Timespan>().unwrap(), Timespan::Seconds(5_400));
        assert_eq!("90".parse::<Timespan>().unwrap(), Timespan::Seconds(90));
        assert_eq!("EVER".parse::<Timespan>().unwrap(), Timespan::Unbounded);
    }

    #[test]
    fn malformed_timespan_is_an_error() {
        for bad in ["", "soon", "-2 days", "3 fortnights", "days"] {
            match bad.parse::<Timespan>() {
                Err(ThreadError::MalformedTimespan(s)) => assert_eq!(s, bad.trim()),
                other => panic!("{:?} parsed as {:?}", bad, other),
            }
        }
    }

    #[test]
    fn window_values() {
        assert_eq!("0".parse::<Window>().unwrap(), Window::Entries(0));
        assert_eq!(" 25 ".parse::<Window>().unwrap(), Window::Entries(25));
        assert_eq!("ALL".parse::<Window>().unwrap(), Window::Unbounded);
        assert!(matches!("-1".parse::<Window>(), Err(ThreadError::MalformedWindow(_))));
    }

    #[test]
    fn json_config() {
        let c = ThreadConfig::from_json(
            r#"{"dummy_type": "envelope", "window": "unbounded", "timespan": "2 weeks"}"#,
        )
        .unwrap();
        assert_eq!(c.dummy_type, DummyType::Envelope);
        assert_eq!(c.window, Window::Unbounded);
        assert_eq!(c.timespan, Timespan::Seconds(1_209_600));

        let c = ThreadConfig::from_json(r#"{"window": 0, "timespan": 60}"#).unwrap();
        assert_eq!(c.window, Window::Entries(0));
        assert_eq!(c.timespan, Timespan::Seconds(60));
    }

    #[test]
    fn malformed_json_values_fall_back_to_defaults() {
        let c = ThreadConfig::from_json(r#"{"window": "lots", "timespan": "a while"}"#).unwrap();
        assert_eq!(c.window, Window::default());
        assert_eq!(c.timespan, Timespan::default());
    }
}
