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

//! mbox folder (single file, From_ boundaries).
//!
//! Opening a folder scans the file once for message boundaries and the few status
//! headers that carry flags. Headers and bodies stay on disk until realized; the read
//! handle is opened on first use and closed when every delayed part has been read.

use crate::mime::{header_block_len, parse_from_line_date, parse_thread_headers, ThreadHeaders};
use crate::store::{
    CheapMetadata, DelayCounter, Delayed, Flag, Folder, FolderMessage, Loader, StoreError,
};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::rc::Rc;

const HEADER_CHUNK: usize = 4096;

/// One message located by the boundary scan. `start` is just after the From_ line.
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    start: u64,
    end: u64,
    received: Option<DateTime<FixedOffset>>,
    flags: HashSet<Flag>,
}

/// Shared read handle for all loaders of one folder.
struct MboxSource {
    path: PathBuf,
    file: RefCell<Option<File>>,
}

impl MboxSource {
    fn read_at(&self, start: u64, buf: &mut [u8]) -> Result<usize, StoreError> {
        let mut slot = self.file.borrow_mut();
        if slot.is_none() {
            let file = File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
            log::trace!("opened {}", self.path.display());
            *slot = Some(file);
        }
        let Some(file) = slot.as_mut() else {
            return Err(StoreError::new("mbox handle unavailable"));
        };
        file.seek(SeekFrom::Start(start))
            .map_err(|e| StoreError::io(&self.path, e))?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = file
                .read(&mut buf[filled..])
                .map_err(|e| StoreError::io(&self.path, e))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, StoreError> {
        let mut buf = vec![0u8; end.saturating_sub(start) as usize];
        let n = self.read_at(start, &mut buf)?;
        if n < buf.len() {
            return Err(StoreError::NotFound(self.range(start, end)));
        }
        Ok(buf)
    }

    /// Read only as far as the blank line ending the header block.
    fn read_header(&self, start: u64, end: u64) -> Result<Vec<u8>, StoreError> {
        let mut raw = Vec::new();
        let mut offset = start;
        while offset < end {
            let want = HEADER_CHUNK.min((end - offset) as usize);
            let mut chunk = vec![0u8; want];
            let n = self.read_at(offset, &mut chunk)?;
            if n == 0 {
                return Err(StoreError::NotFound(self.range(start, end)));
            }
            raw.extend_from_slice(&chunk[..n]);
            offset += n as u64;
            if let Some(len) = header_block_len(&raw) {
                raw.truncate(len);
                break;
            }
        }
        Ok(raw)
    }

    fn range(&self, start: u64, end: u64) -> String {
        format!("bytes {}..{} of {}", start, end, self.path.display())
    }

    fn close(&self) {
        if self.file.borrow_mut().take().is_some() {
            log::trace!("closed {}", self.path.display());
        }
    }
}

struct HeaderLoader {
    source: Rc<MboxSource>,
    position: usize,
    entry: Entry,
}

impl Loader<ThreadHeaders> for HeaderLoader {
    fn load(&self) -> Result<ThreadHeaders, StoreError> {
        let raw = self.source.read_header(self.entry.start, self.entry.end)?;
        Ok(parse_thread_headers(&raw))
    }

    fn label(&self) -> String {
        format!("{}#{}", self.source.path.display(), self.position)
    }

    fn describe(&self) -> String {
        self.source.range(self.entry.start, self.entry.end)
    }

    fn cheap_metadata(&self) -> CheapMetadata {
        CheapMetadata {
            approximate_size: Some(self.entry.end - self.entry.start),
            approximate_timestamp: self.entry.received,
        }
    }
}

struct BodyLoader {
    source: Rc<MboxSource>,
    position: usize,
    start: u64,
    end: u64,
}

impl Loader<Bytes> for BodyLoader {
    fn load(&self) -> Result<Bytes, StoreError> {
        let raw = self.source.read_range(self.start, self.end)?;
        let body_start = header_block_len(&raw).unwrap_or(raw.len());
        Ok(Bytes::from(raw).slice(body_start..))
    }

    fn label(&self) -> String {
        format!("{}#{} body", self.source.path.display(), self.position)
    }

    fn describe(&self) -> String {
        self.source.range(self.start, self.end)
    }
}

/// Folder over a single mbox file.
pub struct MboxFolder {
    name: String,
    messages: Vec<FolderMessage>,
    counter: DelayCounter,
}

impl MboxFolder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = scan_entries(&path)?;
        log::debug!("{}: {} messages", path.display(), entries.len());

        let source = Rc::new(MboxSource {
            path: path.clone(),
            file: RefCell::new(None),
        });
        let counter = DelayCounter::new();
        {
            let source = Rc::clone(&source);
            counter.on_drained(move || source.close());
        }

        let messages = entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                let flags = entry.flags.clone();
                let body = Delayed::counted(
                    BodyLoader {
                        source: Rc::clone(&source),
                        position,
                        start: entry.start,
                        end: entry.end,
                    },
                    &counter,
                );
                let header = Delayed::counted(
                    HeaderLoader {
                        source: Rc::clone(&source),
                        position,
                        entry,
                    },
                    &counter,
                );
                FolderMessage::new(position, flags, header, body)
            })
            .collect();

        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            messages,
            counter,
        })
    }

    /// Headers and bodies not yet read from disk.
    pub fn pending_reads(&self) -> usize {
        self.counter.remaining()
    }
}

impl Folder for MboxFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn message_at(&self, position: usize) -> Option<&FolderMessage> {
        self.messages.get(position)
    }
}

/// Message boundaries: a From_ line at the start of the file, or one carrying an asctime
/// date after a blank line (unescaped "From " in bodies rarely has one). Status and X-Status headers are picked up on the way for flags.
fn scan_entries(path: &Path) -> Result<Vec<Entry>, StoreError> {
    let f = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut r = BufReader::new(f);
    let mut entries: Vec<Entry> = Vec::new();
    let mut line = Vec::new();
    let mut pos: u64 = 0;
    let mut previous_blank = true;
    let mut in_header = false;

    loop {
        line.clear();
        let n = r
            .read_until(b'\n', &mut line)
            .map_err(|e| StoreError::io(path, e))?;
        if n == 0 {
            break;
        }
        let blank = line == b"\n" || line == b"\r\n";

        let received = if previous_blank && line.starts_with(b"From ") {
            parse_from_line_date(&String::from_utf8_lossy(&line))
        } else {
            None
        };
        if received.is_some() || (pos == 0 && line.starts_with(b"From ")) {
            if let Some(last) = entries.last_mut() {
                last.end = pos;
            }
            entries.push(Entry {
                start: pos + n as u64,
                end: pos + n as u64,
                received,
                flags: HashSet::new(),
            });
            in_header = true;
        } else if in_header {
            if blank {
                in_header = false;
            } else if let Some(last) = entries.last_mut() {
                status_flags(&line, &mut last.flags);
            }
        }

        previous_blank = blank;
        pos += n as u64;
    }
    if let Some(last) = entries.last_mut() {
        last.end = pos;
    }
    Ok(entries)
}

fn status_flags(line: &[u8], flags: &mut HashSet<Flag>) {
    let text = String::from_utf8_lossy(line);
    let Some((name, value)) = text.split_once(':') else {
        return;
    };
    let name = name.trim();
    if !name.eq_ignore_ascii_case("Status") && !name.eq_ignore_ascii_case("X-Status") {
        return;
    }
    for c in value.trim().chars() {
        match c {
            'R' => {
                flags.insert(Flag::Seen);
            }
            'A' => {
                flags.insert(Flag::Answered);
            }
            'F' => {
                flags.insert(Flag::Flagged);
            }
            'D' => {
                flags.insert(Flag::Deleted);
            }
            'T' => {
                flags.insert(Flag::Draft);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MBOX: &str = "From alice@example.com Mon Mar  2 08:00:00 2020\n\
Message-ID: <a@x>\n\
Subject: plans\n\
\n\
Shall we meet?\n\
\n\
From bob@example.com Tue Mar  3 08:00:00 2020\n\
Message-ID: <b@x>\n\
In-Reply-To: <a@x>\n\
Status: RO\n\
X-Status: D\n\
\n\
From the sound of it, yes.\n\
";

    fn write_mbox(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn finds_boundaries_and_flags() {
        let f = write_mbox(MBOX);
        let entries = scan_entries(f.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].end, entries[1].start - 46);
        assert!(entries[1].flags.contains(&Flag::Deleted));
        assert!(entries[1].flags.contains(&Flag::Seen));
        assert!(entries[0].flags.is_empty());
        assert_eq!(entries[0].received.map(|d| d.timestamp()), Some(1583136000));
    }

    #[test]
    fn from_inside_body_is_not_a_boundary() {
        let f = write_mbox(MBOX);
        let folder = MboxFolder::open(f.path()).unwrap();
        assert_eq!(folder.message_count(), 2);
        let body = folder.message_at(1).unwrap().body.realize().unwrap();
        assert_eq!(&body[..], b"From the sound of it, yes.\n");
    }

    #[test]
    fn headers_load_lazily_and_handle_closes() {
        let f = write_mbox(MBOX);
        let folder = MboxFolder::open(f.path()).unwrap();
        assert_eq!(folder.pending_reads(), 4);
        let m = folder.message_at(0).unwrap();
        assert_eq!(m.size(), Some(entry_len(&folder, 0)));
        assert_eq!(m.timestamp().map(|d| d.timestamp()), Some(1583136000));

        let (id, header) = m.thread_headers(folder.name()).unwrap();
        assert_eq!(id.as_str(), "a@x");
        assert_eq!(header.subject.as_deref(), Some("plans"));
        assert_eq!(folder.pending_reads(), 3);

        for pos in 0..2 {
            let m = folder.message_at(pos).unwrap();
            m.header.realize().unwrap();
            m.body.realize().unwrap();
        }
        assert_eq!(folder.pending_reads(), 0);
        assert!(folder.message_at(1).unwrap().is_deleted());
    }

    fn entry_len(folder: &MboxFolder, pos: usize) -> u64 {
        folder
            .message_at(pos)
            .and_then(|m| m.header.cheap_metadata().approximate_size)
            .unwrap_or(0)
    }

    #[test]
    fn truncated_file_reports_range() {
        let f = write_mbox(MBOX);
        let folder = MboxFolder::open(f.path()).unwrap();
        std::fs::write(f.path(), b"From x Mon Mar  2 08:00:00 2020\n").unwrap();
        let err = folder.message_at(1).unwrap().header.realize().unwrap_err();
        assert!(err.range.starts_with("bytes "));
        assert!(err.to_string().contains("#1"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MboxFolder::open(dir.path().join("nope")).err().unwrap();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
