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

//! Maildir folder: one file per message under cur/ and new/.
//!
//! Sequence order is delivery order (filename timestamp, then unique part). Flags and the
//! approximate size come from the filename, so opening a folder reads no message files.

mod filename;

pub use filename::MaildirFilename;

use crate::mime::{header_block_len, parse_thread_headers, ThreadHeaders};
use crate::store::{CheapMetadata, Delayed, Folder, FolderMessage, Loader, StoreError};
use bytes::Bytes;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

const HEADER_CHUNK: usize = 4096;

struct HeaderLoader {
    path: PathBuf,
    metadata: CheapMetadata,
}

impl Loader<ThreadHeaders> for HeaderLoader {
    fn load(&self) -> Result<ThreadHeaders, StoreError> {
        let mut f = File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let mut raw = Vec::new();
        let mut chunk = vec![0u8; HEADER_CHUNK];
        loop {
            let n = f.read(&mut chunk).map_err(|e| StoreError::io(&self.path, e))?;
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if let Some(len) = header_block_len(&raw) {
                raw.truncate(len);
                break;
            }
        }
        Ok(parse_thread_headers(&raw))
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn describe(&self) -> String {
        format!("header of {}", self.path.display())
    }

    fn cheap_metadata(&self) -> CheapMetadata {
        self.metadata
    }
}

struct BodyLoader {
    path: PathBuf,
}

impl Loader<Bytes> for BodyLoader {
    fn load(&self) -> Result<Bytes, StoreError> {
        let raw = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let body_start = header_block_len(&raw).unwrap_or(raw.len());
        Ok(Bytes::from(raw).slice(body_start..))
    }

    fn label(&self) -> String {
        format!("{} body", self.path.display())
    }

    fn describe(&self) -> String {
        format!("body of {}", self.path.display())
    }
}

/// Folder over a Maildir directory.
pub struct MaildirFolder {
    name: String,
    messages: Vec<FolderMessage>,
}

impl MaildirFolder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.join("cur").is_dir() && !path.join("new").is_dir() {
            return Err(StoreError::NotFound(format!("maildir {}", path.display())));
        }
        let entries = scan_messages(path)?;
        log::debug!("{}: {} messages", path.display(), entries.len());

        let messages = entries
            .into_iter()
            .enumerate()
            .map(|(position, (file, parsed))| {
                let metadata = CheapMetadata {
                    approximate_size: parsed
                        .size
                        .or_else(|| fs::metadata(&file).map(|m| m.len()).ok()),
                    approximate_timestamp: parsed.delivered(),
                };
                let header = Delayed::new(HeaderLoader {
                    path: file.clone(),
                    metadata,
                });
                let body = Delayed::new(BodyLoader { path: file });
                FolderMessage::new(position, parsed.flags, header, body)
            })
            .collect();

        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            messages,
        })
    }
}

impl Folder for MaildirFolder {
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

/// Message files in cur/ and new/, in delivery order. Dot files and names that do not
/// parse as Maildir names are skipped.
fn scan_messages(path: &Path) -> Result<Vec<(PathBuf, MaildirFilename)>, StoreError> {
    let mut entries = Vec::new();
    for sub in ["cur", "new"] {
        let dir = path.join(sub);
        if !dir.is_dir() {
            continue;
        }
        let read_dir = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        for e in read_dir {
            let e = e.map_err(|e| StoreError::io(&dir, e))?;
            let name = e.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let file = e.path();
            if !file.is_file() {
                continue;
            }
            match MaildirFilename::parse(&name) {
                Some(parsed) => entries.push((file, parsed)),
                None => log::debug!("skipping {}", file.display()),
            }
        }
    }
    entries.sort_by(|a, b| {
        (a.1.timestamp, &a.1.unique_part).cmp(&(b.1.timestamp, &b.1.unique_part))
    });
    Ok(entries)
}
