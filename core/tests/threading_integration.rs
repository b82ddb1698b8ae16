/*
 * threading_integration.rs
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


use std::fs;
use std::io::Write;

use tagliacarte_threads::localstorage::{MaildirFolder, MboxFolder};
use tagliacarte_threads::store::Folder;
use tagliacarte_threads::{MessageId, ThreadConfig, ThreadIndex, Timespan, Window};

fn id(s: &str) -> MessageId {
    MessageId::new(s)
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Build an mbox with one message per (headers, body) pair, a day apart from 1 March 2020.
fn mbox(messages: &[(&str, &str)]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    for (i, (headers, body)) in messages.iter().enumerate() {
        let weekday = WEEKDAYS[i % 7];
        writeln!(f, "From sender@example.com {} Mar {:2} 08:00:00 2020", weekday, i + 1).unwrap();
        writeln!(f, "Date: {} Mar 2020 08:00:00 +0000", i + 1).unwrap();
        writeln!(f, "{}", headers).unwrap();
        writeln!(f).unwrap();
        writeln!(f, "{}", body).unwrap();
        writeln!(f).unwrap();
    }
    f.flush().unwrap();
    f
}

fn conversation() -> tempfile::NamedTempFile {
    mbox(&[
        ("Message-ID: <a@x>\nSubject: release", "Shipping friday."),
        ("Message-ID: <noise1@x>\nSubject: lunch", "Anyone?"),
        ("Message-ID: <b@x>\nIn-Reply-To: <a@x>\nSubject: Re: release", "Sounds good."),
        ("Message-ID: <noise2@x>\nSubject: build", "Broken again."),
        (
            "Message-ID: <c@x>\nIn-Reply-To: <b@x>\nReferences: <a@x> <b@x>\nSubject: Re: release",
            "Agreed.",
        ),
        ("Message-ID: <d@x>\nReferences: <z@x>\nSubject: orphan", "Lost parent."),
    ])
}

#[test]
fn completes_thread_from_mbox_without_reading_unrelated_mail() {
    let f = conversation();
    let folder = MboxFolder::open(f.path()).unwrap();
    let config = ThreadConfig::default()
        .with_window(Window::Entries(10))
        .with_timespan(Timespan::Unbounded);
    let mut index = ThreadIndex::new(folder, config);

    let root = index.complete_thread(4).unwrap();
    assert_eq!(root.message_id(), &id("a@x"));
    assert!(!root.is_dummy());
    assert_eq!(index.thread_ids(&id("a@x")), vec![id("a@x"), id("b@x"), id("c@x")]);
    assert_eq!(index.thread_messages(&id("a@x")), vec![0, 2, 4]);

    // The reply header wins over References for c.
    let c = index.lookup(&id("c@x")).unwrap();
    assert_eq!(c.parent_id(), Some(&id("b@x")));

    // The orphan was never needed.
    assert!(!index.folder().is_header_realized(5));
    assert!(index.lookup(&id("d@x")).is_none());
}

#[test]
fn unknown_reference_becomes_dummy_root() {
    let f = conversation();
    let folder = MboxFolder::open(f.path()).unwrap();
    let mut index = ThreadIndex::new(folder, ThreadConfig::default());

    let root = index.complete_thread(5).unwrap();
    assert_eq!(root.message_id(), &id("z@x"));
    assert!(root.is_dummy());
    assert_eq!(root.child_ids(), &[id("d@x")]);
    assert!(index
        .known_roots()
        .iter()
        .any(|n| n.message_id() == &id("z@x")));
    assert_eq!(index.thread_to_string(&id("z@x")), "* <z@x>\n  orphan\n");
}

#[test]
fn timespan_limits_how_far_back_mbox_is_read() {
    let f = conversation();
    let folder = MboxFolder::open(f.path()).unwrap();
    let config = ThreadConfig::default()
        .with_window(Window::Unbounded)
        .with_timespan("1 day".parse().unwrap());
    let mut index = ThreadIndex::new(folder, config);

    let root = index.complete_thread(4).unwrap();
    // b is the first entry older than a day; the scan stops there
    assert_eq!(root.message_id(), &id("a@x"));
    assert!(root.is_dummy());
    assert!(index.folder().is_header_realized(2));
    assert!(!index.folder().is_header_realized(1));
    assert!(!index.folder().is_header_realized(0));
}

#[test]
fn thread_all_over_mbox() {
    let f = conversation();
    let folder = MboxFolder::open(f.path()).unwrap();
    let mut index = ThreadIndex::new(folder, ThreadConfig::default());
    let roots: Vec<MessageId> = index
        .thread_all()
        .into_iter()
        .map(|n| n.message_id().clone())
        .collect();
    assert_eq!(roots, vec![id("a@x"), id("noise1@x"), id("noise2@x"), id("z@x")]);
    assert_eq!(index.message_count(&id("a@x")), 3);
    assert!(index.is_fully_scanned());
    assert_eq!(index.folder().pending_reads(), 6);
}

#[test]
fn completes_thread_in_maildir() {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["cur", "new", "tmp"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
    }
    let files = [
        ("cur", "1583020800.M1.host:2,S", "Message-ID: <a@x>\nSubject: hi\n\nhello\n"),
        ("cur", "1583107200.M2.host:2,ST", "Message-ID: <gone@x>\nIn-Reply-To: <a@x>\n\n"),
        ("new", "1583193600.M3.host", "Message-ID: <b@x>\nReferences: <a@x>\n\nhey\n"),
    ];
    for (sub, name, content) in files {
        fs::write(dir.path().join(sub).join(name), content).unwrap();
    }

    let folder = MaildirFolder::open(dir.path()).unwrap();
    let mut index = ThreadIndex::new(folder, ThreadConfig::default());
    let root = index.complete_thread(2).unwrap();
    assert_eq!(root.message_id(), &id("a@x"));
    assert_eq!(root.child_ids(), &[id("b@x")]);
    // trashed message in between is skipped
    assert!(!index.folder().is_header_realized(1));
}
