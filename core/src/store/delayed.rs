/*
 * delayed.rs
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

//! Delayed (lazily realized) header and body data.
//!
//! A [`Delayed`] is a cloneable handle over either a loader or the loaded value. The first
//! [`Delayed::realize`] call runs the loader and swaps the value in behind the handle, so
//! every clone observes the realized value without re-fetching anything. Folders hand out
//! one handle per message part and keep a [`DelayCounter`] of parts still on disk.

use crate::store::error::StoreError;
use chrono::{DateTime, FixedOffset};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Best-effort values known without a full load (index metadata, mbox From_ line, file name).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CheapMetadata {
    pub approximate_size: Option<u64>,
    pub approximate_timestamp: Option<DateTime<FixedOffset>>,
}

/// Realization failed. The handle stays delayed; calling `realize` again retries.
#[derive(Debug, Error)]
#[error("cannot load {id} ({range}): {source}")]
pub struct LoadFailure {
    /// What was being loaded (message locator).
    pub id: String,
    /// Store sub-range attempted, e.g. "bytes 120..480 of /var/mail/inbox".
    pub range: String,
    #[source]
    pub source: StoreError,
}

/// Backend-specific loader for one delayed value.
pub trait Loader<T> {
    fn load(&self) -> Result<T, StoreError>;

    /// Locator used in [`LoadFailure::id`].
    fn label(&self) -> String;

    /// Store sub-range the loader reads, used in [`LoadFailure::range`].
    fn describe(&self) -> String;

    fn cheap_metadata(&self) -> CheapMetadata {
        CheapMetadata::default()
    }
}

enum State<T> {
    Delayed(Box<dyn Loader<T>>),
    Realized { value: Rc<T>, metadata: CheapMetadata },
}

/// Stable handle to a value that is loaded on first forced access.
pub struct Delayed<T> {
    state: Rc<RefCell<State<T>>>,
    counter: Option<DelayCounter>,
}

impl<T> Clone for Delayed<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            counter: self.counter.clone(),
        }
    }
}

impl<T> fmt::Debug for Delayed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_realized() { "realized" } else { "delayed" };
        f.debug_struct("Delayed").field("state", &state).finish()
    }
}

impl<T> Delayed<T> {
    pub fn new(loader: impl Loader<T> + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Delayed(Box::new(loader)))),
            counter: None,
        }
    }

    /// Delayed value whose realization releases one unit of `counter`.
    pub fn counted(loader: impl Loader<T> + 'static, counter: &DelayCounter) -> Self {
        counter.acquire();
        Self {
            state: Rc::new(RefCell::new(State::Delayed(Box::new(loader)))),
            counter: Some(counter.clone()),
        }
    }

    /// Already-loaded value.
    pub fn realized(value: T, metadata: CheapMetadata) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Realized {
                value: Rc::new(value),
                metadata,
            })),
            counter: None,
        }
    }

    /// Never triggers loading.
    pub fn is_realized(&self) -> bool {
        matches!(&*self.state.borrow(), State::Realized { .. })
    }

    /// The value if already realized.
    pub fn peek(&self) -> Option<Rc<T>> {
        match &*self.state.borrow() {
            State::Realized { value, .. } => Some(Rc::clone(value)),
            State::Delayed(_) => None,
        }
    }

    pub fn cheap_metadata(&self) -> CheapMetadata {
        match &*self.state.borrow() {
            State::Realized { metadata, .. } => *metadata,
            State::Delayed(loader) => loader.cheap_metadata(),
        }
    }

    /// Load the value (once). Later calls, through this handle or any clone, return the
    /// same `Rc` without touching the store.
    pub fn realize(&self) -> Result<Rc<T>, LoadFailure> {
        let (value, metadata) = {
            let state = self.state.borrow();
            match &*state {
                State::Realized { value, .. } => return Ok(Rc::clone(value)),
                State::Delayed(loader) => {
                    let value = loader.load().map_err(|source| LoadFailure {
                        id: loader.label(),
                        range: loader.describe(),
                        source,
                    })?;
                    (Rc::new(value), loader.cheap_metadata())
                }
            }
        };
        *self.state.borrow_mut() = State::Realized {
            value: Rc::clone(&value),
            metadata,
        };
        if let Some(counter) = &self.counter {
            counter.release();
        }
        Ok(value)
    }
}

struct CounterInner {
    remaining: Cell<usize>,
    on_drained: RefCell<Option<Box<dyn FnMut()>>>,
}

/// Number of delayed parts a folder still has to read. When the last one is realized the
/// drained hook runs (folders use it to close their read handle).
#[derive(Clone)]
pub struct DelayCounter {
    inner: Rc<CounterInner>,
}

impl Default for DelayCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayCounter {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CounterInner {
                remaining: Cell::new(0),
                on_drained: RefCell::new(None),
            }),
        }
    }

    pub fn on_drained(&self, hook: impl FnMut() + 'static) {
        *self.inner.on_drained.borrow_mut() = Some(Box::new(hook));
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining.get()
    }

    fn acquire(&self) {
        self.inner.remaining.set(self.inner.remaining.get() + 1);
    }

    fn release(&self) {
        let left = self.inner.remaining.get().saturating_sub(1);
        self.inner.remaining.set(left);
        if left == 0 {
            if let Some(hook) = self.inner.on_drained.borrow_mut().as_mut() {
                hook();
            }
        }
    }
}
