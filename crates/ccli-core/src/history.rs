//! Bounded history ring with a scratch slot for the in-progress line.
//!
//! Logical indices are monotonic: the `i`th line ever added lives in slot
//! `i % max`, so once more than `max` lines have been added the oldest
//! ones fall out of the accessible window. `current` tracks which entry
//! the user is viewing; `current == size` means "the line being
//! composed", whose contents are parked in the scratch slot while the
//! user wanders through history.

use crate::line::LineBuffer;

/// Default number of retained history entries.
pub const DEFAULT_HISTORY_MAX: usize = 256;

/// Ring of past submissions plus navigation state.
#[derive(Debug, Clone)]
pub struct History {
    /// Backing storage; slot for logical index `i` is `i % max`.
    entries: Vec<String>,
    /// Total lines ever added, monotonic.
    size: usize,
    /// Entry being viewed, in `[oldest_accessible, size]`.
    current: usize,
    /// The composed-but-unsubmitted line, saved while navigating.
    scratch: Option<String>,
    max: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max(DEFAULT_HISTORY_MAX)
    }

    /// Create a ring retaining at most `max` entries (`max >= 1`).
    pub fn with_max(max: usize) -> Self {
        assert!(max >= 1, "history must retain at least one entry");
        Self {
            entries: Vec::new(),
            size: 0,
            current: 0,
            scratch: None,
            max,
        }
    }

    /// Total number of lines ever added.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Logical index currently being viewed (`size` = fresh line).
    pub fn current(&self) -> usize {
        self.current
    }

    /// Oldest logical index still readable.
    pub fn oldest(&self) -> usize {
        self.size.saturating_sub(self.max)
    }

    fn slot(&self, logical: usize) -> usize {
        logical % self.max
    }

    fn entry(&self, logical: usize) -> &str {
        &self.entries[self.slot(logical)]
    }

    fn store(&mut self, logical: usize, text: String) {
        let slot = self.slot(logical);
        self.entries[slot] = text;
    }

    /// Append a submitted line, evicting the oldest entry once the ring
    /// is full, and snap the view back to the fresh line.
    pub fn add(&mut self, line: &str) {
        if self.entries.len() < self.max {
            self.entries.push(line.to_string());
        } else {
            let slot = self.slot(self.size);
            self.entries[slot] = line.to_string();
        }
        self.size += 1;
        self.current = self.size;
        self.scratch = None;
    }

    /// The line submitted `past` steps ago (1 = most recent). `None`
    /// outside the accessible window.
    pub fn at(&self, past: usize) -> Option<&str> {
        if past == 0 || past > self.size || past > self.max {
            return None;
        }
        Some(self.entry(self.size - past))
    }

    /// Iterate the accessible window, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        (self.oldest()..self.size).map(|i| self.entry(i))
    }

    /// Move `n` entries back, replacing `line` with the recalled entry.
    ///
    /// The displayed contents are saved first: into the scratch slot when
    /// leaving the fresh line, or back into the ring slot when the user
    /// had been editing a recalled entry. Returns whether `line` changed.
    pub fn up(&mut self, line: &mut LineBuffer, n: usize) -> bool {
        let old = self.current;
        self.current = self.current.saturating_sub(n);
        if self.size > self.max && self.current <= self.size - self.max {
            // The slot below this is about to be overwritten by the
            // submission in flight.
            self.current = self.size - self.max + 1;
        }
        if old == self.current {
            return false;
        }

        let shown = line.text().into_owned();
        if old >= self.size {
            self.scratch = Some(shown);
        } else {
            self.store(old, shown);
        }

        let target = self.entry(self.current).to_string();
        line.replace(&target);
        true
    }

    /// Move `n` entries forward. Landing back on the fresh line restores
    /// the scratch contents. Returns whether `line` changed.
    pub fn down(&mut self, line: &mut LineBuffer, n: usize) -> bool {
        let old = self.current;
        self.current = (self.current + n).min(self.size);

        if self.current == self.size {
            if old == self.current {
                return false;
            }
            if let Some(scratch) = self.scratch.take() {
                line.replace(&scratch);
                return true;
            }
            return false;
        }

        let shown = line.text().into_owned();
        self.store(old, shown);

        let target = self.entry(self.current).to_string();
        line.replace(&target);
        true
    }

    /// Walk from just below `from` down to the oldest accessible entry,
    /// returning the first whose text contains `needle`. Entries equal to
    /// `skip` (the previous match) are passed over so repeated searches
    /// advance instead of re-finding the same line.
    pub fn search_backwards(&self, needle: &str, from: usize, skip: Option<&str>) -> Option<usize> {
        let oldest = self.oldest();
        let mut i = from.min(self.size);
        while i > oldest {
            i -= 1;
            let entry = self.entry(i);
            if skip == Some(entry) {
                continue;
            }
            if entry.contains(needle) {
                return Some(i);
            }
        }
        None
    }

    /// Read an entry by logical index. `None` outside the window.
    pub fn get(&self, logical: usize) -> Option<&str> {
        if logical >= self.size || logical < self.oldest() {
            return None;
        }
        Some(self.entry(logical))
    }

    /// Point the view at `logical` without touching any buffer. Used by
    /// reverse search when it lands on a match.
    pub fn set_current(&mut self, logical: usize) {
        self.current = logical.min(self.size);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
