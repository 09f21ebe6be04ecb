//! Ordering policy: exactly one strategy per batch.
//!
//! The mode is selected from the kinds already on the entries (a pure
//! scan), then applied as a single sort. Directory mode wins over
//! video-host mode when a batch mixes both, since only one final order is
//! produced.

use std::fmt;

use crate::link::{Batch, LinkKind};

/// The mutually exclusive ordering strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    /// At least one directory link (and recursion enabled):
    /// lexicographic by resolved name.
    Directory,
    /// No directory link but at least one video-host link:
    /// ascending by publish date.
    VideoHost,
    /// Neither: arrival order reversed, most recent first.
    Arrival,
}

impl OrderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderMode::Directory => "directory",
            OrderMode::VideoHost => "video-host",
            OrderMode::Arrival => "arrival-reversed",
        }
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick the one strategy for this batch, per the decision table.
pub fn select_mode(batch: &Batch, recurse_directories: bool) -> OrderMode {
    if recurse_directories && batch.contains_kind(LinkKind::Directory) {
        OrderMode::Directory
    } else if batch.contains_kind(LinkKind::VideoHost) {
        OrderMode::VideoHost
    } else {
        OrderMode::Arrival
    }
}

/// Apply the selected strategy and produce the final playlist.
///
/// Every entry of the batch appears exactly once in the output, whatever
/// its enrichment outcome. Chronological order is ascending by publish
/// date with ties broken by arrival order; undated entries sort after all
/// dated ones, again by arrival order. Duplicate dates are handled by the
/// stable sort without losing entries.
pub fn apply(mode: OrderMode, batch: Batch) -> Vec<String> {
    let mut entries = batch.entries;
    match mode {
        OrderMode::Directory => {
            entries.sort_by(|a, b| a.text.cmp(&b.text));
        }
        OrderMode::VideoHost => {
            // `None` sorts after `Some` via the is_none key.
            entries.sort_by_key(|e| (e.published.is_none(), e.published, e.arrival));
        }
        OrderMode::Arrival => {
            entries.reverse();
        }
    }
    entries.into_iter().map(|e| e.text).collect()
}
