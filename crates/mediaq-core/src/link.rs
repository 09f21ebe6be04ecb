use std::fmt;

use chrono::NaiveDate;

/// Classification of an incoming link, decided purely from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Ends in a path separator — a listing to recurse into.
    Directory,
    /// Matches the known video-hosting domain — eligible for
    /// chronological enrichment.
    VideoHost,
    /// Anything else — passed through untouched.
    Plain,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Directory => "directory",
            LinkKind::VideoHost => "video-host",
            LinkKind::Plain => "plain",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain marker used to recognise video-host links.
const VIDEO_HOST_MARKER: &str = "youtube.com";

/// Classify a link by a cheap syntactic test.
///
/// Pure function: the same text always yields the same kind. A trailing
/// separator wins over the video-host marker, mirroring the precedence of
/// the ordering policy (directory mode beats video-host mode).
pub fn classify(text: &str) -> LinkKind {
    if text.ends_with('/') {
        LinkKind::Directory
    } else if text.contains(VIDEO_HOST_MARKER) {
        LinkKind::VideoHost
    } else {
        LinkKind::Plain
    }
}

/// One link of a closed batch, carrying whatever enrichment resolved for it.
///
/// `text` starts as the raw arrival and is replaced in place when a
/// directory lookup resolves a concrete media URI. `published` is filled by
/// a video-host lookup; it stays `None` for plain links and for lookups
/// that failed. `arrival` is the position in the original arrival order and
/// is the tie-breaker for every sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    pub kind: LinkKind,
    pub published: Option<NaiveDate>,
    pub arrival: usize,
}

impl Entry {
    pub fn new(text: impl Into<String>, arrival: usize) -> Self {
        let text = text.into();
        let kind = classify(&text);
        Self {
            text,
            kind,
            published: None,
            arrival,
        }
    }
}

/// A closed batch: every pending link classified, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub entries: Vec<Entry>,
}

impl Batch {
    /// Build a batch from raw link texts in arrival order.
    pub fn from_links(links: Vec<String>) -> Self {
        let entries = links
            .into_iter()
            .enumerate()
            .map(|(i, text)| Entry::new(text, i))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry has the given kind.
    pub fn contains_kind(&self, kind: LinkKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }
}
