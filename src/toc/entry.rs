//! Outline data model.

use compact_str::{CompactString, format_compact};
use serde::Serialize;
use std::fmt;

/// Heading rank (`h1` = 1 ... `h6` = 6).
///
/// Only used for indentation in the presentations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const fn new(level: u8) -> Option<Self> {
        match level {
            1..=6 => Some(Self(level)),
            _ => None,
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One qualifying heading of the article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Unique, fragment-safe anchor id.
    pub id: CompactString,
    /// Trimmed visible text.
    pub text: String,
    pub level: HeadingLevel,
}

impl HeadingEntry {
    /// Link target, `#<id>`.
    pub fn href(&self) -> CompactString {
        format_compact!("#{}", self.id)
    }
}

/// Ordered entries of one article render.
///
/// Only constructed when the entry count reaches the activation threshold,
/// so every `Outline` in circulation is worth presenting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Outline {
    entries: Vec<HeadingEntry>,
}

impl Outline {
    /// Wrap `entries`, or `None` when fewer than `min_headings` remain.
    pub fn new(entries: Vec<HeadingEntry>, min_headings: usize) -> Option<Self> {
        (entries.len() >= min_headings.max(1)).then_some(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HeadingEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeadingEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a HeadingEntry;
    type IntoIter = std::slice::Iter<'a, HeadingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) fn entry(id: &str, level: u8) -> HeadingEntry {
    HeadingEntry {
        id: id.into(),
        text: id.replace('-', " "),
        level: HeadingLevel::new(level).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_bounds() {
        assert!(HeadingLevel::new(0).is_none());
        assert!(HeadingLevel::new(7).is_none());
        assert_eq!(HeadingLevel::new(3).map(HeadingLevel::get), Some(3));
    }

    #[test]
    fn test_outline_threshold() {
        assert!(Outline::new(vec![entry("intro", 2)], 2).is_none());
        assert!(Outline::new(vec![entry("intro", 2), entry("usage", 3)], 2).is_some());
    }

    #[test]
    fn test_outline_never_empty() {
        assert!(Outline::new(vec![], 0).is_none());
    }

    #[test]
    fn test_href() {
        assert_eq!(entry("getting-started", 2).href(), "#getting-started");
    }
}
