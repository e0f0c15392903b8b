//! Heading id slugification.
//!
//! Converts heading text to URL-fragment-safe ids and keeps them unique
//! within one extraction pass.

use compact_str::{CompactString, format_compact};
use rustc_hash::FxHashSet;

/// Id used when nothing survives slugification.
pub const PLACEHOLDER: &str = "heading";

// ============================================================================
// Slugification
// ============================================================================

/// Convert heading text to a fragment id.
///
/// Lowercases, keeps ASCII word characters, CJK unified ideographs
/// (U+4E00..=U+9FA5), whitespace and hyphens, turns whitespace runs into
/// single hyphens and trims hyphens from both ends. The result holds at most
/// `max_len` characters and falls back to [`PLACEHOLDER`].
pub fn slugify(text: &str, max_len: usize) -> CompactString {
    let mut slug = CompactString::default();
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = !slug.is_empty();
        } else if is_kept(c) {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }

    let slug: CompactString = slug.chars().take(max_len).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        PLACEHOLDER.into()
    } else {
        slug.into()
    }
}

#[inline]
fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

// ============================================================================
// Uniqueness
// ============================================================================

/// Ids in use during one extraction pass.
#[derive(Debug, Default)]
pub struct IdRegistry {
    used: FxHashSet<CompactString>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id the page already carries. Existing ids are never renamed.
    pub fn reserve(&mut self, id: &str) {
        self.used.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Claim `base`, or `base-1`, `base-2`, ... if taken.
    pub fn claim(&mut self, base: &str) -> CompactString {
        let mut id = CompactString::from(base);
        let mut counter = 1usize;
        while self.used.contains(&id) {
            id = format_compact!("{base}-{counter}");
            counter += 1;
        }
        self.used.insert(id.clone());
        id
    }
}
