//! Heading extraction.
//!
//! Turns a [`PageScan`] into an [`Outline`] through a pluggable
//! [`OutlineStrategy`]. The rest of the component never looks at which
//! strategy produced the entries.

use crate::config::{LabelsConfig, Strategy, TocConfig, TocbarConfig};
use crate::toc::entry::{HeadingEntry, Outline};
use crate::toc::scan::{ContentState, PageScan, ScanError, scan_page};
use crate::toc::slug::{IdRegistry, slugify};
use compact_str::CompactString;
use rustc_hash::FxHashMap;

/// Ids to write onto heading elements, keyed by heading ordinal.
pub type IdAssignments = FxHashMap<usize, CompactString>;

/// Populates outline entries from scanned headings.
pub trait OutlineStrategy: Sync {
    fn entries(&self, scan: &PageScan, config: &TocConfig) -> (Vec<HeadingEntry>, IdAssignments);
}

/// Hand-rolled extraction: slugify the text of headings lacking an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugStrategy;

impl OutlineStrategy for SlugStrategy {
    fn entries(&self, scan: &PageScan, config: &TocConfig) -> (Vec<HeadingEntry>, IdAssignments) {
        let mut registry = IdRegistry::new();
        for id in &scan.existing_ids {
            registry.reserve(id);
        }

        let mut assigned = IdAssignments::default();
        let entries = scan
            .headings
            .iter()
            .filter_map(|heading| {
                let text = normalize_text(&heading.text);
                if text.is_empty() {
                    return None;
                }
                let id = match &heading.id {
                    Some(id) => CompactString::from(id.as_str()),
                    None => {
                        let id = registry.claim(&slugify(&text, config.slug_max_len));
                        assigned.insert(heading.ordinal, id.clone());
                        id
                    }
                };
                Some(HeadingEntry {
                    id,
                    text,
                    level: heading.level,
                })
            })
            .collect();

        (entries, assigned)
    }
}

/// Delegated extraction: the page was anchored upstream, trust its ids.
///
/// Headings without an id are left out and nothing is written back.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredStrategy;

impl OutlineStrategy for AnchoredStrategy {
    fn entries(&self, scan: &PageScan, _config: &TocConfig) -> (Vec<HeadingEntry>, IdAssignments) {
        let entries = scan
            .headings
            .iter()
            .filter_map(|heading| {
                let id = heading.id.as_deref()?;
                let text = normalize_text(&heading.text);
                (!text.is_empty()).then(|| HeadingEntry {
                    id: id.into(),
                    text,
                    level: heading.level,
                })
            })
            .collect();

        (entries, IdAssignments::default())
    }
}

/// Strategy selected by `[toc.strategy]`.
pub fn strategy_for(strategy: Strategy) -> &'static dyn OutlineStrategy {
    match strategy {
        Strategy::Slug => &SlugStrategy,
        Strategy::Anchored => &AnchoredStrategy,
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Outline of a page plus what the page rewrite needs.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub outline: Outline,
    pub assigned: IdAssignments,
    pub labels: LabelsConfig,
}

/// Extract the outline of a rendered page.
///
/// `Ok(None)` means the feature does not apply: no content region, an
/// opted-out region, or fewer than `min_headings` entries.
pub fn extract(html: &str, config: &TocbarConfig) -> Result<Option<Extraction>, ScanError> {
    let scan = scan_page(html, &config.toc, &config.labels)?;
    Ok(extract_with(scan, &config.toc, strategy_for(config.toc.strategy)))
}

/// Extract from an existing scan with an explicit strategy.
pub fn extract_with(
    scan: PageScan,
    config: &TocConfig,
    strategy: &dyn OutlineStrategy,
) -> Option<Extraction> {
    if scan.content != ContentState::Present || scan.headings.len() < config.min_headings {
        return None;
    }

    let (entries, assigned) = strategy.entries(&scan, config);
    let outline = Outline::new(entries, config.min_headings)?;
    Some(Extraction {
        outline,
        assigned,
        labels: scan.labels,
    })
}

/// Trim and collapse internal whitespace runs to single spaces.
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
