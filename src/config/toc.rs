//! `[toc]` section configuration.
//!
//! Controls which headings qualify and how their ids are produced.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// How the outline is populated from the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Slugify heading text for headings without an id (default).
    #[default]
    Slug,
    /// Trust ids already present on the page; skip headings without one.
    Anchored,
}

/// `[toc]` section in toc.toml - heading extraction.
///
/// # Example
/// ```toml
/// [toc]
/// min_headings = 3
/// levels = [2, 3]
/// ignore_classes = ["kg-poem-card"]
/// strategy = "anchored"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    /// Fewer qualifying headings than this and no TOC is built.
    #[serde(default = "defaults::toc::min_headings")]
    #[educe(Default = defaults::toc::min_headings())]
    pub min_headings: usize,

    /// Heading ranks that produce entries.
    #[serde(default = "defaults::toc::levels")]
    #[educe(Default = defaults::toc::levels())]
    pub levels: Vec<u8>,

    /// Class marking the article content region.
    #[serde(default = "defaults::toc::content_class")]
    #[educe(Default = defaults::toc::content_class())]
    pub content_class: String,

    /// Class on the content region that disables the TOC for the page.
    #[serde(default = "defaults::toc::disable_class")]
    #[educe(Default = defaults::toc::disable_class())]
    pub disable_class: String,

    /// Regions (or headings) carrying one of these classes are skipped.
    #[serde(default = "defaults::toc::ignore_classes")]
    #[educe(Default = defaults::toc::ignore_classes())]
    pub ignore_classes: Vec<String>,

    /// Outline population strategy.
    #[serde(default)]
    pub strategy: Strategy,

    /// Maximum length of a generated slug, in characters.
    #[serde(default = "defaults::toc::slug_max_len")]
    #[educe(Default = defaults::toc::slug_max_len())]
    pub slug_max_len: usize,
}

impl TocConfig {
    /// Whether a heading tag such as `h3` qualifies.
    pub fn level_of(&self, tag: &[u8]) -> Option<u8> {
        match tag {
            [b'h' | b'H', digit @ b'1'..=b'6'] => {
                let level = digit - b'0';
                self.levels.contains(&level).then_some(level)
            }
            _ => None,
        }
    }
}
