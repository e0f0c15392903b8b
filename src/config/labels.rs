//! `[labels]` section configuration.
//!
//! Fallback accessibility strings. Pages override them through
//! `data-i18n-*` attributes on `<body>`.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[labels]` section in toc.toml.
#[derive(Debug, Clone, PartialEq, Eq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct LabelsConfig {
    /// `aria-label` of the sidebar and drawer.
    #[serde(default = "defaults::labels::toc_label")]
    #[educe(Default = defaults::labels::toc_label())]
    pub toc_label: String,

    /// Visible title above both lists.
    #[serde(default = "defaults::labels::on_this_page")]
    #[educe(Default = defaults::labels::on_this_page())]
    pub on_this_page: String,

    /// `aria-label` of the floating trigger.
    #[serde(default = "defaults::labels::open_toc")]
    #[educe(Default = defaults::labels::open_toc())]
    pub open_toc: String,

    /// `aria-label` of the drawer close button.
    #[serde(default = "defaults::labels::close_toc")]
    #[educe(Default = defaults::labels::close_toc())]
    pub close_toc: String,
}

impl LabelsConfig {
    /// Override a label from a `data-i18n-<key>` attribute.
    ///
    /// Returns `false` for unknown keys. Empty values are ignored.
    pub fn apply_i18n(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "toc-label" => &mut self.toc_label,
            "on-this-page" => &mut self.on_this_page,
            "open-toc" => &mut self.open_toc,
            "close-toc" => &mut self.close_toc,
            _ => return false,
        };
        if !value.is_empty() {
            value.clone_into(slot);
        }
        true
    }
}
