//! `[scroll]` section configuration.
//!
//! Geometry margins and throttling for the scroll tracker.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[scroll]` section in toc.toml - scroll-spy tuning.
///
/// # Example
/// ```toml
/// [scroll]
/// clearance = 80.0     # Fixed header height
/// lead_in = 100.0      # Show the TOC this far before the article
/// trail_out = 100.0    # Keep it this far past the article end
/// throttle_ms = 100
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Header clearance subtracted from heading offsets, in px.
    #[serde(default = "defaults::scroll::clearance")]
    #[educe(Default = defaults::scroll::clearance())]
    pub clearance: f64,

    /// Margin before the article top at which the TOC appears, in px.
    #[serde(default = "defaults::scroll::lead_in")]
    #[educe(Default = defaults::scroll::lead_in())]
    pub lead_in: f64,

    /// Margin past the article bottom at which the TOC disappears, in px.
    #[serde(default = "defaults::scroll::trail_out")]
    #[educe(Default = defaults::scroll::trail_out())]
    pub trail_out: f64,

    /// Minimum interval between two recomputations, in ms.
    #[serde(default = "defaults::scroll::throttle_ms")]
    #[educe(Default = defaults::scroll::throttle_ms())]
    pub throttle_ms: u64,
}

impl ScrollConfig {
    pub const fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}
