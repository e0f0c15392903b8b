//! `[drawer]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[drawer]` section in toc.toml - mobile drawer behaviour.
///
/// # Example
/// ```toml
/// [drawer]
/// settle_ms = 250
/// swipe_threshold = 100.0
/// progress_ring = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct DrawerConfig {
    /// Delay between opening and centering the active entry, in ms.
    #[serde(default = "defaults::drawer::settle_ms")]
    #[educe(Default = defaults::drawer::settle_ms())]
    pub settle_ms: u64,

    /// Downward drag on the handle that dismisses the drawer, in px.
    #[serde(default = "defaults::drawer::swipe_threshold")]
    #[educe(Default = defaults::drawer::swipe_threshold())]
    pub swipe_threshold: f64,

    /// Decorate the trigger with a reading-progress ring.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub progress_ring: bool,

    /// Progress ring radius in SVG user units.
    #[serde(default = "defaults::drawer::ring_radius")]
    #[educe(Default = defaults::drawer::ring_radius())]
    pub ring_radius: f64,
}

impl DrawerConfig {
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Stroke length of the progress ring.
    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.ring_radius
    }
}
