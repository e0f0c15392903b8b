//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn input() -> PathBuf {
        "public".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }
}

// ============================================================================
// [toc] Section Defaults
// ============================================================================

pub mod toc {
    pub fn min_headings() -> usize {
        2
    }

    pub fn levels() -> Vec<u8> {
        vec![2, 3, 4]
    }

    pub fn content_class() -> String {
        "post-content".into()
    }

    pub fn disable_class() -> String {
        "no-toc".into()
    }

    pub fn ignore_classes() -> Vec<String> {
        vec!["kg-poem-card".into(), "js-toc-ignore".into()]
    }

    pub fn slug_max_len() -> usize {
        50
    }
}

// ============================================================================
// [scroll] Section Defaults
// ============================================================================

pub mod scroll {
    pub fn clearance() -> f64 {
        100.0
    }

    pub fn lead_in() -> f64 {
        100.0
    }

    pub fn trail_out() -> f64 {
        100.0
    }

    pub fn throttle_ms() -> u64 {
        100
    }
}

// ============================================================================
// [drawer] Section Defaults
// ============================================================================

pub mod drawer {
    pub fn settle_ms() -> u64 {
        250
    }

    pub fn swipe_threshold() -> f64 {
        100.0
    }

    pub fn ring_radius() -> f64 {
        20.0
    }
}

// ============================================================================
// [labels] Section Defaults
// ============================================================================

pub mod labels {
    pub fn toc_label() -> String {
        "Table of Contents".into()
    }

    pub fn on_this_page() -> String {
        "On this page".into()
    }

    pub fn open_toc() -> String {
        "Open table of contents".into()
    }

    pub fn close_toc() -> String {
        "Close table of contents".into()
    }
}
