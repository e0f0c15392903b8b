//! `[build]` section configuration.
//!
//! Contains the directories the `build` command reads from and writes to.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in toc.toml - page rewriting pipeline.
///
/// # Example
/// ```toml
/// [build]
/// input = "public"   # Rendered site
/// output = "dist"    # Rewritten site
/// minify = true      # Minify rewritten HTML
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Directory containing the rendered HTML pages.
    #[serde(default = "defaults::build::input")]
    #[educe(Default = defaults::build::input())]
    pub input: PathBuf,

    /// Directory receiving the rewritten site.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Minify rewritten HTML pages.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,
}

#[cfg(test)]
mod tests {
    use super::super::TocbarConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: TocbarConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.input, PathBuf::from("public"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(!config.build.minify);
        assert!(config.build.root.is_none());
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            input = "site"
            output = "out"
            minify = true
        "#;
        let config: TocbarConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.input, PathBuf::from("site"));
        assert_eq!(config.build.output, PathBuf::from("out"));
        assert!(config.build.minify);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [build]
            content = "content"
        "#;
        let result: Result<TocbarConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
