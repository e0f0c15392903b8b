//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Responsive table of contents for rendered blog pages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: toc.toml)
    #[arg(short = 'C', long, default_value = "toc.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rewrite every page of a rendered site, injecting the sidebar and drawer
    Build {
        /// Rendered site directory (relative to project root)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (relative to project root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minify the rewritten html
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,
    },

    /// Print the outline of a page as JSON
    Outline {
        /// Rendered HTML page
        file: PathBuf,
    },

    /// Replay a scroll script against a page and print the tracker state per step
    Trace {
        /// Rendered HTML page
        file: PathBuf,

        /// JSON layout with heading offsets, viewport and scroll script
        #[arg(short, long)]
        layout: PathBuf,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_outline(&self) -> bool {
        matches!(self.command, Commands::Outline { .. })
    }
    pub const fn is_trace(&self) -> bool {
        matches!(self.command, Commands::Trace { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_with_overrides() {
        let cli = Cli::parse_from(["tocbar", "build", "-i", "site", "--minify"]);
        match cli.command {
            Commands::Build {
                input,
                output,
                minify,
            } => {
                assert_eq!(input, Some(PathBuf::from("site")));
                assert_eq!(output, None);
                assert_eq!(minify, Some(true));
            }
            _ => panic!("expected build"),
        }
        assert_eq!(cli.config, PathBuf::from("toc.toml"));
    }

    #[test]
    fn test_parse_trace() {
        let cli = Cli::parse_from(["tocbar", "-C", "theme.toml", "trace", "post.html", "-l", "layout.json"]);
        assert!(cli.is_trace());
        assert_eq!(cli.config, PathBuf::from("theme.toml"));
    }
}
