//! tocbar - responsive table of contents for rendered blog pages.

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, path::Path};
use tocbar::{
    cli::{Cli, Commands},
    config::TocbarConfig,
    inject::inject_site,
    log,
    toc::extract,
    trace::{TraceScript, run_trace},
};

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static TocbarConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Build { .. } => inject_site(config).map(|_| ()),
        Commands::Outline { file } => print_outline(file, config),
        Commands::Trace { file, layout } => print_trace(file, layout, config),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file falls back to defaults.
fn load_config(cli: &'static Cli) -> Result<TocbarConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        TocbarConfig::from_path(&config_path)?
    } else {
        TocbarConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

fn read_page(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Print the outline of one page as JSON.
fn print_outline(file: &Path, config: &TocbarConfig) -> Result<()> {
    match extract(&read_page(file)?, config)? {
        Some(extraction) => println!("{}", serde_json::to_string_pretty(&extraction.outline)?),
        None => log!("toc"; "{}: not applicable", file.display()),
    }
    Ok(())
}

/// Replay a scroll script, one JSON record per line.
fn print_trace(file: &Path, layout: &Path, config: &TocbarConfig) -> Result<()> {
    let script = fs::read_to_string(layout)
        .with_context(|| format!("Failed to read {}", layout.display()))?;
    let script: TraceScript = serde_json::from_str(&script)
        .with_context(|| format!("Invalid trace script: {}", layout.display()))?;

    let Some(records) = run_trace(&read_page(file)?, config, script)? else {
        log!("toc"; "{}: not applicable", file.display());
        return Ok(());
    };
    for record in records {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
