//! Page rewriting.
//!
//! Applies the static half of the component to rendered pages:
//!
//! ```text
//! inject_site()
//!     │
//!     ├── collect_files()        walkdir over [build.input], skipping [build.output]
//!     │
//!     └── par_iter ──┬── *.html ──► inject_page() ──► minify() ──► write
//!                    └── other  ──► copy
//! ```
//!
//! `inject_page` walks the page a second time with the same content cursor
//! the scanner used, so generated ids land on the headings they were
//! derived from.

use crate::config::{TocConfig, TocbarConfig};
use crate::log;
use crate::toc::dom::XmlWriter;
use crate::toc::extract::{IdAssignments, extract};
use crate::toc::scan::{ContentCursor, HtmlTokens, Token, Visit, attr_value, has_class};
use crate::toc::view::{self, DrawerView, SidebarView};
use anyhow::{Context, Result, anyhow};
use quick_xml::{
    Writer,
    events::{BytesStart, BytesText, Event, attributes::Attribute},
};
use rayon::prelude::*;
use std::{
    borrow::Cow,
    ffi::OsStr,
    fs,
    io::Cursor,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};
use walkdir::WalkDir;

/// A page after injection.
#[derive(Debug, Clone)]
pub struct InjectedPage {
    pub html: String,
    /// Number of outline entries rendered into the page.
    pub entries: usize,
}

// ============================================================================
// Single Page
// ============================================================================

/// Inject the sidebar and drawer into one page.
///
/// `Ok(None)` when the page has no applicable outline; the caller keeps the
/// page unchanged.
pub fn inject_page(html: &str, config: &TocbarConfig) -> Result<Option<InjectedPage>> {
    let Some(extraction) = extract(html, config)? else {
        return Ok(None);
    };

    let sidebar = SidebarView::new(&extraction.outline, &extraction.labels);
    let drawer = DrawerView::new(&extraction.outline, &extraction.labels, &config.drawer);
    let markup = view::render_markup(&sidebar, &drawer)?;

    let html = rewrite(html, &config.toc, &extraction.assigned, &markup)?;
    Ok(Some(InjectedPage {
        html,
        entries: extraction.outline.len(),
    }))
}

/// Copy `html` through, writing generated ids, marking `<body>` and
/// inserting `markup` before `</body>` (or at the end without one).
fn rewrite(html: &str, toc: &TocConfig, assigned: &IdAssignments, markup: &str) -> Result<String> {
    let mut tokens = HtmlTokens::new(html);
    let mut writer: XmlWriter =
        Writer::new(Cursor::new(Vec::with_capacity(html.len() + markup.len())));
    let mut cursor = ContentCursor::new(toc);
    let mut inserted = false;

    loop {
        let event = match tokens.next_token()? {
            Token::RawText { start, body, end } => {
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::from_escaped(body)))?;
                writer.write_event(Event::Text(BytesText::from_escaped(end)))?;
                continue;
            }
            Token::Event(event) => event,
        };

        match event {
            Event::Start(elem) => {
                let elem = match cursor.enter(&elem) {
                    Visit::Heading { ordinal, .. } => match assigned.get(&ordinal) {
                        Some(id) => with_attr(&elem, "id", |_| id.to_string()),
                        None => elem.into_owned(),
                    },
                    Visit::Body => with_attr(&elem, "class", add_has_toc),
                    Visit::Other => elem.into_owned(),
                };
                writer.write_event(Event::Start(elem))?;
            }
            Event::End(elem) => {
                cursor.leave(elem.name().as_ref());
                if !inserted && elem.name().as_ref().eq_ignore_ascii_case(b"body") {
                    write_markup(&mut writer, markup)?;
                    inserted = true;
                }
                writer.write_event(Event::End(elem))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !inserted {
        write_markup(&mut writer, markup)?;
    }
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn write_markup(writer: &mut XmlWriter, markup: &str) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
    Ok(())
}

/// Rebuild an element with attribute `key` set to `value(current)`.
///
/// Other attributes keep their order and raw value. Quotes are re-escaped
/// since every value is written double-quoted.
fn with_attr<F>(elem: &BytesStart<'_>, key: &str, value: F) -> BytesStart<'static>
where
    F: FnOnce(Option<&str>) -> String,
{
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(tag);
    let mut value = Some(value);

    for attr in elem.html_attributes().flatten() {
        if attr.key.as_ref().eq_ignore_ascii_case(key.as_bytes()) {
            if let Some(value) = value.take() {
                let current = attr_value(elem, key.as_bytes());
                rebuilt.push_attribute((key, value(current.as_deref()).as_str()));
            }
        } else {
            rebuilt.push_attribute(Attribute {
                key: attr.key,
                value: requote(attr.value),
            });
        }
    }
    if let Some(value) = value {
        rebuilt.push_attribute((key, value(None).as_str()));
    }
    rebuilt
}

fn requote(raw: Cow<'_, [u8]>) -> Cow<'_, [u8]> {
    if !raw.contains(&b'"') {
        return raw;
    }
    let mut quoted = Vec::with_capacity(raw.len() + 8);
    for &byte in raw.iter() {
        match byte {
            b'"' => quoted.extend_from_slice(b"&quot;"),
            _ => quoted.push(byte),
        }
    }
    Cow::Owned(quoted)
}

fn add_has_toc(classes: Option<&str>) -> String {
    match classes.map(str::trim) {
        Some(classes) if has_class(classes, view::class::HAS_TOC) => classes.to_owned(),
        Some(classes) if !classes.is_empty() => format!("{classes} {}", view::class::HAS_TOC),
        _ => view::class::HAS_TOC.to_owned(),
    }
}

// ============================================================================
// Site
// ============================================================================

/// Outcome counters of a site run.
#[derive(Debug, Default)]
pub struct SiteReport {
    pub injected: usize,
    pub skipped: usize,
    pub copied: usize,
}

/// Rewrite every page under `[build.input]` into `[build.output]`.
pub fn inject_site(config: &TocbarConfig) -> Result<SiteReport> {
    let input = &config.build.input;
    let output = &config.build.output;
    let files = collect_files(input, output);
    log!("build"; "rewriting {} files from {}", files.len(), input.display());

    let has_error = AtomicBool::new(false);
    let injected = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let copied = AtomicUsize::new(0);

    files.par_iter().try_for_each(|path| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        match process_file(path, config) {
            Ok(FileOutcome::Injected(entries)) => {
                log!("toc"; "{}: injected {} entries", relative(path, input), entries);
                injected.fetch_add(1, Ordering::Relaxed);
            }
            Ok(FileOutcome::Skipped) => {
                log!("toc"; "{}: skipped: not applicable", relative(path, input));
                skipped.fetch_add(1, Ordering::Relaxed);
            }
            Ok(FileOutcome::Copied) => {
                copied.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                if !has_error.swap(true, Ordering::Relaxed) {
                    log!("error"; "{}: {:#}", path.display(), e);
                }
                return Err(anyhow!("Build failed"));
            }
        }
        Ok(())
    })?;

    let report = SiteReport {
        injected: injected.into_inner(),
        skipped: skipped.into_inner(),
        copied: copied.into_inner(),
    };
    log!(
        "build";
        "done: {} pages with toc, {} without, {} files copied",
        report.injected,
        report.skipped,
        report.copied
    );
    Ok(report)
}

enum FileOutcome {
    Injected(usize),
    Skipped,
    Copied,
}

fn process_file(path: &Path, config: &TocbarConfig) -> Result<FileOutcome> {
    let rel = path.strip_prefix(&config.build.input)?;
    let dest = config.build.output.join(rel);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    if path.extension().and_then(OsStr::to_str) != Some("html") {
        fs::copy(path, &dest)
            .with_context(|| format!("Failed to copy {} to {}", path.display(), dest.display()))?;
        return Ok(FileOutcome::Copied);
    }

    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (content, outcome) = match inject_page(&html, config)? {
        Some(page) => (page.html, FileOutcome::Injected(page.entries)),
        None => (html, FileOutcome::Skipped),
    };

    let content = minify(content.as_bytes(), config.build.minify);
    fs::write(&dest, &*content)
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    Ok(outcome)
}

/// Every file under `input`, excluding `output` when it is nested inside.
fn collect_files(input: &Path, output: &Path) -> Vec<PathBuf> {
    WalkDir::new(input)
        .into_iter()
        .filter_entry(|e| e.path() != output)
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Minify HTML when enabled, borrowing the input otherwise.
fn minify(html: &[u8], enabled: bool) -> std::borrow::Cow<'_, [u8]> {
    if !enabled {
        return std::borrow::Cow::Borrowed(html);
    }
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    std::borrow::Cow::Owned(minify_html::minify(html, &cfg))
}
