//! Rendered-page scanning.
//!
//! Walks a page with quick-xml in lenient mode and reports the qualifying
//! headings of its content region. The same [`HtmlTokens`] and
//! [`ContentCursor`] drive the rewrite pass in `inject`, so heading ordinals
//! agree between both walks.

use crate::config::{LabelsConfig, TocConfig};
use crate::toc::entry::HeadingLevel;
use quick_xml::{Reader, events::BytesStart, events::Event, escape::unescape};
use std::borrow::Cow;
use thiserror::Error;

/// Elements that never have a closing tag in HTML.
const VOID_ELEMENTS: &[&[u8]] = &[
    b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
    b"param", b"source", b"track", b"wbr",
];

/// Elements whose body is raw text and must not be tokenized as markup.
const RAW_TEXT_ELEMENTS: &[&[u8]] = &[b"script", b"style"];

/// Prefix of the attributes carrying translated labels on `<body>`.
const I18N_PREFIX: &str = "data-i18n-";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed markup at byte {position}")]
    Malformed {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
}

// ============================================================================
// Scan Result
// ============================================================================

/// Whether the page has a usable content region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentState {
    #[default]
    Missing,
    /// Region found but opted out with the disable class.
    Disabled,
    Present,
}

/// A qualifying heading element as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeading {
    /// Position among qualifying heading elements, including empty ones.
    pub ordinal: usize,
    pub level: HeadingLevel,
    /// Untrimmed text content.
    pub text: String,
    /// Existing non-empty `id` attribute.
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PageScan {
    pub content: ContentState,
    pub headings: Vec<RawHeading>,
    /// Every `id` inside the content region, in document order.
    pub existing_ids: Vec<String>,
    /// Configured labels with `<body>` overrides applied.
    pub labels: LabelsConfig,
}

// ============================================================================
// Cursor
// ============================================================================

/// What an opening tag turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    Heading { ordinal: usize, level: HeadingLevel },
    Body,
    Other,
}

/// Tracks nesting to decide which headings qualify.
///
/// Only the first element carrying the content class is considered. Inside
/// it, any element carrying an ignore class hides its whole subtree.
pub(crate) struct ContentCursor<'c> {
    config: &'c TocConfig,
    stack: Vec<Vec<u8>>,
    content: Option<usize>,
    ignored: Option<usize>,
    heading: Option<usize>,
    state: ContentState,
    ordinal: usize,
}

impl<'c> ContentCursor<'c> {
    pub fn new(config: &'c TocConfig) -> Self {
        Self {
            config,
            stack: Vec::with_capacity(32),
            content: None,
            ignored: None,
            heading: None,
            state: ContentState::Missing,
            ordinal: 0,
        }
    }

    pub const fn state(&self) -> ContentState {
        self.state
    }

    /// Inside an enabled content region, outside ignored subtrees.
    pub fn in_content(&self) -> bool {
        self.content.is_some() && self.state == ContentState::Present && self.ignored.is_none()
    }

    /// Handle an opening tag.
    pub fn enter(&mut self, elem: &BytesStart<'_>) -> Visit {
        let name = elem.name().as_ref().to_ascii_lowercase();
        if name == b"body" {
            self.stack.push(name);
            return Visit::Body;
        }
        if is_void(&name) {
            return Visit::Other;
        }
        self.stack.push(name);
        let depth = self.stack.len();
        self.classify(elem, depth)
    }

    /// Handle a closing tag. Returns `true` when it closes the open heading.
    pub fn leave(&mut self, name: &[u8]) -> bool {
        let name = name.to_ascii_lowercase();
        let Some(pos) = self.stack.iter().rposition(|open| *open == name) else {
            return false;
        };
        self.stack.truncate(pos);

        let depth = self.stack.len();
        let closed = self.heading.is_some_and(|d| d > depth);
        if closed {
            self.heading = None;
        }
        if self.ignored.is_some_and(|d| d > depth) {
            self.ignored = None;
        }
        if self.content.is_some_and(|d| d > depth) {
            self.content = None;
        }
        closed
    }

    fn classify(&mut self, elem: &BytesStart<'_>, depth: usize) -> Visit {
        let classes = attr_value(elem, b"class").unwrap_or_default();

        if self.state == ContentState::Missing && has_class(&classes, &self.config.content_class) {
            self.content = Some(depth);
            self.state = if has_class(&classes, &self.config.disable_class) {
                ContentState::Disabled
            } else {
                ContentState::Present
            };
            return Visit::Other;
        }

        if self.content.is_none() || self.state != ContentState::Present {
            return Visit::Other;
        }

        if self.ignored.is_none()
            && self
                .config
                .ignore_classes
                .iter()
                .any(|class| has_class(&classes, class))
        {
            self.ignored = Some(depth);
        }
        if self.ignored.is_some() || self.heading.is_some() {
            return Visit::Other;
        }

        match self
            .config
            .level_of(elem.name().as_ref())
            .and_then(HeadingLevel::new)
        {
            Some(level) => {
                self.heading = Some(depth);
                let ordinal = self.ordinal;
                self.ordinal += 1;
                Visit::Heading { ordinal, level }
            }
            None => Visit::Other,
        }
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A tokenizer step.
pub(crate) enum Token<'i> {
    Event(Event<'i>),
    /// `<script>` or `<style>` with its body left untokenized.
    RawText {
        start: BytesStart<'i>,
        body: &'i str,
        /// Closing tag as written, empty when the input ends first.
        end: &'i str,
    },
}

/// Lenient HTML tokenizer.
///
/// quick-xml would read `a < b` inside a script as the start of a tag, so
/// raw-text bodies are cut out of the input by locating their closing tag
/// and the reader restarts after it.
pub(crate) struct HtmlTokens<'i> {
    html: &'i str,
    base: usize,
    reader: Reader<&'i [u8]>,
}

impl<'i> HtmlTokens<'i> {
    pub fn new(html: &'i str) -> Self {
        Self {
            html,
            base: 0,
            reader: create_html_reader(html),
        }
    }

    pub fn next_token(&mut self) -> Result<Token<'i>, ScanError> {
        let event = self
            .reader
            .read_event()
            .map_err(|source| ScanError::Malformed {
                position: self.base as u64 + self.reader.error_position() as u64,
                source,
            })?;

        let start = match event {
            Event::Start(start) if is_raw_text(start.name().as_ref()) => start,
            event => return Ok(Token::Event(event)),
        };

        let body_start =
            (self.base + self.reader.buffer_position() as usize).min(self.html.len());
        let rest = self.html.get(body_start..).unwrap_or_default();
        let (body, end) = match find_closing_tag(rest, start.name().as_ref()) {
            Some((at, len)) => (&rest[..at], &rest[at..at + len]),
            None => (rest, ""),
        };

        self.base = body_start + body.len() + end.len();
        self.reader = create_html_reader(self.html.get(self.base..).unwrap_or_default());
        Ok(Token::RawText { start, body, end })
    }
}

/// Offset and length of the first `</name ...>` in `rest`.
fn find_closing_tag(rest: &str, name: &[u8]) -> Option<(usize, usize)> {
    let bytes = rest.as_bytes();
    let mut from = 0;
    while let Some(pos) = bytes[from..].windows(2).position(|w| w == b"</") {
        let at = from + pos;
        let tail = &bytes[at + 2..];
        let boundary = tail
            .get(name.len())
            .is_some_and(|&b| b == b'>' || b == b'/' || b.is_ascii_whitespace());
        if boundary && tail[..name.len()].eq_ignore_ascii_case(name) {
            let close = tail[name.len()..].iter().position(|&b| b == b'>')?;
            return Some((at, 2 + name.len() + close + 1));
        }
        from = at + 2;
    }
    None
}

// ============================================================================
// Scanning
// ============================================================================

/// Scan a rendered page for its qualifying headings.
pub fn scan_page(
    html: &str,
    config: &TocConfig,
    labels: &LabelsConfig,
) -> Result<PageScan, ScanError> {
    let mut tokens = HtmlTokens::new(html);
    let mut cursor = ContentCursor::new(config);
    let mut scan = PageScan {
        labels: labels.clone(),
        ..PageScan::default()
    };
    let mut current: Option<RawHeading> = None;

    loop {
        let event = match tokens.next_token()? {
            Token::RawText { .. } => continue,
            Token::Event(event) => event,
        };

        match event {
            Event::Start(elem) => {
                match cursor.enter(&elem) {
                    Visit::Heading { ordinal, level } => {
                        current = Some(RawHeading {
                            ordinal,
                            level,
                            text: String::new(),
                            id: attr_value(&elem, b"id").filter(|id| !id.is_empty()),
                        });
                    }
                    Visit::Body => read_i18n(&elem, &mut scan.labels),
                    Visit::Other => {}
                }
                collect_id(&elem, &cursor, &mut scan.existing_ids);
            }
            Event::Empty(elem) => {
                if elem.name().as_ref().eq_ignore_ascii_case(b"body") {
                    read_i18n(&elem, &mut scan.labels);
                }
                collect_id(&elem, &cursor, &mut scan.existing_ids);
            }
            Event::End(elem) => {
                if cursor.leave(elem.name().as_ref())
                    && let Some(heading) = current.take()
                {
                    scan.headings.push(heading);
                }
            }
            Event::Text(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(&decode_text(&text));
                }
            }
            Event::GeneralRef(entity) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(&decode_entity(&entity));
                }
            }
            Event::CData(data) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Unterminated heading at end of input
    if let Some(heading) = current.take() {
        scan.headings.push(heading);
    }
    scan.content = cursor.state();
    Ok(scan)
}

fn collect_id(elem: &BytesStart<'_>, cursor: &ContentCursor<'_>, ids: &mut Vec<String>) {
    if cursor.in_content()
        && let Some(id) = attr_value(elem, b"id").filter(|id| !id.is_empty())
    {
        ids.push(id);
    }
}

fn read_i18n(elem: &BytesStart<'_>, labels: &mut LabelsConfig) {
    for attr in elem.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if let Some(key) = key.strip_prefix(I18N_PREFIX) {
            labels.apply_i18n(key, &decode_text(&attr.value));
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Lenient reader for HTML input.
///
/// Each reader may start mid-document after a raw-text cut, so end tags are
/// never matched against its own stack. Bare `&` in text is common in HTML.
#[inline]
pub(crate) fn create_html_reader(content: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.trim_text(false);
    config.enable_all_checks(false);
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;
    reader
}

#[inline]
pub(crate) fn is_void(name: &[u8]) -> bool {
    VOID_ELEMENTS.iter().any(|void| name.eq_ignore_ascii_case(void))
}

#[inline]
pub(crate) fn is_raw_text(name: &[u8]) -> bool {
    RAW_TEXT_ELEMENTS
        .iter()
        .any(|raw| name.eq_ignore_ascii_case(raw))
}

/// Decoded value of attribute `key` (ASCII case-insensitive).
pub(crate) fn attr_value(elem: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    elem.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(key))
        .map(|attr| decode_text(&attr.value))
}

/// Whether a whitespace-separated class list contains `class`.
#[inline]
pub(crate) fn has_class(classes: &str, class: &str) -> bool {
    !class.is_empty() && classes.split_whitespace().any(|c| c == class)
}

/// Decode raw text, resolving XML entities where possible.
pub(crate) fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    match unescape(&text) {
        Ok(Cow::Owned(unescaped)) => unescaped,
        Ok(Cow::Borrowed(_)) | Err(_) => text.into_owned(),
    }
}

/// Resolve an entity reference such as `amp` or `#x4e2d`.
fn decode_entity(name: &[u8]) -> Cow<'static, str> {
    match name {
        b"nbsp" => Cow::Borrowed("\u{a0}"),
        _ => {
            let reference = format!("&{};", String::from_utf8_lossy(name));
            match unescape(&reference) {
                Ok(resolved) => Cow::Owned(resolved.into_owned()),
                Err(_) => Cow::Owned(reference),
            }
        }
    }
}
