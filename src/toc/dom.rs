//! Minimal element tree for the TOC presentations.
//!
//! Every setter compares before writing and reports whether anything
//! changed, so callers can keep recomputation free of redundant mutations.

use anyhow::Result;
use compact_str::CompactString;
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use smallvec::SmallVec;
use std::io::Cursor;

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Counts effective class/attribute/style changes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Mutations(usize);

impl Mutations {
    /// Count `changed` and pass it through.
    #[inline]
    pub fn record(&mut self, changed: bool) -> bool {
        self.0 += usize::from(changed);
        changed
    }

    pub const fn count(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(Node),
    Text(String),
    /// Trusted, pre-escaped markup (icons).
    Markup(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    tag: &'static str,
    classes: SmallVec<[&'static str; 4]>,
    attrs: SmallVec<[(&'static str, CompactString); 4]>,
    styles: SmallVec<[(&'static str, CompactString); 1]>,
    children: Vec<Child>,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: SmallVec::new(),
            attrs: SmallVec::new(),
            styles: SmallVec::new(),
            children: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    pub fn class(mut self, class: &'static str) -> Self {
        self.toggle_class(class, true);
        self
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<CompactString>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(Child::Element(node));
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes.into_iter().map(Child::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    pub fn markup(mut self, markup: &'static str) -> Self {
        self.children.push(Child::Markup(markup));
        self
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(&class)
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn style(&self, key: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Child::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Mutations (compare-then-write)
    // ------------------------------------------------------------------------

    pub fn toggle_class(&mut self, class: &'static str, on: bool) -> bool {
        match (self.classes.iter().position(|c| *c == class), on) {
            (None, true) => {
                self.classes.push(class);
                true
            }
            (Some(pos), false) => {
                self.classes.remove(pos);
                true
            }
            _ => false,
        }
    }

    pub fn set_attr(&mut self, key: &'static str, value: impl Into<CompactString>) -> bool {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, current)) if *current == value => false,
            Some((_, current)) => {
                *current = value;
                true
            }
            None => {
                self.attrs.push((key, value));
                true
            }
        }
    }

    pub fn set_style(&mut self, key: &'static str, value: impl Into<CompactString>) -> bool {
        let value = value.into();
        match self.styles.iter_mut().find(|(k, _)| *k == key) {
            Some((_, current)) if *current == value => false,
            Some((_, current)) => {
                *current = value;
                true
            }
            None => {
                self.styles.push((key, value));
                true
            }
        }
    }

    pub fn remove_style(&mut self, key: &str) -> bool {
        let before = self.styles.len();
        self.styles.retain(|(k, _)| *k != key);
        self.styles.len() != before
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    pub fn write_html(&self, writer: &mut XmlWriter) -> Result<()> {
        let mut start = BytesStart::new(self.tag);
        if !self.classes.is_empty() {
            start.push_attribute(("class", self.classes.join(" ").as_str()));
        }
        for (key, value) in &self.attrs {
            start.push_attribute((*key, value.as_str()));
        }
        if !self.styles.is_empty() {
            let style = self
                .styles
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            start.push_attribute(("style", style.as_str()));
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Child::Element(node) => node.write_html(writer)?,
                Child::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
                Child::Markup(markup) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(*markup)))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag)))?;
        Ok(())
    }

    pub fn to_html(&self) -> Result<String> {
        render_html(std::slice::from_ref(self))
    }
}

/// Serialize sibling nodes to an HTML fragment.
pub fn render_html(nodes: &[Node]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(4096)));
    for node in nodes {
        node.write_html(&mut writer)?;
    }
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// Format a CSS length without trailing zeros (`12.5`, `0`, `125.664`).
pub fn format_number(value: f64) -> CompactString {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_class_reports_changes() {
        let mut node = Node::new("a");
        assert!(node.toggle_class("is-active", true));
        assert!(!node.toggle_class("is-active", true));
        assert!(node.has_class("is-active"));
        assert!(node.toggle_class("is-active", false));
        assert!(!node.toggle_class("is-active", false));
    }

    #[test]
    fn test_set_attr_and_style_compare() {
        let mut node = Node::new("button");
        assert!(node.set_attr("aria-expanded", "false"));
        assert!(!node.set_attr("aria-expanded", "false"));
        assert!(node.set_attr("aria-expanded", "true"));
        assert_eq!(node.get_attr("aria-expanded"), Some("true"));

        assert!(node.set_style("transform", "translateY(12px)"));
        assert!(!node.set_style("transform", "translateY(12px)"));
        assert!(node.remove_style("transform"));
        assert!(!node.remove_style("transform"));
    }

    #[test]
    fn test_mutations_record() {
        let mut mutations = Mutations::default();
        assert!(mutations.record(true));
        assert!(!mutations.record(false));
        assert_eq!(mutations.count(), 1);
    }

    #[test]
    fn test_to_html_escapes_text_and_attrs() {
        let node = Node::new("a")
            .class("toc-link")
            .attr("href", "#a&b")
            .text("Q&A <intro>");
        assert_eq!(
            node.to_html().unwrap(),
            r##"<a class="toc-link" href="#a&amp;b">Q&amp;A &lt;intro&gt;</a>"##
        );
    }

    #[test]
    fn test_to_html_nested_with_markup_and_style() {
        let mut node = Node::new("div")
            .class("toc-mobile-drawer")
            .child(Node::new("span").markup("<svg></svg>"));
        node.set_style("transform", "translateY(4px)");
        assert_eq!(
            node.to_html().unwrap(),
            r#"<div class="toc-mobile-drawer" style="transform: translateY(4px)"><span><svg></svg></span></div>"#
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(125.663_706), "125.664");
        assert_eq!(format_number(40.0), "40");
    }
}
