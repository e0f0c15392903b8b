//! Dual presentation: desktop sidebar and mobile drawer.
//!
//! Both views project the same [`Outline`] through [`project_links`], each
//! with its own class names, instead of one copying the other's nodes. They
//! agree by construction and can be rendered in any order.

use crate::config::{DrawerConfig, LabelsConfig};
use crate::toc::dom::{Mutations, Node, format_number};
use crate::toc::entry::Outline;
use anyhow::Result;
use compact_str::format_compact;

/// Class names targeted by the theme stylesheet.
pub mod class {
    pub const HAS_TOC: &str = "has-toc";
    pub const TOC_OPEN: &str = "toc-open";

    pub const SIDEBAR: &str = "toc-sidebar";
    pub const CONTAINER: &str = "toc-container";
    pub const HEADER: &str = "toc-header";
    pub const ICON: &str = "toc-icon";
    pub const TITLE: &str = "toc-title";
    pub const LIST: &str = "toc-list";
    pub const ITEM: &str = "toc-item";
    pub const LINK: &str = "toc-link";

    pub const TRIGGER: &str = "toc-mobile-trigger";
    pub const TRIGGER_ICON: &str = "toc-trigger-icon";
    pub const RING: &str = "toc-progress-ring";
    pub const RING_BG: &str = "toc-progress-ring__bg";
    pub const RING_PROGRESS: &str = "toc-progress-ring__progress";
    pub const OVERLAY: &str = "toc-mobile-overlay";
    pub const DRAWER: &str = "toc-mobile-drawer";
    pub const HANDLE: &str = "toc-mobile-handle";
    pub const MOBILE_HEADER: &str = "toc-mobile-header";
    pub const MOBILE_TITLE: &str = "toc-mobile-title";
    pub const CLOSE: &str = "toc-mobile-close";
    pub const CONTENT: &str = "toc-mobile-content";
    pub const MOBILE_LIST: &str = "toc-mobile-list";
    pub const MOBILE_ITEM: &str = "toc-mobile-item";
    pub const MOBILE_LINK: &str = "toc-mobile-link";

    pub const ACTIVE: &str = "is-active";
    pub const VISIBLE: &str = "is-visible";
    pub const OPEN: &str = "is-open";
    pub const HIDDEN: &str = "is-hidden";
}

const LIST_ICON: &str = concat!(
    r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">"#,
    r#"<line x1="8" y1="6" x2="21" y2="6"></line><line x1="8" y1="12" x2="21" y2="12"></line>"#,
    r#"<line x1="8" y1="18" x2="21" y2="18"></line><line x1="3" y1="6" x2="3.01" y2="6"></line>"#,
    r#"<line x1="3" y1="12" x2="3.01" y2="12"></line><line x1="3" y1="18" x2="3.01" y2="18"></line>"#,
    "</svg>"
);

const CLOSE_ICON: &str = concat!(
    r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">"#,
    r#"<line x1="18" y1="6" x2="6" y2="18"></line><line x1="6" y1="6" x2="18" y2="18"></line>"#,
    "</svg>"
);

// ============================================================================
// Projection
// ============================================================================

/// Class names of one list presentation.
#[derive(Debug, Clone, Copy)]
pub struct ListClasses {
    pub list: &'static str,
    pub item: &'static str,
    pub link: &'static str,
}

pub const SIDEBAR_LIST: ListClasses = ListClasses {
    list: class::LIST,
    item: class::ITEM,
    link: class::LINK,
};

pub const DRAWER_LIST: ListClasses = ListClasses {
    list: class::MOBILE_LIST,
    item: class::MOBILE_ITEM,
    link: class::MOBILE_LINK,
};

/// One `<a>` per entry, addressed by sequence index.
pub fn project_links(outline: &Outline, classes: ListClasses) -> Vec<Node> {
    outline
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Node::new("a")
                .class(classes.link)
                .attr("href", entry.href())
                .attr("data-level", format_compact!("{}", entry.level))
                .attr("data-index", format_compact!("{index}"))
                .text(entry.text.as_str())
        })
        .collect()
}

fn list_node(tag: &'static str, classes: ListClasses, links: &[Node]) -> Node {
    Node::new(tag).class(classes.list).children(
        links
            .iter()
            .map(|link| Node::new("li").class(classes.item).child(link.clone())),
    )
}

/// Mark link `active` (by index) and clear every other one.
fn apply_active(links: &mut [Node], active: Option<usize>, mutations: &mut Mutations) -> bool {
    let mut changed = false;
    for (index, link) in links.iter_mut().enumerate() {
        changed |= mutations.record(link.toggle_class(class::ACTIVE, active == Some(index)));
    }
    changed
}

fn active_index(links: &[Node]) -> Option<usize> {
    links.iter().position(|link| link.has_class(class::ACTIVE))
}

// ============================================================================
// Presentation
// ============================================================================

/// Behaviour shared by both list presentations.
pub trait Presentation {
    fn links(&self) -> &[Node];

    /// Highlight entry `active`. Returns whether anything changed.
    fn set_active(&mut self, active: Option<usize>) -> bool;

    /// Show or hide the always-present entry point of the presentation.
    fn set_visible(&mut self, visible: bool) -> bool;

    /// Effective class/attribute/style changes so far.
    fn mutations(&self) -> usize;

    /// Serialize to sibling nodes for injection into `<body>`.
    fn to_nodes(&self) -> Vec<Node>;

    fn active_index(&self) -> Option<usize> {
        active_index(self.links())
    }

    fn active_href(&self) -> Option<&str> {
        self.links()
            .get(self.active_index()?)
            .and_then(|link| link.get_attr("href"))
    }

    fn hrefs(&self) -> Vec<&str> {
        self.links()
            .iter()
            .filter_map(|link| link.get_attr("href"))
            .collect()
    }
}

// ============================================================================
// Sidebar
// ============================================================================

/// Desktop aside panel, shown and hidden through `is-visible` only.
#[derive(Debug, Clone)]
pub struct SidebarView {
    aside: Node,
    title: String,
    links: Vec<Node>,
    mutations: Mutations,
}

impl SidebarView {
    pub fn new(outline: &Outline, labels: &LabelsConfig) -> Self {
        Self {
            aside: Node::new("aside")
                .class(class::SIDEBAR)
                .attr("aria-label", labels.toc_label.as_str()),
            title: labels.on_this_page.clone(),
            links: project_links(outline, SIDEBAR_LIST),
            mutations: Mutations::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.aside.has_class(class::VISIBLE)
    }

    pub fn aside(&self) -> &Node {
        &self.aside
    }
}

impl Presentation for SidebarView {
    fn links(&self) -> &[Node] {
        &self.links
    }

    fn set_active(&mut self, active: Option<usize>) -> bool {
        apply_active(&mut self.links, active, &mut self.mutations)
    }

    fn set_visible(&mut self, visible: bool) -> bool {
        self.mutations
            .record(self.aside.toggle_class(class::VISIBLE, visible))
    }

    fn mutations(&self) -> usize {
        self.mutations.count()
    }

    fn to_nodes(&self) -> Vec<Node> {
        let header = Node::new("div")
            .class(class::HEADER)
            .child(Node::new("div").class(class::ICON).markup(LIST_ICON))
            .child(Node::new("h3").class(class::TITLE).text(self.title.as_str()));
        let container = Node::new("div")
            .class(class::CONTAINER)
            .child(header)
            .child(list_node("ul", SIDEBAR_LIST, &self.links));
        vec![self.aside.clone().child(container)]
    }
}

// ============================================================================
// Drawer
// ============================================================================

/// Floating trigger, overlay and bottom drawer.
#[derive(Debug, Clone)]
pub struct DrawerView {
    trigger: Node,
    ring: Option<Node>,
    overlay: Node,
    drawer: Node,
    title: String,
    close_label: String,
    links: Vec<Node>,
    circumference: f64,
    mutations: Mutations,
}

impl DrawerView {
    pub fn new(outline: &Outline, labels: &LabelsConfig, config: &DrawerConfig) -> Self {
        let circumference = config.circumference();
        let ring = config.progress_ring.then(|| {
            let center = format_number(config.ring_radius + 2.0);
            let radius = format_number(config.ring_radius);
            Node::new("circle")
                .class(class::RING_PROGRESS)
                .attr("cx", center.clone())
                .attr("cy", center)
                .attr("r", radius)
                .attr("stroke-dasharray", format_number(circumference))
                .attr("stroke-dashoffset", format_number(circumference))
        });

        Self {
            trigger: Node::new("button")
                .class(class::TRIGGER)
                .attr("type", "button")
                .attr("aria-label", labels.open_toc.as_str())
                .attr("aria-expanded", "false"),
            ring,
            overlay: Node::new("div").class(class::OVERLAY),
            drawer: Node::new("div")
                .class(class::DRAWER)
                .attr("role", "dialog")
                .attr("aria-label", labels.toc_label.as_str()),
            title: labels.on_this_page.clone(),
            close_label: labels.close_toc.clone(),
            links: project_links(outline, DRAWER_LIST),
            circumference,
            mutations: Mutations::default(),
        }
    }

    pub fn trigger(&self) -> &Node {
        &self.trigger
    }

    pub fn overlay(&self) -> &Node {
        &self.overlay
    }

    pub fn drawer(&self) -> &Node {
        &self.drawer
    }

    pub fn ring(&self) -> Option<&Node> {
        self.ring.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.drawer.has_class(class::OPEN)
    }

    /// Apply open/closed classes and accessibility state.
    pub fn set_open(&mut self, open: bool) -> bool {
        let expanded = if open { "true" } else { "false" };
        let changes = [
            self.overlay.toggle_class(class::OPEN, open),
            self.drawer.toggle_class(class::OPEN, open),
            self.trigger.toggle_class(class::HIDDEN, open),
            self.trigger.set_attr("aria-expanded", expanded),
        ];
        changes
            .into_iter()
            .fold(false, |acc, changed| self.mutations.record(changed) | acc)
    }

    /// Highlight the link whose target matches `href`.
    pub fn sync_active_from(&mut self, href: Option<&str>) -> bool {
        let active = href.and_then(|href| {
            self.links
                .iter()
                .position(|link| link.get_attr("href") == Some(href))
        });
        self.set_active(active)
    }

    /// Set the ring's stroke offset for `progress` in `[0, 1]`.
    pub fn set_progress(&mut self, progress: f64) -> bool {
        let offset = format_number(self.circumference * (1.0 - progress.clamp(0.0, 1.0)));
        match self.ring.as_mut() {
            Some(ring) => self
                .mutations
                .record(ring.set_style("stroke-dashoffset", offset)),
            None => false,
        }
    }

    /// Follow the finger while dragging; `None` snaps back.
    pub fn set_drag(&mut self, offset: Option<f64>) -> bool {
        let changed = match offset {
            Some(offset) => self.drawer.set_style(
                "transform",
                format_compact!("translateY({}px)", format_number(offset)),
            ),
            None => self.drawer.remove_style("transform"),
        };
        self.mutations.record(changed)
    }
}

impl Presentation for DrawerView {
    fn links(&self) -> &[Node] {
        &self.links
    }

    fn set_active(&mut self, active: Option<usize>) -> bool {
        apply_active(&mut self.links, active, &mut self.mutations)
    }

    fn set_visible(&mut self, visible: bool) -> bool {
        self.mutations
            .record(self.trigger.toggle_class(class::VISIBLE, visible))
    }

    fn mutations(&self) -> usize {
        self.mutations.count()
    }

    fn to_nodes(&self) -> Vec<Node> {
        let mut trigger = self.trigger.clone();
        if let Some(progress) = &self.ring {
            let size = format_number(2.0 * progress.get_attr("cx").map_or(22.0, parse_number));
            let background = Node::new("circle")
                .class(class::RING_BG)
                .attr("cx", progress.get_attr("cx").unwrap_or_default())
                .attr("cy", progress.get_attr("cy").unwrap_or_default())
                .attr("r", progress.get_attr("r").unwrap_or_default());
            trigger = trigger.child(
                Node::new("svg")
                    .class(class::RING)
                    .attr("viewBox", format_compact!("0 0 {size} {size}"))
                    .child(background)
                    .child(progress.clone()),
            );
        }
        let trigger = trigger.child(
            Node::new("span")
                .class(class::TRIGGER_ICON)
                .markup(LIST_ICON),
        );

        let header = Node::new("div")
            .class(class::MOBILE_HEADER)
            .child(
                Node::new("h3")
                    .class(class::MOBILE_TITLE)
                    .markup(LIST_ICON)
                    .text(self.title.as_str()),
            )
            .child(
                Node::new("button")
                    .class(class::CLOSE)
                    .attr("type", "button")
                    .attr("aria-label", self.close_label.as_str())
                    .markup(CLOSE_ICON),
            );
        let drawer = self
            .drawer
            .clone()
            .child(Node::new("div").class(class::HANDLE))
            .child(header)
            .child(
                Node::new("div")
                    .class(class::CONTENT)
                    .child(list_node("ul", DRAWER_LIST, &self.links)),
            );

        vec![trigger, self.overlay.clone(), drawer]
    }
}

fn parse_number(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

/// Render both presentations as one injectable fragment.
pub fn render_markup(sidebar: &SidebarView, drawer: &DrawerView) -> Result<String> {
    let mut nodes = sidebar.to_nodes();
    nodes.extend(drawer.to_nodes());
    crate::toc::dom::render_html(&nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::entry::{Outline, entry};

    fn outline(n: usize) -> Outline {
        let entries = (0..n)
            .map(|i| entry(&format!("section-{i}"), 2 + (i % 3) as u8))
            .collect();
        Outline::new(entries, 2).unwrap()
    }

    fn views(n: usize) -> (SidebarView, DrawerView) {
        let outline = outline(n);
        let labels = LabelsConfig::default();
        (
            SidebarView::new(&outline, &labels),
            DrawerView::new(&outline, &labels, &DrawerConfig::default()),
        )
    }

    #[test]
    fn test_mirror_consistency() {
        let (sidebar, drawer) = views(7);

        assert_eq!(drawer.links().len(), 7);
        assert_eq!(sidebar.hrefs(), drawer.hrefs());
        assert_eq!(sidebar.hrefs()[3], "#section-3");
    }

    #[test]
    fn test_links_carry_level_and_index() {
        let (sidebar, drawer) = views(3);
        let link = &sidebar.links()[2];

        assert!(link.has_class(class::LINK));
        assert_eq!(link.get_attr("data-level"), Some("4"));
        assert_eq!(link.get_attr("data-index"), Some("2"));
        assert_eq!(link.text_content(), "section 2");
        assert!(drawer.links()[2].has_class(class::MOBILE_LINK));
    }

    #[test]
    fn test_set_active_is_exclusive_and_idempotent() {
        let (mut sidebar, _) = views(4);

        assert!(sidebar.set_active(Some(1)));
        let after_first = sidebar.mutations();
        assert!(!sidebar.set_active(Some(1)));
        assert_eq!(sidebar.mutations(), after_first);

        assert!(sidebar.set_active(Some(3)));
        assert_eq!(sidebar.active_index(), Some(3));
        assert_eq!(sidebar.active_href(), Some("#section-3"));

        assert!(sidebar.set_active(None));
        assert_eq!(sidebar.active_index(), None);
    }

    #[test]
    fn test_sync_active_by_href() {
        let (mut sidebar, mut drawer) = views(4);
        sidebar.set_active(Some(2));

        assert!(drawer.sync_active_from(sidebar.active_href()));
        assert_eq!(drawer.active_index(), Some(2));

        assert!(drawer.sync_active_from(None));
        assert_eq!(drawer.active_index(), None);
    }

    #[test]
    fn test_set_open_toggles_chrome() {
        let (_, mut drawer) = views(2);

        assert!(drawer.set_open(true));
        assert!(drawer.is_open());
        assert!(drawer.overlay().has_class(class::OPEN));
        assert!(drawer.trigger().has_class(class::HIDDEN));
        assert_eq!(drawer.trigger().get_attr("aria-expanded"), Some("true"));
        assert!(!drawer.set_open(true));

        assert!(drawer.set_open(false));
        assert!(!drawer.is_open());
        assert_eq!(drawer.trigger().get_attr("aria-expanded"), Some("false"));
    }

    #[test]
    fn test_set_progress_writes_offset_once() {
        let (_, mut drawer) = views(2);

        assert!(drawer.set_progress(0.5));
        assert!(!drawer.set_progress(0.5));
        let offset: f64 = drawer
            .ring()
            .and_then(|ring| ring.style("stroke-dashoffset"))
            .unwrap()
            .parse()
            .unwrap();
        assert!((offset - 62.832).abs() < 1e-9);

        assert!(drawer.set_progress(1.0));
        assert_eq!(
            drawer.ring().and_then(|ring| ring.style("stroke-dashoffset")),
            Some("0")
        );
    }

    #[test]
    fn test_set_progress_without_ring() {
        let outline = outline(2);
        let config = DrawerConfig {
            progress_ring: false,
            ..DrawerConfig::default()
        };
        let mut drawer = DrawerView::new(&outline, &LabelsConfig::default(), &config);
        assert!(!drawer.set_progress(0.3));
        assert_eq!(drawer.mutations(), 0);
    }

    #[test]
    fn test_set_drag() {
        let (_, mut drawer) = views(2);
        assert!(drawer.set_drag(Some(42.0)));
        assert_eq!(drawer.drawer().style("transform"), Some("translateY(42px)"));
        assert!(drawer.set_drag(None));
        assert_eq!(drawer.drawer().style("transform"), None);
    }

    #[test]
    fn test_visibility_targets_sidebar_and_trigger() {
        let (mut sidebar, mut drawer) = views(2);
        assert!(sidebar.set_visible(true));
        assert!(drawer.set_visible(true));
        assert!(sidebar.is_visible());
        assert!(drawer.trigger().has_class(class::VISIBLE));
    }

    #[test]
    fn test_render_markup_structure() {
        let (sidebar, drawer) = views(2);
        let html = render_markup(&sidebar, &drawer).unwrap();

        assert!(html.starts_with(r#"<aside class="toc-sidebar" aria-label="Table of Contents">"#));
        assert!(html.contains(r##"<li class="toc-item"><a class="toc-link" href="#section-0""##));
        assert!(html.contains(r#"<button class="toc-mobile-trigger" type="button""#));
        assert!(html.contains(r#"<svg class="toc-progress-ring" viewBox="0 0 44 44">"#));
        assert!(html.contains(r#"stroke-dasharray="125.664""#));
        assert!(html.contains(r#"<div class="toc-mobile-overlay"></div>"#));
        assert!(html.contains(r#"<div class="toc-mobile-drawer" role="dialog""#));
        assert!(html.contains(r#"<div class="toc-mobile-handle"></div>"#));
        assert!(html.contains(r#"aria-label="Close table of contents""#));
        assert!(html.contains(r##"<li class="toc-mobile-item"><a class="toc-mobile-link" href="#section-1""##));
        assert!(html.contains("On this page"));
    }
}
