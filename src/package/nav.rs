//! EPUB 3 navigation document (`<nav epub:type="toc">`).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::xml::{attr, attr_exact, local_name, resolve_entity};
use crate::path;
use crate::toc::NavNode;

#[derive(Default)]
struct Item {
    title: String,
    href: Option<String>,
    children: Option<Vec<NavNode>>,
}

impl Item {
    fn into_node(self) -> Option<NavNode> {
        let title = Some(self.title.trim().to_string()).filter(|t| !t.is_empty());
        let children = self.children.filter(|c| !c.is_empty());
        match (self.href, children) {
            (Some(href), None) => Some(NavNode::Link { title, href }),
            (Some(href), Some(children)) => {
                Some(NavNode::group(NavNode::Link { title, href }, children))
            }
            (None, Some(children)) => Some(NavNode::Section { title, children }),
            (None, None) => None,
        }
    }
}

enum Frame {
    List(Vec<NavNode>),
    Item(Item),
}

/// State of the `<nav>` element currently being read.
struct NavCapture {
    is_toc: bool,
    depth: usize,
    roots: Vec<NavNode>,
    frames: Vec<Frame>,
    /// Element depth inside the current `<a>`/`<span>` label, if any.
    label: Option<usize>,
}

impl NavCapture {
    fn new(is_toc: bool) -> Self {
        Self {
            is_toc,
            depth: 1,
            roots: Vec::new(),
            frames: Vec::new(),
            label: None,
        }
    }

    fn current_item(&mut self) -> Option<&mut Item> {
        match self.frames.last_mut() {
            Some(Frame::Item(item)) => Some(item),
            _ => None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, nav_path: &str) {
        self.depth += 1;
        if let Some(depth) = self.label.as_mut() {
            *depth += 1;
            return;
        }

        match local_name(e.name().as_ref()) {
            b"ol" | b"ul" => self.frames.push(Frame::List(Vec::new())),
            b"li" => self.frames.push(Frame::Item(Item::default())),
            b"a" => {
                let href = attr(e, b"href");
                if let Some(item) = self.current_item() {
                    item.href = href
                        .map(|h| path::resolve_keep_fragment(nav_path, &h).unwrap_or(h));
                    self.label = Some(1);
                }
            }
            b"span" => {
                if self.current_item().is_some_and(|i| i.title.is_empty()) {
                    self.label = Some(1);
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, local: &[u8]) {
        self.depth -= 1;
        if let Some(depth) = self.label.as_mut() {
            *depth -= 1;
            if *depth == 0 {
                self.label = None;
            }
            return;
        }

        match local {
            b"ol" | b"ul" => {
                if let Some(Frame::List(nodes)) = self.frames.pop() {
                    match self.frames.last_mut() {
                        Some(Frame::Item(item)) => {
                            item.children.get_or_insert_with(Vec::new).extend(nodes)
                        }
                        Some(Frame::List(outer)) => outer.extend(nodes),
                        None => self.roots.extend(nodes),
                    }
                }
            }
            b"li" => {
                if let Some(Frame::Item(item)) = self.frames.pop()
                    && let Some(node) = item.into_node()
                {
                    match self.frames.last_mut() {
                        Some(Frame::List(nodes)) => nodes.push(node),
                        Some(Frame::Item(parent)) => {
                            parent.children.get_or_insert_with(Vec::new).push(node)
                        }
                        None => self.roots.push(node),
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.label.is_some()
            && let Some(item) = self.current_item()
        {
            item.title.push_str(text);
        }
    }
}

/// Parse a navigation document into a navigation tree.
///
/// Uses the `nav` typed `toc`, falling back to the first `nav` element.
/// Hrefs are resolved against `nav_path`.
pub fn parse_nav(content: &str, nav_path: &str) -> Result<Vec<NavNode>, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut navs: Vec<(bool, Vec<NavNode>)> = Vec::new();
    let mut capture: Option<NavCapture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match capture.as_mut() {
                Some(nav) => nav.start(&e, nav_path),
                None if local_name(e.name().as_ref()) == b"nav" => {
                    let kind = attr_exact(&e, b"epub:type")
                        .or_else(|| attr(&e, b"type"))
                        .or_else(|| attr(&e, b"role"))
                        .unwrap_or_default();
                    let is_toc = kind
                        .split_ascii_whitespace()
                        .any(|t| t == "toc" || t == "doc-toc");
                    capture = Some(NavCapture::new(is_toc));
                }
                None => {}
            },
            Event::End(e) => {
                if let Some(nav) = capture.as_mut() {
                    nav.end(local_name(e.name().as_ref()));
                    if nav.depth == 0
                        && let Some(done) = capture.take()
                    {
                        navs.push((done.is_toc, done.roots));
                    }
                }
            }
            Event::Text(e) => {
                if let Some(nav) = capture.as_mut() {
                    nav.text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(nav) = capture.as_mut()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    nav.text(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let chosen = match navs.iter().position(|(is_toc, _)| *is_toc) {
        Some(idx) => navs.swap_remove(idx).1,
        None if !navs.is_empty() => navs.swap_remove(0).1,
        None => Vec::new(),
    };
    Ok(chosen)
}
