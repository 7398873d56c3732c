//! EPUB 2 NCX navigation (`navMap` / `navPoint`).

use quick_xml::Reader;
use quick_xml::events::Event;

use super::xml::{attr, local_name, resolve_entity};
use crate::path;
use crate::toc::NavNode;

struct NavPointState {
    title: String,
    src: Option<String>,
    children: Vec<NavNode>,
}

impl NavPointState {
    fn new() -> Self {
        Self {
            title: String::new(),
            src: None,
            children: Vec::new(),
        }
    }

    fn into_node(self) -> Option<NavNode> {
        let title = Some(self.title.trim().to_string()).filter(|t| !t.is_empty());
        match self.src {
            Some(href) => {
                let link = NavNode::Link { title, href };
                if self.children.is_empty() {
                    Some(link)
                } else {
                    Some(NavNode::group(link, self.children))
                }
            }
            None if !self.children.is_empty() => Some(NavNode::Section {
                title,
                children: self.children,
            }),
            None => None,
        }
    }
}

/// Parse an NCX document into a navigation tree.
///
/// `content@src` values are resolved against `ncx_path`.
pub fn parse_ncx(content: &str, ncx_path: &str) -> Result<Vec<NavNode>, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    // The bottom of the stack collects top-level points.
    let mut stack = vec![NavPointState::new()];
    let mut in_text = false;
    let mut in_nav_map = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"navMap" => in_nav_map = true,
                b"navPoint" if in_nav_map => stack.push(NavPointState::new()),
                b"text" => in_text = stack.len() > 1,
                b"content" => set_src(&mut stack, attr(&e, b"src"), ncx_path),
                _ => {}
            },
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"content" && stack.len() > 1 {
                    set_src(&mut stack, attr(&e, b"src"), ncx_path);
                }
            }
            Event::Text(e) if in_text => {
                if let Some(state) = stack.last_mut() {
                    state.title.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) if in_text => {
                if let (Some(state), Some(resolved)) = (
                    stack.last_mut(),
                    resolve_entity(&String::from_utf8_lossy(e.as_ref())),
                ) {
                    state.title.push_str(&resolved);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"text" => in_text = false,
                b"navMap" => in_nav_map = false,
                b"navPoint" if stack.len() > 1 => {
                    if let Some(node) = stack.pop().and_then(NavPointState::into_node)
                        && let Some(parent) = stack.last_mut()
                    {
                        parent.children.push(node);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    // Unclosed navPoints are folded into their parents.
    while stack.len() > 1 {
        if let Some(node) = stack.pop().and_then(NavPointState::into_node)
            && let Some(parent) = stack.last_mut()
        {
            parent.children.push(node);
        }
    }

    Ok(stack.pop().map(|root| root.children).unwrap_or_default())
}

fn set_src(stack: &mut [NavPointState], src: Option<String>, ncx_path: &str) {
    if let (Some(state), Some(src)) = (stack.last_mut(), src)
        && state.src.is_none()
    {
        let href = path::resolve_keep_fragment(ncx_path, &src).unwrap_or(src);
        state.src = Some(href);
    }
}
