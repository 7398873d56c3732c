//! Navigation tree and its flattening into a table of contents.
//!
//! Navigation documents nest arbitrarily, so the raw tree is kept as a
//! single tagged type and walked with an explicit work list. Resolution
//! against the reading order happens through the path index built by
//! [`ReadingOrder`](crate::spine::ReadingOrder).

use serde::Serialize;

use crate::path;
use crate::spine::ReadingOrder;

/// Title used for links that carry no label.
pub const UNTITLED: &str = "(No Title)";

/// One node of the raw navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// A navigable entry pointing at a package path (fragment allowed).
    Link { title: Option<String>, href: String },
    /// A heading that groups children but is not itself navigable.
    Section {
        title: Option<String>,
        children: Vec<NavNode>,
    },
    /// A node followed by an optional child list, as produced by lenient
    /// navigation formats (an NCX `navPoint` with nested points, or a nav
    /// `<li>` holding both a link and a sub-list).
    Group {
        head: Box<NavNode>,
        children: Option<Vec<NavNode>>,
    },
}

impl NavNode {
    pub fn link(title: impl Into<String>, href: impl Into<String>) -> Self {
        NavNode::Link {
            title: Some(title.into()),
            href: href.into(),
        }
    }

    pub fn section(title: impl Into<String>, children: Vec<NavNode>) -> Self {
        NavNode::Section {
            title: Some(title.into()),
            children,
        }
    }

    pub fn group(head: NavNode, children: Vec<NavNode>) -> Self {
        NavNode::Group {
            head: Box::new(head),
            children: Some(children),
        }
    }

    /// Title of this node, if it has one.
    pub fn title(&self) -> Option<&str> {
        match self {
            NavNode::Link { title, .. } | NavNode::Section { title, .. } => title.as_deref(),
            NavNode::Group { head, .. } => head.title(),
        }
    }
}

// Packages can nest navigation arbitrarily deep; unlink children onto a
// work list so teardown does not recurse once per level.
impl Drop for NavNode {
    fn drop(&mut self) {
        let mut pending = take_children(self);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut take_children(&mut node));
        }
    }
}

fn take_children(node: &mut NavNode) -> Vec<NavNode> {
    match node {
        NavNode::Link { .. } => Vec::new(),
        NavNode::Section { children, .. } => std::mem::take(children),
        NavNode::Group { head, children } => {
            let mut out = children.take().unwrap_or_default();
            if !matches!(head.as_ref(), NavNode::Link { .. }) {
                let leaf = NavNode::Link {
                    title: None,
                    href: String::new(),
                };
                out.push(std::mem::replace(head.as_mut(), leaf));
            }
            out
        }
    }
}

/// A navigation entry resolved to a reading position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub position: usize,
    /// The navigation target as declared, fragment included.
    pub href: String,
}

/// Flatten a navigation tree into an ordered, deduplicated table of contents.
///
/// Links are emitted in depth-first pre-order. Links whose target is not in
/// the reading order are dropped, and only the first entry for each
/// position is kept.
pub fn build_toc(nodes: &[NavNode], order: &ReadingOrder) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<&NavNode> = nodes.iter().rev().collect();

    while let Some(node) = stack.pop() {
        match node {
            NavNode::Link { title, href } => {
                let target = path::strip_fragment(href);
                match order.position_of(target) {
                    Some(position) => entries.push(TocEntry {
                        title: title
                            .as_deref()
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .unwrap_or(UNTITLED)
                            .to_string(),
                        position,
                        href: href.clone(),
                    }),
                    None => tracing::trace!(href = %href, "navigation target not in reading order"),
                }
            }
            NavNode::Section { children, .. } => {
                stack.extend(children.iter().rev());
            }
            NavNode::Group { head, children } => {
                if let Some(children) = children {
                    stack.extend(children.iter().rev());
                }
                stack.push(head.as_ref());
            }
        }
    }

    dedup_by_position(entries)
}

/// Keep the first entry for each position, preserving order.
fn dedup_by_position(entries: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.position))
        .collect()
}
