//! Lenient HTML/XHTML document tree.
//!
//! Content documents are parsed with html5ever into an arena [`Dom`], so
//! broken markup is recovered the way a browser would. The renderer and
//! the annotator both edit this tree and write it back out with
//! [`serialize`].

mod arena;
mod serialize;
mod tree_sink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

pub use arena::{Attribute, Children, Dom, Node, NodeData, NodeId};
pub use serialize::{serialize, serialize_children};
pub use tree_sink::{DomSink, NodeHandle};

/// Parse a document. Never fails; malformed input is recovered.
pub fn parse_html(html: &str) -> Dom {
    parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
