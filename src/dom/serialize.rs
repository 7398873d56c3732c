//! HTML serialization of a [`Dom`].

use html5ever::{QualName, ns};

use super::arena::{Dom, NodeData, NodeId};

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Serialize the whole document.
pub fn serialize(dom: &Dom) -> String {
    let mut out = String::new();
    serialize_children(dom, dom.document(), &mut out);
    out
}

/// Serialize the children of `parent` into `out`.
pub fn serialize_children(dom: &Dom, parent: NodeId, out: &mut String) {
    let mut stack: Vec<Step> = dom.children(parent).map(Step::Open).collect();
    stack.reverse();

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Close(id) => {
                if let Some(name) = dom.qual_name(id) {
                    out.push_str("</");
                    out.push_str(&name.local);
                    out.push('>');
                }
                continue;
            }
            Step::Open(id) => id,
        };
        let Some(node) = dom.get(id) else { continue };

        match &node.data {
            NodeData::Element { name, attrs } => {
                out.push('<');
                out.push_str(&name.local);
                for attr in attrs {
                    out.push(' ');
                    push_attr_name(&attr.name, out);
                    out.push_str("=\"");
                    escape_attr(&attr.value, out);
                    out.push('"');
                }

                let html = name.ns == ns!(html);
                if html && VOID_ELEMENTS.contains(&name.local.as_ref()) {
                    out.push('>');
                    continue;
                }
                if !html && node.first_child.is_none() {
                    out.push_str("/>");
                    continue;
                }
                out.push('>');

                stack.push(Step::Close(id));
                let start = stack.len();
                stack.extend(dom.children(id).map(Step::Open));
                stack[start..].reverse();
            }
            NodeData::Text(text) => {
                let raw = dom
                    .qual_name(node.parent)
                    .is_some_and(|p| p.ns == ns!(html) && RAW_TEXT_ELEMENTS.contains(&p.local.as_ref()));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Document => {}
        }
    }
}

fn push_attr_name(name: &QualName, out: &mut String) {
    if let Some(prefix) = &name.prefix {
        out.push_str(prefix);
        out.push(':');
    } else if name.ns == ns!(xml) {
        out.push_str("xml:");
    } else if name.ns == ns!(xlink) {
        out.push_str("xlink:");
    } else if name.ns == ns!(xmlns) && name.local.as_ref() != "xmlns" {
        out.push_str("xmlns:");
    }
    out.push_str(&name.local);
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

pub(crate) fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn roundtrip(html: &str) -> String {
        serialize(&parse_html(html))
    }

    #[test]
    fn test_serialize_document() {
        let out = roundtrip("<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"x\">Hi</p></body></html>");
        assert_eq!(
            out,
            "<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"x\">Hi</p></body></html>"
        );
    }

    #[test]
    fn test_void_and_escaping() {
        let out = roundtrip(r#"<p>a &amp; b &lt; c<br><img src="x.png" alt="say &quot;hi&quot;"></p>"#);
        assert!(out.contains("<p>a &amp; b &lt; c<br><img src=\"x.png\" alt=\"say &quot;hi&quot;\"></p>"));
    }

    #[test]
    fn test_raw_text_is_verbatim() {
        let out = roundtrip("<head><style>p > a { color: red }</style></head><body><script>if (a < b) {}</script></body>");
        assert!(out.contains("<style>p > a { color: red }</style>"));
        assert!(out.contains("<script>if (a < b) {}</script>"));
    }

    #[test]
    fn test_foreign_elements_and_prefixed_attrs() {
        let out = roundtrip(r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="a.png"/></svg>"#);
        assert!(out.contains("<image xlink:href=\"a.png\"/>"), "{out}");
    }

    #[test]
    fn test_comments_and_nbsp() {
        let out = roundtrip("<body><!-- note --><p>a\u{a0}b</p></body>");
        assert!(out.contains("<!-- note --><p>a&nbsp;b</p>"));
    }

    #[test]
    fn test_deep_nesting() {
        let html = format!("{}x{}", "<span>".repeat(5_000), "</span>".repeat(5_000));
        let out = roundtrip(&html);
        assert_eq!(out.matches("<span>").count(), 5_000);
    }
}
