use crate::dom::dom_tree::{Document, NodeData, NodeRef};

/// A list of void (self-closing) elements in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are written out verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Serializes the whole document, doctype included.
pub fn serialize_document(document: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = &*document.doctype.borrow() {
        out.push_str("<!DOCTYPE ");
        out.push_str(&doctype.name);
        out.push('>');
    }
    write_node(&document.root, false, &mut out);
    out
}

/// Outer HTML of a single node.
pub fn serialize_node(node: &NodeRef) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

fn write_node(node: &NodeRef, raw_text: bool, out: &mut String) {
    let node = node.borrow();
    match &node.data {
        NodeData::DocumentRoot => {
            for child in &node.children {
                write_node(child, false, out);
            }
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for (key, value) in &elem.attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
            for child in &node.children {
                write_node(child, raw, out);
            }
            out.push_str("</");
            out.push_str(&elem.tag);
            out.push('>');
        }
        NodeData::Text(text) if raw_text => out.push_str(text),
        NodeData::Text(text) => escape_into(text, false, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::html::create_dom_tree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serializes_parsed_document() {
        let document = create_dom_tree(
            r#"<!DOCTYPE html><p class="a" title='say "hi"'>x &amp; y <b>z</b></p><br><!-- note -->"#,
        );
        assert_eq!(
            serialize_document(&document),
            r#"<!DOCTYPE html><html><head></head><body><p class="a" title="say &quot;hi&quot;">x &amp; y <b>z</b></p><br><!-- note --></body></html>"#
        );
    }

    #[test]
    fn test_style_text_is_not_escaped() {
        let document = create_dom_tree("<div><style>a > b { content: \"&\" }</style></div>");
        let body = document.body().unwrap();
        assert_eq!(
            serialize_node(&body),
            "<body><div><style>a > b { content: \"&\" }</style></div></body>"
        );
    }
}
