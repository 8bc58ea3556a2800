use scopeinline_lib::dom::dom_tree::{self, NodeData, NodeRef, ReadyState};
use scopeinline_lib::parser::html::create_dom_tree;

#[cfg(test)]
pub mod tests {
    use super::*;
    use html5ever::interface::QuirksMode;
    use pretty_assertions::assert_eq;

    fn collect_structure(node: &NodeRef) -> String {
        let mut output = String::new();
        traverse_node(node, 0, &mut output);
        output
    }

    fn traverse_node(node: &NodeRef, depth: usize, output: &mut String) {
        let node_ref = node.borrow();
        match &node_ref.data {
            NodeData::DocumentRoot => {
                for child in &node_ref.children {
                    traverse_node(child, depth, output);
                }
            }
            NodeData::Element(elem_node) => {
                *output += &format!("{}<{}>\n", "  ".repeat(depth), elem_node.tag);
                for child in &node_ref.children {
                    traverse_node(child, depth + 1, output);
                }
            }
            NodeData::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    *output += &format!("{}{}\n", "  ".repeat(depth), trimmed);
                }
            }
            NodeData::Comment(_) => {}
        }
    }

    /// Every child must point back at the node that holds it.
    fn assert_parent_links(node: &NodeRef) {
        for child in &node.borrow().children {
            let parent = child
                .borrow()
                .parent
                .as_ref()
                .and_then(std::rc::Weak::upgrade)
                .expect("child without parent");
            assert!(std::rc::Rc::ptr_eq(&parent, node));
            assert_parent_links(child);
        }
    }

    #[test]
    fn test_basic_structure() {
        let html = r#"
            <!DOCTYPE html>
            <html>
                <head>
                    <title>Test</title>
                </head>
                <body>
                    <h1>Hello</h1>
                    <p>World</p>
                </body>
            </html>
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
    <title>
      Test
  <body>
    <h1>
      Hello
    <p>
      World
"#;
        assert_eq!(structure.trim(), expected.trim());
        assert_eq!(document.ready_state(), ReadyState::Complete);
        assert_parent_links(&document.root);
    }

    #[test]
    fn test_void_elements() {
        let html = r#"
            <img src="test.jpg" alt="Test">
            <br>
            <input type="text">
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <img>
    <br>
    <input>
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_attributes() {
        let html = r#"
            <a href="https://example.com" target="_blank" data-test="123">
                Link
            </a>
        "#;

        let document = create_dom_tree(html);
        let anchors = document.elements_by_tag(&document.root, "a");
        assert_eq!(anchors.len(), 1);

        let attributes = anchors[0].borrow().element().unwrap().attributes.clone();
        assert_eq!(
            attributes,
            vec![
                ("href".to_string(), "https://example.com".to_string()),
                ("target".to_string(), "_blank".to_string()),
                ("data-test".to_string(), "123".to_string())
            ]
        );
    }

    #[test]
    fn test_mixed_content() {
        let html = r#"
            <p>
                This is <strong>bold</strong> and <em>italic</em> text.
                <br>
                Next line.
            </p>
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <p>
      This is
      <strong>
        bold
      and
      <em>
        italic
      text.
      <br>
      Next line.
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_doctype_and_quirks() {
        let document = create_dom_tree("<!DOCTYPE html><html><head></head></html>");
        assert_eq!(document.doctype.borrow().as_ref().unwrap().name, "html");
        assert_eq!(document.quirks_mode.get(), QuirksMode::NoQuirks);

        let quirky = create_dom_tree("<p>no doctype</p>");
        assert_eq!(quirky.quirks_mode.get(), QuirksMode::Quirks);
    }

    #[test]
    fn test_malformed_html() {
        let html = r#"
            <div>
                <p>Unclosed
                <img>
                </div>
        "#;

        let document = create_dom_tree(html);
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <div>
      <p>
        Unclosed
        <img>
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_table_autocorrection() {
        let document = create_dom_tree("<table><td>Cell</td></table>");
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    <table>
      <tbody>
        <tr>
          <td>
            Cell
"#;
        assert_eq!(structure.trim(), expected.trim());
    }

    #[test]
    fn test_foster_parented_text() {
        let document = create_dom_tree("<table><tr><td>a</td></tr>b</table>");
        let structure = collect_structure(&document.root);

        let expected = r#"
<html>
  <head>
  <body>
    b
    <table>
      <tbody>
        <tr>
          <td>
            a
"#;
        assert_eq!(structure.trim(), expected.trim());
        assert_parent_links(&document.root);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let document = create_dom_tree("<style>a {}&lt;b {}</style><p>x&amp;y</p>");
        let paragraphs = document.elements_by_tag(&document.root, "p");
        assert_eq!(paragraphs[0].borrow().children.len(), 1);
        assert_eq!(document.text_content(&paragraphs[0]), "x&y");
    }

    #[test]
    fn test_style_in_head_and_body() {
        let document = create_dom_tree(
            "<html><head><style>h {}</style></head><body><section><style>b {}</style></section></body></html>",
        );
        let styles = document.elements_by_tag(&document.root, "style");
        assert_eq!(styles.len(), 2);

        let parents: Vec<String> = styles
            .iter()
            .map(|style| {
                let parent = document.parent_element(style).unwrap();
                let tag = parent.borrow().element().unwrap().tag.clone();
                tag
            })
            .collect();
        assert_eq!(parents, vec!["head", "section"]);
        assert_eq!(document.text_content(&styles[1]), "b {}");
    }

    #[test]
    fn test_new_document_is_loading() {
        let document = dom_tree::Document::new();
        assert_eq!(document.ready_state(), ReadyState::Loading);
        assert!(document.document_element().is_none());
    }
}
