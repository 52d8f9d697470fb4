//! XML utility functions for parsing documents and locating elements by local name.

use roxmltree::{Document, Node, ParsingOptions};

/// Parse a cell value as an XML document.
///
/// A leading byte-order mark and surrounding whitespace are ignored, since
/// spreadsheet exports frequently pad cells. DTDs are tolerated but not
/// validated against.
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::xml::parse_document;
///
/// assert!(parse_document("  <r><a>1</a></r>\n").is_ok());
/// assert!(parse_document("not xml").is_err());
/// ```
pub fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let text = text.trim_start_matches('\u{feff}').trim();
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
}

/// Get the tag name without namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bulk_xml_scrubber::xml::local_name;
///
/// let xml = r#"<ns:root xmlns:ns="urn:x"><ns:child/></ns:root>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(local_name(doc.root_element()), "root");
/// ```
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Strip a namespace from a textual tag name.
///
/// Handles both Clark notation (`{uri}name`) and prefixed names (`ns:name`).
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::xml::strip_namespace;
///
/// assert_eq!(strip_namespace("{urn:x}Status"), "Status");
/// assert_eq!(strip_namespace("sa:Status"), "Status");
/// assert_eq!(strip_namespace("Status"), "Status");
/// ```
pub fn strip_namespace(tag: &str) -> &str {
    if let Some((_, name)) = tag.split_once('}') {
        return name;
    }
    match tag.rsplit_once(':') {
        Some((_, name)) => name,
        None => tag,
    }
}

/// Iterate over an element and all of its descendant elements, in document order.
pub fn element_tree<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().filter(|n| n.is_element())
}

/// Find the first descendant element (excluding `node` itself) with the given local name,
/// in any namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bulk_xml_scrubber::xml::find_descendant;
///
/// let xml = r#"<r xmlns="urn:x"><a><b>1</b></a><b>2</b></r>"#;
/// let doc = Document::parse(xml).unwrap();
/// let b = find_descendant(doc.root_element(), "b").unwrap();
/// assert_eq!(b.text(), Some("1"));
/// ```
pub fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    element_tree(node)
        .skip(1)
        .find(|n| local_name(*n) == name)
}

/// Find the first descendant element (excluding `node` itself) with the given local name
/// whose namespace URI equals `namespace`.
pub fn find_descendant_in_namespace<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
    namespace: &str,
) -> Option<Node<'a, 'input>> {
    element_tree(node)
        .skip(1)
        .find(|n| local_name(*n) == name && n.tag_name().namespace() == Some(namespace))
}

/// Get the direct text of a node: every text child before its first child element,
/// concatenated verbatim. Comments and processing instructions are skipped.
///
/// Returns an empty string if the node has no text.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bulk_xml_scrubber::xml::get_text;
///
/// let doc = Document::parse("<a>foo<!--x-->bar<b>child</b>tail</a>").unwrap();
/// assert_eq!(get_text(doc.root_element()), "foobar");
/// ```
pub fn get_text(node: Node<'_, '_>) -> String {
    node.children()
        .take_while(|child| !child.is_element())
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}
