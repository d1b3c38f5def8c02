#![forbid(unsafe_code)]

//! Element lookup helpers over a parsed `roxmltree` document.
//!
//! XMLENC producers disagree on prefixes and sometimes on namespaces, so most
//! lookups compare only the local name. [`find_elements_ns`] is there for the
//! places where the namespace has to match as well.

use ulriksdal_core::Error;

/// Parse XML text into a `roxmltree` document.
pub fn parse(xml: &str) -> Result<roxmltree::Document<'_>, Error> {
    roxmltree::Document::parse_with_options(xml, crate::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))
}

/// Find the first descendant element with the given local name, in any namespace.
pub fn find_element<'a>(
    doc: &'a roxmltree::Document<'a>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

/// Find all descendant elements with the given local name and namespace.
pub fn find_elements_ns<'a>(
    doc: &'a roxmltree::Document<'a>,
    ns: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'a>> {
    doc.descendants()
        .filter(|n| {
            n.is_element()
                && n.tag_name().name() == local_name
                && n.tag_name().namespace().unwrap_or("") == ns
        })
        .collect()
}

/// Find a direct child element by local name.
pub fn find_child_element<'a>(
    parent: roxmltree::Node<'a, 'a>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

/// Find a descendant (below `node`) by local name.
pub fn find_descendant<'a>(
    node: roxmltree::Node<'a, 'a>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

/// Collect all text content from a node and its descendants.
pub fn collect_text_content(node: roxmltree::Node<'_, '_>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        if descendant.is_text() {
            if let Some(t) = descendant.text() {
                text.push_str(t);
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulriksdal_core::ns;

    const XML: &str = r#"<root xmlns:a="urn:a" xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
        <a:KeyInfo>decoy</a:KeyInfo>
        <ds:KeyInfo><Inner>one<b>two</b></Inner></ds:KeyInfo>
    </root>"#;

    #[test]
    fn test_local_name_lookup_ignores_namespace() {
        let doc = parse(XML).unwrap();
        let ki = find_element(&doc, "KeyInfo").unwrap();
        assert_eq!(ki.tag_name().namespace(), Some("urn:a"));
    }

    #[test]
    fn test_namespace_lookup() {
        let doc = parse(XML).unwrap();
        let found = find_elements_ns(&doc, ns::DSIG, ns::node::KEY_INFO);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag_name().namespace(), Some(ns::DSIG));
        assert!(find_elements_ns(&doc, ns::ENC, ns::node::KEY_INFO).is_empty());
    }

    #[test]
    fn test_children_and_text() {
        let doc = parse(XML).unwrap();
        let ki = find_elements_ns(&doc, ns::DSIG, ns::node::KEY_INFO)[0];
        let inner = find_child_element(ki, "Inner").unwrap();
        assert!(find_child_element(ki, "b").is_none());
        assert!(find_descendant(ki, "b").is_some());
        assert_eq!(collect_text_content(inner), "onetwo");
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse("<unclosed>"), Err(Error::XmlParse(_))));
    }
}
