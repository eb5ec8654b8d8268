//! Reading a single XML element as a schema tag

use crate::documents::{Element, XmlNode};
use crate::names::strip_schema_prefix;
use indexmap::IndexMap;

/// Kind of the annotation wrapper element
pub const ANNOTATION: &str = "annotation";

/// Kind of the documentation element inside an annotation
pub const DOCUMENTATION: &str = "documentation";

/// What the tree builder needs to know about one element
#[derive(Debug, Clone, PartialEq)]
pub struct TagInfo {
    /// Tag name without `xs:`/`xsd:` prefix
    pub kind: String,
    /// Attribute values, keys untouched
    pub attributes: IndexMap<String, String>,
    /// Trimmed text of the first annotation/documentation child
    pub documentation: Option<String>,
}

/// Read a node; `None` means it is text, a comment or other non-element markup
pub fn read_tag(node: &XmlNode) -> Option<TagInfo> {
    node.as_element().map(read_element)
}

/// Read an element
pub fn read_element(element: &Element) -> TagInfo {
    TagInfo {
        kind: tag_kind(element).to_string(),
        attributes: element.attributes.clone(),
        documentation: extract_documentation(element),
    }
}

/// Local tag name of an element
pub fn tag_kind(element: &Element) -> &str {
    strip_schema_prefix(&element.name)
}

/// Documentation text one annotation level below `element`
///
/// Only the first `annotation` child is consulted; within it the first
/// `documentation` child with a non-blank text node wins. Text after inline
/// markup or a comment is not appended.
pub fn extract_documentation(element: &Element) -> Option<String> {
    let annotation = element
        .child_elements()
        .find(|c| tag_kind(c) == ANNOTATION)?;

    annotation
        .child_elements()
        .filter(|c| tag_kind(c) == DOCUMENTATION)
        .find_map(Element::first_text)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn root(xml: &str) -> XmlNode {
        Document::from_string(xml).unwrap().nodes.remove(0)
    }

    #[test]
    fn test_read_tag_strips_schema_prefix() {
        let tag = read_tag(&root(r#"<xsd:element name="a" xml:lang="en"/>"#)).unwrap();
        assert_eq!(tag.kind, "element");
        assert_eq!(tag.attributes.get("name").map(String::as_str), Some("a"));
        assert_eq!(tag.attributes.get("xml:lang").map(String::as_str), Some("en"));
        assert!(tag.documentation.is_none());
    }

    #[test]
    fn test_read_tag_keeps_foreign_prefix() {
        let tag = read_tag(&root("<tns:thing/>")).unwrap();
        assert_eq!(tag.kind, "tns:thing");
    }

    #[test]
    fn test_non_elements_are_skipped() {
        assert!(read_tag(&XmlNode::Text("x".to_string())).is_none());
        assert!(read_tag(&XmlNode::Comment("x".to_string())).is_none());
        assert!(read_tag(&XmlNode::Other).is_none());
    }

    #[test]
    fn test_documentation_trimmed() {
        let xml = r#"<xs:element name="a">
            <xs:annotation>
                <xs:appinfo>ignored</xs:appinfo>
                <xs:documentation>
                    The a element.
                </xs:documentation>
            </xs:annotation>
        </xs:element>"#;
        let tag = read_tag(&root(xml)).unwrap();
        assert_eq!(tag.documentation.as_deref(), Some("The a element."));
    }

    #[test]
    fn test_documentation_skips_blank_entries() {
        let xml = r#"<xs:element name="a"><xs:annotation>
            <xs:documentation>  </xs:documentation>
            <xs:documentation><![CDATA[Second]]></xs:documentation>
        </xs:annotation></xs:element>"#;
        let tag = read_tag(&root(xml)).unwrap();
        assert_eq!(tag.documentation.as_deref(), Some("Second"));
    }

    #[test]
    fn test_documentation_stops_at_inline_markup() {
        let xml = r#"<xs:element name="a"><xs:annotation>
            <xs:documentation>Line one<br/>Line two</xs:documentation>
        </xs:annotation></xs:element>"#;
        let tag = read_tag(&root(xml)).unwrap();
        assert_eq!(tag.documentation.as_deref(), Some("Line one"));
    }

    #[test]
    fn test_documentation_stops_at_comment() {
        let xml = r#"<xs:element name="a"><xs:annotation>
            <xs:documentation>Part A<!-- c -->Part B</xs:documentation>
        </xs:annotation></xs:element>"#;
        let tag = read_tag(&root(xml)).unwrap();
        assert_eq!(tag.documentation.as_deref(), Some("Part A"));
    }

    #[test]
    fn test_documentation_not_searched_deeper() {
        let xml = r#"<xs:complexType name="t"><xs:sequence>
            <xs:annotation><xs:documentation>inner</xs:documentation></xs:annotation>
        </xs:sequence></xs:complexType>"#;
        let tag = read_tag(&root(xml)).unwrap();
        assert!(tag.documentation.is_none());
    }
}
