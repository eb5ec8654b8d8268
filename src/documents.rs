//! Order-preserving XML tokenizer
//!
//! Turns raw text into a generic node tree: elements keep their raw
//! qualified names and attributes in document order, and text, comments and
//! other markup stay in place as pseudo-nodes so later stages can skip them.

use crate::error::{Error, Result};
use crate::limits::Limits;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One node of the generic XML tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// An element
    Element(Element),
    /// Character data (text or CDATA)
    Text(String),
    /// A comment
    Comment(String),
    /// Processing instructions, doctype and other markup
    Other,
}

impl XmlNode {
    /// The element, if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// XML element with its raw (possibly prefixed) name
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Raw qualified tag name, e.g. `xs:element`
    pub name: String,
    /// Attributes in document order, keyed by raw qualified name
    pub attributes: IndexMap<String, String>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by its raw name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Iterate over child elements, skipping pseudo-nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Concatenated text and CDATA of the direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First direct text or CDATA child that is not blank, trimmed
    pub fn first_text(&self) -> Option<&str> {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.trim()),
                _ => None,
            })
            .find(|t| !t.is_empty())
    }
}

impl Drop for Element {
    // Flatten the subtree first so deep documents are not dropped recursively.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let XmlNode::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// Parsed XML document
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Top-level nodes in document order
    pub nodes: Vec<XmlNode>,
}

impl Document {
    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing depth and attribute limits
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut doc = Document::default();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::Xml(format!(
                    "Error parsing XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(e) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    stack.push(Self::parse_element(&e, limits)?);
                }
                Event::Empty(e) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    let element = Self::parse_element(&e, limits)?;
                    Self::attach(&mut doc, &mut stack, XmlNode::Element(element));
                }
                Event::End(_) => {
                    let current = stack.pop().ok_or_else(|| {
                        Error::Xml(format!(
                            "Unexpected end tag at position {}",
                            reader.buffer_position()
                        ))
                    })?;
                    Self::attach(&mut doc, &mut stack, XmlNode::Element(current));
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?
                        .into_owned();
                    Self::attach(&mut doc, &mut stack, XmlNode::Text(text));
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| Error::Xml(format!("Invalid CDATA: {}", e)))?
                        .to_string();
                    Self::attach(&mut doc, &mut stack, XmlNode::Text(text));
                }
                Event::Comment(e) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| Error::Xml(format!("Invalid comment: {}", e)))?
                        .to_string();
                    Self::attach(&mut doc, &mut stack, XmlNode::Comment(text));
                }
                Event::Eof => break,
                _ => Self::attach(&mut doc, &mut stack, XmlNode::Other),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Xml(format!(
                "Unclosed element '{}' at end of input",
                open.name
            )));
        }

        Ok(doc)
    }

    fn attach(doc: &mut Document, stack: &mut [Element], node: XmlNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => doc.nodes.push(node),
        }
    }

    fn parse_element(start: &BytesStart, limits: &Limits) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut element = Element::new(name);

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .into_owned();

            element.attributes.insert(attr_name, attr_value);
        }
        limits.check_attributes(element.attributes.len())?;

        Ok(element)
    }

    /// Iterate over the top-level elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(XmlNode::as_element)
    }
}
