//! Minimal XML document tree and its serialization
//!
//! Export plugins build an [`XmlElement`] tree and hand it to
//! [`XmlElement::to_document_bytes`]. Output is UTF-8 with a declaration and
//! two-space indentation; childless elements are written self-closing.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{xml_error, Result};

/// Child node of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Element containing only text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_comment(&mut self, comment: impl Into<String>) {
        self.children.push(XmlNode::Comment(comment.into()));
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// All child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Comments directly inside this element
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Comment(comment) => Some(comment.as_str()),
            _ => None,
        })
    }

    /// Concatenated text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All descendant elements with the given name, depth first
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for element in self.elements() {
            if element.name == name {
                found.push(element);
            }
            element.collect_named(name, found);
        }
    }

    /// Serialize as a standalone UTF-8 document
    pub fn to_document_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        self.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(xml_error);
        }

        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_to(writer)?,
                XmlNode::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(xml_error)?,
                XmlNode::Comment(comment) => {
                    // "--" is not allowed inside comments
                    let content = format!(" {} ", comment.replace("--", "- -"));
                    writer
                        .write_event(Event::Comment(BytesText::from_escaped(content)))
                        .map_err(xml_error)?
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_layout() {
        let mut root = XmlElement::new("device").with_attr("type", "DMXDevice");
        root.push(XmlElement::new("model").with_text("PAR & Co"));
        let mut functions = XmlElement::new("functions");
        functions.push_comment("(1, 1)");
        functions.push(XmlElement::new("dimmer").with_attr("dmxchannel", 0));
        root.push(functions);

        let xml = String::from_utf8(root.to_document_bytes().unwrap()).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<device type=\"DMXDevice\">\n  \
<model>PAR &amp; Co</model>\n  \
<functions>\n    \
<!-- (1, 1) -->\n    \
<dimmer dmxchannel=\"0\"/>\n  \
</functions>\n\
</device>";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut element = XmlElement::new("matrix").with_attr("rows", 4);
        element.set_attr("rows", 8);
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attr("rows"), Some("8"));
    }

    #[test]
    fn test_queries() {
        let mut root = XmlElement::new("root");
        let mut outer = XmlElement::new("rgb");
        outer.push(XmlElement::new("red"));
        root.push(outer);
        root.push(XmlElement::new("red"));

        assert_eq!(root.children_named("red").count(), 1);
        assert_eq!(root.descendants_named("red").len(), 2);
        assert!(root.child("rgb").is_some());
    }
}
