//! Owned XML element tree used for both freshly rendered and cached programmes.
//!
//! Cached programmes are carried forward verbatim, so the tree keeps every
//! element, attribute and text node it was parsed with, in order.

use quick_xml::escape::{escape, partial_escape};

/// Indentation unit for pretty printing
const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Add an attribute only when a value is present
    pub fn with_optional_attr<K: Into<String>>(self, key: K, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_attr(key, value),
            None => self,
        }
    }

    pub fn with_text<T: Into<String>>(mut self, text: T) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite an attribute in place, or append it when absent
    pub fn set_attr<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Serialize with two-space indentation starting at `depth`.
    ///
    /// Elements holding text are written inline so text content is never
    /// altered by indentation.
    pub fn write_pretty(&self, out: &mut String, depth: usize) {
        push_indent(out, depth);
        self.write_inline(out, depth, true);
        out.push('\n');
    }

    fn write_inline(&self, out: &mut String, depth: usize, pretty: bool) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let has_text = self.children.iter().any(|node| matches!(node, XmlNode::Text(_)));
        if pretty && !has_text {
            out.push('\n');
            for child in self.child_elements() {
                child.write_pretty(out, depth + 1);
            }
            push_indent(out, depth);
        } else {
            for node in &self.children {
                match node {
                    XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
                    XmlNode::Element(child) => child.write_inline(out, depth, false),
                }
            }
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialize as a single pretty-printed fragment
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
