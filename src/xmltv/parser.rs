//! Quick-XML based reader producing an owned element tree
//!
//! Unlike a field extracting parser this keeps every node of the document so
//! that cached programmes can be written back without loss.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::element::{XmlElement, XmlNode};
use crate::errors::{XmlError, XmlResult};

/// Parse a complete document and return its root element
pub fn parse_document(content: &str) -> XmlResult<XmlElement> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(start_element(e, position)?);
            }

            Ok(Event::Empty(ref e)) => {
                let element = start_element(e, position)?;
                attach(&mut stack, &mut root, element)?;
            }

            Ok(Event::End(ref e)) => {
                let qname = e.name();
                let name = utf8(qname.as_ref(), position)?;
                let mut element = stack.pop().ok_or_else(|| XmlError::Unbalanced {
                    element: name.to_string(),
                })?;
                if element.name != name {
                    return Err(XmlError::Unbalanced { element: element.name });
                }
                drop_layout_whitespace(&mut element);
                attach(&mut stack, &mut root, element)?;
            }

            Ok(Event::Text(e)) => {
                let raw = utf8(&e, position)?;
                let text = unescape(raw).map_err(|err| XmlError::Escape(err.to_string()))?;
                push_text(&mut stack, &text);
            }

            Ok(Event::GeneralRef(e)) => {
                let name = utf8(&e, position)?;
                let reference = format!("&{name};");
                let text = unescape(&reference).map_err(|err| XmlError::Escape(err.to_string()))?;
                push_text(&mut stack, &text);
            }

            Ok(Event::CData(e)) => {
                let text = utf8(&e, position)?;
                push_text(&mut stack, text);
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(XmlError::Parse {
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                });
            }

            // Declaration, doctype, comments and processing instructions
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unbalanced { element: open.name });
    }

    root.ok_or_else(|| XmlError::Parse {
        position: 0,
        message: "document has no root element".to_string(),
    })
}

fn start_element(e: &BytesStart<'_>, position: u64) -> XmlResult<XmlElement> {
    let mut element = XmlElement::new(utf8(e.name().as_ref(), position)?);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Parse {
            position,
            message: err.to_string(),
        })?;
        let key = utf8(attr.key.as_ref(), position)?;
        let raw = utf8(&attr.value, position)?;
        let value = unescape(raw).map_err(|err| XmlError::Escape(err.to_string()))?;
        element.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(XmlError::Unbalanced { element: element.name });
        }
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    // Text outside the root element is layout only
    let Some(current) = stack.last_mut() else {
        return;
    };
    if let Some(XmlNode::Text(existing)) = current.children.last_mut() {
        existing.push_str(text);
    } else if !text.is_empty() {
        current.children.push(XmlNode::Text(text.to_string()));
    }
}

/// Indentation between child elements is not content
fn drop_layout_whitespace(element: &mut XmlElement) {
    let has_elements = element.children.iter().any(|node| matches!(node, XmlNode::Element(_)));
    if has_elements {
        element
            .children
            .retain(|node| !matches!(node, XmlNode::Text(text) if text.trim().is_empty()));
    }
}

fn utf8(bytes: &[u8], position: u64) -> XmlResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| XmlError::Parse {
        position,
        message: format!("Invalid UTF-8: {e}"),
    })
}
