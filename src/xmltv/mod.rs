//! XMLTV document model, reader and writer

pub mod document;
pub mod element;
pub mod parser;

pub use document::GuideDocument;
pub use element::{XmlElement, XmlNode};
pub use parser::parse_document;
