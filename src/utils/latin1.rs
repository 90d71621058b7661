//! ISO-8859-1 transcoding for guide documents.
//!
//! The guide is declared as ISO-8859-1. Every code point up to U+00FF maps to a
//! single byte; anything above is written as a numeric character reference,
//! which keeps the document well formed for any XML consumer.

use std::borrow::Cow;

/// Encode markup as ISO-8859-1, replacing unrepresentable characters with `&#N;`
pub fn encode(markup: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(markup.len());
    for ch in markup.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) => bytes.push(byte),
            Err(_) => bytes.extend_from_slice(format!("&#{};", u32::from(ch)).as_bytes()),
        }
    }
    bytes
}

/// Decode ISO-8859-1 bytes
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Decode a guide document according to its XML declaration.
///
/// Documents declaring UTF-8 are read as UTF-8 (lossily); everything else is
/// treated as ISO-8859-1, which is what this crate writes.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    if declares_utf8(bytes) {
        String::from_utf8_lossy(bytes)
    } else {
        Cow::Owned(decode(bytes))
    }
}

fn declares_utf8(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(128)];
    let Some(end) = head.windows(2).position(|w| w == b"?>") else {
        // No declaration: XML defaults to UTF-8
        return !head.starts_with(b"<?xml");
    };
    let declaration = String::from_utf8_lossy(&head[..end]).to_ascii_lowercase();
    declaration.contains("utf-8") || declaration.contains("utf8")
}
