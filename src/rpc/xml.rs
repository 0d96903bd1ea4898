// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal XML element tree for the hub's response profile.
//!
//! The hub emits a small, closed markup dialect: an optional declaration,
//! nested elements without namespaces, and plain text content. This parser
//! covers exactly that profile. Attributes are accepted and discarded,
//! comments are skipped, and the five predefined entities are decoded in
//! text content. Anything else (CDATA, processing instructions inside the
//! body, doctype) is rejected as malformed.

use crate::error::ParseError;

/// Nesting limit; the deepest documented response shape is 14 levels.
const MAX_DEPTH: usize = 32;

/// One element of a parsed response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Parses a complete document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the document is not well formed.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Parser { input, pos: 0 }.parse_document()
    }

    /// The element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element's own text content, surrounding whitespace trimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// The first child element with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// The first child element of any name.
    #[must_use]
    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// Number of child elements.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Descends along a chain of first-matching child names.
    ///
    /// `root.path(&["params", "param", "value"])` is the navigation the
    /// response accessors are built from.
    #[must_use]
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        let mut current = self;
        for name in names {
            current = current.child(name)?;
        }
        Some(current)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn parse_document(mut self) -> Result<Element, ParseError> {
        self.skip_misc()?;
        let root = self.parse_element(0)?;
        self.skip_misc()?;
        if self.pos < self.input.len() {
            return Err(ParseError::Markup {
                offset: self.pos,
                message: "content after document root",
            });
        }
        Ok(root)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Skips whitespace, XML declarations and comments between elements.
    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.rest().starts_with("<!--") {
                self.skip_past("-->")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_past(&mut self, marker: &str) -> Result<(), ParseError> {
        match self.rest().find(marker) {
            Some(i) => {
                self.pos += i + marker.len();
                Ok(())
            }
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'>' || b == b'/' || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ParseError::Markup {
                offset: start,
                message: "expected element name",
            });
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// Consumes the remainder of an open tag, discarding attributes.
    /// Returns whether the tag was self-closing.
    fn skip_to_tag_end(&mut self) -> Result<bool, ParseError> {
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof),
                Some(b'>') => {
                    self.pos += 1;
                    return Ok(false);
                }
                Some(b'/') if self.rest().starts_with("/>") => {
                    self.pos += 2;
                    return Ok(true);
                }
                Some(quote @ (b'"' | b'\'')) => {
                    self.pos += 1;
                    match self.rest().find(quote as char) {
                        Some(i) => self.pos += i + 1,
                        None => return Err(ParseError::UnexpectedEof),
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_element(&mut self, depth: usize) -> Result<Element, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::Markup {
                offset: self.pos,
                message: "markup nested too deeply",
            });
        }
        if self.peek() != Some(b'<') {
            return Err(ParseError::Markup {
                offset: self.pos,
                message: "expected element",
            });
        }
        self.pos += 1;
        let name = self.parse_name()?;
        let self_closing = self.skip_to_tag_end()?;

        let mut element = Element {
            name,
            children: Vec::new(),
            text: String::new(),
        };
        if self_closing {
            return Ok(element);
        }

        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof),
                Some(b'<') if self.rest().starts_with("</") => {
                    self.pos += 2;
                    let closing = self.parse_name()?;
                    if closing != element.name {
                        return Err(ParseError::MismatchedTag {
                            expected: element.name,
                            found: closing,
                        });
                    }
                    self.skip_whitespace();
                    if self.peek() != Some(b'>') {
                        return Err(ParseError::Markup {
                            offset: self.pos,
                            message: "expected '>' after closing tag name",
                        });
                    }
                    self.pos += 1;
                    return Ok(element);
                }
                Some(b'<') if self.rest().starts_with("<!--") => {
                    self.skip_past("-->")?;
                }
                Some(b'<') if self.rest().starts_with("<!") || self.rest().starts_with("<?") => {
                    return Err(ParseError::Markup {
                        offset: self.pos,
                        message: "unsupported markup in element content",
                    });
                }
                Some(b'<') => {
                    let child = self.parse_element(depth + 1)?;
                    element.children.push(child);
                }
                Some(_) => {
                    let run_end = self
                        .rest()
                        .find('<')
                        .map_or(self.input.len(), |i| self.pos + i);
                    let run = &self.input[self.pos..run_end];
                    element.text.push_str(&decode_entities(run));
                    self.pos = run_end;
                }
            }
        }
    }
}

/// Decodes the five predefined entities; `&amp;` last so double-encoded
/// text survives one level of decoding.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_line_document() {
        let root = Element::parse(
            "<methodResponse><params><param><value></value></param></params></methodResponse>",
        )
        .unwrap();
        assert_eq!(root.name(), "methodResponse");
        let value = root.path(&["params", "param", "value"]).unwrap();
        assert_eq!(value.text(), "");
    }

    #[test]
    fn parses_declaration_and_whitespace() {
        let doc = "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n<methodResponse>\n  <params>\n    <param><value><double>21.5</double></value></param>\n  </params>\n</methodResponse>\n";
        let root = Element::parse(doc).unwrap();
        let double = root.path(&["params", "param", "value", "double"]).unwrap();
        assert_eq!(double.text(), "21.5");
    }

    #[test]
    fn repeated_children_in_order() {
        let root = Element::parse(
            "<struct><member><name>A</name></member><member><name>B</name></member></struct>",
        )
        .unwrap();
        let names: Vec<&str> = root
            .children("member")
            .map(|m| m.child("name").unwrap().text())
            .collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(root.child_count(), 2);
    }

    #[test]
    fn self_closing_element() {
        let root = Element::parse("<params><param/></params>").unwrap();
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.first_child().unwrap().name(), "param");
    }

    #[test]
    fn attributes_are_discarded() {
        let root = Element::parse("<value kind=\"x>y\"><i4>-3</i4></value>").unwrap();
        assert_eq!(root.child("i4").unwrap().text(), "-3");
    }

    #[test]
    fn entities_decoded_in_text() {
        let root = Element::parse("<value>a &lt; b &amp;&amp; c &gt; d</value>").unwrap();
        assert_eq!(root.text(), "a < b && c > d");
    }

    #[test]
    fn comment_inside_element_skipped() {
        let root = Element::parse("<value><!-- note --><i4>1</i4></value>").unwrap();
        assert_eq!(root.child("i4").unwrap().text(), "1");
    }

    #[test]
    fn mismatched_closing_tag_fails() {
        let err = Element::parse("<value><i4>1</boolean></value>").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedTag { .. }));
    }

    #[test]
    fn truncated_document_fails() {
        let err = Element::parse("<methodResponse><params>").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEof);
    }

    #[test]
    fn trailing_content_fails() {
        let err = Element::parse("<a></a><b></b>").unwrap_err();
        assert!(matches!(err, ParseError::Markup { .. }));
    }

    #[test]
    fn plain_text_document_fails() {
        assert!(Element::parse("not xml at all").is_err());
    }

    #[test]
    fn deep_nesting_rejected() {
        let mut doc = String::new();
        for _ in 0..40 {
            doc.push_str("<a>");
        }
        for _ in 0..40 {
            doc.push_str("</a>");
        }
        let err = Element::parse(&doc).unwrap_err();
        assert!(matches!(err, ParseError::Markup { .. }));
    }

    #[test]
    fn path_missing_step_is_none() {
        let root = Element::parse("<methodResponse><params/></methodResponse>").unwrap();
        assert!(root.path(&["params", "param"]).is_none());
        assert!(root.path(&["fault"]).is_none());
    }
}
