// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Parsed XML tree used by the redactor
// Thin layer over `xot`: local-name access, in-place mutation and serialization

use std::collections::HashMap;

use xot::output::{NoopNormalizer, Output, TokenSerializeParameters};
use xot::{NameId, NamespaceId, Node, PrefixId, SpanInfoKey, Xot};

use super::config::Formatting;
use super::error::{RedactError, Result};

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// A document parsed for one redaction call
pub struct Document {
    xot: Xot,
    root: Node,
    /// Source text of text nodes that contain CDATA sections, written back verbatim
    raw_text: HashMap<Node, String>,
}

impl Document {
    /// Parse text into a tree, dropping insignificant whitespace-only text nodes
    pub fn parse(text: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let (root, spans) = xot
            .parse_with_span_info(text)
            .map_err(|e| RedactError::Parse(e.to_string()))?;

        let raw_text = xot
            .descendants(root)
            .filter(|node| xot.text_str(*node).is_some())
            .filter_map(|node| {
                let span = spans.get(SpanInfoKey::Text(node))?;
                cdata_source(text, span.start, span.end).map(|raw| (node, raw.to_string()))
            })
            .collect();

        let mut document = Self {
            xot,
            root,
            raw_text,
        };
        document.strip_insignificant_whitespace()?;
        Ok(document)
    }

    fn strip_insignificant_whitespace(&mut self) -> Result<()> {
        let blank: Vec<Node> = self
            .xot
            .descendants(self.root)
            .filter(|node| !self.raw_text.contains_key(node))
            .filter(|node| {
                self.xot
                    .text_str(*node)
                    .is_some_and(|text| text.chars().all(is_xml_whitespace))
            })
            .filter(|node| !self.preserves_space(*node))
            .collect();

        for node in blank {
            self.xot
                .remove(node)
                .map_err(|e| RedactError::Parse(e.to_string()))?;
        }
        Ok(())
    }

    /// Whether the nearest `xml:space` in scope of `node` is `preserve`
    fn preserves_space(&self, node: Node) -> bool {
        let xml_space = self.xot.xml_space_name();
        self.xot
            .ancestors(node)
            .find_map(|ancestor| self.xot.get_attribute(ancestor, xml_space))
            .is_some_and(|value| value == "preserve")
    }

    /// The single top-level element
    pub fn document_element(&self) -> Result<Node> {
        self.xot
            .document_element(self.root)
            .map_err(|e| RedactError::Parse(e.to_string()))
    }

    pub fn is_element(&self, node: Node) -> bool {
        self.xot.element(node).is_some()
    }

    /// Unqualified name of an element (empty for other nodes)
    pub fn local_name(&self, node: Node) -> &str {
        match self.xot.element(node) {
            Some(element) => self.name_local_str(element.name()),
            None => "",
        }
    }

    /// Unqualified part of an attribute or element name
    pub fn name_local_str(&self, name: NameId) -> &str {
        self.xot.name_ns_str(name).0
    }

    pub fn child_elements(&self, node: Node) -> Vec<Node> {
        self.xot
            .children(node)
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn has_child_elements(&self, node: Node) -> bool {
        self.xot.children(node).any(|child| self.is_element(child))
    }

    /// Attribute names and current values, in document order
    pub fn attributes(&self, node: Node) -> Vec<(NameId, String)> {
        self.xot
            .attributes(node)
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    pub fn set_attribute(&mut self, node: Node, name: NameId, value: &str) {
        self.xot.attributes_mut(node).insert(name, value.to_string());
    }

    /// Concatenated text of all descendants
    pub fn string_value(&self, node: Node) -> String {
        self.xot
            .descendants(node)
            .filter_map(|descendant| self.xot.text_str(descendant))
            .collect()
    }

    /// Remove every child: text, elements, comments and processing instructions
    pub fn clear_children(&mut self, node: Node) -> Result<()> {
        if !self.raw_text.is_empty() {
            let removed: Vec<Node> = self
                .xot
                .descendants(node)
                .filter(|descendant| *descendant != node)
                .collect();
            for descendant in removed {
                self.raw_text.remove(&descendant);
            }
        }

        let children: Vec<Node> = self.xot.children(node).collect();
        for child in children {
            self.xot
                .remove(child)
                .map_err(|e| RedactError::Traversal(e.to_string()))?;
        }
        Ok(())
    }

    pub fn append_text(&mut self, node: Node, text: &str) -> Result<()> {
        let text_node = self.xot.new_text(text);
        self.xot
            .append(node, text_node)
            .map_err(|e| RedactError::Traversal(e.to_string()))
    }

    /// Enclosing element, `None` at the document element
    pub fn parent_element(&self, node: Node) -> Option<Node> {
        self.xot
            .parent(node)
            .filter(|parent| self.is_element(*parent))
    }

    /// Namespace declarations written on this element
    pub fn namespace_declarations(&self, node: Node) -> Vec<(PrefixId, NamespaceId)> {
        self.xot
            .namespaces(node)
            .iter()
            .map(|(prefix, namespace)| (prefix.to_owned(), namespace.to_owned()))
            .collect()
    }

    pub fn namespace_uri(&self, namespace: NamespaceId) -> &str {
        self.xot.namespace_str(namespace)
    }

    /// Whether `prefix` is the empty (default namespace) prefix
    pub fn is_default_prefix(&self, prefix: PrefixId) -> bool {
        prefix == self.xot.empty_prefix()
    }

    /// Namespace `prefix` resolves to at `node`
    pub fn resolve_prefix(&self, node: Node, prefix: PrefixId) -> Option<NamespaceId> {
        self.xot.namespace_for_prefix(node, prefix)
    }

    /// Declare `uri` on `node` under `preferred`, or a numbered variant
    ///
    /// The prefix chosen is not declared on `visible_from` or any of its
    /// ancestors, so it still resolves to `uri` at `visible_from` when `node`
    /// is one of those ancestors.
    pub fn declare_namespace(
        &mut self,
        node: Node,
        visible_from: Node,
        preferred: &str,
        uri: &str,
    ) -> NamespaceId {
        let namespace = self.xot.add_namespace(uri);

        let mut candidate = preferred.to_string();
        let mut suffix = 0;
        let prefix = loop {
            let prefix = self.xot.add_prefix(&candidate);
            let taken = self
                .xot
                .ancestors(visible_from)
                .any(|ancestor| self.xot.namespaces(ancestor).get(prefix).is_some());
            if !taken {
                break prefix;
            }
            suffix += 1;
            candidate = format!("{}{}", preferred, suffix);
        };

        self.xot.namespaces_mut(node).insert(prefix, namespace);
        namespace
    }

    pub fn namespaced_name(&mut self, local: &str, namespace: NamespaceId) -> NameId {
        self.xot.add_name_ns(local, namespace)
    }

    /// Serialize the whole document
    pub fn serialize(&self, formatting: Formatting) -> Result<String> {
        let parameters = match formatting {
            Formatting::Compact => xot::output::xml::Parameters::default(),
            Formatting::Indented => xot::output::xml::Parameters {
                indentation: Some(Default::default()),
                ..Default::default()
            },
        };
        let output = self
            .xot
            .serialize_xml_string(parameters, self.root)
            .map_err(|e| RedactError::Serialize(e.to_string()))?;

        if self.raw_text.is_empty() {
            return Ok(output);
        }
        // xot writes CDATA content as escaped text; the tree already serialized
        // once above, so rendering the tokens again cannot fail
        Ok(self.render_with_raw_text(formatting))
    }

    fn render_with_raw_text(&self, formatting: Formatting) -> String {
        let mut out = String::new();
        match formatting {
            Formatting::Compact => {
                let tokens =
                    self.xot
                        .tokens(self.root, TokenSerializeParameters::default(), NoopNormalizer);
                for (node, output, token) in tokens {
                    if token.space {
                        out.push(' ');
                    }
                    out.push_str(self.token_text(node, &output, &token.text));
                }
            }
            Formatting::Indented => {
                let tokens = self.xot.pretty_tokens(
                    self.root,
                    TokenSerializeParameters::default(),
                    &[],
                    NoopNormalizer,
                );
                for (node, output, token) in tokens {
                    out.push_str(&"  ".repeat(token.indentation));
                    if token.space {
                        out.push(' ');
                    }
                    out.push_str(self.token_text(node, &output, &token.text));
                    if token.newline {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }

    fn token_text<'a>(&'a self, node: Node, output: &Output, rendered: &'a str) -> &'a str {
        match (output, self.raw_text.get(&node)) {
            (Output::Text(_), Some(raw)) => raw,
            _ => rendered,
        }
    }
}

/// Source of a text node when it contains a CDATA section
///
/// Spans of CDATA text exclude the section markers, so the range is widened
/// over a marker directly before or after it.
fn cdata_source(text: &str, start: usize, end: usize) -> Option<&str> {
    let start = match text.get(..start) {
        Some(before) if before.ends_with(CDATA_OPEN) => start - CDATA_OPEN.len(),
        _ => start,
    };
    let end = match text.get(end..) {
        Some(after) if after.starts_with(CDATA_CLOSE) => end + CDATA_CLOSE.len(),
        _ => end,
    };
    text.get(start..end)
        .filter(|source| source.contains(CDATA_OPEN))
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
