// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Masking of element bodies and attribute values

use xot::{NameId, NamespaceId, Node};

use super::document::Document;
use super::error::Result;

/// XML Schema instance namespace carrying the `nil` marker
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSI_PREFIX: &str = "xsi";
const NIL: &str = "nil";

/// Writes masks into a document according to the configured mask
///
/// `mask == None` selects the structural null for elements and an empty
/// string for attributes; attributes never carry the null marker.
pub struct ValueMasker<'m> {
    mask: Option<&'m str>,
}

impl<'m> ValueMasker<'m> {
    pub fn new(mask: Option<&'m str>) -> Self {
        Self { mask }
    }

    /// Text written into masked attributes
    pub fn attribute_text(&self) -> &'m str {
        self.mask.unwrap_or_default()
    }

    /// Overwrite an attribute value in place
    pub fn mask_attribute(&self, document: &mut Document, element: Node, name: NameId) {
        document.set_attribute(element, name, self.attribute_text());
    }

    /// Replace the whole body of an element (text, children, comments) with the mask
    ///
    /// With the structural null the element keeps its own attributes and gains
    /// `xsi:nil="true"`; it is not rebuilt as a bare nil element.
    pub fn mask_element(&self, document: &mut Document, element: Node) -> Result<()> {
        document.clear_children(element)?;

        match self.mask {
            Some(mask) => {
                if !mask.is_empty() {
                    document.append_text(element, mask)?;
                }
            }
            None => {
                let xsi = get_or_add_xsi(document, element);
                let nil = document.namespaced_name(NIL, xsi);
                document.set_attribute(element, nil, "true");
            }
        }
        Ok(())
    }
}

/// Find the schema-instance namespace in scope of `element`, declaring it on the document element if absent
///
/// The URI is matched case-insensitively so an existing declaration is reused
/// rather than duplicated. A declaration only counts when its prefix is not
/// rebound between the declaring element and `element`.
pub fn get_or_add_xsi(document: &mut Document, element: Node) -> NamespaceId {
    let mut current = element;
    loop {
        let declared = document
            .namespace_declarations(current)
            .into_iter()
            .find(|(prefix, namespace)| {
                !document.is_default_prefix(*prefix)
                    && document
                        .namespace_uri(*namespace)
                        .eq_ignore_ascii_case(XSI_NAMESPACE)
                    && document.resolve_prefix(element, *prefix) == Some(*namespace)
            });
        if let Some((_, namespace)) = declared {
            return namespace;
        }

        match document.parent_element(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    tracing::debug!("declaring schema-instance namespace on document element");
    document.declare_namespace(current, element, XSI_PREFIX, XSI_NAMESPACE)
}
