// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Depth-first rule evaluation over a parsed document
// Uses an explicit work stack so nesting depth never grows the call stack

use xot::{NameId, Node};

use super::config::ComplexTypeHandling;
use super::document::Document;
use super::error::Result;
use super::masking::ValueMasker;
use super::rules::{FieldRef, RuleSet};

/// What happens to an element's body once its own decision is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Visit the child elements
    Descend,
    /// Replace the body with the mask
    Mask,
    /// Nothing to do
    Keep,
}

/// Decide how a matched (or unmatched) element is handled
pub fn resolve_complex_type(
    redacting: bool,
    has_child_elements: bool,
    handling: ComplexTypeHandling,
) -> Disposition {
    match (redacting, has_child_elements) {
        (true, true) if handling == ComplexTypeHandling::RedactDescendants => Disposition::Descend,
        (true, _) => Disposition::Mask,
        (false, true) => Disposition::Descend,
        (false, false) => Disposition::Keep,
    }
}

enum Work {
    /// Apply attribute rules and the body decision to one element
    Element { node: Node, redacting: bool },
    /// Decide the next member of a sibling group
    Siblings {
        group: Vec<Node>,
        next: usize,
        redacting: bool,
    },
}

/// Walks a document once, masking whatever the rules select
///
/// A redaction decision is inherited by every descendant and never reversed.
pub struct TreeWalker<'r> {
    rules: &'r RuleSet,
    masker: ValueMasker<'r>,
    handling: ComplexTypeHandling,
}

impl<'r> TreeWalker<'r> {
    pub fn new(rules: &'r RuleSet, mask: Option<&'r str>, handling: ComplexTypeHandling) -> Self {
        Self {
            rules,
            masker: ValueMasker::new(mask),
            handling,
        }
    }

    pub fn walk(&self, document: &mut Document) -> Result<()> {
        let root = document.document_element()?;
        let mut stack = vec![Work::Siblings {
            group: vec![root],
            next: 0,
            redacting: false,
        }];

        while let Some(work) = stack.pop() {
            match work {
                Work::Siblings {
                    group,
                    next,
                    redacting,
                } => {
                    let Some(&node) = group.get(next) else {
                        continue;
                    };
                    let inherited = redacting || self.element_matches(document, node, &group);
                    stack.push(Work::Siblings {
                        group,
                        next: next + 1,
                        redacting,
                    });
                    stack.push(Work::Element {
                        node,
                        redacting: inherited,
                    });
                }
                Work::Element { node, redacting } => {
                    let escalated = self.mask_attributes(document, node);
                    let redacting = redacting || escalated;

                    match resolve_complex_type(
                        redacting,
                        document.has_child_elements(node),
                        self.handling,
                    ) {
                        Disposition::Descend => stack.push(Work::Siblings {
                            group: document.child_elements(node),
                            next: 0,
                            redacting,
                        }),
                        Disposition::Mask => {
                            tracing::debug!(element = %document.local_name(node), "masking element");
                            self.masker.mask_element(document, node)?;
                        }
                        Disposition::Keep => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Name rule, or conditional rule satisfied by a sibling's current value
    fn element_matches(&self, document: &Document, node: Node, group: &[Node]) -> bool {
        let name = document.local_name(node);
        if self.rules.name_matches(name) {
            return true;
        }

        let target = FieldRef::element(name);
        if !self.rules.has_conditional_for(&target) {
            return false;
        }

        let siblings = group.iter().map(|&sibling| {
            (
                FieldRef::element(document.local_name(sibling)),
                document.string_value(sibling),
            )
        });
        self.rules.conditional_matches(&target, siblings)
    }

    /// Mask matching attributes; returns whether an attribute forces the body to be masked
    fn mask_attributes(&self, document: &mut Document, node: Node) -> bool {
        let element = document.local_name(node).to_string();
        let names: Vec<NameId> = document
            .attributes(node)
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        let mut escalated = false;
        for name in names {
            // Values are read fresh: earlier attributes may already be masked
            let attributes: Vec<(NameId, String, String)> = document
                .attributes(node)
                .into_iter()
                .map(|(name, value)| (name, document.name_local_str(name).to_string(), value))
                .collect();
            let Some((_, local, mut value)) = attributes
                .iter()
                .find(|(candidate, _, _)| *candidate == name)
                .cloned()
            else {
                continue;
            };

            let target = FieldRef::attribute(&element, &local);
            let matched = self.rules.attribute_matches(&element, &local)
                || (self.rules.has_conditional_for(&target)
                    && self.rules.conditional_matches(
                        &target,
                        attributes.iter().map(|(_, attribute, value)| {
                            (FieldRef::attribute(&element, attribute), value.clone())
                        }),
                    ));

            if matched {
                tracing::debug!(element = %element, attribute = %local, "masking attribute");
                self.masker.mask_attribute(document, node, name);
                value = self.masker.attribute_text().to_string();
            }

            escalated |= self.rules.attribute_escalates(&element, &local, &value);
        }
        escalated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_redactor::config::{Formatting, IfIsRedact, RedactorOptions};
    use crate::xml_redactor::rules::compile_rules;

    fn walk(xml: &str, options: RedactorOptions) -> String {
        let rules = compile_rules(&options);
        let mut document = Document::parse(xml).unwrap();
        TreeWalker::new(&rules, options.mask.as_deref(), options.complex_type_handling)
            .walk(&mut document)
            .unwrap();
        document.serialize(Formatting::Compact).unwrap()
    }

    fn redacts(names: &[&str]) -> RedactorOptions {
        RedactorOptions {
            redacts: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_complex_type() {
        use ComplexTypeHandling::*;
        assert_eq!(resolve_complex_type(true, true, RedactValue), Disposition::Mask);
        assert_eq!(
            resolve_complex_type(true, true, RedactDescendants),
            Disposition::Descend
        );
        assert_eq!(
            resolve_complex_type(true, false, RedactDescendants),
            Disposition::Mask
        );
        assert_eq!(resolve_complex_type(false, true, RedactValue), Disposition::Descend);
        assert_eq!(resolve_complex_type(false, false, RedactValue), Disposition::Keep);
    }

    #[test]
    fn test_no_rules_keeps_document() {
        assert_eq!(
            walk("<root><a>1</a><b c=\"3\">2</b></root>", RedactorOptions::default()),
            "<root><a>1</a><b c=\"3\">2</b></root>"
        );
    }

    #[test]
    fn test_redact_value_collapses_subtree() {
        assert_eq!(
            walk("<r><d>text<e>5</e></d></r>", redacts(&["d"])),
            "<r><d>[REDACTED]</d></r>"
        );
    }

    #[test]
    fn test_redact_descendants_masks_leaves() {
        let options = RedactorOptions {
            complex_type_handling: ComplexTypeHandling::RedactDescendants,
            ..redacts(&["d"])
        };
        assert_eq!(
            walk("<r><d>text<e>5</e><f><g>6</g></f></d><h>7</h></r>", options),
            "<r><d>text<e>[REDACTED]</e><f><g>[REDACTED]</g></f></d><h>7</h></r>"
        );
    }

    #[test]
    fn test_sibling_conditional() {
        let options = RedactorOptions {
            if_is_redacts: vec![IfIsRedact::new("type", "check", "checkNumber")],
            ..Default::default()
        };
        assert_eq!(
            walk(
                "<root><type>check</type><checkNumber>2468</checkNumber></root>",
                options.clone()
            ),
            "<root><type>check</type><checkNumber>[REDACTED]</checkNumber></root>"
        );
        assert_eq!(
            walk(
                "<root><type>card</type><checkNumber>2468</checkNumber></root>",
                options
            ),
            "<root><type>card</type><checkNumber>2468</checkNumber></root>"
        );
    }

    #[test]
    fn test_conditional_trigger_after_target() {
        let options = RedactorOptions {
            if_is_redacts: vec![IfIsRedact::new("type", "check", "checkNumber")],
            ..Default::default()
        };
        assert_eq!(
            walk(
                "<root><checkNumber>2468</checkNumber><type>check</type></root>",
                options
            ),
            "<root><checkNumber>[REDACTED]</checkNumber><type>check</type></root>"
        );
    }

    #[test]
    fn test_attribute_rule_only_touches_attribute() {
        assert_eq!(
            walk("<a b=\"1\" c=\"2\">x</a>", redacts(&["a@b"])),
            "<a b=\"[REDACTED]\" c=\"2\">x</a>"
        );
    }

    #[test]
    fn test_attribute_conditional_targets_sibling_attribute() {
        let options = RedactorOptions {
            if_is_redacts: vec![IfIsRedact::new("card@kind", "visa", "card@number")],
            ..Default::default()
        };
        assert_eq!(
            walk("<card kind=\"visa\" number=\"4111\">x</card>", options),
            "<card kind=\"visa\" number=\"[REDACTED]\">x</card>"
        );
    }

    #[test]
    fn test_attribute_conditional_escalates_body() {
        let options = RedactorOptions {
            if_is_redacts: vec![IfIsRedact::new("note@private", "true", "note")],
            ..Default::default()
        };
        assert_eq!(
            walk(
                "<r><note private=\"true\">secret</note><note private=\"false\">open</note></r>",
                options
            ),
            "<r><note private=\"true\">[REDACTED]</note><note private=\"false\">open</note></r>"
        );
    }

    #[test]
    fn test_comments_are_opaque() {
        assert_eq!(
            walk("<r><!-- <a>1</a> --><a>1</a></r>", redacts(&["a"])),
            "<r><!-- <a>1</a> --><a>[REDACTED]</a></r>"
        );
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 2_000;
        let xml = format!("{}x{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let options = RedactorOptions {
            complex_type_handling: ComplexTypeHandling::RedactDescendants,
            ..redacts(&["n"])
        };
        let output = walk(&xml, options);
        assert!(output.ends_with(&format!("[REDACTED]{}", "</n>".repeat(depth))));
    }
}
