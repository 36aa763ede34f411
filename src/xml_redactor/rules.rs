// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Rule compilation and matching for XML redaction
// Rule strings are split once so that matching never re-parses `name@attribute`

use super::config::{RedactorOptions, StringComparison};

/// A field reference found in a document: an element, or one of its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub element: &'a str,
    pub attribute: Option<&'a str>,
}

impl<'a> FieldRef<'a> {
    pub fn element(element: &'a str) -> Self {
        Self {
            element,
            attribute: None,
        }
    }

    pub fn attribute(element: &'a str, attribute: &'a str) -> Self {
        Self {
            element,
            attribute: Some(attribute),
        }
    }
}

/// A compiled field identifier (`name` or `name@attribute`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldId {
    pub element: String,
    pub attribute: Option<String>,
}

impl FieldId {
    pub fn parse(identifier: &str) -> Self {
        match identifier.split_once('@') {
            Some((element, attribute)) => Self {
                element: element.to_string(),
                attribute: Some(attribute.to_string()),
            },
            None => Self {
                element: identifier.to_string(),
                attribute: None,
            },
        }
    }

    /// Local-name match; an element id never matches an attribute and vice versa
    pub fn matches(&self, field: &FieldRef<'_>, comparison: StringComparison) -> bool {
        if !comparison.equals(&self.element, field.element) {
            return false;
        }
        match (&self.attribute, field.attribute) {
            (None, None) => true,
            (Some(expected), Some(actual)) => comparison.equals(expected, actual),
            _ => false,
        }
    }
}

/// Compiled (If, Is, Redact) rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalRule {
    pub if_field: FieldId,
    pub is: String,
    pub redact: FieldId,
}

/// All rules with the comparison mode they are evaluated under
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub redacts: Vec<FieldId>,
    pub conditionals: Vec<ConditionalRule>,
    pub comparison: StringComparison,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.redacts.is_empty() && self.conditionals.is_empty()
    }

    /// Unconditional rule naming this element
    pub fn name_matches(&self, element: &str) -> bool {
        let field = FieldRef::element(element);
        self.redacts
            .iter()
            .any(|rule| rule.matches(&field, self.comparison))
    }

    /// Unconditional `element@attribute` rule naming this attribute
    pub fn attribute_matches(&self, element: &str, attribute: &str) -> bool {
        let field = FieldRef::attribute(element, attribute);
        self.redacts
            .iter()
            .any(|rule| rule.matches(&field, self.comparison))
    }

    /// Conditional rule redacting `target` whose If-field is present in `siblings` with the Is-value
    ///
    /// `siblings` is scanned once per candidate rule, so it must be cheap to clone
    /// (an iterator adapter over borrowed nodes). A rule whose If-field is absent
    /// never fires.
    pub fn conditional_matches<'s, I>(&self, target: &FieldRef<'_>, siblings: I) -> bool
    where
        I: Iterator<Item = (FieldRef<'s>, String)> + Clone,
    {
        self.conditionals
            .iter()
            .filter(|rule| rule.redact.matches(target, self.comparison))
            .any(|rule| {
                siblings.clone().any(|(field, value)| {
                    rule.if_field.matches(&field, self.comparison)
                        && self.comparison.equals(&rule.is, &value)
                })
            })
    }

    /// Conditional rule redacting the element body, triggered by one of its own attributes
    pub fn attribute_escalates(&self, element: &str, attribute: &str, value: &str) -> bool {
        let target = FieldRef::element(element);
        let trigger = FieldRef::attribute(element, attribute);
        self.conditionals.iter().any(|rule| {
            rule.redact.matches(&target, self.comparison)
                && rule.if_field.matches(&trigger, self.comparison)
                && self.comparison.equals(&rule.is, value)
        })
    }

    /// Whether any conditional rule could target this element
    ///
    /// Lets the walker skip computing sibling values for untargeted elements.
    pub fn has_conditional_for(&self, target: &FieldRef<'_>) -> bool {
        self.conditionals
            .iter()
            .any(|rule| rule.redact.matches(target, self.comparison))
    }
}

/// Compile the redaction rules from options
pub fn compile_rules(options: &RedactorOptions) -> RuleSet {
    let redacts = options
        .redacts
        .iter()
        .map(|identifier| FieldId::parse(identifier))
        .collect();

    let conditionals = options
        .if_is_redacts
        .iter()
        .map(|rule| ConditionalRule {
            if_field: FieldId::parse(&rule.if_field),
            is: rule.is.clone(),
            redact: FieldId::parse(&rule.redact),
        })
        .collect();

    RuleSet {
        redacts,
        conditionals,
        comparison: options.string_comparison,
    }
}
