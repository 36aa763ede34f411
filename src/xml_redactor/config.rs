// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the XML redactor

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::{PyDict, PyList};
use serde::{Deserialize, Serialize};

use super::error::RedactError;

/// Mask used when none is configured
pub const DEFAULT_MASK: &str = "[REDACTED]";

/// How a matched element with child elements is masked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplexTypeHandling {
    #[default]
    RedactValue, // Collapse the whole body into the mask
    RedactDescendants, // Keep structure, mask the leaves
}

/// What `redact` returns when the input cannot be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OnErrorRedact {
    #[default]
    #[serde(rename = "all")]
    MaskAll, // Return the mask in place of the document
    #[serde(rename = "none")]
    PassThrough, // Return the input untouched
}

/// Comparison applied to names and conditional values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StringComparison {
    #[default]
    CaseInsensitive,
    Ordinal,
}

impl StringComparison {
    /// Compare two strings under this mode
    pub fn equals(self, a: &str, b: &str) -> bool {
        match self {
            StringComparison::Ordinal => a == b,
            StringComparison::CaseInsensitive => {
                a.chars()
                    .flat_map(char::to_lowercase)
                    .eq(b.chars().flat_map(char::to_lowercase))
            }
        }
    }
}

/// Whitespace layout of the serialized document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Formatting {
    #[default]
    Compact,
    Indented,
}

/// Conditional rule: redact `redact` when the field `if_field` has the value `is`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfIsRedact {
    #[serde(rename = "if")]
    pub if_field: String,
    pub is: String,
    pub redact: String,
}

impl IfIsRedact {
    pub fn new(
        if_field: impl Into<String>,
        is: impl Into<String>,
        redact: impl Into<String>,
    ) -> Self {
        Self {
            if_field: if_field.into(),
            is: is.into(),
            redact: redact.into(),
        }
    }
}

/// Configuration for the XML redactor
///
/// Redaction fields and `formatting` are independent: the formatting only
/// changes the whitespace of the serialized result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactorOptions {
    /// Replacement text; `None` means "write a structural null instead"
    pub mask: Option<String>,

    // Rules
    pub redacts: Vec<String>,
    pub if_is_redacts: Vec<IfIsRedact>,

    // Behavior
    pub complex_type_handling: ComplexTypeHandling,
    pub on_error_redact: OnErrorRedact,
    pub string_comparison: StringComparison,

    // Output
    pub formatting: Formatting,
}

impl Default for RedactorOptions {
    fn default() -> Self {
        Self {
            mask: Some(DEFAULT_MASK.to_string()),

            redacts: Vec::new(),
            if_is_redacts: Vec::new(),

            complex_type_handling: ComplexTypeHandling::RedactValue,
            on_error_redact: OnErrorRedact::MaskAll,
            string_comparison: StringComparison::CaseInsensitive,

            formatting: Formatting::Compact,
        }
    }
}

impl RedactorOptions {
    /// Load options from a JSON object; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, RedactError> {
        serde_json::from_str(json).map_err(|e| RedactError::Config(e.to_string()))
    }

    /// Mask text with the XML sanitizing applied (XML needs none)
    pub(crate) fn sanitized_mask(&self) -> Option<&str> {
        self.mask.as_deref()
    }

    /// Extract configuration from Python dict
    #[cfg(feature = "python")]
    pub fn from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<Self> {
        let mut config = Self::default();

        // `None` selects the structural null
        if let Some(value) = dict.get_item("mask")? {
            config.mask = value.extract::<Option<String>>()?;
        }

        if let Some(value) = dict.get_item("redacts")? {
            if !value.is_none() {
                config.redacts = value.extract()?;
            }
        }

        if let Some(value) = dict.get_item("if_is_redacts")? {
            if let Ok(py_list) = value.downcast::<PyList>() {
                for item in py_list.iter() {
                    if let Ok(py_dict) = item.downcast::<PyDict>() {
                        let field = |key: &str| -> PyResult<String> {
                            py_dict
                                .get_item(key)?
                                .ok_or_else(|| {
                                    pyo3::exceptions::PyValueError::new_err(format!(
                                        "Missing '{}' field",
                                        key
                                    ))
                                })?
                                .extract()
                        };
                        let rule = IfIsRedact::new(field("if")?, field("is")?, field("redact")?);
                        config.if_is_redacts.push(rule);
                    } else {
                        let (if_field, is, redact): (String, String, String) = item.extract()?;
                        config.if_is_redacts.push(IfIsRedact::new(if_field, is, redact));
                    }
                }
            }
        }

        if let Some(value) = dict.get_item("complex_type_handling")? {
            let handling: String = value.extract()?;
            config.complex_type_handling = match handling.as_str() {
                "redact_descendants" => ComplexTypeHandling::RedactDescendants,
                _ => ComplexTypeHandling::RedactValue,
            };
        }

        if let Some(value) = dict.get_item("on_error_redact")? {
            let policy: String = value.extract()?;
            config.on_error_redact = match policy.as_str() {
                "none" => OnErrorRedact::PassThrough,
                _ => OnErrorRedact::MaskAll,
            };
        }

        if let Some(value) = dict.get_item("string_comparison")? {
            let comparison: String = value.extract()?;
            config.string_comparison = match comparison.as_str() {
                "ordinal" => StringComparison::Ordinal,
                _ => StringComparison::CaseInsensitive,
            };
        }

        if let Some(value) = dict.get_item("formatting")? {
            let formatting: String = value.extract()?;
            config.formatting = match formatting.as_str() {
                "indented" => Formatting::Indented,
                _ => Formatting::Compact,
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedactorOptions::default();
        assert_eq!(DEFAULT_MASK, "[REDACTED]");
        assert_eq!(config.mask.as_deref(), Some(DEFAULT_MASK));
        assert!(config.redacts.is_empty());
        assert!(config.if_is_redacts.is_empty());
        assert_eq!(config.complex_type_handling, ComplexTypeHandling::RedactValue);
        assert_eq!(config.on_error_redact, OnErrorRedact::MaskAll);
        assert_eq!(config.string_comparison, StringComparison::CaseInsensitive);
        assert_eq!(config.formatting, Formatting::Compact);
    }

    #[test]
    fn test_from_json_partial() {
        let config = RedactorOptions::from_json(
            r#"{
                "redacts": ["password", "user@id"],
                "if_is_redacts": [{"if": "type", "is": "check", "redact": "checkNumber"}],
                "complex_type_handling": "redact_descendants",
                "on_error_redact": "none",
                "formatting": "indented"
            }"#,
        )
        .unwrap();

        assert_eq!(config.mask.as_deref(), Some(DEFAULT_MASK));
        assert_eq!(config.redacts, vec!["password", "user@id"]);
        assert_eq!(
            config.if_is_redacts,
            vec![IfIsRedact::new("type", "check", "checkNumber")]
        );
        assert_eq!(
            config.complex_type_handling,
            ComplexTypeHandling::RedactDescendants
        );
        assert_eq!(config.on_error_redact, OnErrorRedact::PassThrough);
        assert_eq!(config.string_comparison, StringComparison::CaseInsensitive);
        assert_eq!(config.formatting, Formatting::Indented);
    }

    #[test]
    fn test_from_json_null_mask() {
        let config = RedactorOptions::from_json(r#"{"mask": null}"#).unwrap();
        assert_eq!(config.mask, None);
    }

    #[test]
    fn test_from_json_rejects_unknown_mode() {
        let err = RedactorOptions::from_json(r#"{"string_comparison": "fuzzy"}"#).unwrap_err();
        assert!(matches!(err, RedactError::Config(_)));
    }

    #[test]
    fn test_string_comparison() {
        assert!(StringComparison::CaseInsensitive.equals("checkNumber", "CHECKNUMBER"));
        assert!(!StringComparison::CaseInsensitive.equals("Straße", "STRASSE"));
        assert!(StringComparison::CaseInsensitive.equals("Élan", "élan"));
        assert!(!StringComparison::Ordinal.equals("a", "A"));
        assert!(StringComparison::Ordinal.equals("a", "a"));
    }
}
