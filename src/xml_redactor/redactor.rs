// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// XML redactor with PyO3 bindings

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyDict;

use super::config::{IfIsRedact, OnErrorRedact, RedactorOptions};
use super::document::Document;
use super::error::Result;
use super::rules::{compile_rules, RuleSet};
use super::walker::TreeWalker;

/// Common interface of redactors
pub trait Redact {
    fn options(&self) -> &RedactorOptions;

    /// Redact `input`, reporting why it could not be processed
    ///
    /// Either the whole document is rewritten or nothing is returned; there is
    /// no partially redacted output.
    fn try_redact(&self, input: &str) -> Result<String>;

    /// Redact `input`, falling back to the on-error policy
    ///
    /// With `OnErrorRedact::MaskAll` a failed document becomes the mask (an
    /// empty string when the mask is the structural null); with
    /// `OnErrorRedact::PassThrough` the input is returned untouched.
    fn redact(&self, input: &str) -> String {
        match self.try_redact(input) {
            Ok(output) => output,
            Err(e) => {
                let options = self.options();
                tracing::warn!(
                    error = %e,
                    policy = ?options.on_error_redact,
                    "Redaction failed, applying on-error policy"
                );
                match options.on_error_redact {
                    OnErrorRedact::MaskAll => options.mask.clone().unwrap_or_default(),
                    OnErrorRedact::PassThrough => input.to_string(),
                }
            }
        }
    }
}

/// Redacts XML documents by element and attribute name
///
/// Rules are compiled once; one instance can be shared across threads and
/// used for any number of documents.
///
/// # Example
/// ```
/// use redactor_rust::xml_redactor::{Redact, XmlRedactor};
///
/// let redactor = XmlRedactor::with_redacts(["password"]);
/// let output = redactor.redact("<user><name>jdoe</name><password>hunter2</password></user>");
/// assert_eq!(output, "<user><name>jdoe</name><password>[REDACTED]</password></user>");
/// ```
#[derive(Debug, Clone)]
pub struct XmlRedactor {
    options: RedactorOptions,
    rules: RuleSet,
}

impl Default for XmlRedactor {
    fn default() -> Self {
        Self::new(RedactorOptions::default())
    }
}

impl XmlRedactor {
    pub fn new(options: RedactorOptions) -> Self {
        let rules = compile_rules(&options);
        Self { options, rules }
    }

    /// Redactor with name rules (`name` or `name@attribute`) and default options
    pub fn with_redacts<I, S>(redacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rules(redacts, std::iter::empty())
    }

    /// Redactor with conditional rules only
    pub fn with_if_is_redacts<I>(if_is_redacts: I) -> Self
    where
        I: IntoIterator<Item = IfIsRedact>,
    {
        Self::with_rules(std::iter::empty::<String>(), if_is_redacts)
    }

    pub fn with_rules<I, S, C>(redacts: I, if_is_redacts: C) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        C: IntoIterator<Item = IfIsRedact>,
    {
        Self::new(RedactorOptions {
            redacts: redacts.into_iter().map(Into::into).collect(),
            if_is_redacts: if_is_redacts.into_iter().collect(),
            ..Default::default()
        })
    }
}

impl Redact for XmlRedactor {
    fn options(&self) -> &RedactorOptions {
        &self.options
    }

    fn try_redact(&self, input: &str) -> Result<String> {
        let mut document = Document::parse(input)?;

        // Without rules the document is only normalized
        if !self.rules.is_empty() {
            TreeWalker::new(
                &self.rules,
                self.options.sanitized_mask(),
                self.options.complex_type_handling,
            )
            .walk(&mut document)?;
        }

        document.serialize(self.options.formatting)
    }
}

/// XML redactor exposed to Python
///
/// # Example (Python)
/// ```python
/// from redactor_rust import XmlRedactorRust
///
/// redactor = XmlRedactorRust({
///     "redacts": ["password", "card@number"],
///     "if_is_redacts": [{"if": "type", "is": "check", "redact": "checkNumber"}],
/// })
///
/// redactor.redact("<user><password>hunter2</password></user>")
/// # "<user><password>[REDACTED]</password></user>"
///
/// ok, output, error = redactor.try_redact("<user>")
/// # (False, None, "parse error: ...")
/// ```
#[cfg(feature = "python")]
#[pyclass]
pub struct XmlRedactorRust {
    redactor: XmlRedactor,
}

#[cfg(feature = "python")]
#[pymethods]
impl XmlRedactorRust {
    /// Create a new XML redactor
    ///
    /// # Configuration Keys
    /// * `mask` (str | None): Replacement text; `None` writes `xsi:nil` (default: "[REDACTED]")
    /// * `redacts` (list[str]): Element names or `element@attribute` names
    /// * `if_is_redacts` (list[dict | tuple]): `{"if", "is", "redact"}` conditional rules
    /// * `complex_type_handling` (str): "redact_value", "redact_descendants"
    /// * `on_error_redact` (str): "all", "none"
    /// * `string_comparison` (str): "case_insensitive", "ordinal"
    /// * `formatting` (str): "compact", "indented"
    #[new]
    #[pyo3(signature = (config_dict=None))]
    pub fn new(config_dict: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let options = match config_dict {
            Some(dict) => RedactorOptions::from_py_dict(dict).map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid config: {}", e))
            })?,
            None => RedactorOptions::default(),
        };

        Ok(Self {
            redactor: XmlRedactor::new(options),
        })
    }

    /// Redact a document, applying the on-error policy on failure
    pub fn redact(&self, xml: &str) -> String {
        Redact::redact(&self.redactor, xml)
    }

    /// Returns `(success, output, error_message)`
    pub fn try_redact(&self, xml: &str) -> (bool, Option<String>, Option<String>) {
        match Redact::try_redact(&self.redactor, xml) {
            Ok(output) => (true, Some(output), None),
            Err(e) => (false, None, Some(e.to_string())),
        }
    }
}
