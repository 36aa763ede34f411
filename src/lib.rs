// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Rule-driven redaction of XML documents
// Optional PyO3 bindings (feature `python`)

// Allow non-local definitions for PyO3 macros
#![cfg_attr(feature = "python", allow(non_local_definitions))]

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod xml_redactor;

/// Python module: redactor_rust
///
/// Masks selected XML elements and attributes according to declarative rules.
///
/// # Examples
///
/// ```python
/// from redactor_rust import XmlRedactorRust
///
/// # Create redactor with configuration
/// config = {
///     "redacts": ["password", "socialSecurityNumber"],
///     "if_is_redacts": [{"if": "type", "is": "check", "redact": "checkNumber"}],
///     "complex_type_handling": "redact_descendants",
/// }
/// redactor = XmlRedactorRust(config)
///
/// xml = "<user><name>jdoe</name><password>P@ssw0rd5</password></user>"
/// print(redactor.redact(xml))
/// # "<user><name>jdoe</name><password>[REDACTED]</password></user>"
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn redactor_rust(m: &Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
    // Export XML redactor
    m.add_class::<xml_redactor::XmlRedactorRust>()?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__doc__", "Rule-driven redaction of XML documents")?;

    Ok(())
}
