// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// XML Redactor - Rust Implementation
//
// Rule-driven masking of XML elements and attributes:
// - Name rules (`name`, `name@attribute`) and conditional If/Is/Redact rules
// - Redaction inherited by descendants, evaluated in one depth-first pass
// - Literal or `xsi:nil` masks, compact or indented output

pub mod config;
pub mod document;
pub mod error;
pub mod masking;
pub mod redactor;
pub mod rules;
pub mod walker;

pub use config::{
    ComplexTypeHandling, Formatting, IfIsRedact, OnErrorRedact, RedactorOptions,
    StringComparison, DEFAULT_MASK,
};
pub use error::RedactError;
pub use redactor::{Redact, XmlRedactor};
#[cfg(feature = "python")]
pub use redactor::XmlRedactorRust;
