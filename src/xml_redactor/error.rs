// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for the XML redactor

use thiserror::Error;

/// Failures that abort redaction of a whole document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedactError {
    /// Input is not well-formed XML
    #[error("parse error: {0}")]
    Parse(String),

    /// Tree mutation failed while applying rules
    #[error("traversal error: {0}")]
    Traversal(String),

    /// Rewritten tree could not be serialized
    #[error("serialize error: {0}")]
    Serialize(String),

    /// Options could not be loaded
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RedactError>;
