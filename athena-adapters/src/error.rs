//! Adapter decode errors.
//!
//! Adapters are defensive consumers of externally-versioned wire formats:
//! shape drift on read paths degrades to empty decodes, so the only loud
//! failure here is corruption that would otherwise produce wrong data
//! silently.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// Accumulated streaming tool-call JSON failed to parse at
    /// finalization; there is no later recovery point.
    MalformedStream,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub message: String,
}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_stream(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::MalformedStream, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Other, message)
    }
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for AdapterError {}
