use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// HTTP verb of a queued operation. The Cascade REST API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body carried by an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured payload, serialized as JSON by the transport
    Json(Value),
    /// Pre-encoded body sent verbatim
    Bytes(Bytes),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("operation target must not be empty")]
    EmptyTarget,
}

/// One remote call that has not been executed yet.
///
/// Descriptors are immutable once built; the only way to obtain one is
/// through the validating constructors, so a queued descriptor always has a
/// non-empty target.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    verb: Verb,
    target: String,
    body: Option<Payload>,
}

impl OperationDescriptor {
    pub fn new(
        verb: Verb,
        target: impl Into<String>,
        body: Option<Payload>,
    ) -> Result<Self, DescriptorError> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(DescriptorError::EmptyTarget);
        }
        Ok(Self { verb, target, body })
    }

    /// Caller guarantees `target` is non-empty
    pub(crate) fn from_parts(verb: Verb, target: String, body: Option<Payload>) -> Self {
        debug_assert!(!target.trim().is_empty());
        Self { verb, target, body }
    }

    pub fn get(target: impl Into<String>) -> Result<Self, DescriptorError> {
        Self::new(Verb::Get, target, None)
    }

    pub fn post(target: impl Into<String>, body: impl Into<Payload>) -> Result<Self, DescriptorError> {
        Self::new(Verb::Post, target, Some(body.into()))
    }

    /// POST without a body, as used by `publish` and `checkOut`
    pub fn post_empty(target: impl Into<String>) -> Result<Self, DescriptorError> {
        Self::new(Verb::Post, target, None)
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn body(&self) -> Option<&Payload> {
        self.body.as_ref()
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.target)
    }
}
