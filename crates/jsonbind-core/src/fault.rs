//! Failures, error trees and the fault adapter.
//!
//! A [`Failure`] is what a handler hands back when it cannot produce a
//! result. [`build`] turns its cause chain into an [`ErrorNode`] tree, and
//! [`FaultAdapter`] wraps that tree in the `{"error": ...}` envelope and
//! picks the status code.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoder::{EncodedResponse, ResponseEncoder};
use crate::error::{DecodeError, EncodeError};

/// Depth at which error trees are cut off.
pub const DEFAULT_MAX_ERROR_DEPTH: usize = 64;

/// Body used if the envelope itself cannot be serialized.
const FALLBACK_FAULT_BODY: &[u8] = br#"{"error":{"message":"Internal error"}}"#;

/// A handler failure as it crosses into the marshaling core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
    trace: Option<String>,
    status: Option<u16>,
    cause: Option<Box<Failure>>,
}

impl Failure {
    /// An unhandled failure; answered with the configured default status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
            status: None,
            cause: None,
        }
    }

    /// A declared fault that answers with its own status code.
    pub fn declared(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(message)
        }
    }

    /// Capture a Rust error and its `source()` chain.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self {
            message: err.to_string(),
            trace: Some(format!("{:?}", err)),
            status: None,
            cause: err.source().map(|source| Box::new(Self::from_error(source))),
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_cause(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    /// The explicit status code of a declared fault.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_declared(&self) -> bool {
        self.status.is_some()
    }

    /// The failure this one wraps, if any.
    pub fn inner(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }

    /// This failure followed by each of its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Failure> {
        std::iter::successors(Some(self), |f| f.cause.as_deref())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

impl From<DecodeError> for Failure {
    fn from(err: DecodeError) -> Self {
        Failure::from_error(&err)
    }
}

impl From<EncodeError> for Failure {
    fn from(err: EncodeError) -> Self {
        Failure::from_error(&err)
    }
}

/// One level of a failure's cause chain, in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNode {
    pub message: String,
    #[serde(rename = "stackTrace", default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<Box<ErrorNode>>,
}

/// The wire shape of every fault response: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEnvelope {
    pub error: ErrorNode,
}

/// Build the error tree for `failure`.
///
/// Without detail only the outermost message is kept. With detail every
/// level of the chain contributes a node carrying its message and trace,
/// down to `max_depth` levels.
pub fn build(failure: &Failure, include_detail: bool, max_depth: usize) -> ErrorNode {
    if !include_detail {
        return ErrorNode {
            message: failure.message.clone(),
            trace: None,
            inner: None,
        };
    }

    let inner = match failure.inner() {
        Some(cause) if max_depth > 1 => Some(Box::new(build(cause, true, max_depth - 1))),
        _ => None,
    };

    ErrorNode {
        message: failure.message.clone(),
        trace: failure.trace.clone(),
        inner,
    }
}

/// Turns any failure into a JSON fault response. Never fails.
#[derive(Debug, Clone)]
pub struct FaultAdapter {
    encoder: ResponseEncoder,
    include_detail: bool,
    default_status: u16,
    max_depth: usize,
}

impl FaultAdapter {
    pub fn new(encoder: ResponseEncoder, include_detail: bool, default_status: u16) -> Self {
        Self {
            encoder,
            include_detail,
            default_status,
            max_depth: DEFAULT_MAX_ERROR_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Status a failure will be answered with.
    pub fn status_for(&self, failure: &Failure) -> u16 {
        failure.status().unwrap_or(self.default_status)
    }

    pub fn adapt(&self, failure: &Failure) -> EncodedResponse {
        let status = self.status_for(failure);
        let envelope = FaultEnvelope {
            error: build(failure, self.include_detail, self.max_depth),
        };

        if failure.is_declared() {
            tracing::debug!(status, message = failure.message(), "declared fault");
        } else {
            tracing::error!(status, error = %failure, "unhandled fault");
        }

        match self.encoder.write(&envelope) {
            Ok(body) => EncodedResponse::json(status, body),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize fault envelope");
                EncodedResponse::json(status, FALLBACK_FAULT_BODY.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chained(depth: usize) -> Failure {
        (1..depth).fold(Failure::new(format!("level {}", depth - 1)), |inner, i| {
            Failure::new(format!("level {}", depth - 1 - i))
                .with_trace(format!("at frame {}", i))
                .with_cause(inner)
        })
    }

    #[test]
    fn test_build_without_detail_keeps_only_message() {
        let failure = chained(5).with_trace("outer trace");
        let node = build(&failure, false, DEFAULT_MAX_ERROR_DEPTH);
        assert_eq!(node.message, "level 0");
        assert!(node.trace.is_none());
        assert!(node.inner.is_none());
    }

    #[test]
    fn test_build_with_detail_follows_chain() {
        let failure = Failure::new("outer")
            .with_trace("outer trace")
            .with_cause(Failure::new("inner").with_trace("inner trace"));
        let node = build(&failure, true, DEFAULT_MAX_ERROR_DEPTH);
        assert_eq!(node.trace.as_deref(), Some("outer trace"));
        let inner = node.inner.expect("inner node");
        assert_eq!(inner.message, "inner");
        assert_eq!(inner.trace.as_deref(), Some("inner trace"));
        assert!(inner.inner.is_none());
    }

    #[test]
    fn test_build_respects_depth_cap() {
        let node = build(&chained(10), true, 3);
        let depth = std::iter::successors(Some(&node), |n| n.inner.as_deref()).count();
        assert_eq!(depth, 3);
    }

    #[test]
    fn test_chain_order() {
        let messages: Vec<_> = chained(3).chain().map(|f| f.message().to_string()).collect();
        assert_eq!(messages, ["level 0", "level 1", "level 2"]);
        assert_eq!(chained(1).chain().count(), 1);
    }

    #[test]
    fn test_from_error_walks_sources() {
        let err = DecodeError::InvalidParameter {
            parameter: "a".into(),
            source: serde_json::from_str::<u8>("\"x\"").unwrap_err(),
        };
        let failure = Failure::from(err);
        assert!(failure.message().contains("'a'"));
        assert!(failure.inner().is_some());
        assert!(!failure.is_declared());
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = FaultEnvelope {
            error: ErrorNode {
                message: "boom".into(),
                trace: Some("t".into()),
                inner: None,
            },
        };
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"error":{"message":"boom","stackTrace":"t"}}"#
        );
    }

    #[test]
    fn test_status_mapping() {
        let adapter = FaultAdapter::new(ResponseEncoder::default(), false, 500);
        assert_eq!(adapter.adapt(&Failure::declared(404, "missing")).status, 404);
        assert_eq!(adapter.adapt(&Failure::new("boom")).status, 500);
    }
}
