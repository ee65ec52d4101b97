//! The formatter facade the transport layer talks to.
//!
//! `JsonFormatter` owns one encoder for both replies and faults and exposes
//! the per-call entry points: decode a request, serialize a reply, provide a
//! fault, or run all three around a handler with [`JsonFormatter::respond`].

use serde::Serialize;

use crate::config::FormatterConfig;
use crate::decoder::{self, DecodedArguments};
use crate::encoder::{EncodedResponse, ResponseEncoder};
use crate::error::{DecodeError, EncodeError};
use crate::fault::{self, ErrorNode, FaultAdapter, Failure};
use crate::signature::OperationSignature;

const OK: u16 = 200;

/// Transport-agnostic JSON formatter.
///
/// Stateless per call; share one instance across threads.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    encoder: ResponseEncoder,
    faults: FaultAdapter,
}

impl JsonFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        let encoder = ResponseEncoder;
        let faults = FaultAdapter::new(encoder, config.include_detail, config.default_status)
            .with_max_depth(config.max_error_depth);
        Self {
            config,
            encoder,
            faults,
        }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Decode a request body into the operation's argument list.
    pub fn decode_request(
        &self,
        signature: &OperationSignature,
        body: &[u8],
    ) -> Result<DecodedArguments, DecodeError> {
        decoder::decode(body, signature)
    }

    /// Serialize a successful result. Void operations get an empty body.
    pub fn serialize_reply<T: Serialize + ?Sized>(
        &self,
        signature: &OperationSignature,
        value: &T,
    ) -> Result<EncodedResponse, EncodeError> {
        if !signature.uses_reply_formatter() {
            return Ok(EncodedResponse::empty(OK));
        }
        let body = self.encoder.encode(value, signature.return_type())?;
        Ok(EncodedResponse::json(OK, body))
    }

    /// Build the error tree for a failure under this formatter's settings.
    pub fn error_tree(&self, failure: &Failure) -> ErrorNode {
        fault::build(
            failure,
            self.config.include_detail,
            self.config.max_error_depth,
        )
    }

    /// Answer a failure with a JSON fault body.
    pub fn provide_fault(&self, failure: &Failure) -> EncodedResponse {
        self.faults.adapt(failure)
    }

    /// Decode, invoke `handler`, and encode its result or failure.
    ///
    /// Decode errors never reach the handler and are answered through the
    /// same fault path as handler failures. Operations whose requests bypass
    /// this formatter (GET, HEAD) get their arguments at default values and
    /// the body is not read.
    pub fn respond<R, F>(
        &self,
        signature: &OperationSignature,
        body: &[u8],
        handler: F,
    ) -> EncodedResponse
    where
        R: Serialize,
        F: FnOnce(DecodedArguments) -> Result<R, Failure>,
    {
        let span = tracing::debug_span!("respond", operation = signature.name());
        let _enter = span.enter();

        let arguments = if signature.uses_request_formatter() {
            self.decode_request(signature, body).map_err(Failure::from)
        } else {
            Ok(DecodedArguments::defaults(signature))
        };

        let outcome = arguments
            .and_then(handler)
            .and_then(|value| self.serialize_reply(signature, &value).map_err(Failure::from));

        match outcome {
            Ok(response) => response,
            Err(failure) => self.provide_fault(&failure),
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(FormatterConfig::default())
    }
}
