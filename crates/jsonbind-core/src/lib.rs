//! jsonbind Core — JSON parameter marshaling for RPC operations.
//!
//! Sits between a network-facing endpoint and in-process operation
//! handlers. It has **no HTTP framework dependency** by default; the
//! transport hands it raw body bytes plus a registered
//! [`OperationSignature`] and gets back bytes, a status code and a content
//! type.
//!
//! - [`decoder::decode`] — body → ordered arguments (bare value for one
//!   parameter, wrapped object for several)
//! - [`ResponseEncoder::encode`] — result → compact JSON
//! - [`fault::build`] — failure cause chain → error tree
//! - [`FaultAdapter::adapt`] — failure → `{"error": ...}` body + status
//!
//! # Example
//!
//! ```
//! use jsonbind_core::{JsonFormatter, NamedType, OperationSignature, ReturnType, TypeDescriptor};
//!
//! let add = OperationSignature::post(
//!     "add",
//!     vec![
//!         NamedType::new("a", TypeDescriptor::Integer),
//!         NamedType::new("b", TypeDescriptor::Integer),
//!     ],
//!     ReturnType::Value(TypeDescriptor::Integer),
//! )
//! .unwrap();
//!
//! let formatter = JsonFormatter::default();
//! let response = formatter.respond(&add, br#"{"b":2,"a":1}"#, |mut args| {
//!     Ok(args.take::<i64>(0)? + args.take::<i64>(1)?)
//! });
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, b"3");
//! ```
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `EncodedResponse` for use in axum handlers.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod enum_codec;
pub mod error;
pub mod fault;
pub mod formatter;
pub mod signature;
pub mod types;

// Convenience re-exports
pub use config::FormatterConfig;
pub use decoder::DecodedArguments;
pub use encoder::{EncodedResponse, ResponseEncoder, JSON_CONTENT_TYPE};
pub use enum_codec::EnumType;
pub use error::{DecodeError, EncodeError, SignatureError};
pub use fault::{ErrorNode, Failure, FaultAdapter, FaultEnvelope};
pub use formatter::JsonFormatter;
pub use signature::{
    BodyStyle, HttpMethod, OperationSignature, OperationStyle, SignatureDescription,
};
pub use types::{NamedType, PathSegment, RecordType, ReturnType, TypeDescriptor};
