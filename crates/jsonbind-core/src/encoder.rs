//! Response encoder. Success replies and fault envelopes both go through
//! [`ResponseEncoder::write`], so they always share content type, charset
//! and enum formatting.

use serde::Serialize;

use crate::error::EncodeError;
use crate::types::{Mismatch, ReturnType};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Bytes plus the status and content type to send them with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub status: u16,
    /// `None` for an empty body.
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl EncodedResponse {
    pub fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some(JSON_CONTENT_TYPE),
            body,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body back into JSON. `None` for empty or non-JSON bodies.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Compact UTF-8 JSON writer with the strict enum policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    /// Encode a result value as declared by `return_type`.
    ///
    /// The value is checked against the declared type first, so enum slots
    /// holding anything but a declared name (ordinals included) are refused.
    pub fn encode<T: Serialize + ?Sized>(
        &self,
        value: &T,
        return_type: &ReturnType,
    ) -> Result<Vec<u8>, EncodeError> {
        let ty = match return_type {
            ReturnType::Void => return Err(EncodeError::VoidReturn),
            ReturnType::Value(ty) => ty,
        };

        let value = serde_json::to_value(value)?;
        ty.check(&value).map_err(|mismatch| match mismatch {
            Mismatch::Enum { path, rejection } => EncodeError::InvalidEnumValue {
                path,
                enum_name: rejection.enum_name,
                found: rejection.found,
            },
            Mismatch::Type {
                path,
                expected,
                found,
            } => EncodeError::TypeMismatch {
                path,
                expected,
                found,
            },
        })?;

        self.write(&value)
    }

    /// Serialize without type checks. Shared by replies and fault envelopes.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for EncodedResponse {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{header, StatusCode};

        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.content_type {
            Some(content_type) => {
                (status, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
            }
            None => (status, self.body).into_response(),
        }
    }
}
