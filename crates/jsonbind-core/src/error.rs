//! Error types for the marshaling core.
//!
//! Decode, encode and registration failures are kept apart so callers can
//! tell "bad input" from "bad setup". All of them convert into a
//! [`Failure`](crate::fault::Failure) and reach the client through the
//! same fault path as handler failures.

/// Failure while turning a request body into an argument list.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("Malformed payload{}: {source}", at(.parameter))]
    MalformedPayload {
        /// Dotted path of the parameter being read, if the error was inside one.
        parameter: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    /// A multi-parameter body did not start with a JSON object.
    #[error("Input needs to be wrapped in an object")]
    ShapeMismatch,

    /// An enum value was not one of the declared names.
    #[error("Invalid enum value for '{parameter}': {found} is not a declared name of {enum_name}")]
    InvalidEnumValue {
        parameter: String,
        enum_name: String,
        found: String,
    },

    /// A value had the wrong JSON type for its declared parameter type.
    #[error("Invalid value for parameter '{parameter}': {source}")]
    InvalidParameter {
        parameter: String,
        #[source]
        source: serde_json::Error,
    },
}

fn at(parameter: &Option<String>) -> String {
    match parameter {
        Some(name) => format!(" in parameter '{}'", name),
        None => String::new(),
    }
}

impl DecodeError {
    /// The parameter path the error points at, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            DecodeError::MalformedPayload { parameter, .. } => parameter.as_deref(),
            DecodeError::InvalidEnumValue { parameter, .. }
            | DecodeError::InvalidParameter { parameter, .. } => Some(parameter),
            DecodeError::ShapeMismatch => None,
        }
    }
}

/// Failure while turning a result value into a reply body.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Void operations have no reply body")]
    VoidReturn,

    #[error("Invalid enum value at '{path}': {found} is not a declared name of {enum_name}")]
    InvalidEnumValue {
        path: String,
        enum_name: String,
        found: String,
    },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure while registering an operation signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Duplicate parameter name '{parameter}' in operation '{operation}'")]
    DuplicateParameter { operation: String, parameter: String },

    #[error("Operation '{operation}': {reason} not implemented in this formatter")]
    UnsupportedShape { operation: String, reason: String },

    #[error("Duplicate field name '{field}' in record '{record}' of operation '{operation}'")]
    DuplicateField {
        operation: String,
        record: String,
        field: String,
    },

    #[error("Enum '{enum_name}' in operation '{operation}' declares no names")]
    EmptyEnum {
        operation: String,
        enum_name: String,
    },
}
