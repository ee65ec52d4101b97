//! Operation signatures and their one-time registration checks.
//!
//! A signature is built once when an operation is registered, validated
//! against the shapes this formatter supports, and then shared read-only
//! across every request for that operation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SignatureError;
use crate::types::{NamedType, ReturnType, TypeDescriptor};

/// HTTP verb the operation is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// GET and HEAD requests carry no body for this formatter to read.
    pub fn is_bodyless(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

/// Whether request and reply bodies are wrapped in an object keyed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyStyle {
    #[default]
    Bare,
    Wrapped,
    WrappedRequest,
    WrappedResponse,
}

impl BodyStyle {
    pub fn wraps_request(self) -> bool {
        matches!(self, BodyStyle::Wrapped | BodyStyle::WrappedRequest)
    }

    pub fn wraps_response(self) -> bool {
        matches!(self, BodyStyle::Wrapped | BodyStyle::WrappedResponse)
    }
}

/// Binding facts about an operation that affect which shapes are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStyle {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub body_style: BodyStyle,
}

/// Parameter name → slot position. Only built for operations with more
/// than one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterIndex(HashMap<String, usize>);

impl ParameterIndex {
    fn build(operation: &str, parameters: &[NamedType]) -> Result<Self, SignatureError> {
        let mut index = HashMap::with_capacity(parameters.len());
        for (i, p) in parameters.iter().enumerate() {
            if index.insert(p.name.clone(), i).is_some() {
                return Err(SignatureError::DuplicateParameter {
                    operation: operation.to_string(),
                    parameter: p.name.clone(),
                });
            }
        }
        Ok(Self(index))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a request body maps onto the parameter list. Chosen once by arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// No parameters: the body is not read.
    Empty,
    /// One parameter: the whole body is its value.
    Bare,
    /// Several parameters: the body is an object keyed by parameter name.
    Wrapped(ParameterIndex),
}

/// Static description of one operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SignatureDescription")]
pub struct OperationSignature {
    name: String,
    parameters: Vec<NamedType>,
    names: Arc<[String]>,
    return_type: ReturnType,
    style: OperationStyle,
    strategy: DecodeStrategy,
}

impl OperationSignature {
    /// Register an operation. Fails for duplicate parameter or record field
    /// names, enums without names, and the wrapped shapes this formatter
    /// does not implement.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<NamedType>,
        return_type: ReturnType,
        style: OperationStyle,
    ) -> Result<Self, SignatureError> {
        let name = name.into();

        let strategy = match parameters.len() {
            0 => DecodeStrategy::Empty,
            1 => DecodeStrategy::Bare,
            _ => DecodeStrategy::Wrapped(ParameterIndex::build(&name, &parameters)?),
        };

        if !style.method.is_bodyless() && parameters.len() == 1 && style.body_style.wraps_request()
        {
            return Err(SignatureError::UnsupportedShape {
                operation: name,
                reason: "wrapped body style for single parameters".into(),
            });
        }

        if !return_type.is_void() && style.body_style.wraps_response() {
            return Err(SignatureError::UnsupportedShape {
                operation: name,
                reason: "wrapped response".into(),
            });
        }

        for ty in parameters
            .iter()
            .map(|p| &p.ty)
            .chain(return_type_descriptor(&return_type))
        {
            validate_type(&name, ty)?;
        }

        let names: Arc<[String]> = parameters.iter().map(|p| p.name.clone()).collect();

        tracing::debug!(
            operation = %name,
            parameters = parameters.len(),
            strategy = %strategy_label(&strategy),
            "registered operation signature"
        );

        Ok(Self {
            name,
            parameters,
            names,
            return_type,
            style,
            strategy,
        })
    }

    /// Shorthand for a bare-style POST operation.
    pub fn post(
        name: impl Into<String>,
        parameters: Vec<NamedType>,
        return_type: ReturnType,
    ) -> Result<Self, SignatureError> {
        Self::new(name, parameters, return_type, OperationStyle::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[NamedType] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> &Arc<[String]> {
        &self.names
    }

    pub fn return_type(&self) -> &ReturnType {
        &self.return_type
    }

    pub fn return_descriptor(&self) -> Option<&TypeDescriptor> {
        return_type_descriptor(&self.return_type)
    }

    pub fn style(&self) -> OperationStyle {
        self.style
    }

    pub fn strategy(&self) -> &DecodeStrategy {
        &self.strategy
    }

    /// Whether request bodies for this operation go through this formatter.
    pub fn uses_request_formatter(&self) -> bool {
        !self.style.method.is_bodyless() && !self.parameters.is_empty()
    }

    /// Whether replies for this operation go through this formatter.
    pub fn uses_reply_formatter(&self) -> bool {
        !self.return_type.is_void()
    }
}

fn return_type_descriptor(return_type: &ReturnType) -> Option<&TypeDescriptor> {
    match return_type {
        ReturnType::Void => None,
        ReturnType::Value(ty) => Some(ty),
    }
}

/// Reject descriptors whose decoding and defaults would disagree.
fn validate_type(operation: &str, ty: &TypeDescriptor) -> Result<(), SignatureError> {
    match ty {
        TypeDescriptor::Enum(e) if e.variants.is_empty() => Err(SignatureError::EmptyEnum {
            operation: operation.to_string(),
            enum_name: e.name.clone(),
        }),
        TypeDescriptor::Record(record) => {
            let mut seen = HashSet::with_capacity(record.fields.len());
            for field in &record.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(SignatureError::DuplicateField {
                        operation: operation.to_string(),
                        record: record.name.clone(),
                        field: field.name.clone(),
                    });
                }
                validate_type(operation, &field.ty)?;
            }
            Ok(())
        }
        TypeDescriptor::Array { items: inner }
        | TypeDescriptor::Map { values: inner }
        | TypeDescriptor::Optional { inner } => validate_type(operation, inner),
        _ => Ok(()),
    }
}

fn strategy_label(strategy: &DecodeStrategy) -> &'static str {
    match strategy {
        DecodeStrategy::Empty => "empty",
        DecodeStrategy::Bare => "bare",
        DecodeStrategy::Wrapped(_) => "wrapped",
    }
}

/// Serialized form of a signature, as read from a description file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureDescription {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<NamedType>,
    /// Absent means the operation returns nothing.
    #[serde(default)]
    pub returns: Option<TypeDescriptor>,
    #[serde(default)]
    pub style: OperationStyle,
}

impl TryFrom<SignatureDescription> for OperationSignature {
    type Error = SignatureError;

    fn try_from(description: SignatureDescription) -> Result<Self, Self::Error> {
        OperationSignature::new(
            description.name,
            description.parameters,
            description.returns.into(),
            description.style,
        )
    }
}
