//! Request decoder: raw body bytes + signature → ordered argument list.
//!
//! Values are checked against their declared types while the body streams
//! through `serde_json`, so nothing outside a declared parameter is ever
//! materialized. Unknown keys of a wrapped object are skipped with
//! `IgnoredAny`.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use serde::de::{
    self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Unexpected, Visitor,
};
use serde::{Deserialize, Deserializer};
use serde_json::error::Category;
use serde_json::{Map, Value};

use crate::enum_codec::{EnumRejection, EnumType};
use crate::error::DecodeError;
use crate::signature::{DecodeStrategy, OperationSignature, ParameterIndex};
use crate::types::{NamedType, PathSegment, TypeDescriptor};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One slot per declared parameter, in declaration order.
///
/// Slots the payload did not mention hold their type's default value.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArguments {
    names: Arc<[String]>,
    slots: Vec<Value>,
}

impl DecodedArguments {
    /// Every slot at its type's default. Used when the request body is not
    /// read at all, e.g. for GET and HEAD operations.
    pub fn defaults(signature: &OperationSignature) -> Self {
        Self {
            names: signature.parameter_names().clone(),
            slots: signature
                .parameters()
                .iter()
                .map(|p| p.ty.default_value())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.slots.get(i))
    }

    pub fn values(&self) -> &[Value] {
        &self.slots
    }

    pub fn into_values(self) -> Vec<Value> {
        self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.slots.iter())
    }

    /// Move a slot out as a concrete Rust type. The slot is left `null`.
    pub fn take<T: DeserializeOwned>(&mut self, index: usize) -> Result<T, DecodeError> {
        let parameter = self
            .names
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string());
        let value = self
            .slots
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|source| DecodeError::InvalidParameter { parameter, source })
    }

    /// Render the arguments as a wrapped object keyed by parameter name.
    pub fn to_object(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }
}

/// Decode `body` into the argument list described by `signature`.
pub fn decode(body: &[u8], signature: &OperationSignature) -> Result<DecodedArguments, DecodeError> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);

    let result = match signature.strategy() {
        DecodeStrategy::Empty => Ok(Vec::new()),
        DecodeStrategy::Bare => decode_bare(body, &signature.parameters()[0]).map(|v| vec![v]),
        DecodeStrategy::Wrapped(index) => decode_wrapped(body, signature.parameters(), index),
    };

    match result {
        Ok(slots) => {
            tracing::debug!(
                operation = signature.name(),
                arguments = slots.len(),
                bytes = body.len(),
                "decoded request"
            );
            Ok(DecodedArguments {
                names: signature.parameter_names().clone(),
                slots,
            })
        }
        Err(err) => {
            tracing::warn!(operation = signature.name(), error = %err, "rejected request payload");
            Err(err)
        }
    }
}

fn decode_bare(body: &[u8], parameter: &NamedType) -> Result<Value, DecodeError> {
    let ctx = DecodeContext::default();
    let mut de = serde_json::Deserializer::from_slice(body);
    TypedSeed::new(&parameter.ty, &ctx)
        .deserialize(&mut de)
        .and_then(|value| de.end().map(|()| value))
        .map_err(|err| ctx.into_error(err, Some(&parameter.name)))
}

fn decode_wrapped(
    body: &[u8],
    parameters: &[NamedType],
    index: &ParameterIndex,
) -> Result<Vec<Value>, DecodeError> {
    if first_token(body) != Some(b'{') {
        // Valid JSON of another shape is a shape error; anything else is
        // reported as the syntax error it is.
        return Err(match serde_json::from_slice::<IgnoredAny>(body) {
            Ok(_) => DecodeError::ShapeMismatch,
            Err(source) => DecodeError::MalformedPayload {
                parameter: None,
                source,
            },
        });
    }

    let ctx = DecodeContext::default();
    let mut de = serde_json::Deserializer::from_slice(body);
    let visitor = MembersVisitor {
        members: parameters,
        lookup: Lookup::Index(index),
        ctx: &ctx,
    };
    (&mut de)
        .deserialize_map(visitor)
        .and_then(|slots| de.end().map(|()| slots))
        .map_err(|err| ctx.into_error(err, None))
}

fn first_token(body: &[u8]) -> Option<u8> {
    body.iter()
        .copied()
        .find(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

// ---------------------------------------------------------------------------
// Decode context
// ---------------------------------------------------------------------------

/// Side channel for the streaming visitors: where in the payload we are,
/// and whether an enum check is what failed.
#[derive(Default)]
struct DecodeContext {
    path: RefCell<Vec<PathSegment>>,
    rejection: RefCell<Option<EnumRejection>>,
}

impl DecodeContext {
    fn enter(&self, segment: PathSegment) {
        self.path.borrow_mut().push(segment);
    }

    fn leave(&self) {
        self.path.borrow_mut().pop();
    }

    fn reject(&self, rejection: EnumRejection) {
        self.rejection.borrow_mut().get_or_insert(rejection);
    }

    fn into_error(self, err: serde_json::Error, root: Option<&str>) -> DecodeError {
        let location = self
            .path
            .into_inner()
            .iter()
            .fold(root.unwrap_or_default().to_string(), |path, segment| {
                segment.append_to(&path)
            });
        let location = (!location.is_empty()).then_some(location);

        if let Some(rejection) = self.rejection.into_inner() {
            return DecodeError::InvalidEnumValue {
                parameter: location.unwrap_or_default(),
                enum_name: rejection.enum_name,
                found: rejection.found,
            };
        }

        match err.classify() {
            Category::Data => DecodeError::InvalidParameter {
                parameter: location.unwrap_or_default(),
                source: err,
            },
            Category::Syntax | Category::Eof | Category::Io => DecodeError::MalformedPayload {
                parameter: location,
                source: err,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Typed streaming deserialization
// ---------------------------------------------------------------------------

/// Deserializes one value, enforcing its descriptor as it goes.
struct TypedSeed<'a> {
    ty: &'a TypeDescriptor,
    ctx: &'a DecodeContext,
}

impl<'a> TypedSeed<'a> {
    fn new(ty: &'a TypeDescriptor, ctx: &'a DecodeContext) -> Self {
        Self { ty, ctx }
    }
}

impl<'de, 'a> DeserializeSeed<'de> for TypedSeed<'a> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        let ctx = self.ctx;
        match self.ty {
            TypeDescriptor::Any => Value::deserialize(deserializer),
            TypeDescriptor::Bool => bool::deserialize(deserializer).map(Value::Bool),
            TypeDescriptor::String => String::deserialize(deserializer).map(Value::String),
            TypeDescriptor::Integer => deserializer.deserialize_any(NumberVisitor { integral: true }),
            TypeDescriptor::Float => deserializer.deserialize_any(NumberVisitor { integral: false }),
            TypeDescriptor::Enum(ty) => deserializer.deserialize_any(EnumVisitor { ty, ctx }),
            TypeDescriptor::Array { items } => {
                deserializer.deserialize_seq(ArrayVisitor { items, ctx })
            }
            TypeDescriptor::Map { values } => {
                deserializer.deserialize_map(MapVisitor { values, ctx })
            }
            TypeDescriptor::Record(record) => {
                let slots = deserializer.deserialize_map(MembersVisitor {
                    members: &record.fields,
                    lookup: Lookup::Scan,
                    ctx,
                })?;
                Ok(Value::Object(
                    record
                        .fields
                        .iter()
                        .map(|f| f.name.clone())
                        .zip(slots)
                        .collect(),
                ))
            }
            TypeDescriptor::Optional { inner } => {
                deserializer.deserialize_option(OptionVisitor { inner, ctx })
            }
        }
    }
}

struct NumberVisitor {
    integral: bool,
}

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(if self.integral { "an integer" } else { "a number" })
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        if self.integral {
            return Err(E::invalid_type(Unexpected::Float(v), &self));
        }
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
    }
}

struct EnumVisitor<'a> {
    ty: &'a EnumType,
    ctx: &'a DecodeContext,
}

impl<'a> EnumVisitor<'a> {
    fn refuse<E: de::Error>(&self, found: Value, unexpected: Unexpected) -> E {
        self.ctx.reject(self.ty.reject(&found));
        E::invalid_type(unexpected, self)
    }
}

impl<'de, 'a> Visitor<'de> for EnumVisitor<'a> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "one of the declared names of enum {}", self.ty.name)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        match self.ty.decode_str(v) {
            Ok(name) => Ok(Value::String(name.to_string())),
            Err(rejection) => {
                self.ctx.reject(rejection);
                Err(E::invalid_value(Unexpected::Str(v), &self))
            }
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Err(self.refuse(Value::from(v), Unexpected::Signed(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Err(self.refuse(Value::from(v), Unexpected::Unsigned(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Err(self.refuse(Value::from(v), Unexpected::Float(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Err(self.refuse(Value::Bool(v), Unexpected::Bool(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Err(self.refuse(Value::Null, Unexpected::Unit))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut elements = Vec::new();
        while let Some(element) = seq.next_element::<Value>()? {
            elements.push(element);
        }
        Err(self.refuse(Value::Array(elements), Unexpected::Seq))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = Map::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.insert(key, value);
        }
        Err(self.refuse(Value::Object(entries), Unexpected::Map))
    }
}

struct ArrayVisitor<'a> {
    items: &'a TypeDescriptor,
    ctx: &'a DecodeContext,
}

impl<'de, 'a> Visitor<'de> for ArrayVisitor<'a> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut elements = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        loop {
            self.ctx.enter(PathSegment::Index(elements.len()));
            match seq.next_element_seed(TypedSeed::new(self.items, self.ctx))? {
                Some(element) => elements.push(element),
                None => {
                    self.ctx.leave();
                    break;
                }
            }
            self.ctx.leave();
        }
        Ok(Value::Array(elements))
    }
}

struct MapVisitor<'a> {
    values: &'a TypeDescriptor,
    ctx: &'a DecodeContext,
}

impl<'de, 'a> Visitor<'de> for MapVisitor<'a> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            self.ctx.enter(PathSegment::Key(key.clone()));
            let value = map.next_value_seed(TypedSeed::new(self.values, self.ctx))?;
            self.ctx.leave();
            entries.insert(key, value);
        }
        Ok(Value::Object(entries))
    }
}

struct OptionVisitor<'a> {
    inner: &'a TypeDescriptor,
    ctx: &'a DecodeContext,
}

impl<'de, 'a> Visitor<'de> for OptionVisitor<'a> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} or null", self.inner.describe())
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        TypedSeed::new(self.inner, self.ctx).deserialize(deserializer)
    }
}

enum Lookup<'a> {
    Index(&'a ParameterIndex),
    Scan,
}

/// Streams a wrapped object into one slot per member, in declaration order.
/// Shared by multi-parameter request bodies and record values.
struct MembersVisitor<'a> {
    members: &'a [NamedType],
    lookup: Lookup<'a>,
    ctx: &'a DecodeContext,
}

impl<'a> MembersVisitor<'a> {
    fn position(&self, key: &str) -> Option<usize> {
        match self.lookup {
            Lookup::Index(index) => index.position(key),
            Lookup::Scan => self.members.iter().position(|m| m.name == key),
        }
    }
}

impl<'de, 'a> Visitor<'de> for MembersVisitor<'a> {
    type Value = Vec<Value>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<Value>, A::Error> {
        let mut slots: Vec<Value> = self.members.iter().map(|m| m.ty.default_value()).collect();

        while let Some(key) = map.next_key::<String>()? {
            match self.position(&key) {
                Some(i) => {
                    let member = &self.members[i];
                    self.ctx.enter(PathSegment::Key(member.name.clone()));
                    slots[i] = map.next_value_seed(TypedSeed::new(&member.ty, self.ctx))?;
                    self.ctx.leave();
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                    tracing::trace!(field = %key, "skipped unknown field");
                }
            }
        }

        Ok(slots)
    }
}
