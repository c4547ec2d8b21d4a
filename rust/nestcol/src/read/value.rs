//! The decoded-value holder filled in place by field reads.

use nestcol_format::basic_type::BasicType;

use super::element::CollectionSize;

/// A reusable destination for decoded field values.
///
/// `Value` is a closed set of tagged variants, one per storable shape. A field's
/// [`create_value`](crate::read::field::Field::create_value) produces a holder of the
/// right variant, and every subsequent read overwrites it in place, reusing any
/// allocation (string buffers, record members).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    /// The element count of a collection instance.
    Collection(CollectionSize),
    /// Named member values of a record, in declaration order.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Creates the default holder for a non-record field of the given type.
    pub fn default_for(basic_type: BasicType) -> Value {
        match basic_type {
            BasicType::Boolean => Value::Boolean(false),
            BasicType::Int8 => Value::Int8(0),
            BasicType::Int16 => Value::Int16(0),
            BasicType::Int32 => Value::Int32(0),
            BasicType::Int64 => Value::Int64(0),
            BasicType::UInt8 => Value::UInt8(0),
            BasicType::UInt16 => Value::UInt16(0),
            BasicType::UInt32 => Value::UInt32(0),
            BasicType::UInt64 => Value::UInt64(0),
            BasicType::Float32 => Value::Float32(0.0),
            BasicType::Float64 => Value::Float64(0.0),
            BasicType::String => Value::String(String::new()),
            BasicType::Collection => Value::Collection(CollectionSize::default()),
            BasicType::Record => Value::Record(Vec::new()),
        }
    }

    /// Runtime type tag of the held value.
    pub fn basic_type(&self) -> BasicType {
        match self {
            Value::Boolean(_) => BasicType::Boolean,
            Value::Int8(_) => BasicType::Int8,
            Value::Int16(_) => BasicType::Int16,
            Value::Int32(_) => BasicType::Int32,
            Value::Int64(_) => BasicType::Int64,
            Value::UInt8(_) => BasicType::UInt8,
            Value::UInt16(_) => BasicType::UInt16,
            Value::UInt32(_) => BasicType::UInt32,
            Value::UInt64(_) => BasicType::UInt64,
            Value::Float32(_) => BasicType::Float32,
            Value::Float64(_) => BasicType::Float64,
            Value::String(_) => BasicType::String,
            Value::Collection(_) => BasicType::Collection,
            Value::Record(_) => BasicType::Record,
        }
    }

    /// Returns the record member with the given name, if this is a record.
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widens any integer-valued variant (including collection sizes) to `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::Int8(v) => v as i128,
            Value::Int16(v) => v as i128,
            Value::Int32(v) => v as i128,
            Value::Int64(v) => v as i128,
            Value::UInt8(v) => v as i128,
            Value::UInt16(v) => v as i128,
            Value::UInt32(v) => v as i128,
            Value::UInt64(v) => v as i128,
            Value::Collection(v) => v.get() as i128,
            _ => return None,
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float32(v) => Some(v as f64),
            Value::Float64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    /// Converts the value into JSON for inspection tools.
    ///
    /// Non-finite floats map to `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Boolean(v) => Json::from(*v),
            Value::Int8(v) => Json::from(*v),
            Value::Int16(v) => Json::from(*v),
            Value::Int32(v) => Json::from(*v),
            Value::Int64(v) => Json::from(*v),
            Value::UInt8(v) => Json::from(*v),
            Value::UInt16(v) => Json::from(*v),
            Value::UInt32(v) => Json::from(*v),
            Value::UInt64(v) => Json::from(*v),
            Value::Float32(v) => serde_json::Number::from_f64(*v as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::from(s.as_str()),
            Value::Collection(size) => Json::from(size.get()),
            Value::Record(members) => Json::Object(
                members
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}
