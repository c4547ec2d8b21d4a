use serde::{Deserialize, Serialize};

/// The fundamental type of a field node, without regard to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    /// Variable-length collection; each instance owns a run of child elements.
    Collection,
    /// Group of named subfields sharing the parent's index space.
    Record,
}

impl BasicType {
    /// Returns `true` if the type is a composite (container) type.
    pub fn is_composite(&self) -> bool {
        matches!(self, BasicType::Collection | BasicType::Record)
    }

    /// Returns the fixed size of the primitive type in bytes, or `None`
    /// if the type is variable-length or composite.
    pub fn primitive_size(&self) -> Option<usize> {
        match self {
            BasicType::Boolean | BasicType::Int8 | BasicType::UInt8 => Some(1),
            BasicType::Int16 | BasicType::UInt16 => Some(2),
            BasicType::Int32 | BasicType::UInt32 | BasicType::Float32 => Some(4),
            BasicType::Int64 | BasicType::UInt64 | BasicType::Float64 => Some(8),
            BasicType::String | BasicType::Collection | BasicType::Record => None,
        }
    }

    /// Returns `true` if values of this type are stored in a layout that can be
    /// referenced directly from a decoded page.
    ///
    /// Booleans are stored as bytes but are not mappable, since not every byte
    /// pattern is a valid `bool`.
    pub fn is_mappable(&self) -> bool {
        self.primitive_size().is_some() && *self != BasicType::Boolean
    }

    pub fn name(&self) -> &'static str {
        match self {
            BasicType::Boolean => "bool",
            BasicType::Int8 => "i8",
            BasicType::Int16 => "i16",
            BasicType::Int32 => "i32",
            BasicType::Int64 => "i64",
            BasicType::UInt8 => "u8",
            BasicType::UInt16 => "u16",
            BasicType::UInt32 => "u32",
            BasicType::UInt64 => "u64",
            BasicType::Float32 => "f32",
            BasicType::Float64 => "f64",
            BasicType::String => "string",
            BasicType::Collection => "collection",
            BasicType::Record => "record",
        }
    }
}

impl std::fmt::Display for BasicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
