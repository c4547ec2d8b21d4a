//! Element types readable through a [`TypedView`](crate::read::view::TypedView).
//!
//! Every element type names the field object that reads it and declares, as an
//! explicit tag, whether that field kind supports zero-copy mapping. Views branch on
//! the tag; since it is a constant, the branch is resolved at compile time.

use nestcol_common::{Result, error::Error};
use nestcol_format::basic_type::BasicType;

use super::{
    field::{
        BooleanField, CollectionField, Field, PrimitiveElement, PrimitiveField, ReadIndex,
        StringField,
    },
    value::Value,
};

/// The element count of one collection instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionSize(u32);

impl CollectionSize {
    pub const fn new(size: u32) -> CollectionSize {
        CollectionSize(size)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl From<CollectionSize> for u64 {
    fn from(size: CollectionSize) -> u64 {
        size.0 as u64
    }
}

impl std::fmt::Display for CollectionSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How a view accesses the elements of a field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCapability {
    /// Elements are referenced in place, within their decoded page.
    Mappable,
    /// Elements are deserialized into the view's value holder.
    CopyOnly,
}

/// A Rust type that a [`TypedView`](crate::read::view::TypedView) can return.
pub trait ViewElement: Sized + 'static {
    /// The on-disk type the element is read from.
    const BASIC_TYPE: BasicType;

    const CAPABILITY: ElementCapability;

    /// The field object reading this element type.
    type Field: ElementField<Self>;

    /// Typed accessor of a decoded-value holder.
    fn from_value(value: &Value) -> Option<&Self>;
}

/// Field objects constructible by name for a given element type.
pub trait ElementField<T>: Field + Sized {
    fn with_name(name: String) -> Self;

    /// Returns a reference to the element within its page.
    ///
    /// Only mappable field kinds override this; the default fails.
    fn map(&self, index: ReadIndex) -> Result<&T> {
        let _ = index;
        Err(Error::invalid_operation(format!(
            "map on non-mappable field '{}'",
            self.name()
        )))
    }
}

/// Element types whose field kind supports zero-copy and batch mapping.
pub trait MappableElement: PrimitiveElement + ViewElement<Field = PrimitiveField<Self>> {}

impl<T: PrimitiveElement> ElementField<T> for PrimitiveField<T> {
    fn with_name(name: String) -> Self {
        PrimitiveField::new(name)
    }

    fn map(&self, index: ReadIndex) -> Result<&T> {
        PrimitiveField::map(self, index)
    }
}

macro_rules! impl_mappable_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ViewElement for $ty {
                const BASIC_TYPE: BasicType = <$ty as PrimitiveElement>::BASIC_TYPE;
                const CAPABILITY: ElementCapability = ElementCapability::Mappable;
                type Field = PrimitiveField<$ty>;

                #[inline]
                fn from_value(value: &Value) -> Option<&Self> {
                    <$ty as PrimitiveElement>::from_value(value)
                }
            }

            impl MappableElement for $ty {}
        )*
    };
}

impl_mappable_element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl ElementField<bool> for BooleanField {
    fn with_name(name: String) -> Self {
        BooleanField::new(name)
    }
}

impl ViewElement for bool {
    const BASIC_TYPE: BasicType = BasicType::Boolean;
    const CAPABILITY: ElementCapability = ElementCapability::CopyOnly;
    type Field = BooleanField;

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl ElementField<String> for StringField {
    fn with_name(name: String) -> Self {
        StringField::new(name)
    }
}

impl ViewElement for String {
    const BASIC_TYPE: BasicType = BasicType::String;
    const CAPABILITY: ElementCapability = ElementCapability::CopyOnly;
    type Field = StringField;

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl ElementField<CollectionSize> for CollectionField {
    fn with_name(name: String) -> Self {
        CollectionField::new(name)
    }
}

impl ViewElement for CollectionSize {
    const BASIC_TYPE: BasicType = BasicType::Collection;
    const CAPABILITY: ElementCapability = ElementCapability::CopyOnly;
    type Field = CollectionField;

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Collection(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks the element's capability tag against its on-disk type.
    fn mappable<T: ViewElement>() -> bool {
        let mappable = T::CAPABILITY == ElementCapability::Mappable;
        assert_eq!(mappable, T::BASIC_TYPE.is_mappable(), "{}", T::BASIC_TYPE);
        mappable
    }

    #[test]
    fn test_capability_follows_storage_layout() {
        assert!(mappable::<i8>());
        assert!(mappable::<u16>());
        assert!(mappable::<u64>());
        assert!(mappable::<f32>());
        assert!(mappable::<f64>());
        assert!(!mappable::<bool>());
        assert!(!mappable::<String>());
        assert!(!mappable::<CollectionSize>());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(<i32 as ViewElement>::from_value(&Value::Int32(7)), Some(&7));
        assert_eq!(<i32 as ViewElement>::from_value(&Value::Int64(7)), None);
        assert_eq!(
            CollectionSize::from_value(&Value::Collection(CollectionSize::new(2))),
            Some(&CollectionSize::new(2))
        );
        assert_eq!(u64::from(CollectionSize::new(5)), 5);
    }
}
