//! Fixed-width numeric fields, readable in place from their pages.

use std::{marker::PhantomData, sync::Arc};

use nestcol_common::Result;
use nestcol_format::{basic_type::BasicType, ids::FieldId};

use crate::read::{
    column::{Column, ColumnType},
    page_source::{PageSource, ReadCallback},
    value::Value,
};

use super::{Field, FieldCore, FieldTraits, ReadIndex, connected, resolve_index};

/// A fixed-width numeric type stored verbatim in a column.
pub trait PrimitiveElement:
    bytemuck::Pod + std::fmt::Debug + PartialEq + Send + Sync + 'static
{
    const BASIC_TYPE: BasicType;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<&Self>;
}

macro_rules! impl_primitive_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PrimitiveElement for $ty {
                const BASIC_TYPE: BasicType = BasicType::$variant;

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                #[inline]
                fn from_value(value: &Value) -> Option<&Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_primitive_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

/// Field object for primitive numeric types.
///
/// Supports zero-copy access: [`map`](Self::map) and [`map_batch`](Self::map_batch)
/// return references directly into the decoded page.
pub struct PrimitiveField<T> {
    core: FieldCore,
    column: Option<Arc<Column>>,
    _p: PhantomData<fn() -> T>,
}

impl<T: PrimitiveElement> PrimitiveField<T> {
    pub fn new(name: impl Into<String>) -> PrimitiveField<T> {
        PrimitiveField {
            core: FieldCore::new(name),
            column: None,
            _p: PhantomData,
        }
    }

    /// Returns a reference to the element, within its page.
    pub fn map(&self, index: ReadIndex) -> Result<&T> {
        let column = connected(&self.column, self.core.name())?;
        let index = resolve_index(column, index)?;
        column.value::<T>(index)
    }

    /// Returns the contiguous run of elements from `index` to the end of its page.
    ///
    /// The run is never empty for a valid index.
    pub fn map_batch(&self, index: ReadIndex) -> Result<&[T]> {
        let column = connected(&self.column, self.core.name())?;
        let index = resolve_index(column, index)?;
        column.run::<T>(index)
    }
}

impl<T: PrimitiveElement> Field for PrimitiveField<T> {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn basic_type(&self) -> BasicType {
        T::BASIC_TYPE
    }

    fn traits(&self) -> FieldTraits {
        FieldTraits::MAPPABLE
    }

    fn on_disk_id(&self) -> FieldId {
        self.core.on_disk_id()
    }

    fn set_on_disk_id(&mut self, id: FieldId) {
        self.core.set_on_disk_id(id);
    }

    fn read_callbacks(&self) -> &[ReadCallback] {
        self.core.callbacks()
    }

    fn add_read_callback(&mut self, callback: ReadCallback) {
        self.core.add_callback(callback);
    }

    fn connect(&mut self, source: &dyn PageSource) -> Result<()> {
        self.core.verify_on_disk_type(source, T::BASIC_TYPE)?;
        let column = self
            .core
            .open_column(source, 0, ColumnType::Data(T::BASIC_TYPE))?;
        self.column = Some(column);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.column.is_some()
    }

    fn element_count(&self) -> u64 {
        self.column.as_ref().map_or(0, |c| c.element_count())
    }

    fn check_index(&self, index: ReadIndex) -> Result<()> {
        let column = connected(&self.column, self.core.name())?;
        resolve_index(column, index).map(|_| ())
    }

    fn create_value(&self) -> Value {
        Value::default_for(T::BASIC_TYPE)
    }

    fn read_raw(&self, index: ReadIndex, value: &mut Value) -> Result<()> {
        *value = self.map(index)?.into_value();
        Ok(())
    }
}
