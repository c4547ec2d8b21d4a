//! Typed access to a single field.

use std::{marker::PhantomData, sync::Arc};

use nestcol_common::{Result, error::Error};
use nestcol_format::ids::FieldId;

use super::{
    element::{ElementCapability, ElementField, MappableElement, ViewElement},
    field::{Field, FieldTraits, ReadIndex, attach_read_callbacks},
    index_range::GlobalIndexRange,
    page_source::PageSource,
    value::Value,
};

/// A view binds one field of the dataset to the element type `T` and serves
/// random access to its elements.
///
/// For mappable element types (the fixed-width numerics), [`get`](Self::get) returns
/// a reference directly into the page holding the element. For everything else the
/// element is decoded into a scratch holder owned by the view, and the returned
/// reference borrows that holder. Either way the reference borrows the view, so it
/// cannot be held across the next access.
///
/// The view never links its field object to a parent field: nested fields are
/// addressed by their own identifier, and their indices come from the parent's
/// [`CollectionView`](crate::read::collection_view::CollectionView).
pub struct TypedView<T: ViewElement> {
    field: T::Field,
    value: Value,
    source: Arc<dyn PageSource>,
    _p: PhantomData<fn() -> T>,
}

impl<T: ViewElement> TypedView<T> {
    /// Creates a view over the field `field_id` of the given page source.
    ///
    /// # Errors
    ///
    /// - `IncompatibleView` if `T` is mappable and the field has read callbacks.
    ///   This is checked before connecting to the page source.
    /// - `TypeMismatch` if the on-disk type of the field differs from `T`.
    pub fn new(field_id: FieldId, source: Arc<dyn PageSource>) -> Result<TypedView<T>> {
        let name = source.shared_descriptor().qualified_name(field_id)?;
        let mut field = T::Field::with_name(name);
        field.set_on_disk_id(field_id);
        attach_read_callbacks(&mut field, source.as_ref());

        if field.traits().contains(FieldTraits::MAPPABLE) && field.has_read_callbacks() {
            return Err(Error::incompatible_view(field.name()));
        }

        field.connect(source.as_ref())?;
        let value = field.create_value();
        log::debug!(
            "view over '{}' ({}, {:?}): {} elements",
            field.name(),
            T::BASIC_TYPE,
            T::CAPABILITY,
            field.element_count()
        );
        Ok(TypedView {
            field,
            value,
            source,
            _p: PhantomData,
        })
    }

    pub fn field(&self) -> &T::Field {
        &self.field
    }

    pub fn field_id(&self) -> FieldId {
        self.field.on_disk_id()
    }

    pub fn source(&self) -> &Arc<dyn PageSource> {
        &self.source
    }

    /// The full index range of the field: `[0, element_count)`.
    pub fn field_range(&self) -> GlobalIndexRange {
        GlobalIndexRange::new(0, self.field.element_count())
    }

    /// Returns the element at `index`, given as a global `u64` index or as a
    /// [`ClusterIndex`](nestcol_format::ids::ClusterIndex).
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the index lies outside the field (or outside the named
    /// cluster). The scratch holder is only overwritten by a successful read.
    pub fn get(&mut self, index: impl Into<ReadIndex>) -> Result<&T> {
        let index = index.into();
        match T::CAPABILITY {
            ElementCapability::Mappable => self.field.map(index),
            ElementCapability::CopyOnly => {
                self.field.read(index, &mut self.value)?;
                T::from_value(&self.value).ok_or_else(|| {
                    Error::type_mismatch(
                        self.field.name(),
                        T::BASIC_TYPE.name(),
                        self.value.basic_type().name(),
                    )
                })
            }
        }
    }

    /// The scratch holder; holds the last element decoded by [`get`](Self::get) on
    /// the copying path.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<T: MappableElement> TypedView<T> {
    /// Returns the contiguous run of elements starting at `index` and extending to
    /// the end of the page that holds it.
    ///
    /// Only available for mappable element types.
    pub fn map_batch(&mut self, index: impl Into<ReadIndex>) -> Result<&[T]> {
        self.field.map_batch(index.into())
    }
}
