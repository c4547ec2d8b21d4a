use std::sync::Arc;

use nestcol_common::{Result, error::Error};
use nestcol_format::ids::FieldId;

use super::{
    field::{Field, FieldTraits, ReadIndex, attach_read_callbacks, create_field},
    index_range::GlobalIndexRange,
    page_source::PageSource,
    value::Value,
};

/// A view whose element type is only known at runtime.
///
/// The field object is built from the descriptor by [`create_field`], and every
/// element is decoded into a [`Value`] holder. There is no mapped or batch access.
pub struct ErasedView {
    field: Box<dyn Field>,
    value: Value,
    source: Arc<dyn PageSource>,
}

impl ErasedView {
    /// Creates an erased view over the field `field_id`.
    ///
    /// # Errors
    ///
    /// `IncompatibleView` if the field kind is mappable and has read callbacks.
    pub fn new(field_id: FieldId, source: Arc<dyn PageSource>) -> Result<ErasedView> {
        let mut field = create_field(&source.shared_descriptor(), field_id)?;
        attach_read_callbacks(field.as_mut(), source.as_ref());

        if field.traits().contains(FieldTraits::MAPPABLE) && field.has_read_callbacks() {
            return Err(Error::incompatible_view(field.name()));
        }

        field.connect(source.as_ref())?;
        let value = field.create_value();
        log::debug!(
            "erased view over '{}' ({}): {} elements",
            field.name(),
            field.basic_type(),
            field.element_count()
        );
        Ok(ErasedView {
            field,
            value,
            source,
        })
    }

    pub fn field(&self) -> &dyn Field {
        self.field.as_ref()
    }

    pub fn field_id(&self) -> FieldId {
        self.field.on_disk_id()
    }

    pub fn source(&self) -> &Arc<dyn PageSource> {
        &self.source
    }

    pub fn field_range(&self) -> GlobalIndexRange {
        GlobalIndexRange::new(0, self.field.element_count())
    }

    /// Decodes the element at `index` into the holder returned by [`value`](Self::value).
    pub fn read(&mut self, index: impl Into<ReadIndex>) -> Result<()> {
        self.field.read(index.into(), &mut self.value)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}
