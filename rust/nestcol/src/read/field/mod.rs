//! Field objects: per-kind readers bound to one field of the dataset.
//!
//! A field object is created unbound (by name), marked with its on-disk [`FieldId`],
//! and then connected to a [`PageSource`], which hands it the columns it reads from.
//! Field objects never link to a parent field; nested fields are addressed directly
//! through their own identifiers.

use nestcol_common::{Result, error::Error};
use nestcol_format::{
    basic_type::BasicType,
    descriptor::DatasetDescriptor,
    ids::{ClusterIndex, FieldId, LinearIndex},
};

use super::{
    column::Column,
    page_source::{PageSource, ReadCallback},
    value::Value,
};

pub mod boolean;
pub mod collection;
pub mod primitive;
pub mod record;
pub mod string;

pub use boolean::BooleanField;
pub use collection::CollectionField;
pub use primitive::{PrimitiveElement, PrimitiveField};
pub use record::RecordField;
pub use string::StringField;

bitflags::bitflags! {
    /// Capabilities of a field kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldTraits: u32 {
        /// Elements can be referenced in place within their decoded page.
        const MAPPABLE = 0x01;
    }
}

/// An element index in one of the two addressing schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadIndex {
    /// Dataset-global index of the element.
    Global(LinearIndex),
    /// Index of the element within a specific cluster.
    Cluster(ClusterIndex),
}

impl From<LinearIndex> for ReadIndex {
    fn from(index: LinearIndex) -> Self {
        ReadIndex::Global(index)
    }
}

impl From<ClusterIndex> for ReadIndex {
    fn from(index: ClusterIndex) -> Self {
        ReadIndex::Cluster(index)
    }
}

impl std::fmt::Display for ReadIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadIndex::Global(index) => write!(f, "{index}"),
            ReadIndex::Cluster(index) => write!(f, "{index}"),
        }
    }
}

/// Common interface of all field objects.
pub trait Field: Send + Sync {
    /// Qualified (dot-separated) name of the field.
    fn name(&self) -> &str;

    fn basic_type(&self) -> BasicType;

    fn traits(&self) -> FieldTraits {
        FieldTraits::empty()
    }

    fn on_disk_id(&self) -> FieldId;

    /// Binds the field object to the field with the given identifier.
    fn set_on_disk_id(&mut self, id: FieldId);

    fn read_callbacks(&self) -> &[ReadCallback];

    fn add_read_callback(&mut self, callback: ReadCallback);

    fn has_read_callbacks(&self) -> bool {
        !self.read_callbacks().is_empty()
    }

    /// Verifies the on-disk type of the field and acquires its columns.
    fn connect(&mut self, source: &dyn PageSource) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Total number of elements of this field across all clusters.
    fn element_count(&self) -> u64;

    /// Verifies that `index` addresses an existing element.
    fn check_index(&self, index: ReadIndex) -> Result<()>;

    /// Creates a holder suitable as a destination for [`read`](Self::read).
    fn create_value(&self) -> Value;

    /// Decodes the element at `index` into `value`, without running read callbacks.
    ///
    /// `value` is left untouched if the read fails.
    fn read_raw(&self, index: ReadIndex, value: &mut Value) -> Result<()>;

    /// Decodes the element at `index` into `value` and runs the read callbacks.
    fn read(&self, index: ReadIndex, value: &mut Value) -> Result<()> {
        self.read_raw(index, value)?;
        for callback in self.read_callbacks() {
            callback(&mut *value);
        }
        Ok(())
    }
}

/// State shared by all field kinds: name, on-disk binding and read callbacks.
pub(crate) struct FieldCore {
    name: String,
    on_disk_id: FieldId,
    callbacks: Vec<ReadCallback>,
}

impl FieldCore {
    pub(crate) fn new(name: impl Into<String>) -> FieldCore {
        FieldCore {
            name: name.into(),
            on_disk_id: FieldId::invalid(),
            callbacks: Vec::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn on_disk_id(&self) -> FieldId {
        self.on_disk_id
    }

    pub(crate) fn set_on_disk_id(&mut self, id: FieldId) {
        self.on_disk_id = id;
    }

    pub(crate) fn callbacks(&self) -> &[ReadCallback] {
        &self.callbacks
    }

    pub(crate) fn add_callback(&mut self, callback: ReadCallback) {
        self.callbacks.push(callback);
    }

    /// Checks that the bound on-disk field has the expected type.
    pub(crate) fn verify_on_disk_type(
        &self,
        source: &dyn PageSource,
        expected: BasicType,
    ) -> Result<()> {
        if !self.on_disk_id.is_valid() {
            return Err(Error::invalid_operation(format!(
                "connect field '{}' without on-disk id",
                self.name
            )));
        }
        let descriptor = source.shared_descriptor();
        let actual = descriptor.field_descriptor(self.on_disk_id)?.basic_type;
        if actual != expected {
            return Err(Error::type_mismatch(
                &self.name,
                expected.name(),
                actual.name(),
            ));
        }
        Ok(())
    }

    /// Opens the field's column `ordinal` and checks its physical type.
    pub(crate) fn open_column(
        &self,
        source: &dyn PageSource,
        ordinal: u32,
        expected: super::column::ColumnType,
    ) -> Result<std::sync::Arc<Column>> {
        let column = source.open_column(self.on_disk_id, ordinal)?;
        if column.column_type() != expected {
            return Err(Error::invalid_format(
                &self.name,
                format!(
                    "column #{ordinal} has type {:?}, expected {expected:?}",
                    column.column_type()
                ),
            ));
        }
        Ok(column)
    }
}

/// Returns the connected column, or fails for a field that was never connected.
pub(crate) fn connected<'a>(
    column: &'a Option<std::sync::Arc<Column>>,
    name: &str,
) -> Result<&'a Column> {
    column
        .as_deref()
        .ok_or_else(|| Error::invalid_operation(format!("read from unconnected field '{name}'")))
}

/// Resolves `index` to a validated cluster-local index of `column`.
pub(crate) fn resolve_index(column: &Column, index: ReadIndex) -> Result<ClusterIndex> {
    match index {
        ReadIndex::Global(index) => column.to_cluster_index(index),
        ReadIndex::Cluster(index) => {
            column.check_cluster_index(index)?;
            Ok(index)
        }
    }
}

/// Attaches the read callbacks registered for the field's on-disk id.
pub(crate) fn attach_read_callbacks(field: &mut dyn Field, source: &dyn PageSource) {
    for callback in source.read_callbacks(field.on_disk_id()) {
        field.add_read_callback(callback);
    }
}

/// Builds an unconnected field object for the given field from its descriptor.
///
/// Record fields get their subfields built recursively.
pub fn create_field(descriptor: &DatasetDescriptor, field_id: FieldId) -> Result<Box<dyn Field>> {
    let field_desc = descriptor.field_descriptor(field_id)?;
    let name = descriptor.qualified_name(field_id)?;
    let mut field: Box<dyn Field> = match field_desc.basic_type {
        BasicType::Boolean => Box::new(BooleanField::new(name)),
        BasicType::Int8 => Box::new(PrimitiveField::<i8>::new(name)),
        BasicType::Int16 => Box::new(PrimitiveField::<i16>::new(name)),
        BasicType::Int32 => Box::new(PrimitiveField::<i32>::new(name)),
        BasicType::Int64 => Box::new(PrimitiveField::<i64>::new(name)),
        BasicType::UInt8 => Box::new(PrimitiveField::<u8>::new(name)),
        BasicType::UInt16 => Box::new(PrimitiveField::<u16>::new(name)),
        BasicType::UInt32 => Box::new(PrimitiveField::<u32>::new(name)),
        BasicType::UInt64 => Box::new(PrimitiveField::<u64>::new(name)),
        BasicType::Float32 => Box::new(PrimitiveField::<f32>::new(name)),
        BasicType::Float64 => Box::new(PrimitiveField::<f64>::new(name)),
        BasicType::String => Box::new(StringField::new(name)),
        BasicType::Collection => Box::new(CollectionField::new(name)),
        BasicType::Record => {
            let mut member_names = Vec::with_capacity(field_desc.children.len());
            let mut children = Vec::with_capacity(field_desc.children.len());
            for &child_id in &field_desc.children {
                member_names.push(descriptor.field_descriptor(child_id)?.name.clone());
                children.push(create_field(descriptor, child_id)?);
            }
            Box::new(RecordField::new(name, member_names, children)?)
        }
    };
    field.set_on_disk_id(field_id);
    Ok(field)
}
