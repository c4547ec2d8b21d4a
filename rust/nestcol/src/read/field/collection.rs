//! Collection fields: each instance owns a run of child elements in the same cluster.

use std::sync::Arc;

use nestcol_common::{Result, verify_data};
use nestcol_format::{
    basic_type::BasicType,
    ids::{ClusterIndex, FieldId},
};

use crate::read::{
    column::{Column, ColumnType},
    element::CollectionSize,
    page_source::{PageSource, ReadCallback},
    value::Value,
};

use super::{Field, FieldCore, ReadIndex, connected, resolve_index};

/// Resolves the instance at `index` of an offsets (index) column into the
/// cluster-local start of its children and their count.
///
/// The index column stores, per cluster, the end offset of each instance relative
/// to the start of the cluster; the start of instance `i` is the end of `i - 1`.
pub(crate) fn offsets_info(
    column: &Column,
    index: ClusterIndex,
) -> Result<(ClusterIndex, CollectionSize)> {
    let end = *column.value::<u32>(index)?;
    let start = if index.index() == 0 {
        0
    } else {
        *column.value::<u32>(ClusterIndex::new(index.cluster_id(), index.index() - 1))?
    };
    verify_data!(offsets, end >= start);
    Ok((
        ClusterIndex::new(index.cluster_id(), start as u64),
        CollectionSize::new(end - start),
    ))
}

/// Field object for `Collection` fields.
///
/// The field reads the collection's index column. Its element type is the
/// [`CollectionSize`] of each instance; the children themselves are read through
/// their own fields.
pub struct CollectionField {
    core: FieldCore,
    column: Option<Arc<Column>>,
}

impl CollectionField {
    pub fn new(name: impl Into<String>) -> CollectionField {
        CollectionField {
            core: FieldCore::new(name),
            column: None,
        }
    }

    /// Returns the cluster-local index of the first child of the instance at
    /// `index`, along with the number of children.
    pub fn collection_info(&self, index: ReadIndex) -> Result<(ClusterIndex, CollectionSize)> {
        let column = connected(&self.column, self.core.name())?;
        let index = resolve_index(column, index)?;
        offsets_info(column, index)
    }
}

impl Field for CollectionField {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn basic_type(&self) -> BasicType {
        BasicType::Collection
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
        self.core.verify_on_disk_type(source, BasicType::Collection)?;
        let column = self.core.open_column(source, 0, ColumnType::Index)?;
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
        Value::Collection(CollectionSize::default())
    }

    fn read_raw(&self, index: ReadIndex, value: &mut Value) -> Result<()> {
        let (_, size) = self.collection_info(index)?;
        *value = Value::Collection(size);
        Ok(())
    }
}
