use std::sync::Arc;

use nestcol_common::Result;
use nestcol_format::{basic_type::BasicType, ids::FieldId};

use crate::read::{
    column::{Column, ColumnType},
    page_source::{PageSource, ReadCallback},
    value::Value,
};

use super::{Field, FieldCore, ReadIndex, connected, resolve_index};

/// Field object for `Boolean` fields.
///
/// Booleans are stored one per byte; any non-zero byte decodes as `true`. Since
/// not every byte is a valid `bool`, the field is read through the decoded-value
/// holder rather than mapped.
pub struct BooleanField {
    core: FieldCore,
    column: Option<Arc<Column>>,
}

impl BooleanField {
    pub fn new(name: impl Into<String>) -> BooleanField {
        BooleanField {
            core: FieldCore::new(name),
            column: None,
        }
    }
}

impl Field for BooleanField {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn basic_type(&self) -> BasicType {
        BasicType::Boolean
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
        self.core.verify_on_disk_type(source, BasicType::Boolean)?;
        let column = self
            .core
            .open_column(source, 0, ColumnType::Data(BasicType::Boolean))?;
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
        Value::Boolean(false)
    }

    fn read_raw(&self, index: ReadIndex, value: &mut Value) -> Result<()> {
        let column = connected(&self.column, self.core.name())?;
        let index = resolve_index(column, index)?;
        let byte = *column.value::<u8>(index)?;
        *value = Value::Boolean(byte != 0);
        Ok(())
    }
}
