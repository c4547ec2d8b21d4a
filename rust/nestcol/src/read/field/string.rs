use std::sync::Arc;

use nestcol_common::{Result, error::Error};
use nestcol_format::{basic_type::BasicType, ids::FieldId};

use crate::read::{
    column::{Column, ColumnType},
    page_source::{PageSource, ReadCallback},
    value::Value,
};

use super::{Field, FieldCore, ReadIndex, collection::offsets_info, connected, resolve_index};

/// Field object for UTF-8 `String` fields.
///
/// Strings use two columns: an index column of per-cluster end offsets (#0) and
/// a byte column with the concatenated characters (#1).
pub struct StringField {
    core: FieldCore,
    offsets: Option<Arc<Column>>,
    bytes: Option<Arc<Column>>,
}

impl StringField {
    pub fn new(name: impl Into<String>) -> StringField {
        StringField {
            core: FieldCore::new(name),
            offsets: None,
            bytes: None,
        }
    }
}

impl Field for StringField {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn basic_type(&self) -> BasicType {
        BasicType::String
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
        self.core.verify_on_disk_type(source, BasicType::String)?;
        let offsets = self.core.open_column(source, 0, ColumnType::Index)?;
        let bytes = self.core.open_column(source, 1, ColumnType::Bytes)?;
        self.offsets = Some(offsets);
        self.bytes = Some(bytes);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.offsets.is_some() && self.bytes.is_some()
    }

    fn element_count(&self) -> u64 {
        self.offsets.as_ref().map_or(0, |c| c.element_count())
    }

    fn check_index(&self, index: ReadIndex) -> Result<()> {
        let column = connected(&self.offsets, self.core.name())?;
        resolve_index(column, index).map(|_| ())
    }

    fn create_value(&self) -> Value {
        Value::String(String::new())
    }

    fn read_raw(&self, index: ReadIndex, value: &mut Value) -> Result<()> {
        let offsets = connected(&self.offsets, self.core.name())?;
        let bytes = connected(&self.bytes, self.core.name())?;
        let index = resolve_index(offsets, index)?;
        let (start, len) = offsets_info(offsets, index)?;

        let mut buf = Vec::with_capacity(len.get() as usize);
        bytes.read_bytes(start, len.get() as u64, &mut buf)?;
        let s = String::from_utf8(buf).map_err(|e| {
            Error::invalid_format(self.name(), format!("invalid UTF-8 at {index}: {e}"))
        })?;
        *value = Value::String(s);
        Ok(())
    }
}
