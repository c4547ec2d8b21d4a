use nestcol_common::{Result, error::Error, result::verify_index, verify_arg};
use nestcol_format::{basic_type::BasicType, ids::FieldId};

use crate::read::{
    page_source::{PageSource, ReadCallback},
    value::Value,
};

use super::{Field, FieldCore, ReadIndex, attach_read_callbacks};

/// Field object for `Record` fields: a group of subfields sharing the record's
/// index space.
///
/// A record owns no columns. Reading a record reads every subfield at the same
/// index into the corresponding member of a [`Value::Record`].
pub struct RecordField {
    core: FieldCore,
    member_names: Vec<String>,
    children: Vec<Box<dyn Field>>,
}

impl RecordField {
    /// Creates a record field from its members, given as parallel name and field lists.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the lists differ in length.
    pub fn new(
        name: impl Into<String>,
        member_names: Vec<String>,
        children: Vec<Box<dyn Field>>,
    ) -> Result<RecordField> {
        verify_arg!(member_names, member_names.len() == children.len());
        Ok(RecordField {
            core: FieldCore::new(name),
            member_names,
            children,
        })
    }

    pub fn children(&self) -> &[Box<dyn Field>] {
        &self.children
    }

    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }

    fn has_record_shape(&self, value: &Value) -> bool {
        match value {
            Value::Record(members) => {
                members.len() == self.member_names.len()
                    && members
                        .iter()
                        .zip(&self.member_names)
                        .all(|((name, _), expected)| name == expected)
            }
            _ => false,
        }
    }
}

impl Field for RecordField {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn basic_type(&self) -> BasicType {
        BasicType::Record
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
        self.core.verify_on_disk_type(source, BasicType::Record)?;
        for child in &mut self.children {
            attach_read_callbacks(child.as_mut(), source);
            child.connect(source)?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.children.iter().all(|c| c.is_connected())
    }

    /// The element count of the first subfield; zero for an empty record.
    fn element_count(&self) -> u64 {
        self.children.first().map_or(0, |c| c.element_count())
    }

    fn check_index(&self, index: ReadIndex) -> Result<()> {
        if self.children.is_empty() {
            return match index {
                ReadIndex::Global(i) => verify_index(self.name(), i, 0),
                ReadIndex::Cluster(i) => verify_index(self.name(), i.index(), 0),
            };
        }
        for child in &self.children {
            child.check_index(index)?;
        }
        Ok(())
    }

    fn create_value(&self) -> Value {
        Value::Record(
            self.member_names
                .iter()
                .cloned()
                .zip(self.children.iter().map(|c| c.create_value()))
                .collect(),
        )
    }

    fn read_raw(&self, index: ReadIndex, value: &mut Value) -> Result<()> {
        self.check_index(index)?;
        // Members are decoded into a scratch record; the holder changes only if all succeed.
        let mut scratch = if self.has_record_shape(value) {
            value.clone()
        } else {
            self.create_value()
        };
        let Value::Record(members) = &mut scratch else {
            return Err(Error::invalid_operation(format!(
                "record holder for '{}'",
                self.name()
            )));
        };
        for (child, (_, member)) in self.children.iter().zip(members.iter_mut()) {
            child.read(index, member)?;
        }
        *value = scratch;
        Ok(())
    }
}
