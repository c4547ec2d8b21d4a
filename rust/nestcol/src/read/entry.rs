//! Whole-row access: one decoded value per top-level field.

use nestcol_common::{Result, error::Error};
use nestcol_format::ids::LinearIndex;

use super::{
    element::ViewElement,
    field::{Field, ReadIndex},
    value::Value,
};

/// A handle to one top-level field of an [`Entry`].
///
/// Tokens are only valid for entries created by the same reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldToken {
    index: usize,
    reader_id: u64,
}

struct EntryField {
    name: String,
    field: Box<dyn Field>,
    value: Value,
}

/// The decoded values of every top-level field at one entry index.
///
/// Created by [`Reader::create_entry`](crate::read::reader::Reader::create_entry) and
/// filled by [`Reader::load_entry`](crate::read::reader::Reader::load_entry). Values
/// are read on the copying path, so read callbacks always apply.
pub struct Entry {
    reader_id: u64,
    dataset_name: String,
    fields: Vec<EntryField>,
    index: Option<LinearIndex>,
}

impl Entry {
    pub(crate) fn new(reader_id: u64, dataset_name: String) -> Entry {
        Entry {
            reader_id,
            dataset_name,
            fields: Vec::new(),
            index: None,
        }
    }

    pub(crate) fn push_field(&mut self, name: String, field: Box<dyn Field>) {
        let value = field.create_value();
        self.fields.push(EntryField { name, field, value });
    }

    pub(crate) fn reader_id(&self) -> u64 {
        self.reader_id
    }

    /// Reads every field at `index`.
    ///
    /// On failure the entry keeps the values read so far and no longer reports an
    /// index.
    pub(crate) fn load(&mut self, index: LinearIndex) -> Result<()> {
        self.index = None;
        for entry_field in &mut self.fields {
            entry_field
                .field
                .read(ReadIndex::Global(index), &mut entry_field.value)?;
        }
        self.index = Some(index);
        Ok(())
    }

    /// The index of the last successfully loaded entry.
    pub fn index(&self) -> Option<LinearIndex> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the token of the top-level field `name`.
    pub fn token(&self, name: &str) -> Result<FieldToken> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|index| FieldToken {
                index,
                reader_id: self.reader_id,
            })
            .ok_or_else(|| Error::field_not_found(name, &self.dataset_name))
    }

    pub fn value(&self, token: FieldToken) -> Result<&Value> {
        if token.reader_id != self.reader_id {
            return Err(Error::invalid_arg(
                "token",
                "token belongs to an entry of another reader",
            ));
        }
        self.fields
            .get(token.index)
            .map(|f| &f.value)
            .ok_or_else(|| Error::invalid_arg("token", format!("no field #{}", token.index)))
    }

    /// Returns the value of the field as `T`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the field does not hold a `T`.
    pub fn get<T: ViewElement>(&self, token: FieldToken) -> Result<&T> {
        let value = self.value(token)?;
        T::from_value(value).ok_or_else(|| {
            Error::type_mismatch(
                &self.fields[token.index].name,
                T::BASIC_TYPE.name(),
                value.basic_type().name(),
            )
        })
    }

    /// Field names and their current values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.value))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}
