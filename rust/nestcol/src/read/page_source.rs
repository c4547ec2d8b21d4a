//! The page source contract: shared access to the dataset descriptor and to the
//! column storage that fields connect to.

use std::{
    ops::Deref,
    sync::{Arc, RwLockReadGuard},
};

use nestcol_common::Result;
use nestcol_format::{descriptor::DatasetDescriptor, ids::FieldId};

use super::{column::Column, value::Value};

/// A callback invoked on the decoded value after every successful read of a field.
///
/// Callbacks only run on the deserializing path; zero-copy mapped access never
/// sees them.
pub type ReadCallback = Arc<dyn Fn(&mut Value) + Send + Sync>;

/// RAII guard for read-only access to a page source's descriptor.
///
/// The descriptor stays consistent for as long as the guard is held; dropping the
/// guard releases the shared lock.
pub struct SharedDescriptorGuard<'a>(RwLockReadGuard<'a, DatasetDescriptor>);

impl<'a> SharedDescriptorGuard<'a> {
    pub fn new(guard: RwLockReadGuard<'a, DatasetDescriptor>) -> SharedDescriptorGuard<'a> {
        SharedDescriptorGuard(guard)
    }
}

impl Deref for SharedDescriptorGuard<'_> {
    type Target = DatasetDescriptor;

    fn deref(&self) -> &DatasetDescriptor {
        &self.0
    }
}

/// Read access to a stored dataset.
///
/// A page source is shared by every view constructed from it and must stay alive
/// for as long as those views; views keep an `Arc` to it.
pub trait PageSource: Send + Sync + 'static {
    /// Acquires a consistent, read-locked snapshot of the dataset descriptor.
    fn shared_descriptor(&self) -> SharedDescriptorGuard<'_>;

    /// Returns the read callbacks registered for the field, in registration order.
    fn read_callbacks(&self, field_id: FieldId) -> Vec<ReadCallback>;

    /// Connects to the column `ordinal` of the given field.
    ///
    /// # Errors
    ///
    /// Fails if the field has no such column.
    fn open_column(&self, field_id: FieldId, ordinal: u32) -> Result<Arc<Column>>;
}
