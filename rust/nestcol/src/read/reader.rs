//! Entry point for reading a dataset.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use nestcol_common::{Result, error::Error, result::verify_index};
use nestcol_format::ids::{FieldId, LinearIndex};

use super::{
    collection_view::CollectionView,
    element::ViewElement,
    entry::Entry,
    erased_view::ErasedView,
    field::{attach_read_callbacks, create_field},
    index_range::GlobalIndexRange,
    page_source::PageSource,
    view::TypedView,
};

static NEXT_READER_ID: AtomicU64 = AtomicU64::new(1);

/// A reader over one dataset, creating views by field path.
///
/// Field paths are dot-separated from the root, e.g. `"jets"` or `"pos.x"`. Child
/// fields of collections can also be reached through the
/// [`CollectionView`] of their parent.
pub struct Reader {
    id: u64,
    source: Arc<dyn PageSource>,
}

impl Reader {
    pub fn open(source: Arc<dyn PageSource>) -> Reader {
        let id = NEXT_READER_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "open reader {id} on '{}'",
            source.shared_descriptor().name()
        );
        Reader { id, source }
    }

    pub fn source(&self) -> &Arc<dyn PageSource> {
        &self.source
    }

    pub fn entry_count(&self) -> u64 {
        self.source.shared_descriptor().entry_count()
    }

    /// All entry indexes of the dataset.
    pub fn entry_range(&self) -> GlobalIndexRange {
        GlobalIndexRange::new(0, self.entry_count())
    }

    /// Dumps the dataset descriptor as JSON.
    pub fn descriptor_json(&self) -> Result<String> {
        self.source.shared_descriptor().to_json()
    }

    pub fn view<T: ViewElement>(&self, path: &str) -> Result<TypedView<T>> {
        TypedView::new(self.resolve(path)?, self.source.clone())
    }

    pub fn erased_view(&self, path: &str) -> Result<ErasedView> {
        ErasedView::new(self.resolve(path)?, self.source.clone())
    }

    pub fn collection_view(&self, path: &str) -> Result<CollectionView> {
        CollectionView::new(self.resolve(path)?, self.source.clone())
    }

    /// Creates an entry holding every top-level field of the dataset.
    pub fn create_entry(&self) -> Result<Entry> {
        let (dataset_name, fields) = {
            let descriptor = self.source.shared_descriptor();
            let fields = descriptor
                .top_level_fields()
                .map(|f| Ok((f.name.clone(), create_field(&descriptor, f.id)?)))
                .collect::<Result<Vec<_>>>()?;
            (descriptor.name().to_string(), fields)
        };
        let mut entry = Entry::new(self.id, dataset_name);
        for (name, mut field) in fields {
            attach_read_callbacks(field.as_mut(), self.source.as_ref());
            field.connect(self.source.as_ref())?;
            entry.push_field(name, field);
        }
        Ok(entry)
    }

    /// Reads the entry at `index` into `entry`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `entry` was created by a different reader.
    /// - `OutOfRange` if `index` is not below [`entry_count`](Self::entry_count).
    pub fn load_entry(&self, index: LinearIndex, entry: &mut Entry) -> Result<()> {
        if entry.reader_id() != self.id {
            return Err(Error::invalid_arg(
                "entry",
                "entry was created by another reader",
            ));
        }
        verify_index("entry", index, self.entry_count())?;
        entry.load(index)
    }

    fn resolve(&self, path: &str) -> Result<FieldId> {
        let descriptor = self.source.shared_descriptor();
        let id = descriptor.find_field_id_by_path(path);
        if !id.is_valid() {
            return Err(Error::field_not_found(path, descriptor.name()));
        }
        Ok(id)
    }
}
