//! Views over collection fields and navigation into their children.

use std::sync::Arc;

use nestcol_common::{Result, error::Error};
use nestcol_format::ids::FieldId;

use super::{
    element::{CollectionSize, ViewElement},
    erased_view::ErasedView,
    field::ReadIndex,
    index_range::{ClusterIndexRange, GlobalIndexRange},
    page_source::PageSource,
    view::TypedView,
};

/// A view over a collection field.
///
/// Each instance of a collection owns a contiguous run of child elements within
/// the cluster of the instance. [`collection_range`](Self::collection_range) returns
/// that run as cluster-local indices, which are then fed to views over the child
/// fields obtained from [`view`](Self::view), [`erased_view`](Self::erased_view) or
/// [`collection_view`](Self::collection_view).
///
/// ```ignore
/// let mut jets = reader.collection_view("jets")?;
/// let mut pt = jets.view::<f32>("pt")?;
/// for entry in reader.entry_range() {
///     for child in jets.collection_range(entry)? {
///         let value = *pt.get(child)?;
///     }
/// }
/// ```
pub struct CollectionView {
    view: TypedView<CollectionSize>,
}

impl CollectionView {
    pub fn new(field_id: FieldId, source: Arc<dyn PageSource>) -> Result<CollectionView> {
        Ok(CollectionView {
            view: TypedView::new(field_id, source)?,
        })
    }

    pub fn field_id(&self) -> FieldId {
        self.view.field_id()
    }

    pub fn field_range(&self) -> GlobalIndexRange {
        self.view.field_range()
    }

    /// The number of children of the instance at `index`.
    pub fn get(&mut self, index: impl Into<ReadIndex>) -> Result<CollectionSize> {
        self.view.get(index).copied()
    }

    /// The cluster-local index range of the children of the instance at `index`.
    pub fn collection_range(&self, index: impl Into<ReadIndex>) -> Result<ClusterIndexRange> {
        let (start, size) = self.view.field().collection_info(index.into())?;
        Ok(ClusterIndexRange::new(
            start.cluster_id(),
            start.index(),
            start.index() + u64::from(size),
        ))
    }

    /// The underlying view over the collection sizes.
    pub fn typed_view(&mut self) -> &mut TypedView<CollectionSize> {
        &mut self.view
    }

    /// Creates a typed view over the child field `name` of this collection.
    pub fn view<T: ViewElement>(&self, name: &str) -> Result<TypedView<T>> {
        TypedView::new(self.child_id(name)?, self.view.source().clone())
    }

    pub fn erased_view(&self, name: &str) -> Result<ErasedView> {
        ErasedView::new(self.child_id(name)?, self.view.source().clone())
    }

    /// Creates a view over the child collection `name`, for nested collections.
    pub fn collection_view(&self, name: &str) -> Result<CollectionView> {
        CollectionView::new(self.child_id(name)?, self.view.source().clone())
    }

    /// Resolves `name` under this collection. A dotted name descends into record
    /// members (`"hit.x"`).
    fn child_id(&self, name: &str) -> Result<FieldId> {
        let descriptor = self.view.source().shared_descriptor();
        let mut id = self.field_id();
        for component in name.split('.') {
            id = descriptor.find_field_id(component, id);
            if !id.is_valid() {
                return Err(Error::field_not_found(name, descriptor.name()));
            }
        }
        Ok(id)
    }
}
