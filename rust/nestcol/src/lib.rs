//! Read-side views over a columnar dataset of nested collections.
//!
//! A [`Reader`] hands out views for individual fields. A [`TypedView`] returns
//! references to elements, mapped in place from their page for fixed-width numeric
//! types and decoded into a scratch holder otherwise. A [`CollectionView`] resolves
//! the children of each collection instance as a [`ClusterIndexRange`] and creates
//! views over the child fields.

pub mod read;

#[cfg(test)]
mod tests;

pub use read::{
    collection_view::CollectionView,
    element::{CollectionSize, ElementCapability, MappableElement, ViewElement},
    entry::{Entry, FieldToken},
    erased_view::ErasedView,
    field::ReadIndex,
    index_range::{ClusterIndexRange, GlobalIndexRange},
    memory_source::{ColumnValues, MemoryPageSource, MemorySourceBuilder, SourceOptions},
    page_source::{PageSource, ReadCallback, SharedDescriptorGuard},
    reader::Reader,
    value::Value,
    view::TypedView,
};
