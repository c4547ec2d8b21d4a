//! An in-memory page source, and a builder that lays out per-cluster field values
//! as paged columns.

use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use nestcol_common::{Result, error::Error, verify_arg};
use nestcol_format::{
    basic_type::BasicType,
    descriptor::DatasetDescriptor,
    descriptor_builder::DescriptorBuilder,
    ids::{ClusterId, FieldId},
};

use super::{
    column::{Column, ColumnRange, ColumnType},
    page::{Page, PageBuffer},
    page_source::{PageSource, ReadCallback, SharedDescriptorGuard},
    value::Value,
};

/// Options of an in-memory page source.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Display name of the dataset, used in error messages.
    pub dataset_name: String,
    /// Maximum number of elements per page.
    pub page_size: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        SourceOptions {
            dataset_name: "dataset".to_string(),
            page_size: 1024,
        }
    }
}

/// The values of one field within one cluster.
///
/// Collections are given as the child count of each instance.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Boolean(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    String(Vec<String>),
    Collection(Vec<u32>),
}

impl ColumnValues {
    /// Empty values of the given field type; `None` for records.
    pub fn empty(basic_type: BasicType) -> Option<ColumnValues> {
        let values = match basic_type {
            BasicType::Boolean => ColumnValues::Boolean(Vec::new()),
            BasicType::Int8 => ColumnValues::Int8(Vec::new()),
            BasicType::Int16 => ColumnValues::Int16(Vec::new()),
            BasicType::Int32 => ColumnValues::Int32(Vec::new()),
            BasicType::Int64 => ColumnValues::Int64(Vec::new()),
            BasicType::UInt8 => ColumnValues::UInt8(Vec::new()),
            BasicType::UInt16 => ColumnValues::UInt16(Vec::new()),
            BasicType::UInt32 => ColumnValues::UInt32(Vec::new()),
            BasicType::UInt64 => ColumnValues::UInt64(Vec::new()),
            BasicType::Float32 => ColumnValues::Float32(Vec::new()),
            BasicType::Float64 => ColumnValues::Float64(Vec::new()),
            BasicType::String => ColumnValues::String(Vec::new()),
            BasicType::Collection => ColumnValues::Collection(Vec::new()),
            BasicType::Record => return None,
        };
        Some(values)
    }

    pub fn basic_type(&self) -> BasicType {
        match self {
            ColumnValues::Boolean(_) => BasicType::Boolean,
            ColumnValues::Int8(_) => BasicType::Int8,
            ColumnValues::Int16(_) => BasicType::Int16,
            ColumnValues::Int32(_) => BasicType::Int32,
            ColumnValues::Int64(_) => BasicType::Int64,
            ColumnValues::UInt8(_) => BasicType::UInt8,
            ColumnValues::UInt16(_) => BasicType::UInt16,
            ColumnValues::UInt32(_) => BasicType::UInt32,
            ColumnValues::UInt64(_) => BasicType::UInt64,
            ColumnValues::Float32(_) => BasicType::Float32,
            ColumnValues::Float64(_) => BasicType::Float64,
            ColumnValues::String(_) => BasicType::String,
            ColumnValues::Collection(_) => BasicType::Collection,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Int8(v) => v.len(),
            ColumnValues::Int16(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::UInt8(v) => v.len(),
            ColumnValues::UInt16(v) => v.len(),
            ColumnValues::UInt32(v) => v.len(),
            ColumnValues::UInt64(v) => v.len(),
            ColumnValues::Float32(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::String(v) => v.len(),
            ColumnValues::Collection(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A page source serving columns held in memory.
pub struct MemoryPageSource {
    descriptor: RwLock<DatasetDescriptor>,
    columns: AHashMap<(FieldId, u32), Arc<Column>>,
    callbacks: AHashMap<FieldId, Vec<ReadCallback>>,
}

impl MemoryPageSource {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

impl PageSource for MemoryPageSource {
    fn shared_descriptor(&self) -> SharedDescriptorGuard<'_> {
        SharedDescriptorGuard::new(
            self.descriptor
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    fn read_callbacks(&self, field_id: FieldId) -> Vec<ReadCallback> {
        self.callbacks.get(&field_id).cloned().unwrap_or_default()
    }

    fn open_column(&self, field_id: FieldId, ordinal: u32) -> Result<Arc<Column>> {
        let column = self.columns.get(&(field_id, ordinal)).ok_or_else(|| {
            Error::invalid_arg(
                "ordinal",
                format!("field {field_id} has no column #{ordinal}"),
            )
        })?;
        log::debug!(
            "open column {}#{ordinal}: {} elements in {} clusters",
            column.name(),
            column.element_count(),
            column.ranges().len()
        );
        Ok(column.clone())
    }
}

/// Builds a [`MemoryPageSource`] from field declarations and per-cluster values.
///
/// Every non-record field needs values in every cluster, except where its expected
/// element count is zero. Top-level fields (and members of top-level records) have
/// one element per entry of the cluster; children of a collection have as many as
/// the collection's instances in that cluster add up to.
pub struct MemorySourceBuilder {
    options: SourceOptions,
    descriptor: DescriptorBuilder,
    values: AHashMap<(FieldId, ClusterId), ColumnValues>,
    callbacks: AHashMap<FieldId, Vec<ReadCallback>>,
}

impl MemorySourceBuilder {
    pub fn new(options: SourceOptions) -> MemorySourceBuilder {
        let descriptor = DescriptorBuilder::new(options.dataset_name.clone());
        MemorySourceBuilder {
            options,
            descriptor,
            values: AHashMap::new(),
            callbacks: AHashMap::new(),
        }
    }

    pub fn root_id(&self) -> FieldId {
        self.descriptor.root_id()
    }

    pub fn add_field(
        &mut self,
        parent: FieldId,
        name: impl Into<String>,
        basic_type: BasicType,
    ) -> Result<FieldId> {
        self.descriptor.add_field(parent, name, basic_type)
    }

    /// Resolves a dot-separated path of previously added fields.
    pub fn field_id(&self, path: &str) -> Result<FieldId> {
        let mut id = self.root_id();
        for component in path.split('.') {
            id = self
                .descriptor
                .field(id)
                .into_iter()
                .flat_map(|f| f.children.iter().copied())
                .find(|&child| {
                    self.descriptor
                        .field(child)
                        .is_some_and(|f| f.name == component)
                })
                .ok_or_else(|| Error::field_not_found(path, &self.options.dataset_name))?;
        }
        Ok(id)
    }

    /// Appends a cluster of `entry_count` entries.
    pub fn add_cluster(&mut self, entry_count: u64) -> ClusterId {
        self.descriptor.add_cluster(entry_count)
    }

    /// Sets the values of `field` in `cluster`.
    pub fn put(&mut self, cluster: ClusterId, field: FieldId, values: ColumnValues) -> Result<()> {
        let desc = self
            .descriptor
            .field(field)
            .ok_or_else(|| Error::invalid_arg("field", format!("unknown field id {field}")))?;
        if desc.basic_type != values.basic_type() {
            return Err(Error::type_mismatch(
                &desc.name,
                desc.basic_type.name(),
                values.basic_type().name(),
            ));
        }
        verify_arg!(cluster, cluster.as_usize() < self.descriptor.clusters().len());
        if self.values.insert((field, cluster), values).is_some() {
            return Err(Error::invalid_arg(
                "values",
                format!("values of field {field} in cluster {} set twice", cluster.as_u32()),
            ));
        }
        Ok(())
    }

    /// Registers a callback run on every decoded value of `field`.
    pub fn add_read_callback(
        &mut self,
        field: FieldId,
        callback: impl Fn(&mut Value) + Send + Sync + 'static,
    ) -> Result<()> {
        verify_arg!(field, self.descriptor.field(field).is_some());
        self.callbacks
            .entry(field)
            .or_default()
            .push(Arc::new(callback));
        Ok(())
    }

    /// Validates the element counts and lays out the columns.
    pub fn build(self) -> Result<Arc<MemoryPageSource>> {
        let page_size = self.options.page_size;
        verify_arg!(page_size, page_size > 0);

        let descriptor = self.descriptor.build();
        let mut values = self.values;
        // Total child count of each collection, per cluster.
        let mut child_counts = AHashMap::<(FieldId, ClusterId), u64>::new();
        let mut columns = AHashMap::new();

        for field in descriptor.fields().iter().skip(1) {
            if field.basic_type == BasicType::Record {
                continue;
            }
            let name = descriptor.qualified_name(field.id)?;
            let mut layout = ColumnLayout::new(&name, field.id, field.basic_type);

            for cluster in descriptor.clusters() {
                let expected = expected_count(&descriptor, field.id, cluster.id, &child_counts)?;
                let cluster_values = match values.remove(&(field.id, cluster.id)) {
                    Some(v) => v,
                    None if expected == 0 => ColumnValues::empty(field.basic_type)
                        .ok_or_else(|| Error::invalid_operation("values of record field"))?,
                    None => {
                        return Err(Error::invalid_arg(
                            "values",
                            format!("no values for '{name}' in cluster {}", cluster.id.as_u32()),
                        ));
                    }
                };
                if cluster_values.len() as u64 != expected {
                    return Err(Error::invalid_arg(
                        "values",
                        format!(
                            "'{name}' has {} values in cluster {}, expected {expected}",
                            cluster_values.len(),
                            cluster.id.as_u32()
                        ),
                    ));
                }
                if let ColumnValues::Collection(sizes) = &cluster_values {
                    let total = sizes.iter().map(|&s| s as u64).sum::<u64>();
                    child_counts.insert((field.id, cluster.id), total);
                }
                layout.push_cluster(cluster.id, &cluster_values, page_size)?;
            }

            for column in layout.finish() {
                columns.insert((column.field_id(), column.ordinal()), Arc::new(column));
            }
        }

        log::debug!(
            "built memory source '{}': {} fields, {} clusters, {} entries, {} columns",
            descriptor.name(),
            descriptor.field_count(),
            descriptor.cluster_count(),
            descriptor.entry_count(),
            columns.len()
        );
        Ok(Arc::new(MemoryPageSource {
            descriptor: RwLock::new(descriptor),
            columns,
            callbacks: self.callbacks,
        }))
    }
}

/// Number of elements `field` must have in `cluster`.
fn expected_count(
    descriptor: &DatasetDescriptor,
    field: FieldId,
    cluster: ClusterId,
    child_counts: &AHashMap<(FieldId, ClusterId), u64>,
) -> Result<u64> {
    let mut parent = descriptor.field_descriptor(field)?.parent;
    while let Some(id) = parent {
        let desc = descriptor.field_descriptor(id)?;
        match desc.basic_type {
            BasicType::Collection => {
                return Ok(child_counts.get(&(id, cluster)).copied().unwrap_or(0));
            }
            BasicType::Record if desc.parent.is_none() => break,
            _ => parent = desc.parent,
        }
    }
    descriptor
        .get_cluster_descriptor(cluster)
        .map(|c| c.entry_count)
        .ok_or_else(|| Error::invalid_arg("cluster", format!("unknown cluster {}", cluster.as_u32())))
}

/// Columns of one field under construction.
struct ColumnLayout {
    name: String,
    field_id: FieldId,
    types: Vec<ColumnType>,
    ranges: Vec<Vec<ColumnRange>>,
    next_element: Vec<u64>,
}

impl ColumnLayout {
    fn new(name: &str, field_id: FieldId, basic_type: BasicType) -> ColumnLayout {
        let types = match basic_type {
            BasicType::String => vec![ColumnType::Index, ColumnType::Bytes],
            BasicType::Collection => vec![ColumnType::Index],
            ty => vec![ColumnType::Data(ty)],
        };
        ColumnLayout {
            name: name.to_string(),
            field_id,
            ranges: vec![Vec::new(); types.len()],
            next_element: vec![0; types.len()],
            types,
        }
    }

    fn push_cluster(
        &mut self,
        cluster: ClusterId,
        values: &ColumnValues,
        page_size: usize,
    ) -> Result<()> {
        match values {
            ColumnValues::Boolean(v) => {
                let bytes = v.iter().map(|&b| b as u8).collect::<Vec<_>>();
                self.push_pages(0, cluster, paginate(&bytes, page_size))
            }
            ColumnValues::Int8(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::Int16(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::Int32(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::Int64(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::UInt8(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::UInt16(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::UInt32(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::UInt64(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::Float32(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::Float64(v) => self.push_pages(0, cluster, paginate(v, page_size)),
            ColumnValues::String(v) => {
                let offsets = end_offsets(&self.name, v.iter().map(|s| s.len() as u64))?;
                let bytes = v.iter().flat_map(|s| s.bytes()).collect::<Vec<_>>();
                self.push_pages(0, cluster, paginate(&offsets, page_size))?;
                self.push_pages(1, cluster, paginate(&bytes, page_size))
            }
            ColumnValues::Collection(v) => {
                let offsets = end_offsets(&self.name, v.iter().map(|&s| s as u64))?;
                self.push_pages(0, cluster, paginate(&offsets, page_size))
            }
        }
    }

    fn push_pages(&mut self, ordinal: usize, cluster: ClusterId, pages: Vec<Page>) -> Result<()> {
        let range = ColumnRange::new(cluster, self.next_element[ordinal], pages)?;
        self.next_element[ordinal] += range.element_count();
        self.ranges[ordinal].push(range);
        Ok(())
    }

    fn finish(self) -> Vec<Column> {
        let ColumnLayout {
            name,
            field_id,
            types,
            ranges,
            ..
        } = self;
        types
            .into_iter()
            .zip(ranges)
            .enumerate()
            .map(|(ordinal, (ty, ranges))| Column::new(&name, field_id, ordinal as u32, ty, ranges))
            .collect()
    }
}

fn paginate<T: bytemuck::NoUninit>(values: &[T], page_size: usize) -> Vec<Page> {
    values
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| {
            Page::new(
                (i * page_size) as u64,
                std::mem::size_of::<T>(),
                PageBuffer::from_values(chunk),
            )
        })
        .collect()
}

/// Cluster-relative end offsets for the given run lengths.
fn end_offsets(name: &str, lengths: impl Iterator<Item = u64>) -> Result<Vec<u32>> {
    let mut end = 0u64;
    lengths
        .map(|len| {
            end += len;
            u32::try_from(end).map_err(|_| {
                Error::invalid_arg("values", format!("'{name}': offsets exceed u32 in one cluster"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MemorySourceBuilder {
        MemorySourceBuilder::new(SourceOptions {
            dataset_name: "events".to_string(),
            page_size: 2,
        })
    }

    #[test]
    fn test_layout_of_strings() {
        let mut builder = builder();
        let name = builder
            .add_field(builder.root_id(), "name", BasicType::String)
            .unwrap();
        let c = builder.add_cluster(3);
        builder
            .put(
                c,
                name,
                ColumnValues::String(vec!["ab".into(), "".into(), "cde".into()]),
            )
            .unwrap();
        let source = builder.build().unwrap();
        assert_eq!(source.column_count(), 2);

        let offsets = source.open_column(name, 0).unwrap();
        assert_eq!(offsets.column_type(), ColumnType::Index);
        assert_eq!(offsets.element_count(), 3);
        let bytes = source.open_column(name, 1).unwrap();
        assert_eq!(bytes.element_count(), 5);
        assert_eq!(bytes.ranges()[0].pages().len(), 3);
        assert!(source.open_column(name, 2).is_err());
    }

    #[test]
    fn test_children_follow_collection_sizes() {
        let mut builder = builder();
        let root = builder.root_id();
        let hits = builder
            .add_field(root, "hits", BasicType::Collection)
            .unwrap();
        let energy = builder.add_field(hits, "e", BasicType::Float32).unwrap();
        let c0 = builder.add_cluster(2);
        let c1 = builder.add_cluster(1);
        builder
            .put(c0, hits, ColumnValues::Collection(vec![2, 1]))
            .unwrap();
        builder
            .put(c0, energy, ColumnValues::Float32(vec![1.0, 2.0, 3.0]))
            .unwrap();
        // No children in the second cluster, so no values are needed.
        builder
            .put(c1, hits, ColumnValues::Collection(vec![0]))
            .unwrap();
        let source = builder.build().unwrap();
        let column = source.open_column(energy, 0).unwrap();
        assert_eq!(column.element_count(), 3);
        assert_eq!(column.ranges()[1].element_count(), 0);
        assert_eq!(column.ranges()[1].first_element(), 3);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let mut builder = builder();
        let root = builder.root_id();
        let hits = builder
            .add_field(root, "hits", BasicType::Collection)
            .unwrap();
        let energy = builder.add_field(hits, "e", BasicType::Float32).unwrap();
        let c = builder.add_cluster(1);
        builder
            .put(c, hits, ColumnValues::Collection(vec![2]))
            .unwrap();
        builder
            .put(c, energy, ColumnValues::Float32(vec![1.0]))
            .unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_missing_values_rejected() {
        let mut builder = builder();
        builder
            .add_field(builder.root_id(), "x", BasicType::Int64)
            .unwrap();
        builder.add_cluster(1);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_put_validation() {
        let mut builder = builder();
        let x = builder
            .add_field(builder.root_id(), "x", BasicType::Int64)
            .unwrap();
        let c = builder.add_cluster(1);
        let err = builder
            .put(c, x, ColumnValues::Int32(vec![1]))
            .unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
        assert!(
            builder
                .put(ClusterId::new(5), x, ColumnValues::Int64(vec![1]))
                .is_err()
        );
        builder.put(c, x, ColumnValues::Int64(vec![1])).unwrap();
        assert!(builder.put(c, x, ColumnValues::Int64(vec![2])).is_err());
    }

    #[test]
    fn test_field_path_lookup() {
        let mut builder = builder();
        let root = builder.root_id();
        let pos = builder.add_field(root, "pos", BasicType::Record).unwrap();
        let x = builder.add_field(pos, "x", BasicType::Float64).unwrap();
        assert_eq!(builder.field_id("pos").unwrap(), pos);
        assert_eq!(builder.field_id("pos.x").unwrap(), x);
        assert!(builder.field_id("pos.y").unwrap_err().is_field_not_found());
    }
}
