//! Columns: the per-field element storage, partitioned by cluster and split into pages.

use nestcol_common::{Result, error::Error, result::verify_index};
use nestcol_format::{
    basic_type::BasicType,
    ids::{ClusterId, ClusterIndex, FieldId, LinearIndex},
};

use super::page::Page;

/// Physical element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Fixed-width values of a primitive field. Booleans are stored as one byte.
    Data(BasicType),
    /// Cluster-relative `u32` end offsets of collections and strings.
    Index,
    /// Raw bytes referenced by an index column.
    Bytes,
}

impl ColumnType {
    pub fn element_size(&self) -> usize {
        match self {
            ColumnType::Data(ty) => ty.primitive_size().unwrap_or(1),
            ColumnType::Index => std::mem::size_of::<u32>(),
            ColumnType::Bytes => 1,
        }
    }
}

/// The elements of one column within one cluster.
#[derive(Debug, Clone)]
pub struct ColumnRange {
    cluster_id: ClusterId,
    /// Global index of the first element of the column in this cluster.
    first_element: LinearIndex,
    element_count: u64,
    pages: Vec<Page>,
}

impl ColumnRange {
    /// Creates a column range from pages that cover consecutive cluster-local indexes
    /// starting at zero.
    ///
    /// # Errors
    ///
    /// Fails if the pages are not contiguous.
    pub fn new(
        cluster_id: ClusterId,
        first_element: LinearIndex,
        pages: Vec<Page>,
    ) -> Result<ColumnRange> {
        let mut next = 0;
        for page in &pages {
            if page.first_index() != next {
                return Err(Error::invalid_arg(
                    "pages",
                    format!("page starts at {}, expected {next}", page.first_index()),
                ));
            }
            next = page.end_index();
        }
        Ok(ColumnRange {
            cluster_id,
            first_element,
            element_count: next,
            pages,
        })
    }

    pub fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    pub fn first_element(&self) -> LinearIndex {
        self.first_element
    }

    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn find_page(&self, index: u64) -> Option<&Page> {
        let pos = self.pages.partition_point(|p| p.first_index() <= index);
        self.pages[..pos].last().filter(|p| p.contains(index))
    }
}

/// All elements of one column of a field, across every cluster.
#[derive(Debug)]
pub struct Column {
    /// Qualified name of the owning field, used in error messages.
    name: String,
    field_id: FieldId,
    ordinal: u32,
    column_type: ColumnType,
    /// One range per cluster, ordered by cluster id.
    ranges: Vec<ColumnRange>,
    element_count: u64,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        field_id: FieldId,
        ordinal: u32,
        column_type: ColumnType,
        ranges: Vec<ColumnRange>,
    ) -> Column {
        let element_count = ranges.iter().map(ColumnRange::element_count).sum();
        Column {
            name: name.into(),
            field_id,
            ordinal,
            column_type,
            ranges,
            element_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_id(&self) -> FieldId {
        self.field_id
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Total number of elements across all clusters.
    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    pub fn ranges(&self) -> &[ColumnRange] {
        &self.ranges
    }

    /// Returns the column range of the given cluster.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the column has no range for `cluster_id`.
    pub fn range(&self, cluster_id: ClusterId) -> Result<&ColumnRange> {
        self.ranges
            .get(cluster_id.as_usize())
            .filter(|r| r.cluster_id == cluster_id)
            .ok_or_else(|| {
                Error::out_of_range(
                    format!("{} (cluster)", self.name),
                    cluster_id.as_u32() as u64,
                    self.ranges.len() as u64,
                )
            })
    }

    /// Converts a global element index into the cluster-local one.
    pub fn to_cluster_index(&self, index: LinearIndex) -> Result<ClusterIndex> {
        verify_index(&self.name, index, self.element_count)?;
        let pos = self.ranges.partition_point(|r| r.first_element <= index);
        let range = pos
            .checked_sub(1)
            .and_then(|p| self.ranges.get(p))
            .ok_or_else(|| Error::invalid_format(&self.name, "no cluster range"))?;
        Ok(ClusterIndex::new(
            range.cluster_id,
            index - range.first_element,
        ))
    }

    /// Converts a cluster-local element index into the global one.
    pub fn to_global_index(&self, index: ClusterIndex) -> Result<LinearIndex> {
        let range = self.range(index.cluster_id())?;
        verify_index(&self.name, index.index(), range.element_count)?;
        Ok(range.first_element + index.index())
    }

    /// Verifies that `index` addresses an existing element.
    pub fn check_cluster_index(&self, index: ClusterIndex) -> Result<()> {
        let range = self.range(index.cluster_id())?;
        verify_index(&self.name, index.index(), range.element_count)
    }

    /// Finds the page holding the element, and the element's offset within it.
    pub fn locate(&self, index: ClusterIndex) -> Result<(&Page, usize)> {
        let range = self.range(index.cluster_id())?;
        verify_index(&self.name, index.index(), range.element_count)?;
        let page = range.find_page(index.index()).ok_or_else(|| {
            Error::invalid_format(&self.name, format!("no page for element {index}"))
        })?;
        log::trace!(
            "column {}#{}: element {index} in page at {}",
            self.name,
            self.ordinal,
            page.first_index()
        );
        Ok((page, (index.index() - page.first_index()) as usize))
    }

    /// Returns a reference to a single element, directly within its page.
    pub fn value<T: bytemuck::AnyBitPattern>(&self, index: ClusterIndex) -> Result<&T> {
        let (page, offset) = self.locate(index)?;
        Ok(&page.values::<T>()?[offset])
    }

    /// Returns the run of elements from `index` to the end of its page.
    pub fn run<T: bytemuck::AnyBitPattern>(&self, index: ClusterIndex) -> Result<&[T]> {
        let (page, offset) = self.locate(index)?;
        Ok(&page.values::<T>()?[offset..])
    }

    /// Appends `len` bytes starting at `start` to `out`, following page boundaries.
    pub fn read_bytes(&self, start: ClusterIndex, len: u64, out: &mut Vec<u8>) -> Result<()> {
        let range = self.range(start.cluster_id())?;
        let end = start.index() + len;
        if end > range.element_count {
            return Err(Error::out_of_range(
                &self.name,
                end.saturating_sub(1),
                range.element_count,
            ));
        }
        out.reserve(len as usize);
        let mut pos = start.index();
        while pos < end {
            let page = range.find_page(pos).ok_or_else(|| {
                Error::invalid_format(&self.name, format!("no page for element {pos}"))
            })?;
            let bytes = page.values::<u8>()?;
            let from = (pos - page.first_index()) as usize;
            let to = (end.min(page.end_index()) - page.first_index()) as usize;
            out.extend_from_slice(&bytes[from..to]);
            pos = page.first_index() + to as u64;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::page::PageBuffer;

    fn int_column() -> Column {
        // Cluster 0: [1, 2, 3 | 4], cluster 1: empty, cluster 2: [5, 6]
        let c0 = ColumnRange::new(
            ClusterId::new(0),
            0,
            vec![
                Page::new(0, 4, PageBuffer::from_values(&[1i32, 2, 3])),
                Page::new(3, 4, PageBuffer::from_values(&[4i32])),
            ],
        )
        .unwrap();
        let c1 = ColumnRange::new(ClusterId::new(1), 4, vec![]).unwrap();
        let c2 = ColumnRange::new(
            ClusterId::new(2),
            4,
            vec![Page::new(0, 4, PageBuffer::from_values(&[5i32, 6]))],
        )
        .unwrap();
        Column::new(
            "x",
            FieldId::from(1),
            0,
            ColumnType::Data(BasicType::Int32),
            vec![c0, c1, c2],
        )
    }

    #[test]
    fn test_index_conversion() {
        let column = int_column();
        assert_eq!(column.element_count(), 6);
        assert_eq!(
            column.to_cluster_index(3).unwrap(),
            ClusterIndex::new(ClusterId::new(0), 3)
        );
        assert_eq!(
            column.to_cluster_index(4).unwrap(),
            ClusterIndex::new(ClusterId::new(2), 0)
        );
        assert_eq!(
            column
                .to_global_index(ClusterIndex::new(ClusterId::new(2), 1))
                .unwrap(),
            5
        );
        assert!(column.to_cluster_index(6).unwrap_err().is_out_of_range());
        assert!(
            column
                .to_global_index(ClusterIndex::new(ClusterId::new(1), 0))
                .unwrap_err()
                .is_out_of_range()
        );
        assert!(
            column
                .check_cluster_index(ClusterIndex::new(ClusterId::new(3), 0))
                .unwrap_err()
                .is_out_of_range()
        );
    }

    #[test]
    fn test_value_and_run() {
        let column = int_column();
        let c0 = ClusterId::new(0);
        assert_eq!(*column.value::<i32>(ClusterIndex::new(c0, 2)).unwrap(), 3);
        assert_eq!(*column.value::<i32>(ClusterIndex::new(c0, 3)).unwrap(), 4);
        assert_eq!(column.run::<i32>(ClusterIndex::new(c0, 1)).unwrap(), &[2, 3]);
        assert_eq!(column.run::<i32>(ClusterIndex::new(c0, 3)).unwrap(), &[4]);
    }

    #[test]
    fn test_read_bytes_across_pages() {
        let c0 = ColumnRange::new(
            ClusterId::new(0),
            0,
            vec![
                Page::new(0, 1, PageBuffer::from_bytes(b"abc")),
                Page::new(3, 1, PageBuffer::from_bytes(b"def")),
                Page::new(6, 1, PageBuffer::from_bytes(b"g")),
            ],
        )
        .unwrap();
        let column = Column::new("s", FieldId::from(1), 1, ColumnType::Bytes, vec![c0]);
        let start = ClusterIndex::new(ClusterId::new(0), 2);
        let mut out = Vec::new();
        column.read_bytes(start, 5, &mut out).unwrap();
        assert_eq!(out, b"cdefg");
        out.clear();
        column.read_bytes(start, 0, &mut out).unwrap();
        assert!(out.is_empty());
        assert!(column.read_bytes(start, 6, &mut out).is_err());
    }

    #[test]
    fn test_non_contiguous_pages_rejected() {
        let result = ColumnRange::new(
            ClusterId::new(0),
            0,
            vec![Page::new(1, 1, PageBuffer::from_bytes(b"a"))],
        );
        assert!(result.is_err());
    }
}
