//! Identifiers and index types shared by the descriptor catalog and the read path.

use serde::{Deserialize, Serialize};

/// Global (dataset-wide) index of an entry or of a nested element.
pub type LinearIndex = u64;

/// Reserved [`LinearIndex`] value denoting an invalid or uninitialized index.
pub const INVALID_INDEX: LinearIndex = u64::MAX;

/// Identifier of a field within the dataset descriptor.
///
/// Field ids are dense: the descriptor stores fields in a vector indexed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(u32);

impl FieldId {
    pub const INVALID_ID: u32 = u32::MAX;

    /// The id of the root (zero) field.
    pub const fn zero() -> FieldId {
        FieldId(0)
    }

    /// Creates the reserved "not found" id.
    pub const fn invalid() -> FieldId {
        FieldId(Self::INVALID_ID)
    }

    pub const fn is_valid(&self) -> bool {
        self.0 != Self::INVALID_ID
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for FieldId {
    fn from(value: u32) -> Self {
        FieldId(value)
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("<invalid>")
        }
    }
}

/// Identifier of a cluster, an independently decodable partition of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u32);

impl ClusterId {
    pub const INVALID_ID: u32 = u32::MAX;

    pub const fn new(id: u32) -> ClusterId {
        ClusterId(id)
    }

    pub const fn invalid() -> ClusterId {
        ClusterId(Self::INVALID_ID)
    }

    pub const fn is_valid(&self) -> bool {
        self.0 != Self::INVALID_ID
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ClusterId {
    fn from(value: u32) -> Self {
        ClusterId(value)
    }
}

/// An index local to one cluster: `(cluster_id, offset)`.
///
/// Elements of nested collections are addressed relative to the cluster that holds
/// their parent, so walking a collection's children never requires a dataset-global
/// element number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterIndex {
    cluster_id: ClusterId,
    index: u64,
}

impl ClusterIndex {
    pub const fn new(cluster_id: ClusterId, index: u64) -> ClusterIndex {
        ClusterIndex { cluster_id, index }
    }

    pub const fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    /// The offset of the element within its cluster.
    pub const fn index(&self) -> u64 {
        self.index
    }
}

impl std::ops::Add<u64> for ClusterIndex {
    type Output = ClusterIndex;

    fn add(self, rhs: u64) -> ClusterIndex {
        ClusterIndex::new(self.cluster_id, self.index + rhs)
    }
}

impl std::fmt::Display for ClusterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.cluster_id.0, self.index)
    }
}
