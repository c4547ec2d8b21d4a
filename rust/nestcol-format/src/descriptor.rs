//! The dataset descriptor: an identifier-indexed catalog of fields and clusters.
//!
//! Fields are stored in a flat vector indexed by [`FieldId`]. Parent/child links are
//! kept as identifiers only, so any field can be addressed directly without walking
//! a live object tree.

use ahash::AHashMap;
use nestcol_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

use crate::{
    basic_type::BasicType,
    ids::{ClusterId, FieldId, LinearIndex},
};

/// Metadata of a single field node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: FieldId,
    /// Field name, local to its parent.
    pub name: String,
    pub basic_type: BasicType,
    /// `None` only for the root field.
    pub parent: Option<FieldId>,
    pub children: Vec<FieldId>,
}

impl FieldDescriptor {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Metadata of a single cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub id: ClusterId,
    /// Global index of the first entry in this cluster.
    pub first_entry: LinearIndex,
    pub entry_count: u64,
}

impl ClusterDescriptor {
    pub fn entry_range(&self) -> std::ops::Range<LinearIndex> {
        self.first_entry..self.first_entry + self.entry_count
    }
}

/// Read-only catalog describing a dataset's fields and clusters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    clusters: Vec<ClusterDescriptor>,
    /// `(parent, name) -> id` lookup, rebuilt on load.
    #[serde(skip)]
    name_index: AHashMap<(FieldId, String), FieldId>,
}

impl DatasetDescriptor {
    pub(crate) fn new(
        name: String,
        fields: Vec<FieldDescriptor>,
        clusters: Vec<ClusterDescriptor>,
    ) -> DatasetDescriptor {
        let mut desc = DatasetDescriptor {
            name,
            fields,
            clusters,
            name_index: AHashMap::new(),
        };
        desc.rebuild_name_index();
        desc
    }

    fn rebuild_name_index(&mut self) {
        self.name_index = self
            .fields
            .iter()
            .filter_map(|f| f.parent.map(|parent| ((parent, f.name.clone()), f.id)))
            .collect();
    }

    /// The dataset's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_id(&self) -> FieldId {
        FieldId::zero()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the descriptor of the field with the given id, or `None` if there
    /// is no such field.
    pub fn get_field_descriptor(&self, id: FieldId) -> Option<&FieldDescriptor> {
        if !id.is_valid() {
            return None;
        }
        self.fields.get(id.as_usize())
    }

    /// Returns the descriptor of the field with the given id.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error for unknown ids.
    pub fn field_descriptor(&self, id: FieldId) -> Result<&FieldDescriptor> {
        self.get_field_descriptor(id).ok_or_else(|| {
            Error::invalid_arg("field_id", format!("unknown field id {id} in '{}'", self.name))
        })
    }

    /// Finds a field by its name, scoped under `parent`.
    ///
    /// Returns [`FieldId::invalid()`] if no such field exists.
    pub fn find_field_id(&self, name: &str, parent: FieldId) -> FieldId {
        self.name_index
            .get(&(parent, name.to_string()))
            .copied()
            .unwrap_or(FieldId::invalid())
    }

    /// Resolves a dot-separated field path, starting at the root field.
    ///
    /// Returns [`FieldId::invalid()`] if any path component is missing.
    pub fn find_field_id_by_path(&self, path: &str) -> FieldId {
        if path.is_empty() {
            return FieldId::invalid();
        }
        let mut id = self.root_id();
        for component in path.split('.') {
            id = self.find_field_id(component, id);
            if !id.is_valid() {
                break;
            }
        }
        id
    }

    /// Returns the dot-separated path of the field, from the root.
    pub fn qualified_name(&self, id: FieldId) -> Result<String> {
        let mut parts = Vec::new();
        let mut current = self.field_descriptor(id)?;
        while let Some(parent) = current.parent {
            parts.push(current.name.as_str());
            current = self.field_descriptor(parent)?;
        }
        parts.reverse();
        Ok(parts.join("."))
    }

    /// Top-level fields (children of the root), in declaration order.
    pub fn top_level_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .get(self.root_id().as_usize())
            .into_iter()
            .flat_map(|root| root.children.iter())
            .filter_map(|&id| self.get_field_descriptor(id))
    }

    pub fn clusters(&self) -> &[ClusterDescriptor] {
        &self.clusters
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn get_cluster_descriptor(&self, id: ClusterId) -> Option<&ClusterDescriptor> {
        if !id.is_valid() {
            return None;
        }
        self.clusters.get(id.as_usize())
    }

    /// Total number of entries across all clusters.
    pub fn entry_count(&self) -> u64 {
        self.clusters.last().map_or(0, |c| c.first_entry + c.entry_count)
    }

    /// Finds the cluster containing the given entry, or [`ClusterId::invalid()`].
    pub fn find_cluster_id(&self, entry: LinearIndex) -> ClusterId {
        let pos = self.clusters.partition_point(|c| c.first_entry <= entry);
        if pos == 0 {
            return ClusterId::invalid();
        }
        let cluster = &self.clusters[pos - 1];
        if cluster.entry_range().contains(&entry) {
            cluster.id
        } else {
            ClusterId::invalid()
        }
    }

    /// Serializes the descriptor for inspection.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::invalid_operation(format!("descriptor to json: {e}")))
    }

    /// Loads a descriptor previously produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<DatasetDescriptor> {
        let mut desc: DatasetDescriptor = serde_json::from_str(json)
            .map_err(|e| Error::invalid_arg("json", e.to_string()))?;
        desc.rebuild_name_index();
        Ok(desc)
    }
}
