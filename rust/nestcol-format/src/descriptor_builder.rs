use nestcol_common::{Result, error::Error, verify_arg};

use crate::{
    basic_type::BasicType,
    descriptor::{ClusterDescriptor, DatasetDescriptor, FieldDescriptor},
    ids::{ClusterId, FieldId},
};

/// A builder for a [`DatasetDescriptor`].
///
/// The builder starts out with the root field (id zero, of type `Record`). Fields are
/// appended in declaration order and receive dense, sequential ids.
pub struct DescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    clusters: Vec<ClusterDescriptor>,
    next_entry: u64,
}

impl DescriptorBuilder {
    pub fn new(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            fields: vec![FieldDescriptor {
                id: FieldId::zero(),
                name: String::new(),
                basic_type: BasicType::Record,
                parent: None,
                children: Vec::new(),
            }],
            clusters: Vec::new(),
            next_entry: 0,
        }
    }

    pub fn root_id(&self) -> FieldId {
        FieldId::zero()
    }

    /// Adds a field named `name` under `parent` and returns its id.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is unknown or not composite, if the name is empty or contains
    /// a `.`, or if `parent` already has a child with that name.
    pub fn add_field(
        &mut self,
        parent: FieldId,
        name: impl Into<String>,
        basic_type: BasicType,
    ) -> Result<FieldId> {
        let name = name.into();
        verify_arg!(name, !name.is_empty() && !name.contains('.'));

        let parent_desc = self
            .fields
            .get(parent.as_usize())
            .ok_or_else(|| Error::invalid_arg("parent", format!("unknown field id {parent}")))?;
        if !parent_desc.basic_type.is_composite() {
            return Err(Error::invalid_arg(
                "parent",
                format!("field '{}' cannot have children", parent_desc.name),
            ));
        }
        let duplicate = parent_desc
            .children
            .iter()
            .any(|&c| self.fields[c.as_usize()].name == name);
        if duplicate {
            return Err(Error::invalid_arg(
                "name",
                format!("duplicate field name '{name}'"),
            ));
        }

        let id = FieldId::from(self.fields.len() as u32);
        self.fields.push(FieldDescriptor {
            id,
            name,
            basic_type,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.fields[parent.as_usize()].children.push(id);
        Ok(id)
    }

    /// Appends a cluster holding the next `entry_count` entries.
    pub fn add_cluster(&mut self, entry_count: u64) -> ClusterId {
        let id = ClusterId::new(self.clusters.len() as u32);
        self.clusters.push(ClusterDescriptor {
            id,
            first_entry: self.next_entry,
            entry_count,
        });
        self.next_entry += entry_count;
        id
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDescriptor> {
        self.fields.get(id.as_usize())
    }

    pub fn clusters(&self) -> &[ClusterDescriptor] {
        &self.clusters
    }

    pub fn build(self) -> DatasetDescriptor {
        DatasetDescriptor::new(self.name, self.fields, self.clusters)
    }
}
