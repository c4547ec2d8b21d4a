//! A small two-cluster dataset with records, strings and nested collections.
//!
//! ```text
//! events
//! ├── id: u64
//! ├── flag: bool
//! ├── label: string
//! ├── pos: record { x: f64, y: f64 }
//! └── jets: collection
//!     ├── pt: f32
//!     ├── tag: string
//!     └── hits: collection
//!         └── e: i32
//! ```
//!
//! Cluster 0 holds entries 0..3, cluster 1 holds entries 3..5. Pages hold at most
//! two elements, so most columns span several pages per cluster.

use std::sync::Arc;

use nestcol_format::basic_type::BasicType;

use crate::read::memory_source::{
    ColumnValues, MemoryPageSource, MemorySourceBuilder, SourceOptions,
};

pub const DATASET_NAME: &str = "events";

pub const IDS: [u64; 5] = [0, 1, 2, 3, 4];
pub const FLAGS: [bool; 5] = [true, false, true, false, true];
pub const LABELS: [&str; 5] = ["a", "bb", "", "ccc", "d"];
pub const POS_X: [f64; 5] = [0.5, 1.5, 2.5, 3.5, 4.5];
pub const POS_Y: [f64; 5] = [-0.5, -1.5, -2.5, -3.5, -4.5];

/// Jet pt values grouped by entry.
pub const JET_PT: [&[f32]; 5] = [&[10.0, 11.0], &[], &[20.0, 21.0, 22.0], &[30.0], &[40.0, 41.0]];
/// Hit energies grouped by jet, in global jet order.
pub const HIT_E: [&[i32]; 8] = [&[100], &[], &[101, 102], &[103], &[], &[104, 105], &[], &[106]];

pub fn jet_tags() -> Vec<String> {
    (0..8).map(|i| format!("j{i}")).collect()
}

/// Returns a builder populated with the dataset, before any read callbacks are added.
pub fn events_builder() -> MemorySourceBuilder {
    let mut builder = MemorySourceBuilder::new(SourceOptions {
        dataset_name: DATASET_NAME.to_string(),
        page_size: 2,
    });
    let root = builder.root_id();
    let id = builder.add_field(root, "id", BasicType::UInt64).unwrap();
    let flag = builder.add_field(root, "flag", BasicType::Boolean).unwrap();
    let label = builder.add_field(root, "label", BasicType::String).unwrap();
    let pos = builder.add_field(root, "pos", BasicType::Record).unwrap();
    let x = builder.add_field(pos, "x", BasicType::Float64).unwrap();
    let y = builder.add_field(pos, "y", BasicType::Float64).unwrap();
    let jets = builder.add_field(root, "jets", BasicType::Collection).unwrap();
    let pt = builder.add_field(jets, "pt", BasicType::Float32).unwrap();
    let tag = builder.add_field(jets, "tag", BasicType::String).unwrap();
    let hits = builder.add_field(jets, "hits", BasicType::Collection).unwrap();
    let e = builder.add_field(hits, "e", BasicType::Int32).unwrap();

    let tags = jet_tags();
    let clusters = [(0usize, 3usize, 0usize), (3, 5, 5)];
    for (first, end, first_jet) in clusters {
        let c = builder.add_cluster((end - first) as u64);
        let entries = first..end;
        let jet_count = JET_PT[entries.clone()].iter().map(|j| j.len()).sum::<usize>();
        let jet_range = first_jet..first_jet + jet_count;

        builder
            .put(c, id, ColumnValues::UInt64(IDS[entries.clone()].to_vec()))
            .unwrap();
        builder
            .put(c, flag, ColumnValues::Boolean(FLAGS[entries.clone()].to_vec()))
            .unwrap();
        builder
            .put(
                c,
                label,
                ColumnValues::String(LABELS[entries.clone()].iter().map(|s| s.to_string()).collect()),
            )
            .unwrap();
        builder
            .put(c, x, ColumnValues::Float64(POS_X[entries.clone()].to_vec()))
            .unwrap();
        builder
            .put(c, y, ColumnValues::Float64(POS_Y[entries.clone()].to_vec()))
            .unwrap();
        builder
            .put(
                c,
                jets,
                ColumnValues::Collection(JET_PT[entries.clone()].iter().map(|j| j.len() as u32).collect()),
            )
            .unwrap();
        builder
            .put(
                c,
                pt,
                ColumnValues::Float32(JET_PT[entries].iter().flat_map(|j| j.iter().copied()).collect()),
            )
            .unwrap();
        builder
            .put(c, tag, ColumnValues::String(tags[jet_range.clone()].to_vec()))
            .unwrap();
        builder
            .put(
                c,
                hits,
                ColumnValues::Collection(HIT_E[jet_range.clone()].iter().map(|h| h.len() as u32).collect()),
            )
            .unwrap();
        builder
            .put(
                c,
                e,
                ColumnValues::Int32(HIT_E[jet_range].iter().flat_map(|h| h.iter().copied()).collect()),
            )
            .unwrap();
    }
    builder
}

pub fn events_source() -> Arc<MemoryPageSource> {
    events_builder().build().unwrap()
}
