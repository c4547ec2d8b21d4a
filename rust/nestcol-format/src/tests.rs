use crate::{
    basic_type::BasicType,
    descriptor::DatasetDescriptor,
    descriptor_builder::DescriptorBuilder,
    ids::{ClusterId, FieldId},
};

fn populate_test_descriptor() -> DatasetDescriptor {
    let mut builder = DescriptorBuilder::new("events");
    let root = builder.root_id();
    builder.add_field(root, "id", BasicType::UInt64).unwrap();
    let tracks = builder
        .add_field(root, "tracks", BasicType::Collection)
        .unwrap();
    let track = builder.add_field(tracks, "_0", BasicType::Record).unwrap();
    builder.add_field(track, "px", BasicType::Float32).unwrap();
    builder.add_field(track, "label", BasicType::String).unwrap();
    let hits = builder.add_field(root, "hits", BasicType::Collection).unwrap();
    builder.add_field(hits, "px", BasicType::Int32).unwrap();
    builder.add_cluster(4);
    builder.add_cluster(6);
    builder.build()
}

#[test]
fn test_find_field_id_scoped() {
    let desc = populate_test_descriptor();
    let tracks = desc.find_field_id("tracks", desc.root_id());
    let hits = desc.find_field_id("hits", desc.root_id());
    assert!(tracks.is_valid());
    assert!(hits.is_valid());

    let track = desc.find_field_id("_0", tracks);
    let track_px = desc.find_field_id("px", track);
    let hit_px = desc.find_field_id("px", hits);
    assert!(track_px.is_valid());
    assert!(hit_px.is_valid());
    assert_ne!(track_px, hit_px);
    assert_eq!(
        desc.field_descriptor(track_px).unwrap().basic_type,
        BasicType::Float32
    );
    assert_eq!(
        desc.field_descriptor(hit_px).unwrap().basic_type,
        BasicType::Int32
    );

    assert!(!desc.find_field_id("px", desc.root_id()).is_valid());
    assert!(!desc.find_field_id("missing", tracks).is_valid());
}

#[test]
fn test_find_field_id_by_path() {
    let desc = populate_test_descriptor();
    let id = desc.find_field_id_by_path("tracks._0.label");
    assert!(id.is_valid());
    assert_eq!(desc.qualified_name(id).unwrap(), "tracks._0.label");
    assert!(!desc.find_field_id_by_path("tracks.label").is_valid());
    assert!(!desc.find_field_id_by_path("").is_valid());
}

#[test]
fn test_top_level_fields() {
    let desc = populate_test_descriptor();
    let names = desc
        .top_level_fields()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["id", "tracks", "hits"]);
}

#[test]
fn test_clusters() {
    let desc = populate_test_descriptor();
    assert_eq!(desc.entry_count(), 10);
    assert_eq!(desc.cluster_count(), 2);
    assert_eq!(desc.find_cluster_id(0), ClusterId::new(0));
    assert_eq!(desc.find_cluster_id(3), ClusterId::new(0));
    assert_eq!(desc.find_cluster_id(4), ClusterId::new(1));
    assert_eq!(desc.find_cluster_id(9), ClusterId::new(1));
    assert!(!desc.find_cluster_id(10).is_valid());
    assert_eq!(
        desc.get_cluster_descriptor(ClusterId::new(1))
            .unwrap()
            .entry_range(),
        4..10
    );
}

#[test]
fn test_builder_rejects_invalid_fields() {
    let mut builder = DescriptorBuilder::new("events");
    let root = builder.root_id();
    let id = builder.add_field(root, "id", BasicType::UInt64).unwrap();
    assert!(builder.add_field(root, "id", BasicType::Int32).is_err());
    assert!(builder.add_field(id, "child", BasicType::Int32).is_err());
    assert!(builder.add_field(root, "a.b", BasicType::Int32).is_err());
    assert!(builder.add_field(root, "", BasicType::Int32).is_err());
    assert!(
        builder
            .add_field(FieldId::from(42), "x", BasicType::Int32)
            .is_err()
    );
}

#[test]
fn test_json_roundtrip_restores_lookup() {
    let desc = populate_test_descriptor();
    let json = desc.to_json().unwrap();
    assert!(json.contains("\"tracks\""));
    let loaded = DatasetDescriptor::from_json(&json).unwrap();
    assert_eq!(loaded.name(), "events");
    assert_eq!(
        loaded.find_field_id_by_path("hits.px"),
        desc.find_field_id_by_path("hits.px")
    );
}
