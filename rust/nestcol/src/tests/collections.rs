use nestcol_format::ids::{ClusterId, ClusterIndex};

use crate::{
    read::{element::CollectionSize, reader::Reader, value::Value},
    tests::fixture::{HIT_E, JET_PT, events_source, jet_tags},
};

#[test]
fn test_collection_range_of_instance() {
    let reader = Reader::open(events_source());
    let mut jets = reader.collection_view("jets").unwrap();
    assert_eq!(jets.field_range().len(), 5);

    let range = jets.collection_range(2u64).unwrap();
    assert_eq!(range.len(), 3);
    assert_eq!(range.cluster_id(), ClusterId::new(0));
    assert_eq!(range.start(), ClusterIndex::new(ClusterId::new(0), 2));
    assert_eq!(jets.get(2u64).unwrap(), CollectionSize::new(3));

    let empty = jets.collection_range(1u64).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.iter().count(), 0);
}

#[test]
fn test_child_offsets_restart_per_cluster() {
    let reader = Reader::open(events_source());
    let jets = reader.collection_view("jets").unwrap();
    let c1 = ClusterId::new(1);

    let range = jets.collection_range(3u64).unwrap();
    assert_eq!(range.cluster_id(), c1);
    assert_eq!(range.start().index(), 0);
    assert_eq!(range.len(), 1);

    let by_cluster = jets.collection_range(ClusterIndex::new(c1, 1)).unwrap();
    assert_eq!(by_cluster, jets.collection_range(4u64).unwrap());
    assert_eq!(by_cluster.start().index(), 1);
    assert_eq!(by_cluster.end().index(), 3);
}

#[test]
fn test_child_views() {
    let reader = Reader::open(events_source());
    let jets = reader.collection_view("jets").unwrap();
    let mut pt = jets.view::<f32>("pt").unwrap();
    let mut tag = jets.view::<String>("tag").unwrap();
    let tags = jet_tags();

    let mut jet = 0;
    for entry in reader.entry_range() {
        let mut values = Vec::new();
        for child in jets.collection_range(entry).unwrap() {
            values.push(*pt.get(child).unwrap());
            assert_eq!(tag.get(child).unwrap(), &tags[jet]);
            jet += 1;
        }
        assert_eq!(values, JET_PT[entry as usize], "entry {entry}");
    }
    assert_eq!(jet, 8);
    assert_eq!(pt.field_range().len(), 8);
}

#[test]
fn test_nested_collections() {
    let reader = Reader::open(events_source());
    let jets = reader.collection_view("jets").unwrap();
    let hits = jets.collection_view("hits").unwrap();
    let mut energy = hits.view::<i32>("e").unwrap();

    let mut per_jet = Vec::new();
    for entry in reader.entry_range() {
        for jet in jets.collection_range(entry).unwrap() {
            let energies = hits
                .collection_range(jet)
                .unwrap()
                .into_iter()
                .map(|hit| *energy.get(hit).unwrap())
                .collect::<Vec<_>>();
            per_jet.push(energies);
        }
    }
    assert_eq!(per_jet, HIT_E);
}

#[test]
fn test_nested_view_by_path() {
    let reader = Reader::open(events_source());
    let jets = reader.collection_view("jets").unwrap();
    let mut energy = jets.view::<i32>("hits.e").unwrap();
    let all = energy
        .field_range()
        .into_iter()
        .map(|i| *energy.get(i).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(all, HIT_E.concat());
}

#[test]
fn test_missing_child() {
    let reader = Reader::open(events_source());
    let jets = reader.collection_view("jets").unwrap();
    let err = jets.view::<f32>("missing").err().unwrap();
    assert!(err.is_field_not_found());
    let message = err.to_string();
    assert!(message.contains("missing"));
    assert!(message.contains("events"));

    assert!(jets.erased_view("id").err().unwrap().is_field_not_found());
    assert!(jets.collection_view("pt.x").err().unwrap().is_field_not_found());
}

#[test]
fn test_collection_out_of_range() {
    let reader = Reader::open(events_source());
    let mut jets = reader.collection_view("jets").unwrap();
    assert!(jets.collection_range(5u64).unwrap_err().is_out_of_range());
    assert!(jets.get(5u64).unwrap_err().is_out_of_range());
    assert!(
        jets.collection_range(ClusterIndex::new(ClusterId::new(1), 2))
            .unwrap_err()
            .is_out_of_range()
    );
}

#[test]
fn test_collection_view_requires_collection() {
    let reader = Reader::open(events_source());
    assert!(reader.collection_view("label").is_err());

    let mut jets = reader.collection_view("jets").unwrap();
    jets.get(4u64).unwrap();
    assert_eq!(
        jets.typed_view().value(),
        &Value::Collection(CollectionSize::new(2))
    );
}

#[test]
fn test_erased_child_view() {
    let reader = Reader::open(events_source());
    let jets = reader.collection_view("jets").unwrap();
    let mut tag = jets.erased_view("tag").unwrap();
    let tags = jet_tags();

    let range = jets.collection_range(2u64).unwrap();
    assert_eq!(range.cluster_id(), ClusterId::new(0));
    for (child, expected) in range.into_iter().zip(&tags[2..5]) {
        tag.read(child).unwrap();
        assert_eq!(tag.value(), &Value::String(expected.clone()));
    }

    let hits = jets.collection_view("hits").unwrap();
    let mut energy = hits.erased_view("e").unwrap();
    let hit_range = hits.collection_range(range.start()).unwrap();
    assert_eq!(hit_range.len(), 2);
    energy.read(hit_range.start()).unwrap();
    assert_eq!(energy.value(), &Value::Int32(HIT_E[2][0]));
}
