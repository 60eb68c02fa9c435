use hprof_core::testing::HprofDumpWriter;
use hprof_core::{GcRootKind, HprofVersion, ObjectCategory};
use hprof_graph::{GraphConfig, HeapGraphError};
use pretty_assertions::assert_eq;

use super::support::*;

#[test]
fn object_count_is_the_sum_of_category_counts() {
    let graph = sample_graph();

    assert_eq!(graph.class_count(), 8);
    assert_eq!(graph.instance_count(), 3);
    assert_eq!(graph.object_array_count(), 1);
    assert_eq!(graph.primitive_array_count(), 2);
    assert_eq!(graph.object_count(), 14);
    assert_eq!(graph.objects().count(), graph.object_count());
}

#[test]
fn ids_and_indexes_round_trip() {
    let graph = sample_graph();

    for object in graph.objects() {
        let by_index = graph
            .find_object_by_index(object.index() as i64)
            .expect("every sequenced index resolves");
        assert_eq!(by_index.id(), object.id());

        let by_id = graph
            .find_object_by_id(object.id())
            .expect("every sequenced id resolves");
        assert_eq!(by_id.index(), object.index());
        assert_eq!(by_id.category(), object.category());
    }
}

#[test]
fn indexes_are_contiguous_by_category() {
    let graph = sample_graph();

    let indexes: Vec<usize> = graph.objects().map(|object| object.index()).collect();
    assert_eq!(indexes, (0..graph.object_count()).collect::<Vec<_>>());

    let classes: Vec<usize> = graph.classes().map(|class| class.index()).collect();
    assert_eq!(classes, (0..8).collect::<Vec<_>>());
    let instances: Vec<usize> = graph.instances().map(|instance| instance.index()).collect();
    assert_eq!(instances, vec![8, 9, 10]);
    let object_arrays: Vec<usize> = graph.object_arrays().map(|array| array.index()).collect();
    assert_eq!(object_arrays, vec![11]);
    let primitive_arrays: Vec<usize> =
        graph.primitive_arrays().map(|array| array.index()).collect();
    assert_eq!(primitive_arrays, vec![12, 13]);

    let categories: Vec<ObjectCategory> = graph.objects().map(|o| o.category()).collect();
    let mut sorted = categories.clone();
    sorted.sort_by_key(|category| ObjectCategory::ALL.iter().position(|c| c == category));
    assert_eq!(categories, sorted);
}

#[test]
fn sequences_can_be_iterated_again() {
    let graph = sample_graph();

    let first: Vec<u64> = graph.instances().map(|instance| instance.id()).collect();
    let second: Vec<u64> = graph.instances().map(|instance| instance.id()).collect();
    assert_eq!(first, vec![NODE_A, NODE_B, HELLO]);
    assert_eq!(first, second);
}

#[test]
fn index_zero_is_the_first_class() {
    let graph = sample_graph();

    let first = graph.find_object_by_index(0).expect("index 0 exists");
    let class = first.as_class().expect("classes come first");
    assert_eq!(class.id(), OBJECT);
    assert_eq!(class.name().unwrap(), "java.lang.Object");
}

#[test]
fn out_of_range_indexes_are_rejected() {
    let graph = sample_graph();
    let object_count = graph.object_count();

    for index in [-1, i64::MIN, object_count as i64, i64::MAX] {
        match graph.find_object_by_index(index) {
            Err(HeapGraphError::IndexOutOfRange {
                index: reported,
                object_count: count,
            }) => {
                assert_eq!(reported, index);
                assert_eq!(count, object_count);
            }
            other => panic!("expected IndexOutOfRange for {index}, got {other:?}"),
        }
    }
}

#[test]
fn unknown_ids_are_not_found() {
    let graph = sample_graph();

    assert!(matches!(
        graph.find_object_by_id(MISSING),
        Err(HeapGraphError::ObjectNotFound(MISSING))
    ));
    assert!(graph.find_object_by_id_or_none(MISSING).is_none());
    assert!(!graph.object_exists(MISSING));
    assert!(graph.object_exists(NODE_A));
}

#[test]
fn java_lang_object_lookups_agree_with_the_index() {
    let graph = sample_graph();

    let memoized = graph.find_object_by_id(OBJECT).unwrap();
    let by_index = graph.find_object_by_index(memoized.index() as i64).unwrap();
    assert_eq!(memoized, by_index);
    assert_eq!(memoized.descriptor(), by_index.descriptor());
}

#[test]
fn finds_classes_by_display_name_on_jvm_dumps() {
    let graph = sample_graph();

    let matrix = graph.find_class_by_name("int[][]").expect("int[][] is indexed");
    assert_eq!(matrix.id(), INT_MATRIX_CLASS);
    assert_eq!(matrix.name().unwrap(), "int[][]");

    let nodes = graph
        .find_class_by_name("com.example.Node[]")
        .expect("object array class is indexed");
    assert_eq!(nodes.id(), NODE_ARRAY_CLASS);

    assert_eq!(graph.find_class_by_name("com.example.Node").unwrap().id(), NODE);
    assert!(graph.find_class_by_name("int[").is_none());
    assert!(graph.find_class_by_name("int[]x").is_none());
    assert!(graph.find_class_by_name("com.example.Missing").is_none());
}

#[test]
fn finds_classes_by_display_name_on_android_dumps() {
    let (graph, _) = open_graph(
        sample_dump(HprofVersion::Android, 4),
        &GraphConfig::default(),
    );

    let matrix = graph.find_class_by_name("int[][]").expect("int[][] is indexed");
    assert_eq!(matrix.id(), INT_MATRIX_CLASS);
    assert_eq!(graph.class_name(NODE_ARRAY_CLASS).unwrap(), "com.example.Node[]");
    assert_eq!(graph.class_name(BYTE_ARRAY_CLASS).unwrap(), "byte[]");
}

#[test]
fn duplicate_class_names_resolve_to_the_same_class_every_time() {
    let ids: std::collections::BTreeSet<u64> = (0..20)
        .map(|_| {
            let mut writer = HprofDumpWriter::new(HprofVersion::Jdk6, 4);
            writer.class(OBJECT, "java.lang.Object", 0, &[], &[]);
            for id in [30, 10, 20] {
                writer.class(id, "com.example.Dup", OBJECT, &[], &[]);
            }
            let (header, bytes, index) = writer.finish();
            let (graph, _) = open_graph(
                Dump {
                    header,
                    bytes,
                    index,
                },
                &GraphConfig::default(),
            );
            graph.find_class_by_name("com.example.Dup").unwrap().id()
        })
        .collect();

    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![10]);
}

#[test]
fn slash_separated_class_names_are_normalized() {
    let graph = sample_graph();

    assert_eq!(graph.class_name(NODE).unwrap(), "com.example.Node");
    assert!(graph.find_class_by_name("com/example/Node").is_none());
}

#[test]
fn decodes_bracket_encoded_class_names() {
    let graph = sample_graph();

    assert_eq!(graph.class_name(INT_MATRIX_CLASS).unwrap(), "int[][]");
    assert_eq!(graph.class_name(BYTE_ARRAY_CLASS).unwrap(), "byte[]");
    assert_eq!(graph.class_name(NODE_ARRAY_CLASS).unwrap(), "com.example.Node[]");
    assert!(matches!(
        graph.class_name(MISSING),
        Err(HeapGraphError::ClassNameNotFound(MISSING))
    ));
}

#[test]
fn corrupt_array_type_tag_is_an_error() {
    let mut writer = HprofDumpWriter::new(HprofVersion::Jdk6, 4);
    writer.class(1, "[[Q", 0, &[], &[]);
    let (header, bytes, index) = writer.finish();
    let (graph, _) = open_graph(
        Dump {
            header,
            bytes,
            index,
        },
        &GraphConfig::default(),
    );

    match graph.class_name(1) {
        Err(HeapGraphError::UnexpectedArrayTypeTag { class_name, tag }) => {
            assert_eq!(class_name, "[[Q");
            assert_eq!(tag, Some('Q'));
        }
        other => panic!("expected UnexpectedArrayTypeTag, got {other:?}"),
    }
}

#[test]
fn heap_dump_index_follows_file_order() {
    let graph = sample_graph();

    assert_eq!(graph.find_heap_dump_index(OBJECT).unwrap(), 1);
    assert_eq!(graph.find_heap_dump_index(NODE_A).unwrap(), 9);
    assert_eq!(graph.find_heap_dump_index(HELLO_BYTES).unwrap(), 10);
    assert_eq!(graph.find_heap_dump_index(NODE_B).unwrap(), 12);
    assert_eq!(graph.find_heap_dump_index(NODES).unwrap(), 14);
    assert!(matches!(
        graph.find_heap_dump_index(MISSING),
        Err(HeapGraphError::ObjectNotFound(MISSING))
    ));
}

#[test]
fn heap_dump_index_lookup_is_the_inverse() {
    let graph = sample_graph();

    for object in graph.objects() {
        let rank = graph.find_heap_dump_index(object.id()).unwrap();
        let found = graph.find_object_by_heap_dump_index(rank).unwrap();
        assert_eq!(found.id(), object.id(), "rank {rank}");
    }

    for rank in [0, graph.object_count() + 1] {
        assert!(matches!(
            graph.find_object_by_heap_dump_index(rank),
            Err(HeapGraphError::HeapDumpIndexOutOfRange { .. })
        ));
    }
}

#[test]
fn gc_roots_are_filtered_by_kind_and_indexed_objects() {
    let graph = sample_graph();

    let roots: Vec<(GcRootKind, u64)> =
        graph.gc_roots().iter().map(|root| (root.kind, root.id)).collect();
    assert_eq!(
        roots,
        vec![
            (GcRootKind::StickyClass, OBJECT),
            (GcRootKind::ThreadObject, NODE_A),
        ]
    );
}
