use hprof_core::HprofVersion;
use hprof_graph::GraphConfig;
use pretty_assertions::assert_eq;

use super::support::*;

#[test]
fn cached_records_are_read_once() {
    let (graph, reads) = open_graph(
        sample_dump(HprofVersion::Jdk6, 8),
        &GraphConfig::default(),
    );
    let node = graph
        .find_object_by_id(NODE_A)
        .unwrap()
        .into_instance()
        .unwrap();
    assert_eq!(reads.get(), 0, "lookups never touch the dump");

    let first = node.read_record().unwrap();
    assert_eq!(reads.get(), 1);
    let second = node.read_record().unwrap();
    assert_eq!(reads.get(), 1);
    assert_eq!(first, second);
    assert!(graph.is_record_cached(NODE_A));

    let stats = graph.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
    assert_eq!(stats.capacity, hprof_graph::DEFAULT_RECORD_CACHE_CAPACITY);
}

#[test]
fn least_recently_used_records_are_evicted() {
    let (graph, reads) = open_graph(
        sample_dump(HprofVersion::Jdk6, 8),
        &GraphConfig::with_record_cache_capacity(2),
    );
    let read = |id| graph.find_object_by_id(id).unwrap().read_record().unwrap();

    read(NODE_A);
    read(NODE_B);
    read(NODE_A);
    read(HELLO);
    assert_eq!(reads.get(), 3);
    assert!(graph.is_record_cached(NODE_A));
    assert!(!graph.is_record_cached(NODE_B));
    assert!(graph.is_record_cached(HELLO));

    read(NODE_B);
    assert_eq!(reads.get(), 4);
    assert_eq!(graph.cache_stats().len, 2);
}

#[test]
fn array_sizes_match_with_and_without_cached_records() {
    for identifier_byte_size in [4, 8] {
        let (graph, _) = open_graph(
            sample_dump(HprofVersion::Jdk6, identifier_byte_size),
            &GraphConfig::default(),
        );
        let nodes = graph
            .find_object_by_id(NODES)
            .unwrap()
            .into_object_array()
            .unwrap();
        let ints = graph
            .find_object_by_id(INTS)
            .unwrap()
            .into_primitive_array()
            .unwrap();

        let uncached = (nodes.read_byte_size().unwrap(), ints.read_byte_size().unwrap());
        assert!(!graph.is_record_cached(NODES));
        assert!(!graph.is_record_cached(INTS));

        nodes.read_record().unwrap();
        ints.read_record().unwrap();
        let cached = (nodes.read_byte_size().unwrap(), ints.read_byte_size().unwrap());

        assert_eq!(uncached, cached);
        assert_eq!(uncached, (3 * identifier_byte_size, 3 * 4));
    }
}

#[test]
fn array_size_of_an_uncached_record_is_a_thin_read() {
    let (graph, reads) = open_graph(
        sample_dump(HprofVersion::Jdk6, 4),
        &GraphConfig::default(),
    );
    let bytes = graph
        .find_object_by_id(HELLO_BYTES)
        .unwrap()
        .into_primitive_array()
        .unwrap();

    assert_eq!(bytes.read_byte_size().unwrap(), 5);
    assert_eq!(reads.get(), 1);
    assert_eq!(graph.cache_stats().len, 0);
}

#[test]
fn array_sizes_do_not_count_as_cache_lookups() {
    let (graph, _) = open_graph(
        sample_dump(HprofVersion::Jdk6, 4),
        &GraphConfig::with_record_cache_capacity(2),
    );
    let nodes = graph
        .find_object_by_id(NODES)
        .unwrap()
        .into_object_array()
        .unwrap();
    let ints = graph
        .find_object_by_id(INTS)
        .unwrap()
        .into_primitive_array()
        .unwrap();

    nodes.read_byte_size().unwrap();
    let stats = graph.cache_stats();
    assert_eq!((stats.hits, stats.misses), (0, 0));

    nodes.read_record().unwrap();
    ints.read_record().unwrap();
    let before = graph.cache_stats();
    assert_eq!(nodes.read_byte_size().unwrap(), 12);
    assert_eq!(graph.cache_stats(), before);

    // NODES stays least recently used, so the next insert evicts it.
    graph.find_object_by_id(NODE_A).unwrap().read_record().unwrap();
    assert!(!graph.is_record_cached(NODES));
    assert!(graph.is_record_cached(INTS));
}
