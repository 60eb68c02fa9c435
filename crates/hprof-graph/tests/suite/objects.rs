use hprof_core::testing::HprofDumpWriter;
use hprof_core::{
    FieldType, HprofVersion, IndexConfig, PrimitiveArrayValues, PrimitiveType,
    SymbolRemapping, ValueHolder,
};
use hprof_graph::{GraphConfig, HeapGraphError, HeapObject};
use pretty_assertions::assert_eq;

use super::support::*;

#[test]
fn reads_instance_fields_across_the_class_hierarchy() {
    let graph = sample_graph();
    let node = graph
        .find_object_by_id(NODE_B)
        .unwrap()
        .into_instance()
        .unwrap();

    let fields: Vec<(String, String)> = node
        .read_fields()
        .unwrap()
        .into_iter()
        .map(|field| (field.declaring_class.name().unwrap(), field.name))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("com.example.SpecialNode".to_string(), "tag".to_string()),
            ("com.example.Node".to_string(), "next".to_string()),
            ("com.example.Node".to_string(), "weight".to_string()),
        ]
    );

    let tag = node
        .read_field("com.example.SpecialNode", "tag")
        .unwrap()
        .expect("tag is declared");
    assert_eq!(tag.value.as_int(), Some(42));

    let next = node.read_field("com.example.Node", "next").unwrap().unwrap();
    assert!(next.value.is_null_reference());
    assert!(next.value.as_object().is_none());

    assert!(node.read_field("com.example.Node", "tag").unwrap().is_none());
}

#[test]
fn references_resolve_to_objects() {
    let graph = sample_graph();
    let node = graph
        .find_object_by_id(NODE_A)
        .unwrap()
        .into_instance()
        .unwrap();

    let next = node.read_field("com.example.Node", "next").unwrap().unwrap();
    let target = next.value.as_object().expect("next points at NODE_B");
    assert_eq!(target.id(), NODE_B);
    assert_eq!(target.class_name().unwrap(), "com.example.SpecialNode");

    let weight = node.read_field("com.example.Node", "weight").unwrap().unwrap();
    assert_eq!(weight.value.as_long(), Some(7));
    assert_eq!(weight.value.as_int(), None);
}

#[test]
fn instance_of_checks_follow_superclasses() {
    let graph = sample_graph();
    let node = graph.find_class_by_name("com.example.Node").unwrap();
    let special = graph.find_class_by_name("com.example.SpecialNode").unwrap();

    let hierarchy: Vec<String> = special
        .class_hierarchy()
        .map(|class| class.name().unwrap())
        .collect();
    assert_eq!(
        hierarchy,
        vec!["com.example.SpecialNode", "com.example.Node", "java.lang.Object"]
    );
    assert!(special.is_subclass_of(&node));
    assert!(!node.is_subclass_of(&special));

    let direct: Vec<u64> = node.direct_instances().map(|i| i.id()).collect();
    assert_eq!(direct, vec![NODE_A]);
    let all: Vec<u64> = node
        .instances()
        .map(|i| i.map(|i| i.id()))
        .collect::<hprof_graph::Result<_>>()
        .unwrap();
    assert_eq!(all, vec![NODE_A, NODE_B]);

    let b = graph.find_object_by_id(NODE_B).unwrap().into_instance().unwrap();
    assert!(b.is_instance_of_class(&node).unwrap());
    assert!(b.is_instance_of("java.lang.Object").unwrap());
    assert!(!b.is_instance_of("java.lang.String").unwrap());
}

#[test]
fn instances_of_missing_classes_report_errors() {
    let mut writer = HprofDumpWriter::new(HprofVersion::Jdk6, 4);
    writer.class(OBJECT, "java.lang.Object", 0, &[], &[]);
    writer.instance(10, OBJECT, &[]);
    writer.instance(11, 77, &[]);
    let (header, bytes, index) = writer.finish();
    let (graph, _) = open_graph(
        Dump {
            header,
            bytes,
            index,
        },
        &GraphConfig::default(),
    );
    let object = graph.find_class_by_name("java.lang.Object").unwrap();

    let orphan = graph.find_object_by_id(11).unwrap().into_instance().unwrap();
    assert!(matches!(
        orphan.is_instance_of_class(&object),
        Err(HeapGraphError::ObjectNotFound(77))
    ));

    let results: Vec<_> = object.instances().collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().id(), 10);
    assert!(matches!(results[1], Err(HeapGraphError::ObjectNotFound(77))));
}

#[test]
fn instance_sizes_include_superclass_fields() {
    let graph = sample_graph();
    let special = graph.find_class_by_name("com.example.SpecialNode").unwrap();

    assert_eq!(special.instance_byte_size(), 4 + 8 + 8);
    assert_eq!(special.superclass().unwrap().id(), NODE);
    assert!(graph.find_class_by_name("java.lang.Object").unwrap().superclass().is_none());

    let b = graph.find_object_by_id(NODE_B).unwrap().into_instance().unwrap();
    assert_eq!(b.byte_size().unwrap(), 20);
    assert_eq!(b.read_record().unwrap().field_values.len(), 20);
}

#[test]
fn reads_static_fields_without_touching_the_dump() {
    let (graph, reads) = open_graph(
        sample_dump(HprofVersion::Jdk6, 8),
        &GraphConfig::default(),
    );
    let node = graph.find_class_by_name("com.example.Node").unwrap();

    let names: Vec<String> = node
        .read_static_fields()
        .unwrap()
        .into_iter()
        .map(|field| field.name)
        .collect();
    assert_eq!(names, vec!["COUNT", "HEAD"]);

    let count = node.read_static_field("COUNT").unwrap().unwrap();
    assert_eq!(count.value.as_int(), Some(3));
    let head = node.read_static_field("HEAD").unwrap().unwrap();
    assert_eq!(head.value.as_object().unwrap().id(), NODE_A);
    assert!(node.read_static_field("MISSING").unwrap().is_none());

    let fields: Vec<(&str, FieldType)> = node.instance_fields().unwrap();
    assert_eq!(
        fields,
        vec![
            ("next", FieldType::Object),
            ("weight", FieldType::Primitive(PrimitiveType::Long)),
        ]
    );
    assert!(node.has_reference_instance_fields());
    assert_eq!(reads.get(), 0);
}

#[test]
fn reads_class_dump_records() {
    let graph = sample_graph();
    let node = graph.find_class_by_name("com.example.Node").unwrap();

    let record = node.read_record().unwrap();
    assert_eq!(record.id, NODE);
    assert_eq!(record.super_class_id, OBJECT);
    assert_eq!(record.instance_size, 16);
    assert_eq!(record.static_fields.len(), 2);
    assert_eq!(record.fields.len(), 2);
    assert_eq!(
        graph.find_object_by_id(NODE).unwrap().class_name().unwrap(),
        "java.lang.Class"
    );
}

#[test]
fn reads_latin1_compact_strings() {
    let graph = sample_graph();
    let hello = graph.find_object_by_id(HELLO).unwrap().into_instance().unwrap();

    assert_eq!(hello.read_as_java_string().unwrap().as_deref(), Some("hello"));

    let node = graph.find_object_by_id(NODE_A).unwrap().into_instance().unwrap();
    assert_eq!(node.read_as_java_string().unwrap(), None);
}

#[test]
fn reads_utf16_compact_strings() {
    let mut writer = HprofDumpWriter::new(HprofVersion::Jdk6, 4);
    writer.class(OBJECT, "java.lang.Object", 0, &[], &[]);
    writer.class(
        STRING,
        "java.lang.String",
        OBJECT,
        &[],
        &[
            ("value", FieldType::Object),
            ("coder", FieldType::Primitive(PrimitiveType::Byte)),
        ],
    );
    let utf16: Vec<i8> = "héllo→"
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .map(|b| b as i8)
        .collect();
    writer.primitive_array(20, PrimitiveArrayValues::Byte(utf16));
    writer.instance(10, STRING, &[ValueHolder::Reference(20), ValueHolder::Byte(1)]);
    let (header, bytes, index) = writer.finish();
    let (graph, _) = open_graph(
        Dump {
            header,
            bytes,
            index,
        },
        &GraphConfig::default(),
    );

    let string = graph.find_object_by_id(10).unwrap().into_instance().unwrap();
    assert_eq!(string.read_as_java_string().unwrap().as_deref(), Some("héllo→"));
}

#[test]
fn reads_char_array_strings_with_offset_and_count() {
    let mut writer = HprofDumpWriter::new(HprofVersion::Android, 4);
    writer.class(OBJECT, "java.lang.Object", 0, &[], &[]);
    writer.class(
        STRING,
        "java.lang.String",
        OBJECT,
        &[],
        &[
            ("value", FieldType::Object),
            ("offset", FieldType::Primitive(PrimitiveType::Int)),
            ("count", FieldType::Primitive(PrimitiveType::Int)),
        ],
    );
    writer.primitive_array(
        20,
        PrimitiveArrayValues::Char("leak canary".encode_utf16().collect()),
    );
    writer.instance(
        10,
        STRING,
        &[
            ValueHolder::Reference(20),
            ValueHolder::Int(5),
            ValueHolder::Int(6),
        ],
    );
    let (header, bytes, index) = writer.finish();
    let (graph, _) = open_graph(
        Dump {
            header,
            bytes,
            index,
        },
        &GraphConfig::default(),
    );

    let string = graph.find_object_by_id(10).unwrap().into_instance().unwrap();
    assert_eq!(string.read_as_java_string().unwrap().as_deref(), Some("canary"));
}

#[test]
fn reads_array_elements_and_names() {
    let graph = sample_graph();

    let nodes = graph.find_object_by_id(NODES).unwrap().into_object_array().unwrap();
    assert_eq!(nodes.array_class_name().unwrap(), "com.example.Node[]");
    assert_eq!(nodes.array_class().unwrap().id(), NODE_ARRAY_CLASS);
    let elements: Vec<Option<u64>> = nodes
        .read_elements()
        .unwrap()
        .iter()
        .map(|value| value.as_object_id())
        .collect();
    assert_eq!(elements, vec![Some(NODE_A), Some(NODE_B), None]);

    let node_array_class = graph.find_class_by_name("com.example.Node[]").unwrap();
    let arrays: Vec<u64> = node_array_class
        .object_array_instances()
        .map(|array| array.id())
        .collect();
    assert_eq!(arrays, vec![NODES]);

    let ints = graph.find_object_by_id(INTS).unwrap();
    assert_eq!(ints.class_name().unwrap(), "int[]");
    let ints = ints.into_primitive_array().unwrap();
    assert_eq!(ints.primitive_type(), PrimitiveType::Int);
    assert_eq!(
        ints.read_record().unwrap().values,
        PrimitiveArrayValues::Int(vec![1, 2, 3])
    );
}

#[test]
fn wrappers_match_their_descriptors() {
    let graph = sample_graph();

    for object in graph.objects() {
        let matches = match object {
            HeapObject::Class(class) => class.id() == object.id(),
            HeapObject::Instance(instance) => instance.instance_class().is_ok(),
            HeapObject::ObjectArray(array) => array.array_class().is_ok(),
            HeapObject::PrimitiveArray(array) => {
                let record = array.read_record().unwrap();
                array.descriptor().primitive_type == record.values.primitive_type()
            }
        };
        assert!(matches, "{object:?}");
        assert_eq!(object.read_record().unwrap().category(), object.category());
    }
}

#[test]
fn obfuscated_names_are_remapped() {
    let mut remapping = SymbolRemapping::default();
    remapping.add_class("a.b", "com.example.Cache");
    remapping.add_field("a.b", "c", "entries");
    let config = IndexConfig {
        symbol_remapping: remapping,
        ..IndexConfig::default()
    };

    let mut writer = HprofDumpWriter::with_config(HprofVersion::Jdk6, 4, config);
    writer.class(OBJECT, "java.lang.Object", 0, &[], &[]);
    writer.class(2, "a.b", OBJECT, &[], &[("c", FieldType::Object)]);
    writer.instance(10, 2, &[ValueHolder::Reference(0)]);
    let (header, bytes, index) = writer.finish();
    let (graph, _) = open_graph(
        Dump {
            header,
            bytes,
            index,
        },
        &GraphConfig::default(),
    );

    let class = graph.find_class_by_name("com.example.Cache").expect("remapped class");
    assert_eq!(class.id(), 2);
    let instance = class.direct_instances().next().unwrap();
    let field = instance
        .read_field("com.example.Cache", "entries")
        .unwrap()
        .expect("remapped field");
    assert!(field.value.is_null_reference());
}
