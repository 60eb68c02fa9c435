//! Synthetic heap dumps for tests.
//!
//! [`HprofDumpWriter`] emits a well-formed HPROF byte stream and, while doing so,
//! populates the matching [`HprofIndex`], so tests get a dump and its index without
//! a scanner.

use std::collections::HashMap;

use crate::config::IndexConfig;
use crate::gc_root::{GcRoot, GcRootKind};
use crate::header::{HprofHeader, HprofVersion};
use crate::index::{
    IndexedClass, IndexedInstance, IndexedObject, IndexedObjectArray, IndexedPrimitiveArray,
};
use crate::memory_index::{HprofIndex, HprofIndexBuilder};
use crate::primitive::{FieldType, PrimitiveType, ValueHolder};
use crate::record::{FieldRecord, PrimitiveArrayValues, StaticFieldRecord};
use crate::{tags, ObjectId, StringId};

const STRING_IN_UTF8: u8 = 0x01;
const LOAD_CLASS: u8 = 0x02;
const HEAP_DUMP_SEGMENT: u8 = 0x1C;

pub struct HprofDumpWriter {
    header: HprofHeader,
    bytes: Vec<u8>,
    index: HprofIndexBuilder,
    strings: HashMap<String, StringId>,
    next_string_id: StringId,
    class_serial: u32,
    instance_sizes: HashMap<ObjectId, u32>,
}

impl HprofDumpWriter {
    pub fn new(version: HprofVersion, identifier_byte_size: usize) -> Self {
        Self::with_config(version, identifier_byte_size, IndexConfig::default())
    }

    pub fn with_config(
        version: HprofVersion,
        identifier_byte_size: usize,
        config: IndexConfig,
    ) -> Self {
        let header = HprofHeader {
            version,
            identifier_byte_size,
            heap_dump_timestamp: 0,
        };
        Self {
            bytes: header.to_bytes(),
            header,
            index: HprofIndexBuilder::new(config),
            strings: HashMap::new(),
            next_string_id: 0x1_0000,
            class_serial: 0,
            instance_sizes: HashMap::new(),
        }
    }

    pub fn header(&self) -> &HprofHeader {
        &self.header
    }

    fn id_size(&self) -> usize {
        self.header.identifier_byte_size
    }

    fn push_id(buf: &mut Vec<u8>, id: ObjectId, size: usize) {
        buf.extend_from_slice(&id.to_be_bytes()[8 - size..]);
    }

    fn push_value(buf: &mut Vec<u8>, value: &ValueHolder, id_size: usize) {
        match *value {
            ValueHolder::Reference(id) => Self::push_id(buf, id, id_size),
            ValueHolder::Boolean(v) => buf.push(v as u8),
            ValueHolder::Char(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ValueHolder::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ValueHolder::Double(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ValueHolder::Byte(v) => buf.push(v as u8),
            ValueHolder::Short(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ValueHolder::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ValueHolder::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn top_level(&mut self, tag: u8, body: &[u8]) -> u64 {
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&0u32.to_be_bytes());
        self.bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        let start = self.bytes.len() as u64;
        self.bytes.extend_from_slice(body);
        start
    }

    /// Writes a heap dump segment holding one sub-record and indexes it.
    fn sub_record(
        &mut self,
        id: ObjectId,
        tag: u8,
        body: &[u8],
        descriptor: impl FnOnce(u64, u64) -> IndexedObject,
    ) {
        let mut segment = Vec::with_capacity(body.len() + 1);
        segment.push(tag);
        segment.extend_from_slice(body);
        let segment_start = self.top_level(HEAP_DUMP_SEGMENT, &segment);
        let position = segment_start + 1;
        self.index.add_object(id, descriptor(position, body.len() as u64));
    }

    /// Interns `value` in the string table, writing a `STRING IN UTF8` record the
    /// first time it is seen.
    pub fn string(&mut self, value: &str) -> StringId {
        if let Some(&id) = self.strings.get(value) {
            return id;
        }
        let id = self.next_string_id;
        self.next_string_id += 1;

        let mut body = Vec::new();
        Self::push_id(&mut body, id, self.id_size());
        body.extend_from_slice(value.as_bytes());
        self.top_level(STRING_IN_UTF8, &body);

        self.strings.insert(value.to_string(), id);
        self.index.add_string(id, value);
        id
    }

    /// Writes `LOAD CLASS` and `CLASS DUMP` records. `name` is stored verbatim, so
    /// callers choose between `[I` and `int[]` style array names.
    pub fn class(
        &mut self,
        id: ObjectId,
        name: &str,
        super_class_id: ObjectId,
        static_fields: &[(&str, ValueHolder)],
        fields: &[(&str, FieldType)],
    ) -> ObjectId {
        let id_size = self.id_size();
        let name_id = self.string(name);
        self.class_serial += 1;
        let mut load = Vec::new();
        load.extend_from_slice(&self.class_serial.to_be_bytes());
        Self::push_id(&mut load, id, id_size);
        load.extend_from_slice(&0u32.to_be_bytes());
        Self::push_id(&mut load, name_id, id_size);
        self.top_level(LOAD_CLASS, &load);
        self.index.add_class_name(id, name);

        let static_records: Vec<StaticFieldRecord> = static_fields
            .iter()
            .map(|(name, value)| StaticFieldRecord {
                name_string_id: self.string(name),
                value: *value,
            })
            .collect();
        let field_records: Vec<FieldRecord> = fields
            .iter()
            .map(|(name, field_type)| FieldRecord {
                name_string_id: self.string(name),
                field_type: *field_type,
            })
            .collect();

        let own_size: usize = fields.iter().map(|(_, ty)| ty.byte_size(id_size)).sum();
        let inherited = self.instance_sizes.get(&super_class_id).copied().unwrap_or(0);
        let instance_size = own_size as u32 + inherited;
        self.instance_sizes.insert(id, instance_size);

        let mut body = Vec::new();
        Self::push_id(&mut body, id, id_size);
        body.extend_from_slice(&0u32.to_be_bytes());
        Self::push_id(&mut body, super_class_id, id_size);
        for _ in 0..5 {
            Self::push_id(&mut body, 0, id_size);
        }
        body.extend_from_slice(&instance_size.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());
        body.extend_from_slice(&(static_records.len() as u16).to_be_bytes());
        for record in &static_records {
            Self::push_id(&mut body, record.name_string_id, id_size);
            body.push(record.field_type().hprof_type());
            Self::push_value(&mut body, &record.value, id_size);
        }
        body.extend_from_slice(&(field_records.len() as u16).to_be_bytes());
        for record in &field_records {
            Self::push_id(&mut body, record.name_string_id, id_size);
            body.push(record.field_type.hprof_type());
        }

        self.sub_record(id, tags::CLASS_DUMP, &body, |position, record_size| {
            IndexedObject::Class(IndexedClass {
                position,
                record_size,
                super_class_id,
                instance_size,
            })
        });
        self.index.add_class_fields(id, static_records, field_records);
        id
    }

    /// Writes an `INSTANCE DUMP`. `field_values` must follow the field order of the
    /// class, then of each superclass.
    pub fn instance(
        &mut self,
        id: ObjectId,
        class_id: ObjectId,
        field_values: &[ValueHolder],
    ) -> ObjectId {
        let id_size = self.id_size();
        let mut values = Vec::new();
        for value in field_values {
            Self::push_value(&mut values, value, id_size);
        }

        let mut body = Vec::new();
        Self::push_id(&mut body, id, id_size);
        body.extend_from_slice(&0u32.to_be_bytes());
        Self::push_id(&mut body, class_id, id_size);
        body.extend_from_slice(&(values.len() as u32).to_be_bytes());
        body.extend_from_slice(&values);

        self.sub_record(id, tags::INSTANCE_DUMP, &body, |position, record_size| {
            IndexedObject::Instance(IndexedInstance {
                position,
                record_size,
                instance_class_id: class_id,
            })
        });
        id
    }

    pub fn object_array(
        &mut self,
        id: ObjectId,
        array_class_id: ObjectId,
        elements: &[ObjectId],
    ) -> ObjectId {
        let id_size = self.id_size();
        let mut body = Vec::new();
        Self::push_id(&mut body, id, id_size);
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend_from_slice(&(elements.len() as u32).to_be_bytes());
        Self::push_id(&mut body, array_class_id, id_size);
        for &element in elements {
            Self::push_id(&mut body, element, id_size);
        }

        self.sub_record(id, tags::OBJECT_ARRAY_DUMP, &body, |position, record_size| {
            IndexedObject::ObjectArray(IndexedObjectArray {
                position,
                record_size,
                array_class_id,
            })
        });
        id
    }

    pub fn primitive_array(&mut self, id: ObjectId, values: PrimitiveArrayValues) -> ObjectId {
        let id_size = self.id_size();
        let primitive_type = values.primitive_type();
        let mut body = Vec::new();
        Self::push_id(&mut body, id, id_size);
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend_from_slice(&(values.len() as u32).to_be_bytes());
        body.push(primitive_type.hprof_type());
        match &values {
            PrimitiveArrayValues::Boolean(v) => body.extend(v.iter().map(|&b| b as u8)),
            PrimitiveArrayValues::Char(v) => v.iter().for_each(|x| body.extend(x.to_be_bytes())),
            PrimitiveArrayValues::Float(v) => v.iter().for_each(|x| body.extend(x.to_be_bytes())),
            PrimitiveArrayValues::Double(v) => v.iter().for_each(|x| body.extend(x.to_be_bytes())),
            PrimitiveArrayValues::Byte(v) => body.extend(v.iter().map(|&b| b as u8)),
            PrimitiveArrayValues::Short(v) => v.iter().for_each(|x| body.extend(x.to_be_bytes())),
            PrimitiveArrayValues::Int(v) => v.iter().for_each(|x| body.extend(x.to_be_bytes())),
            PrimitiveArrayValues::Long(v) => v.iter().for_each(|x| body.extend(x.to_be_bytes())),
        }

        self.sub_record(id, tags::PRIMITIVE_ARRAY_DUMP, &body, |position, record_size| {
            IndexedObject::PrimitiveArray(IndexedPrimitiveArray {
                position,
                record_size,
                primitive_type,
            })
        });
        id
    }

    /// Convenience for the array class of a primitive type, named per the dump version.
    pub fn primitive_array_class(
        &mut self,
        id: ObjectId,
        primitive_type: PrimitiveType,
    ) -> ObjectId {
        let name = if self.header.version.uses_bracket_encoded_array_names() {
            format!("[{}", primitive_type.descriptor_char())
        } else {
            format!("{}[]", primitive_type.java_name())
        };
        self.class(id, &name, 0, &[], &[])
    }

    pub fn gc_root(&mut self, kind: GcRootKind, id: ObjectId) {
        self.index.add_gc_root(GcRoot { kind, id });
    }

    pub fn finish(self) -> (HprofHeader, Vec<u8>, HprofIndex) {
        (self.header, self.bytes, self.index.build())
    }
}
