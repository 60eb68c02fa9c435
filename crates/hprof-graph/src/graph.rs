use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hprof_core::{
    ClassDumpRecord, FieldRecord, GcRoot, HprofHeader, HprofRecordReader, IndexedClass,
    IndexedInstance, IndexedObject, IndexedObjectArray, IndexedPrimitiveArray, InstanceDumpRecord,
    ObjectArrayDumpRecord, ObjectCategory, ObjectId, PositionalIndex, PrimitiveArrayDumpRecord,
    RandomAccessHprofReader, StaticFieldRecord, StringId, INT_SIZE,
};

use crate::cache::{CacheStats, ObjectRecord, RecordCache};
use crate::config::GraphConfig;
use crate::error::{HeapGraphError, Result};
use crate::names;
use crate::object::{
    wrap, HeapClass, HeapInstance, HeapObject, HeapObjectArray, HeapPrimitiveArray,
};

const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Typed, lazily decoded view of one heap dump.
///
/// The graph owns the positional index, the random-access reader over the dump
/// and a bounded cache of decoded records. Objects handed out borrow the graph;
/// their contents are only read from the dump when asked for.
///
/// A graph is meant for a single thread: the cache and the reader sit behind
/// `RefCell`s and the type is neither `Send` nor `Sync`.
pub struct HeapGraph {
    header: HprofHeader,
    reader: RefCell<Option<RandomAccessHprofReader>>,
    index: Box<dyn PositionalIndex>,
    cache: RefCell<RecordCache>,
    /// `java.lang.Object` is the most dereferenced class of any dump.
    java_lang_object_class: Option<(ObjectId, IndexedObject, usize)>,
}

impl fmt::Debug for HeapGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapGraph")
            .field("version", &self.header.version)
            .field("identifier_byte_size", &self.header.identifier_byte_size)
            .field("object_count", &self.object_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl HeapGraph {
    pub fn new(
        header: HprofHeader,
        reader: RandomAccessHprofReader,
        index: impl PositionalIndex + 'static,
        config: &GraphConfig,
    ) -> Self {
        let index: Box<dyn PositionalIndex> = Box::new(index);
        let java_lang_object_class = index.class_id(JAVA_LANG_OBJECT).and_then(|id| {
            let (idx, descriptor) = index.indexed_object(id)?;
            Some((id, descriptor, idx))
        });

        tracing::debug!(
            version = ?header.version,
            identifier_byte_size = header.identifier_byte_size,
            classes = index.class_count(),
            instances = index.instance_count(),
            object_arrays = index.object_array_count(),
            primitive_arrays = index.primitive_array_count(),
            record_cache_capacity = config.record_cache_capacity,
            "opened heap graph"
        );

        Self {
            header,
            reader: RefCell::new(Some(reader)),
            index,
            cache: RefCell::new(RecordCache::new(config.record_cache_capacity)),
            java_lang_object_class,
        }
    }

    pub fn header(&self) -> &HprofHeader {
        &self.header
    }

    pub fn identifier_byte_size(&self) -> usize {
        self.header.identifier_byte_size
    }

    pub fn class_count(&self) -> usize {
        self.index.class_count()
    }

    pub fn instance_count(&self) -> usize {
        self.index.instance_count()
    }

    pub fn object_array_count(&self) -> usize {
        self.index.object_array_count()
    }

    pub fn primitive_array_count(&self) -> usize {
        self.index.primitive_array_count()
    }

    pub fn object_count(&self) -> usize {
        self.class_count()
            + self.instance_count()
            + self.object_array_count()
            + self.primitive_array_count()
    }

    pub fn gc_roots(&self) -> &[GcRoot] {
        self.index.gc_roots()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Whether the decoded record of `id` currently sits in the record cache.
    pub fn is_record_cached(&self, id: ObjectId) -> bool {
        self.cache.borrow().contains(id)
    }

    fn category_objects(
        &self,
        category: ObjectCategory,
    ) -> impl Iterator<Item = HeapObject<'_>> {
        let base = self.index.category_base(category);
        self.index
            .category_objects(category)
            .enumerate()
            .map(move |(offset, (id, descriptor))| wrap(self, id, descriptor, base + offset))
    }

    pub fn classes(&self) -> impl Iterator<Item = HeapClass<'_>> {
        self.category_objects(ObjectCategory::Class)
            .filter_map(HeapObject::into_class)
    }

    pub fn instances(&self) -> impl Iterator<Item = HeapInstance<'_>> {
        self.category_objects(ObjectCategory::Instance)
            .filter_map(HeapObject::into_instance)
    }

    pub fn object_arrays(&self) -> impl Iterator<Item = HeapObjectArray<'_>> {
        self.category_objects(ObjectCategory::ObjectArray)
            .filter_map(HeapObject::into_object_array)
    }

    pub fn primitive_arrays(&self) -> impl Iterator<Item = HeapPrimitiveArray<'_>> {
        self.category_objects(ObjectCategory::PrimitiveArray)
            .filter_map(HeapObject::into_primitive_array)
    }

    /// Every object: classes, then instances, object arrays and primitive arrays.
    pub fn objects(&self) -> impl Iterator<Item = HeapObject<'_>> {
        ObjectCategory::ALL
            .into_iter()
            .flat_map(move |category| self.category_objects(category))
    }

    pub fn find_object_by_id(&self, id: ObjectId) -> Result<HeapObject<'_>> {
        self.find_object_by_id_or_none(id)
            .ok_or(HeapGraphError::ObjectNotFound(id))
    }

    pub fn find_object_by_id_or_none(&self, id: ObjectId) -> Option<HeapObject<'_>> {
        if let Some((object_id, descriptor, index)) = self.java_lang_object_class {
            if object_id == id {
                return Some(wrap(self, object_id, descriptor, index));
            }
        }
        let (index, descriptor) = self.index.indexed_object(id)?;
        Some(wrap(self, id, descriptor, index))
    }

    /// Looks up an object by sequential index. Negative and too large indexes fail
    /// without touching the dump.
    pub fn find_object_by_index(&self, index: i64) -> Result<HeapObject<'_>> {
        let object_count = self.object_count();
        let out_of_range = || HeapGraphError::IndexOutOfRange {
            index,
            object_count,
        };
        let position = usize::try_from(index)
            .ok()
            .filter(|&position| position < object_count)
            .ok_or_else(out_of_range)?;
        let (id, descriptor) = self
            .index
            .object_at_index(position)
            .ok_or_else(out_of_range)?;
        Ok(wrap(self, id, descriptor, position))
    }

    pub fn object_exists(&self, id: ObjectId) -> bool {
        self.index.object_id_is_indexed(id)
    }

    /// Looks up a class by its display name, e.g. `java.util.HashMap` or `int[][]`.
    pub fn find_class_by_name(&self, name: &str) -> Option<HeapClass<'_>> {
        let storage_name = if self.header.version.uses_bracket_encoded_array_names() {
            names::to_storage_class_name(name)
        } else {
            name.into()
        };
        let class_id = self.index.class_id(&storage_name)?;
        self.find_object_by_id_or_none(class_id)?.into_class()
    }

    /// 1-based rank of an object by ascending position in the dump file.
    ///
    /// Scans every indexed object.
    pub fn find_heap_dump_index(&self, id: ObjectId) -> Result<usize> {
        let (_, target) = self
            .index
            .indexed_object(id)
            .ok_or(HeapGraphError::ObjectNotFound(id))?;
        let position = target.position();
        let before = self
            .index
            .indexed_objects()
            .filter(|(_, descriptor)| descriptor.position() < position)
            .count();
        Ok(before + 1)
    }

    /// Inverse of [`HeapGraph::find_heap_dump_index`].
    ///
    /// Collects and sorts every indexed object by position.
    pub fn find_object_by_heap_dump_index(&self, rank: usize) -> Result<HeapObject<'_>> {
        let object_count = self.object_count();
        if rank == 0 || rank > object_count {
            return Err(HeapGraphError::HeapDumpIndexOutOfRange { rank, object_count });
        }
        let mut objects: Vec<(ObjectId, IndexedObject)> = self.index.indexed_objects().collect();
        objects.sort_unstable_by_key(|(_, descriptor)| descriptor.position());
        let (id, _) = objects[rank - 1];
        self.find_object_by_id(id)
    }

    /// Display name of a class, with bracket-encoded array names decoded.
    pub fn class_name(&self, class_id: ObjectId) -> Result<String> {
        let stored = self
            .index
            .class_name(class_id)
            .ok_or(HeapGraphError::ClassNameNotFound(class_id))?;
        if self.header.version.uses_bracket_encoded_array_names() {
            Ok(names::to_display_class_name(stored)?.into_owned())
        } else {
            Ok(stored.to_string())
        }
    }

    pub fn static_fields(&self, class_id: ObjectId) -> &[StaticFieldRecord] {
        self.index.static_fields(class_id)
    }

    pub fn instance_fields(&self, class_id: ObjectId) -> &[FieldRecord] {
        self.index.instance_fields(class_id)
    }

    pub fn class_has_reference_instance_fields(&self, class_id: ObjectId) -> bool {
        self.index.class_has_reference_instance_fields(class_id)
    }

    pub fn field_name(&self, class_id: ObjectId, name_string_id: StringId) -> Result<&str> {
        self.index
            .field_name(class_id, name_string_id)
            .ok_or(HeapGraphError::FieldNameNotFound {
                class_id,
                name_string_id,
            })
    }

    pub fn static_field_name(
        &self,
        class_id: ObjectId,
        name_string_id: StringId,
    ) -> Result<&str> {
        self.field_name(class_id, name_string_id)
    }

    pub fn is_closed(&self) -> bool {
        self.reader.borrow().is_none()
    }

    /// Releases the dump. Every read afterwards fails with [`HeapGraphError::Closed`],
    /// and so does a second `close`.
    pub fn close(&mut self) -> Result<()> {
        let reader = self.reader.get_mut().take().ok_or(HeapGraphError::Closed)?;
        let cache = self.cache.get_mut();
        let stats = cache.stats();
        cache.clear();
        tracing::debug!(
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "closing heap graph"
        );
        reader.close()?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(HeapGraphError::Closed);
        }
        Ok(())
    }

    /// Bounded read of `length` bytes at `position`, bypassing the record cache.
    fn read_at<T>(
        &self,
        position: u64,
        length: usize,
        decode: impl FnOnce(&mut HprofRecordReader<'_>) -> hprof_core::Result<T>,
    ) -> Result<T> {
        let mut reader = self.reader.borrow_mut();
        let reader = reader.as_mut().ok_or(HeapGraphError::Closed)?;
        Ok(reader.read_record(position, length, decode)?)
    }

    fn read_record(
        &self,
        id: ObjectId,
        position: u64,
        record_size: u64,
        decode: impl FnOnce(&mut HprofRecordReader<'_>) -> hprof_core::Result<ObjectRecord>,
    ) -> Result<ObjectRecord> {
        self.ensure_open()?;
        let cached = self.cache.borrow_mut().get(id);
        if let Some(record) = cached {
            return Ok(record);
        }

        tracing::trace!(id, position, record_size, "record cache miss");
        // Lengths beyond the address space can never fit the source; the bounds
        // check reports them as an overrun.
        let length = usize::try_from(record_size).unwrap_or(usize::MAX);
        let record = self.read_at(position, length, decode)?;
        self.cache.borrow_mut().put(id, record.clone());
        Ok(record)
    }

    pub(crate) fn read_class_dump_record(
        &self,
        id: ObjectId,
        descriptor: &IndexedClass,
    ) -> Result<Rc<ClassDumpRecord>> {
        let record = self.read_record(id, descriptor.position, descriptor.record_size, |r| {
            Ok(ObjectRecord::Class(Rc::new(r.read_class_dump_record()?)))
        })?;
        match record {
            ObjectRecord::Class(record) => Ok(record),
            other => Err(unexpected_kind(id, ObjectCategory::Class, &other)),
        }
    }

    pub(crate) fn read_instance_dump_record(
        &self,
        id: ObjectId,
        descriptor: &IndexedInstance,
    ) -> Result<Rc<InstanceDumpRecord>> {
        let record = self.read_record(id, descriptor.position, descriptor.record_size, |r| {
            Ok(ObjectRecord::Instance(Rc::new(r.read_instance_dump_record()?)))
        })?;
        match record {
            ObjectRecord::Instance(record) => Ok(record),
            other => Err(unexpected_kind(id, ObjectCategory::Instance, &other)),
        }
    }

    pub(crate) fn read_object_array_dump_record(
        &self,
        id: ObjectId,
        descriptor: &IndexedObjectArray,
    ) -> Result<Rc<ObjectArrayDumpRecord>> {
        let record = self.read_record(id, descriptor.position, descriptor.record_size, |r| {
            Ok(ObjectRecord::ObjectArray(Rc::new(
                r.read_object_array_dump_record()?,
            )))
        })?;
        match record {
            ObjectRecord::ObjectArray(record) => Ok(record),
            other => Err(unexpected_kind(id, ObjectCategory::ObjectArray, &other)),
        }
    }

    pub(crate) fn read_primitive_array_dump_record(
        &self,
        id: ObjectId,
        descriptor: &IndexedPrimitiveArray,
    ) -> Result<Rc<PrimitiveArrayDumpRecord>> {
        let record = self.read_record(id, descriptor.position, descriptor.record_size, |r| {
            Ok(ObjectRecord::PrimitiveArray(Rc::new(
                r.read_primitive_array_dump_record()?,
            )))
        })?;
        match record {
            ObjectRecord::PrimitiveArray(record) => Ok(record),
            other => Err(unexpected_kind(id, ObjectCategory::PrimitiveArray, &other)),
        }
    }

    /// Reads only the element count of an array record: it sits after the array
    /// id and the stack trace serial number.
    fn read_array_length(&self, position: u64) -> Result<usize> {
        let offset = (self.identifier_byte_size() + INT_SIZE) as u64;
        let length = self.read_at(position + offset, INT_SIZE, |r| r.read_u32())?;
        Ok(length as usize)
    }

    pub(crate) fn read_object_array_byte_size(
        &self,
        id: ObjectId,
        descriptor: &IndexedObjectArray,
    ) -> Result<usize> {
        self.ensure_open()?;
        let cached = self.cache.borrow().peek(id);
        if let Some(ObjectRecord::ObjectArray(record)) = cached {
            return Ok(record.element_ids.len() * self.identifier_byte_size());
        }
        Ok(self.read_array_length(descriptor.position)? * self.identifier_byte_size())
    }

    pub(crate) fn read_primitive_array_byte_size(
        &self,
        id: ObjectId,
        descriptor: &IndexedPrimitiveArray,
    ) -> Result<usize> {
        self.ensure_open()?;
        let cached = self.cache.borrow().peek(id);
        if let Some(ObjectRecord::PrimitiveArray(record)) = cached {
            return Ok(record.values.byte_size());
        }
        Ok(self.read_array_length(descriptor.position)? * descriptor.primitive_type.byte_size())
    }
}

fn unexpected_kind(
    id: ObjectId,
    expected: ObjectCategory,
    found: &ObjectRecord,
) -> HeapGraphError {
    HeapGraphError::UnexpectedRecordKind {
        id,
        expected,
        found: found.category(),
    }
}
