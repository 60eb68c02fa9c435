use std::rc::Rc;

use hprof_core::{
    IndexedObjectArray, IndexedPrimitiveArray, ObjectArrayDumpRecord, ObjectId,
    PrimitiveArrayDumpRecord, PrimitiveType, ValueHolder,
};

use crate::error::{HeapGraphError, Result};
use crate::graph::HeapGraph;
use crate::object::HeapClass;
use crate::value::HeapValue;

#[derive(Debug, Clone, Copy)]
pub struct HeapObjectArray<'g> {
    graph: &'g HeapGraph,
    id: ObjectId,
    descriptor: IndexedObjectArray,
    index: usize,
}

impl<'g> HeapObjectArray<'g> {
    pub(crate) fn new(
        graph: &'g HeapGraph,
        id: ObjectId,
        descriptor: IndexedObjectArray,
        index: usize,
    ) -> Self {
        Self {
            graph,
            id,
            descriptor,
            index,
        }
    }

    pub fn graph(&self) -> &'g HeapGraph {
        self.graph
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn descriptor(&self) -> &IndexedObjectArray {
        &self.descriptor
    }

    pub fn array_class_id(&self) -> ObjectId {
        self.descriptor.array_class_id
    }

    pub fn array_class(&self) -> Result<HeapClass<'g>> {
        let class_id = self.array_class_id();
        self.graph
            .find_object_by_id(class_id)?
            .into_class()
            .ok_or(HeapGraphError::ObjectNotFound(class_id))
    }

    pub fn array_class_name(&self) -> Result<String> {
        self.graph.class_name(self.array_class_id())
    }

    /// Total size of the element references, without decoding the elements.
    pub fn read_byte_size(&self) -> Result<usize> {
        self.graph
            .read_object_array_byte_size(self.id, &self.descriptor)
    }

    pub fn read_record(&self) -> Result<Rc<ObjectArrayDumpRecord>> {
        self.graph
            .read_object_array_dump_record(self.id, &self.descriptor)
    }

    pub fn read_elements(&self) -> Result<Vec<HeapValue<'g>>> {
        Ok(self
            .read_record()?
            .element_ids
            .iter()
            .map(|&id| HeapValue::new(self.graph, ValueHolder::Reference(id)))
            .collect())
    }
}

impl PartialEq for HeapObjectArray<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for HeapObjectArray<'_> {}

#[derive(Debug, Clone, Copy)]
pub struct HeapPrimitiveArray<'g> {
    graph: &'g HeapGraph,
    id: ObjectId,
    descriptor: IndexedPrimitiveArray,
    index: usize,
}

impl<'g> HeapPrimitiveArray<'g> {
    pub(crate) fn new(
        graph: &'g HeapGraph,
        id: ObjectId,
        descriptor: IndexedPrimitiveArray,
        index: usize,
    ) -> Self {
        Self {
            graph,
            id,
            descriptor,
            index,
        }
    }

    pub fn graph(&self) -> &'g HeapGraph {
        self.graph
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn descriptor(&self) -> &IndexedPrimitiveArray {
        &self.descriptor
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.descriptor.primitive_type
    }

    /// `int[]`, `char[]`, ...
    pub fn array_class_name(&self) -> String {
        format!("{}[]", self.primitive_type().java_name())
    }

    /// Total size of the element values, without decoding the elements.
    pub fn read_byte_size(&self) -> Result<usize> {
        self.graph
            .read_primitive_array_byte_size(self.id, &self.descriptor)
    }

    pub fn read_record(&self) -> Result<Rc<PrimitiveArrayDumpRecord>> {
        self.graph
            .read_primitive_array_dump_record(self.id, &self.descriptor)
    }
}

impl PartialEq for HeapPrimitiveArray<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for HeapPrimitiveArray<'_> {}
