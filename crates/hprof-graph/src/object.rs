use hprof_core::{IndexedObject, ObjectCategory, ObjectId};

use crate::cache::ObjectRecord;
use crate::error::Result;
use crate::graph::HeapGraph;

pub use crate::array::{HeapObjectArray, HeapPrimitiveArray};
pub use crate::class::HeapClass;
pub use crate::instance::HeapInstance;

/// An object of the dump, viewed through the graph that indexed it.
#[derive(Debug, Clone, Copy)]
pub enum HeapObject<'g> {
    Class(HeapClass<'g>),
    Instance(HeapInstance<'g>),
    ObjectArray(HeapObjectArray<'g>),
    PrimitiveArray(HeapPrimitiveArray<'g>),
}

/// Builds the wrapper matching `descriptor`. Every lookup and sequence of the graph
/// goes through here.
pub(crate) fn wrap(
    graph: &HeapGraph,
    id: ObjectId,
    descriptor: IndexedObject,
    index: usize,
) -> HeapObject<'_> {
    match descriptor {
        IndexedObject::Class(indexed) => {
            HeapObject::Class(HeapClass::new(graph, id, indexed, index))
        }
        IndexedObject::Instance(indexed) => {
            HeapObject::Instance(HeapInstance::new(graph, id, indexed, index))
        }
        IndexedObject::ObjectArray(indexed) => {
            HeapObject::ObjectArray(HeapObjectArray::new(graph, id, indexed, index))
        }
        IndexedObject::PrimitiveArray(indexed) => {
            HeapObject::PrimitiveArray(HeapPrimitiveArray::new(graph, id, indexed, index))
        }
    }
}

impl<'g> HeapObject<'g> {
    pub fn graph(&self) -> &'g HeapGraph {
        match self {
            HeapObject::Class(class) => class.graph(),
            HeapObject::Instance(instance) => instance.graph(),
            HeapObject::ObjectArray(array) => array.graph(),
            HeapObject::PrimitiveArray(array) => array.graph(),
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            HeapObject::Class(class) => class.id(),
            HeapObject::Instance(instance) => instance.id(),
            HeapObject::ObjectArray(array) => array.id(),
            HeapObject::PrimitiveArray(array) => array.id(),
        }
    }

    /// Sequential index of the object, in `0..graph.object_count()`.
    pub fn index(&self) -> usize {
        match self {
            HeapObject::Class(class) => class.index(),
            HeapObject::Instance(instance) => instance.index(),
            HeapObject::ObjectArray(array) => array.index(),
            HeapObject::PrimitiveArray(array) => array.index(),
        }
    }

    pub fn descriptor(&self) -> IndexedObject {
        match self {
            HeapObject::Class(class) => IndexedObject::Class(*class.descriptor()),
            HeapObject::Instance(instance) => IndexedObject::Instance(*instance.descriptor()),
            HeapObject::ObjectArray(array) => IndexedObject::ObjectArray(*array.descriptor()),
            HeapObject::PrimitiveArray(array) => {
                IndexedObject::PrimitiveArray(*array.descriptor())
            }
        }
    }

    pub fn category(&self) -> ObjectCategory {
        self.descriptor().category()
    }

    pub fn record_size(&self) -> u64 {
        self.descriptor().record_size()
    }

    /// Display name of the object's class (the class itself for class objects is
    /// `java.lang.Class`).
    pub fn class_name(&self) -> Result<String> {
        match self {
            HeapObject::Class(_) => Ok("java.lang.Class".to_string()),
            HeapObject::Instance(instance) => instance.instance_class_name(),
            HeapObject::ObjectArray(array) => array.array_class_name(),
            HeapObject::PrimitiveArray(array) => Ok(array.array_class_name()),
        }
    }

    pub fn read_record(&self) -> Result<ObjectRecord> {
        Ok(match self {
            HeapObject::Class(class) => ObjectRecord::Class(class.read_record()?),
            HeapObject::Instance(instance) => ObjectRecord::Instance(instance.read_record()?),
            HeapObject::ObjectArray(array) => ObjectRecord::ObjectArray(array.read_record()?),
            HeapObject::PrimitiveArray(array) => {
                ObjectRecord::PrimitiveArray(array.read_record()?)
            }
        })
    }

    pub fn as_class(&self) -> Option<HeapClass<'g>> {
        self.into_class()
    }

    pub fn as_instance(&self) -> Option<HeapInstance<'g>> {
        self.into_instance()
    }

    pub fn as_object_array(&self) -> Option<HeapObjectArray<'g>> {
        self.into_object_array()
    }

    pub fn as_primitive_array(&self) -> Option<HeapPrimitiveArray<'g>> {
        self.into_primitive_array()
    }

    pub fn into_class(self) -> Option<HeapClass<'g>> {
        match self {
            HeapObject::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<HeapInstance<'g>> {
        match self {
            HeapObject::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_object_array(self) -> Option<HeapObjectArray<'g>> {
        match self {
            HeapObject::ObjectArray(array) => Some(array),
            _ => None,
        }
    }

    pub fn into_primitive_array(self) -> Option<HeapPrimitiveArray<'g>> {
        match self {
            HeapObject::PrimitiveArray(array) => Some(array),
            _ => None,
        }
    }
}

impl PartialEq for HeapObject<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph(), other.graph()) && self.id() == other.id()
    }
}

impl Eq for HeapObject<'_> {}
