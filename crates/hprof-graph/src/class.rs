use std::rc::Rc;

use hprof_core::{ClassDumpRecord, FieldType, IndexedClass, ObjectId};

use crate::error::Result;
use crate::graph::HeapGraph;
use crate::object::{HeapInstance, HeapObjectArray};
use crate::value::{HeapField, HeapValue};

#[derive(Debug, Clone, Copy)]
pub struct HeapClass<'g> {
    graph: &'g HeapGraph,
    id: ObjectId,
    descriptor: IndexedClass,
    index: usize,
}

impl<'g> HeapClass<'g> {
    pub(crate) fn new(
        graph: &'g HeapGraph,
        id: ObjectId,
        descriptor: IndexedClass,
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

    pub fn descriptor(&self) -> &IndexedClass {
        &self.descriptor
    }

    pub fn name(&self) -> Result<String> {
        self.graph.class_name(self.id)
    }

    /// Class name without its package.
    pub fn simple_name(&self) -> Result<String> {
        let name = self.name()?;
        Ok(match name.rfind('.') {
            Some(dot) => name[dot + 1..].to_string(),
            None => name,
        })
    }

    pub fn is_array_class(&self) -> Result<bool> {
        Ok(self.name()?.ends_with("[]"))
    }

    /// Size in bytes of the field values of an instance of this class, superclass
    /// fields included.
    pub fn instance_byte_size(&self) -> u32 {
        self.descriptor.instance_size
    }

    pub fn super_class_id(&self) -> Option<ObjectId> {
        match self.descriptor.super_class_id {
            0 => None,
            id => Some(id),
        }
    }

    pub fn superclass(&self) -> Option<HeapClass<'g>> {
        self.graph
            .find_object_by_id_or_none(self.super_class_id()?)?
            .into_class()
    }

    /// This class followed by each of its superclasses.
    pub fn class_hierarchy(&self) -> impl Iterator<Item = HeapClass<'g>> {
        std::iter::successors(Some(*self), HeapClass::superclass)
    }

    pub fn is_subclass_of(&self, other: &HeapClass<'_>) -> bool {
        self.class_hierarchy().any(|class| class.id == other.id)
    }

    pub fn read_record(&self) -> Result<Rc<ClassDumpRecord>> {
        self.graph.read_class_dump_record(self.id, &self.descriptor)
    }

    pub fn has_reference_instance_fields(&self) -> bool {
        self.graph.class_has_reference_instance_fields(self.id)
    }

    /// Names and types of the fields this class declares, superclasses excluded.
    pub fn instance_fields(&self) -> Result<Vec<(&'g str, FieldType)>> {
        self.graph
            .instance_fields(self.id)
            .iter()
            .map(|field| {
                let name = self.graph.field_name(self.id, field.name_string_id)?;
                Ok((name, field.field_type))
            })
            .collect()
    }

    pub fn read_static_fields(&self) -> Result<Vec<HeapField<'g>>> {
        self.graph
            .static_fields(self.id)
            .iter()
            .map(|field| {
                Ok(HeapField {
                    declaring_class: *self,
                    name: self
                        .graph
                        .static_field_name(self.id, field.name_string_id)?
                        .to_string(),
                    value: HeapValue::new(self.graph, field.value),
                })
            })
            .collect()
    }

    pub fn read_static_field(&self, name: &str) -> Result<Option<HeapField<'g>>> {
        for field in self.graph.static_fields(self.id) {
            if self.graph.static_field_name(self.id, field.name_string_id)? == name {
                return Ok(Some(HeapField {
                    declaring_class: *self,
                    name: name.to_string(),
                    value: HeapValue::new(self.graph, field.value),
                }));
            }
        }
        Ok(None)
    }

    /// Instances whose class is exactly this class. Scans every instance.
    pub fn direct_instances(&self) -> impl Iterator<Item = HeapInstance<'g>> {
        let id = self.id;
        self.graph
            .instances()
            .filter(move |instance| instance.instance_class_id() == id)
    }

    /// Instances of this class or of any subclass. Scans every instance; an
    /// instance whose class is missing from the dump yields an error.
    pub fn instances(&self) -> impl Iterator<Item = Result<HeapInstance<'g>>> {
        let class = *self;
        self.graph.instances().filter_map(move |instance| {
            match instance.is_instance_of_class(&class) {
                Ok(true) => Some(Ok(instance)),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            }
        })
    }

    /// Object arrays whose array class is this class. Scans every object array.
    pub fn object_array_instances(&self) -> impl Iterator<Item = HeapObjectArray<'g>> {
        let id = self.id;
        self.graph
            .object_arrays()
            .filter(move |array| array.array_class_id() == id)
    }
}

impl PartialEq for HeapClass<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for HeapClass<'_> {}
