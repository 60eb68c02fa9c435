use std::rc::Rc;

use hprof_core::{
    HprofRecordReader, IndexedInstance, InstanceDumpRecord, ObjectId, PrimitiveArrayValues,
};

use crate::error::{HeapGraphError, Result};
use crate::graph::HeapGraph;
use crate::object::{HeapClass, HeapObject};
use crate::value::{HeapField, HeapValue};

const JAVA_LANG_STRING: &str = "java.lang.String";

/// `java.lang.String.coder` value for Latin-1 (compact) strings.
const STRING_CODER_LATIN1: i8 = 0;

#[derive(Debug, Clone, Copy)]
pub struct HeapInstance<'g> {
    graph: &'g HeapGraph,
    id: ObjectId,
    descriptor: IndexedInstance,
    index: usize,
}

impl<'g> HeapInstance<'g> {
    pub(crate) fn new(
        graph: &'g HeapGraph,
        id: ObjectId,
        descriptor: IndexedInstance,
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

    pub fn descriptor(&self) -> &IndexedInstance {
        &self.descriptor
    }

    pub fn instance_class_id(&self) -> ObjectId {
        self.descriptor.instance_class_id
    }

    pub fn instance_class(&self) -> Result<HeapClass<'g>> {
        let class_id = self.instance_class_id();
        self.graph
            .find_object_by_id(class_id)?
            .into_class()
            .ok_or(HeapGraphError::ObjectNotFound(class_id))
    }

    pub fn instance_class_name(&self) -> Result<String> {
        self.graph.class_name(self.instance_class_id())
    }

    /// Shallow size of the instance, from its class layout.
    pub fn byte_size(&self) -> Result<u32> {
        Ok(self.instance_class()?.instance_byte_size())
    }

    /// Whether the instance class is `class` or one of its subclasses. Fails when
    /// the instance class is missing from the dump.
    pub fn is_instance_of_class(&self, class: &HeapClass<'_>) -> Result<bool> {
        Ok(self.instance_class()?.is_subclass_of(class))
    }

    /// Whether the instance class or one of its superclasses is named `class_name`.
    pub fn is_instance_of(&self, class_name: &str) -> Result<bool> {
        for class in self.instance_class()?.class_hierarchy() {
            if class.name()? == class_name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn read_record(&self) -> Result<Rc<InstanceDumpRecord>> {
        self.graph.read_instance_dump_record(self.id, &self.descriptor)
    }

    /// Decodes every field value, instance class fields first and then each
    /// superclass in turn.
    pub fn read_fields(&self) -> Result<Vec<HeapField<'g>>> {
        let record = self.read_record()?;
        let mut reader =
            HprofRecordReader::new(&record.field_values, self.graph.identifier_byte_size());
        let mut fields = Vec::new();
        for class in self.instance_class()?.class_hierarchy() {
            for field in self.graph.instance_fields(class.id()) {
                let value = reader.read_value(field.field_type)?;
                fields.push(HeapField {
                    declaring_class: class,
                    name: self
                        .graph
                        .field_name(class.id(), field.name_string_id)?
                        .to_string(),
                    value: HeapValue::new(self.graph, value),
                });
            }
        }
        Ok(fields)
    }

    pub fn read_field(
        &self,
        declaring_class_name: &str,
        field_name: &str,
    ) -> Result<Option<HeapField<'g>>> {
        for field in self.read_fields()? {
            if field.name == field_name && field.declaring_class.name()? == declaring_class_name {
                return Ok(Some(field));
            }
        }
        Ok(None)
    }

    /// Contents of a `java.lang.String` instance, or `None` for other classes and
    /// strings whose backing array is missing.
    ///
    /// Handles `char[]` backed strings (with optional `offset`/`count`) and
    /// `byte[]` backed compact strings (`coder` 0 is Latin-1, otherwise UTF-16).
    pub fn read_as_java_string(&self) -> Result<Option<String>> {
        if self.instance_class_name()? != JAVA_LANG_STRING {
            return Ok(None);
        }
        let fields = self.read_fields()?;
        let field = |name: &str| {
            fields
                .iter()
                .find(|f| f.name == name && f.declaring_class.id() == self.instance_class_id())
                .map(|f| f.value)
        };

        let Some(array) = field("value")
            .and_then(|value| value.as_object())
            .and_then(HeapObject::into_primitive_array)
        else {
            return Ok(None);
        };

        let text = match &array.read_record()?.values {
            PrimitiveArrayValues::Char(chars) => {
                let offset = field("offset").and_then(|v| v.as_int()).unwrap_or(0).max(0) as usize;
                let count = field("count")
                    .and_then(|v| v.as_int())
                    .map(|c| c.max(0) as usize)
                    .unwrap_or(chars.len());
                let end = offset.saturating_add(count).min(chars.len());
                String::from_utf16_lossy(&chars[offset.min(end)..end])
            }
            PrimitiveArrayValues::Byte(bytes) => {
                let coder = field("coder").and_then(|v| v.as_byte());
                if coder == Some(STRING_CODER_LATIN1) {
                    bytes.iter().map(|&b| b as u8 as char).collect::<String>()
                } else {
                    let units: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|pair| u16::from_be_bytes([pair[0] as u8, pair[1] as u8]))
                        .collect();
                    String::from_utf16_lossy(&units)
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(text))
    }
}

impl PartialEq for HeapInstance<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for HeapInstance<'_> {}
