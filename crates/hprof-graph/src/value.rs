use hprof_core::{ObjectId, ValueHolder};

use crate::graph::HeapGraph;
use crate::object::{HeapClass, HeapObject};

/// A field or array element value. References resolve lazily through the graph.
#[derive(Debug, Clone, Copy)]
pub struct HeapValue<'g> {
    graph: &'g HeapGraph,
    holder: ValueHolder,
}

impl<'g> HeapValue<'g> {
    pub fn new(graph: &'g HeapGraph, holder: ValueHolder) -> Self {
        Self { graph, holder }
    }

    pub fn holder(&self) -> ValueHolder {
        self.holder
    }

    pub fn is_null_reference(&self) -> bool {
        self.holder.is_null_reference()
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        self.holder.as_object_id()
    }

    /// The referenced object, or `None` for null references, primitives, and
    /// references to objects missing from the dump.
    pub fn as_object(&self) -> Option<HeapObject<'g>> {
        self.graph.find_object_by_id_or_none(self.as_object_id()?)
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.holder {
            ValueHolder::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<u16> {
        match self.holder {
            ValueHolder::Char(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self.holder {
            ValueHolder::Byte(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self.holder {
            ValueHolder::Short(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.holder {
            ValueHolder::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self.holder {
            ValueHolder::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self.holder {
            ValueHolder::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.holder {
            ValueHolder::Double(v) => Some(v),
            _ => None,
        }
    }
}

/// A named field value together with the class that declares it.
#[derive(Debug, Clone)]
pub struct HeapField<'g> {
    pub declaring_class: HeapClass<'g>,
    pub name: String,
    pub value: HeapValue<'g>,
}
