use crate::gc_root::GcRoot;
use crate::primitive::PrimitiveType;
use crate::record::{FieldRecord, StaticFieldRecord};
use crate::{ObjectId, StringId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Class,
    Instance,
    ObjectArray,
    PrimitiveArray,
}

impl ObjectCategory {
    /// Categories in sequential index order.
    pub const ALL: [ObjectCategory; 4] = [
        ObjectCategory::Class,
        ObjectCategory::Instance,
        ObjectCategory::ObjectArray,
        ObjectCategory::PrimitiveArray,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedClass {
    pub position: u64,
    pub record_size: u64,
    pub super_class_id: ObjectId,
    pub instance_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedInstance {
    pub position: u64,
    pub record_size: u64,
    pub instance_class_id: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedObjectArray {
    pub position: u64,
    pub record_size: u64,
    pub array_class_id: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedPrimitiveArray {
    pub position: u64,
    pub record_size: u64,
    pub primitive_type: PrimitiveType,
}

/// Where an object lives in the dump, plus the metadata needed without decoding it.
///
/// `position` is the offset of the sub-record body (right after the sub-record tag)
/// and `record_size` the length of that body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedObject {
    Class(IndexedClass),
    Instance(IndexedInstance),
    ObjectArray(IndexedObjectArray),
    PrimitiveArray(IndexedPrimitiveArray),
}

impl IndexedObject {
    pub fn position(&self) -> u64 {
        match self {
            IndexedObject::Class(class) => class.position,
            IndexedObject::Instance(instance) => instance.position,
            IndexedObject::ObjectArray(array) => array.position,
            IndexedObject::PrimitiveArray(array) => array.position,
        }
    }

    pub fn record_size(&self) -> u64 {
        match self {
            IndexedObject::Class(class) => class.record_size,
            IndexedObject::Instance(instance) => instance.record_size,
            IndexedObject::ObjectArray(array) => array.record_size,
            IndexedObject::PrimitiveArray(array) => array.record_size,
        }
    }

    pub fn category(&self) -> ObjectCategory {
        match self {
            IndexedObject::Class(_) => ObjectCategory::Class,
            IndexedObject::Instance(_) => ObjectCategory::Instance,
            IndexedObject::ObjectArray(_) => ObjectCategory::ObjectArray,
            IndexedObject::PrimitiveArray(_) => ObjectCategory::PrimitiveArray,
        }
    }
}

pub type IndexedObjects<'a> = Box<dyn Iterator<Item = (ObjectId, IndexedObject)> + 'a>;

/// Positional index over every object of one dump.
///
/// Sequential indexes number classes first, then instances, object arrays and
/// primitive arrays; within a category they follow [`PositionalIndex::category_objects`].
pub trait PositionalIndex {
    fn count(&self, category: ObjectCategory) -> usize;

    fn class_count(&self) -> usize {
        self.count(ObjectCategory::Class)
    }

    fn instance_count(&self) -> usize {
        self.count(ObjectCategory::Instance)
    }

    fn object_array_count(&self) -> usize {
        self.count(ObjectCategory::ObjectArray)
    }

    fn primitive_array_count(&self) -> usize {
        self.count(ObjectCategory::PrimitiveArray)
    }

    fn object_count(&self) -> usize {
        ObjectCategory::ALL.iter().map(|&c| self.count(c)).sum()
    }

    /// First sequential index of `category`.
    fn category_base(&self, category: ObjectCategory) -> usize {
        ObjectCategory::ALL
            .iter()
            .take_while(|&&c| c != category)
            .map(|&c| self.count(c))
            .sum()
    }

    fn gc_roots(&self) -> &[GcRoot];

    fn object_at_index(&self, index: usize) -> Option<(ObjectId, IndexedObject)>;

    /// Sequential index and descriptor of `id`.
    fn indexed_object(&self, id: ObjectId) -> Option<(usize, IndexedObject)>;

    fn object_id_is_indexed(&self, id: ObjectId) -> bool {
        self.indexed_object(id).is_some()
    }

    /// Class id for a name exactly as stored in the dump.
    fn class_id(&self, storage_name: &str) -> Option<ObjectId>;

    /// Name of a class exactly as stored in the dump.
    fn class_name(&self, class_id: ObjectId) -> Option<&str>;

    fn field_name(&self, class_id: ObjectId, name_string_id: StringId) -> Option<&str>;

    fn static_fields(&self, class_id: ObjectId) -> &[StaticFieldRecord];

    fn instance_fields(&self, class_id: ObjectId) -> &[FieldRecord];

    /// Whether the class itself (superclasses excluded) declares reference fields.
    fn class_has_reference_instance_fields(&self, class_id: ObjectId) -> bool {
        self.instance_fields(class_id)
            .iter()
            .any(|field| field.field_type == crate::FieldType::Object)
    }

    fn category_objects(&self, category: ObjectCategory) -> IndexedObjects<'_>;

    /// Every indexed object, in sequential index order.
    fn indexed_objects(&self) -> IndexedObjects<'_> {
        Box::new(
            ObjectCategory::ALL
                .into_iter()
                .flat_map(move |category| self.category_objects(category)),
        )
    }
}
