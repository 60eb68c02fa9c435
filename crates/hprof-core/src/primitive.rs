use serde::{Deserialize, Serialize};

use crate::error::{HprofError, Result};
use crate::ObjectId;

/// HPROF basic type tag of an object reference.
pub const OBJECT_TYPE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Boolean,
    Char,
    Float,
    Double,
    Byte,
    Short,
    Int,
    Long,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Char,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
    ];

    pub fn hprof_type(self) -> u8 {
        match self {
            PrimitiveType::Boolean => 4,
            PrimitiveType::Char => 5,
            PrimitiveType::Float => 6,
            PrimitiveType::Double => 7,
            PrimitiveType::Byte => 8,
            PrimitiveType::Short => 9,
            PrimitiveType::Int => 10,
            PrimitiveType::Long => 11,
        }
    }

    pub fn from_hprof_type(tag: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.hprof_type() == tag)
            .ok_or(HprofError::UnknownPrimitiveType(tag))
    }

    pub fn byte_size(self) -> usize {
        match self {
            PrimitiveType::Boolean | PrimitiveType::Byte => 1,
            PrimitiveType::Char | PrimitiveType::Short => 2,
            PrimitiveType::Float | PrimitiveType::Int => 4,
            PrimitiveType::Double | PrimitiveType::Long => 8,
        }
    }

    /// Java source name (`int`, `boolean`, ...).
    pub fn java_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
        }
    }

    pub fn from_java_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.java_name() == name)
    }

    /// Field descriptor character (`Z`, `C`, `F`, `D`, `B`, `S`, `I`, `J`).
    pub fn descriptor_char(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Char => 'C',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
        }
    }

    pub fn from_descriptor_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.descriptor_char() == c)
    }
}

/// Declared type of a class or instance field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Object,
    Primitive(PrimitiveType),
}

impl FieldType {
    pub fn from_hprof_type(tag: u8) -> Result<Self> {
        if tag == OBJECT_TYPE {
            return Ok(FieldType::Object);
        }
        PrimitiveType::from_hprof_type(tag)
            .map(FieldType::Primitive)
            .map_err(|_| HprofError::UnknownBasicType(tag))
    }

    pub fn hprof_type(self) -> u8 {
        match self {
            FieldType::Object => OBJECT_TYPE,
            FieldType::Primitive(ty) => ty.hprof_type(),
        }
    }

    pub fn byte_size(self, identifier_byte_size: usize) -> usize {
        match self {
            FieldType::Object => identifier_byte_size,
            FieldType::Primitive(ty) => ty.byte_size(),
        }
    }
}

/// A single decoded field or static value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueHolder {
    Reference(ObjectId),
    Boolean(bool),
    Char(u16),
    Float(f32),
    Double(f64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
}

impl ValueHolder {
    pub const NULL: ValueHolder = ValueHolder::Reference(0);

    pub fn field_type(&self) -> FieldType {
        match self {
            ValueHolder::Reference(_) => FieldType::Object,
            ValueHolder::Boolean(_) => FieldType::Primitive(PrimitiveType::Boolean),
            ValueHolder::Char(_) => FieldType::Primitive(PrimitiveType::Char),
            ValueHolder::Float(_) => FieldType::Primitive(PrimitiveType::Float),
            ValueHolder::Double(_) => FieldType::Primitive(PrimitiveType::Double),
            ValueHolder::Byte(_) => FieldType::Primitive(PrimitiveType::Byte),
            ValueHolder::Short(_) => FieldType::Primitive(PrimitiveType::Short),
            ValueHolder::Int(_) => FieldType::Primitive(PrimitiveType::Int),
            ValueHolder::Long(_) => FieldType::Primitive(PrimitiveType::Long),
        }
    }

    pub fn is_null_reference(&self) -> bool {
        matches!(self, ValueHolder::Reference(0))
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match *self {
            ValueHolder::Reference(id) if id != 0 => Some(id),
            _ => None,
        }
    }
}
