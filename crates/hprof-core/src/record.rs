//! Decoded heap dump sub-records.
//!
//! Each `read_*_dump_record` method expects the reader to be positioned on the
//! record body, right after the sub-record tag byte.

use crate::error::Result;
use crate::primitive::{FieldType, PrimitiveType, ValueHolder};
use crate::reader::HprofRecordReader;
use crate::{ObjectId, StringId};

#[derive(Debug, Clone, PartialEq)]
pub struct StaticFieldRecord {
    pub name_string_id: StringId,
    pub value: ValueHolder,
}

impl StaticFieldRecord {
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRecord {
    pub name_string_id: StringId,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDumpRecord {
    pub id: ObjectId,
    pub stack_trace_serial_number: u32,
    pub super_class_id: ObjectId,
    pub class_loader_id: ObjectId,
    pub signers_id: ObjectId,
    pub protection_domain_id: ObjectId,
    pub instance_size: u32,
    pub static_fields: Vec<StaticFieldRecord>,
    pub fields: Vec<FieldRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDumpRecord {
    pub id: ObjectId,
    pub stack_trace_serial_number: u32,
    pub class_id: ObjectId,
    /// Raw field values: the instance class fields first, then each superclass in turn.
    pub field_values: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArrayDumpRecord {
    pub id: ObjectId,
    pub stack_trace_serial_number: u32,
    pub array_class_id: ObjectId,
    pub element_ids: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArrayValues {
    Boolean(Vec<bool>),
    Char(Vec<u16>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
}

impl PrimitiveArrayValues {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            PrimitiveArrayValues::Boolean(_) => PrimitiveType::Boolean,
            PrimitiveArrayValues::Char(_) => PrimitiveType::Char,
            PrimitiveArrayValues::Float(_) => PrimitiveType::Float,
            PrimitiveArrayValues::Double(_) => PrimitiveType::Double,
            PrimitiveArrayValues::Byte(_) => PrimitiveType::Byte,
            PrimitiveArrayValues::Short(_) => PrimitiveType::Short,
            PrimitiveArrayValues::Int(_) => PrimitiveType::Int,
            PrimitiveArrayValues::Long(_) => PrimitiveType::Long,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrimitiveArrayValues::Boolean(v) => v.len(),
            PrimitiveArrayValues::Char(v) => v.len(),
            PrimitiveArrayValues::Float(v) => v.len(),
            PrimitiveArrayValues::Double(v) => v.len(),
            PrimitiveArrayValues::Byte(v) => v.len(),
            PrimitiveArrayValues::Short(v) => v.len(),
            PrimitiveArrayValues::Int(v) => v.len(),
            PrimitiveArrayValues::Long(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_size(&self) -> usize {
        self.len() * self.primitive_type().byte_size()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArrayDumpRecord {
    pub id: ObjectId,
    pub stack_trace_serial_number: u32,
    pub values: PrimitiveArrayValues,
}

impl<'a> HprofRecordReader<'a> {
    pub fn read_class_dump_record(&mut self) -> Result<ClassDumpRecord> {
        let id = self.read_id()?;
        let stack_trace_serial_number = self.read_u32()?;
        let super_class_id = self.read_id()?;
        let class_loader_id = self.read_id()?;
        let signers_id = self.read_id()?;
        let protection_domain_id = self.read_id()?;
        // Two reserved identifiers.
        self.read_id()?;
        self.read_id()?;
        let instance_size = self.read_u32()?;

        let constant_pool_count = self.read_u16()?;
        for _ in 0..constant_pool_count {
            self.read_u16()?;
            let ty = FieldType::from_hprof_type(self.read_u8()?)?;
            self.read_value(ty)?;
        }

        let static_field_count = self.read_u16()? as usize;
        let mut static_fields = Vec::with_capacity(static_field_count);
        for _ in 0..static_field_count {
            let name_string_id = self.read_id()?;
            let ty = FieldType::from_hprof_type(self.read_u8()?)?;
            let value = self.read_value(ty)?;
            static_fields.push(StaticFieldRecord {
                name_string_id,
                value,
            });
        }

        let field_count = self.read_u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let name_string_id = self.read_id()?;
            let field_type = FieldType::from_hprof_type(self.read_u8()?)?;
            fields.push(FieldRecord {
                name_string_id,
                field_type,
            });
        }

        Ok(ClassDumpRecord {
            id,
            stack_trace_serial_number,
            super_class_id,
            class_loader_id,
            signers_id,
            protection_domain_id,
            instance_size,
            static_fields,
            fields,
        })
    }

    pub fn read_instance_dump_record(&mut self) -> Result<InstanceDumpRecord> {
        let id = self.read_id()?;
        let stack_trace_serial_number = self.read_u32()?;
        let class_id = self.read_id()?;
        let len = self.read_u32()? as usize;
        let field_values = self.read_bytes(len)?.to_vec();
        Ok(InstanceDumpRecord {
            id,
            stack_trace_serial_number,
            class_id,
            field_values,
        })
    }

    pub fn read_object_array_dump_record(&mut self) -> Result<ObjectArrayDumpRecord> {
        let id = self.read_id()?;
        let stack_trace_serial_number = self.read_u32()?;
        let len = self.read_u32()? as usize;
        let array_class_id = self.read_id()?;
        let element_ids = (0..len)
            .map(|_| self.read_id())
            .collect::<Result<Vec<_>>>()?;
        Ok(ObjectArrayDumpRecord {
            id,
            stack_trace_serial_number,
            array_class_id,
            element_ids,
        })
    }

    pub fn read_primitive_array_dump_record(&mut self) -> Result<PrimitiveArrayDumpRecord> {
        let id = self.read_id()?;
        let stack_trace_serial_number = self.read_u32()?;
        let len = self.read_u32()? as usize;
        let ty = PrimitiveType::from_hprof_type(self.read_u8()?)?;
        let values = match ty {
            PrimitiveType::Boolean => {
                PrimitiveArrayValues::Boolean(self.read_n(len, |r| r.read_bool())?)
            }
            PrimitiveType::Char => PrimitiveArrayValues::Char(self.read_n(len, |r| r.read_u16())?),
            PrimitiveType::Float => PrimitiveArrayValues::Float(self.read_n(len, |r| r.read_f32())?),
            PrimitiveType::Double => {
                PrimitiveArrayValues::Double(self.read_n(len, |r| r.read_f64())?)
            }
            PrimitiveType::Byte => {
                PrimitiveArrayValues::Byte(self.read_n(len, |r| Ok(r.read_u8()? as i8))?)
            }
            PrimitiveType::Short => PrimitiveArrayValues::Short(self.read_n(len, |r| r.read_i16())?),
            PrimitiveType::Int => PrimitiveArrayValues::Int(self.read_n(len, |r| r.read_i32())?),
            PrimitiveType::Long => PrimitiveArrayValues::Long(self.read_n(len, |r| r.read_i64())?),
        };
        Ok(PrimitiveArrayDumpRecord {
            id,
            stack_trace_serial_number,
            values,
        })
    }

    fn read_n<T>(
        &mut self,
        len: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            out.push(read(self)?);
        }
        Ok(out)
    }
}
