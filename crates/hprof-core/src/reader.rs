use byteorder::{BigEndian, ByteOrder};

use crate::error::{HprofError, Result};
use crate::header::HprofHeader;
use crate::primitive::{FieldType, PrimitiveType, ValueHolder};
use crate::source::{check_bounds, RandomAccessSource};
use crate::ObjectId;

/// Big-endian cursor over the bytes of one record.
///
/// Identifiers are read with the width declared in the dump header.
pub struct HprofRecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
    identifier_byte_size: usize,
}

impl<'a> HprofRecordReader<'a> {
    pub fn new(buf: &'a [u8], identifier_byte_size: usize) -> Self {
        Self {
            buf,
            pos: 0,
            identifier_byte_size,
        }
    }

    pub fn identifier_byte_size(&self) -> usize {
        self.identifier_byte_size
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(HprofError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    pub fn read_id(&mut self) -> Result<ObjectId> {
        let size = self.identifier_byte_size;
        Ok(BigEndian::read_uint(self.take(size)?, size))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_value(&mut self, ty: FieldType) -> Result<ValueHolder> {
        Ok(match ty {
            FieldType::Object => ValueHolder::Reference(self.read_id()?),
            FieldType::Primitive(PrimitiveType::Boolean) => ValueHolder::Boolean(self.read_bool()?),
            FieldType::Primitive(PrimitiveType::Char) => ValueHolder::Char(self.read_u16()?),
            FieldType::Primitive(PrimitiveType::Float) => ValueHolder::Float(self.read_f32()?),
            FieldType::Primitive(PrimitiveType::Double) => ValueHolder::Double(self.read_f64()?),
            FieldType::Primitive(PrimitiveType::Byte) => ValueHolder::Byte(self.read_u8()? as i8),
            FieldType::Primitive(PrimitiveType::Short) => ValueHolder::Short(self.read_i16()?),
            FieldType::Primitive(PrimitiveType::Int) => ValueHolder::Int(self.read_i32()?),
            FieldType::Primitive(PrimitiveType::Long) => ValueHolder::Long(self.read_i64()?),
        })
    }
}

/// Largest read buffer kept between reads; big array records are not kept resident.
const MAX_RETAINED_BUFFER_LEN: usize = 1 << 20;

/// Performs bounded reads at arbitrary positions of a heap dump and decodes them.
///
/// Every read fetches exactly the requested byte range into a reused buffer, then
/// hands a [`HprofRecordReader`] over that range to the decode routine.
pub struct RandomAccessHprofReader {
    source: Box<dyn RandomAccessSource>,
    identifier_byte_size: usize,
    buffer: Vec<u8>,
}

impl std::fmt::Debug for RandomAccessHprofReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomAccessHprofReader")
            .field("identifier_byte_size", &self.identifier_byte_size)
            .field("source_len", &self.source.byte_len())
            .finish_non_exhaustive()
    }
}

impl RandomAccessHprofReader {
    pub fn open(source: impl RandomAccessSource + 'static, header: &HprofHeader) -> Self {
        Self::from_boxed(Box::new(source), header)
    }

    pub fn from_boxed(source: Box<dyn RandomAccessSource>, header: &HprofHeader) -> Self {
        Self {
            source,
            identifier_byte_size: header.identifier_byte_size,
            buffer: Vec::new(),
        }
    }

    pub fn identifier_byte_size(&self) -> usize {
        self.identifier_byte_size
    }

    pub fn read_record<T>(
        &mut self,
        position: u64,
        length: usize,
        decode: impl FnOnce(&mut HprofRecordReader<'_>) -> Result<T>,
    ) -> Result<T> {
        check_bounds(position, length, self.source.byte_len())?;
        self.buffer.clear();
        self.buffer.resize(length, 0);
        let decoded = match self.source.read_exact_at(position, &mut self.buffer) {
            Ok(()) => decode(&mut HprofRecordReader::new(
                &self.buffer,
                self.identifier_byte_size,
            )),
            Err(err) => Err(err),
        };
        if self.buffer.capacity() > MAX_RETAINED_BUFFER_LEN {
            self.buffer = Vec::new();
        }
        decoded
    }

    /// Releases the backing source.
    pub fn close(self) -> Result<()> {
        self.source.close()
    }
}
