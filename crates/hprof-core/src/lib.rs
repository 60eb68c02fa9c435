//! Binary building blocks for reading HPROF heap dumps at random positions.
//!
//! This crate owns everything below the object graph:
//! - the file header and producer version ([`HprofHeader`], [`HprofVersion`])
//! - decoded heap dump sub-records ([`ClassDumpRecord`], [`InstanceDumpRecord`], ...)
//! - bounded random reads against a backing source ([`RandomAccessHprofReader`])
//! - the positional index contract ([`PositionalIndex`]) and a compact in-memory
//!   implementation ([`HprofIndex`])
//!
//! The object graph itself lives in `hprof-graph`.

mod config;
mod error;
mod gc_root;
mod header;
mod index;
mod memory_index;
mod primitive;
mod reader;
mod record;
mod remap;
mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use crate::config::IndexConfig;
pub use crate::error::{HprofError, Result};
pub use crate::gc_root::{GcRoot, GcRootKind};
pub use crate::header::{HprofHeader, HprofVersion};
pub use crate::index::{
    IndexedClass, IndexedInstance, IndexedObject, IndexedObjectArray, IndexedObjects,
    IndexedPrimitiveArray, ObjectCategory, PositionalIndex,
};
pub use crate::memory_index::{HprofIndex, HprofIndexBuilder};
pub use crate::primitive::{FieldType, PrimitiveType, ValueHolder};
pub use crate::reader::{HprofRecordReader, RandomAccessHprofReader};
pub use crate::record::{
    ClassDumpRecord, FieldRecord, InstanceDumpRecord, ObjectArrayDumpRecord,
    PrimitiveArrayDumpRecord, PrimitiveArrayValues, StaticFieldRecord,
};
pub use crate::remap::SymbolRemapping;
pub use crate::source::{BytesSource, FileSource, MmapSource, RandomAccessSource};

/// Identifier of an object in the dump. HPROF identifiers are 4 or 8 bytes wide
/// on disk and are always widened to `u64` in memory.
pub type ObjectId = u64;

/// Id of an entry in the HPROF string table (`STRING IN UTF8` records).
pub type StringId = u64;

/// Size in bytes of a big-endian `u32` in the dump.
pub const INT_SIZE: usize = 4;

/// Heap dump sub-record tags.
pub mod tags {
    pub const CLASS_DUMP: u8 = 0x20;
    pub const INSTANCE_DUMP: u8 = 0x21;
    pub const OBJECT_ARRAY_DUMP: u8 = 0x22;
    pub const PRIMITIVE_ARRAY_DUMP: u8 = 0x23;
}
