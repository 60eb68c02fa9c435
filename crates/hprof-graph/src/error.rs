use hprof_core::{HprofError, ObjectCategory, ObjectId, StringId};
use thiserror::Error;

pub type Result<T, E = HeapGraphError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HeapGraphError {
    #[error("object id {0} not found in heap dump")]
    ObjectNotFound(ObjectId),
    #[error("object index {index} out of range 0..{object_count}")]
    IndexOutOfRange { index: i64, object_count: usize },
    #[error("heap dump index {rank} out of range 1..={object_count}")]
    HeapDumpIndexOutOfRange { rank: usize, object_count: usize },
    #[error("no class name for class id {0}")]
    ClassNameNotFound(ObjectId),
    #[error("no field name for string id {name_string_id} in class {class_id}")]
    FieldNameNotFound {
        class_id: ObjectId,
        name_string_id: StringId,
    },
    #[error("unexpected array type tag {tag:?} in class name {class_name:?}")]
    UnexpectedArrayTypeTag {
        class_name: String,
        tag: Option<char>,
    },
    #[error("object {id} decoded as {found:?}, expected {expected:?}")]
    UnexpectedRecordKind {
        id: ObjectId,
        expected: ObjectCategory,
        found: ObjectCategory,
    },
    #[error("heap graph is closed")]
    Closed,
    #[error(transparent)]
    Hprof(#[from] HprofError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
