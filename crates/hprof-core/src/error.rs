use thiserror::Error;

pub type Result<T, E = HprofError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HprofError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of record: need {needed} bytes at offset {offset}, have {available}")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid hprof header: {0}")]
    InvalidHeader(String),
    #[error("unsupported identifier size {0}, expected 4 or 8")]
    UnsupportedIdentifierSize(u32),
    #[error("unknown primitive type tag {0}")]
    UnknownPrimitiveType(u8),
    #[error("unknown basic type tag {0}")]
    UnknownBasicType(u8),
    #[error("read of {length} bytes at position {position} overruns a source of {source_len} bytes")]
    RecordOverrun {
        position: u64,
        length: usize,
        source_len: u64,
    },
}
