use byteorder::{BigEndian, ByteOrder};

use crate::error::{HprofError, Result};

/// Producer convention of a dump, identified by the header version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HprofVersion {
    Jdk1_2Beta3,
    Jdk1_2Beta4,
    Jdk6,
    Android,
}

impl HprofVersion {
    pub const ALL: [HprofVersion; 4] = [
        HprofVersion::Jdk1_2Beta3,
        HprofVersion::Jdk1_2Beta4,
        HprofVersion::Jdk6,
        HprofVersion::Android,
    ];

    pub fn version_string(self) -> &'static str {
        match self {
            HprofVersion::Jdk1_2Beta3 => "JAVA PROFILE 1.0",
            HprofVersion::Jdk1_2Beta4 => "JAVA PROFILE 1.0.1",
            HprofVersion::Jdk6 => "JAVA PROFILE 1.0.2",
            HprofVersion::Android => "JAVA PROFILE 1.0.3",
        }
    }

    pub fn from_version_string(version: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.version_string() == version)
    }

    /// JVM dumps store array class names in descriptor form (`[[I`,
    /// `[Ljava.lang.String;`). Android dumps already store `int[][]`.
    pub fn uses_bracket_encoded_array_names(self) -> bool {
        !matches!(self, HprofVersion::Android)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HprofHeader {
    pub version: HprofVersion,
    pub identifier_byte_size: usize,
    pub heap_dump_timestamp: u64,
}

impl HprofHeader {
    pub fn new(version: HprofVersion, identifier_byte_size: usize) -> Result<Self> {
        check_identifier_size(identifier_byte_size as u32)?;
        Ok(Self {
            version,
            identifier_byte_size,
            heap_dump_timestamp: 0,
        })
    }

    /// Parses the header at the start of `bytes`, returning it together with its
    /// encoded length (where the first top-level record starts).
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        let nul = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| HprofError::InvalidHeader("missing version terminator".into()))?;
        let version_str = std::str::from_utf8(&bytes[..nul])
            .map_err(|_| HprofError::InvalidHeader("version is not utf-8".into()))?;
        let version = HprofVersion::from_version_string(version_str).ok_or_else(|| {
            HprofError::InvalidHeader(format!("unsupported version {version_str:?}"))
        })?;

        let fixed = nul + 1;
        let len = fixed + 4 + 8;
        if bytes.len() < len {
            return Err(HprofError::UnexpectedEof {
                offset: fixed,
                needed: 12,
                available: bytes.len() - fixed,
            });
        }
        let identifier_byte_size = BigEndian::read_u32(&bytes[fixed..fixed + 4]);
        check_identifier_size(identifier_byte_size)?;
        let heap_dump_timestamp = BigEndian::read_u64(&bytes[fixed + 4..len]);

        Ok((
            Self {
                version,
                identifier_byte_size: identifier_byte_size as usize,
                heap_dump_timestamp,
            },
            len,
        ))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(self.version.version_string().as_bytes());
        out.push(0);
        out.extend_from_slice(&(self.identifier_byte_size as u32).to_be_bytes());
        out.extend_from_slice(&self.heap_dump_timestamp.to_be_bytes());
        out
    }

    pub fn encoded_len(&self) -> usize {
        self.version.version_string().len() + 1 + 4 + 8
    }
}

fn check_identifier_size(size: u32) -> Result<()> {
    match size {
        4 | 8 => Ok(()),
        other => Err(HprofError::UnsupportedIdentifierSize(other)),
    }
}
