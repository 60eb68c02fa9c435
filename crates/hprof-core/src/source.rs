use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::error::{HprofError, Result};

/// Backing storage that supports reads at arbitrary byte positions.
pub trait RandomAccessSource {
    fn byte_len(&self) -> u64;

    /// Fills `buf` with the bytes starting at `position`. Partial reads are errors.
    fn read_exact_at(&mut self, position: u64, buf: &mut [u8]) -> Result<()>;

    /// Releases the underlying handle.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn check_bounds(position: u64, length: usize, source_len: u64) -> Result<()> {
    let end = position.checked_add(length as u64);
    match end {
        Some(end) if end <= source_len => Ok(()),
        _ => Err(HprofError::RecordOverrun {
            position,
            length,
            source_len,
        }),
    }
}

/// Seek-and-read access to a dump on disk.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_file(File::open(path)?)
    }

    pub fn from_file(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl RandomAccessSource for FileSource {
    fn byte_len(&self) -> u64 {
        self.len
    }

    fn read_exact_at(&mut self, position: u64, buf: &mut [u8]) -> Result<()> {
        check_bounds(position, buf.len(), self.len)?;
        self.file.seek(SeekFrom::Start(position))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        tracing::debug!(len = self.len, "closing file-backed heap dump source");
        drop(self.file);
        Ok(())
    }
}

/// Memory-mapped dump. The OS pages in only the ranges that are actually read.
#[derive(Debug)]
pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the dump is opened read-only and is not expected to change while mapped.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self { mmap })
    }
}

impl RandomAccessSource for MmapSource {
    fn byte_len(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn read_exact_at(&mut self, position: u64, buf: &mut [u8]) -> Result<()> {
        check_bounds(position, buf.len(), self.byte_len())?;
        let start = position as usize;
        buf.copy_from_slice(&self.mmap[start..start + buf.len()]);
        Ok(())
    }
}

/// Dump held in memory, mostly useful for small dumps and tests.
#[derive(Debug, Clone, Default)]
pub struct BytesSource {
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl RandomAccessSource for BytesSource {
    fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_exact_at(&mut self, position: u64, buf: &mut [u8]) -> Result<()> {
        check_bounds(position, buf.len(), self.byte_len())?;
        let start = position as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }
}
