//! Random-access object graph over an HPROF heap dump.
//!
//! [`HeapGraph`] combines a [`PositionalIndex`](hprof_core::PositionalIndex) of every
//! object, bounded random reads against the dump, and an LRU cache of decoded
//! records. Objects come back as [`HeapObject`] views whose contents are only
//! decoded on demand, so dumps much larger than memory can be walked.
//!
//! ```no_run
//! # fn demo(header: hprof_core::HprofHeader, index: hprof_core::HprofIndex) -> hprof_graph::Result<()> {
//! use hprof_core::{FileSource, RandomAccessHprofReader};
//! use hprof_graph::{GraphConfig, HeapGraph};
//!
//! let source = FileSource::open(std::path::Path::new("app.hprof"))?;
//! let reader = RandomAccessHprofReader::open(source, &header);
//! let mut graph = HeapGraph::new(header, reader, index, &GraphConfig::default());
//! if let Some(class) = graph.find_class_by_name("java.lang.Thread") {
//!     let threads = class.instances().collect::<hprof_graph::Result<Vec<_>>>()?;
//!     println!("{} threads", threads.len());
//! }
//! graph.close()?;
//! # Ok(())
//! # }
//! ```

mod array;
mod cache;
mod class;
mod config;
mod error;
mod graph;
mod instance;
pub mod names;
mod object;
mod value;

pub use crate::cache::{CacheStats, ObjectRecord};
pub use crate::config::{GraphConfig, HeapDumpConfig, DEFAULT_RECORD_CACHE_CAPACITY};
pub use crate::error::{ConfigError, HeapGraphError, Result};
pub use crate::graph::HeapGraph;
pub use crate::object::{HeapClass, HeapInstance, HeapObject, HeapObjectArray, HeapPrimitiveArray};
pub use crate::value::{HeapField, HeapValue};
