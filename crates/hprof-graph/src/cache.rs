use std::num::NonZeroUsize;
use std::rc::Rc;

use hprof_core::{
    ClassDumpRecord, InstanceDumpRecord, ObjectArrayDumpRecord, ObjectCategory, ObjectId,
    PrimitiveArrayDumpRecord,
};
use lru::LruCache;

/// A fully decoded record. Records are shared, so cache hits never copy element data.
#[derive(Debug, Clone)]
pub enum ObjectRecord {
    Class(Rc<ClassDumpRecord>),
    Instance(Rc<InstanceDumpRecord>),
    ObjectArray(Rc<ObjectArrayDumpRecord>),
    PrimitiveArray(Rc<PrimitiveArrayDumpRecord>),
}

impl ObjectRecord {
    pub fn category(&self) -> ObjectCategory {
        match self {
            ObjectRecord::Class(_) => ObjectCategory::Class,
            ObjectRecord::Instance(_) => ObjectCategory::Instance,
            ObjectRecord::ObjectArray(_) => ObjectCategory::ObjectArray,
            ObjectRecord::PrimitiveArray(_) => ObjectCategory::PrimitiveArray,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Least-recently-used cache of decoded records, keyed by object id.
#[derive(Debug)]
pub(crate) struct RecordCache {
    lru: LruCache<ObjectId, ObjectRecord>,
    hits: u64,
    misses: u64,
}

impl RecordCache {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            lru: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up `id`, marking it as most recently used.
    pub(crate) fn get(&mut self, id: ObjectId) -> Option<ObjectRecord> {
        match self.lru.get(&id) {
            Some(record) => {
                self.hits += 1;
                Some(record.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Looks up `id` without touching recency or the hit and miss counters.
    pub(crate) fn peek(&self, id: ObjectId) -> Option<ObjectRecord> {
        self.lru.peek(&id).cloned()
    }

    pub(crate) fn put(&mut self, id: ObjectId, record: ObjectRecord) {
        if let Some((evicted, _)) = self.lru.push(id, record) {
            if evicted != id {
                tracing::trace!(evicted, "evicted least recently used record");
            }
        }
    }

    pub(crate) fn contains(&self, id: ObjectId) -> bool {
        self.lru.contains(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.lru.clear();
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.lru.len(),
            capacity: self.lru.cap().get(),
        }
    }
}
