use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// Kind of a GC root record, one per HPROF root sub-record tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GcRootKind {
    Unknown,
    JniGlobal,
    JniLocal,
    JavaFrame,
    NativeStack,
    StickyClass,
    ThreadBlock,
    MonitorUsed,
    ThreadObject,
    InternedString,
    Finalizing,
    Debugger,
    ReferenceCleanup,
    VmInternal,
    JniMonitor,
    Unreachable,
}

impl GcRootKind {
    pub const ALL: [GcRootKind; 16] = [
        GcRootKind::Unknown,
        GcRootKind::JniGlobal,
        GcRootKind::JniLocal,
        GcRootKind::JavaFrame,
        GcRootKind::NativeStack,
        GcRootKind::StickyClass,
        GcRootKind::ThreadBlock,
        GcRootKind::MonitorUsed,
        GcRootKind::ThreadObject,
        GcRootKind::InternedString,
        GcRootKind::Finalizing,
        GcRootKind::Debugger,
        GcRootKind::ReferenceCleanup,
        GcRootKind::VmInternal,
        GcRootKind::JniMonitor,
        GcRootKind::Unreachable,
    ];

    /// Roots that keep objects alive for leak analysis purposes.
    pub const DEFAULT_INDEXED: [GcRootKind; 9] = [
        GcRootKind::JniGlobal,
        GcRootKind::JavaFrame,
        GcRootKind::JniLocal,
        GcRootKind::MonitorUsed,
        GcRootKind::NativeStack,
        GcRootKind::StickyClass,
        GcRootKind::ThreadBlock,
        GcRootKind::ThreadObject,
        GcRootKind::JniMonitor,
    ];

    pub fn sub_record_tag(self) -> u8 {
        match self {
            GcRootKind::Unknown => 0xFF,
            GcRootKind::JniGlobal => 0x01,
            GcRootKind::JniLocal => 0x02,
            GcRootKind::JavaFrame => 0x03,
            GcRootKind::NativeStack => 0x04,
            GcRootKind::StickyClass => 0x05,
            GcRootKind::ThreadBlock => 0x06,
            GcRootKind::MonitorUsed => 0x07,
            GcRootKind::ThreadObject => 0x08,
            GcRootKind::InternedString => 0x89,
            GcRootKind::Finalizing => 0x8A,
            GcRootKind::Debugger => 0x8B,
            GcRootKind::ReferenceCleanup => 0x8C,
            GcRootKind::VmInternal => 0x8D,
            GcRootKind::JniMonitor => 0x8E,
            GcRootKind::Unreachable => 0x90,
        }
    }

    pub fn from_sub_record_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.sub_record_tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GcRoot {
    pub kind: GcRootKind,
    pub id: ObjectId,
}
