//! In-memory metadata record, one slot per key
//!
//! Stands in for the target's NVS partition. Tests can make saves fail to
//! verify the store treats metadata persistence as best-effort.

use crate::ports::metadata::{MetaKey, MetadataError, MetadataPort};

/// RAM-backed key/value store for the three durable indices
pub struct RamMetadata {
    slots: [Option<u32>; 3],
    fail_saves: bool,
}

impl RamMetadata {
    pub fn new() -> Self {
        Self {
            slots: [None; 3],
            fail_saves: false,
        }
    }

    /// Make every subsequent save fail (loads are unaffected)
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    fn slot(key: MetaKey) -> usize {
        match key {
            MetaKey::WriteIndex => 0,
            MetaKey::LastSent => 1,
            MetaKey::Wrapped => 2,
        }
    }
}

impl Default for RamMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataPort for RamMetadata {
    fn load(&mut self, key: MetaKey) -> Result<Option<u32>, MetadataError> {
        Ok(self.slots[Self::slot(key)])
    }

    fn save(&mut self, key: MetaKey, value: u32) -> Result<(), MetadataError> {
        if self.fail_saves {
            return Err(MetadataError::Io);
        }
        self.slots[Self::slot(key)] = Some(value);
        Ok(())
    }
}
