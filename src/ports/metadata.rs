//! Metadata port - durable key-value storage for the store indices
//!
//! Backed by NVS (or similar) on hardware. Writes are assumed
//! crash-atomic per key; the store rewrites a key whenever its owning
//! value changes.

/// Persisted metadata keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum MetaKey {
    /// Count of records durably flushed (`u32`)
    WriteIndex = 0x01,
    /// Consumer-acknowledged export cursor (`u32`)
    LastSent = 0x02,
    /// Ring wraparound flag (stored as 0/1)
    Wrapped = 0x03,
}

/// Error type for metadata operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum MetadataError {
    /// Underlying persistence failed
    Io,
}

/// Port for loading and persisting the store's small metadata values
pub trait MetadataPort {
    /// Load a value; `None` if the key was never written
    fn load(&mut self, key: MetaKey) -> Result<Option<u32>, MetadataError>;

    /// Persist a value durably before returning
    fn save(&mut self, key: MetaKey, value: u32) -> Result<(), MetadataError>;
}

impl<T: MetadataPort + ?Sized> MetadataPort for &mut T {
    fn load(&mut self, key: MetaKey) -> Result<Option<u32>, MetadataError> {
        T::load(self, key)
    }

    fn save(&mut self, key: MetaKey, value: u32) -> Result<(), MetadataError> {
        T::save(self, key, value)
    }
}
