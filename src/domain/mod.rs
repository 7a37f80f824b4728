//! Domain layer - pure entities
//!
//! No knowledge of storage, transport, or hardware.

pub mod record;

pub use record::SensorRecord;
