//! Adapters - concrete implementations of the ports
//!
//! `ram_flash` and `ram_metadata` back the store with plain memory and are
//! the workhorses of the test suite; on target they are replaced by the
//! board's flash and NVS drivers behind the same traits.

pub mod clock;
pub mod pacing;
pub mod ram_flash;
pub mod ram_metadata;
pub mod synthetic;

pub use clock::{EmbassyClock, ManualClock};
pub use pacing::{EmbassyPacer, NoopPacer};
pub use ram_flash::RamFlash;
pub use ram_metadata::RamMetadata;
pub use synthetic::SyntheticSensor;
