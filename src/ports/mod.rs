//! Ports - traits defining the boundaries of the core
//!
//! The store and the transfer session talk to the outside world only
//! through these traits, so hardware (flash, NVS, the radio stack, the
//! sensor) can be swapped for RAM-backed test doubles.

pub mod clock;
pub mod flash;
pub mod link;
pub mod metadata;
pub mod sensor;

pub use clock::Clock;
pub use flash::{FlashError, FlashPort};
pub use link::{FramePacer, FrameSink, LinkError};
pub use metadata::{MetaKey, MetadataError, MetadataPort};
pub use sensor::{SensorError, SensorPort};
