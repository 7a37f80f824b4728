//! Sensor port - abstraction for acquiring readings
//!
//! The reference hardware synthesizes pseudo-random values; a real BME280
//! driver would implement the same trait.

use crate::domain::SensorRecord;

/// Error type for sensor operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum SensorError {
    /// Failed to read from the sensor
    ReadFailed,
    /// Sensor not initialized
    NotInitialized,
}

/// Port for taking one measurement
pub trait SensorPort {
    /// Acquire a single record
    fn sample(
        &mut self,
    ) -> impl core::future::Future<Output = Result<SensorRecord, SensorError>>;
}
