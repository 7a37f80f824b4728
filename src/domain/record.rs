//! Sensor record domain entity
//!
//! A single measurement in the compact fixed layout that goes to flash and
//! onto the wire unchanged. Multi-byte fields are big-endian.

/// A sensor measurement, fixed 6 bytes on wire and in flash.
///
/// Immutable once written. Field units are chosen so every value fits a
/// small integer: temperature in 0.1 degC steps, battery in 0.1 V steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct SensorRecord {
    /// Temperature in 0.1 degC units (-3276.8..+3276.7 degC)
    pub temp_x10: i16,
    /// Pressure in kPa (0..65535 kPa)
    pub pressure_kpa: u16,
    /// Relative humidity in % (saturates at 100)
    pub humidity_pct: u8,
    /// Battery voltage in 0.1 V units (0..25.5 V)
    pub battery_x10: u8,
}

impl SensorRecord {
    /// Serialized size in bytes.
    pub const WIRE_SIZE: usize = 6;

    /// Create a new record from raw field values
    pub const fn new(temp_x10: i16, pressure_kpa: u16, humidity_pct: u8, battery_x10: u8) -> Self {
        Self {
            temp_x10,
            pressure_kpa,
            humidity_pct,
            battery_x10,
        }
    }

    /// Temperature in degrees Celsius
    #[inline]
    pub fn temp_celsius(&self) -> f32 {
        self.temp_x10 as f32 / 10.0
    }

    /// Battery voltage in volts
    #[inline]
    pub fn battery_volts(&self) -> f32 {
        self.battery_x10 as f32 / 10.0
    }

    /// Serialize to the fixed 6-byte wire layout
    pub fn to_bytes(&self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[0..2].copy_from_slice(&self.temp_x10.to_be_bytes());
        buf[2..4].copy_from_slice(&self.pressure_kpa.to_be_bytes());
        buf[4] = self.humidity_pct;
        buf[5] = self.battery_x10;
        buf
    }

    /// Deserialize from the fixed 6-byte wire layout
    pub fn from_bytes(buf: &[u8; Self::WIRE_SIZE]) -> Self {
        Self {
            temp_x10: i16::from_be_bytes([buf[0], buf[1]]),
            pressure_kpa: u16::from_be_bytes([buf[2], buf[3]]),
            humidity_pct: buf[4],
            battery_x10: buf[5],
        }
    }
}
