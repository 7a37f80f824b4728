//! Synthetic sensor
//!
//! Deterministic xorshift-style generator producing plausible indoor
//! readings. Used whenever no BME280 is wired up, and in tests that need a
//! reproducible stream of records.

use crate::domain::SensorRecord;
use crate::ports::sensor::{SensorError, SensorPort};

pub struct SyntheticSensor {
    counter: u32,
}

impl SyntheticSensor {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    fn next_record(&mut self) -> SensorRecord {
        self.counter = self.counter.wrapping_add(1);
        let c = self.counter;
        let mut seed = c ^ (c << 13) ^ (c >> 17);

        let temp_x10 = 200 + (seed % 100) as i16;
        seed ^= seed << 15;
        let pressure_kpa = 980 + (seed % 40) as u16;
        seed ^= seed << 7;
        let humidity_pct = 30 + (seed % 50) as u8;
        seed ^= seed << 11;
        let battery_x10 = 30 + (seed % 12) as u8;

        SensorRecord::new(temp_x10, pressure_kpa, humidity_pct, battery_x10)
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for SyntheticSensor {
    async fn sample(&mut self) -> Result<SensorRecord, SensorError> {
        Ok(self.next_record())
    }
}
