//! Fixed configuration constants
//!
//! Partition geometry and timing defaults for the logger. `RecordStore`
//! takes a runtime [`StoreConfig`](crate::store::StoreConfig) so tests can
//! shrink the geometry, but the firmware uses these values.

/// Sensor sampling period (seconds). Also reported in the export header.
pub const SENSOR_READ_INTERVAL_SEC: u16 = 10;

/// RAM write-batch capacity before a size-triggered flush.
pub const RAM_BUFFER_SIZE: usize = 200;

/// Minimum interval between time-triggered flushes (seconds).
pub const FLASH_WRITE_INTERVAL_SEC: u32 = 5;

/// Size of the raw data partition in bytes (~500 KB).
pub const DATA_PARTITION_SIZE: u32 = 0x7B000;

/// Erase page size of the data partition (bytes).
pub const FLASH_PAGE_SIZE: u32 = 4096;

/// Program granularity of the flash device (bytes). Record writes are
/// always a multiple of this.
pub const FLASH_WRITE_GRANULARITY: u32 = 2;

/// Delay between notification frames, flow control against link
/// backpressure (milliseconds).
pub const INTER_FRAME_DELAY_MS: u64 = 50;

/// Upper bound on records processed by one transfer step before the
/// session yields back to the scheduler.
pub const MAX_RECORDS_PER_STEP: u32 = 100;

// ============================================================================
// GATT identifiers (the radio stack lives outside this crate; these are
// kept here so firmware and host tooling agree on the attribute layout)
// ============================================================================

/// Primary data service.
pub const DATA_SERVICE_UUID: &str = "12345678-1234-1234-1234-123456789abc";

/// Data-Transfer characteristic (notify-only, carries protocol frames).
pub const DATA_TRANSFER_UUID: &str = "12345678-1234-1234-1234-123456789abd";

/// Control characteristic (write / write-without-response, carries commands).
pub const CONTROL_UUID: &str = "12345678-1234-1234-1234-123456789abe";

/// Status characteristic (read + notify, carries the 4-byte snapshot).
pub const STATUS_UUID: &str = "12345678-1234-1234-1234-123456789abf";
