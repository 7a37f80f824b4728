//! Flash port - abstraction for the raw data partition
//!
//! The store addresses the partition as a flat byte range starting at
//! offset 0; the implementation maps that onto the actual flash area.

/// Error type for flash operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum FlashError {
    /// Offset or length outside the partition
    OutOfBounds,
    /// Program length not a multiple of the write granularity
    Unaligned,
    /// Program attempted over bytes that were not erased first
    NotErased,
    /// Device-level failure
    Io,
}

/// Port for erase/program/read access to the raw data partition
///
/// Contract:
/// - `erase` is destructive and page-granular; it must precede any program
///   of the affected range and leaves the range in the erased state (0xFF).
/// - `program` length must be a multiple of the device write granularity
///   ([`FLASH_WRITE_GRANULARITY`](crate::config::FLASH_WRITE_GRANULARITY));
///   short writes are padded with the erased-state byte by the caller.
/// - `read` accepts arbitrary offset/length within the partition.
pub trait FlashPort {
    /// Erase `len` bytes starting at `offset`
    fn erase(&mut self, offset: u32, len: u32) -> Result<(), FlashError>;

    /// Program `data` at `offset`
    fn program(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Read into `buf` from `offset`
    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError>;
}

impl<T: FlashPort + ?Sized> FlashPort for &mut T {
    fn erase(&mut self, offset: u32, len: u32) -> Result<(), FlashError> {
        T::erase(self, offset, len)
    }

    fn program(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        T::program(self, offset, data)
    }

    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        T::read(self, offset, buf)
    }
}
