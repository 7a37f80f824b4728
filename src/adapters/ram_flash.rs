//! In-memory flash emulation
//!
//! Models the constraints of real NOR flash: program only flips bits from
//! erased (0xFF) state, writes honor the device write granularity, and
//! erases work on arbitrary caller-chosen ranges (the store is responsible
//! for passing page-aligned ones). Fault injection hooks let tests exercise
//! the store's partial-flush accounting.

use crate::config::FLASH_WRITE_GRANULARITY;
use crate::ports::flash::{FlashError, FlashPort};

/// RAM-backed flash partition of `SIZE` bytes, all-erased at construction
pub struct RamFlash<const SIZE: usize> {
    bytes: [u8; SIZE],
    programs_until_fault: Option<u32>,
}

impl<const SIZE: usize> RamFlash<SIZE> {
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; SIZE],
            programs_until_fault: None,
        }
    }

    /// Let the next `n` program calls succeed, then fail every one after
    /// until [`clear_fault`](Self::clear_fault)
    pub fn fail_programs_after(&mut self, n: u32) {
        self.programs_until_fault = Some(n);
    }

    /// Remove an injected fault
    pub fn clear_fault(&mut self) {
        self.programs_until_fault = None;
    }

    /// Raw view of the partition contents
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }

    fn check_bounds(&self, offset: u32, len: usize) -> Result<(), FlashError> {
        let end = offset as usize + len;
        if end > SIZE {
            return Err(FlashError::OutOfBounds);
        }
        Ok(())
    }
}

impl<const SIZE: usize> Default for RamFlash<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> FlashPort for RamFlash<SIZE> {
    fn erase(&mut self, offset: u32, len: u32) -> Result<(), FlashError> {
        self.check_bounds(offset, len as usize)?;
        let start = offset as usize;
        self.bytes[start..start + len as usize].fill(0xFF);
        Ok(())
    }

    fn program(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        self.check_bounds(offset, data.len())?;
        if offset % FLASH_WRITE_GRANULARITY != 0
            || data.len() as u32 % FLASH_WRITE_GRANULARITY != 0
        {
            return Err(FlashError::Unaligned);
        }
        if let Some(remaining) = self.programs_until_fault.as_mut() {
            if *remaining == 0 {
                return Err(FlashError::Io);
            }
            *remaining -= 1;
        }
        let start = offset as usize;
        for (dst, src) in self.bytes[start..start + data.len()].iter_mut().zip(data) {
            if *dst != 0xFF {
                return Err(FlashError::NotErased);
            }
            *dst = *src;
        }
        Ok(())
    }

    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        self.check_bounds(offset, buf.len())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }
}
