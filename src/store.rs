//! Record store: a batched, crash-durable ring buffer over raw flash
//!
//! Appends land in a RAM write-batch and are flushed to the data partition
//! either when the batch is full or when the flush interval elapses.
//! Batching amortizes the erase/program cost of the flash against a small,
//! bounded durability window. When the partition is exhausted the head
//! wraps to offset 0 and the oldest records are overwritten in place.
//!
//! The store is the single writer of `write_index` and `wrapped`; both are
//! persisted through the metadata port after every flush so a crash never
//! loses more than the unflushed tail.

use heapless::Vec;

use crate::config;
use crate::domain::SensorRecord;
use crate::error::Error;
use crate::ports::clock::Clock;
use crate::ports::flash::FlashPort;
use crate::ports::metadata::{MetaKey, MetadataPort};

const RECORD_SIZE: u32 = SensorRecord::WIRE_SIZE as u32;

/// Scratch capacity for one programmed chunk: a full page plus one record
/// straddling into the next page.
const CHUNK_BUF_SIZE: usize = config::FLASH_PAGE_SIZE as usize + SensorRecord::WIRE_SIZE;

/// Runtime geometry and timing of the store
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct StoreConfig {
    /// Data partition size in bytes
    pub partition_size: u32,
    /// Erase page size in bytes (must not exceed
    /// [`FLASH_PAGE_SIZE`](config::FLASH_PAGE_SIZE))
    pub page_size: u32,
    /// Minimum interval between time-triggered flushes
    pub flush_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            partition_size: config::DATA_PARTITION_SIZE,
            page_size: config::FLASH_PAGE_SIZE,
            flush_interval_ms: config::FLASH_WRITE_INTERVAL_SEC as u64 * 1000,
        }
    }
}

/// Ring-buffered record store over a raw flash partition
///
/// `BATCH` is the RAM write-batch capacity. Records are laid out
/// contiguously from offset 0, `index * 6` bytes each; pages are erased
/// lazily as the head enters them, so flushed data earlier in a page is
/// never destroyed by a later flush.
pub struct RecordStore<F, M, C, const BATCH: usize = { config::RAM_BUFFER_SIZE }>
where
    F: FlashPort,
    M: MetadataPort,
    C: Clock,
{
    flash: F,
    meta: M,
    clock: C,
    cfg: StoreConfig,
    batch: Vec<SensorRecord, BATCH>,
    write_index: u32,
    last_sent_index: u32,
    wrapped: bool,
    initialized: bool,
    last_flush_ms: u64,
    chunk_buf: [u8; CHUNK_BUF_SIZE],
}

impl<F, M, C, const BATCH: usize> RecordStore<F, M, C, BATCH>
where
    F: FlashPort,
    M: MetadataPort,
    C: Clock,
{
    /// Create a store over the given ports
    ///
    /// Call [`init`](Self::init) before use.
    pub fn new(flash: F, meta: M, clock: C, cfg: StoreConfig) -> Self {
        debug_assert!(cfg.page_size as usize + SensorRecord::WIRE_SIZE <= CHUNK_BUF_SIZE);
        debug_assert!(cfg.partition_size >= RECORD_SIZE);
        Self {
            flash,
            meta,
            clock,
            cfg,
            batch: Vec::new(),
            write_index: 0,
            last_sent_index: 0,
            wrapped: false,
            initialized: false,
            last_flush_ms: 0,
            chunk_buf: [0u8; CHUNK_BUF_SIZE],
        }
    }

    /// Load persisted metadata and mark the store ready
    ///
    /// Failure here is the single fatal condition of the core; every other
    /// operation keeps returning `NotReady` until a later `init` succeeds.
    pub fn init(&mut self) -> Result<(), Error> {
        self.write_index = self.meta.load(MetaKey::WriteIndex)?.unwrap_or(0);
        self.last_sent_index = self.meta.load(MetaKey::LastSent)?.unwrap_or(0);
        self.wrapped = self.meta.load(MetaKey::Wrapped)?.unwrap_or(0) != 0;
        self.last_flush_ms = self.clock.now_ms();
        self.initialized = true;
        Ok(())
    }

    /// Add a record to the write-batch, flushing when the batch reaches
    /// capacity or the flush interval has elapsed
    ///
    /// A flush failure leaves the record (and the rest of the batch) queued
    /// for the next trigger; the caller never blocks beyond one flush.
    pub fn append(&mut self, record: &SensorRecord) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotReady);
        }
        if self.batch.is_full() {
            // retry path after an earlier failed flush
            self.flush()?;
        }
        self.batch.push(*record).map_err(|_| Error::IoError)?;

        let elapsed = self.clock.now_ms().saturating_sub(self.last_flush_ms);
        if self.batch.is_full() || elapsed >= self.cfg.flush_interval_ms {
            self.flush()?;
        }
        Ok(())
    }

    /// Write the batch to the flash log in page-bounded chunks
    ///
    /// Resumable: each chunk is counted into `write_index` and removed from
    /// the batch only after it was programmed, so a failed chunk leaves the
    /// unwritten remainder queued and a retry reflects each record at most
    /// once. Metadata is persisted after every successful or partial flush.
    ///
    /// Returns the number of records written.
    pub fn flush(&mut self) -> Result<u32, Error> {
        if !self.initialized {
            return Err(Error::NotReady);
        }
        if self.batch.is_empty() {
            return Ok(0);
        }

        let max = self.max_count();
        let mut flushed: usize = 0;
        let mut failed = false;

        while flushed < self.batch.len() {
            if self.write_index >= max {
                // partition exhausted: head back to offset 0, oldest
                // records are overwritten from here on
                self.write_index = 0;
                self.wrapped = true;
            }
            let head = self.write_index * RECORD_SIZE;
            let page_end = (head / self.cfg.page_size + 1) * self.cfg.page_size;
            // records whose first byte lies inside the current page, capped
            // by the slots left before the wrap point: when partition_size
            // is not a record multiple the last page has room for a record
            // start but not for the record itself
            let fit = ((page_end - head + RECORD_SIZE - 1) / RECORD_SIZE) as usize;
            let n = fit
                .min(self.batch.len() - flushed)
                .min((max - self.write_index) as usize);
            let len = n * SensorRecord::WIRE_SIZE;

            for (i, record) in self.batch[flushed..flushed + n].iter().enumerate() {
                let off = i * SensorRecord::WIRE_SIZE;
                self.chunk_buf[off..off + SensorRecord::WIRE_SIZE]
                    .copy_from_slice(&record.to_bytes());
            }

            // erase every page the chunk enters at its start; sequential
            // writes reach each page start exactly once per lap
            let end = head + len as u32;
            let mut result = Ok(());
            let mut page = head.next_multiple_of(self.cfg.page_size);
            while page < end {
                if let Err(e) = self.flash.erase(page, self.cfg.page_size) {
                    result = Err(e);
                    break;
                }
                page += self.cfg.page_size;
            }
            if result.is_ok() {
                result = self.flash.program(head, &self.chunk_buf[..len]);
            }

            match result {
                Ok(()) => {
                    self.write_index += n as u32;
                    flushed += n;
                }
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }

        if flushed > 0 {
            // drop the written prefix so a retry never double-counts
            let remaining = self.batch.len() - flushed;
            for i in 0..remaining {
                self.batch[i] = self.batch[i + flushed];
            }
            self.batch.truncate(remaining);
            self.last_flush_ms = self.clock.now_ms();
        }

        // best effort: a metadata failure only widens the durability window
        let _ = self.persist_indices();

        if failed {
            Err(Error::IoError)
        } else {
            Ok(flushed as u32)
        }
    }

    /// Read a record by index, from the batch or from flash
    pub fn read(&self, index: u32) -> Result<SensorRecord, Error> {
        if !self.initialized {
            return Err(Error::NotReady);
        }
        let batch_len = self.batch.len() as u32;
        if index >= self.write_index && index < self.write_index + batch_len {
            return Ok(self.batch[(index - self.write_index) as usize]);
        }
        if index < self.write_index && index < self.max_count() {
            let mut buf = [0u8; SensorRecord::WIRE_SIZE];
            self.flash.read(index * RECORD_SIZE, &mut buf)?;
            return Ok(SensorRecord::from_bytes(&buf));
        }
        Err(Error::OutOfRange)
    }

    /// Total records visible to a reader, batch included
    ///
    /// Saturates at [`max_count`](Self::max_count) once the ring wrapped.
    pub fn count(&self) -> u32 {
        if !self.initialized {
            return 0;
        }
        if self.wrapped {
            return self.max_count();
        }
        self.write_index + self.batch.len() as u32
    }

    /// Partition capacity in records
    pub fn max_count(&self) -> u32 {
        self.cfg.partition_size / RECORD_SIZE
    }

    /// Consumer-acknowledged export cursor
    pub fn last_sent(&self) -> u32 {
        self.last_sent_index
    }

    /// Update the export cursor; persisted immediately
    pub fn set_last_sent(&mut self, index: u32) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotReady);
        }
        self.last_sent_index = index;
        self.meta.save(MetaKey::LastSent, index)?;
        Ok(())
    }

    /// Whether the ring has wrapped at least once
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Records currently queued in the write-batch
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Access the underlying flash port (for diagnostics)
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Access the underlying metadata port (for diagnostics)
    pub fn meta_mut(&mut self) -> &mut M {
        &mut self.meta
    }

    fn persist_indices(&mut self) -> Result<(), Error> {
        self.meta.save(MetaKey::WriteIndex, self.write_index)?;
        self.meta.save(MetaKey::LastSent, self.last_sent_index)?;
        self.meta.save(MetaKey::Wrapped, self.wrapped as u32)?;
        Ok(())
    }
}
