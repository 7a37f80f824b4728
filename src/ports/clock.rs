//! Clock port - monotonic time for the flush interval trigger

/// Port for reading monotonic elapsed time
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        T::now_ms(self)
    }
}
