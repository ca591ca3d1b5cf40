/// Default size of the working buffer in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Smallest working buffer a decoder will use.
///
/// Must hold the widest fixed-size value (8 bytes) with room to spare.
pub const MIN_BUFFER_CAPACITY: usize = 16;

/// Default number of short reads allowed while refilling for one read.
pub const DEFAULT_READ_RETRIES: usize = 8;

/// Default number of short reads allowed while retrieving one byte array.
pub const DEFAULT_RETRIEVE_TRIES: usize = 64;

/// Configuration for a [`ByteInflow`](crate::ByteInflow).
///
/// ```text
/// ┌─────────────────┬─────────┬──────────────────────────────────────────────┐
/// │ Field           │ Default │ Purpose                                      │
/// ├─────────────────┼─────────┼──────────────────────────────────────────────┤
/// │ buffer_capacity │ 4096    │ Size of the fixed working buffer             │
/// │ read_retries    │ 8       │ Short reads tolerated per buffered read      │
/// │ retrieve_tries  │ 64      │ Short reads tolerated per byte-array read    │
/// └─────────────────┴─────────┴──────────────────────────────────────────────┘
/// ```
///
/// A short read is one that returns fewer bytes than the free space
/// offered, including an interrupted read. Full reads never count against
/// the budget, so a file source is read to completion while a trickling
/// socket fails after a bounded number of attempts instead of spinning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InflowConfig {
    /// Working buffer size. Values below [`MIN_BUFFER_CAPACITY`] are raised
    /// to it.
    pub buffer_capacity: usize,

    /// Short reads tolerated while ensuring bytes for one typed read.
    /// Zero behaves like one.
    pub read_retries: usize,

    /// Short reads tolerated while retrieving one byte array or string.
    pub retrieve_tries: usize,
}

impl Default for InflowConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            read_retries: DEFAULT_READ_RETRIES,
            retrieve_tries: DEFAULT_RETRIEVE_TRIES,
        }
    }
}

impl InflowConfig {
    /// Default configuration with a different buffer size.
    #[must_use]
    pub fn with_buffer_capacity(buffer_capacity: usize) -> Self {
        Self {
            buffer_capacity,
            ..Self::default()
        }
    }

    pub(crate) fn effective_capacity(&self) -> usize {
        self.buffer_capacity.max(MIN_BUFFER_CAPACITY)
    }

    pub(crate) fn effective_read_retries(&self) -> usize {
        self.read_retries.max(1)
    }
}
