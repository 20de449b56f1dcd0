/// Size of one DMA page in bytes. Each scratch buffer and each chunk of a
/// `write` is at most one page.
pub const PAGE_SIZE: usize = 4096;

/// Number of entries in the buffer descriptor list (fixed by the bus master).
pub const DESCRIPTOR_RING_ENTRIES: usize = 32;

/// Size of one buffer descriptor list entry in bytes.
pub const DESCRIPTOR_ENTRY_SIZE: usize = 8;

/// Default number of scratch pages used round-robin by the writer.
pub const DEFAULT_OUTPUT_BUFFER_PAGES: usize = 4;

/// Sample rate programmed after reset when the codec supports variable rate.
pub const PCM_DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// The only rate available when the codec lacks variable rate audio.
pub const PCM_FIXED_SAMPLE_RATE: u32 = 48_000;

/// Lowest programmable DAC rate (before the double-rate shift).
pub const PCM_SAMPLE_RATE_MINIMUM: u32 = 8_000;

/// Highest programmable DAC rate. With double rate enabled the effective
/// rate can reach 96 kHz.
pub const PCM_SAMPLE_RATE_MAXIMUM: u32 = 48_000;

/// Delay between polls of the channel reset bit, in microseconds.
pub const RESET_POLL_DELAY_US: u32 = 50;
