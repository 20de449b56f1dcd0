//! Driver tunables.

use core::time::Duration;

use crate::constants::{DEFAULT_OUTPUT_BUFFER_PAGES, DESCRIPTOR_RING_ENTRIES, RESET_POLL_DELAY_US};

/// What the interrupt handler does when the bus master reports a FIFO error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FifoErrorPolicy {
    /// Stop processing the interrupt and report [`Error::FifoError`](crate::Error::FifoError).
    #[default]
    Fatal,
    /// Acknowledge, reset the PCM-out ring and wake blocked writers, which
    /// then restart DMA with fresh ring state.
    ResetAndResume,
}

/// Runtime configuration for an [`Ac97`](crate::Ac97) instance.
///
/// ```ignore
/// let config = Ac97Config::default()
///     .with_output_buffer_pages(2)
///     .with_write_timeout(Some(Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ac97Config {
    /// Number of page-sized scratch buffers. Also the ring occupancy at which
    /// writers start blocking.
    pub output_buffer_pages: usize,
    /// Delay between polls while waiting for a channel reset to complete.
    pub reset_poll_delay_us: u32,
    /// Upper bound on how long a writer waits for ring slack. `None` waits
    /// until an interrupt arrives.
    pub write_timeout: Option<Duration>,
    /// Handling of FIFO underrun/overrun interrupts.
    pub fifo_error_policy: FifoErrorPolicy,
}

impl Ac97Config {
    /// Smallest usable scratch pool (double buffering).
    pub const MIN_OUTPUT_BUFFER_PAGES: usize = 2;

    /// Largest usable scratch pool. Occupancy never exceeds one less than the
    /// ring size, so a larger pool would never block.
    pub const MAX_OUTPUT_BUFFER_PAGES: usize = DESCRIPTOR_RING_ENTRIES - 1;

    pub fn with_output_buffer_pages(mut self, pages: usize) -> Self {
        self.output_buffer_pages = pages;
        self
    }

    pub fn with_reset_poll_delay_us(mut self, delay_us: u32) -> Self {
        self.reset_poll_delay_us = delay_us;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_fifo_error_policy(mut self, policy: FifoErrorPolicy) -> Self {
        self.fifo_error_policy = policy;
        self
    }

    /// Clamp fields into the ranges the driver can honor.
    pub(crate) fn sanitized(mut self) -> Self {
        self.output_buffer_pages = self
            .output_buffer_pages
            .clamp(Self::MIN_OUTPUT_BUFFER_PAGES, Self::MAX_OUTPUT_BUFFER_PAGES);
        self
    }
}

impl Default for Ac97Config {
    fn default() -> Self {
        Self {
            output_buffer_pages: DEFAULT_OUTPUT_BUFFER_PAGES,
            reset_poll_delay_us: RESET_POLL_DELAY_US,
            write_timeout: None,
            fifo_error_policy: FifoErrorPolicy::Fatal,
        }
    }
}
