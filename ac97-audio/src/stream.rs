//! Blocking PCM writer.
//!
//! Callers hand [`Ac97::write`] interleaved 16-bit stereo PCM. Data is cut
//! into page-sized chunks; each chunk is copied into the next scratch page
//! and queued as one descriptor. The writer blocks while the ring holds as
//! many in-flight buffers as there are scratch pages, and is woken by the
//! completion interrupt.
//!
//! Only one writer per device is supported. Concurrent writers stay
//! memory-safe but their chunks may interleave.
//!
//! Queueing a chunk runs outside the interrupt exclusion. If the ring halts
//! and the interrupt handler resets it (no writer parked) after the writer
//! has read the descriptor index but before it programs LVI, the engine
//! restarts at slot 0 with LVI at the old index and replays the stale slots
//! below it, while the rewound software index no longer matches LVI.

use core::sync::atomic::{fence, Ordering};

use embedded_hal::delay::DelayNs;

use crate::constants::PAGE_SIZE;
use crate::device::Ac97;
use crate::dma::{DescriptorEntry, DescriptorRing, DmaAllocator, ScratchBufferPool};
use crate::error::Error;
use crate::hw::RegisterIo;
use crate::sync::{IrqGuard, IrqSync, WaitOutcome};

/// Stream buffers, allocated on the first write.
pub(crate) struct StreamState<A: DmaAllocator> {
    allocator: A,
    scratch: Option<ScratchBufferPool<A::Buffer>>,
    ring: Option<DescriptorRing<A::Buffer>>,
}

impl<A: DmaAllocator> StreamState<A> {
    pub(crate) fn new(allocator: A) -> Self {
        Self {
            allocator,
            scratch: None,
            ring: None,
        }
    }

    /// Allocate whatever is still missing. A failed attempt is retried on
    /// the next call.
    fn ensure_allocated(&mut self, pages: usize) -> Result<(), Error> {
        if self.scratch.is_none() {
            self.scratch = Some(ScratchBufferPool::allocate(&mut self.allocator, pages)?);
        }
        if self.ring.is_none() {
            self.ring = Some(DescriptorRing::allocate(&mut self.allocator)?);
        }
        Ok(())
    }

    pub(crate) fn scratch_index(&self) -> Option<usize> {
        self.scratch.as_ref().map(ScratchBufferPool::index)
    }

    pub(crate) fn descriptor(&self, index: usize) -> Option<DescriptorEntry> {
        self.ring.as_ref().map(|ring| ring.entry(index))
    }

    #[cfg(test)]
    pub(crate) fn scratch_page(&self, index: usize) -> Option<&[u8]> {
        self.scratch.as_ref().map(|pool| pool.page(index))
    }
}

impl<Io, A, S, D> Ac97<Io, A, S, D>
where
    Io: RegisterIo + Clone,
    A: DmaAllocator,
    S: IrqSync,
    D: DelayNs + Clone,
{
    /// Queue `data` for playback, blocking while the ring is full.
    ///
    /// Returns `data.len()` once every chunk is queued. The first call
    /// allocates the scratch pages and the descriptor list, even when
    /// `data` is empty.
    pub fn write(&self, data: &[u8]) -> Result<usize, Error> {
        self.state
            .lock()
            .ensure_allocated(self.config.output_buffer_pages)?;

        for chunk in data.chunks(PAGE_SIZE) {
            self.write_single_buffer(chunk)?;
        }
        Ok(data.len())
    }

    fn write_single_buffer(&self, chunk: &[u8]) -> Result<(), Error> {
        self.wait_for_ring_slack()?;

        let mut state = self.state.lock();
        let StreamState {
            scratch: Some(scratch),
            ring: Some(ring),
            ..
        } = &mut *state
        else {
            return Err(Error::AllocationFailure);
        };

        scratch.fill_current(chunk);

        if !self.pcm_out.dma_running() {
            self.reset_pcm_out();
        }

        let index = self.pcm_out.descriptor_index();
        ring.write_entry(
            index,
            DescriptorEntry::for_pcm_bytes(scratch.current_physical(), chunk.len()),
        );
        // Descriptor and sample data must be visible before the engine is
        // told about them.
        fence(Ordering::SeqCst);

        self.pcm_out
            .program_last_valid_index(ring.physical_base(), index as u8);

        if !self.pcm_out.dma_running() {
            self.pcm_out.start_dma();
        }

        scratch.advance();
        self.pcm_out.advance_descriptor_index();
        Ok(())
    }

    /// Block until fewer than `output_buffer_pages` buffers are in flight,
    /// or DMA has stopped.
    fn wait_for_ring_slack(&self) -> Result<(), Error> {
        let mut guard = IrqGuard::enter(&self.sync);
        loop {
            let occupancy = self.pcm_out.occupancy();
            if occupancy.head_distance < self.config.output_buffer_pages {
                return Ok(());
            }

            log::trace!(
                "AC97 @ {}: ring full - CIV: {} LVI: {} in flight: {}",
                self.address,
                occupancy.current_index,
                occupancy.last_valid_index,
                occupancy.head_distance
            );
            if guard.wait(self.config.write_timeout) == WaitOutcome::TimedOut {
                return Err(Error::TimedOut);
            }
            if !self.pcm_out.dma_running() {
                return Ok(());
            }
        }
    }
}
