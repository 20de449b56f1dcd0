//! DMA-visible memory and the writer's scratch page pool.
//!
//! The platform hands out page-granular buffers through [`DmaAllocator`].
//! The driver only ever touches them through [`DmaBuffer`]: a mutable view
//! of one page at a time for the CPU side, and a physical address per page
//! for the bus master side.

use crate::constants::PAGE_SIZE;
use crate::error::Error;

/// A bus address as seen by the DMA engine.
pub type PhysAddr = u64;

/// Page-granular DMA-capable memory.
pub trait DmaBuffer {
    /// Number of [`PAGE_SIZE`] pages in the buffer.
    fn page_count(&self) -> usize;

    /// CPU view of page `index`. Must be exactly [`PAGE_SIZE`] bytes.
    fn page(&self, index: usize) -> &[u8];

    /// Mutable CPU view of page `index`. Must be exactly [`PAGE_SIZE`] bytes.
    fn page_mut(&mut self, index: usize) -> &mut [u8];

    /// Bus address of the first byte of page `index`.
    fn physical_page(&self, index: usize) -> PhysAddr;
}

/// Source of DMA-capable memory.
pub trait DmaAllocator {
    type Buffer: DmaBuffer;

    /// Allocate `pages` pages. `name` identifies the region in platform
    /// diagnostics. Returns `None` when memory is exhausted.
    fn allocate_dma_pages(&mut self, pages: usize, name: &'static str) -> Option<Self::Buffer>;
}

/// Allocate `pages` pages and check that the AC'97 bus master, which only
/// emits 32-bit addresses, can reach every one of them.
pub(crate) fn allocate_dma32<A: DmaAllocator>(
    allocator: &mut A,
    pages: usize,
    name: &'static str,
) -> Result<A::Buffer, Error> {
    let buffer = allocator
        .allocate_dma_pages(pages, name)
        .ok_or(Error::AllocationFailure)?;
    if buffer.page_count() < pages {
        log::warn!("{name}: allocator returned {} of {pages} pages", buffer.page_count());
        return Err(Error::AllocationFailure);
    }
    let reachable = (0..pages).all(|page| {
        let end = buffer.physical_page(page) + PAGE_SIZE as PhysAddr - 1;
        end <= u32::MAX as PhysAddr
    });
    if !reachable {
        log::warn!("{name}: buffer is not addressable with 32-bit DMA");
        return Err(Error::AllocationFailure);
    }
    Ok(buffer)
}

/// Page-sized scratch buffers used round-robin by the writer.
///
/// The writer copies each chunk into [`current_page_mut`](Self::current_page_mut),
/// points a descriptor at [`current_physical`](Self::current_physical) and
/// then calls [`advance`](Self::advance). A page is reused only after the
/// writer has seen ring occupancy drop below the pool size, so the DMA
/// engine is done with it by then.
pub struct ScratchBufferPool<B> {
    buffer: B,
    capacity: usize,
    index: usize,
}

impl<B: DmaBuffer> ScratchBufferPool<B> {
    /// Allocate a pool of `capacity` pages.
    pub fn allocate<A>(allocator: &mut A, capacity: usize) -> Result<Self, Error>
    where
        A: DmaAllocator<Buffer = B>,
    {
        let buffer = allocate_dma32(allocator, capacity, "AC97 Output buffer")?;
        Ok(Self {
            buffer,
            capacity,
            index: 0,
        })
    }

    /// Number of pages in the pool.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the page the next chunk goes into, in `[0, capacity)`.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_page_mut(&mut self) -> &mut [u8] {
        self.buffer.page_mut(self.index)
    }

    /// Bus address of the current page. Checked to fit 32 bits at allocation.
    pub fn current_physical(&self) -> u32 {
        self.buffer.physical_page(self.index) as u32
    }

    /// Copy `chunk` (at most one page) into the current page.
    pub fn fill_current(&mut self, chunk: &[u8]) {
        debug_assert!(chunk.len() <= PAGE_SIZE);
        self.current_page_mut()[..chunk.len()].copy_from_slice(chunk);
    }

    /// Move to the next page, wrapping at the pool capacity.
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.capacity;
    }

    #[cfg(test)]
    pub(crate) fn page(&self, index: usize) -> &[u8] {
        self.buffer.page(index)
    }
}
