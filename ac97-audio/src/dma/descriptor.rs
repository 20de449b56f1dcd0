//! Buffer descriptor list (BDL).
//!
//! The list lives in one DMA page: 32 entries of 8 bytes, little endian.
//!
//! ```text
//! byte  0..4   buffer physical address
//! byte  4..6   sample count (16-bit samples, not frames)
//! byte  6..8   flags (bit 15 IOC, bit 14 BUP)
//! ```

use bitflags::bitflags;

use super::buffer::{allocate_dma32, DmaAllocator, DmaBuffer};
use crate::constants::{DESCRIPTOR_ENTRY_SIZE, DESCRIPTOR_RING_ENTRIES};
use crate::error::Error;

bitflags! {
    /// Flags in the upper half of a descriptor's control word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DescriptorFlags: u16 {
        /// Raise a buffer completion interrupt when this buffer is done.
        const INTERRUPT_ON_COMPLETION = 1 << 15;
        /// Buffer underrun policy: play zeros instead of repeating the last
        /// sample when this is the last valid buffer.
        const BUFFER_UNDERRUN_POLICY = 1 << 14;
    }
}

/// One BDL slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorEntry {
    pub buffer_address: u32,
    pub sample_count: u16,
    pub flags: DescriptorFlags,
}

impl DescriptorEntry {
    /// Descriptor for `len` bytes of 16-bit PCM at `buffer_address`, raising
    /// an interrupt on completion.
    pub fn for_pcm_bytes(buffer_address: u32, len: usize) -> Self {
        Self {
            buffer_address,
            sample_count: (len / core::mem::size_of::<u16>()) as u16,
            flags: DescriptorFlags::INTERRUPT_ON_COMPLETION,
        }
    }

    /// The packed control word: sample count in the low half, flags high.
    pub fn control_and_length(&self) -> u32 {
        self.sample_count as u32 | (self.flags.bits() as u32) << 16
    }

    fn to_bytes(self) -> [u8; DESCRIPTOR_ENTRY_SIZE] {
        let mut bytes = [0u8; DESCRIPTOR_ENTRY_SIZE];
        bytes[..4].copy_from_slice(&self.buffer_address.to_le_bytes());
        bytes[4..].copy_from_slice(&self.control_and_length().to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut address = [0u8; 4];
        let mut control = [0u8; 4];
        address.copy_from_slice(&bytes[..4]);
        control.copy_from_slice(&bytes[4..DESCRIPTOR_ENTRY_SIZE]);
        let control = u32::from_le_bytes(control);
        Self {
            buffer_address: u32::from_le_bytes(address),
            sample_count: control as u16,
            flags: DescriptorFlags::from_bits_truncate((control >> 16) as u16),
        }
    }
}

/// The descriptor list in DMA memory.
pub struct DescriptorRing<B> {
    buffer: B,
}

impl<B: DmaBuffer> DescriptorRing<B> {
    pub fn allocate<A>(allocator: &mut A) -> Result<Self, Error>
    where
        A: DmaAllocator<Buffer = B>,
    {
        let buffer = allocate_dma32(allocator, 1, "AC97 Buffer Descriptor List")?;
        Ok(Self { buffer })
    }

    /// Bus address programmed into the channel's BDL base register.
    pub fn physical_base(&self) -> u32 {
        self.buffer.physical_page(0) as u32
    }

    pub fn write_entry(&mut self, index: usize, entry: DescriptorEntry) {
        let offset = Self::offset(index);
        self.buffer.page_mut(0)[offset..offset + DESCRIPTOR_ENTRY_SIZE]
            .copy_from_slice(&entry.to_bytes());
    }

    pub fn entry(&self, index: usize) -> DescriptorEntry {
        let offset = Self::offset(index);
        DescriptorEntry::from_bytes(&self.buffer.page(0)[offset..offset + DESCRIPTOR_ENTRY_SIZE])
    }

    fn offset(index: usize) -> usize {
        debug_assert!(index < DESCRIPTOR_RING_ENTRIES);
        (index % DESCRIPTOR_RING_ENTRIES) * DESCRIPTOR_ENTRY_SIZE
    }
}
