//! Bus master channel control.
//!
//! A channel couples the hardware read pointer (current index, CIV) with
//! the software write pointer (last valid index, LVI) over the 32-entry
//! descriptor list. Software may fill slots up to the one before CIV; the
//! engine plays through LVI and halts there.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use embedded_hal::delay::DelayNs;

use super::registers::{self as reg, Control, Status};
use crate::constants::DESCRIPTOR_RING_ENTRIES;
use crate::hw::{RegisterIo, RegisterWindow};
use crate::pci::PciAddress;

/// Snapshot of ring occupancy taken from the channel registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    /// Slots still owned by hardware or in flight, in `[0, 32)`.
    pub head_distance: usize,
    pub current_index: u8,
    pub last_valid_index: u8,
    pub halted: bool,
}

impl Occupancy {
    /// Compute occupancy from raw register values.
    ///
    /// A running engine has not yet vacated the slot under its read pointer,
    /// which counts as one more occupied slot.
    pub fn from_registers(current_index: u8, last_valid_index: u8, halted: bool) -> Self {
        let current_index = current_index & reg::INDEX_MASK;
        let last_valid_index = last_valid_index & reg::INDEX_MASK;
        let ring = DESCRIPTOR_RING_ENTRIES;
        let mut head_distance =
            (last_valid_index as usize + ring - current_index as usize) % ring;
        if !halted {
            head_distance = (head_distance + 1).min(ring - 1);
        }
        Self {
            head_distance,
            current_index,
            last_valid_index,
            halted,
        }
    }
}

/// One bus master channel (only PCM out is used).
pub struct DmaChannel<Io> {
    name: &'static str,
    registers: RegisterWindow<Io>,
    address: PciAddress,
    dma_running: AtomicBool,
    /// Next descriptor slot software will fill.
    descriptor_index: AtomicUsize,
}

impl<Io> DmaChannel<Io>
where
    Io: RegisterIo + Clone,
{
    /// `registers` must already be offset to the channel base.
    pub fn new(name: &'static str, registers: RegisterWindow<Io>, address: PciAddress) -> Self {
        Self {
            name,
            registers,
            address,
            dma_running: AtomicBool::new(false),
            descriptor_index: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dma_running(&self) -> bool {
        self.dma_running.load(Ordering::Acquire)
    }

    /// Descriptor slot the next buffer goes into, in `[0, 32)`.
    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index.load(Ordering::Acquire)
    }

    /// Move the software descriptor index one slot forward, wrapping at 32.
    pub fn advance_descriptor_index(&self) {
        let next = (self.descriptor_index() + 1) % DESCRIPTOR_RING_ENTRIES;
        self.descriptor_index.store(next, Ordering::Release);
    }

    pub fn status(&self) -> Status {
        Status::from_bits_retain(self.registers.read_u16(reg::STATUS))
    }

    /// Write-one-to-clear the given status bits.
    pub fn acknowledge(&self, bits: Status) {
        self.registers.write_u16(reg::STATUS, bits.bits());
    }

    /// Reset the channel registers and wait for the hardware to finish.
    ///
    /// Leaves the channel stopped with its descriptor index back at 0.
    pub fn reset<D: DelayNs>(&self, delay: &mut D, poll_delay_us: u32) {
        log::debug!("AC97 @ {}: channel {}: resetting", self.address, self.name);

        self.registers
            .write_u8(reg::CONTROL, Control::RESET_REGISTERS.bits());
        while Control::from_bits_retain(self.registers.read_u8(reg::CONTROL))
            .contains(Control::RESET_REGISTERS)
        {
            delay.delay_us(poll_delay_us);
        }

        self.dma_running.store(false, Ordering::Release);
        self.descriptor_index.store(0, Ordering::Release);
    }

    /// Start the engine with FIFO-error and completion interrupts enabled.
    pub fn start_dma(&self) {
        log::debug!("AC97 @ {}: channel {}: starting DMA engine", self.address, self.name);

        let mut control = Control::from_bits_retain(self.registers.read_u8(reg::CONTROL));
        control |= Control::RUN
            | Control::FIFO_ERROR_INTERRUPT_ENABLE
            | Control::INTERRUPT_ON_COMPLETION_ENABLE;
        self.registers.write_u8(reg::CONTROL, control.bits());

        self.dma_running.store(true, Ordering::Release);
    }

    /// Tell the engine it may read descriptors up to and including
    /// `last_valid_index` of the list at `list_address`.
    pub fn program_last_valid_index(&self, list_address: u32, last_valid_index: u8) {
        log::trace!(
            "AC97 @ {}: setting LVI - address: {:#x} LVI: {}",
            self.address,
            list_address,
            last_valid_index
        );

        self.registers
            .write_u32(reg::BUFFER_DESCRIPTOR_LIST_BASE, list_address);
        self.registers
            .write_u8(reg::LAST_VALID_INDEX, last_valid_index & reg::INDEX_MASK);
    }

    /// Read the current ring occupancy from the hardware.
    pub fn occupancy(&self) -> Occupancy {
        let halted = self.status().contains(Status::DMA_HALTED);
        let current_index = self.registers.read_u8(reg::CURRENT_INDEX);
        let last_valid_index = self.registers.read_u8(reg::LAST_VALID_INDEX);
        Occupancy::from_registers(current_index, last_valid_index, halted)
    }
}
