//! AC'97 native audio bus master register offsets and bitfields.
//!
//! Channel register offsets are relative to the channel's base inside the
//! bus master window (BAR1); PCM out lives at [`PCM_OUT_CHANNEL`].

use bitflags::bitflags;

/// Base of the PCM out channel registers.
pub const PCM_OUT_CHANNEL: u16 = 0x10;

/// Global control (32-bit).
pub const GLOBAL_CONTROL: u16 = 0x2C;

// ── Per-channel registers ──────────────────────────────────────────────────

/// Buffer descriptor list base address (32-bit physical).
pub const BUFFER_DESCRIPTOR_LIST_BASE: u16 = 0x00;
/// Current index value: descriptor the DMA engine is processing (8-bit).
pub const CURRENT_INDEX: u16 = 0x04;
/// Last valid index: last descriptor software has filled (8-bit).
pub const LAST_VALID_INDEX: u16 = 0x05;
/// Status (16-bit).
pub const STATUS: u16 = 0x06;
/// Position in current buffer, in samples remaining (16-bit).
pub const POSITION_IN_CURRENT_BUFFER: u16 = 0x08;
/// Prefetched index value (8-bit).
pub const PREFETCHED_INDEX: u16 = 0x0A;
/// Control (8-bit).
pub const CONTROL: u16 = 0x0B;

/// CIV and LVI are five-bit ring indices.
pub const INDEX_MASK: u8 = 0x1F;

bitflags! {
    /// Global control bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GlobalControl: u32 {
        /// GPI interrupt enable.
        const GPI_INTERRUPT_ENABLE = 1 << 0;
        /// AC'97 cold reset (0 holds the link in reset).
        const COLD_RESET = 1 << 1;
        /// AC'97 warm reset.
        const WARM_RESET = 1 << 2;
        const _ = !0;
    }
}

bitflags! {
    /// Channel status bits. LVBCI, BCIS and FIFOE are write-one-to-clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u16 {
        /// DMA controller halted.
        const DMA_HALTED = 1 << 0;
        /// Current equals last valid.
        const CURRENT_EQUALS_LAST_VALID = 1 << 1;
        /// Last valid buffer completion interrupt.
        const LAST_VALID_BUFFER_COMPLETION = 1 << 2;
        /// Buffer completion interrupt status.
        const BUFFER_COMPLETION = 1 << 3;
        /// FIFO underrun/overrun.
        const FIFO_ERROR = 1 << 4;
        const _ = !0;
    }
}

impl Status {
    /// Bits acknowledged by writing them back.
    pub const INTERRUPT_ACK: Status = Status::LAST_VALID_BUFFER_COMPLETION
        .union(Status::BUFFER_COMPLETION)
        .union(Status::FIFO_ERROR);
}

bitflags! {
    /// Channel control bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u8 {
        /// Run/pause bus master.
        const RUN = 1 << 0;
        /// Reset channel registers; self-clears when done.
        const RESET_REGISTERS = 1 << 1;
        /// Last valid buffer interrupt enable.
        const LAST_VALID_BUFFER_INTERRUPT_ENABLE = 1 << 2;
        /// FIFO error interrupt enable.
        const FIFO_ERROR_INTERRUPT_ENABLE = 1 << 3;
        /// Interrupt on completion enable.
        const INTERRUPT_ON_COMPLETION_ENABLE = 1 << 4;
        const _ = !0;
    }
}
