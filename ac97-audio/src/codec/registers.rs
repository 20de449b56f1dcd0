//! AC'97 native audio mixer register offsets and bitfield definitions.
//!
//! Offsets are relative to the mixer I/O window (BAR0). All mixer registers
//! are 16 bits wide.

use bitflags::bitflags;

/// Writing any value resets the codec registers to their defaults.
pub const RESET: u16 = 0x00;

/// Master output volume.
/// - Bit  15   — mute
/// - Bits 13:8 — left attenuation (1.5 dB steps, 0 = 0 dB)
/// - Bits  5:0 — right attenuation
pub const MASTER_VOLUME: u16 = 0x02;

/// PCM output volume.
/// - Bit  15   — mute
/// - Bits 12:8 — left gain/attenuation
/// - Bits  4:0 — right gain/attenuation
pub const PCM_OUT_VOLUME: u16 = 0x18;

/// Extended audio ID (read-only capability register).
pub const EXTENDED_AUDIO_ID: u16 = 0x28;

/// Extended audio status and control.
pub const EXTENDED_AUDIO_STATUS_CONTROL: u16 = 0x2A;

/// PCM front DAC sample rate in Hz (before the double-rate shift).
pub const PCM_FRONT_DAC_RATE: u16 = 0x2C;

/// Revision field of [`EXTENDED_AUDIO_ID`] (bits 11:10).
pub const EXTENDED_AUDIO_ID_REVISION_MASK: u16 = 0b11 << 10;
pub const EXTENDED_AUDIO_ID_REVISION_SHIFT: u16 = 10;

/// Revision field value for AC'97 2.3 codecs.
pub const REVISION_23: u8 = 0b10;

bitflags! {
    /// Capability bits of [`EXTENDED_AUDIO_ID`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtendedAudioId: u16 {
        /// Variable rate PCM audio supported.
        const VARIABLE_RATE_PCM = 1 << 0;
        /// Double rate PCM audio supported.
        const DOUBLE_RATE_PCM = 1 << 1;
        const _ = !0;
    }
}

bitflags! {
    /// Enable bits of [`EXTENDED_AUDIO_STATUS_CONTROL`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtendedAudioStatus: u16 {
        /// Variable rate audio enabled.
        const VARIABLE_RATE = 1 << 0;
        /// Double rate audio enabled.
        const DOUBLE_RATE = 1 << 1;
        const _ = !0;
    }
}

impl ExtendedAudioId {
    /// The revision field, right-aligned.
    pub fn revision(self) -> u8 {
        ((self.bits() & EXTENDED_AUDIO_ID_REVISION_MASK) >> EXTENDED_AUDIO_ID_REVISION_SHIFT) as u8
    }
}
