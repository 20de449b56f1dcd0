//! AC'97 codec (native audio mixer) driver.
//!
//! Handles the parts of the codec the PCM output path needs: reset,
//! extended-audio capability detection, DAC sample-rate negotiation and
//! master/PCM volume.
//!
//! # Example
//!
//! ```ignore
//! let mut codec = Codec::new(RegisterWindow::new(PortIo, mixer_base), address);
//! codec.initialize()?;            // reset, detect VRA/DRA, 0 dB volumes
//! codec.set_output_sample_rate(22_050)?;
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use super::registers::{self as reg, ExtendedAudioId, ExtendedAudioStatus};
use crate::constants::{
    PCM_DEFAULT_SAMPLE_RATE, PCM_FIXED_SAMPLE_RATE, PCM_SAMPLE_RATE_MAXIMUM,
    PCM_SAMPLE_RATE_MINIMUM,
};
use crate::error::Error;
use crate::hw::{RegisterIo, RegisterWindow};
use crate::pci::PciAddress;

/// Mute flag for the volume registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Muted {
    No,
    Yes,
}

/// What the codec reported (and what was enabled) during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecCapabilities {
    /// The codec accepts DAC rates other than 48 kHz.
    pub variable_rate_supported: bool,
    /// Double rate is enabled: the effective rate is twice the DAC register.
    pub double_rate_enabled: bool,
}

impl CodecCapabilities {
    fn double_rate_shift(self) -> u32 {
        if self.double_rate_enabled {
            1
        } else {
            0
        }
    }
}

/// Pack a master volume register value. Fields are 6 bits wide; wider input
/// is masked.
pub fn master_volume_value(left: u8, right: u8, mute: Muted) -> u16 {
    pack_volume(left, right, mute, 0x3F)
}

/// Pack a PCM output volume register value. Fields are 5 bits wide; wider
/// input is masked.
pub fn pcm_volume_value(left: u8, right: u8, mute: Muted) -> u16 {
    pack_volume(left, right, mute, 0x1F)
}

fn pack_volume(left: u8, right: u8, mute: Muted, field_mask: u16) -> u16 {
    let mute_bit = match mute {
        Muted::Yes => 1 << 15,
        Muted::No => 0,
    };
    (right as u16 & field_mask) | ((left as u16 & field_mask) << 8) | mute_bit
}

/// AC'97 codec driver over the mixer register window.
pub struct Codec<Io> {
    mixer: RegisterWindow<Io>,
    address: PciAddress,
    capabilities: CodecCapabilities,
    /// Effective output rate in Hz; 0 until the first negotiation.
    sample_rate: AtomicU32,
}

impl<Io> Codec<Io>
where
    Io: RegisterIo + Clone,
{
    pub fn new(mixer: RegisterWindow<Io>, address: PciAddress) -> Self {
        Self {
            mixer,
            address,
            capabilities: CodecCapabilities::default(),
            sample_rate: AtomicU32::new(0),
        }
    }

    /// Reset the codec and bring the PCM output path to a known state.
    ///
    /// Fails with [`Error::UnsupportedRevision`] if the codec is not an
    /// AC'97 2.3 part; nothing past the revision check is programmed then.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.mixer.write_u16(reg::RESET, 1);

        let extended_id =
            ExtendedAudioId::from_bits_retain(self.mixer.read_u16(reg::EXTENDED_AUDIO_ID));
        let revision = extended_id.revision();
        if revision != reg::REVISION_23 {
            return Err(Error::UnsupportedRevision { found: revision });
        }

        let mut capabilities = CodecCapabilities::default();
        let mut enabled = ExtendedAudioStatus::empty();
        if extended_id.contains(ExtendedAudioId::VARIABLE_RATE_PCM) {
            enabled.insert(ExtendedAudioStatus::VARIABLE_RATE);
            capabilities.variable_rate_supported = true;
        }
        // DRA requires VRA
        if capabilities.variable_rate_supported
            && extended_id.contains(ExtendedAudioId::DOUBLE_RATE_PCM)
        {
            enabled.insert(ExtendedAudioStatus::DOUBLE_RATE);
            capabilities.double_rate_enabled = true;
        }
        self.mixer.modify_u16(
            reg::EXTENDED_AUDIO_STATUS_CONTROL,
            enabled.bits(),
            (ExtendedAudioStatus::VARIABLE_RATE | ExtendedAudioStatus::DOUBLE_RATE).bits(),
        );
        self.capabilities = capabilities;
        log::debug!(
            "AC97 @ {}: codec capabilities: variable rate {}, double rate {}",
            self.address,
            capabilities.variable_rate_supported,
            capabilities.double_rate_enabled
        );

        let initial_rate = if capabilities.variable_rate_supported {
            PCM_DEFAULT_SAMPLE_RATE
        } else {
            PCM_FIXED_SAMPLE_RATE
        };
        self.set_output_sample_rate(initial_rate)?;

        // Attenuation of 0 means 0 dB
        self.set_master_output_volume(0, 0, Muted::No);
        self.set_pcm_output_volume(0, 0, Muted::No);
        Ok(())
    }

    /// I/O base of the mixer window.
    pub fn mixer_base(&self) -> u16 {
        self.mixer.base()
    }

    pub fn capabilities(&self) -> CodecCapabilities {
        self.capabilities
    }

    /// Effective output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }

    /// Negotiate the PCM output rate with the codec.
    ///
    /// The codec may round the programmed value; the rate it latched (shifted
    /// back up when double rate is on) becomes the effective rate. Requesting
    /// the current effective rate does not touch the hardware.
    pub fn set_output_sample_rate(&self, sample_rate: u32) -> Result<(), Error> {
        if self.sample_rate() == sample_rate {
            return Ok(());
        }

        let shift = self.capabilities.double_rate_shift();
        let shifted = sample_rate >> shift;
        if !self.capabilities.variable_rate_supported && shifted != PCM_FIXED_SAMPLE_RATE {
            return Err(Error::Unsupported);
        }
        if !(PCM_SAMPLE_RATE_MINIMUM..=PCM_SAMPLE_RATE_MAXIMUM).contains(&shifted) {
            return Err(Error::Unsupported);
        }

        // In range, so it fits the 16-bit register
        self.mixer.write_u16(reg::PCM_FRONT_DAC_RATE, shifted as u16);
        let latched = (self.mixer.read_u16(reg::PCM_FRONT_DAC_RATE) as u32) << shift;
        self.sample_rate.store(latched, Ordering::Release);

        log::info!("AC97 @ {}: PCM front DAC rate set to {} Hz", self.address, latched);
        Ok(())
    }

    /// Set master output attenuation (0–63 per channel, 1.5 dB steps).
    pub fn set_master_output_volume(&self, left: u8, right: u8, mute: Muted) {
        self.mixer
            .write_u16(reg::MASTER_VOLUME, master_volume_value(left, right, mute));
    }

    /// Set PCM output gain/attenuation (0–31 per channel).
    pub fn set_pcm_output_volume(&self, left: u8, right: u8, mute: Muted) {
        self.mixer
            .write_u16(reg::PCM_OUT_VOLUME, pcm_volume_value(left, right, mute));
    }
}
