//! Device-facing capability traits.
//!
//! A sound card is exposed to the rest of the system through small traits
//! rather than one device base type: [`AudioStream`] for the data path,
//! [`AudioControl`] for rate control, and [`InterruptHandler`] for the
//! interrupt line. [`AudioDevice`] is the object-safe combination the
//! registry holds, so the same handle serves writers and the platform's
//! interrupt dispatch.

use embedded_hal::delay::DelayNs;

use crate::device::Ac97;
use crate::dma::DmaAllocator;
use crate::error::Error;
use crate::hw::RegisterIo;
use crate::irq::InterruptHandler;
use crate::sync::IrqSync;

/// Control request: return the effective output sample rate.
pub const SOUNDCARD_GET_SAMPLE_RATE: u32 = 0x5301;

/// Control request: negotiate a new output sample rate (`arg` in Hz).
pub const SOUNDCARD_SET_SAMPLE_RATE: u32 = 0x5302;

/// PCM data path.
pub trait AudioStream {
    /// Queue interleaved 16-bit stereo PCM for playback. Blocks while the
    /// device is backed up.
    fn write(&self, data: &[u8]) -> Result<usize, Error>;

    /// Capture path. Output-only devices report end of stream.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Error>;
}

/// Runtime control of a sound card.
pub trait AudioControl {
    /// Effective output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    fn set_sample_rate(&self, sample_rate: u32) -> Result<(), Error>;

    /// Raw request interface keyed by `SOUNDCARD_*` codes.
    ///
    /// `GET` returns the rate and ignores `arg`; `SET` takes the rate in
    /// `arg` and returns 0. Unknown codes fail with
    /// [`Error::InvalidArgument`].
    fn control(&self, code: u32, arg: u32) -> Result<u32, Error> {
        match code {
            SOUNDCARD_GET_SAMPLE_RATE => Ok(self.sample_rate()),
            SOUNDCARD_SET_SAMPLE_RATE => self.set_sample_rate(arg).map(|()| 0),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// A registered sound card.
pub trait AudioDevice: AudioStream + AudioControl + InterruptHandler + Send + Sync {}

impl<T: AudioStream + AudioControl + InterruptHandler + Send + Sync> AudioDevice for T {}

impl<Io, A, S, D> AudioStream for Ac97<Io, A, S, D>
where
    Io: RegisterIo + Clone,
    A: DmaAllocator,
    S: IrqSync,
    D: DelayNs + Clone,
{
    fn write(&self, data: &[u8]) -> Result<usize, Error> {
        Ac97::write(self, data)
    }

    fn read(&self, _buf: &mut [u8]) -> Result<usize, Error> {
        Ok(0)
    }
}

impl<Io, A, S, D> AudioControl for Ac97<Io, A, S, D>
where
    Io: RegisterIo + Clone,
    A: DmaAllocator,
    S: IrqSync,
    D: DelayNs + Clone,
{
    fn sample_rate(&self) -> u32 {
        Ac97::sample_rate(self)
    }

    fn set_sample_rate(&self, sample_rate: u32) -> Result<(), Error> {
        self.set_output_sample_rate(sample_rate)
    }
}
