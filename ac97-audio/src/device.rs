//! The AC'97 PCM output device.
//!
//! [`Ac97`] ties together the codec (mixer window), the PCM-out bus master
//! channel (bus window), the lazily allocated stream buffers and the
//! platform's interrupt glue. The write path lives in [`crate::stream`], the
//! interrupt path in [`crate::irq`].
//!
//! ```text
//!   writer ──write()──► scratch page ──► descriptor ring ──► PCM-out DMA
//!     ▲                                                        │
//!     └──────── wake_all() ◄──── handle_irq() ◄── completion ──┘
//! ```
//!
//! ## Lifecycle
//!
//! ```ignore
//! let config = Ac97Config::default();
//! let mut device = Ac97::new(PortIo, &function, allocator, irq_sync, delay, config);
//! device.initialize(&mut pci_config)?;   // global reset, codec setup, IRQ on
//! device.write(&pcm)?;                   // blocks while the ring is full
//! ```

use embedded_hal::delay::DelayNs;
use spin::Mutex;

use crate::codec::{Codec, CodecCapabilities, Muted};
use crate::config::Ac97Config;
use crate::dma::registers::{self as reg, GlobalControl};
use crate::dma::{DescriptorEntry, DmaAllocator, DmaChannel};
use crate::error::Error;
use crate::hw::{RegisterIo, RegisterWindow};
use crate::pci::{BusControl, PciAddress, PciFunction};
use crate::stream::StreamState;
use crate::sync::IrqSync;

/// One AC'97 controller driving its PCM output channel.
pub struct Ac97<Io, A: DmaAllocator, S, D> {
    pub(crate) address: PciAddress,
    interrupt_line: u8,
    bus: RegisterWindow<Io>,
    pub(crate) codec: Codec<Io>,
    pub(crate) pcm_out: DmaChannel<Io>,
    pub(crate) state: Mutex<StreamState<A>>,
    pub(crate) sync: S,
    delay: D,
    pub(crate) config: Ac97Config,
}

impl<Io, A, S, D> Ac97<Io, A, S, D>
where
    Io: RegisterIo + Clone,
    A: DmaAllocator,
    S: IrqSync,
    D: DelayNs + Clone,
{
    /// Build a driver for `function`. No hardware is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(
        io: Io,
        function: &PciFunction,
        allocator: A,
        sync: S,
        delay: D,
        config: Ac97Config,
    ) -> Self {
        let address = function.address;
        let mixer = RegisterWindow::new(io.clone(), function.mixer_base());
        let bus = RegisterWindow::new(io, function.bus_base());
        let pcm_out = DmaChannel::new("PCMOut", bus.offset(reg::PCM_OUT_CHANNEL), address);
        Self {
            address,
            interrupt_line: function.interrupt_line,
            codec: Codec::new(mixer, address),
            pcm_out,
            bus,
            state: Mutex::new(StreamState::new(allocator)),
            sync,
            delay,
            config: config.sanitized(),
        }
    }

    /// Bring the controller up: PCI toggles, global reset, codec setup,
    /// PCM-out channel reset and finally the interrupt line.
    ///
    /// A codec that is not AC'97 2.3 fails with
    /// [`Error::UnsupportedRevision`] and leaves the interrupt line masked.
    pub fn initialize<B: BusControl>(&mut self, bus: &mut B) -> Result<(), Error> {
        log::debug!(
            "AC97 @ {}: mixer base {:#06x}, bus base {:#06x}, IRQ {}",
            self.address,
            self.codec.mixer_base(),
            self.bus.base(),
            self.interrupt_line
        );

        bus.enable_pin_based_interrupts();
        bus.enable_bus_mastering();

        let mut control = GlobalControl::from_bits_retain(self.bus.read_u32(reg::GLOBAL_CONTROL));
        control |= GlobalControl::GPI_INTERRUPT_ENABLE | GlobalControl::COLD_RESET;
        self.bus.write_u32(reg::GLOBAL_CONTROL, control.bits());

        self.codec.initialize()?;

        self.reset_pcm_out();
        bus.enable_irq();
        Ok(())
    }

    pub fn address(&self) -> PciAddress {
        self.address
    }

    pub fn interrupt_line(&self) -> u8 {
        self.interrupt_line
    }

    pub fn config(&self) -> &Ac97Config {
        &self.config
    }

    /// Interrupt glue shared with the platform's interrupt dispatch.
    pub fn sync(&self) -> &S {
        &self.sync
    }

    pub fn capabilities(&self) -> CodecCapabilities {
        self.codec.capabilities()
    }

    /// Effective output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.codec.sample_rate()
    }

    pub fn set_output_sample_rate(&self, sample_rate: u32) -> Result<(), Error> {
        self.codec.set_output_sample_rate(sample_rate)
    }

    pub fn set_master_output_volume(&self, left: u8, right: u8, mute: Muted) {
        self.codec.set_master_output_volume(left, right, mute)
    }

    pub fn set_pcm_output_volume(&self, left: u8, right: u8, mute: Muted) {
        self.codec.set_pcm_output_volume(left, right, mute)
    }

    pub fn dma_running(&self) -> bool {
        self.pcm_out.dma_running()
    }

    /// Descriptor slot the next chunk is written to.
    pub fn descriptor_index(&self) -> usize {
        self.pcm_out.descriptor_index()
    }

    /// Scratch page the next chunk is copied into, once buffers exist.
    pub fn scratch_index(&self) -> Option<usize> {
        self.state.lock().scratch_index()
    }

    /// Contents of descriptor slot `index`, once the ring exists.
    pub fn descriptor(&self, index: usize) -> Option<DescriptorEntry> {
        self.state.lock().descriptor(index)
    }

    /// Stop the PCM-out channel and rewind the ring.
    pub(crate) fn reset_pcm_out(&self) {
        // Each reset gets its own delay handle: this runs from both the
        // writer and the interrupt handler.
        let mut delay = self.delay.clone();
        self.pcm_out.reset(&mut delay, self.config.reset_poll_delay_us);
    }
}
