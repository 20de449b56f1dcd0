//! # ac97-audio
//!
//! A `no_std` driver for the PCM output path of Intel AC'97 compatible audio
//! controllers (ICH family and the emulated controllers of most hypervisors).
//! It programs the codec over the native audio mixer window and streams
//! 16-bit stereo PCM through the PCM-out bus master channel using a
//! 32-entry buffer descriptor ring.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Hardware | [`hw`] / [`pci`] | Register windows, PCI function identity and toggles |
//! | Codec | [`codec`] | Reset, VRA/DRA negotiation, sample rate, volume |
//! | DMA | [`dma`] | Descriptor ring, PCM-out channel, scratch page pool |
//! | Driver | [`device`] / [`stream`] / [`irq`] | Initialization, blocking writer, interrupt path |
//! | Surface | [`control`] / [`registry`] | Capability traits, device discovery |
//!
//! ## Platform glue
//!
//! The driver owns no global state. The platform supplies:
//!
//! - [`RegisterIo`](hw::RegisterIo) — port I/O (`PortIo` with the
//!   `x86-port-io` feature)
//! - [`DmaAllocator`](dma::DmaAllocator) — page-granular memory below 4 GiB
//! - [`IrqSync`](sync::IrqSync) — interrupt exclusion and a wait queue
//! - [`DelayNs`](embedded_hal::delay::DelayNs) — reset polling delay
//! - [`BusControl`](pci::BusControl) — PCI configuration toggles
//!
//! ## Quick start
//!
//! ```ignore
//! use ac97_audio::{detect, Ac97, Ac97Config, DeviceRegistry, InterruptHandler};
//!
//! let mut registry = DeviceRegistry::new();
//! let ids = detect(pci_functions, &mut registry, |function| {
//!     let config = Ac97Config::default();
//!     let mut device = Ac97::new(PortIo, function, dma, irq_sync.clone(), delay, config);
//!     device.initialize(&mut pci_config)?;
//!     Ok(device)
//! });
//!
//! // The registry handle also services the interrupt line:
//! for id in ids {
//!     let card = registry.get(id).unwrap();
//!     platform.register_irq(card.interrupt_line(), move || card.handle_irq());
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `x86-port-io` | no | `hw::PortIo` over `x86_64` port instructions |
//!
//! ## Audio parameters
//!
//! - **Sample format:** interleaved stereo `i16`, little endian
//! - **Sample rate:** 44.1 kHz by default with VRA, otherwise fixed 48 kHz
//! - **Chunk size:** one 4096-byte page per descriptor ([`constants::PAGE_SIZE`])
//! - **Scratch pages:** 4 by default ([`constants::DEFAULT_OUTPUT_BUFFER_PAGES`])

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod codec;
pub mod config;
pub mod constants;
pub mod control;
pub mod device;
pub mod dma;
pub mod error;
pub mod hw;
pub mod irq;
pub mod pci;
pub mod registry;
pub mod stream;
pub mod sync;


#[cfg(test)]
pub(crate) mod testing;

pub use codec::{CodecCapabilities, Muted};
pub use config::{Ac97Config, FifoErrorPolicy};
pub use control::{AudioControl, AudioDevice, AudioStream};
pub use device::Ac97;
pub use error::Error;
pub use irq::{InterruptHandler, IrqReturn};
pub use registry::{detect, DeviceId, DeviceRegistry};
