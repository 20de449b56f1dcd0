//! Device discovery and the sound card registry.
//!
//! Registered devices are shared handles: the same [`Arc`] that writers use
//! is the one the platform attaches to the interrupt line.
//!
//! ```ignore
//! let mut registry = DeviceRegistry::new();
//! for id in detect(pci.functions(), &mut registry, |function| {
//!     let config = Ac97Config::default();
//!     let mut device = Ac97::new(PortIo, function, dma, irq.clone(), delay, config);
//!     device.initialize(&mut pci.config(function.address))?;
//!     Ok(device)
//! }) {
//!     let card = registry.get(id).unwrap();
//!     irq.attach(card.interrupt_line(), move || card.handle_irq());
//! }
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::control::AudioDevice;
use crate::error::Error;
use crate::pci::PciFunction;

/// Handle to a device in a [`DeviceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(usize);

impl DeviceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owns every attached sound card. Devices are never detached.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Vec<Arc<dyn AudioDevice>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, device: Arc<dyn AudioDevice>) -> DeviceId {
        self.devices.push(device);
        DeviceId(self.devices.len() - 1)
    }

    pub fn get(&self, id: DeviceId) -> Option<Arc<dyn AudioDevice>> {
        self.devices.get(id.0).cloned()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &Arc<dyn AudioDevice>)> {
        self.devices
            .iter()
            .enumerate()
            .map(|(index, device)| (DeviceId(index), device))
    }
}

/// Probe every multimedia audio controller in `functions`.
///
/// `create` builds and initializes a driver for one function; devices it
/// rejects are logged and skipped. Returns the ids of attached devices.
pub fn detect<I, F, T>(functions: I, registry: &mut DeviceRegistry, mut create: F) -> Vec<DeviceId>
where
    I: IntoIterator<Item = PciFunction>,
    F: FnMut(&PciFunction) -> Result<T, Error>,
    T: AudioDevice + 'static,
{
    let mut attached = Vec::new();
    for function in functions {
        if !function.is_audio_controller() {
            continue;
        }
        log::info!("AC97 @ {}: found audio controller", function.address);

        match create(&function) {
            Ok(device) => attached.push(registry.attach(Arc::new(device))),
            Err(err) => log::warn!("AC97 @ {}: not attached: {}", function.address, err),
        }
    }
    attached
}
