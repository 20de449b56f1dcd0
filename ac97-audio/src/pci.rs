//! The slice of PCI the driver consumes: function identity, the two I/O
//! BARs, the interrupt line and a handful of configuration-space toggles.
//! Enumeration itself belongs to the platform.

use core::fmt;

/// PCI class code for multimedia controllers.
pub const CLASS_MULTIMEDIA: u8 = 0x04;

/// Multimedia subclass for audio controllers.
pub const SUBCLASS_AUDIO_CONTROLLER: u8 = 0x01;

/// Bit 0 of an I/O BAR marks it as I/O space; it is not part of the address.
const IO_BAR_ADDRESS_MASK: u32 = !1;

/// Bus/device/function triple, printed as `bb:dd.f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PciAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{:x}", self.bus, self.device, self.function)
    }
}

/// A discovered PCI function as handed over by the platform's enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciFunction {
    pub address: PciAddress,
    pub class: u8,
    pub subclass: u8,
    /// Native audio mixer BAR.
    pub bar0: u32,
    /// Native audio bus master BAR.
    pub bar1: u32,
    pub interrupt_line: u8,
}

impl PciFunction {
    /// Whether this function is an audio controller this driver should probe.
    pub fn is_audio_controller(&self) -> bool {
        self.class == CLASS_MULTIMEDIA && self.subclass == SUBCLASS_AUDIO_CONTROLLER
    }

    /// I/O base of the mixer window.
    pub fn mixer_base(&self) -> u16 {
        (self.bar0 & IO_BAR_ADDRESS_MASK) as u16
    }

    /// I/O base of the bus master window.
    pub fn bus_base(&self) -> u16 {
        (self.bar1 & IO_BAR_ADDRESS_MASK) as u16
    }
}

/// Configuration-space and interrupt-controller operations performed once
/// during device initialization.
pub trait BusControl {
    /// Clear the interrupt-disable bit so INTx pin interrupts are delivered.
    fn enable_pin_based_interrupts(&mut self);

    /// Allow the function to master the bus (required for DMA).
    fn enable_bus_mastering(&mut self);

    /// Unmask the function's interrupt line at the interrupt controller.
    fn enable_irq(&mut self);
}
