//! Register access.
//!
//! The AC'97 controller exposes two I/O windows: the native audio mixer
//! (codec registers) and the native audio bus master (DMA engine). Both are
//! reached through a [`RegisterIo`] implementation supplied by the platform;
//! [`RegisterWindow`] adds a base address so callers only deal in the
//! register offsets defined by the datasheet.

#[cfg(feature = "x86-port-io")]
mod port;

#[cfg(feature = "x86-port-io")]
pub use port::PortIo;

/// Raw access to an I/O address space.
///
/// Implementations are expected to be cheap to clone (a zero-sized port
/// accessor, or a handle to a simulated register file) because every window
/// holds its own copy.
pub trait RegisterIo {
    fn read_u8(&self, address: u16) -> u8;
    fn read_u16(&self, address: u16) -> u16;
    fn read_u32(&self, address: u16) -> u32;
    fn write_u8(&self, address: u16, value: u8);
    fn write_u16(&self, address: u16, value: u16);
    fn write_u32(&self, address: u16, value: u32);
}

/// A typed view over `[base, base + len)` of an I/O address space.
#[derive(Debug, Clone)]
pub struct RegisterWindow<Io> {
    io: Io,
    base: u16,
}

impl<Io: RegisterIo + Clone> RegisterWindow<Io> {
    pub fn new(io: Io, base: u16) -> Self {
        Self { io, base }
    }

    /// Base address of this window.
    pub fn base(&self) -> u16 {
        self.base
    }

    /// A window starting `offset` bytes into this one.
    pub fn offset(&self, offset: u16) -> Self {
        Self {
            io: self.io.clone(),
            base: self.base.wrapping_add(offset),
        }
    }

    pub fn read_u8(&self, register: u16) -> u8 {
        self.io.read_u8(self.base.wrapping_add(register))
    }

    pub fn read_u16(&self, register: u16) -> u16 {
        self.io.read_u16(self.base.wrapping_add(register))
    }

    pub fn read_u32(&self, register: u16) -> u32 {
        self.io.read_u32(self.base.wrapping_add(register))
    }

    pub fn write_u8(&self, register: u16, value: u8) {
        self.io.write_u8(self.base.wrapping_add(register), value)
    }

    pub fn write_u16(&self, register: u16, value: u16) {
        self.io.write_u16(self.base.wrapping_add(register), value)
    }

    pub fn write_u32(&self, register: u16, value: u32) {
        self.io.write_u32(self.base.wrapping_add(register), value)
    }

    /// Read-modify-write: `new = (current & !mask) | value`.
    pub fn modify_u16(&self, register: u16, value: u16, mask: u16) -> u16 {
        let new_val = (self.read_u16(register) & !mask) | value;
        self.write_u16(register, new_val);
        new_val
    }
}
