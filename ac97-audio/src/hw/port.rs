//! x86 port-mapped I/O backend.

use x86_64::instructions::port::Port;

use super::RegisterIo;

/// [`RegisterIo`] over the x86 I/O port space (`in`/`out` instructions).
///
/// Only valid for addresses decoded by the AC'97 function's I/O BARs; the
/// driver never touches ports outside the two windows it was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortIo;

impl RegisterIo for PortIo {
    fn read_u8(&self, address: u16) -> u8 {
        // SAFETY: address lies in an I/O BAR owned by this driver instance.
        unsafe { Port::<u8>::new(address).read() }
    }

    fn read_u16(&self, address: u16) -> u16 {
        // SAFETY: see `read_u8`.
        unsafe { Port::<u16>::new(address).read() }
    }

    fn read_u32(&self, address: u16) -> u32 {
        // SAFETY: see `read_u8`.
        unsafe { Port::<u32>::new(address).read() }
    }

    fn write_u8(&self, address: u16, value: u8) {
        // SAFETY: see `read_u8`.
        unsafe { Port::<u8>::new(address).write(value) }
    }

    fn write_u16(&self, address: u16, value: u16) {
        // SAFETY: see `read_u8`.
        unsafe { Port::<u16>::new(address).write(value) }
    }

    fn write_u32(&self, address: u16, value: u32) {
        // SAFETY: see `read_u8`.
        unsafe { Port::<u32>::new(address).write(value) }
    }
}
