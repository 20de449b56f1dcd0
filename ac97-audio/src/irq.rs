//! PCM-out interrupt handling.
//!
//! The platform routes the controller's interrupt line to
//! [`InterruptHandler::handle_irq`], inside the same exclusion the writer
//! takes with [`IrqSync::enter_critical`].
//!
//! | Status | Action |
//! |--------|--------|
//! | FIFO error | per [`FifoErrorPolicy`] |
//! | no buffer completion | [`IrqReturn::NotMine`], status untouched |
//! | completion, halted, nobody waiting | acknowledge, reset the ring |
//! | completion otherwise | acknowledge, wake all writers |

use embedded_hal::delay::DelayNs;

use crate::config::FifoErrorPolicy;
use crate::device::Ac97;
use crate::dma::{DmaAllocator, Status};
use crate::error::Error;
use crate::hw::RegisterIo;
use crate::sync::IrqSync;

/// Whether an interrupt belonged to this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    Handled,
    NotMine,
}

/// Entry point for the device's interrupt line.
pub trait InterruptHandler {
    /// Legacy interrupt line the handler must be attached to.
    fn interrupt_line(&self) -> u8;

    /// Service a pending interrupt.
    ///
    /// Must run inside the exclusion writers take with
    /// [`IrqSync::enter_critical`].
    ///
    /// An `Err` means the device is in a state the driver will not recover
    /// from on its own. Its status has not been acknowledged, so a
    /// level-triggered line stays asserted and fires again as soon as it is
    /// unmasked; the caller should mask the line or tear the device down.
    fn handle_irq(&self) -> Result<IrqReturn, Error>;
}

impl<Io, A, S, D> InterruptHandler for Ac97<Io, A, S, D>
where
    Io: RegisterIo + Clone,
    A: DmaAllocator,
    S: IrqSync,
    D: DelayNs + Clone,
{
    fn interrupt_line(&self) -> u8 {
        Ac97::interrupt_line(self)
    }

    fn handle_irq(&self) -> Result<IrqReturn, Error> {
        let status = self.pcm_out.status();
        let halted = status.contains(Status::DMA_HALTED);
        let completion = status.contains(Status::BUFFER_COMPLETION);
        let fifo_error = status.contains(Status::FIFO_ERROR);

        log::trace!(
            "AC97 @ {}: interrupt - halted: {} completion: {} FIFO error: {}",
            self.address,
            halted,
            completion,
            fifo_error
        );

        if fifo_error {
            match self.config.fifo_error_policy {
                FifoErrorPolicy::Fatal => {
                    log::error!(
                        "AC97 @ {}: FIFO error on channel {}",
                        self.address,
                        self.pcm_out.name()
                    );
                    return Err(Error::FifoError);
                }
                FifoErrorPolicy::ResetAndResume => {
                    log::warn!(
                        "AC97 @ {}: FIFO error on channel {}, resetting",
                        self.address,
                        self.pcm_out.name()
                    );
                    self.pcm_out.acknowledge(Status::INTERRUPT_ACK);
                    self.reset_pcm_out();
                    self.sync.wake_all();
                    return Ok(IrqReturn::Handled);
                }
            }
        }

        if !completion {
            return Ok(IrqReturn::NotMine);
        }

        self.pcm_out.acknowledge(Status::INTERRUPT_ACK);

        if halted && !self.sync.has_waiters() {
            self.reset_pcm_out();
        } else {
            self.sync.wake_all();
        }
        Ok(IrqReturn::Handled)
    }
}
