//! Driver error type.

use core::fmt;

/// Errors reported by the AC'97 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Requested sample rate is outside the codec's capabilities or range.
    Unsupported,
    /// Unrecognized control request.
    InvalidArgument,
    /// Scratch buffers or descriptor ring memory could not be obtained, or
    /// the memory handed out is not reachable with 32-bit bus addresses.
    AllocationFailure,
    /// Codec does not report AC'97 revision 2.3. Fatal for that device only.
    UnsupportedRevision {
        /// Raw revision field from the extended audio ID register.
        found: u8,
    },
    /// The bus master reported a FIFO underrun/overrun.
    FifoError,
    /// A writer waited longer than the configured deadline for ring slack.
    TimedOut,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unsupported => f.write_str("unsupported sample rate"),
            Error::InvalidArgument => f.write_str("invalid control request"),
            Error::AllocationFailure => f.write_str("DMA buffer allocation failed"),
            Error::UnsupportedRevision { found } => {
                write!(f, "unsupported codec revision field {found:#04b}")
            }
            Error::FifoError => f.write_str("bus master FIFO error"),
            Error::TimedOut => f.write_str("timed out waiting for the DMA ring"),
        }
    }
}
