//! Bus master DMA: the PCM-out channel, its descriptor list and the scratch
//! pages the descriptors point at.
//!
//! ## Ring layout
//!
//! ```text
//!            CIV (hardware)          LVI (software)
//!              │                       │
//! ┌───┬───┬───┬▼──┬───┬───┬───┬───┬───┬▼──┬───┬─ ─ ─┬───┐
//! │   │   │   │ ▓ │ ▓ │ ▓ │ ▓ │ ▓ │ ▓ │ ▓ │   │     │   │  32 descriptors
//! └───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴─ ─ ─┴───┘
//!               ◄──── owned by the DMA engine ────►
//! ```
//!
//! Each descriptor points at one page of the [`ScratchBufferPool`]. The
//! writer keeps fewer descriptors outstanding than there are scratch pages,
//! so a page is never refilled while the engine may still read it.

pub mod buffer;
pub mod channel;
pub mod descriptor;
pub mod registers;

pub use buffer::{DmaAllocator, DmaBuffer, PhysAddr, ScratchBufferPool};
pub use channel::{DmaChannel, Occupancy};
pub use descriptor::{DescriptorEntry, DescriptorFlags, DescriptorRing};
pub use registers::{Control, GlobalControl, Status};
