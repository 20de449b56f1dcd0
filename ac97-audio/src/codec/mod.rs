//! AC'97 codec (native audio mixer) support.
//!
//! Covers only what PCM playback needs: codec reset, the extended audio
//! capability handshake (variable and double rate), DAC rate negotiation and
//! master/PCM output volume.

pub mod registers;
mod ac97;

pub use ac97::{master_volume_value, pcm_volume_value, Codec, CodecCapabilities, Muted};
