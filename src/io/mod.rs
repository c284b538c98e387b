//! Audio I/O
//!
//! Recording decoding using Symphonia.

pub mod decoder;

pub use decoder::decode_audio;
