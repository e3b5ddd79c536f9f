//! Audio I/O modules
//!
//! Audio decoding using Symphonia, wavetable encoding using hound, and
//! derivation of sibling output paths.

pub mod decoder;
pub mod encoder;
pub mod paths;
