//! Audio preprocessing modules
//!
//! Utilities for preparing decoded audio for the wavetable pipeline:
//! - Channel mixing (multi-channel to mono)

pub mod channel_mixer;
