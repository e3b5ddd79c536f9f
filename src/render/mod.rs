//! Diagnostic rendering of finished wavetables

pub mod thumbnail;
