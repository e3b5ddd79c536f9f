//! Channel mixing utilities (multi-channel to mono conversion)
//!
//! Channels are summed, not averaged: a full-scale stereo input can exceed
//! unit amplitude here. Normalization later in the pipeline brings the table
//! back into range.

/// Mix planar channels down to mono by summation
///
/// # Arguments
///
/// * `channels` - One sample vector per channel
///
/// # Returns
///
/// Mono samples. A single channel is returned unchanged; no channels yield an
/// empty buffer. Channels of unequal length are mixed over the shortest one.
///
/// # Example
///
/// ```
/// use stratum_wavetable::preprocessing::channel_mixer::mix_to_mono;
///
/// let mono = mix_to_mono(vec![vec![0.5, 1.0], vec![0.25, 1.0]]);
/// assert_eq!(mono, vec![0.75, 2.0]);
/// ```
pub fn mix_to_mono(mut channels: Vec<Vec<f32>>) -> Vec<f32> {
    match channels.len() {
        0 => Vec::new(),
        1 => channels.pop().unwrap_or_default(),
        n => {
            let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
            if channels.iter().any(|c| c.len() != frames) {
                log::warn!(
                    "Channels differ in length, mixing first {} frames only",
                    frames
                );
            }
            log::debug!("Summing {} channels of {} frames to mono", n, frames);

            let mut mono = channels.swap_remove(0);
            mono.truncate(frames);
            for channel in &channels {
                for (m, &s) in mono.iter_mut().zip(channel) {
                    *m += s;
                }
            }
            mono
        }
    }
}
