//! Audio decoding using Symphonia
//!
//! Reads any container/codec supported by Symphonia's default registry and
//! returns planar `f32` channels in the [-1.0, 1.0] range.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use crate::error::ConversionError;
use crate::preprocessing::channel_mixer::mix_to_mono;
use crate::wavetable::peak_abs;

/// Decoded audio, one sample vector per channel
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Planar channel data
    pub channels: Vec<Vec<f32>>,
    /// Source sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Largest absolute sample across all channels, before summing
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .map(|channel| peak_abs(channel))
            .fold(0.0f32, f32::max)
    }

    /// Sum all channels into one mono buffer
    pub fn into_mono(self) -> Vec<f32> {
        mix_to_mono(self.channels)
    }
}

/// Decode audio file to planar PCM samples
///
/// # Arguments
///
/// * `path` - Path to audio file
///
/// # Returns
///
/// `DecodedAudio` with one `f32` vector per channel and the source sample rate
///
/// # Errors
///
/// * `ConversionError::InputNotFound` if `path` is not an existing file
/// * `ConversionError::DecodingError` if the format is unsupported or holds no
///   audio track
pub fn decode_audio(path: &Path) -> Result<DecodedAudio, ConversionError> {
    if !path.is_file() {
        return Err(ConversionError::InputNotFound(path.to_path_buf()));
    }

    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ConversionError::DecodingError("No supported audio tracks found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                if channels.is_empty() {
                    channels = vec![Vec::new(); spec.channels.count()];
                }
                append_decoded(&decoded, &mut channels);
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                // Corrupted packets are skipped, the rest of the stream is kept
                log::warn!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| {
        ConversionError::DecodingError("Stream does not declare a sample rate".to_string())
    })?;

    log::debug!(
        "Decoded {} channels x {} frames at {} Hz",
        channels.len(),
        channels.first().map(Vec::len).unwrap_or(0),
        sample_rate
    );

    Ok(DecodedAudio {
        channels,
        sample_rate,
    })
}

fn append_decoded(decoded: &AudioBufferRef<'_>, out: &mut [Vec<f32>]) {
    match decoded {
        AudioBufferRef::U8(buf) => append_planar(&**buf, out),
        AudioBufferRef::U16(buf) => append_planar(&**buf, out),
        AudioBufferRef::U24(buf) => append_planar(&**buf, out),
        AudioBufferRef::U32(buf) => append_planar(&**buf, out),
        AudioBufferRef::S8(buf) => append_planar(&**buf, out),
        AudioBufferRef::S16(buf) => append_planar(&**buf, out),
        AudioBufferRef::S24(buf) => append_planar(&**buf, out),
        AudioBufferRef::S32(buf) => append_planar(&**buf, out),
        AudioBufferRef::F32(buf) => append_planar(&**buf, out),
        AudioBufferRef::F64(buf) => append_planar(&**buf, out),
    }
}

fn append_planar<S>(buf: &AudioBuffer<S>, out: &mut [Vec<f32>])
where
    S: Sample + IntoSample<f32>,
{
    for (ch, channel) in out.iter_mut().enumerate().take(buf.spec().channels.count()) {
        channel.extend(buf.chan(ch).iter().map(|&s| s.into_sample()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_missing_file() {
        let result = decode_audio(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(ConversionError::InputNotFound(_))));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            decode_audio(dir.path()),
            Err(ConversionError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_decode_stereo_int16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Frames: (16384, -16384), (8192, 8192)
        write_wav(&path, 2, &[16384, -16384, 8192, 8192]);

        let decoded = decode_audio(&path).unwrap();
        assert_eq!(decoded.sample_rate, 48000);
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.channels[0].len(), 2);
        assert!((decoded.channels[0][0] - 0.5).abs() < 1e-4);
        assert!((decoded.channels[1][0] + 0.5).abs() < 1e-4);
        assert!((decoded.peak() - 0.5).abs() < 1e-4, "peak is taken per channel");

        let mono = decoded.into_mono();
        assert_eq!(mono.len(), 2);
        assert!(mono[0].abs() < 1e-4);
        assert!((mono[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_garbage_file_is_decoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"this is not audio").unwrap();
        assert!(matches!(
            decode_audio(&path),
            Err(ConversionError::DecodingError(_)) | Err(ConversionError::Io(_))
        ));
    }
}
