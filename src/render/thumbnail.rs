//! Wireframe thumbnail of a wavetable
//!
//! Each wave is drawn as a polyline in an oblique projection: the in-wave
//! sample index runs left to right, the wave index recedes up and to the
//! right, and amplitude is height. The first and last sample of every wave
//! are joined across the table to outline the surface.
//!
//! Rasterizing is a pure function of an immutable matrix. The canvas is
//! written separately so callers can render before touching the disk.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::error::ConversionError;
use crate::io::paths::partial_path;
use crate::wavetable::WaveMatrix;

/// Most points drawn per wave; longer waves are decimated
const MAX_POINTS_PER_WAVE: usize = 512;

/// Fraction of image width used by the sample axis
const SAMPLE_AXIS_WIDTH: f32 = 0.62;
/// Fraction of image width used by the wave (depth) axis
const DEPTH_AXIS_WIDTH: f32 = 0.26;
/// Fraction of image height used by the wave (depth) axis
const DEPTH_AXIS_HEIGHT: f32 = 0.55;
/// Fraction of image height per unit of amplitude
const AMPLITUDE_HEIGHT: f32 = 0.09;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const INK: [u8; 3] = [0, 0, 0];

/// Thumbnail renderer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailRenderer {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Default for ThumbnailRenderer {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// RGB raster
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&BACKGROUND);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB triple at (x, y), if inside the image
    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Number of pixels not equal to the background colour
    #[cfg(test)]
    fn inked_pixels(&self) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|p| *p != BACKGROUND.as_slice())
            .count()
    }

    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&INK);
    }

    /// Bresenham line, clipped to the image
    fn line(&mut self, (x0, y0): (f32, f32), (x1, y1): (f32, f32)) {
        let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
        let (x1, y1) = (x1.round() as i64, y1.round() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Write the canvas as an 8-bit RGB PNG
    ///
    /// The image is written to a hidden sibling and renamed into place, so
    /// no partial PNG is left at `path` on failure.
    pub fn write_png(&self, path: &Path) -> Result<(), ConversionError> {
        let partial = partial_path(path);
        let result = self
            .encode_png(&partial)
            .and_then(|()| fs::rename(&partial, path).map_err(ConversionError::from));

        if result.is_err() && partial.exists() {
            if let Err(e) = fs::remove_file(&partial) {
                log::warn!("Could not remove {}: {}", partial.display(), e);
            }
        }
        result
    }

    fn encode_png(&self, path: &Path) -> Result<(), ConversionError> {
        let file = File::create(path)?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }
}

impl ThumbnailRenderer {
    /// Rasterize `matrix` into an RGB canvas
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::RenderError` for an empty matrix or a
    /// zero-sized image.
    pub fn rasterize(&self, matrix: &WaveMatrix) -> Result<Canvas, ConversionError> {
        if matrix.is_empty() {
            return Err(ConversionError::RenderError(
                "Cannot render an empty wavetable".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConversionError::RenderError(format!(
                "Invalid thumbnail size {}x{}",
                self.width, self.height
            )));
        }

        let mut canvas = Canvas::new(self.width, self.height);
        let wave_count = matrix.wave_count();
        let wavelength = matrix.wavelength();
        let step = wavelength.div_ceil(MAX_POINTS_PER_WAVE).max(1);

        log::debug!(
            "Rasterizing {} waves x {} samples (step {}) at {}x{}",
            wave_count,
            wavelength,
            step,
            self.width,
            self.height
        );

        let mut columns: Vec<usize> = (0..wavelength).step_by(step).collect();
        if columns.last() != Some(&(wavelength - 1)) {
            columns.push(wavelength - 1);
        }

        // Back to front
        for w in (0..wave_count).rev() {
            let Some(wave) = matrix.wave(w) else { continue };
            let points: Vec<(f32, f32)> = columns
                .iter()
                .map(|&s| self.project(w, wave_count, s, wavelength, wave[s]))
                .collect();
            if let [only] = points.as_slice() {
                canvas.line(*only, *only);
            }
            for pair in points.windows(2) {
                canvas.line(pair[0], pair[1]);
            }
        }

        for &s in &[0, wavelength - 1] {
            for w in 1..wave_count {
                let (Some(prev), Some(cur)) = (matrix.wave(w - 1), matrix.wave(w)) else {
                    continue;
                };
                canvas.line(
                    self.project(w - 1, wave_count, s, wavelength, prev[s]),
                    self.project(w, wave_count, s, wavelength, cur[s]),
                );
            }
        }

        Ok(canvas)
    }

    fn project(
        &self,
        wave: usize,
        wave_count: usize,
        sample: usize,
        wavelength: usize,
        amplitude: f32,
    ) -> (f32, f32) {
        let width = self.width as f32;
        let height = self.height as f32;
        let depth = wave as f32 / (wave_count.max(2) - 1) as f32;
        let along = sample as f32 / (wavelength.max(2) - 1) as f32;
        let amplitude = if amplitude.is_finite() {
            amplitude.clamp(-1.5, 1.5)
        } else {
            0.0
        };

        let left = width * 0.06;
        let bottom = height * 0.82;
        let x = left + along * width * SAMPLE_AXIS_WIDTH + depth * width * DEPTH_AXIS_WIDTH;
        let y = bottom - depth * height * DEPTH_AXIS_HEIGHT - amplitude * height * AMPLITUDE_HEIGHT;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saw_table(waves: usize, wavelength: usize) -> WaveMatrix {
        let rows: Vec<Vec<f32>> = (0..waves)
            .map(|w| {
                (0..wavelength)
                    .map(|s| (2.0 * s as f32 / wavelength as f32 - 1.0) * (w + 1) as f32 / waves as f32)
                    .collect()
            })
            .collect();
        WaveMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_rasterize_draws_something() {
        let canvas = ThumbnailRenderer::default()
            .rasterize(&saw_table(8, 2048))
            .unwrap();
        assert_eq!(canvas.width(), 640);
        assert_eq!(canvas.height(), 480);
        assert!(canvas.inked_pixels() > 1000, "expected a visible wireframe");
        assert_eq!(canvas.pixel(0, 0), Some(BACKGROUND));
        assert_eq!(canvas.pixel(640, 0), None);
    }

    #[test]
    fn test_single_wave_single_sample() {
        let matrix = WaveMatrix::from_samples(vec![0.5], 1).unwrap();
        let canvas = ThumbnailRenderer::default().rasterize(&matrix).unwrap();
        assert!(canvas.inked_pixels() >= 1);
    }

    #[test]
    fn test_out_of_range_amplitudes_are_clipped() {
        let matrix =
            WaveMatrix::from_rows(&[vec![1e9, -1e9, f32::NAN, f32::INFINITY]]).unwrap();
        assert!(ThumbnailRenderer::default().rasterize(&matrix).is_ok());
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let matrix = WaveMatrix::from_samples(Vec::new(), 4).unwrap();
        assert!(matches!(
            ThumbnailRenderer::default().rasterize(&matrix),
            Err(ConversionError::RenderError(_))
        ));
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.png");
        let canvas = ThumbnailRenderer::default()
            .rasterize(&saw_table(4, 256))
            .unwrap();
        canvas.write_png(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert!(!partial_path(&path).exists(), "partial file should be renamed away");
    }

    #[test]
    fn test_write_png_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("thumb.png");
        let canvas = ThumbnailRenderer::default()
            .rasterize(&saw_table(2, 16))
            .unwrap();

        assert!(canvas.write_png(&path).is_err());
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }
}
