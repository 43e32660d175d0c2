//! # Height Field Module
//!
//! A per-chunk grid of normalized heights sampled from Perlin noise.
//!
//! ## Sampling
//!
//! `sample(x, y) = perlin((x / size) * scale + offset.x, (y / size) * scale + offset.y)`,
//! remapped from [-1, 1] to [0, 1]. Neighbouring chunks use offsets one `scale`
//! apart, so their fields join without seams.
//!
//! ## Storage
//!
//! Samples are quantized to 16 bits at generation time. The persisted form is a
//! 16-bit grayscale PNG of exactly those levels, so a field decoded from a save
//! is bit-identical to the one that was generated.

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use noise::{NoiseFn, Perlin};

use crate::core::error::{TerrainError, TerrainResult};

/// Scale between a stored level and a normalized sample.
const LEVEL_MAX: f32 = u16::MAX as f32;

/// Normalized height samples for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    size: i32,
    noise_scale: f32,
    noise_offset: [f32; 2],
    /// Row-major by `y`, `size * size` quantized samples.
    levels: Vec<u16>,
}

impl HeightField {
    /// Samples Perlin noise for a chunk whose noise origin is `noise_offset`.
    pub fn generate(size: i32, noise_scale: f32, noise_offset: [f32; 2], seed: u32) -> Self {
        let perlin = Perlin::new(seed);
        let mut levels = Vec::with_capacity((size * size) as usize);

        for y in 0..size {
            for x in 0..size {
                let x_coord = (x as f32 / size as f32) * noise_scale + noise_offset[0];
                let y_coord = (y as f32 / size as f32) * noise_scale + noise_offset[1];
                let noise = perlin.get([x_coord as f64, y_coord as f64]);
                let normalized = ((noise + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
                levels.push(Self::quantize(normalized));
            }
        }

        HeightField {
            size,
            noise_scale,
            noise_offset,
            levels,
        }
    }

    /// Builds a field from explicit samples, row-major by `y`.
    #[cfg(test)]
    pub(crate) fn from_samples(size: i32, noise_scale: f32, noise_offset: [f32; 2], samples: &[f32]) -> Self {
        assert_eq!(samples.len(), (size * size) as usize, "sample count must be size²");
        HeightField {
            size,
            noise_scale,
            noise_offset,
            levels: samples.iter().map(|sample| Self::quantize(*sample)).collect(),
        }
    }

    /// A field with the same sample everywhere.
    #[cfg(test)]
    pub(crate) fn flat(size: i32, noise_scale: f32, noise_offset: [f32; 2], sample: f32) -> Self {
        Self::from_samples(size, noise_scale, noise_offset, &vec![sample; (size * size) as usize])
    }

    fn quantize(sample: f32) -> u16 {
        (sample.clamp(0.0, 1.0) * LEVEL_MAX).round() as u16
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    pub fn noise_offset(&self) -> [f32; 2] {
        self.noise_offset
    }

    /// Normalized sample in [0, 1] at local cell `(x, y)`.
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        self.levels[(y * self.size + x) as usize] as f32 / LEVEL_MAX
    }

    /// Floored column height at local cell `(x, y)` for a chunk of `max_height`.
    pub fn block_height(&self, x: i32, y: i32, max_height: i32) -> i32 {
        (self.sample(x, y) * max_height as f32).floor() as i32
    }

    /// Encodes the field as a 16-bit grayscale PNG.
    pub fn encode_png(&self) -> TerrainResult<Vec<u8>> {
        let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(self.size as u32, self.size as u32, |x, y| {
                Luma([self.levels[(y * self.size as u32 + x) as usize]])
            });

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma16(buffer).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Decodes a field written by [`HeightField::encode_png`].
    ///
    /// # Errors
    /// `CorruptHeightMap` if the image is not `size × size`.
    pub fn decode_png(
        bytes: &[u8],
        size: i32,
        noise_scale: f32,
        noise_offset: [f32; 2],
    ) -> TerrainResult<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_luma16();
        if image.width() != size as u32 || image.height() != size as u32 {
            return Err(TerrainError::CorruptHeightMap {
                expected: size as u32,
                width: image.width(),
                height: image.height(),
            });
        }

        let levels = image.pixels().map(|pixel| pixel.0[0]).collect();
        Ok(HeightField {
            size,
            noise_scale,
            noise_offset,
            levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let a = HeightField::generate(8, 1.0, [0.5, 0.5], 3);
        let b = HeightField::generate(8, 1.0, [0.5, 0.5], 3);
        assert_eq!(a, b);
    }

    #[test]
    fn samples_stay_in_unit_range() {
        let field = HeightField::generate(16, 2.5, [12.3, -4.1], 0);
        for y in 0..16 {
            for x in 0..16 {
                let sample = field.sample(x, y);
                assert!((0.0..=1.0).contains(&sample));
            }
        }
    }

    #[test]
    fn flat_half_field_floors_to_half_height() {
        let field = HeightField::flat(4, 1.0, [0.0, 0.0], 0.5);
        assert_eq!(field.block_height(0, 0, 10), 5);
        assert_eq!(field.block_height(3, 3, 10), 5);
    }

    #[test]
    fn png_round_trip_is_exact() {
        let field = HeightField::generate(16, 1.0, [0.5, 0.5], 0);
        let bytes = field.encode_png().unwrap();
        let decoded = HeightField::decode_png(&bytes, 16, 1.0, [0.5, 0.5]).unwrap();
        assert_eq!(decoded, field);
    }

    #[test]
    fn decode_rejects_wrong_size() {
        let field = HeightField::flat(4, 1.0, [0.0, 0.0], 0.25);
        let bytes = field.encode_png().unwrap();
        let err = HeightField::decode_png(&bytes, 8, 1.0, [0.0, 0.0]).unwrap_err();
        assert!(matches!(err, TerrainError::CorruptHeightMap { expected: 8, .. }));
    }

    #[test]
    fn adjacent_offsets_join_without_seams() {
        // Sample just past the right edge of one chunk equals the first column of the next.
        let size = 8;
        let left = HeightField::generate(size, 1.0, [0.5, 0.5], 0);
        let right = HeightField::generate(size, 1.0, [1.5, 0.5], 0);
        let perlin = Perlin::new(0);
        for y in 0..size {
            let expected = (perlin.get([1.5, (0.5 + y as f32 / size as f32) as f64]) + 1.0) * 0.5;
            let expected = HeightField::quantize(expected as f32) as f32 / LEVEL_MAX;
            assert_eq!(right.sample(0, y), expected);
        }
        assert_eq!(left.size(), right.size());
    }
}
