//! RGBA8 images: PNG decoding and nearest-neighbour scaling.

use std::{
    fs,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::graphics::Color;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to open image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode png: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("unsupported png color type {0:?}")]
    UnsupportedColor(png::ColorType),
    #[error("malformed image {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: Box<ImageError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaImage {
    /// A fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn load_png(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_png(BufReader::new(file)).map_err(|err| ImageError::Malformed {
            path: path.to_path_buf(),
            source: Box::new(err),
        })
    }

    /// Decodes any 8/16-bit PNG (palette, gray, gray+alpha, RGB, RGBA) into RGBA8.
    pub fn decode_png<R: Read>(reader: R) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let data = &buf[..info.buffer_size()];

        let rgba = match info.color_type {
            png::ColorType::Rgba => data.to_vec(),
            png::ColorType::Rgb => data
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => data
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            other => return Err(ImageError::UnsupportedColor(other)),
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            pixels: rgba,
        })
    }

    /// Nearest-neighbour resample to `width` x `height`.
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Self::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as u32;
                let src = (sy as usize * self.width as usize + sx as usize) * 4;
                let dst = (y as usize * width as usize + x as usize) * 4;
                out.pixels[dst..dst + 4].copy_from_slice(&self.pixels[src..src + 4]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().expect("png header");
            writer.write_image_data(data).expect("png data");
        }
        out
    }

    #[test]
    fn decodes_rgb_png_as_opaque_rgba() {
        let bytes = encode_png(2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);
        let image = RgbaImage::decode_png(bytes.as_slice()).expect("decode");

        assert_eq!(image.width(), 2);
        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(1, 0), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn decodes_gray_alpha_png() {
        let bytes = encode_png(1, 1, png::ColorType::GrayscaleAlpha, &[40, 7]);
        let image = RgbaImage::decode_png(bytes.as_slice()).expect("decode");
        assert_eq!(image.pixel(0, 0), Some([40, 40, 40, 7]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = RgbaImage::decode_png(&b"not a png"[..]).unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn scaling_up_repeats_source_pixels() {
        let image = RgbaImage::from_raw(
            2,
            1,
            vec![1, 1, 1, 255, 2, 2, 2, 255],
        )
        .expect("valid raw buffer");
        let big = image.scaled(4, 2);

        assert_eq!(big.pixel(0, 0), Some([1, 1, 1, 255]));
        assert_eq!(big.pixel(1, 1), Some([1, 1, 1, 255]));
        assert_eq!(big.pixel(2, 0), Some([2, 2, 2, 255]));
        assert_eq!(big.pixel(3, 1), Some([2, 2, 2, 255]));
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        assert!(RgbaImage::from_raw(2, 2, vec![0; 15]).is_none());
    }
}
