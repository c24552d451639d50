//! Piece sprites: one source image per (color, role), plus copies scaled to the square size.

use std::collections::HashMap;
use std::path::Path;

use engine::graphics::{self, Color as Rgba, CpuRenderer, Renderer2d};
use engine::image::{ImageError, RgbaImage};
use engine::surface::SurfaceSize;
use shakmaty::Color;
use tracing::{debug, warn};

use crate::pieces::PieceKey;

const FALLBACK_SIZE: u32 = 64;
const FALLBACK_LETTER_SCALE: u32 = 6;

const LIGHT_FILL: Rgba = [240, 240, 240, 255];
const DARK_FILL: Rgba = [30, 30, 30, 255];

#[derive(Debug, Clone)]
pub struct SpriteSet {
    sources: Vec<RgbaImage>,
    scaled: HashMap<(PieceKey, u32), RgbaImage>,
}

impl SpriteSet {
    /// Loads `<dir>/<stem>.png` for every piece (`wP.png`, `bK.png`, ...).
    ///
    /// A missing directory or file is replaced by a drawn glyph; a file that exists but does not
    /// decode is an error.
    pub fn load(dir: Option<&Path>) -> Result<Self, ImageError> {
        let mut sources = Vec::with_capacity(PieceKey::ALL.len());
        let mut missing = Vec::new();
        for key in PieceKey::ALL {
            let path = dir.map(|dir| dir.join(format!("{}.png", key.file_stem())));
            match path {
                Some(path) if path.is_file() => {
                    let image = RgbaImage::load_png(&path)?;
                    debug!(path = %path.display(), width = image.width(), "loaded sprite");
                    sources.push(image);
                }
                _ => {
                    missing.push(key.file_stem());
                    sources.push(fallback_sprite(key));
                }
            }
        }
        if !missing.is_empty() {
            warn!(
                dir = ?dir,
                missing = %missing.join(","),
                "piece sprites not found; drawing fallback glyphs"
            );
        }
        Ok(Self {
            sources,
            scaled: HashMap::new(),
        })
    }

    /// Every piece drawn as a fallback glyph.
    pub fn fallback() -> Self {
        Self {
            sources: PieceKey::ALL.into_iter().map(fallback_sprite).collect(),
            scaled: HashMap::new(),
        }
    }

    pub fn source(&self, key: PieceKey) -> &RgbaImage {
        &self.sources[key.index()]
    }

    /// `key`'s sprite resampled to `size` x `size`, cached per size.
    pub fn scaled(&mut self, key: PieceKey, size: u32) -> &RgbaImage {
        let source = &self.sources[key.index()];
        self.scaled
            .entry((key, size))
            .or_insert_with(|| source.scaled(size, size))
    }

    pub fn cached_sizes(&self) -> usize {
        self.scaled.len()
    }

    /// Drops cached copies at sizes other than `keep`.
    pub fn retain_size(&mut self, keep: u32) {
        self.scaled.retain(|(_, size), _| *size == keep);
    }
}

/// A disc in the piece color with the role letter in the opposite color.
pub fn fallback_sprite(key: PieceKey) -> RgbaImage {
    let (fill, ink) = match key.color {
        Color::White => (LIGHT_FILL, DARK_FILL),
        Color::Black => (DARK_FILL, LIGHT_FILL),
    };
    let size = SurfaceSize::new(FALLBACK_SIZE, FALLBACK_SIZE);
    let mut image = RgbaImage::new(size.width, size.height);
    {
        let mut gfx = CpuRenderer::new(image.pixels_mut(), size);
        let center = (FALLBACK_SIZE / 2) as i32;
        gfx.fill_circle(center, center, FALLBACK_SIZE / 2 - 4, ink);
        gfx.fill_circle(center, center, FALLBACK_SIZE / 2 - 6, fill);

        let letter = key.role.upper_char().to_string();
        let w = graphics::text_width(&letter, FALLBACK_LETTER_SCALE);
        let h = graphics::line_advance_y(FALLBACK_LETTER_SCALE) - FALLBACK_LETTER_SCALE;
        gfx.draw_text_scaled(
            (FALLBACK_SIZE - w) / 2,
            (FALLBACK_SIZE - h) / 2,
            &letter,
            ink,
            FALLBACK_LETTER_SCALE,
        );
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Role;

    #[test]
    fn fallback_sprite_is_transparent_outside_the_disc() {
        let image = fallback_sprite(PieceKey::new(Color::White, Role::Queen));
        assert_eq!(image.pixel(0, 0).map(|p| p[3]), Some(0));
        assert_eq!(image.pixel(32, 4 + 5).map(|p| p[3]), Some(255));
        assert_eq!(image.pixel(8, 32), Some(LIGHT_FILL));
    }

    #[test]
    fn scaled_copies_are_cached_per_size() {
        let mut sprites = SpriteSet::fallback();
        let key = PieceKey::new(Color::Black, Role::Knight);
        assert_eq!(sprites.scaled(key, 70).width(), 70);
        sprites.scaled(key, 70);
        sprites.scaled(key, 35);
        assert_eq!(sprites.cached_sizes(), 2);

        sprites.retain_size(35);
        assert_eq!(sprites.cached_sizes(), 1);
    }

    #[test]
    fn missing_directory_falls_back() {
        let sprites = SpriteSet::load(Some(Path::new("/nonexistent/chessboard-sprites"))).unwrap();
        assert_eq!(sprites.source(PieceKey::ALL[0]).width(), FALLBACK_SIZE);
    }
}
