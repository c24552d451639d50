use crate::image::RgbaImage;
use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

// A tiny block font (no external deps).
pub const DEFAULT_TEXT_SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

pub fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

pub fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel width of `text` when drawn with `draw_text_scaled` (single line).
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    glyph_advance_x(scale)
        .saturating_mul(n)
        .saturating_sub(scale.max(1))
}

/// 2D rendering interface used by application code.
///
/// Rect/text coordinates are unsigned (layout space); circles and images take signed coordinates
/// because dragged sprites routinely hang off the top/left edge of the surface.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    /// Opaque fill.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn rect_outline(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color);

    /// Draws `image` with its top-left corner at (`x`, `y`), blending by the image's alpha.
    fn draw_image(&mut self, x: i32, y: i32, image: &RgbaImage);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn draw_text(&mut self, x: u32, y: u32, text: &str, color: Color) {
        self.draw_text_scaled(x, y, text, color, DEFAULT_TEXT_SCALE);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Clips `rect` against the surface and returns `(x0, y0, x1, y1)` in pixels.
    ///
    /// Returns `None` for empty intersections or when the frame is too small for `size`.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        if self.frame.len() < self.size.rgba_len() || self.size.is_empty() {
            return None;
        }
        let x1 = rect.x.saturating_add(rect.w).min(self.size.width);
        let y1 = rect.y.saturating_add(rect.h).min(self.size.height);
        if rect.x >= x1 || rect.y >= y1 {
            return None;
        }
        Some((rect.x, rect.y, x1, y1))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.size.width as usize + x as usize) * 4
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color, alpha: u8) {
        if x >= self.size.width || y >= self.size.height || alpha == 0 {
            return;
        }
        let idx = self.index(x, y);
        let Some(px) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        blend_into(px, color, alpha);
    }
}

fn blend_into(px: &mut [u8], color: Color, alpha: u8) {
    if alpha == 255 {
        px[0] = color[0];
        px[1] = color[1];
        px[2] = color[2];
        px[3] = 255;
        return;
    }
    let a = alpha as u32;
    let inv = 255u32 - a;
    for c in 0..3 {
        px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
    }
    px[3] = 255;
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let row_bytes = (x1 - x0) as usize * 4;
        for y in y0..y1 {
            let start = self.index(x0, y);
            for px in self.frame[start..start + row_bytes].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.fill_rect(rect, color);
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let row_bytes = (x1 - x0) as usize * 4;
        for y in y0..y1 {
            let start = self.index(x0, y);
            for px in self.frame[start..start + row_bytes].chunks_exact_mut(4) {
                blend_into(px, color, alpha);
            }
        }
    }

    fn rect_outline(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let w = x1 - x0;
        let h = y1 - y0;

        self.fill_rect(Rect::new(x0, y0, w, 1), color);
        self.fill_rect(Rect::new(x0, y1 - 1, w, 1), color);
        self.fill_rect(Rect::new(x0, y0, 1, h), color);
        self.fill_rect(Rect::new(x1 - 1, y0, 1, h), color);
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color) {
        if radius == 0 {
            return;
        }
        let r = radius as i64;
        let r2 = r * r;
        let width = self.size.width as i64;
        let height = self.size.height as i64;
        let (cx, cy) = (cx as i64, cy as i64);

        // Sample at pixel centers so a radius-r disc is symmetric around (cx, cy).
        for y in (cy - r).max(0)..(cy + r).min(height) {
            let dy = 2 * (y - cy) + 1;
            for x in (cx - r).max(0)..(cx + r).min(width) {
                let dx = 2 * (x - cx) + 1;
                if dx * dx + dy * dy <= 4 * r2 {
                    self.blend_pixel(x as u32, y as u32, color, color[3]);
                }
            }
        }
    }

    fn draw_image(&mut self, x: i32, y: i32, image: &RgbaImage) {
        let width = self.size.width as i64;
        let height = self.size.height as i64;
        let (x, y) = (x as i64, y as i64);

        let src_x0 = (-x).max(0);
        let src_y0 = (-y).max(0);
        let src_x1 = (image.width() as i64).min(width - x);
        let src_y1 = (image.height() as i64).min(height - y);
        if src_x0 >= src_x1 || src_y0 >= src_y1 {
            return;
        }

        for sy in src_y0..src_y1 {
            for sx in src_x0..src_x1 {
                let Some(color) = image.pixel(sx as u32, sy as u32) else {
                    continue;
                };
                self.blend_pixel((x + sx) as u32, (y + sy) as u32, color, color[3]);
            }
        }
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let width = self.size.width;
        let height = self.size.height;
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);

        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    cursor_x = x;
                    cursor_y = cursor_y.saturating_add(adv_y);
                    if cursor_y >= height {
                        break;
                    }
                    continue;
                }
                ' ' => {}
                _ => self.draw_glyph(cursor_x, cursor_y, ch, color, scale),
            }
            cursor_x = cursor_x.saturating_add(adv_x);
            if cursor_x >= width {
                break;
            }
        }
    }
}

impl CpuRenderer<'_> {
    fn draw_glyph(&mut self, x: u32, y: u32, ch: char, color: Color, scale: u32) {
        for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
            let py = y.saturating_add((row as u32).saturating_mul(scale));
            for col in 0..GLYPH_W {
                if bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px = x.saturating_add(col.saturating_mul(scale));
                self.fill_rect(Rect::new(px, py, scale, scale), color);
            }
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}
