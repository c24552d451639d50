use std::convert::Infallible;

use crate::graphics::{Color, CpuRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimized windows report a zero-sized surface.
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// A resizable RGBA surface that frames are drawn into before being shown.
///
/// The windowed path presents through `pixels`; headless runs and tests use
/// [`RgbaBufferSurface`].
pub trait Surface {
    type Error;

    fn size(&self) -> SurfaceSize;
    fn frame_mut(&mut self) -> &mut [u8];

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error>;
    fn present(&mut self) -> Result<(), Self::Error>;

    /// Borrows the frame as a CPU renderer sized to the surface.
    fn renderer(&mut self) -> CpuRenderer<'_> {
        let size = self.size();
        CpuRenderer::new(self.frame_mut(), size)
    }
}

/// In-memory RGBA surface for headless rendering.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
    presented: usize,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
            presented: 0,
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        let px = self.buf.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Surface for RgbaBufferSurface {
    type Error = Infallible;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error> {
        self.size = size;
        self.buf.resize(size.rgba_len(), 0u8);
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Renderer2d;

    #[test]
    fn resize_reallocates_and_renderer_tracks_new_size() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(2, 2));
        surface.resize(SurfaceSize::new(3, 1)).unwrap();
        assert_eq!(surface.frame().len(), 12);

        surface.renderer().clear([1, 2, 3, 255]);
        surface.present().unwrap();

        assert_eq!(surface.pixel(2, 0), Some([1, 2, 3, 255]));
        assert_eq!(surface.pixel(0, 1), None);
        assert_eq!(surface.presented(), 1);
    }

    #[test]
    fn zero_dimension_is_empty() {
        assert!(SurfaceSize::new(0, 600).is_empty());
        assert!(!SurfaceSize::new(1, 1).is_empty());
    }
}
