use pixels::Pixels;

use crate::graphics::{CpuRenderer, Renderer2d};
use crate::surface::SurfaceSize;

/// Windowed presenter built on `pixels`.
///
/// Frames are drawn on the CPU into the pixels buffer, which is kept at the window's physical
/// size so one buffer pixel maps to one screen pixel (pointer coordinates need no scaling).
pub struct PixelsRenderer2d {
    pixels: Pixels,
    size: SurfaceSize,
}

impl PixelsRenderer2d {
    pub fn new(mut pixels: Pixels, size: SurfaceSize) -> Result<Self, pixels::Error> {
        if !size.is_empty() {
            pixels.resize_buffer(size.width, size.height)?;
        }
        Ok(Self { pixels, size })
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// Resizes both the swapchain surface and the frame buffer.
    ///
    /// Zero-sized requests (minimized window) are ignored; the previous size is kept until the
    /// window is restored.
    pub fn resize(&mut self, size: SurfaceSize) -> Result<(), pixels::Error> {
        if size.is_empty() {
            return Ok(());
        }
        self.size = size;
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        Ok(())
    }

    pub fn draw_frame<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut dyn Renderer2d) -> R,
    {
        let mut cpu = CpuRenderer::new(self.pixels.frame_mut(), self.size);
        cpu.begin_frame(self.size);
        f(&mut cpu)
    }

    pub fn present(&mut self) -> Result<(), pixels::Error> {
        self.pixels.render()
    }
}
