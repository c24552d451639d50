use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use tracing::{debug, error, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::EngineError;
use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::surface::SurfaceSize;

pub const DEFAULT_TARGET_FPS: u32 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub resizable: bool,
    pub target_fps: u32,
    pub vsync: Option<bool>,
}

impl AppConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            desired_size: PhysicalSize::new(width, height),
            resizable: true,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: None,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / (self.target_fps.max(1) as f64))
    }
}

pub struct AppContext {
    pub window: Window,
    pub renderer: PixelsRenderer2d,
    windowed_size: PhysicalSize<u32>,
}

impl AppContext {
    pub fn surface_size(&self) -> SurfaceSize {
        self.renderer.size()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    /// Switches between the windowed size and fullscreen.
    ///
    /// Fullscreen prefers an exclusive video mode of exactly `preferred` on the current monitor
    /// and falls back to borderless when the monitor has no such mode.
    pub fn toggle_fullscreen(&mut self, preferred: PhysicalSize<u32>) {
        if self.is_fullscreen() {
            self.window.set_fullscreen(None);
            self.window.set_inner_size(self.windowed_size);
            debug!(windowed = ?self.windowed_size, "left fullscreen");
            return;
        }

        self.windowed_size = self.window.inner_size();
        let exclusive = self.window.current_monitor().and_then(|monitor| {
            monitor
                .video_modes()
                .filter(|mode| mode.size() == preferred)
                .max_by_key(|mode| mode.refresh_rate_millihertz())
        });
        let mode = match exclusive {
            Some(mode) => Fullscreen::Exclusive(mode),
            None => {
                debug!(?preferred, "no exclusive video mode; using borderless fullscreen");
                Fullscreen::Borderless(None)
            }
        };
        self.window.set_fullscreen(Some(mode));
    }

    pub fn minimize(&self) {
        self.window.set_minimized(true);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => PointerButton::Left,
            MouseButton::Right => PointerButton::Right,
            MouseButton::Middle => PointerButton::Middle,
            MouseButton::Other(_) => PointerButton::Other,
        }
    }
}

/// Window input, already translated to surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMoved { x: i32, y: i32 },
    PointerPressed { x: i32, y: i32, button: PointerButton },
    PointerReleased { x: i32, y: i32, button: PointerButton },
    KeyPressed(VirtualKeyCode),
    Resized(SurfaceSize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Tracks the last known cursor position so button events (which carry no position in winit)
/// can be reported with coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    pos: (i32, i32),
}

impl PointerTracker {
    pub fn position(&self) -> (i32, i32) {
        self.pos
    }

    pub fn translate(&mut self, event: &WindowEvent<'_>) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pos = (position.x.round() as i32, position.y.round() as i32);
                Some(InputEvent::PointerMoved {
                    x: self.pos.0,
                    y: self.pos.1,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let (x, y) = self.pos;
                let button = PointerButton::from(*button);
                Some(match state {
                    ElementState::Pressed => InputEvent::PointerPressed { x, y, button },
                    ElementState::Released => InputEvent::PointerReleased { x, y, button },
                })
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => Some(InputEvent::KeyPressed(*key)),
            WindowEvent::Resized(size) => {
                Some(InputEvent::Resized(SurfaceSize::new(size.width, size.height)))
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => Some(InputEvent::Resized(
                SurfaceSize::new(new_inner_size.width, new_inner_size.height),
            )),
            _ => None,
        }
    }
}

pub trait GameApp {
    type State;

    /// Called once the window and renderer exist, before the first event.
    fn init(&mut self, _state: &mut Self::State, _ctx: &mut AppContext) {}

    fn handle_input(
        &mut self,
        state: &mut Self::State,
        event: InputEvent,
        ctx: &mut AppContext,
    ) -> AppControl;

    /// Draws one full frame. Called once per frame tick whether or not anything changed.
    fn render(&mut self, state: &Self::State, gfx: &mut dyn Renderer2d);
}

/// Opens a window and runs `game` until it asks to exit or the window is closed.
///
/// Events are processed as they arrive; redraws are capped at `config.target_fps` with
/// `ControlFlow::WaitUntil` so the loop sleeps between frames.
pub fn run_game<G: GameApp + 'static>(
    config: AppConfig,
    mut game: G,
    mut state: G::State,
) -> Result<(), EngineError>
where
    G::State: 'static,
{
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(config.desired_size)
        .with_resizable(config.resizable)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height);

    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut builder = PixelsBuilder::new(
        surface_size.width.max(1),
        surface_size.height.max(1),
        surface_texture,
    );
    if let Some(vsync) = config.vsync {
        builder = builder.enable_vsync(vsync);
    }
    let pixels = builder.build()?;
    let renderer = PixelsRenderer2d::new(pixels, surface_size)?;

    let mut ctx = AppContext {
        window,
        renderer,
        windowed_size: config.desired_size,
    };
    game.init(&mut state, &mut ctx);

    let frame_interval = config.frame_interval();
    let mut next_redraw = Instant::now();
    let mut pointer = PointerTracker::default();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(next_redraw);

        match event {
            Event::WindowEvent { event, .. } => {
                if matches!(event, WindowEvent::CloseRequested) {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                let Some(input) = pointer.translate(&event) else {
                    return;
                };
                if let InputEvent::Resized(size) = input {
                    if let Err(err) = ctx.renderer.resize(size) {
                        warn!(%err, ?size, "resize failed");
                    }
                }
                if game.handle_input(&mut state, input, &mut ctx) == AppControl::Exit {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                let now = Instant::now();
                if now >= next_redraw {
                    ctx.window.request_redraw();
                    next_redraw = now + frame_interval;
                    *control_flow = ControlFlow::WaitUntil(next_redraw);
                }
            }
            Event::RedrawRequested(_) => {
                if ctx.renderer.size().is_empty() {
                    return;
                }
                ctx.renderer.draw_frame(|gfx| game.render(&state, gfx));
                if let Err(err) = ctx.renderer.present() {
                    error!(%err, "present failed");
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}
