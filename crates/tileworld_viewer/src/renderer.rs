use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use tileworld::{Camera2D, Color, DrawStats, Frame, FrameError, TileWorldError, Viewport, World};
use winit::window::Window;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pixel surface failed: {0}")]
    Pixels(#[from] pixels::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    World(#[from] TileWorldError),
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    clear_color: Color,
}

impl Renderer {
    pub fn new(window: Arc<Window>, clear_color: Color) -> Result<Self, pixels::Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            clear_color,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), pixels::Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, pixels::Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_world(
        &mut self,
        world: &dyn World,
        camera: &Camera2D,
    ) -> Result<DrawStats, RenderError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(DrawStats::default());
        }

        let stats = {
            let mut frame = Frame::new(
                self.pixels.frame_mut(),
                self.viewport.width,
                self.viewport.height,
            )?;
            frame.clear(self.clear_color);
            world.draw(camera, &mut frame)?
        };
        self.pixels.render()?;
        Ok(stats)
    }
}
