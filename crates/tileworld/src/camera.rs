use crate::geometry::{Rect, Vec2};

/// Viewport abstraction used by the world renderer.
///
/// World space is in pixels, y-down, with the origin at the top-left corner
/// of the first grid cell. Screen space is the same unit, relative to the
/// top-left corner of the viewport.
pub trait Camera {
    /// World-space rectangle covered by the viewport.
    fn view_rect(&self) -> Rect;

    fn is_visible(&self, world_rect: Rect) -> bool {
        self.view_rect().intersects(&world_rect)
    }

    fn world_to_screen(&self, world_rect: Rect) -> Rect;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned camera without zoom. `position` is the world pixel shown at
/// the top-left corner of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub viewport: Viewport,
}

impl Camera2D {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            position: Vec2::default(),
            viewport,
        }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    pub fn center_on(&mut self, target: Vec2) {
        self.position = Vec2 {
            x: target.x - self.viewport.width as f32 * 0.5,
            y: target.y - self.viewport.height as f32 * 0.5,
        };
    }

    /// Keeps the viewport inside a world of the given pixel size. A world
    /// smaller than the viewport pins the camera to the origin on that axis.
    pub fn clamp_to_world(&mut self, world_width: u32, world_height: u32) {
        let max_x = world_width.saturating_sub(self.viewport.width) as f32;
        let max_y = world_height.saturating_sub(self.viewport.height) as f32;
        self.position.x = clamp_axis(self.position.x, max_x);
        self.position.y = clamp_axis(self.position.y, max_y);
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let (origin_x, origin_y) = self.origin_px();
        Vec2 {
            x: screen.x + origin_x as f32,
            y: screen.y + origin_y as f32,
        }
    }

    fn origin_px(&self) -> (i32, i32) {
        (
            snap_coordinate(self.position.x),
            snap_coordinate(self.position.y),
        )
    }
}

impl Camera for Camera2D {
    fn view_rect(&self) -> Rect {
        let (x, y) = self.origin_px();
        Rect::new(x, y, self.viewport.width, self.viewport.height)
    }

    fn world_to_screen(&self, world_rect: Rect) -> Rect {
        let (origin_x, origin_y) = self.origin_px();
        world_rect.translated(-origin_x, -origin_y)
    }
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

fn snap_coordinate(value: f32) -> i32 {
    if value.is_finite() {
        value.round() as i32
    } else {
        0
    }
}
