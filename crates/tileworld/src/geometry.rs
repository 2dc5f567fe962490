#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel rectangle. `x`/`y` is the top-left corner; the right and
/// bottom edges are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(rgba: [u8; 4]) -> Self {
        Self::rgba(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 32, 32);
        let b = Rect::new(32, 0, 32, 32);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(31, 31, 1, 1)));
    }

    #[test]
    fn empty_rect_never_intersects() {
        let a = Rect::new(0, 0, 0, 10);
        let b = Rect::new(-5, -5, 20, 20);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn negative_coordinates_intersect() {
        let view = Rect::new(-16, -16, 32, 32);
        assert!(view.intersects(&Rect::new(-40, -40, 30, 30)));
        assert!(!view.intersects(&Rect::new(-40, -40, 24, 24)));
    }

    #[test]
    fn contains_point_excludes_far_edges() {
        let rect = Rect::new(10, 20, 4, 4);
        assert!(rect.contains_point(10, 20));
        assert!(rect.contains_point(13, 23));
        assert!(!rect.contains_point(14, 23));
        assert!(!rect.contains_point(13, 24));
    }

    #[test]
    fn color_array_conversion_keeps_channel_order() {
        let color = Color::from_array([1, 2, 3, 4]);
        assert_eq!(color, Color::rgba(1, 2, 3, 4));
        assert_eq!(color.to_array(), [1, 2, 3, 4]);
    }
}
