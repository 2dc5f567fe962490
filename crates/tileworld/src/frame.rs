use thiserror::Error;

use crate::geometry::{Color, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("rgba buffer length mismatch for {width}x{height}: expected {expected}, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Read-only RGBA8 image region source for blits.
#[derive(Debug, Clone, Copy)]
pub struct RgbaView<'a> {
    pub rgba: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Caller-owned RGBA8 frame that tiles are drawn into. Every write is clipped
/// to the frame bounds.
pub struct Frame<'a> {
    rgba: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(rgba: &'a mut [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = rgba_len(width, height);
        if rgba.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            rgba,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn clear(&mut self, color: Color) {
        let color = color.to_array();
        for chunk in self.rgba.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let offset = self.byte_offset(x, y)?;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some(Color::rgba(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    pub fn write_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        if let Some(bytes) = self.rgba.get_mut(offset..offset + 4) {
            bytes.copy_from_slice(&color.to_array());
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(clipped) = self.clip(rect) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.write_pixel(x, y, color);
            }
        }
    }

    /// Nearest-neighbour copy of `source_rect` from `source` into `dest`.
    /// Fully transparent source pixels are skipped.
    pub fn blit_scaled(&mut self, source: RgbaView<'_>, source_rect: Rect, dest: Rect) {
        if source_rect.is_empty() || dest.is_empty() {
            return;
        }
        if source.rgba.len() < rgba_len(source.width, source.height) {
            return;
        }
        let source_bounds = Rect::new(0, 0, source.width, source.height);
        if source_rect.x < 0
            || source_rect.y < 0
            || source_rect.right() > source_bounds.right()
            || source_rect.bottom() > source_bounds.bottom()
        {
            return;
        }
        let Some(clipped) = self.clip(dest) else {
            return;
        };

        let scale_x = source_rect.width as f32 / dest.width as f32;
        let scale_y = source_rect.height as f32 / dest.height as f32;
        let source_stride = source.width as usize * 4;

        for out_y in clipped.y..clipped.bottom() {
            let dy = (out_y - dest.y) as f32;
            let src_y = ((dy * scale_y).floor() as u32).min(source_rect.height - 1);
            let src_row = (source_rect.y as usize + src_y as usize) * source_stride;
            for out_x in clipped.x..clipped.right() {
                let dx = (out_x - dest.x) as f32;
                let src_x = ((dx * scale_x).floor() as u32).min(source_rect.width - 1);
                let src_offset = src_row + (source_rect.x as usize + src_x as usize) * 4;
                let alpha = source.rgba[src_offset + 3];
                if alpha == 0 {
                    continue;
                }
                self.write_pixel(
                    out_x,
                    out_y,
                    Color::rgba(
                        source.rgba[src_offset],
                        source.rgba[src_offset + 1],
                        source.rgba[src_offset + 2],
                        alpha,
                    ),
                );
            }
        }
    }

    fn clip(&self, rect: Rect) -> Option<Rect> {
        let left = rect.x.max(0);
        let top = rect.y.max(0);
        let right = rect.right().min(self.width as i32);
        let bottom = rect.bottom().min(self.height as i32);
        if left >= right || top >= bottom {
            return None;
        }
        Some(Rect::new(
            left,
            top,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        pixel.checked_mul(4)
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgba(255, 0, 0, 255);
    const GREEN: Color = Color::rgba(0, 255, 0, 255);

    #[test]
    fn new_rejects_wrong_buffer_length() {
        let mut buffer = vec![0u8; 10];
        let err = Frame::new(&mut buffer, 2, 2).err().expect("err");
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn writes_outside_frame_are_clipped() {
        let mut buffer = vec![0u8; 4];
        let mut frame = Frame::new(&mut buffer, 1, 1).expect("frame");
        frame.write_pixel(-1, 0, RED);
        frame.write_pixel(1, 0, RED);
        frame.write_pixel(0, 99, RED);
        assert_eq!(frame.pixel(0, 0), Some(Color::TRANSPARENT));
        frame.write_pixel(0, 0, RED);
        assert_eq!(frame.pixel(0, 0), Some(RED));
        assert_eq!(frame.pixel(1, 0), None);
    }

    #[test]
    fn zero_sized_frame_is_safe() {
        let mut buffer = Vec::new();
        let mut frame = Frame::new(&mut buffer, 0, 0).expect("frame");
        frame.clear(RED);
        frame.fill_rect(Rect::new(0, 0, 4, 4), RED);
        frame.write_pixel(0, 0, RED);
        assert_eq!(frame.pixel(0, 0), None);
    }

    #[test]
    fn fill_rect_clips_partially_visible_rect() {
        let mut buffer = vec![0u8; 4 * 4 * 4];
        let mut frame = Frame::new(&mut buffer, 4, 4).expect("frame");
        frame.fill_rect(Rect::new(-2, -2, 4, 4), GREEN);
        assert_eq!(frame.pixel(0, 0), Some(GREEN));
        assert_eq!(frame.pixel(1, 1), Some(GREEN));
        assert_eq!(frame.pixel(2, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blit_scaled_doubles_source_pixels() {
        // 2x1 source: red, green.
        let source_rgba = [255, 0, 0, 255, 0, 255, 0, 255];
        let source = RgbaView {
            rgba: &source_rgba,
            width: 2,
            height: 1,
        };
        let mut buffer = vec![0u8; 4 * 2 * 4];
        let mut frame = Frame::new(&mut buffer, 4, 2).expect("frame");
        frame.blit_scaled(source, Rect::new(0, 0, 2, 1), Rect::new(0, 0, 4, 2));
        assert_eq!(frame.pixel(0, 0), Some(RED));
        assert_eq!(frame.pixel(1, 1), Some(RED));
        assert_eq!(frame.pixel(2, 0), Some(GREEN));
        assert_eq!(frame.pixel(3, 1), Some(GREEN));
    }

    #[test]
    fn blit_skips_transparent_pixels_and_bad_regions() {
        let source_rgba = [9, 9, 9, 0, 0, 255, 0, 255];
        let source = RgbaView {
            rgba: &source_rgba,
            width: 2,
            height: 1,
        };
        let mut buffer = vec![0u8; 2 * 4];
        let mut frame = Frame::new(&mut buffer, 2, 1).expect("frame");
        frame.clear(RED);
        frame.blit_scaled(source, Rect::new(0, 0, 2, 1), Rect::new(0, 0, 2, 1));
        assert_eq!(frame.pixel(0, 0), Some(RED));
        assert_eq!(frame.pixel(1, 0), Some(GREEN));

        frame.clear(RED);
        frame.blit_scaled(source, Rect::new(1, 0, 2, 1), Rect::new(0, 0, 2, 1));
        assert_eq!(frame.pixel(1, 0), Some(RED));
    }
}
