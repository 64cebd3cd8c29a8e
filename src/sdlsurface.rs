use palette::Srgba;
use sdl2::pixels::Color;
use sdl2::rect::{Point as SdlPoint, Rect};
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

use crate::surface::{DrawingSurface, Point, Viewport};

const BACKGROUND: Color = Color::RGB(18, 16, 28);

fn sdl_color(color: Srgba<u8>) -> Color {
    Color::RGBA(color.red, color.green, color.blue, color.alpha)
}

/// One horizontal run `(x, y, width)` per row covered by a filled circle,
/// in device pixels.
fn circle_spans(center: (f32, f32), radius: f32) -> impl Iterator<Item = (i32, i32, u32)> {
    let extent = if radius > 0.0 { radius.ceil() as i32 } else { -1 };
    (-extent..=extent).filter_map(move |dy| {
        let dy_f = dy as f32;
        if dy_f.abs() > radius {
            return None;
        }
        let half = (radius * radius - dy_f * dy_f).sqrt();
        let x = (center.0 - half).round() as i32;
        let width = (2.0 * half).round().max(1.0) as u32;
        Some((x, center.1.round() as i32 + dy, width))
    })
}

/// Offsets along the line normal for strokes wider than one device pixel.
fn stroke_offsets(width: f32) -> Vec<f32> {
    let count = width.round().max(1.0) as usize;
    (0..count)
        .map(|i| i as f32 - (count - 1) as f32 / 2.0)
        .collect()
}

/// Draws into an SDL window. Effects work in logical units; everything is
/// scaled by the window's pixel ratio here.
pub struct SdlSurface {
    canvas: Canvas<Window>,
    viewport: Viewport,
}

impl SdlSurface {
    pub fn new(mut canvas: Canvas<Window>) -> SdlSurface {
        canvas.set_blend_mode(BlendMode::Blend);
        let mut surface = SdlSurface {
            canvas,
            viewport: Viewport::new(0.0, 0.0, 1.0),
        };
        surface.sync_with_window();
        surface
    }

    /// Re-reads the logical window size and the renderer output behind it.
    pub fn sync_with_window(&mut self) {
        let (width, height) = self.canvas.window().size();
        let drawable_width = match self.canvas.output_size() {
            Ok((drawable_width, _)) => drawable_width,
            Err(msg) => {
                log::warn!("Cannot query renderer size: {}", msg);
                width
            }
        };
        let pixel_ratio = if width > 0 {
            drawable_width as f32 / width as f32
        } else {
            1.0
        };
        self.resize(width as f32, height as f32, pixel_ratio);
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(error) = self.canvas.window_mut().set_title(title) {
            log::warn!("Cannot set window title: {}", error);
        }
    }

    pub fn present(&mut self) {
        self.canvas.present();
    }

    fn device(&self, point: Point) -> SdlPoint {
        SdlPoint::new(
            (point.0 * self.viewport.pixel_ratio).round() as i32,
            (point.1 * self.viewport.pixel_ratio).round() as i32,
        )
    }

    fn draw_segment(&mut self, from: Point, to: Point, width: f32) {
        let ratio = self.viewport.pixel_ratio;
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if length > 0.0 {
            (-dy / length, dx / length)
        } else {
            (0.0, 0.0)
        };

        for offset in stroke_offsets(width * ratio) {
            let shift = (nx * offset / ratio, ny * offset / ratio);
            let a = self.device((from.0 + shift.0, from.1 + shift.1));
            let b = self.device((to.0 + shift.0, to.1 + shift.1));
            if let Err(msg) = self.canvas.draw_line(a, b) {
                log::trace!("Failed to draw line: {}", msg);
            }
        }
    }
}

impl DrawingSurface for SdlSurface {
    fn size(&self) -> (f32, f32) {
        (self.viewport.width, self.viewport.height)
    }

    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.viewport.resize(width, height, pixel_ratio);
        let (backing_width, backing_height) = self.viewport.backing_size();
        log::debug!(
            "Surface {}x{} at ratio {} ({}x{} pixels)",
            self.viewport.width,
            self.viewport.height,
            self.viewport.pixel_ratio,
            backing_width,
            backing_height
        );
    }

    fn clear(&mut self) {
        self.canvas.set_draw_color(BACKGROUND);
        self.canvas.clear();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Srgba<u8>) {
        let ratio = self.viewport.pixel_ratio;
        let device_width = (width * ratio).round();
        let device_height = (height * ratio).round();
        if device_width < 1.0 || device_height < 1.0 {
            return;
        }

        let origin = self.device((x, y));
        self.canvas.set_draw_color(sdl_color(color));
        let rect = Rect::new(
            origin.x(),
            origin.y(),
            device_width as u32,
            device_height as u32,
        );
        if let Err(msg) = self.canvas.fill_rect(rect) {
            log::trace!("Failed to fill rect: {}", msg);
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Srgba<u8>, width: f32) {
        self.canvas.set_draw_color(sdl_color(color));
        for pair in points.windows(2) {
            self.draw_segment(pair[0], pair[1], width);
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Srgba<u8>, width: f32) {
        self.canvas.set_draw_color(sdl_color(color));
        self.draw_segment(from, to, width);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Srgba<u8>) {
        let ratio = self.viewport.pixel_ratio;
        self.canvas.set_draw_color(sdl_color(color));
        for (x, y, width) in circle_spans((center.0 * ratio, center.1 * ratio), radius * ratio) {
            if let Err(msg) = self.canvas.fill_rect(Rect::new(x, y, width, 1)) {
                log::trace!("Failed to fill circle: {}", msg);
                return;
            }
        }
    }
}
