use palette::Srgba;

pub type Point = (f32, f32);

/// A 2D target the visual effects paint on. Coordinates are logical pixels
/// with the origin at the top left.
pub trait DrawingSurface {
    /// Logical width and height.
    fn size(&self) -> (f32, f32);
    /// Follows a change of the logical size or the device pixel ratio.
    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32);
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Srgba<u8>);
    fn stroke_polyline(&mut self, points: &[Point], color: Srgba<u8>, width: f32);
    fn stroke_line(&mut self, from: Point, to: Point, color: Srgba<u8>, width: f32);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Srgba<u8>);
}

/// Logical size of a surface and the device pixel ratio backing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Viewport {
        let mut viewport = Viewport {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
        };
        viewport.resize(width, height, pixel_ratio);
        viewport
    }

    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
    }

    /// Physical resolution of the backing store.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round() as u32,
            (self.height * self.pixel_ratio).round() as u32,
        )
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCommand {
        Clear,
        Rect {
            x: f32,
            y: f32,
            width: f32,
            height: f32,
            color: Srgba<u8>,
        },
        Polyline {
            points: Vec<Point>,
            color: Srgba<u8>,
            width: f32,
        },
        Line {
            from: Point,
            to: Point,
            color: Srgba<u8>,
            width: f32,
        },
        Circle {
            center: Point,
            radius: f32,
            color: Srgba<u8>,
        },
    }

    /// Keeps every draw call for inspection.
    pub struct RecordingSurface {
        pub viewport: Viewport,
        pub commands: Vec<DrawCommand>,
    }

    impl RecordingSurface {
        pub fn new(width: f32, height: f32) -> RecordingSurface {
            RecordingSurface {
                viewport: Viewport::new(width, height, 1.0),
                commands: vec![],
            }
        }

        /// Commands issued since the last clear.
        pub fn frame(&self) -> &[DrawCommand] {
            let start = self
                .commands
                .iter()
                .rposition(|command| *command == DrawCommand::Clear)
                .map_or(0, |pos| pos + 1);
            &self.commands[start..]
        }
    }

    impl DrawingSurface for RecordingSurface {
        fn size(&self) -> (f32, f32) {
            (self.viewport.width, self.viewport.height)
        }

        fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
            self.viewport.resize(width, height, pixel_ratio);
        }

        fn clear(&mut self) {
            self.commands.push(DrawCommand::Clear);
        }

        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Srgba<u8>) {
            self.commands.push(DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            });
        }

        fn stroke_polyline(&mut self, points: &[Point], color: Srgba<u8>, width: f32) {
            self.commands.push(DrawCommand::Polyline {
                points: points.to_vec(),
                color,
                width,
            });
        }

        fn stroke_line(&mut self, from: Point, to: Point, color: Srgba<u8>, width: f32) {
            self.commands.push(DrawCommand::Line {
                from,
                to,
                color,
                width,
            });
        }

        fn fill_circle(&mut self, center: Point, radius: f32, color: Srgba<u8>) {
            self.commands.push(DrawCommand::Circle {
                center,
                radius,
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_scales_with_pixel_ratio() {
        let viewport = Viewport::new(400.0, 300.0, 2.0);
        assert_eq!(viewport.backing_size(), (800, 600));

        let viewport = Viewport::new(101.0, 51.0, 1.5);
        assert_eq!(viewport.backing_size(), (152, 77));
    }

    #[test]
    fn invalid_pixel_ratio_falls_back_to_one() {
        let mut viewport = Viewport::new(10.0, 10.0, 0.0);
        assert_eq!(viewport.pixel_ratio, 1.0);
        viewport.resize(20.0, -5.0, f32::NAN);
        assert_eq!(viewport, Viewport::new(20.0, 0.0, 1.0));
    }
}
