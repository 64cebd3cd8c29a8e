use palette::Srgba;

use crate::effects::VisualEffect;
use crate::surface::{DrawingSurface, Point};

const AMPLITUDE_FRACTION: f32 = 0.6;
const LINE_WIDTH: f32 = 3.0;

/// A single line across the surface, bin magnitude as height.
pub struct Wave {
    color: Srgba<u8>,
    points: Vec<Point>,
}

impl Wave {
    pub fn new() -> Wave {
        Wave {
            color: Srgba::new(0x7c, 0x3a, 0xed, 0xff),
            points: vec![],
        }
    }
}

impl VisualEffect for Wave {
    fn draw(&mut self, bins: &[u8], surface: &mut dyn DrawingSurface) {
        if bins.is_empty() {
            return;
        }

        let (width, height) = surface.size();
        let slice_width = width / bins.len() as f32;

        self.points.clear();
        self.points.extend(bins.iter().enumerate().map(|(i, &value)| {
            let v = value as f32 / 255.0;
            (
                i as f32 * slice_width,
                height / 2.0 + (v - 0.5) * height * AMPLITUDE_FRACTION,
            )
        }));

        surface.stroke_polyline(&self.points, self.color, LINE_WIDTH);
    }
}
