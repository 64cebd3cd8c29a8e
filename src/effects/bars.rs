use crate::effects::{spectrum_color, VisualEffect};
use crate::surface::DrawingSurface;

const HEIGHT_FRACTION: f32 = 0.8;

/// Vertical bars along the bottom edge, one per bin.
pub struct Bars;

impl VisualEffect for Bars {
    fn draw(&mut self, bins: &[u8], surface: &mut dyn DrawingSurface) {
        if bins.is_empty() {
            return;
        }

        let (width, height) = surface.size();
        let bar_width = width / bins.len() as f32 * 2.0;
        let mut x = 0.0;

        for (i, &value) in bins.iter().enumerate() {
            let bar_height = value as f32 / 255.0 * height * HEIGHT_FRACTION;
            let color = spectrum_color(i, bins.len(), 1.0);

            surface.fill_rect(x, height - bar_height, bar_width, bar_height, color);
            x += bar_width + 1.0;
        }
    }
}
