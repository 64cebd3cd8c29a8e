use std::f32::consts::PI;

use crate::effects::{spectrum_color, VisualEffect};
use crate::surface::DrawingSurface;

const LINE_WIDTH: f32 = 2.0;

/// Spokes growing outward from a ring around the center.
pub struct Circle;

impl VisualEffect for Circle {
    fn draw(&mut self, bins: &[u8], surface: &mut dyn DrawingSurface) {
        let (width, height) = surface.size();
        let (center_x, center_y) = (width / 2.0, height / 2.0);
        let radius = width.min(height) / 4.0;

        for (i, &value) in bins.iter().enumerate() {
            let angle = i as f32 / bins.len() as f32 * PI * 2.0;
            let amplitude = value as f32 / 255.0 * radius;
            let (sin, cos) = angle.sin_cos();

            let inner = (center_x + cos * radius, center_y + sin * radius);
            let outer = (
                center_x + cos * (radius + amplitude),
                center_y + sin * (radius + amplitude),
            );
            surface.stroke_line(inner, outer, spectrum_color(i, bins.len(), 1.0), LINE_WIDTH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCommand, RecordingSurface};

    fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn spokes_start_on_the_ring() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let bins: Vec<u8> = (0..128).map(|i| (i * 2) as u8).collect();
        Circle.draw(&bins, &mut surface);

        assert_eq!(surface.commands.len(), 128);
        for (i, command) in surface.commands.iter().enumerate() {
            let DrawCommand::Line {
                from, to, width, ..
            } = command
            else {
                panic!("unexpected {:?}", command);
            };
            // Radius is a quarter of the smaller side
            assert!((distance(*from, (400.0, 200.0)) - 100.0).abs() < 1e-2);
            let amplitude = bins[i] as f32 / 255.0 * 100.0;
            assert!((distance(*from, *to) - amplitude).abs() < 1e-2);
            assert_eq!(*width, 2.0);
        }
    }

    #[test]
    fn first_spoke_points_right() {
        let mut surface = RecordingSurface::new(400.0, 400.0);
        Circle.draw(&[255, 0, 0, 0], &mut surface);

        let DrawCommand::Line { from, to, .. } = &surface.commands[0] else {
            panic!("expected a line");
        };
        assert!((from.0 - 300.0).abs() < 1e-3 && (from.1 - 200.0).abs() < 1e-3);
        assert!((to.0 - 400.0).abs() < 1e-3 && (to.1 - 200.0).abs() < 1e-3);
    }
}
