pub(crate) mod bars;
pub(crate) mod circle;
pub(crate) mod particles;
pub(crate) mod wave;

use palette::{FromColor, Hsla, Srgba};

use crate::surface::DrawingSurface;

/// One way of painting a frame of frequency bins.
pub trait VisualEffect {
    fn draw(&mut self, bins: &[u8], surface: &mut dyn DrawingSurface);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VisualizationMode {
    Bars,
    Wave,
    #[default]
    Circle,
    Particles,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 4] = [
        VisualizationMode::Bars,
        VisualizationMode::Wave,
        VisualizationMode::Circle,
        VisualizationMode::Particles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VisualizationMode::Bars => "bars",
            VisualizationMode::Wave => "wave",
            VisualizationMode::Circle => "circle",
            VisualizationMode::Particles => "particles",
        }
    }

    /// Id of the selector button for this mode.
    pub fn selector_id(&self) -> &'static str {
        match self {
            VisualizationMode::Bars => "bars-btn",
            VisualizationMode::Wave => "wave-btn",
            VisualizationMode::Circle => "circle-btn",
            VisualizationMode::Particles => "particles-btn",
        }
    }

    /// Accepts a short name or a selector id.
    pub fn from_id(id: &str) -> Option<VisualizationMode> {
        VisualizationMode::ALL
            .into_iter()
            .find(|mode| mode.name() == id || mode.selector_id() == id)
    }
}

/// Rainbow color for element `index` of `count`, as used by bars, circle and particles.
pub(crate) fn spectrum_color(index: usize, count: usize, alpha: f32) -> Srgba<u8> {
    let hue = if count == 0 {
        0.0
    } else {
        index as f32 / count as f32 * 360.0
    };
    let hsla: Hsla = Hsla::new(hue, 0.7, 0.6, alpha.clamp(0.0, 1.0));
    let rgba: Srgba<f32> = Srgba::from_color(hsla);
    rgba.into_format()
}
