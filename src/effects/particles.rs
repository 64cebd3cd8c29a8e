use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::{spectrum_color, VisualEffect};
use crate::surface::DrawingSurface;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

impl Particle {
    /// Moves by the velocity scaled with `1 + intensity` and bounces off
    /// the edges of a `width` x `height` box.
    fn advance(&mut self, intensity: f32, width: f32, height: f32) {
        self.x += self.vx * (1.0 + intensity);
        self.y += self.vy * (1.0 + intensity);

        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
        }

        self.x = self.x.clamp(0.0, width.max(0.0));
        self.y = self.y.clamp(0.0, height.max(0.0));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParticleState {
    Uninitialized,
    Active(Vec<Particle>),
}

/// A swarm that speeds up and lights up with the overall level.
///
/// The swarm is spawned on the first frame drawn and lives as long as the
/// effect does.
pub struct Particles {
    count: usize,
    rng: StdRng,
    state: ParticleState,
}

impl Particles {
    pub fn new(count: usize, rng: StdRng) -> Particles {
        Particles {
            count,
            rng,
            state: ParticleState::Uninitialized,
        }
    }

    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    fn spawn(&mut self, width: f32, height: f32) -> Vec<Particle> {
        (0..self.count)
            .map(|_| Particle {
                x: self.rng.gen::<f32>() * width,
                y: self.rng.gen::<f32>() * height,
                vx: self.rng.gen_range(-1.0..1.0),
                vy: self.rng.gen_range(-1.0..1.0),
                radius: self.rng.gen_range(1.0..4.0),
            })
            .collect()
    }
}

impl VisualEffect for Particles {
    fn draw(&mut self, bins: &[u8], surface: &mut dyn DrawingSurface) {
        let (width, height) = surface.size();

        if self.state == ParticleState::Uninitialized {
            let particles = self.spawn(width, height);
            log::debug!("Spawned {} particles", particles.len());
            self.state = ParticleState::Active(particles);
        }
        let ParticleState::Active(particles) = &mut self.state else {
            return;
        };

        let intensity = if bins.is_empty() {
            0.0
        } else {
            bins.iter().map(|&v| v as f32).sum::<f32>() / bins.len() as f32 / 255.0
        };

        let count = particles.len();
        for (index, particle) in particles.iter_mut().enumerate() {
            particle.advance(intensity, width, height);
            surface.fill_circle(
                (particle.x, particle.y),
                particle.radius * (1.0 + intensity),
                spectrum_color(index, count, intensity),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCommand, RecordingSurface};
    use rand::SeedableRng;

    fn swarm(count: usize) -> Particles {
        Particles::new(count, StdRng::seed_from_u64(7))
    }

    fn active(particles: &Particles) -> &[Particle] {
        match particles.state() {
            ParticleState::Active(particles) => particles,
            ParticleState::Uninitialized => panic!("swarm not spawned"),
        }
    }

    #[test]
    fn swarm_spawns_on_first_draw() {
        let mut particles = swarm(100);
        assert_eq!(*particles.state(), ParticleState::Uninitialized);

        let mut surface = RecordingSurface::new(300.0, 200.0);
        particles.draw(&[0; 128], &mut surface);

        let spawned = active(&particles);
        assert_eq!(spawned.len(), 100);
        for particle in spawned {
            assert!((0.0..=300.0).contains(&particle.x));
            assert!((0.0..=200.0).contains(&particle.y));
            assert!((-1.0..=1.0).contains(&particle.vx));
            assert!((-1.0..=1.0).contains(&particle.vy));
            assert!((1.0..=4.0).contains(&particle.radius));
        }
        assert_eq!(surface.commands.len(), 100);
    }

    #[test]
    fn particles_stay_inside_the_surface() {
        let mut particles = swarm(100);
        let mut surface = RecordingSurface::new(120.0, 80.0);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..2000 {
            let bins: Vec<u8> = (0..128).map(|_| rng.gen()).collect();
            particles.draw(&bins, &mut surface);

            for particle in active(&particles) {
                assert!((0.0..=120.0).contains(&particle.x), "x = {}", particle.x);
                assert!((0.0..=80.0).contains(&particle.y), "y = {}", particle.y);
            }
        }
    }

    #[test]
    fn crossing_an_edge_reverses_velocity() {
        let mut particle = Particle {
            x: 99.5,
            y: 0.5,
            vx: 1.0,
            vy: -1.0,
            radius: 2.0,
        };
        particle.advance(0.0, 100.0, 100.0);

        assert_eq!((particle.x, particle.y), (100.0, 0.0));
        assert_eq!((particle.vx, particle.vy), (-1.0, 1.0));

        particle.advance(0.0, 100.0, 100.0);
        assert_eq!((particle.x, particle.y), (99.0, 1.0));
    }

    #[test]
    fn intensity_scales_speed_size_and_alpha() {
        let mut particles = swarm(1);
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        particles.draw(&[0; 4], &mut surface);
        let before = active(&particles)[0].clone();

        particles.draw(&[255; 4], &mut surface);
        let after = active(&particles)[0].clone();

        // Far from the edges the step is exactly twice the velocity
        if (10.0..990.0).contains(&before.x) && (10.0..990.0).contains(&before.y) {
            assert!((after.x - before.x - 2.0 * before.vx).abs() < 1e-3);
            assert!((after.y - before.y - 2.0 * before.vy).abs() < 1e-3);
        }

        let DrawCommand::Circle { radius, color, .. } = surface.commands.last().unwrap() else {
            panic!("expected a circle");
        };
        assert_eq!(*radius, before.radius * 2.0);
        assert_eq!(color.alpha, 255);
    }
}
