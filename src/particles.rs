//! Ambient particle background.
//!
//! Ported from the CodeQuest landing page: drifting dots in the two accent
//! colors, lines between close pairs, gentle attraction toward the pointer.
//! Pure simulation here; the renderer reads positions once per frame.

/// Distance in pixels under which two particles get a connecting line.
pub const CONNECT_DIST: f64 = 140.0;
/// Pointer attraction radius.
pub const MOUSE_RADIUS: f64 = 200.0;
/// Per-axis acceleration scale toward the pointer.
const MOUSE_ACCEL: f64 = 0.0007;
/// Random drift applied each step.
const JITTER: f64 = 0.000_15;
/// Speed clamp per axis.
const MAX_SPEED: f64 = 1.2;
const AREA_PER_PARTICLE: f64 = 150_000.0;
const MIN_COUNT: usize = 60;

/// Which of the two accent colors a particle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentHue {
    Violet,
    Cyan,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub hue: AccentHue,
}

/// Xorshift64 — enough randomness for decoration, no crate needed.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed | 1,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    mouse: Option<(f64, f64)>,
    rng: XorShift64,
}

impl ParticleField {
    pub fn new(width: f64, height: f64) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            width,
            height,
            mouse: None,
            rng: XorShift64::new(0x5eed_c0de_5eed_c0de),
        };
        field.seed();
        field
    }

    /// Density-scaled population, floored so small windows stay lively.
    pub fn target_count(width: f64, height: f64) -> usize {
        let by_area = (width * height / AREA_PER_PARTICLE).floor() as usize;
        by_area.max(MIN_COUNT)
    }

    fn seed(&mut self) {
        let count = Self::target_count(self.width, self.height);
        self.particles.clear();
        self.particles.reserve(count);
        for i in 0..count {
            let x = self.rng.next_f64() * self.width;
            let y = self.rng.next_f64() * self.height;
            let vx = (self.rng.next_f64() - 0.5) * 0.6;
            let vy = (self.rng.next_f64() - 0.5) * 0.6;
            let radius = 0.8 + self.rng.next_f64() * 1.0;
            let hue = if i % 2 == 0 {
                AccentHue::Violet
            } else {
                AccentHue::Cyan
            };
            self.particles.push(Particle {
                x,
                y,
                vx,
                vy,
                radius,
                hue,
            });
        }
    }

    /// Reset for a new surface size. Particle positions do not survive a
    /// resize; the population is re-derived from the new area.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.seed();
    }

    pub fn set_mouse(&mut self, x: f64, y: f64) {
        self.mouse = Some((x, y));
    }

    pub fn clear_mouse(&mut self) {
        self.mouse = None;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Pairs close enough to draw a line between, with a 0..1 strength that
    /// fades with distance.
    pub fn connections(&self) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::new();
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let dx = self.particles[i].x - self.particles[j].x;
                let dy = self.particles[i].y - self.particles[j].y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < CONNECT_DIST {
                    out.push((i, j, 1.0 - dist / CONNECT_DIST));
                }
            }
        }
        out
    }

    pub fn step(&mut self) {
        let mouse = self.mouse;
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            if let Some((mx, my)) = mouse {
                let dx = mx - p.x;
                let dy = my - p.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 && dist < MOUSE_RADIUS {
                    p.vx += (dx / dist) * MOUSE_ACCEL * dist;
                    p.vy += (dy / dist) * MOUSE_ACCEL * dist;
                }
            }

            p.vx += (self.rng.next_f64() - 0.5) * 2.0 * JITTER;
            p.vy += (self.rng.next_f64() - 0.5) * 2.0 * JITTER;
            p.vx = p.vx.clamp(-MAX_SPEED, MAX_SPEED);
            p.vy = p.vy.clamp(-MAX_SPEED, MAX_SPEED);

            p.x += p.vx;
            p.y += p.vy;

            // Reflect off the edges.
            if p.x < 0.0 {
                p.x = -p.x;
                p.vx = -p.vx;
            } else if p.x > w {
                p.x = 2.0 * w - p.x;
                p.vx = -p.vx;
            }
            if p.y < 0.0 {
                p.y = -p.y;
                p.vy = -p.vy;
            } else if p.y > h {
                p.y = 2.0 * h - p.y;
                p.vy = -p.vy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_scales_with_area() {
        // Small windows hit the floor.
        assert_eq!(ParticleField::target_count(800.0, 600.0), 60);
        // 1920x1080 = 2_073_600 px -> 13 by area, still floored.
        assert_eq!(ParticleField::target_count(1920.0, 1080.0), 60);
        // Huge virtual surface exceeds the floor.
        assert_eq!(ParticleField::target_count(6000.0, 4000.0), 160);
    }

    #[test]
    fn particles_stay_in_bounds() {
        let mut field = ParticleField::new(640.0, 480.0);
        field.set_mouse(320.0, 240.0);
        for _ in 0..2_000 {
            field.step();
        }
        for p in field.particles() {
            assert!(p.x >= 0.0 && p.x <= 640.0, "x out of bounds: {}", p.x);
            assert!(p.y >= 0.0 && p.y <= 480.0, "y out of bounds: {}", p.y);
        }
    }

    #[test]
    fn velocity_is_clamped() {
        let mut field = ParticleField::new(640.0, 480.0);
        field.set_mouse(320.0, 240.0);
        for _ in 0..2_000 {
            field.step();
        }
        for p in field.particles() {
            assert!(p.vx.abs() <= MAX_SPEED);
            assert!(p.vy.abs() <= MAX_SPEED);
        }
    }

    #[test]
    fn resize_reseeds_to_new_bounds() {
        let mut field = ParticleField::new(640.0, 480.0);
        field.resize(6000.0, 4000.0);
        assert_eq!(field.particles().len(), 160);
        for p in field.particles() {
            assert!(p.x <= 6000.0 && p.y <= 4000.0);
        }
    }

    #[test]
    fn connections_fade_with_distance() {
        let mut field = ParticleField::new(640.0, 480.0);
        field.particles.clear();
        let base = Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            hue: AccentHue::Violet,
        };
        field.particles.push(Particle { x: 10.0, ..base.clone() });
        field.particles.push(Particle { x: 80.0, ..base.clone() });
        field.particles.push(Particle { x: 400.0, ..base });

        let conns = field.connections();
        assert_eq!(conns.len(), 1);
        let (i, j, strength) = conns[0];
        assert_eq!((i, j), (0, 1));
        assert!(strength > 0.0 && strength < 1.0);
    }
}
