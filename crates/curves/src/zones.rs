//! Localized angle modifiers: zones, obstacles and the pointer swirl.
//!
//! Each [`Influence`] bends a field angle toward its own target angle with a
//! weight that falls linearly from its center to its radius. They compose by
//! applying one after another in a fixed order.

use std::f64::consts::FRAC_PI_2;

use flow_art_core::Xorshift64;
use glam::DVec2;

use crate::flow_field::lerp_angle;

/// Obstacle push-away weight at the obstacle center.
pub const OBSTACLE_WEIGHT: f64 = 0.8;
/// Reach of the pointer swirl in pixels.
pub const POINTER_RADIUS: f64 = 250.0;
/// Pointer swirl weight at the pointer position.
pub const POINTER_WEIGHT: f64 = 0.6;

/// Something that bends the flow angle near a point.
pub trait Influence: Send + Sync {
    /// Returns `angle` adjusted for a sample at `p`.
    fn apply(&self, p: DVec2, angle: f64) -> f64;
}

/// 1 at the center, 0 at `radius` and beyond.
pub fn falloff(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 || distance >= radius {
        0.0
    } else {
        1.0 - distance / radius
    }
}

/// Direction from `center` to `p`.
fn away(center: DVec2, p: DVec2) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    /// Flow circulates around the center.
    Vortex,
    /// Flow points at the center.
    Sink,
    /// Flow points away from the center.
    Source,
}

impl ZoneKind {
    const ALL: [ZoneKind; 3] = [ZoneKind::Vortex, ZoneKind::Sink, ZoneKind::Source];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub center: DVec2,
    pub radius: f64,
    pub kind: ZoneKind,
    pub strength: f64,
}

impl Zone {
    /// Places a zone uniformly on the canvas with radius in [200, 600).
    pub fn random(rng: &mut Xorshift64, width: f64, height: f64, strength: f64) -> Self {
        let center = DVec2::new(rng.next_range(0.0, width), rng.next_range(0.0, height));
        let radius = rng.next_range(200.0, 600.0);
        let kind = ZoneKind::ALL[rng.next_usize(ZoneKind::ALL.len())];
        Self {
            center,
            radius,
            kind,
            strength,
        }
    }

    pub fn target_angle(&self, p: DVec2) -> f64 {
        match self.kind {
            ZoneKind::Vortex => away(self.center, p) + FRAC_PI_2,
            ZoneKind::Sink => away(p, self.center),
            ZoneKind::Source => away(self.center, p),
        }
    }
}

impl Influence for Zone {
    fn apply(&self, p: DVec2, angle: f64) -> f64 {
        let d = p.distance(self.center);
        if d >= self.radius {
            return angle;
        }
        let t = falloff(d, self.radius) * self.strength;
        lerp_angle(angle, self.target_angle(p), t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: DVec2,
    pub radius: f64,
}

impl Obstacle {
    /// Places an obstacle uniformly on the canvas with radius in [50, 200).
    pub fn random(rng: &mut Xorshift64, width: f64, height: f64) -> Self {
        let center = DVec2::new(rng.next_range(0.0, width), rng.next_range(0.0, height));
        let radius = rng.next_range(50.0, 200.0);
        Self { center, radius }
    }
}

impl Influence for Obstacle {
    fn apply(&self, p: DVec2, angle: f64) -> f64 {
        let d = p.distance(self.center);
        if d >= self.radius {
            return angle;
        }
        let t = falloff(d, self.radius) * OBSTACLE_WEIGHT;
        lerp_angle(angle, away(self.center, p), t)
    }
}

/// Vortex around the pointer, applied at lookup time only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSwirl {
    pub center: DVec2,
}

impl Influence for PointerSwirl {
    fn apply(&self, p: DVec2, angle: f64) -> f64 {
        let d = p.distance(self.center);
        if d >= POINTER_RADIUS {
            return angle;
        }
        let t = falloff(d, POINTER_RADIUS) * POINTER_WEIGHT;
        lerp_angle(angle, away(self.center, p) + FRAC_PI_2, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    fn same_direction(a: f64, b: f64) -> bool {
        let d = (a - b).rem_euclid(TAU);
        d < 1e-9 || TAU - d < 1e-9
    }

    #[test]
    fn falloff_is_linear_and_clamped() {
        assert_eq!(falloff(0.0, 10.0), 1.0);
        assert_eq!(falloff(5.0, 10.0), 0.5);
        assert_eq!(falloff(10.0, 10.0), 0.0);
        assert_eq!(falloff(20.0, 10.0), 0.0);
        assert_eq!(falloff(1.0, 0.0), 0.0);
    }

    #[test]
    fn zone_targets() {
        let c = DVec2::new(100.0, 100.0);
        let p = DVec2::new(150.0, 100.0);
        let mk = |kind| Zone {
            center: c,
            radius: 300.0,
            kind,
            strength: 1.0,
        };
        assert!(same_direction(mk(ZoneKind::Source).target_angle(p), 0.0));
        assert!(same_direction(mk(ZoneKind::Sink).target_angle(p), PI));
        assert!(same_direction(mk(ZoneKind::Vortex).target_angle(p), FRAC_PI_2));
    }

    #[test]
    fn zone_outside_radius_leaves_angle() {
        let z = Zone {
            center: DVec2::ZERO,
            radius: 10.0,
            kind: ZoneKind::Sink,
            strength: 1.0,
        };
        assert_eq!(z.apply(DVec2::new(50.0, 0.0), 1.234), 1.234);
    }

    #[test]
    fn full_strength_zone_at_center_snaps_to_target() {
        let z = Zone {
            center: DVec2::ZERO,
            radius: 100.0,
            kind: ZoneKind::Source,
            strength: 1.0,
        };
        // Just off-center so the target is defined; weight is ~1.
        let p = DVec2::new(1e-6, 0.0);
        assert!((z.apply(p, 2.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn zero_strength_zone_is_inert() {
        let z = Zone {
            center: DVec2::ZERO,
            radius: 100.0,
            kind: ZoneKind::Vortex,
            strength: 0.0,
        };
        assert_eq!(z.apply(DVec2::new(10.0, 10.0), 0.7), 0.7);
    }

    #[test]
    fn random_zone_ranges() {
        let mut rng = Xorshift64::new(4);
        for _ in 0..200 {
            let z = Zone::random(&mut rng, 800.0, 600.0, 0.5);
            assert!((0.0..800.0).contains(&z.center.x));
            assert!((0.0..600.0).contains(&z.center.y));
            assert!((200.0..600.0).contains(&z.radius));
            assert_eq!(z.strength, 0.5);
        }
    }

    #[test]
    fn random_obstacle_ranges() {
        let mut rng = Xorshift64::new(4);
        for _ in 0..200 {
            let o = Obstacle::random(&mut rng, 300.0, 200.0);
            assert!((50.0..200.0).contains(&o.radius));
        }
    }

    #[test]
    fn obstacle_pushes_away() {
        let o = Obstacle {
            center: DVec2::ZERO,
            radius: 100.0,
        };
        // Halfway out, weight 0.4 toward "away" (angle 0) from PI/2.
        let a = o.apply(DVec2::new(50.0, 0.0), FRAC_PI_2);
        assert!((a - FRAC_PI_2 * 0.6).abs() < 1e-9, "got {a}");
    }

    #[test]
    fn pointer_swirl_has_fixed_reach() {
        let s = PointerSwirl { center: DVec2::ZERO };
        assert_eq!(s.apply(DVec2::new(300.0, 0.0), 0.3), 0.3);
        assert_ne!(s.apply(DVec2::new(100.0, 0.0), 0.3), 0.3);
    }
}
