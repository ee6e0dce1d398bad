//! Tracing a curve through the field from its seed.
//!
//! A curve grows forward along the field and backward against it, each pass
//! running `ceil(steps / 2)` iterations. With collision detection on, a pass
//! stops as soon as its sensing footprint touches a cell owned by another
//! curve, and otherwise claims its own (wider) footprint.

use flow_art_core::Settings;
use glam::DVec2;

use crate::curve::CurvePoint;
use crate::flow_field::FlowField;
use crate::occupancy::OccupancyGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Stroke width at iteration `n` of a pass.
pub fn tapered_weight(base: f64, n: usize, settings: &Settings) -> f64 {
    if !settings.tapering || settings.steps == 0 {
        return base;
    }
    let progress = (2 * n) as f64 / settings.steps as f64;
    let end = base * (1.0 - settings.taper_strength);
    base + (end - base) * progress
}

/// Runs one growth pass and returns its points, seed first.
pub fn trace(
    field: &FlowField,
    occupancy: &mut OccupancyGrid,
    settings: &Settings,
    start: DVec2,
    direction: Direction,
    base_weight: f64,
    id: u32,
) -> Vec<CurvePoint> {
    let collide = settings.collision_detection && !settings.follow_pointer;
    let iterations = settings.steps.div_ceil(2);
    let mut points = Vec::with_capacity(iterations);
    let mut pos = start;

    for n in 0..iterations {
        let g = field.to_grid(pos);
        if !field.contains_grid(g) {
            break;
        }

        let weight = tapered_weight(base_weight, n, settings);

        // Off-canvas points (inside the field margin) neither sense nor claim.
        if collide && occupancy.owner(pos).is_some() {
            let half = weight / 2.0;
            if occupancy.check(pos, half + settings.collision_buffer, id) {
                break;
            }
            occupancy.claim(pos, half + settings.collision_radius, id);
        }

        let angle = field.angle_at(g.x, g.y);
        points.push(CurvePoint { pos, weight, angle });
        pos += settings.step_length * DVec2::new(angle.cos(), angle.sin()) * direction.sign();
    }
    points
}

/// Grows both passes from `start` and splices them: the backward pass
/// reversed without its copy of the seed, then the forward pass.
pub fn grow(
    field: &FlowField,
    occupancy: &mut OccupancyGrid,
    settings: &Settings,
    start: DVec2,
    base_weight: f64,
    id: u32,
) -> Vec<CurvePoint> {
    let forward = trace(
        field,
        occupancy,
        settings,
        start,
        Direction::Forward,
        base_weight,
        id,
    );
    let backward = trace(
        field,
        occupancy,
        settings,
        start,
        Direction::Backward,
        base_weight,
        id,
    );
    backward
        .into_iter()
        .skip(1)
        .rev()
        .chain(forward)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_art_core::Xorshift64;
    use serde_json::json;

    fn setup(overrides: serde_json::Value) -> (FlowField, OccupancyGrid, Settings) {
        let s = Settings::from_json(&overrides).sanitized();
        let mut rng = Xorshift64::from_seed32(s.seed);
        let field = FlowField::build(200, 150, &s, &mut rng).unwrap();
        let occ = OccupancyGrid::for_canvas(200.0, 150.0, s.occupancy_cell_size).unwrap();
        (field, occ, s)
    }

    #[test]
    fn taper_runs_from_base_toward_narrow_end() {
        let s = Settings::from_json(&json!({"steps": 100, "taper_strength": 0.5}));
        assert_eq!(tapered_weight(4.0, 0, &s), 4.0);
        assert!((tapered_weight(4.0, 25, &s) - 3.0).abs() < 1e-12);
        let flat = Settings::from_json(&json!({"tapering": false}));
        assert_eq!(tapered_weight(4.0, 40, &flat), 4.0);
    }

    #[test]
    fn pass_length_is_half_the_steps() {
        let (field, mut occ, s) = setup(json!({
            "collision_detection": false, "steps": 21, "step_length": 0.5, "num_zones": 0
        }));
        let pts = trace(
            &field,
            &mut occ,
            &s,
            DVec2::new(100.0, 75.0),
            Direction::Forward,
            1.0,
            1,
        );
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0].pos, DVec2::new(100.0, 75.0));
    }

    #[test]
    fn consecutive_points_are_one_step_apart() {
        let (field, mut occ, s) = setup(json!({"collision_detection": false, "steps": 40}));
        let pts = grow(&field, &mut occ, &s, DVec2::new(90.0, 60.0), 2.0, 1);
        for w in pts.windows(2) {
            assert!((w[0].pos.distance(w[1].pos) - s.step_length).abs() < 1e-9);
        }
    }

    #[test]
    fn splice_keeps_a_single_seed() {
        let (field, mut occ, s) = setup(json!({"collision_detection": false, "steps": 10}));
        let start = DVec2::new(100.0, 75.0);
        let pts = grow(&field, &mut occ, &s, start, 1.0, 1);
        assert_eq!(pts.iter().filter(|p| p.pos == start).count(), 1);
        assert_eq!(pts.len(), 9);
        assert_eq!(pts[4].pos, start);
    }

    #[test]
    fn seed_outside_field_grows_nothing() {
        let (field, mut occ, s) = setup(json!({}));
        let pts = grow(&field, &mut occ, &s, DVec2::new(-1000.0, 0.0), 1.0, 1);
        assert!(pts.is_empty());
    }

    #[test]
    fn growth_claims_cells_with_its_id() {
        let (field, mut occ, s) = setup(json!({"steps": 20}));
        let pts = grow(&field, &mut occ, &s, DVec2::new(100.0, 75.0), 2.0, 9);
        assert!(!pts.is_empty());
        assert_eq!(occ.owner(DVec2::new(100.0, 75.0)), Some(9));
    }

    #[test]
    fn second_curve_stops_at_first() {
        let (field, mut occ, s) = setup(json!({"steps": 60}));
        let start = DVec2::new(100.0, 75.0);
        let first = grow(&field, &mut occ, &s, start, 2.0, 1);
        assert!(first.len() > 1);
        // Same seed: the very first sensing check hits curve 1.
        let second = grow(&field, &mut occ, &s, start, 2.0, 2);
        assert!(second.is_empty());
    }

    #[test]
    fn follow_pointer_disables_collision() {
        let (field, mut occ, s) = setup(json!({"steps": 20, "follow_pointer": true}));
        let start = DVec2::new(100.0, 75.0);
        grow(&field, &mut occ, &s, start, 2.0, 1);
        assert_eq!(occ.claimed_cells(), 0);
        let again = grow(&field, &mut occ, &s, start, 2.0, 2);
        assert!(again.len() > 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn points_stay_inside_the_field(
                seed in any::<u32>(),
                x in 0.0_f64..200.0,
                y in 0.0_f64..150.0,
                step in 0.5_f64..8.0,
            ) {
                let (field, mut occ, s) = setup(json!({
                    "seed": seed, "steps": 300, "step_length": step,
                    "collision_detection": false, "field_mode": "vortex"
                }));
                for p in grow(&field, &mut occ, &s, DVec2::new(x, y), 1.0, 1) {
                    prop_assert!(field.contains_grid(field.to_grid(p.pos)));
                    prop_assert!(p.weight.is_finite() && p.angle.is_finite());
                }
            }
        }
    }
}
