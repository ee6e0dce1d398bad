//! Where curves start.
//!
//! Grid and random modes produce their whole seed list up front. Circle
//! packing is interleaved with growth: a candidate is only accepted when its
//! occupancy cell is still free and no earlier seed lies within the minimum
//! separation, so it has to see the occupancy left by previous curves.

use std::collections::HashMap;
use std::iter::successors;

use flow_art_core::Xorshift64;
use glam::DVec2;

use crate::occupancy::OccupancyGrid;

/// Bucket grid over accepted seeds with cell size equal to the query radius,
/// so a proximity query only visits the 3x3 buckets around a point.
#[derive(Debug, Clone, Default)]
pub struct SeedIndex {
    cell: f64,
    buckets: HashMap<(i64, i64), Vec<DVec2>>,
    len: usize,
}

impl SeedIndex {
    /// A non-positive or non-finite `cell` disables the index: nothing is
    /// stored and every query is empty.
    pub fn new(cell: f64) -> Self {
        Self {
            cell: if cell.is_finite() && cell > 0.0 { cell } else { 0.0 },
            buckets: HashMap::new(),
            len: 0,
        }
    }

    fn enabled(&self) -> bool {
        self.cell > 0.0
    }

    fn bucket_of(&self, p: DVec2) -> (i64, i64) {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
        )
    }

    pub fn insert(&mut self, p: DVec2) {
        if !self.enabled() {
            return;
        }
        let key = self.bucket_of(p);
        self.buckets.entry(key).or_default().push(p);
        self.len += 1;
    }

    /// True iff a stored point lies strictly closer than `radius` to `p`.
    ///
    /// `radius` must not exceed the cell size.
    pub fn has_within(&self, p: DVec2, radius: f64) -> bool {
        if !self.enabled() || radius <= 0.0 {
            return false;
        }
        let (bx, by) = self.bucket_of(p);
        let r2 = radius * radius;
        (-1..=1)
            .flat_map(|dx| {
                (-1..=1).map(move |dy| (bx.saturating_add(dx), by.saturating_add(dy)))
            })
            .filter_map(|key| self.buckets.get(&key))
            .flatten()
            .any(|q| q.distance_squared(p) < r2)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Seed acceptance for the circle packing mode.
#[derive(Debug, Clone)]
pub struct CirclePacking {
    index: SeedIndex,
    min_separation: f64,
    max_attempts: usize,
}

impl CirclePacking {
    pub fn new(min_separation: f64, max_attempts: usize) -> Self {
        Self {
            index: SeedIndex::new(min_separation),
            min_separation,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Uniform candidate on the canvas, x drawn before y.
    pub fn candidate(rng: &mut Xorshift64, width: f64, height: f64) -> DVec2 {
        let x = rng.next_range(0.0, width);
        let y = rng.next_range(0.0, height);
        DVec2::new(x, y)
    }

    /// True iff `p` sits on an unclaimed occupancy cell and keeps the
    /// minimum separation from every recorded seed.
    pub fn accepts(&self, p: DVec2, occupancy: &OccupancyGrid) -> bool {
        occupancy.is_free(p) && !self.index.has_within(p, self.min_separation)
    }

    pub fn record(&mut self, p: DVec2) {
        self.index.insert(p);
    }

    pub fn recorded(&self) -> usize {
        self.index.len()
    }
}

/// Regular lattice with spacing `sqrt(width * height / n)`, starting at the
/// origin, column by column.
pub fn grid_seeds(width: f64, height: f64, n: usize) -> Vec<DVec2> {
    if n == 0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let spacing = (width * height / n as f64).sqrt();
    let axis = |limit: f64| {
        successors(Some(0.0_f64), move |v| Some(v + spacing)).take_while(move |&v| v < limit)
    };
    axis(width)
        .flat_map(|x| axis(height).map(move |y| DVec2::new(x, y)))
        .collect()
}

/// `n` uniform points on the canvas.
pub fn random_seeds(rng: &mut Xorshift64, width: f64, height: f64, n: usize) -> Vec<DVec2> {
    (0..n)
        .map(|_| CirclePacking::candidate(rng, width, height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_finds_close_points_across_buckets() {
        let mut idx = SeedIndex::new(10.0);
        idx.insert(DVec2::new(9.5, 9.5));
        assert!(idx.has_within(DVec2::new(10.5, 10.5), 10.0));
        assert!(!idx.has_within(DVec2::new(25.0, 9.5), 10.0));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn index_distance_is_strict() {
        let mut idx = SeedIndex::new(5.0);
        idx.insert(DVec2::ZERO);
        assert!(!idx.has_within(DVec2::new(5.0, 0.0), 5.0));
        assert!(idx.has_within(DVec2::new(4.999, 0.0), 5.0));
    }

    #[test]
    fn disabled_index_never_matches() {
        for cell in [0.0, -3.0, f64::NAN] {
            let mut idx = SeedIndex::new(cell);
            idx.insert(DVec2::new(1.0, 1.0));
            assert!(!idx.has_within(DVec2::new(1.0, 1.0), 1.0));
            assert!(idx.is_empty());
        }
    }

    #[test]
    fn minute_cells_saturate_bucket_keys() {
        let mut idx = SeedIndex::new(1e-150);
        idx.insert(DVec2::new(40.0, 30.0));
        assert!(idx.has_within(DVec2::new(40.0, 30.0), 1e-150));
        assert!(!idx.has_within(DVec2::new(-40.0, 30.0), 1e-150));
    }

    #[test]
    fn index_handles_negative_coordinates() {
        let mut idx = SeedIndex::new(4.0);
        idx.insert(DVec2::new(-0.5, -0.5));
        assert!(idx.has_within(DVec2::new(0.5, 0.5), 4.0));
    }

    #[test]
    fn packing_rejects_claimed_cells_and_near_seeds() {
        let mut occ = OccupancyGrid::for_canvas(100.0, 100.0, 1.0).unwrap();
        let mut packing = CirclePacking::new(10.0, 50);
        let p = DVec2::new(50.0, 50.0);
        assert!(packing.accepts(p, &occ));
        packing.record(p);
        assert!(!packing.accepts(DVec2::new(55.0, 50.0), &occ));
        assert!(packing.accepts(DVec2::new(70.0, 50.0), &occ));
        occ.claim(DVec2::new(70.0, 50.0), 0.0, 3);
        assert!(!packing.accepts(DVec2::new(70.0, 50.0), &occ));
        assert_eq!(packing.recorded(), 1);
    }

    #[test]
    fn packing_rejects_off_canvas() {
        let occ = OccupancyGrid::for_canvas(10.0, 10.0, 1.0).unwrap();
        let packing = CirclePacking::new(0.0, 1);
        assert!(!packing.accepts(DVec2::new(-1.0, 5.0), &occ));
        assert!(!packing.accepts(DVec2::new(5.0, 10.0), &occ));
    }

    #[test]
    fn grid_seeds_cover_canvas_from_origin() {
        let seeds = grid_seeds(100.0, 100.0, 100);
        assert_eq!(seeds.len(), 100);
        assert_eq!(seeds[0], DVec2::ZERO);
        assert_eq!(seeds[1], DVec2::new(0.0, 10.0));
        assert!(seeds.iter().all(|p| p.x < 100.0 && p.y < 100.0));
    }

    #[test]
    fn grid_seeds_empty_for_zero_curves() {
        assert!(grid_seeds(100.0, 100.0, 0).is_empty());
    }

    #[test]
    fn random_seeds_are_deterministic_and_on_canvas() {
        let a = random_seeds(&mut Xorshift64::new(5), 300.0, 200.0, 64);
        let b = random_seeds(&mut Xorshift64::new(5), 300.0, 200.0, 64);
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|p| (0.0..300.0).contains(&p.x) && (0.0..200.0).contains(&p.y)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn index_agrees_with_brute_force(
                pts in prop::collection::vec((-50.0_f64..50.0, -50.0_f64..50.0), 0..40),
                qx in -50.0_f64..50.0,
                qy in -50.0_f64..50.0,
                r in 0.5_f64..15.0,
            ) {
                let mut idx = SeedIndex::new(r);
                for &(x, y) in &pts {
                    idx.insert(DVec2::new(x, y));
                }
                let q = DVec2::new(qx, qy);
                let brute = pts.iter().any(|&(x, y)| DVec2::new(x, y).distance_squared(q) < r * r);
                prop_assert_eq!(idx.has_within(q, r), brute);
            }
        }
    }
}
