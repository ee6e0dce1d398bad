//! The flow field: a grid of angles covering a margin-expanded canvas.
//!
//! Cell `(i, j)` sits at world position
//! `(i * resolution - width * margin, j * resolution - height * margin)`.
//! Its angle starts from the base function selected by `field_mode`, is bent
//! by zones and (optionally) obstacles, then distorted. Lookups between cells
//! interpolate bilinearly along the shortest arc.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use flow_art_core::settings::{Distortion, FieldMode};
use flow_art_core::{FlowError, FractalNoise, Grid, Settings, Xorshift64};
use glam::DVec2;

use crate::zones::{Influence, Obstacle, PointerSwirl, Zone};

/// Interpolates from angle `a` toward `b` along the shorter arc.
///
/// `t = 0` returns `a` exactly; `t = 1` returns an angle equal to `b`
/// modulo 2π. The difference is reduced into (-π, π] first.
pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    let mut diff = (b - a).rem_euclid(TAU);
    if diff > PI {
        diff -= TAU;
    }
    a + diff * t
}

/// Linear remap of `v` from `[a0, a1]` to `[b0, b1]` (unclamped).
pub fn map_range(v: f64, a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    b0 + (v - a0) / (a1 - a0) * (b1 - b0)
}

/// An immutable, built flow field plus its lookup-time options.
#[derive(Debug, Clone)]
pub struct FlowField {
    angles: Grid<f64>,
    width: f64,
    height: f64,
    resolution: f64,
    margin: DVec2,
    zones: Vec<Zone>,
    obstacles: Vec<Obstacle>,
    noise: FractalNoise,
    pointer: Option<PointerSwirl>,
}

impl FlowField {
    /// Builds the field for a `width` x `height` canvas.
    ///
    /// Draws, in order: the noise seed, zones, obstacles, then one angle per
    /// cell when distortion is random. Expects sanitized settings.
    ///
    /// A field narrower than one cell gets a single column (or row), which
    /// has no interpolation cell, so no curve can grow on it.
    pub fn build(
        width: u32,
        height: u32,
        settings: &Settings,
        rng: &mut Xorshift64,
    ) -> Result<Self, FlowError> {
        let (w, h) = (f64::from(width), f64::from(height));
        let res = settings.resolution;
        let margin = DVec2::new(w * settings.margin, h * settings.margin);
        let field_width = w + 2.0 * margin.x;
        let field_height = h + 2.0 * margin.y;
        let cols = ((field_width / res).floor() as usize).max(1);
        let rows = ((field_height / res).floor() as usize).max(1);

        let noise = FractalNoise::from_rng(
            rng,
            settings.octaves,
            settings.persistence,
            settings.lacunarity,
        );
        let zones: Vec<Zone> = (0..settings.num_zones)
            .map(|_| Zone::random(rng, w, h, settings.zone_strength))
            .collect();
        let obstacles: Vec<Obstacle> = if settings.flow_obstacles {
            (0..settings.num_obstacles)
                .map(|_| Obstacle::random(rng, w, h))
                .collect()
        } else {
            Vec::new()
        };

        let center = DVec2::new(w / 2.0, h / 2.0);
        let ns = settings.noise_scale;
        let angle_span = PI * settings.angle_range;
        let quantum = TAU / f64::from(settings.quantize_steps.max(1));

        let angles = Grid::from_fn(cols, rows, |i, j| {
            let p = DVec2::new(i as f64 * res - margin.x, j as f64 * res - margin.y);
            let mut angle = match settings.field_mode {
                FieldMode::Vortex => {
                    (p.y - center.y).atan2(p.x - center.x)
                        + FRAC_PI_2
                        + noise.fbm(p.x * ns, p.y * ns) * 0.5
                }
                FieldMode::Sink => {
                    (center.y - p.y).atan2(center.x - p.x) + noise.fbm(p.x * ns, p.y * ns) * 0.5
                }
                FieldMode::Noise => {
                    let n = noise.fbm(i as f64 * ns * res, j as f64 * ns * res);
                    map_range(n, -1.0, 1.0, 0.0, angle_span)
                }
            };

            for zone in &zones {
                angle = zone.apply(p, angle);
            }
            for obstacle in &obstacles {
                angle = obstacle.apply(p, angle);
            }

            match settings.distortion {
                Distortion::Continuous => angle,
                Distortion::Quantized => (angle / quantum).round() * quantum,
                Distortion::Random => rng.next_angle(),
            }
        })?;

        log::debug!(
            "flow field {}x{} ({:?}, {} zones, {} obstacles)",
            cols,
            rows,
            settings.field_mode,
            zones.len(),
            obstacles.len()
        );

        Ok(Self {
            angles,
            width: w,
            height: h,
            resolution: res,
            margin,
            zones,
            obstacles,
            noise,
            pointer: None,
        })
    }

    /// Enables the pointer swirl around `pointer` (canvas coordinates).
    pub fn with_pointer(mut self, pointer: Option<DVec2>) -> Self {
        self.pointer = pointer.map(|center| PointerSwirl { center });
        self
    }

    pub fn cols(&self) -> usize {
        self.angles.cols()
    }

    pub fn rows(&self) -> usize {
        self.angles.rows()
    }

    pub fn angles(&self) -> &Grid<f64> {
        &self.angles
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// The fBm source the field was built from, reused for noise-driven
    /// thickness and color.
    pub fn noise(&self) -> &FractalNoise {
        &self.noise
    }

    /// Canvas coordinates to fractional grid coordinates.
    pub fn to_grid(&self, p: DVec2) -> DVec2 {
        (p + self.margin) / self.resolution
    }

    /// Fractional grid coordinates to canvas coordinates.
    pub fn to_world(&self, g: DVec2) -> DVec2 {
        g * self.resolution - self.margin
    }

    /// True when `g` has a full interpolation cell: `0 <= g < cols - 1`
    /// (and likewise for rows).
    pub fn contains_grid(&self, g: DVec2) -> bool {
        g.x >= 0.0
            && g.y >= 0.0
            && g.x < self.cols() as f64 - 1.0
            && g.y < self.rows() as f64 - 1.0
    }

    /// Bilinearly interpolated angle at fractional grid coordinates.
    ///
    /// Corner indices are clamped into the grid and the fractional weights
    /// to [0, 1], so any finite input yields a value.
    pub fn angle_at(&self, gx: f64, gy: f64) -> f64 {
        let last_col = self.cols() as isize - 1;
        let last_row = self.rows() as isize - 1;
        let fx = gx.floor();
        let fy = gy.floor();
        let x0 = (fx as isize).clamp(0, last_col);
        let y0 = (fy as isize).clamp(0, last_row);
        let x1 = (fx as isize).saturating_add(1).clamp(0, last_col);
        let y1 = (fy as isize).saturating_add(1).clamp(0, last_row);
        let tx = (gx - x0 as f64).clamp(0.0, 1.0);
        let ty = (gy - y0 as f64).clamp(0.0, 1.0);

        let a00 = self.angles.get_clamped(x0, y0);
        let a10 = self.angles.get_clamped(x1, y0);
        let a01 = self.angles.get_clamped(x0, y1);
        let a11 = self.angles.get_clamped(x1, y1);

        let top = lerp_angle(a00, a10, tx);
        let bottom = lerp_angle(a01, a11, tx);
        let angle = lerp_angle(top, bottom, ty);

        match &self.pointer {
            Some(swirl) => swirl.apply(self.to_world(DVec2::new(gx, gy)), angle),
            None => angle,
        }
    }

    pub fn canvas_size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
}
