//! Curve data and the per-curve draws made before growth.

use flow_art_core::color::{hsb_to_srgb, mix_oklab};
use flow_art_core::settings::{ColorMode, ThicknessMode};
use flow_art_core::{FractalNoise, Palette, Rgba, Settings, Srgb, ThicknessScale, Xorshift64};
use glam::DVec2;

use crate::flow_field::map_range;

/// Gradient color mode endpoints, left to right across the canvas.
pub const GRADIENT_FROM: [u8; 3] = [74, 158, 255];
pub const GRADIENT_TO: [u8; 3] = [255, 74, 158];
/// White color mode stroke on the paper background.
pub const INK: [u8; 3] = [40, 40, 40];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub pos: DVec2,
    /// Stroke width at this point, after tapering.
    pub weight: f64,
    /// Field angle sampled here.
    pub angle: f64,
}

/// A grown curve: at least two points, ordered from the end of the backward
/// pass through the seed to the end of the forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub id: u32,
    pub points: Vec<CurvePoint>,
    pub color: Rgba,
    pub base_weight: f64,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive point pairs, one per drawn segment.
    pub fn segments(&self) -> impl Iterator<Item = (&CurvePoint, &CurvePoint)> {
        self.points.iter().zip(self.points.iter().skip(1))
    }
}

/// Lookup tables resolved once per generation pass.
#[derive(Debug, Clone)]
pub struct CurveTables {
    pub palette: Palette,
    pub thickness: ThicknessScale,
}

impl CurveTables {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            palette: Palette::from_name(&settings.palette),
            thickness: ThicknessScale::from_name(&settings.thickness_scale),
        }
    }
}

/// Base stroke width for a curve seeded at `seed`.
pub fn base_thickness(
    seed: DVec2,
    settings: &Settings,
    tables: &CurveTables,
    noise: &FractalNoise,
    rng: &mut Xorshift64,
) -> f64 {
    match settings.thickness_mode {
        ThicknessMode::Constant => settings.stroke_weight,
        ThicknessMode::Fidenza => tables.thickness.sample(rng),
        ThicknessMode::Random => rng.next_range(settings.min_thickness, settings.max_thickness),
        ThicknessMode::Noise => {
            let n = noise.fbm(seed.x * 0.005, seed.y * 0.005);
            map_range(
                n,
                -1.0,
                1.0,
                settings.min_thickness,
                settings.max_thickness,
            )
        }
    }
}

/// Stroke color for a curve seeded at `seed` on a canvas `width` wide.
pub fn curve_color(
    seed: DVec2,
    width: f64,
    settings: &Settings,
    tables: &CurveTables,
    noise: &FractalNoise,
    rng: &mut Xorshift64,
) -> Rgba {
    let rgb = match settings.color_mode {
        ColorMode::White if settings.paper_theme => {
            let [r, g, b] = INK;
            Srgb::from_rgb8(r, g, b)
        }
        ColorMode::White => Srgb::WHITE,
        ColorMode::Palette => tables.palette.choose(rng),
        ColorMode::Gradient => {
            let [fr, fg, fb] = GRADIENT_FROM;
            let [tr, tg, tb] = GRADIENT_TO;
            let t = if width > 0.0 { seed.x / width } else { 0.0 };
            mix_oklab(Srgb::from_rgb8(fr, fg, fb), Srgb::from_rgb8(tr, tg, tb), t)
        }
        ColorMode::Noise => {
            let n = noise.fbm(seed.x * 0.01, seed.y * 0.01);
            hsb_to_srgb(map_range(n, -1.0, 1.0, 180.0, 240.0), 0.8, 1.0)
        }
    };
    rgb.with_alpha(settings.opacity / 255.0)
}
