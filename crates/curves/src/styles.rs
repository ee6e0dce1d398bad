//! Curve rendering styles.
//!
//! A style turns one grown [`Curve`] into `line` calls on a [`Surface`].
//! Styles never touch the transform stack; symmetry copies are produced by
//! re-running a style under a different transform. All randomness comes from
//! the render PRNG passed in, so a given seed renders the same strokes.
//!
//! [`main_style`] picks the foreground style: watercolor when enabled, else
//! sketched when the grain mode asks for it, else standard.

use flow_art_core::settings::GrainMode;
use flow_art_core::{Settings, Shadow, Srgb, StrokeCap, Surface, Xorshift64};
use glam::DVec2;

use crate::curve::{Curve, CurvePoint};
use crate::flow_field::map_range;

/// Number of parallel strokes in the sketched style.
pub const BRISTLES: usize = 6;

/// How far a non-round segment's end is pushed along the field so that
/// neighbouring segments overlap instead of leaving wedges.
pub const CAP_OVERLAP: f64 = 0.5;

/// Object-safe drawing strategy for a single curve.
pub trait CurveStyle: Send + Sync {
    fn draw(&self, curve: &Curve, surface: &mut dyn Surface, rng: &mut Xorshift64);
}

fn jitter(rng: &mut Xorshift64, amount: f64) -> f64 {
    rng.next_range(-amount, amount)
}

/// End point `b` of the segment leaving `p1`, with the cap overlap applied.
fn overlapped_end(cap: StrokeCap, p1: &CurvePoint, b: DVec2) -> DVec2 {
    match cap {
        StrokeCap::Round => b,
        StrokeCap::Square | StrokeCap::Project => b + DVec2::from_angle(p1.angle) * CAP_OVERLAP,
    }
}

/// Plain strokes with optional endpoint jitter, stroke noise and dashing.
#[derive(Debug, Clone)]
pub struct StandardStyle {
    pub cap: StrokeCap,
    /// Endpoint jitter amplitude; zero disables jitter.
    pub jitter: f64,
    /// Probability that a segment enters the 10 % drop lottery.
    pub grain_density: f64,
    /// `(dash length, gap length, step length)` when segmented.
    pub dashes: Option<(f64, f64, f64)>,
}

impl StandardStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cap: settings.stroke_cap,
            jitter: if settings.grain_mode == GrainMode::Jitter {
                settings.grain_amount
            } else {
                0.0
            },
            grain_density: settings.grain_density,
            dashes: settings.segmented.then_some((
                settings.segment_length,
                settings.segment_gap,
                settings.step_length,
            )),
        }
    }

    /// True when segment `i` (0-based) falls into a gap.
    fn in_gap(&self, i: usize) -> bool {
        match self.dashes {
            Some((len, gap, step)) => {
                let cycle = len + gap;
                cycle > 0.0 && (i as f64 * step) % cycle > len
            }
            None => false,
        }
    }
}

impl CurveStyle for StandardStyle {
    fn draw(&self, curve: &Curve, surface: &mut dyn Surface, rng: &mut Xorshift64) {
        surface.set_stroke_cap(self.cap);
        surface.set_stroke(curve.color);

        for (i, (p1, p2)) in curve.segments().enumerate() {
            if self.in_gap(i) {
                continue;
            }
            surface.set_stroke_width(p2.weight);

            let mut a = p1.pos;
            let mut b = p2.pos;
            if self.jitter > 0.0 {
                a.x += jitter(rng, self.jitter);
                a.y += jitter(rng, self.jitter);
                b.x += jitter(rng, self.jitter);
                b.y += jitter(rng, self.jitter);
            }
            b = overlapped_end(self.cap, p1, b);

            let visible = if self.grain_density > 0.0 && rng.next_f64() < self.grain_density {
                rng.next_f64() > 0.1
            } else {
                true
            };
            if visible {
                surface.line(a.x, a.y, b.x, b.y);
            }
        }
    }
}

/// Black blurred copy of the curve, offset down and to the right.
#[derive(Debug, Clone)]
pub struct ShadowStyle {
    pub cap: StrokeCap,
    pub opacity: f64,
    pub blur: f64,
    pub offset: f64,
}

impl ShadowStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cap: settings.stroke_cap,
            opacity: settings.shadow_opacity,
            blur: settings.shadow_blur,
            offset: settings.shadow_offset,
        }
    }
}

impl CurveStyle for ShadowStyle {
    fn draw(&self, curve: &Curve, surface: &mut dyn Surface, _rng: &mut Xorshift64) {
        let color = Srgb::BLACK.with_alpha(self.opacity);
        surface.set_stroke_cap(self.cap);
        surface.set_stroke(color);
        surface.set_shadow(Some(Shadow {
            color,
            blur: self.blur,
        }));

        let off = DVec2::splat(self.offset);
        for (p1, p2) in curve.segments() {
            let a = p1.pos + off;
            let b = overlapped_end(self.cap, p1, p2.pos + off);
            surface.set_stroke_width(p2.weight);
            surface.line(a.x, a.y, b.x, b.y);
        }

        surface.set_shadow(None);
    }
}

/// Several translucent layers with growing weight and position bleed.
#[derive(Debug, Clone)]
pub struct WatercolorStyle {
    pub cap: StrokeCap,
    pub layers: u32,
}

impl WatercolorStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cap: settings.stroke_cap,
            layers: settings.watercolor_blobs.max(1),
        }
    }
}

impl CurveStyle for WatercolorStyle {
    fn draw(&self, curve: &Curve, surface: &mut dyn Surface, rng: &mut Xorshift64) {
        surface.set_stroke_cap(self.cap);
        surface.set_stroke(curve.color.scale_alpha(1.0 / f64::from(self.layers)));

        for layer in 0..self.layers {
            let bleed = f64::from(layer) * 0.5;
            for (p1, p2) in curve.segments() {
                let weight_off = rng.next_range(-1.0, 1.0) * bleed;
                let pos_off = DVec2::splat(rng.next_range(-1.0, 1.0) * bleed);
                let a = p1.pos + pos_off;
                let b = overlapped_end(self.cap, p1, p2.pos + pos_off);
                surface.set_stroke_width((p2.weight + weight_off).max(0.0));
                surface.line(a.x, a.y, b.x, b.y);
            }
        }
    }
}

/// Thin jittered bristles spread across the stroke width.
#[derive(Debug, Clone)]
pub struct SketchedStyle {
    pub cap: StrokeCap,
    pub grain_amount: f64,
}

impl SketchedStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cap: settings.stroke_cap,
            grain_amount: settings.grain_amount,
        }
    }
}

impl CurveStyle for SketchedStyle {
    fn draw(&self, curve: &Curve, surface: &mut dyn Surface, rng: &mut Xorshift64) {
        let spread = self.grain_amount * 0.5;
        let last = (BRISTLES - 1) as f64;
        surface.set_stroke_cap(self.cap);

        for bristle in 0..BRISTLES {
            let b_off = map_range(bristle as f64, 0.0, last, -0.5, 0.5);
            surface.set_stroke(curve.color.scale_alpha(rng.next_range(0.3, 0.8)));

            for (p1, p2) in curve.segments() {
                let normal = (p2.pos - p1.pos).normalize_or_zero().perp();
                let shift = normal * (b_off * p2.weight);
                let x1 = p1.pos.x + shift.x + jitter(rng, spread);
                let y1 = p1.pos.y + shift.y + jitter(rng, spread);
                let x2 = p2.pos.x + shift.x + jitter(rng, spread);
                let y2 = p2.pos.y + shift.y + jitter(rng, spread);
                surface.set_stroke_width(rng.next_range(0.5, 1.5));
                surface.line(x1, y1, x2, y2);
            }
        }
    }
}

/// Foreground style for `settings`.
pub fn main_style(settings: &Settings) -> Box<dyn CurveStyle> {
    if settings.watercolor {
        Box::new(WatercolorStyle::from_settings(settings))
    } else if settings.grain_mode == GrainMode::Sketched {
        Box::new(SketchedStyle::from_settings(settings))
    } else {
        Box::new(StandardStyle::from_settings(settings))
    }
}

/// Shadow pass style, if shadows are enabled.
pub fn shadow_style(settings: &Settings) -> Option<Box<dyn CurveStyle>> {
    settings
        .shadows
        .then(|| Box::new(ShadowStyle::from_settings(settings)) as Box<dyn CurveStyle>)
}
