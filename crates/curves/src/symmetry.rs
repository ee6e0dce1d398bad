//! Mirror and rotational copies of every drawn curve.
//!
//! Copies are made by re-running the draw closure under extra transforms on
//! the surface's stack, never by regrowing curves. All transforms act about
//! the canvas: horizontal mirrors across `x = width / 2`, vertical across
//! `y = height / 2`, and radial-N rotates by `2π / N` around the center,
//! accumulating one step per copy.

use std::f64::consts::TAU;

use flow_art_core::settings::SymmetryMode;
use flow_art_core::{Settings, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    None,
    Horizontal,
    Vertical,
    Radial(u32),
}

impl Symmetry {
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.symmetry {
            SymmetryMode::None => Symmetry::None,
            SymmetryMode::Horizontal => Symmetry::Horizontal,
            SymmetryMode::Vertical => Symmetry::Vertical,
            SymmetryMode::Radial => Symmetry::Radial(settings.symmetry_count.max(1)),
        }
    }

    /// How many times each curve is drawn, the untransformed copy included.
    pub fn copies(self) -> usize {
        match self {
            Symmetry::None => 1,
            Symmetry::Horizontal | Symmetry::Vertical => 2,
            Symmetry::Radial(n) => n.max(1) as usize,
        }
    }

    /// Calls `draw` once per copy with the matching transform in effect.
    /// The surface's transform stack is left as it was found.
    pub fn draw(self, surface: &mut dyn Surface, mut draw: impl FnMut(&mut dyn Surface)) {
        if self == Symmetry::None {
            draw(surface);
            return;
        }

        let w = f64::from(surface.width());
        let h = f64::from(surface.height());

        surface.push();
        draw(&mut *surface);
        match self {
            Symmetry::None => {}
            Symmetry::Horizontal => {
                surface.translate(w, 0.0);
                surface.scale(-1.0, 1.0);
                draw(&mut *surface);
            }
            Symmetry::Vertical => {
                surface.translate(0.0, h);
                surface.scale(1.0, -1.0);
                draw(&mut *surface);
            }
            Symmetry::Radial(n) => {
                let step = TAU / f64::from(n.max(1));
                for _ in 1..n {
                    surface.translate(w / 2.0, h / 2.0);
                    surface.rotate(step);
                    surface.translate(-w / 2.0, -h / 2.0);
                    draw(&mut *surface);
                }
            }
        }
        surface.pop();
    }
}
