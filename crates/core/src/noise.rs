//! Coherent 2D noise and its fractal (fBm) sum.
//!
//! Wraps `noise::OpenSimplex` so the rest of the workspace sees a single
//! deterministic function `noise2d(x, y) -> [-1, 1]`, plus [`FractalNoise::fbm`]
//! which layers it at configurable octave count, persistence and lacunarity.

use ::noise::{NoiseFn, OpenSimplex};

use crate::prng::Xorshift64;

/// Largest coordinate magnitude passed to OpenSimplex. Its lattice indices
/// are cast to `isize`, which fails for far larger inputs.
pub const NOISE_DOMAIN: f64 = 1e12;

/// Fractal Brownian motion over OpenSimplex noise.
///
/// The output is normalised by the sum of the amplitudes used, so it stays in
/// [-1, 1] for any octave count.
#[derive(Clone)]
pub struct FractalNoise {
    noise: OpenSimplex,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
}

impl FractalNoise {
    /// Creates a noise source seeded directly with `seed`.
    ///
    /// `octaves` below 1 is treated as 1.
    pub fn new(seed: u32, octaves: u32, persistence: f64, lacunarity: f64) -> Self {
        Self {
            noise: OpenSimplex::new(seed),
            octaves: octaves.max(1),
            persistence,
            lacunarity,
        }
    }

    /// Creates a noise source whose seed is drawn from `rng`.
    pub fn from_rng(rng: &mut Xorshift64, octaves: u32, persistence: f64, lacunarity: f64) -> Self {
        Self::new(rng.next_u32(), octaves, persistence, lacunarity)
    }

    /// Number of octaves summed by [`fbm`](Self::fbm).
    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    /// Single-octave noise in [-1, 1]. Non-finite coordinates, or ones
    /// beyond [`NOISE_DOMAIN`], yield 0.
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() || x.abs() > NOISE_DOMAIN || y.abs() > NOISE_DOMAIN {
            return 0.0;
        }
        let v = self.noise.get([x, y]);
        if v.is_finite() {
            v.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Fractal sum of `octaves` layers, normalised to [-1, 1].
    pub fn fbm(&self, x: f64, y: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.octaves {
            value += self.noise2d(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        let v = value / max_value;
        if max_value > 0.0 && v.is_finite() {
            v.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for FractalNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FractalNoise")
            .field("octaves", &self.octaves)
            .field("persistence", &self.persistence)
            .field("lacunarity", &self.lacunarity)
            .finish_non_exhaustive()
    }
}
