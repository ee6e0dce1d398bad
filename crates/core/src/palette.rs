//! Named weighted color palettes and stroke thickness tables.
//!
//! A [`Palette`] is a list of `(color, weight)` entries; curves pick a color
//! by weighted choice, so a palette's dominant color covers most of the
//! canvas and its accents appear sparingly. A [`ThicknessScale`] is the same
//! idea for stroke widths: pick a weighted bin, then draw uniformly inside it.
//!
//! Both families are looked up by name. Unknown names fall back to the first
//! built-in table and log a warning, so a typo in a config never aborts a
//! render.

use crate::color::Srgb;
use crate::error::FlowError;
use crate::prng::Xorshift64;

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedColor {
    pub color: Srgb,
    pub weight: f64,
}

/// A named set of weighted colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    name: String,
    entries: Vec<WeightedColor>,
}

/// One thickness bin: widths are drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThicknessBin {
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

/// A named set of weighted thickness bins.
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessScale {
    name: String,
    bins: Vec<ThicknessBin>,
}

type PaletteTable = (&'static str, &'static [([u8; 3], f64)]);
type ScaleTable = (&'static str, &'static [(f64, f64, f64)]);

const PALETTES: &[PaletteTable] = &[
    (
        "Midnight",
        &[
            ([20, 24, 82], 0.5),
            ([74, 158, 255], 0.3),
            ([255, 74, 158], 0.15),
            ([255, 255, 255], 0.05),
        ],
    ),
    (
        "Desert",
        &[
            ([194, 63, 48], 0.4),
            ([243, 166, 131], 0.3),
            ([84, 11, 14], 0.2),
            ([255, 225, 104], 0.1),
        ],
    ),
    (
        "Forest",
        &[
            ([20, 43, 23], 0.4),
            ([95, 128, 81], 0.35),
            ([181, 158, 123], 0.15),
            ([242, 100, 121], 0.1),
        ],
    ),
    (
        "Vibrant",
        &[
            ([255, 0, 128], 0.25),
            ([0, 255, 255], 0.25),
            ([255, 255, 0], 0.25),
            ([128, 0, 255], 0.25),
        ],
    ),
    (
        "Ink",
        &[
            ([30, 30, 30], 0.6),
            ([60, 60, 60], 0.25),
            ([100, 30, 30], 0.1),
            ([30, 40, 100], 0.05),
        ],
    ),
    ("Mono", &[([20, 20, 20], 0.8), ([240, 240, 240], 0.2)]),
    (
        "Celestial",
        &[
            ([15, 23, 42], 0.4),
            ([56, 189, 248], 0.3),
            ([192, 132, 252], 0.2),
            ([253, 224, 71], 0.1),
        ],
    ),
    (
        "Earth",
        &[
            ([69, 51, 37], 0.4),
            ([150, 126, 84], 0.3),
            ([214, 204, 153], 0.2),
            ([101, 121, 101], 0.1),
        ],
    ),
    (
        "Ember",
        &[
            ([50, 20, 10], 0.5),
            ([255, 69, 0], 0.3),
            ([255, 140, 0], 0.15),
            ([255, 255, 0], 0.05),
        ],
    ),
];

const THICKNESS_SCALES: &[ScaleTable] = &[
    (
        "Small",
        &[(1.0, 2.0, 0.8), (3.0, 5.0, 0.15), (8.0, 12.0, 0.05)],
    ),
    (
        "Medium",
        &[(1.0, 3.0, 0.15), (4.0, 8.0, 0.75), (10.0, 16.0, 0.1)],
    ),
    (
        "Large",
        &[(2.0, 6.0, 0.1), (12.0, 24.0, 0.75), (30.0, 50.0, 0.15)],
    ),
    (
        "Jumbo",
        &[(4.0, 10.0, 0.1), (30.0, 60.0, 0.8), (70.0, 100.0, 0.1)],
    ),
    ("Jumbo XL", &[(80.0, 150.0, 1.0)]),
    ("Uniform", &[(6.0, 6.0, 1.0)]),
    ("Micro-Uniform", &[(0.5, 0.5, 1.0)]),
    (
        "Dynamic",
        &[(1.0, 1.0, 0.4), (10.0, 20.0, 0.4), (50.0, 100.0, 0.2)],
    ),
];

impl Palette {
    /// Creates a palette from weighted colors.
    ///
    /// Requires at least one entry and a positive total weight.
    pub fn new(name: impl Into<String>, entries: Vec<WeightedColor>) -> Result<Self, FlowError> {
        if entries.is_empty() {
            return Err(FlowError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        let total: f64 = entries.iter().map(|e| e.weight.max(0.0)).sum();
        if total.is_nan() || total <= 0.0 {
            return Err(FlowError::InvalidPalette(
                "palette weights must sum to a positive value".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            entries,
        })
    }

    /// Looks up a built-in palette by exact name.
    pub fn get(name: &str) -> Option<Self> {
        PALETTES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, table)| Self::from_table(n, table))
    }

    /// Looks up a built-in palette, falling back to the first one.
    pub fn from_name(name: &str) -> Self {
        Self::get(name).unwrap_or_else(|| {
            let (fallback, table) = PALETTES[0];
            log::warn!("unknown palette {name:?}, using {fallback:?}");
            Self::from_table(fallback, table)
        })
    }

    /// Names of all built-in palettes, in declaration order.
    pub fn list_names() -> Vec<&'static str> {
        PALETTES.iter().map(|(n, _)| *n).collect()
    }

    fn from_table(name: &str, table: &[([u8; 3], f64)]) -> Self {
        Self {
            name: name.to_owned(),
            entries: table
                .iter()
                .map(|&([r, g, b], weight)| WeightedColor {
                    color: Srgb::from_rgb8(r, g, b),
                    weight,
                })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[WeightedColor] {
        &self.entries
    }

    /// Picks a color by weight.
    pub fn choose(&self, rng: &mut Xorshift64) -> Srgb {
        rng.choose_weighted(&self.entries, |e| e.weight)
            .map(|e| e.color)
            .unwrap_or(Srgb::WHITE)
    }
}

impl ThicknessScale {
    /// Creates a scale from weighted bins. Requires at least one bin.
    pub fn new(name: impl Into<String>, bins: Vec<ThicknessBin>) -> Result<Self, FlowError> {
        if bins.is_empty() {
            return Err(FlowError::InvalidPalette(
                "thickness scale requires at least 1 bin".to_string(),
            ));
        }
        if bins.iter().any(|b| b.min > b.max) {
            return Err(FlowError::InvalidPalette(
                "thickness bin has min > max".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            bins,
        })
    }

    pub fn get(name: &str) -> Option<Self> {
        THICKNESS_SCALES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, table)| Self::from_table(n, table))
    }

    /// Looks up a built-in scale, falling back to the first one.
    pub fn from_name(name: &str) -> Self {
        Self::get(name).unwrap_or_else(|| {
            let (fallback, table) = THICKNESS_SCALES[0];
            log::warn!("unknown thickness scale {name:?}, using {fallback:?}");
            Self::from_table(fallback, table)
        })
    }

    pub fn list_names() -> Vec<&'static str> {
        THICKNESS_SCALES.iter().map(|(n, _)| *n).collect()
    }

    fn from_table(name: &str, table: &[(f64, f64, f64)]) -> Self {
        Self {
            name: name.to_owned(),
            bins: table
                .iter()
                .map(|&(min, max, weight)| ThicknessBin { min, max, weight })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bins(&self) -> &[ThicknessBin] {
        &self.bins
    }

    /// Picks a bin by weight, then a width uniformly inside it.
    pub fn sample(&self, rng: &mut Xorshift64) -> f64 {
        match rng.choose_weighted(&self.bins, |b| b.weight) {
            Some(bin) => rng.next_range(bin.min, bin.max),
            None => 1.0,
        }
    }
}
