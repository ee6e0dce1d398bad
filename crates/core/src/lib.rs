#![deny(unsafe_code)]
//! Core types for the flow-art generative system.
//!
//! Provides the `Xorshift64` PRNG, `FractalNoise` (OpenSimplex fBm), the
//! bounds-checked `Grid<T>`, color types (`Srgb`, `Rgba`, `OkLab`), weighted
//! `Palette`/`ThicknessScale` tables, the `Settings` record with its param
//! schema, the `Surface` drawing trait, and the `RasterCanvas` and
//! `RecordingSurface` implementations.

pub mod canvas;
pub mod color;
pub mod error;
pub mod grid;
pub mod noise;
pub mod palette;
pub mod params;
pub mod prng;
pub mod settings;
pub mod surface;

pub use canvas::RasterCanvas;
pub use color::{OkLab, Rgba, Srgb};
pub use error::FlowError;
pub use grid::Grid;
pub use noise::FractalNoise;
pub use palette::{Palette, ThicknessScale};
pub use prng::Xorshift64;
pub use settings::Settings;
pub use surface::{DrawCall, RecordingSurface, Shadow, StrokeCap, Surface, TransformStack};
