#![deny(unsafe_code)]
//! Flow-field curve generation and rendering.
//!
//! A generation pass builds a [`FlowField`] from the settings, seeds curves
//! (circle packing, grid or random), grows each one forward and backward
//! through the field while an [`OccupancyGrid`] keeps curves from crossing,
//! and hands the result to [`CurveManager`] for batch or animated rendering
//! through a [`CurveStyle`] under the configured [`Symmetry`].

pub mod curve;
pub mod flow_field;
pub mod grain;
pub mod growth;
pub mod manager;
pub mod occupancy;
pub mod overlay;
pub mod seeding;
pub mod styles;
pub mod symmetry;
pub mod zones;

pub use curve::{Curve, CurvePoint};
pub use flow_field::{lerp_angle, map_range, FlowField};
pub use manager::CurveManager;
pub use occupancy::OccupancyGrid;
pub use styles::CurveStyle;
pub use symmetry::Symmetry;
pub use zones::{Obstacle, Zone, ZoneKind};
