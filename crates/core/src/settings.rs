//! The settings record that drives one generation pass.
//!
//! `Settings` is a plain value. Hosts build it (defaults, a JSON object, a
//! CLI), hand a sanitized copy to the generator and mutate their own copy
//! between passes. Nothing in the workspace reads settings from global state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::color::Srgb;
use crate::params::{param_bool, param_f64, param_parsed, param_string, param_u32, param_usize};

/// Declares a string-backed settings enum with `FromStr`, `Display` and
/// `ALL` (used for the param schema's option lists).
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text $(| $alias)* => Ok($name::$variant), )+
                    other => Err(format!(
                        concat!("unknown ", stringify!($name), " {:?}"),
                        other
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Base angle function of the flow field.
    pub enum FieldMode {
        Noise => "noise",
        Vortex => "vortex",
        Sink => "sink",
    }
}

string_enum! {
    /// Post-processing applied to every field angle.
    pub enum Distortion {
        Continuous => "continuous",
        Quantized => "quantized",
        Random => "random",
    }
}

string_enum! {
    pub enum SymmetryMode {
        None => "none",
        Horizontal => "horizontal",
        Vertical => "vertical",
        Radial => "radial",
    }
}

string_enum! {
    /// How curve seed points are placed.
    pub enum StartingMode {
        CirclePacking => "circle_packing" | "circlePacking",
        Grid => "grid",
        Random => "random",
    }
}

string_enum! {
    /// How each curve's base stroke weight is chosen.
    pub enum ThicknessMode {
        Constant => "constant",
        Fidenza => "fidenza",
        Random => "random",
        Noise => "noise",
    }
}

string_enum! {
    /// Shape of segment ends.
    pub enum StrokeCap {
        Round => "round",
        Square => "square",
        Project => "project",
    }
}

string_enum! {
    /// Surface texture of the main stroke.
    pub enum GrainMode {
        None => "none",
        Jitter => "jitter",
        Sketched => "sketched",
    }
}

string_enum! {
    pub enum ColorMode {
        White => "white",
        Palette => "palette",
        Gradient => "gradient",
        Noise => "noise",
    }
}

/// Background of the paper theme.
pub const PAPER_BACKGROUND: [u8; 3] = [235, 230, 220];
/// Background of the dark theme.
pub const DARK_BACKGROUND: [u8; 3] = [11, 14, 20];

/// Largest field margin, as a fraction of the canvas size.
pub const MAX_MARGIN: f64 = 1.0;
/// Finest occupancy raster cell, in pixels.
pub const MIN_OCCUPANCY_CELL: f64 = 0.5;

/// Every knob of a flow-art generation and render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Field
    pub noise_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub seed: u32,
    pub resolution: f64,
    pub margin: f64,
    pub field_mode: FieldMode,
    pub distortion: Distortion,
    pub quantize_steps: u32,
    pub angle_range: f64,
    pub num_zones: usize,
    pub zone_strength: f64,
    pub flow_obstacles: bool,
    pub num_obstacles: usize,
    pub symmetry: SymmetryMode,
    pub symmetry_count: u32,

    // Curves
    pub starting_mode: StartingMode,
    pub min_separation: f64,
    pub max_placement_attempts: usize,
    pub collision_detection: bool,
    pub collision_radius: f64,
    pub collision_buffer: f64,
    pub occupancy_cell_size: f64,
    pub num_curves: usize,
    pub steps: usize,
    pub step_length: f64,

    // Thickness and style
    pub thickness_mode: ThicknessMode,
    pub thickness_scale: String,
    pub min_thickness: f64,
    pub max_thickness: f64,
    pub stroke_weight: f64,
    pub stroke_cap: StrokeCap,
    pub opacity: f64,
    pub tapering: bool,
    pub taper_strength: f64,
    pub segmented: bool,
    pub segment_length: f64,
    pub segment_gap: f64,

    // Shadows and effects
    pub shadows: bool,
    pub shadow_blur: f64,
    pub shadow_offset: f64,
    pub shadow_opacity: f64,
    pub watercolor: bool,
    pub watercolor_blobs: u32,

    // Color
    pub color_mode: ColorMode,
    pub palette: String,

    // Grain and texture
    pub grain_mode: GrainMode,
    pub grain_amount: f64,
    pub grain_density: f64,
    pub paper_theme: bool,
    pub global_grain: f64,

    // Rendering
    pub animate: bool,
    pub animation_speed: usize,
    pub follow_pointer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            noise_scale: 0.005,
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 1234,
            resolution: 10.0,
            margin: 0.2,
            field_mode: FieldMode::Noise,
            distortion: Distortion::Continuous,
            quantize_steps: 8,
            angle_range: 2.0,
            num_zones: 3,
            zone_strength: 0.5,
            flow_obstacles: false,
            num_obstacles: 5,
            symmetry: SymmetryMode::None,
            symmetry_count: 4,

            starting_mode: StartingMode::CirclePacking,
            min_separation: 10.0,
            max_placement_attempts: 1000,
            collision_detection: true,
            collision_radius: 2.0,
            collision_buffer: 1.0,
            occupancy_cell_size: 1.0,
            num_curves: 3000,
            steps: 100,
            step_length: 2.0,

            thickness_mode: ThicknessMode::Fidenza,
            thickness_scale: "Jumbo".to_owned(),
            min_thickness: 0.5,
            max_thickness: 5.0,
            stroke_weight: 1.0,
            stroke_cap: StrokeCap::Round,
            opacity: 150.0,
            tapering: true,
            taper_strength: 0.5,
            segmented: false,
            segment_length: 10.0,
            segment_gap: 5.0,

            shadows: true,
            shadow_blur: 10.0,
            shadow_offset: 4.0,
            shadow_opacity: 0.3,
            watercolor: false,
            watercolor_blobs: 3,

            color_mode: ColorMode::Palette,
            palette: "Celestial".to_owned(),

            grain_mode: GrainMode::Sketched,
            grain_amount: 0.5,
            grain_density: 0.5,
            paper_theme: true,
            global_grain: 0.1,

            animate: true,
            animation_speed: 10,
            follow_pointer: false,
        }
    }
}

impl Settings {
    /// Builds settings from a JSON object. Missing or mistyped keys keep
    /// their defaults; unknown enum strings log a warning and keep theirs.
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    /// Returns a copy of `self` with every key present in `params` applied.
    pub fn merged(&self, params: &Value) -> Self {
        let d = self;
        let octaves = param_usize(params, "octaves", d.octaves as usize);
        Self {
            noise_scale: param_f64(params, "noise_scale", d.noise_scale),
            octaves: u32::try_from(octaves).unwrap_or(d.octaves),
            persistence: param_f64(params, "persistence", d.persistence),
            lacunarity: param_f64(params, "lacunarity", d.lacunarity),
            seed: param_u32(params, "seed", d.seed),
            resolution: param_f64(params, "resolution", d.resolution),
            margin: param_f64(params, "margin", d.margin),
            field_mode: param_parsed(params, "field_mode", d.field_mode),
            distortion: param_parsed(params, "distortion", d.distortion),
            quantize_steps: param_u32(params, "quantize_steps", d.quantize_steps),
            angle_range: param_f64(params, "angle_range", d.angle_range),
            num_zones: param_usize(params, "num_zones", d.num_zones),
            zone_strength: param_f64(params, "zone_strength", d.zone_strength),
            flow_obstacles: param_bool(params, "flow_obstacles", d.flow_obstacles),
            num_obstacles: param_usize(params, "num_obstacles", d.num_obstacles),
            symmetry: param_parsed(params, "symmetry", d.symmetry),
            symmetry_count: param_u32(params, "symmetry_count", d.symmetry_count),

            starting_mode: param_parsed(params, "starting_mode", d.starting_mode),
            min_separation: param_f64(params, "min_separation", d.min_separation),
            max_placement_attempts: param_usize(
                params,
                "max_placement_attempts",
                d.max_placement_attempts,
            ),
            collision_detection: param_bool(params, "collision_detection", d.collision_detection),
            collision_radius: param_f64(params, "collision_radius", d.collision_radius),
            collision_buffer: param_f64(params, "collision_buffer", d.collision_buffer),
            occupancy_cell_size: param_f64(params, "occupancy_cell_size", d.occupancy_cell_size),
            num_curves: param_usize(params, "num_curves", d.num_curves),
            steps: param_usize(params, "steps", d.steps),
            step_length: param_f64(params, "step_length", d.step_length),

            thickness_mode: param_parsed(params, "thickness_mode", d.thickness_mode),
            thickness_scale: param_string(params, "thickness_scale", &d.thickness_scale),
            min_thickness: param_f64(params, "min_thickness", d.min_thickness),
            max_thickness: param_f64(params, "max_thickness", d.max_thickness),
            stroke_weight: param_f64(params, "stroke_weight", d.stroke_weight),
            stroke_cap: param_parsed(params, "stroke_cap", d.stroke_cap),
            opacity: param_f64(params, "opacity", d.opacity),
            tapering: param_bool(params, "tapering", d.tapering),
            taper_strength: param_f64(params, "taper_strength", d.taper_strength),
            segmented: param_bool(params, "segmented", d.segmented),
            segment_length: param_f64(params, "segment_length", d.segment_length),
            segment_gap: param_f64(params, "segment_gap", d.segment_gap),

            shadows: param_bool(params, "shadows", d.shadows),
            shadow_blur: param_f64(params, "shadow_blur", d.shadow_blur),
            shadow_offset: param_f64(params, "shadow_offset", d.shadow_offset),
            shadow_opacity: param_f64(params, "shadow_opacity", d.shadow_opacity),
            watercolor: param_bool(params, "watercolor", d.watercolor),
            watercolor_blobs: param_u32(params, "watercolor_blobs", d.watercolor_blobs),

            color_mode: param_parsed(params, "color_mode", d.color_mode),
            palette: param_string(params, "palette", &d.palette),

            grain_mode: param_parsed(params, "grain_mode", d.grain_mode),
            grain_amount: param_f64(params, "grain_amount", d.grain_amount),
            grain_density: param_f64(params, "grain_density", d.grain_density),
            paper_theme: param_bool(params, "paper_theme", d.paper_theme),
            global_grain: param_f64(params, "global_grain", d.global_grain),

            animate: param_bool(params, "animate", d.animate),
            animation_speed: param_usize(params, "animation_speed", d.animation_speed),
            follow_pointer: param_bool(params, "follow_pointer", d.follow_pointer),
        }
    }

    /// Returns a copy with degenerate values clamped so that no generation
    /// pass divides by zero, loops forever or sizes a grid from garbage.
    ///
    /// Non-finite numbers fall back to their defaults first; lengths and
    /// weights are then floored at zero and fractions clamped to their range.
    pub fn sanitized(&self) -> Self {
        let d = Settings::default();
        let mut s = self.clone();

        for (value, fallback) in [
            (&mut s.noise_scale, d.noise_scale),
            (&mut s.persistence, d.persistence),
            (&mut s.lacunarity, d.lacunarity),
            (&mut s.resolution, d.resolution),
            (&mut s.margin, d.margin),
            (&mut s.angle_range, d.angle_range),
            (&mut s.zone_strength, d.zone_strength),
            (&mut s.min_separation, d.min_separation),
            (&mut s.collision_radius, d.collision_radius),
            (&mut s.collision_buffer, d.collision_buffer),
            (&mut s.occupancy_cell_size, d.occupancy_cell_size),
            (&mut s.step_length, d.step_length),
            (&mut s.min_thickness, d.min_thickness),
            (&mut s.max_thickness, d.max_thickness),
            (&mut s.stroke_weight, d.stroke_weight),
            (&mut s.opacity, d.opacity),
            (&mut s.taper_strength, d.taper_strength),
            (&mut s.segment_length, d.segment_length),
            (&mut s.segment_gap, d.segment_gap),
            (&mut s.shadow_blur, d.shadow_blur),
            (&mut s.shadow_offset, d.shadow_offset),
            (&mut s.shadow_opacity, d.shadow_opacity),
            (&mut s.grain_amount, d.grain_amount),
            (&mut s.grain_density, d.grain_density),
            (&mut s.global_grain, d.global_grain),
        ] {
            if !value.is_finite() {
                *value = fallback;
            }
        }

        s.octaves = s.octaves.max(1);
        s.resolution = s.resolution.max(1.0);
        s.margin = s.margin.clamp(0.0, MAX_MARGIN);
        s.quantize_steps = s.quantize_steps.max(1);
        s.symmetry_count = s.symmetry_count.max(1);
        s.animation_speed = s.animation_speed.max(1);
        s.watercolor_blobs = s.watercolor_blobs.max(1);
        if s.occupancy_cell_size <= 0.0 {
            s.occupancy_cell_size = d.occupancy_cell_size;
        }
        s.occupancy_cell_size = s.occupancy_cell_size.max(MIN_OCCUPANCY_CELL);
        for length in [
            &mut s.min_separation,
            &mut s.collision_radius,
            &mut s.collision_buffer,
            &mut s.min_thickness,
            &mut s.max_thickness,
            &mut s.stroke_weight,
            &mut s.segment_length,
            &mut s.segment_gap,
            &mut s.shadow_blur,
            &mut s.grain_amount,
        ] {
            *length = length.max(0.0);
        }
        if s.min_thickness > s.max_thickness {
            std::mem::swap(&mut s.min_thickness, &mut s.max_thickness);
        }
        s.opacity = s.opacity.clamp(0.0, 255.0);
        s.taper_strength = s.taper_strength.clamp(0.0, 1.0);
        s.grain_density = s.grain_density.clamp(0.0, 1.0);
        s.shadow_opacity = s.shadow_opacity.clamp(0.0, 1.0);
        s
    }

    /// Canvas background for the current theme.
    pub fn background(&self) -> Srgb {
        let [r, g, b] = if self.paper_theme {
            PAPER_BACKGROUND
        } else {
            DARK_BACKGROUND
        };
        Srgb::from_rgb8(r, g, b)
    }

    /// JSON description of every key, for generic key-value editors.
    ///
    /// Each entry carries `type`, `default`, a `description`, and either a
    /// numeric `min`/`max` or a list of string `options`.
    pub fn param_schema(palettes: &[&str], thickness_scales: &[&str]) -> Value {
        let d = Settings::default();
        let mut schema = SchemaBuilder::default();

        schema.number("noise_scale", d.noise_scale, 0.001, 0.05, "Spatial frequency of the field noise");
        schema.integer("octaves", d.octaves as u64, 1, 8, "Number of fBm noise layers");
        schema.number("persistence", d.persistence, 0.1, 1.0, "Amplitude falloff per octave");
        schema.number("lacunarity", d.lacunarity, 1.0, 4.0, "Frequency growth per octave");
        schema.integer("seed", u64::from(d.seed), 0, u64::from(u32::MAX), "Seed for every random decision");
        schema.number("resolution", d.resolution, 5.0, 50.0, "Flow field cell size in pixels");
        schema.number("margin", d.margin, 0.0, 1.0, "Field extent beyond the canvas, as a fraction of its size");
        schema.choice("field_mode", d.field_mode, FieldMode::ALL, "Base angle function");
        schema.choice("distortion", d.distortion, Distortion::ALL, "Angle post-processing");
        schema.integer("quantize_steps", d.quantize_steps as u64, 2, 20, "Directions allowed by quantized distortion");
        schema.number("angle_range", d.angle_range, 0.1, 4.0, "Noise angle range in multiples of pi");
        schema.integer("num_zones", d.num_zones as u64, 0, 10, "Number of vortex, sink or source zones");
        schema.number("zone_strength", d.zone_strength, 0.0, 1.0, "Peak influence of a zone at its center");
        schema.boolean("flow_obstacles", d.flow_obstacles, "Steer the field away from obstacles");
        schema.integer("num_obstacles", d.num_obstacles as u64, 1, 20, "Number of obstacles");
        schema.choice("symmetry", d.symmetry, SymmetryMode::ALL, "Mirror or rotate curves when drawing");
        schema.integer("symmetry_count", d.symmetry_count as u64, 2, 12, "Copies drawn by radial symmetry");

        schema.choice("starting_mode", d.starting_mode, StartingMode::ALL, "Seed placement strategy");
        schema.number("min_separation", d.min_separation, 2.0, 50.0, "Minimum distance between circle-packed seeds");
        schema.integer("max_placement_attempts", d.max_placement_attempts as u64, 1, 10_000, "Candidate seeds tried per curve before giving up");
        schema.boolean("collision_detection", d.collision_detection, "Stop curves before they cross each other");
        schema.number("collision_radius", d.collision_radius, 0.0, 10.0, "Extra footprint claimed around each point");
        schema.number("collision_buffer", d.collision_buffer, 0.0, 20.0, "Extra sensing gap checked ahead of each point");
        schema.number("occupancy_cell_size", d.occupancy_cell_size, 0.5, 10.0, "Occupancy raster cell size in pixels");
        schema.integer("num_curves", d.num_curves as u64, 100, 10_000, "Target curve count");
        schema.integer("steps", d.steps as u64, 10, 500, "Growth steps per curve, split between both directions");
        schema.number("step_length", d.step_length, 0.5, 10.0, "Distance advanced per step");

        schema.choice("thickness_mode", d.thickness_mode, ThicknessMode::ALL, "Base weight strategy");
        schema.names("thickness_scale", &d.thickness_scale, thickness_scales, "Weighted thickness table for fidenza mode");
        schema.number("min_thickness", d.min_thickness, 0.1, 10.0, "Lower weight bound for random and noise modes");
        schema.number("max_thickness", d.max_thickness, 0.1, 20.0, "Upper weight bound for random and noise modes");
        schema.number("stroke_weight", d.stroke_weight, 0.1, 10.0, "Weight for constant mode");
        schema.choice("stroke_cap", d.stroke_cap, StrokeCap::ALL, "Segment end shape");
        schema.number("opacity", d.opacity, 0.0, 255.0, "Stroke alpha on a 0-255 scale");
        schema.boolean("tapering", d.tapering, "Narrow strokes away from the seed");
        schema.number("taper_strength", d.taper_strength, 0.0, 1.0, "Fraction of weight lost at the curve ends");
        schema.boolean("segmented", d.segmented, "Draw curves as dashes");
        schema.number("segment_length", d.segment_length, 1.0, 100.0, "Dash length");
        schema.number("segment_gap", d.segment_gap, 1.0, 50.0, "Gap between dashes");

        schema.boolean("shadows", d.shadows, "Draw a soft drop shadow under every curve");
        schema.number("shadow_blur", d.shadow_blur, 0.0, 30.0, "Shadow blur radius");
        schema.number("shadow_offset", d.shadow_offset, 0.0, 20.0, "Shadow offset on both axes");
        schema.number("shadow_opacity", d.shadow_opacity, 0.0, 1.0, "Shadow alpha");
        schema.boolean("watercolor", d.watercolor, "Layered bleeding strokes");
        schema.integer("watercolor_blobs", d.watercolor_blobs as u64, 1, 10, "Watercolor layers");

        schema.choice("color_mode", d.color_mode, ColorMode::ALL, "Curve color strategy");
        schema.names("palette", &d.palette, palettes, "Weighted palette for palette mode");

        schema.choice("grain_mode", d.grain_mode, GrainMode::ALL, "Stroke texture");
        schema.number("grain_amount", d.grain_amount, 0.0, 5.0, "Texture intensity");
        schema.number("grain_density", d.grain_density, 0.0, 1.0, "Probability a segment is subject to stroke noise");
        schema.boolean("paper_theme", d.paper_theme, "Warm paper background instead of dark");
        schema.number("global_grain", d.global_grain, 0.0, 0.5, "Per-pixel film grain applied after drawing");

        schema.boolean("animate", d.animate, "Draw progressively, a batch per frame");
        schema.integer("animation_speed", d.animation_speed as u64, 1, 100, "Curves drawn per frame");
        schema.boolean("follow_pointer", d.follow_pointer, "Swirl the field around the pointer at lookup time");

        Value::Object(schema.entries)
    }
}

#[derive(Default)]
struct SchemaBuilder {
    entries: Map<String, Value>,
}

impl SchemaBuilder {
    fn number(&mut self, key: &str, default: f64, min: f64, max: f64, description: &str) {
        self.entries.insert(
            key.to_owned(),
            json!({"type": "number", "default": default, "min": min, "max": max, "description": description}),
        );
    }

    fn integer(&mut self, key: &str, default: u64, min: u64, max: u64, description: &str) {
        self.entries.insert(
            key.to_owned(),
            json!({"type": "integer", "default": default, "min": min, "max": max, "description": description}),
        );
    }

    fn boolean(&mut self, key: &str, default: bool, description: &str) {
        self.entries.insert(
            key.to_owned(),
            json!({"type": "boolean", "default": default, "description": description}),
        );
    }

    fn choice<T: Copy + fmt::Display>(&mut self, key: &str, default: T, all: &[T], description: &str) {
        let options: Vec<String> = all.iter().map(ToString::to_string).collect();
        self.entries.insert(
            key.to_owned(),
            json!({"type": "string", "default": default.to_string(), "options": options, "description": description}),
        );
    }

    fn names(&mut self, key: &str, default: &str, options: &[&str], description: &str) {
        self.entries.insert(
            key.to_owned(),
            json!({"type": "string", "default": default, "options": options, "description": description}),
        );
    }
}
