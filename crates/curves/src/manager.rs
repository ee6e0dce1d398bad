//! One complete generation pass and its rendering.
//!
//! [`CurveManager::generate_with`] builds the flow field, seeds and grows
//! every curve, and returns an immutable set of curves plus the render
//! state. Rendering is either all at once ([`CurveManager::render`]) or in
//! batches ([`CurveManager::render_next_batch`]) that advance a cursor over
//! the curve list. Global grain is applied exactly once per manager.

use std::fmt;

use flow_art_core::settings::StartingMode;
use flow_art_core::{FlowError, Settings, Surface, Xorshift64};
use glam::DVec2;

use crate::curve::{base_thickness, curve_color, Curve, CurveTables};
use crate::flow_field::FlowField;
use crate::grain::apply_global_grain;
use crate::growth::grow;
use crate::occupancy::OccupancyGrid;
use crate::overlay::draw_overlay;
use crate::seeding::{grid_seeds, random_seeds, CirclePacking};
use crate::styles::{main_style, shadow_style, CurveStyle};
use crate::symmetry::Symmetry;

/// Mixed into the seed for the render stream so rendering draws never
/// shift generation draws.
const RENDER_STREAM: u64 = 0x7265_6e64_6572;

/// Curve construction shared by every seeding mode.
struct CurveFactory<'a> {
    field: &'a FlowField,
    settings: &'a Settings,
    tables: CurveTables,
    width: f64,
}

impl CurveFactory<'_> {
    /// Draws thickness, then color, then grows. `None` for curves with
    /// fewer than two points.
    fn make(
        &self,
        occupancy: &mut OccupancyGrid,
        rng: &mut Xorshift64,
        seed: DVec2,
        id: u32,
    ) -> Option<Curve> {
        let noise = self.field.noise();
        let base_weight = base_thickness(seed, self.settings, &self.tables, noise, rng);
        let color = curve_color(seed, self.width, self.settings, &self.tables, noise, rng);
        let points = grow(self.field, occupancy, self.settings, seed, base_weight, id);
        (points.len() >= 2).then_some(Curve {
            id,
            points,
            color,
            base_weight,
        })
    }
}

#[derive(Debug, Default)]
struct GenerationStats {
    slots_abandoned: usize,
    discarded: usize,
}

pub struct CurveManager {
    settings: Settings,
    width: u32,
    height: u32,
    field: FlowField,
    occupancy: OccupancyGrid,
    curves: Vec<Curve>,
    symmetry: Symmetry,
    main: Box<dyn CurveStyle>,
    shadow: Option<Box<dyn CurveStyle>>,
    render_rng: Xorshift64,
    rendered: usize,
    grain_applied: bool,
}

impl fmt::Debug for CurveManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveManager")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("curves", &self.curves.len())
            .field("rendered", &self.rendered)
            .field("grain_applied", &self.grain_applied)
            .finish_non_exhaustive()
    }
}

impl CurveManager {
    /// Runs a full generation pass with no pointer and no cancellation.
    pub fn generate(width: u32, height: u32, settings: &Settings) -> Result<Self, FlowError> {
        Self::generate_with(width, height, settings, None, || true)
    }

    /// Runs a full generation pass.
    ///
    /// `pointer` is only used when `follow_pointer` is set. `keep_going` is
    /// polled before every curve slot; returning false aborts with
    /// [`FlowError::Cancelled`].
    pub fn generate_with(
        width: u32,
        height: u32,
        settings: &Settings,
        pointer: Option<DVec2>,
        mut keep_going: impl FnMut() -> bool,
    ) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let settings = settings.sanitized();
        let (w, h) = (f64::from(width), f64::from(height));
        let mut rng = Xorshift64::from_seed32(settings.seed);

        let field = FlowField::build(width, height, &settings, &mut rng)?
            .with_pointer(pointer.filter(|_| settings.follow_pointer));
        let mut occupancy = OccupancyGrid::for_canvas(w, h, settings.occupancy_cell_size)?;

        let factory = CurveFactory {
            field: &field,
            settings: &settings,
            tables: CurveTables::from_settings(&settings),
            width: w,
        };
        let mut curves = Vec::new();
        let mut stats = GenerationStats::default();
        let mut next_id = 1_u32;
        let mut take_id = || {
            let id = next_id;
            next_id = next_id.wrapping_add(1).max(1);
            id
        };

        match settings.starting_mode {
            StartingMode::CirclePacking => {
                let mut packing =
                    CirclePacking::new(settings.min_separation, settings.max_placement_attempts);
                for _ in 0..settings.num_curves {
                    if !keep_going() {
                        return Err(FlowError::Cancelled);
                    }
                    let mut placed = false;
                    for _ in 0..packing.max_attempts() {
                        let p = CirclePacking::candidate(&mut rng, w, h);
                        if !packing.accepts(p, &occupancy) {
                            continue;
                        }
                        packing.record(p);
                        match factory.make(&mut occupancy, &mut rng, p, take_id()) {
                            Some(curve) => {
                                curves.push(curve);
                                placed = true;
                                break;
                            }
                            None => stats.discarded += 1,
                        }
                    }
                    if !placed {
                        stats.slots_abandoned += 1;
                    }
                }
            }
            StartingMode::Grid | StartingMode::Random => {
                let seeds = if settings.starting_mode == StartingMode::Grid {
                    grid_seeds(w, h, settings.num_curves)
                } else {
                    random_seeds(&mut rng, w, h, settings.num_curves)
                };
                for p in seeds {
                    if !keep_going() {
                        return Err(FlowError::Cancelled);
                    }
                    match factory.make(&mut occupancy, &mut rng, p, take_id()) {
                        Some(curve) => curves.push(curve),
                        None => stats.discarded += 1,
                    }
                }
            }
        }

        log::debug!(
            "generated {} curves on {}x{} ({} mode, {} discarded, {} slots abandoned, {} cells claimed)",
            curves.len(),
            width,
            height,
            settings.starting_mode,
            stats.discarded,
            stats.slots_abandoned,
            occupancy.claimed_cells()
        );

        Ok(Self {
            symmetry: Symmetry::from_settings(&settings),
            main: main_style(&settings),
            shadow: shadow_style(&settings),
            render_rng: Xorshift64::new(u64::from(settings.seed) ^ RENDER_STREAM),
            settings,
            width,
            height,
            field,
            occupancy,
            curves,
            rendered: 0,
            grain_applied: false,
        })
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    /// The sanitized settings this pass ran with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered
    }

    pub fn total(&self) -> usize {
        self.curves.len()
    }

    /// True once every curve has been drawn and the grain applied.
    pub fn is_complete(&self) -> bool {
        self.rendered >= self.curves.len() && self.grain_applied
    }

    /// Draws curves `range` with the shadow pass first, then the main pass.
    fn draw_range(&mut self, surface: &mut dyn Surface, range: std::ops::Range<usize>) {
        let curves = &self.curves[range];
        let symmetry = self.symmetry;
        let rng = &mut self.render_rng;

        if let Some(shadow) = &self.shadow {
            for curve in curves {
                symmetry.draw(surface, |s| shadow.draw(curve, s, rng));
            }
        }
        for curve in curves {
            symmetry.draw(surface, |s| self.main.draw(curve, s, rng));
        }
    }

    fn finish(&mut self, surface: &mut dyn Surface) {
        if !self.grain_applied {
            apply_global_grain(surface, self.settings.global_grain, &mut self.render_rng);
            self.grain_applied = true;
        }
    }

    /// Draws every curve not drawn yet, then applies the global grain.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let total = self.curves.len();
        self.draw_range(surface, self.rendered..total);
        self.rendered = total;
        self.finish(surface);
    }

    /// Outlines the field's zones and obstacles on top of whatever is drawn.
    pub fn render_overlay(&self, surface: &mut dyn Surface) {
        draw_overlay(&self.field, surface);
    }

    /// Draws the next at most `n` curves (at least one).
    ///
    /// Returns false once nothing is left to draw. The call that draws the
    /// last curve also applies the global grain; with no curves at all the
    /// first call applies it.
    pub fn render_next_batch(&mut self, surface: &mut dyn Surface, n: usize) -> bool {
        let total = self.curves.len();
        if self.rendered >= total {
            self.finish(surface);
            return false;
        }
        let end = (self.rendered + n.max(1)).min(total);
        self.draw_range(surface, self.rendered..end);
        self.rendered = end;
        if end == total {
            self.finish(surface);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_art_core::RecordingSurface;
    use serde_json::json;

    fn settings(overrides: serde_json::Value) -> Settings {
        Settings::from_json(&overrides)
    }

    fn quick() -> serde_json::Value {
        json!({
            "starting_mode": "random",
            "collision_detection": false,
            "num_curves": 35,
            "steps": 20,
            "margin": 0.2,
            "shadows": false,
            "grain_mode": "none",
            "grain_density": 0.0,
        })
    }

    #[test]
    fn same_seed_same_curves() {
        let s = settings(json!({"num_curves": 200, "seed": 77}));
        let a = CurveManager::generate(300, 200, &s).unwrap();
        let b = CurveManager::generate(300, 200, &s).unwrap();
        assert!(!a.curves().is_empty());
        assert_eq!(a.curves(), b.curves());
    }

    #[test]
    fn different_seed_different_curves() {
        let a = CurveManager::generate(300, 200, &settings(json!({"num_curves": 50, "seed": 1})));
        let b = CurveManager::generate(300, 200, &settings(json!({"num_curves": 50, "seed": 2})));
        assert_ne!(a.unwrap().curves(), b.unwrap().curves());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let s = Settings::default();
        assert!(matches!(
            CurveManager::generate(0, 10, &s),
            Err(FlowError::InvalidDimensions)
        ));
    }

    #[test]
    fn canvas_smaller_than_a_field_cell_yields_no_curves() {
        let s = settings(json!({"resolution": 50, "margin": 0.0, "num_curves": 20}));
        let mut m = CurveManager::generate(10, 10, &s).unwrap();
        assert!(m.curves().is_empty());
        let mut surface = RecordingSurface::new(10, 10);
        m.render(&mut surface);
        assert!(surface.calls().is_empty());
        assert!(m.is_complete());
    }

    #[test]
    fn enormous_collision_buffer_generates_without_overflow() {
        let s = settings(json!({"num_curves": 3, "steps": 10, "collision_buffer": 1e300}));
        let m = CurveManager::generate(64, 64, &s).unwrap();
        assert!(m.curves().len() <= 3);

        let wide = settings(json!({
            "num_curves": 3, "steps": 10, "collision_radius": 1e300,
            "thickness_mode": "constant", "stroke_weight": 1e300
        }));
        assert!(CurveManager::generate(64, 64, &wide).is_ok());
    }

    #[test]
    fn every_curve_has_two_points_and_unique_increasing_ids() {
        let m = CurveManager::generate(300, 300, &settings(json!({"num_curves": 300}))).unwrap();
        assert!(m.curves().iter().all(|c| c.points.len() >= 2));
        assert!(m.curves().windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(m.curves()[0].id, 1);
    }

    #[test]
    fn packing_saturates_small_canvas() {
        let s = settings(json!({
            "num_curves": 5000,
            "min_separation": 20.0,
            "max_placement_attempts": 100,
        }));
        let m = CurveManager::generate(50, 50, &s).unwrap();
        assert!(m.total() < 5000);
        assert!(m.total() > 0);
    }

    #[test]
    fn grid_mode_seeds_a_lattice() {
        let s = settings(json!({
            "starting_mode": "grid", "num_curves": 16, "collision_detection": false
        }));
        let m = CurveManager::generate(100, 100, &s).unwrap();
        assert_eq!(m.total(), 16);
        assert_eq!(m.curves()[15].id, 16);
    }

    #[test]
    fn collision_keeps_curves_apart() {
        let s = settings(json!({"num_curves": 400, "collision_buffer": 1.0}));
        let m = CurveManager::generate(200, 200, &s).unwrap();
        assert!(m.total() > 1);
        assert!(m.occupancy().claimed_cells() > 0);
    }

    #[test]
    fn cancellation_between_slots() {
        let mut polls = 0;
        let result = CurveManager::generate_with(200, 200, &Settings::default(), None, || {
            polls += 1;
            polls < 5
        });
        assert!(matches!(result, Err(FlowError::Cancelled)));
        assert_eq!(polls, 5);
    }

    #[test]
    fn pointer_only_matters_when_following() {
        let mut s = settings(quick());
        let base = CurveManager::generate(200, 200, &s).unwrap();
        let ignored =
            CurveManager::generate_with(200, 200, &s, Some(DVec2::new(100.0, 100.0)), || true)
                .unwrap();
        assert_eq!(base.curves(), ignored.curves());

        s.follow_pointer = true;
        let followed =
            CurveManager::generate_with(200, 200, &s, Some(DVec2::new(100.0, 100.0)), || true)
                .unwrap();
        assert_ne!(base.curves(), followed.curves());
    }

    #[test]
    fn batches_of_ten_over_thirty_five_curves() {
        let mut s = settings(quick());
        s.global_grain = 0.1;
        let mut m = CurveManager::generate(200, 200, &s).unwrap();
        assert_eq!(m.total(), 35);

        let mut surface = RecordingSurface::new(200, 200);
        let mut batches = Vec::new();
        let mut before = 0;
        while m.render_next_batch(&mut surface, 10) {
            batches.push(m.rendered_count() - before);
            before = m.rendered_count();
            let expect_grain = usize::from(m.rendered_count() == 35);
            assert_eq!(surface.pixel_writes(), expect_grain);
        }
        assert_eq!(batches, vec![10, 10, 10, 5]);
        assert!(m.is_complete());
        assert!(!m.render_next_batch(&mut surface, 10));
        assert_eq!(surface.pixel_writes(), 1);
    }

    #[test]
    fn batch_render_draws_everything_once() {
        let s = settings(quick());
        let mut m = CurveManager::generate(200, 200, &s).unwrap();
        let mut surface = RecordingSurface::new(200, 200);
        m.render(&mut surface);
        let segments: usize = m.curves().iter().map(|c| c.points.len() - 1).sum();
        assert_eq!(surface.calls().len(), segments);
        assert_eq!(surface.pixel_writes(), 1);
        assert!(m.is_complete());
        m.render(&mut surface);
        assert_eq!(surface.calls().len(), segments);
        assert_eq!(surface.pixel_writes(), 1);
    }

    #[test]
    fn shadows_come_before_main_strokes() {
        let mut s = settings(quick());
        s.shadows = true;
        s.num_curves = 3;
        let mut m = CurveManager::generate(200, 200, &s).unwrap();
        let mut surface = RecordingSurface::new(200, 200);
        m.render(&mut surface);
        let segments: usize = m.curves().iter().map(|c| c.points.len() - 1).sum();
        let calls = surface.calls();
        assert_eq!(calls.len(), 2 * segments);
        assert!(calls[..segments].iter().all(|c| c.shadow.is_some()));
        assert!(calls[segments..].iter().all(|c| c.shadow.is_none()));
    }

    #[test]
    fn radial_symmetry_draws_four_rotations() {
        let mut s = settings(quick());
        s.num_curves = 2;
        s.symmetry = flow_art_core::settings::SymmetryMode::Radial;
        s.symmetry_count = 4;
        let mut m = CurveManager::generate(200, 200, &s).unwrap();
        let mut surface = RecordingSurface::new(200, 200);
        m.render(&mut surface);

        let first = &m.curves()[0];
        let segs = first.points.len() - 1;
        let calls = surface.calls();
        assert_eq!(calls.len(), 4 * m.curves().iter().map(|c| c.points.len() - 1).sum::<usize>());

        let center = DVec2::new(100.0, 100.0);
        let start = first.points[0].pos - center;
        for k in 0..4 {
            let angle = k as f64 * std::f64::consts::FRAC_PI_2;
            let expected = center + DVec2::from_angle(angle).rotate(start);
            let got = calls[k * segs].from;
            assert!(got.distance(expected) < 1e-6, "copy {k}: {got} vs {expected}");
        }
    }

    #[test]
    fn rendering_is_reproducible() {
        let mut s = settings(quick());
        s.grain_mode = flow_art_core::settings::GrainMode::Sketched;
        let draw = || {
            let mut m = CurveManager::generate(200, 200, &s).unwrap();
            let mut surface = RecordingSurface::new(200, 200);
            m.render(&mut surface);
            surface.take_calls()
        };
        assert_eq!(draw(), draw());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn extreme() -> impl Strategy<Value = f64> {
            prop_oneof![
                Just(f64::INFINITY),
                Just(f64::NEG_INFINITY),
                Just(f64::NAN),
                Just(1e300),
                Just(-1e300),
                Just(1e-300),
                Just(0.0),
                -1e6_f64..1e6,
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn extreme_numbers_generate_and_render(
                v in proptest::collection::vec(extreme(), 24),
                seed in any::<u32>(),
                mode in 0_usize..3,
                thickness in 0_usize..4,
            ) {
                let mut s = settings(json!({
                    "seed": seed,
                    "num_curves": 6,
                    "steps": 16,
                    "max_placement_attempts": 50,
                    "starting_mode": (["circle_packing", "grid", "random"][mode]),
                    "thickness_mode": (["constant", "random", "noise", "fidenza"][thickness]),
                    "color_mode": "noise",
                    "num_zones": 2,
                    "flow_obstacles": true,
                    "num_obstacles": 2,
                    "distortion": "quantized",
                    "shadows": true,
                    "segmented": true,
                    "tapering": true,
                    "grain_mode": "jitter",
                }));
                s.noise_scale = v[0];
                s.persistence = v[1];
                s.lacunarity = v[2];
                s.resolution = v[3];
                s.margin = v[4];
                s.angle_range = v[5];
                s.zone_strength = v[6];
                s.min_separation = v[7];
                s.collision_radius = v[8];
                s.collision_buffer = v[9];
                s.occupancy_cell_size = v[10];
                s.step_length = v[11];
                s.min_thickness = v[12];
                s.max_thickness = v[13];
                s.stroke_weight = v[14];
                s.opacity = v[15];
                s.taper_strength = v[16];
                s.segment_length = v[17];
                s.segment_gap = v[18];
                s.shadow_blur = v[19];
                s.shadow_offset = v[20];
                s.grain_amount = v[21];
                s.grain_density = v[22];
                s.global_grain = v[23];

                let mut m = CurveManager::generate(48, 36, &s).unwrap();
                prop_assert!(m.curves().len() <= 6);
                let mut surface = RecordingSurface::new(48, 36);
                m.render(&mut surface);
                prop_assert!(m.is_complete());
            }

            #[test]
            fn curves_stay_inside_the_field(seed in any::<u32>(), mode in 0_usize..3) {
                let mode = ["circle_packing", "grid", "random"][mode];
                let s = settings(json!({
                    "seed": seed, "num_curves": 60, "starting_mode": mode,
                    "field_mode": "vortex", "steps": 80
                }));
                let m = CurveManager::generate(160, 120, &s).unwrap();
                for curve in m.curves() {
                    for p in &curve.points {
                        prop_assert!(m.field().contains_grid(m.field().to_grid(p.pos)));
                    }
                }
            }
        }
    }
}
