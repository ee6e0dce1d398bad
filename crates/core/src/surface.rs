//! Host-agnostic drawing surface.
//!
//! Curve styles draw exclusively through [`Surface`]: stroke state setters,
//! a single `line` primitive, a p5-style push/pop transform stack, and raw
//! RGBA pixel access for full-frame effects. [`RecordingSurface`] keeps every
//! line call (already transformed into device space) so rendering logic can
//! be tested without rasterizing.

use glam::{DAffine2, DVec2};

use crate::color::{Rgba, Srgb};
pub use crate::settings::StrokeCap;

/// Soft shadow attached to subsequent strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f64,
}

/// Affine transform stack with push/pop save points.
///
/// `translate`, `rotate` and `scale` post-multiply the current transform, so
/// the last call applies to geometry first.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: DAffine2,
    saved: Vec<DAffine2>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: DAffine2::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn current(&self) -> DAffine2 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the last saved transform. An unmatched pop resets to identity.
    pub fn pop(&mut self) {
        self.current = self.saved.pop().unwrap_or_else(|| {
            log::warn!("pop without matching push");
            DAffine2::IDENTITY
        });
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.current = self.current * DAffine2::from_translation(DVec2::new(dx, dy));
    }

    pub fn rotate(&mut self, angle: f64) {
        self.current = self.current * DAffine2::from_angle(angle);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.current = self.current * DAffine2::from_scale(DVec2::new(sx, sy));
    }

    /// Maps a user-space point to device space.
    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.current.transform_point2(p)
    }

    /// Factor by which the current transform scales lengths (geometric mean
    /// of the axis scales). Used to scale stroke widths.
    pub fn length_scale(&self) -> f64 {
        self.current.matrix2.determinant().abs().sqrt()
    }

    pub fn reset(&mut self) {
        self.current = DAffine2::IDENTITY;
        self.saved.clear();
    }
}

/// A 2D drawing target.
///
/// Transform methods have default implementations over [`TransformStack`];
/// implementors only expose their stack.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn set_stroke(&mut self, color: Rgba);
    fn set_stroke_width(&mut self, width: f64);
    fn set_stroke_cap(&mut self, cap: StrokeCap);
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    /// Strokes a segment in user space with the current stroke state.
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Fills every pixel with `background` and resets the transform stack.
    fn clear(&mut self, background: Srgb);

    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    fn pixels(&self) -> &[u8];
    fn pixels_mut(&mut self) -> &mut [u8];

    fn transforms(&self) -> &TransformStack;
    fn transforms_mut(&mut self) -> &mut TransformStack;

    fn push(&mut self) {
        self.transforms_mut().push();
    }

    fn pop(&mut self) {
        self.transforms_mut().pop();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transforms_mut().translate(dx, dy);
    }

    fn rotate(&mut self, angle: f64) {
        self.transforms_mut().rotate(angle);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transforms_mut().scale(sx, sy);
    }
}

/// One recorded `line` call, in device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub from: DVec2,
    pub to: DVec2,
    pub color: Rgba,
    pub width: f64,
    pub cap: StrokeCap,
    pub shadow: Option<Shadow>,
}

/// A surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    transforms: TransformStack,
    stroke: Rgba,
    stroke_width: f64,
    cap: StrokeCap,
    shadow: Option<Shadow>,
    calls: Vec<DrawCall>,
    pixel_writes: usize,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            transforms: TransformStack::default(),
            stroke: Srgb::BLACK.with_alpha(1.0),
            stroke_width: 1.0,
            cap: StrokeCap::Round,
            shadow: None,
            calls: Vec::new(),
            pixel_writes: 0,
            clears: 0,
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of times `pixels_mut` was borrowed.
    pub fn pixel_writes(&self) -> usize {
        self.pixel_writes
    }

    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_stroke(&mut self, color: Rgba) {
        self.stroke = color;
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.cap = cap;
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let call = DrawCall {
            from: self.transforms.apply(DVec2::new(x1, y1)),
            to: self.transforms.apply(DVec2::new(x2, y2)),
            color: self.stroke,
            width: self.stroke_width * self.transforms.length_scale(),
            cap: self.cap,
            shadow: self.shadow,
        };
        self.calls.push(call);
    }

    fn clear(&mut self, background: Srgb) {
        let [r, g, b] = background.to_rgb8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, 255]);
        }
        self.transforms.reset();
        self.clears += 1;
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        self.pixel_writes += 1;
        &mut self.pixels
    }

    fn transforms(&self) -> &TransformStack {
        &self.transforms
    }

    fn transforms_mut(&mut self) -> &mut TransformStack {
        &mut self.transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn translate_then_scale_mirrors_about_canvas_edge() {
        let mut t = TransformStack::default();
        t.translate(100.0, 0.0);
        t.scale(-1.0, 1.0);
        assert!(close(t.apply(DVec2::new(10.0, 5.0)), DVec2::new(90.0, 5.0)));
    }

    #[test]
    fn rotation_about_center() {
        let mut t = TransformStack::default();
        t.translate(50.0, 50.0);
        t.rotate(FRAC_PI_2);
        t.translate(-50.0, -50.0);
        // (100, 50) is 50 right of center; a quarter turn puts it 50 below.
        assert!(close(t.apply(DVec2::new(100.0, 50.0)), DVec2::new(50.0, 100.0)));
    }

    #[test]
    fn push_pop_restores_transform() {
        let mut t = TransformStack::default();
        t.translate(3.0, 4.0);
        t.push();
        t.scale(2.0, 2.0);
        assert_eq!(t.depth(), 1);
        t.pop();
        assert_eq!(t.depth(), 0);
        assert!(close(t.apply(DVec2::ZERO), DVec2::new(3.0, 4.0)));
        assert!(close(t.apply(DVec2::ONE), DVec2::new(4.0, 5.0)));
    }

    #[test]
    fn unmatched_pop_resets_to_identity() {
        let mut t = TransformStack::default();
        t.translate(9.0, 9.0);
        t.pop();
        assert!(close(t.apply(DVec2::ZERO), DVec2::ZERO));
    }

    #[test]
    fn length_scale_ignores_mirroring() {
        let mut t = TransformStack::default();
        t.scale(-1.0, 1.0);
        assert!((t.length_scale() - 1.0).abs() < 1e-12);
        t.scale(3.0, 3.0);
        assert!((t.length_scale() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn recording_surface_stores_transformed_lines() {
        let mut s = RecordingSurface::new(10, 10);
        s.set_stroke(Srgb::WHITE.with_alpha(0.5));
        s.set_stroke_width(2.0);
        s.push();
        s.translate(1.0, 2.0);
        s.line(0.0, 0.0, 1.0, 0.0);
        s.pop();
        s.line(0.0, 0.0, 1.0, 0.0);
        let calls = s.calls();
        assert_eq!(calls.len(), 2);
        assert!(close(calls[0].from, DVec2::new(1.0, 2.0)));
        assert!(close(calls[1].from, DVec2::ZERO));
        assert_eq!(calls[0].width, 2.0);
        assert_eq!(calls[0].color.a, 0.5);
    }

    #[test]
    fn clear_fills_background_and_counts() {
        let mut s = RecordingSurface::new(2, 2);
        s.clear(Srgb::from_rgb8(1, 2, 3));
        assert_eq!(s.clears(), 1);
        assert_eq!(&s.pixels()[..4], &[1, 2, 3, 255]);
        assert_eq!(s.pixels().len(), 16);
    }

    #[test]
    fn pixels_mut_is_counted() {
        let mut s = RecordingSurface::new(1, 1);
        assert_eq!(s.pixel_writes(), 0);
        s.pixels_mut()[0] = 7;
        assert_eq!(s.pixel_writes(), 1);
        assert_eq!(s.pixels()[0], 7);
    }
}
