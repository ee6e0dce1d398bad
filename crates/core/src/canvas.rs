//! Software raster implementation of [`Surface`].
//!
//! [`RasterCanvas`] owns an RGBA8 buffer and strokes segments with
//! signed-distance coverage: round caps are capsules, square caps are butt
//! boxes, project caps are boxes extended by half the width. Coverage is
//! anti-aliased over one pixel and composited source-over. A shadow is drawn
//! first as a wider stroke whose edge fades over the blur radius.

use glam::DVec2;

use crate::color::{Rgba, Srgb};
use crate::error::FlowError;
use crate::surface::{Shadow, StrokeCap, Surface, TransformStack};

/// An RGBA8 raster with a stroke state and transform stack.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    transforms: TransformStack,
    stroke: Rgba,
    stroke_width: f64,
    cap: StrokeCap,
    shadow: Option<Shadow>,
}

impl RasterCanvas {
    /// Creates a canvas cleared to `background`.
    ///
    /// Returns `FlowError::InvalidDimensions` if width or height is zero or
    /// the buffer size overflows.
    pub fn new(width: u32, height: u32, background: Srgb) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(FlowError::InvalidDimensions)?;
        let mut canvas = Self {
            width,
            height,
            pixels: vec![0; len],
            transforms: TransformStack::default(),
            stroke: Srgb::BLACK.with_alpha(1.0),
            stroke_width: 1.0,
            cap: StrokeCap::Round,
            shadow: None,
        };
        canvas.clear(background);
        Ok(canvas)
    }

    /// Reads one pixel as `[r, g, b, a]`. Out-of-range reads return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Consumes the canvas and returns its RGBA8 buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba, coverage: f64) {
        let a = (color.a * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y * self.width as usize + x) * 4;
        let src = [color.rgb.r, color.rgb.g, color.rgb.b];
        for (c, s) in src.iter().enumerate() {
            let dst = f64::from(self.pixels[i + c]) / 255.0;
            let out = s.clamp(0.0, 1.0) * a + dst * (1.0 - a);
            self.pixels[i + c] = (out * 255.0).round() as u8;
        }
        let dst_a = f64::from(self.pixels[i + 3]) / 255.0;
        self.pixels[i + 3] = ((a + dst_a * (1.0 - a)) * 255.0).round() as u8;
    }

    /// Rasterizes one device-space segment.
    ///
    /// `half_width` is the stroke half width, `feather` the distance over
    /// which coverage falls from 1 to 0 at the edge (at least one pixel).
    fn stroke_segment(
        &mut self,
        a: DVec2,
        b: DVec2,
        half_width: f64,
        cap: StrokeCap,
        color: Rgba,
        feather: f64,
    ) {
        if half_width.is_nan() || half_width <= 0.0 || !a.is_finite() || !b.is_finite() {
            return;
        }
        let feather = feather.max(1.0);
        let delta = b - a;
        let len = delta.length();
        let axis = if len > 1e-9 { delta / len } else { DVec2::X };
        let normal = axis.perp();
        let extend = match cap {
            StrokeCap::Project => half_width,
            _ => 0.0,
        };
        if len <= 1e-9 && cap == StrokeCap::Square {
            return;
        }

        let reach = half_width + extend + feather;
        let min = a.min(b) - DVec2::splat(reach);
        let max = a.max(b) + DVec2::splat(reach);
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().min(f64::from(self.width) - 1.0)).max(-1.0);
        let y1 = (max.y.ceil().min(f64::from(self.height) - 1.0)).max(-1.0);
        if x1 < 0.0 || y1 < 0.0 {
            return;
        }
        let (x1, y1) = (x1 as usize, y1 as usize);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - a;
                let along = p.dot(axis);
                let across = p.dot(normal).abs();
                let distance = match cap {
                    StrokeCap::Round => {
                        let t = along.clamp(0.0, len);
                        (p - axis * t).length() - half_width
                    }
                    StrokeCap::Square | StrokeCap::Project => {
                        let qx = (-along - extend).max(along - len - extend);
                        let qy = across - half_width;
                        let outside = DVec2::new(qx.max(0.0), qy.max(0.0)).length();
                        outside + qx.max(qy).min(0.0)
                    }
                };
                let coverage = (0.5 - distance / feather).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

impl Surface for RasterCanvas {
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
        let a = self.transforms.apply(DVec2::new(x1, y1));
        let b = self.transforms.apply(DVec2::new(x2, y2));
        let half_width = self.stroke_width * self.transforms.length_scale() / 2.0;

        if let Some(shadow) = self.shadow {
            let blur = shadow.blur.max(0.0);
            self.stroke_segment(
                a,
                b,
                half_width + blur / 2.0,
                self.cap,
                shadow.color,
                blur,
            );
        }
        self.stroke_segment(a, b, half_width, self.cap, self.stroke, 1.0);
    }

    fn clear(&mut self, background: Srgb) {
        let [r, g, b] = background.to_rgb8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, 255]);
        }
        self.transforms.reset();
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn transforms(&self) -> &TransformStack {
        &self.transforms
    }

    fn transforms_mut(&mut self) -> &mut TransformStack {
        &mut self.transforms
    }
}
