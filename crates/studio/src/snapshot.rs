//! PNG export of a rendered canvas.
//!
//! This module is feature-gated behind `png` (default on) so hosts that only
//! drive frames can depend on the studio without pulling in the `image` crate.

use flow_art_core::{FlowError, Surface};
use std::path::Path;

/// Writes the surface's RGBA pixels as a PNG image.
///
/// Returns `FlowError::Io` if the pixel buffer does not match the surface
/// dimensions or the write fails.
pub fn write_png(surface: &dyn Surface, path: &Path) -> Result<(), FlowError> {
    let img = image::RgbaImage::from_raw(
        surface.width(),
        surface.height(),
        surface.pixels().to_vec(),
    )
    .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FlowError::Io(e.to_string()))?;
    log::debug!(
        "wrote {}x{} PNG to {}",
        surface.width(),
        surface.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_art_core::{RasterCanvas, Srgb};

    #[test]
    fn write_png_round_trip() {
        let mut canvas = RasterCanvas::new(16, 12, Srgb::from_rgb8(235, 230, 220)).unwrap();
        canvas.set_stroke(Srgb::BLACK.with_alpha(1.0));
        canvas.set_stroke_width(3.0);
        canvas.line(2.0, 6.0, 14.0, 6.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");

        write_png(&canvas, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(0, 0).0, [235, 230, 220, 255]);
        assert_eq!(img.get_pixel(8, 6).0, canvas.pixel(8, 6).unwrap());
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let canvas = RasterCanvas::new(4, 4, Srgb::WHITE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_png(&canvas, &path), Err(FlowError::Io(_))));
    }
}
