//! Full-frame film grain.

use flow_art_core::{Surface, Xorshift64};

/// Offsets every pixel's RGB channels by one shared random amount in
/// `[-255, 255) * amount`, clamped to the byte range. Alpha is untouched.
/// Does nothing for non-positive amounts.
pub fn apply_global_grain(surface: &mut dyn Surface, amount: f64, rng: &mut Xorshift64) {
    if amount.is_nan() || amount <= 0.0 {
        return;
    }
    for px in surface.pixels_mut().chunks_exact_mut(4) {
        let offset = rng.next_range(-255.0, 255.0) * amount;
        for channel in &mut px[..3] {
            *channel = (f64::from(*channel) + offset).round().clamp(0.0, 255.0) as u8;
        }
    }
    log::debug!("global grain applied (amount {amount})");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_art_core::{RecordingSurface, Srgb};

    fn gray_surface() -> RecordingSurface {
        let mut s = RecordingSurface::new(8, 8);
        s.clear(Srgb::from_rgb8(128, 128, 128));
        s
    }

    #[test]
    fn zero_amount_leaves_pixels_alone() {
        let mut s = gray_surface();
        apply_global_grain(&mut s, 0.0, &mut Xorshift64::new(1));
        assert_eq!(s.pixel_writes(), 0);
        assert!(s.pixels().chunks_exact(4).all(|p| p == [128, 128, 128, 255]));
    }

    #[test]
    fn channels_share_one_offset_and_alpha_is_kept() {
        let mut s = gray_surface();
        apply_global_grain(&mut s, 0.1, &mut Xorshift64::new(2));
        assert_eq!(s.pixel_writes(), 1);
        for p in s.pixels().chunks_exact(4) {
            assert_eq!(p[0], p[1]);
            assert_eq!(p[1], p[2]);
            assert_eq!(p[3], 255);
            assert!(p[0].abs_diff(128) <= 26);
        }
        assert!(s.pixels().chunks_exact(4).any(|p| p[0] != 128));
    }

    #[test]
    fn full_amount_clamps() {
        let mut s = gray_surface();
        apply_global_grain(&mut s, 1e6, &mut Xorshift64::new(3));
        assert!(s.pixels().chunks_exact(4).all(|p| p[0] == 0 || p[0] == 255));
    }
}
