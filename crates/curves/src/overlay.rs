//! Debug overlay: outlines of the zones and obstacles bending the field.

use std::f64::consts::TAU;

use flow_art_core::{Rgba, StrokeCap, Surface};
use glam::DVec2;

use crate::flow_field::FlowField;
use crate::zones::ZoneKind;

const OUTLINE_SEGMENTS: usize = 64;
const CENTER_MARK_RADIUS: f64 = 2.5;

fn zone_color(kind: ZoneKind) -> Rgba {
    match kind {
        ZoneKind::Vortex => Rgba::from_rgb8_alpha255(0, 0, 255, 100.0),
        ZoneKind::Sink => Rgba::from_rgb8_alpha255(255, 0, 0, 100.0),
        ZoneKind::Source => Rgba::from_rgb8_alpha255(0, 255, 0, 100.0),
    }
}

/// Strokes a circle as a closed polyline.
pub fn circle(surface: &mut dyn Surface, center: DVec2, radius: f64) {
    let point = |k: usize| {
        let a = TAU * k as f64 / OUTLINE_SEGMENTS as f64;
        center + DVec2::from_angle(a) * radius
    };
    for k in 0..OUTLINE_SEGMENTS {
        let (a, b) = (point(k), point(k + 1));
        surface.line(a.x, a.y, b.x, b.y);
    }
}

/// Draws every zone (blue vortex, red sink, green source) and obstacle
/// (orange) as an outline plus a small center mark.
pub fn draw_overlay(field: &FlowField, surface: &mut dyn Surface) {
    surface.set_shadow(None);
    surface.set_stroke_cap(StrokeCap::Round);
    surface.set_stroke_width(1.0);

    for zone in field.zones() {
        surface.set_stroke(zone_color(zone.kind));
        circle(surface, zone.center, zone.radius);
        circle(surface, zone.center, CENTER_MARK_RADIUS);
    }

    surface.set_stroke(Rgba::from_rgb8_alpha255(255, 165, 0, 150.0));
    for obstacle in field.obstacles() {
        circle(surface, obstacle.center, obstacle.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_art_core::{RecordingSurface, Settings, Xorshift64};
    use serde_json::json;

    #[test]
    fn circle_is_closed_and_on_radius() {
        let mut s = RecordingSurface::new(100, 100);
        circle(&mut s, DVec2::new(50.0, 50.0), 10.0);
        let calls = s.calls();
        assert_eq!(calls.len(), OUTLINE_SEGMENTS);
        assert!(calls[0].from.distance(calls[calls.len() - 1].to) < 1e-9);
        for c in calls {
            assert!((c.from.distance(DVec2::new(50.0, 50.0)) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn overlay_outlines_each_influence() {
        let settings = Settings::from_json(&json!({
            "num_zones": 2, "flow_obstacles": true, "num_obstacles": 3
        }));
        let field = FlowField::build(300, 200, &settings, &mut Xorshift64::new(1)).unwrap();
        let mut s = RecordingSurface::new(300, 200);
        draw_overlay(&field, &mut s);
        assert_eq!(s.calls().len(), (2 * 2 + 3) * OUTLINE_SEGMENTS);
        let orange = Rgba::from_rgb8_alpha255(255, 165, 0, 150.0);
        assert_eq!(s.calls()[s.calls().len() - 1].color, orange);
    }
}
