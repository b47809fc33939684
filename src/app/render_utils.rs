use eframe::egui::ecolor::Hsva;
use eframe::egui::{Color32, Rect};

use crate::timeline::{Bounds, clamp, x_at_fraction};
use crate::util::stable_hue;

pub(super) const FOG_COLOR: Color32 = Color32::from_rgba_premultiplied(10, 12, 16, 150);
pub(super) const HANDLE_COLOR: Color32 = Color32::from_rgb(150, 170, 200);
pub(super) const DIVIDER_COLOR: Color32 = Color32::from_rgb(70, 78, 92);
pub(super) const DIVIDER_HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(110, 160, 235);
pub(super) const GUIDE_COLOR: Color32 = Color32::from_rgb(230, 120, 90);
pub(super) const SELECTION_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 90, 140, 70);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Bar color for a span operation; equal ops always share a color.
pub(super) fn op_color(op: Option<&str>) -> Color32 {
    let op = op.unwrap_or_default();
    Hsva::new(stable_hue(op), 0.55, 0.85, 1.0).into()
}

/// Horizontal pixel range of a span bar inside `surface`, clipped to it.
///
/// Zero-length spans keep their fixed pixel width.
pub(super) fn bar_x_range(surface: Rect, bounds: &Bounds) -> Option<(f32, f32)> {
    if !bounds.is_visible() {
        return None;
    }

    match *bounds {
        Bounds::TimestampsEqual { start, width, .. } => {
            let left = x_at_fraction(surface, clamp(start, 0.0, 1.0));
            Some((left, (left + width as f32).min(surface.right())))
        }
        _ => {
            let (start, end) = bounds.extent()?;
            let left = x_at_fraction(surface, clamp(start, 0.0, 1.0));
            let right = x_at_fraction(surface, clamp(end, 0.0, 1.0));
            Some((left, right.max(left + 1.0)))
        }
    }
}
