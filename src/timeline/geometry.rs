use eframe::egui::{Pos2, Rect};

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Fraction rendered the way bar offsets are written, e.g. `0.25` → `25.000%`.
pub fn to_percent(fraction: f64) -> String {
    format!("{:.3}%", fraction * 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub fn measure(rect: Rect) -> Measurement {
    Measurement {
        x: rect.left(),
        y: rect.top(),
        width: rect.width().max(0.0),
        height: rect.height().max(0.0),
    }
}

/// Horizontal position of `pos` across `rect`, not clamped.
pub fn raw_fraction(rect: Rect, pos: Pos2) -> f64 {
    let measured = measure(rect);
    if measured.width <= f32::EPSILON {
        return 0.0;
    }
    f64::from(pos.x - measured.x) / f64::from(measured.width)
}

pub fn fraction_in_rect(rect: Rect, pos: Pos2) -> f64 {
    clamp(raw_fraction(rect, pos), 0.0, 1.0)
}

pub fn x_at_fraction(rect: Rect, fraction: f64) -> f32 {
    rect.left() + (fraction as f32) * rect.width()
}
