//! Maps absolute span timestamps into fractions of the current view window.
//!
//! Build one [`BoundsFn`] per view-window change with [`make_bounds_fn`] and
//! apply it to every span of the render pass.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampStatus {
    Equal,
    Reversed,
    Stable,
}

pub fn normalize_timestamps(start: f64, end: f64) -> (f64, f64) {
    if start > end { (end, start) } else { (start, end) }
}

pub fn timestamp_status(start: f64, end: f64) -> TimestampStatus {
    if start == end {
        TimestampStatus::Equal
    } else if start > end {
        TimestampStatus::Reversed
    } else {
        TimestampStatus::Stable
    }
}

/// Fractional placement of a span relative to the view window.
///
/// `0.0` is the window's left edge and `1.0` its right edge; values outside
/// that range lie off-screen. The two `Trace*`/`InvalidViewWindow` variants
/// describe degenerate inputs that renderers treat as "nothing to place".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    TraceTimestampsEqual {
        is_visible: bool,
    },
    InvalidViewWindow {
        is_visible: bool,
    },
    /// Zero-length span; `width` is in pixels.
    TimestampsEqual {
        start: f64,
        width: f64,
        is_visible: bool,
    },
    TimestampsReversed {
        start: f64,
        end: f64,
        is_visible: bool,
    },
    TimestampsStable {
        start: f64,
        end: f64,
        is_visible: bool,
    },
}

impl Bounds {
    pub fn is_visible(&self) -> bool {
        match *self {
            Self::TraceTimestampsEqual { is_visible }
            | Self::InvalidViewWindow { is_visible }
            | Self::TimestampsEqual { is_visible, .. }
            | Self::TimestampsReversed { is_visible, .. }
            | Self::TimestampsStable { is_visible, .. } => is_visible,
        }
    }

    /// `(start, end)` fractions, `None` for degenerate traces and windows.
    pub fn extent(&self) -> Option<(f64, f64)> {
        match *self {
            Self::TraceTimestampsEqual { .. } | Self::InvalidViewWindow { .. } => None,
            Self::TimestampsEqual { start, .. } => Some((start, start)),
            Self::TimestampsReversed { start, end, .. }
            | Self::TimestampsStable { start, end, .. } => Some((start, end)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Window {
    TraceEqual,
    Invalid,
    Valid { start: f64, duration: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsFn {
    window: Window,
}

pub fn make_bounds_fn(
    trace_start: f64,
    trace_end: f64,
    view_start: f64,
    view_end: f64,
) -> BoundsFn {
    let (trace_start, trace_end) = normalize_timestamps(trace_start, trace_end);
    let trace_duration = trace_end - trace_start;

    // `!(x > 0)` also routes NaN durations to the degenerate variants.
    let window = if !(trace_duration > 0.0) {
        Window::TraceEqual
    } else {
        let view_start_ts = trace_start + view_start * trace_duration;
        let view_end_ts = trace_end - (1.0 - view_end) * trace_duration;
        let view_duration = view_end_ts - view_start_ts;

        if !(view_duration > 0.0) {
            Window::Invalid
        } else {
            Window::Valid {
                start: view_start_ts,
                duration: view_duration,
            }
        }
    };

    BoundsFn { window }
}

impl BoundsFn {
    pub fn bounds(&self, span_start: f64, span_end: f64) -> Bounds {
        let (view_start, view_duration) = match self.window {
            Window::TraceEqual => return Bounds::TraceTimestampsEqual { is_visible: true },
            Window::Invalid => return Bounds::InvalidViewWindow { is_visible: true },
            Window::Valid { start, duration } => (start, duration),
        };

        let (span_start, span_end) = normalize_timestamps(span_start, span_end);
        let start = (span_start - view_start) / view_duration;
        let end = (span_end - view_start) / view_duration;
        let is_visible = end > 0.0 && start < 1.0;

        match timestamp_status(span_start, span_end) {
            TimestampStatus::Equal => Bounds::TimestampsEqual {
                start,
                width: 1.0,
                is_visible,
            },
            TimestampStatus::Reversed => Bounds::TimestampsReversed {
                start,
                end,
                is_visible,
            },
            TimestampStatus::Stable => Bounds::TimestampsStable {
                start,
                end,
                is_visible,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_span_in_full_window() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.0, 1.0).bounds(0.0, 50.0);
        assert_eq!(
            bounds,
            Bounds::TimestampsStable {
                start: 0.0,
                end: 0.5,
                is_visible: true,
            }
        );
    }

    #[test]
    fn span_left_of_zoomed_window_is_hidden() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.5, 1.0).bounds(0.0, 50.0);
        assert!(!bounds.is_visible());
        assert_eq!(bounds.extent(), Some((-1.0, 0.0)));
    }

    #[test]
    fn span_right_of_window_is_hidden() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.0, 0.5).bounds(50.0, 80.0);
        assert!(!bounds.is_visible());
    }

    #[test]
    fn equal_trace_timestamps() {
        let make = make_bounds_fn(10.0, 10.0, 0.0, 1.0);
        for (start, end) in [(10.0, 10.0), (0.0, 20.0), (30.0, 5.0)] {
            assert_eq!(
                make.bounds(start, end),
                Bounds::TraceTimestampsEqual { is_visible: true }
            );
        }
    }

    #[test]
    fn reversed_trace_timestamps_are_swapped() {
        let forward = make_bounds_fn(0.0, 100.0, 0.0, 1.0).bounds(25.0, 75.0);
        let reversed = make_bounds_fn(100.0, 0.0, 0.0, 1.0).bounds(25.0, 75.0);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn collapsed_view_window_is_invalid() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.6, 0.4).bounds(0.0, 50.0);
        assert_eq!(bounds, Bounds::InvalidViewWindow { is_visible: true });
        assert_eq!(bounds.extent(), None);
    }

    #[test]
    fn zero_length_span_gets_pixel_width() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.0, 1.0).bounds(40.0, 40.0);
        assert_eq!(
            bounds,
            Bounds::TimestampsEqual {
                start: 0.4,
                width: 1.0,
                is_visible: true,
            }
        );
    }

    #[test]
    fn reversed_span_is_normalized_before_classification() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.0, 1.0).bounds(50.0, 0.0);
        assert_eq!(
            bounds,
            Bounds::TimestampsStable {
                start: 0.0,
                end: 0.5,
                is_visible: true,
            }
        );
    }

    #[test]
    fn zoomed_window_rescales() {
        let bounds = make_bounds_fn(0.0, 100.0, 0.25, 0.75).bounds(50.0, 75.0);
        assert_eq!(bounds.extent(), Some((0.5, 1.0)));
        assert!(bounds.is_visible());
    }
}
