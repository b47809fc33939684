//! Timeline engine: span placement, interaction managers and the span tree.

mod bounds;
mod cursor;
mod divider;
mod drag;
mod geometry;
mod notify;
mod pointer;
mod tree;
mod visibility;

pub use bounds::{
    Bounds, BoundsFn, TimestampStatus, make_bounds_fn, normalize_timestamps, timestamp_status,
};
pub use cursor::{CursorGuide, CursorGuideState};
pub use divider::{
    DEFAULT_DIVIDER_POSITION, DividerDrag, DividerLine, DividerRegistry, DividerState, GhostLine,
};
pub use drag::{DragHandle, MIN_WINDOW_SIZE, ViewWindowDrag, ViewWindowState, WindowSelection};
pub use geometry::{
    Measurement, clamp, fraction_in_rect, measure, raw_fraction, to_percent, x_at_fraction,
};
pub use notify::{SubscriptionId, Subscribers};
pub use pointer::{HostFlags, PointerEvent, PointerHost, PointerKind};
pub use tree::{NodeId, RenderRow, SpanNode, SpanTree};
pub use visibility::{
    LayoutVisibility, MinimapGeometry, MinimapPanner, OverviewOffset, PanUpdate, VisibilityCallback,
    VisibilityEntry, VisibilityOptions, VisibilityProvider, ZoomSource,
};
