//! Keeps the overview strip scrolled in step with the waterfall.
//!
//! Rows report how much of them is visible below the minimap through a
//! [`VisibilityProvider`]; [`MinimapPanner`] turns those reports into a
//! vertical offset for the overview strip.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use eframe::egui::Rect;
use tracing::debug;

use super::tree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityOptions {
    /// Band at the top of the viewport that does not count as visible.
    pub top_margin: f32,
    /// Notifications fire when the ratio crosses a multiple of `1 / threshold_steps`.
    pub threshold_steps: u32,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            top_margin: 0.0,
            threshold_steps: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub sequence: usize,
    pub bounding_rect: Rect,
    /// Viewport with the top margin applied, never above `rows_top`.
    pub root_bounds: Rect,
    pub viewport: Rect,
    /// Where the host actually laid out the top of the rows region.
    pub rows_top: f32,
    pub intersection_ratio: f32,
}

pub type VisibilityCallback = Box<dyn FnMut(&VisibilityEntry)>;

pub trait VisibilityProvider {
    fn on_visibility_change(
        &mut self,
        row: NodeId,
        sequence: usize,
        options: VisibilityOptions,
        callback: VisibilityCallback,
    );

    fn disconnect_all(&mut self);
}

/// Shared vertical offset of the overview strip; last write wins.
#[derive(Clone, Debug, Default)]
pub struct OverviewOffset(Rc<Cell<f32>>);

impl OverviewOffset {
    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, offset: f32) {
        self.0.set(offset);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapGeometry {
    pub strip_height: f32,
    pub bar_height: f32,
    pub axis_height: f32,
}

impl Default for MinimapGeometry {
    fn default() -> Self {
        Self {
            strip_height: 120.0,
            bar_height: 5.0,
            axis_height: 20.0,
        }
    }
}

impl MinimapGeometry {
    /// Rows the strip shows without panning.
    pub fn capacity(&self) -> usize {
        if self.bar_height <= 0.0 {
            return 0;
        }
        (self.strip_height / self.bar_height).floor() as usize
    }

    pub fn block_height(&self) -> f32 {
        self.strip_height + self.axis_height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomSource {
    /// Scale reported by the host; never second-guessed.
    Explicit(f32),
    /// Scale inferred from where the host actually put the root boundary.
    Inferred,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanUpdate {
    Inactive,
    Skipped,
    Offset(f32),
    Resubscribe,
}

#[derive(Clone, Debug)]
pub struct MinimapPanner {
    geometry: MinimapGeometry,
    /// Spans below the root; the strip draws one more bar for the root itself.
    span_count: usize,
    offset: OverviewOffset,
    zoom_source: ZoomSource,
    zoom_level: Rc<Cell<f32>>,
    resubscribe: Rc<Cell<bool>>,
}

impl MinimapPanner {
    pub fn new(
        geometry: MinimapGeometry,
        span_count: usize,
        offset: OverviewOffset,
        zoom_source: ZoomSource,
    ) -> Self {
        let zoom_level = match zoom_source {
            ZoomSource::Explicit(scale) if scale > 0.0 => scale,
            _ => 1.0,
        };
        Self {
            geometry,
            span_count,
            offset,
            zoom_source,
            zoom_level: Rc::new(Cell::new(zoom_level)),
            resubscribe: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.span_count > self.geometry.capacity()
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom_level.get()
    }

    pub fn options(&self) -> VisibilityOptions {
        VisibilityOptions {
            top_margin: self.expected_margin(),
            ..VisibilityOptions::default()
        }
    }

    pub fn max_offset(&self) -> f32 {
        let capacity = self.geometry.capacity();
        let stop_at = (self.span_count + 1).saturating_sub(capacity);
        stop_at as f32 * self.geometry.bar_height
    }

    /// Minimap block height in laid-out points under the stored zoom.
    fn expected_margin(&self) -> f32 {
        self.geometry.block_height() * self.zoom_level.get()
    }

    /// True once after a zoom correction asked for fresh observers.
    pub fn take_resubscribe(&self) -> bool {
        self.resubscribe.replace(false)
    }

    pub fn observe_rows(
        &self,
        provider: &mut dyn VisibilityProvider,
        rows: impl IntoIterator<Item = (NodeId, usize)>,
    ) {
        provider.disconnect_all();
        if !self.is_active() {
            return;
        }

        let options = self.options();
        for (row, sequence) in rows {
            let panner = self.clone();
            provider.on_visibility_change(
                row,
                sequence,
                options,
                Box::new(move |entry: &VisibilityEntry| {
                    panner.handle(entry);
                }),
            );
        }
    }

    pub fn handle(&self, entry: &VisibilityEntry) -> PanUpdate {
        if !self.is_active() {
            return PanUpdate::Inactive;
        }

        if self.zoom_source == ZoomSource::Inferred && self.correct_zoom(entry) {
            return PanUpdate::Resubscribe;
        }

        let top = entry.bounding_rect.top() - entry.root_bounds.top();
        let bottom = top + entry.bounding_rect.height();
        if bottom <= 0.0 {
            return PanUpdate::Skipped;
        }

        if top >= 0.0 {
            if entry.sequence == 1 {
                self.offset.set(0.0);
                return PanUpdate::Offset(0.0);
            }
            return PanUpdate::Skipped;
        }

        let bar = self.geometry.bar_height;
        let rows_above = entry.sequence.saturating_sub(1) as f32;
        let hidden = (1.0 - entry.intersection_ratio.clamp(0.0, 1.0)) * bar;
        let offset = (rows_above * bar + hidden).min(self.max_offset());

        self.offset.set(offset);
        PanUpdate::Offset(offset)
    }

    fn correct_zoom(&self, entry: &VisibilityEntry) -> bool {
        let block_height = self.geometry.block_height();
        let expected = self.expected_margin();
        let observed = entry.rows_top - entry.viewport.top();
        if block_height <= 0.0 || observed <= 0.0 || (observed - expected).abs() <= 1.0 {
            return false;
        }

        let zoom_level = observed / block_height;
        debug!(observed, expected, zoom_level, "rescaling minimap root margin");
        self.zoom_level.set(zoom_level);
        self.resubscribe.set(true);
        true
    }
}

struct Observer {
    row: NodeId,
    sequence: usize,
    options: VisibilityOptions,
    callback: VisibilityCallback,
    last_bucket: Option<u32>,
}

/// Visibility provider fed from the row rectangles of each layout pass.
#[derive(Default)]
pub struct LayoutVisibility {
    observers: Vec<Observer>,
}

impl fmt::Debug for LayoutVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutVisibility")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl VisibilityProvider for LayoutVisibility {
    fn on_visibility_change(
        &mut self,
        row: NodeId,
        sequence: usize,
        options: VisibilityOptions,
        callback: VisibilityCallback,
    ) {
        let position = self
            .observers
            .partition_point(|observer| observer.sequence <= sequence);
        self.observers.insert(
            position,
            Observer {
                row,
                sequence,
                options,
                callback,
                last_bucket: None,
            },
        );
    }

    fn disconnect_all(&mut self) {
        self.observers.clear();
    }
}

impl LayoutVisibility {
    pub fn observed(&self) -> usize {
        self.observers.len()
    }

    /// Reports rows whose visible ratio changed since the previous pass, in
    /// sequence order. `rows_top` is the top of the clip the rows were laid
    /// out in. Returns how many notifications went out.
    pub fn deliver(
        &mut self,
        viewport: Rect,
        rows_top: f32,
        layout: &HashMap<NodeId, Rect>,
    ) -> usize {
        let mut delivered = 0;

        for observer in &mut self.observers {
            let Some(&rect) = layout.get(&observer.row) else {
                continue;
            };

            let mut root_bounds = viewport;
            root_bounds.min.y = (viewport.top() + observer.options.top_margin)
                .max(rows_top)
                .min(viewport.bottom());

            let ratio = intersection_ratio(rect, root_bounds);
            let steps = observer.options.threshold_steps.max(1);
            let bucket = (ratio * steps as f32).round() as u32;
            if observer.last_bucket == Some(bucket) {
                continue;
            }
            observer.last_bucket = Some(bucket);

            (observer.callback)(&VisibilityEntry {
                sequence: observer.sequence,
                bounding_rect: rect,
                root_bounds,
                viewport,
                rows_top,
                intersection_ratio: ratio,
            });
            delivered += 1;
        }

        delivered
    }
}

fn intersection_ratio(rect: Rect, root: Rect) -> f32 {
    let height = rect.height();
    if height <= 0.0 {
        return 0.0;
    }
    let top = rect.top().max(root.top());
    let bottom = rect.bottom().min(root.bottom());
    ((bottom - top).max(0.0) / height).clamp(0.0, 1.0)
}
