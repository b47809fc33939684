//! Divider between the label column and the timeline column.
//!
//! While a drag is in flight the managed position stays put; the live
//! position is written straight into [`DividerRegistry`], which rows read
//! when they paint. Only the release commits and notifies subscribers.

use std::collections::HashMap;

use eframe::egui::Rect;
use tracing::{debug, trace};

use super::geometry::{clamp, raw_fraction};
use super::notify::{SubscriptionId, Subscribers};
use super::pointer::{PointerEvent, PointerHost, PointerKind};
use super::tree::NodeId;

pub const DEFAULT_DIVIDER_POSITION: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DividerLine {
    pub position: f64,
    pub highlighted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostLine {
    pub position: f64,
    pub visible: bool,
}

/// Retained per-row divider visuals, keyed by row.
#[derive(Debug, Default)]
pub struct DividerRegistry {
    lines: HashMap<NodeId, DividerLine>,
    ghosts: HashMap<NodeId, GhostLine>,
}

impl DividerRegistry {
    pub fn line(&self, row: NodeId) -> Option<DividerLine> {
        self.lines.get(&row).copied()
    }

    pub fn ghost(&self, row: NodeId) -> Option<GhostLine> {
        self.ghosts.get(&row).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn register(&mut self, row: NodeId, position: f64) {
        self.lines.insert(
            row,
            DividerLine {
                position,
                highlighted: false,
            },
        );
        self.ghosts.insert(
            row,
            GhostLine {
                position,
                visible: false,
            },
        );
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.ghosts.clear();
    }

    fn set_position(&mut self, position: f64) {
        for line in self.lines.values_mut() {
            line.position = position;
        }
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        for line in self.lines.values_mut() {
            line.highlighted = highlighted;
        }
    }

    fn show_ghosts(&mut self, position: f64) {
        for ghost in self.ghosts.values_mut() {
            ghost.position = position;
            ghost.visible = true;
        }
    }

    fn hide_ghosts(&mut self) {
        for ghost in self.ghosts.values_mut() {
            ghost.visible = false;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DividerState {
    pub divider_position: f64,
}

#[derive(Debug)]
pub struct DividerDrag {
    divider_position: f64,
    live_position: f64,
    is_dragging: bool,
    tracking: bool,
    registry: DividerRegistry,
    subscribers: Subscribers<DividerState>,
}

impl Default for DividerDrag {
    fn default() -> Self {
        Self::new(DEFAULT_DIVIDER_POSITION)
    }
}

impl DividerDrag {
    pub fn new(position: f64) -> Self {
        let position = clamp(position, 0.0, 1.0);
        Self {
            divider_position: position,
            live_position: position,
            is_dragging: false,
            tracking: false,
            registry: DividerRegistry::default(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn divider_position(&self) -> f64 {
        self.divider_position
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn registry(&self) -> &DividerRegistry {
        &self.registry
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DividerState) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Replaces the registered rows; each starts at the committed position.
    pub fn mount_rows(&mut self, rows: impl IntoIterator<Item = NodeId>) {
        self.registry.clear();
        for row in rows {
            self.registry.register(row, self.divider_position);
        }
        if self.is_dragging {
            self.registry.set_position(self.live_position);
            self.registry.set_highlighted(true);
            self.registry.show_ghosts(self.divider_position);
        }
    }

    pub fn drag_start(&mut self, surface: Option<Rect>, host: &mut dyn PointerHost) -> bool {
        if self.is_dragging || surface.is_none() {
            trace!("ignored divider drag start");
            return false;
        }

        host.attach_global_tracking();
        host.set_selection_suppressed(true);
        self.tracking = true;
        self.is_dragging = true;
        self.live_position = self.divider_position;
        self.registry.show_ghosts(self.divider_position);
        self.registry.set_highlighted(true);
        true
    }

    pub fn drag_move(&mut self, event: &PointerEvent, surface: Option<Rect>) -> bool {
        if !self.is_dragging || event.kind != PointerKind::Move {
            return false;
        }
        let Some(surface) = surface else {
            return false;
        };

        self.live_position = clamp(raw_fraction(surface, event.pos), 0.0, 1.0);
        self.registry.set_position(self.live_position);
        true
    }

    pub fn drag_end(&mut self, event: &PointerEvent, host: &mut dyn PointerHost) -> bool {
        if !self.is_dragging || event.kind != PointerKind::Release {
            trace!(kind = ?event.kind, "ignored divider drag end");
            return false;
        }

        self.is_dragging = false;
        self.release(host);
        self.divider_position = self.live_position;
        self.registry.set_position(self.divider_position);
        self.registry.set_highlighted(false);
        self.registry.hide_ghosts();

        debug!(position = self.divider_position, "divider committed");
        let state = DividerState {
            divider_position: self.divider_position,
        };
        self.subscribers.notify(&state);
        true
    }

    pub fn hover_enter(&mut self) {
        if !self.is_dragging {
            self.registry.set_highlighted(true);
        }
    }

    pub fn hover_leave(&mut self) {
        if !self.is_dragging {
            self.registry.set_highlighted(false);
        }
    }

    pub fn cancel(&mut self, host: &mut dyn PointerHost) {
        if !self.is_dragging {
            return;
        }
        self.is_dragging = false;
        self.live_position = self.divider_position;
        self.registry.set_position(self.divider_position);
        self.registry.set_highlighted(false);
        self.registry.hide_ghosts();
        self.release(host);
    }

    fn release(&mut self, host: &mut dyn PointerHost) {
        if !self.tracking {
            return;
        }
        host.detach_global_tracking();
        host.set_selection_suppressed(false);
        self.tracking = false;
    }
}
