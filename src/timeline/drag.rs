//! View-window drag manager.
//!
//! Live handle positions follow the pointer; `view_window_start`/`end` only
//! change when a drag is released, so a render pass sees a single window.

use eframe::egui::Rect;
use tracing::{debug, trace};

use super::geometry::{clamp, raw_fraction};
use super::notify::{SubscriptionId, Subscribers};
use super::pointer::{PointerEvent, PointerHost, PointerKind};

pub const MIN_WINDOW_SIZE: f64 = 0.005;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragHandle {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowSelection {
    pub is_dragging: bool,
    pub initial: f64,
    pub current: f64,
}

impl WindowSelection {
    pub fn range(&self) -> (f64, f64) {
        (self.initial.min(self.current), self.initial.max(self.current))
    }

    pub fn size(&self) -> f64 {
        (self.current - self.initial).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewWindowState {
    pub is_dragging: bool,
    pub dragging_handle: DragHandle,
    pub left_handle_position: f64,
    pub right_handle_position: f64,
    pub view_window_start: f64,
    pub view_window_end: f64,
    pub window_selection: WindowSelection,
}

impl Default for ViewWindowState {
    fn default() -> Self {
        Self {
            is_dragging: false,
            dragging_handle: DragHandle::None,
            left_handle_position: 0.0,
            right_handle_position: 1.0,
            view_window_start: 0.0,
            view_window_end: 1.0,
            window_selection: WindowSelection::default(),
        }
    }
}

impl ViewWindowState {
    pub fn is_zoomed(&self) -> bool {
        self.view_window_start > 0.0 || self.view_window_end < 1.0
    }

    fn any_drag(&self) -> bool {
        self.is_dragging || self.window_selection.is_dragging
    }
}

#[derive(Debug, Default)]
pub struct ViewWindowDrag {
    state: ViewWindowState,
    tracking: bool,
    subscribers: Subscribers<ViewWindowState>,
}

impl ViewWindowDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewWindowState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewWindowState) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn drag_start(
        &mut self,
        handle: DragHandle,
        surface: Option<Rect>,
        host: &mut dyn PointerHost,
    ) -> bool {
        if self.state.any_drag() || surface.is_none() || handle == DragHandle::None {
            trace!(?handle, "ignored view window drag start");
            return false;
        }

        self.capture(host);
        self.state.is_dragging = true;
        self.state.dragging_handle = handle;
        true
    }

    pub fn drag_move(&mut self, event: &PointerEvent, surface: Option<Rect>) -> bool {
        if !self.state.is_dragging || event.kind != PointerKind::Move {
            return false;
        }
        let Some(surface) = surface else {
            return false;
        };

        let fraction = clamp(raw_fraction(surface, event.pos), 0.0, 1.0);
        match self.state.dragging_handle {
            DragHandle::Left => {
                let limit = self.state.right_handle_position - MIN_WINDOW_SIZE;
                self.state.left_handle_position = fraction.min(limit);
            }
            DragHandle::Right => {
                let limit = self.state.left_handle_position + MIN_WINDOW_SIZE;
                self.state.right_handle_position = fraction.max(limit);
            }
            DragHandle::None => return false,
        }
        true
    }

    pub fn drag_end(&mut self, event: &PointerEvent, host: &mut dyn PointerHost) -> bool {
        if !self.state.is_dragging || event.kind != PointerKind::Release {
            trace!(kind = ?event.kind, "ignored view window drag end");
            return false;
        }

        match self.state.dragging_handle {
            DragHandle::Left => self.state.view_window_start = self.state.left_handle_position,
            DragHandle::Right => self.state.view_window_end = self.state.right_handle_position,
            DragHandle::None => {}
        }
        self.state.is_dragging = false;
        self.state.dragging_handle = DragHandle::None;
        self.release(host);
        self.commit();
        true
    }

    /// Press on the overview body begins selecting a new window.
    pub fn selection_start(
        &mut self,
        event: &PointerEvent,
        surface: Option<Rect>,
        host: &mut dyn PointerHost,
    ) -> bool {
        if self.state.any_drag() || event.kind != PointerKind::Press {
            return false;
        }
        let Some(surface) = surface else {
            return false;
        };

        let fraction = clamp(raw_fraction(surface, event.pos), 0.0, 1.0);
        self.capture(host);
        self.state.window_selection = WindowSelection {
            is_dragging: true,
            initial: fraction,
            current: fraction,
        };
        true
    }

    pub fn selection_move(&mut self, event: &PointerEvent, surface: Option<Rect>) -> bool {
        if !self.state.window_selection.is_dragging || event.kind != PointerKind::Move {
            return false;
        }
        let Some(surface) = surface else {
            return false;
        };

        self.state.window_selection.current = clamp(raw_fraction(surface, event.pos), 0.0, 1.0);
        true
    }

    pub fn selection_end(&mut self, event: &PointerEvent, host: &mut dyn PointerHost) -> bool {
        if !self.state.window_selection.is_dragging || event.kind != PointerKind::Release {
            return false;
        }

        let selection = self.state.window_selection;
        self.state.window_selection = WindowSelection::default();
        self.release(host);

        if selection.size() < MIN_WINDOW_SIZE {
            debug!(size = selection.size(), "window selection too small, keeping view");
            return false;
        }

        let (start, end) = selection.range();
        self.set_window(start, end);
        true
    }

    pub fn reset_window(&mut self) {
        if self.state.any_drag() {
            return;
        }
        self.set_window(0.0, 1.0);
    }

    /// Drops an in-flight drag without committing it.
    pub fn cancel(&mut self, host: &mut dyn PointerHost) {
        if !self.tracking {
            return;
        }

        self.state.is_dragging = false;
        self.state.dragging_handle = DragHandle::None;
        self.state.left_handle_position = self.state.view_window_start;
        self.state.right_handle_position = self.state.view_window_end;
        self.state.window_selection = WindowSelection::default();
        self.release(host);
    }

    fn set_window(&mut self, start: f64, end: f64) {
        self.state.left_handle_position = start;
        self.state.right_handle_position = end;
        self.state.view_window_start = start;
        self.state.view_window_end = end;
        self.commit();
    }

    fn capture(&mut self, host: &mut dyn PointerHost) {
        host.attach_global_tracking();
        host.set_selection_suppressed(true);
        self.tracking = true;
    }

    fn release(&mut self, host: &mut dyn PointerHost) {
        if !self.tracking {
            return;
        }
        host.detach_global_tracking();
        host.set_selection_suppressed(false);
        self.tracking = false;
    }

    fn commit(&mut self) {
        debug!(
            start = self.state.view_window_start,
            end = self.state.view_window_end,
            "view window committed"
        );
        let state = self.state;
        self.subscribers.notify(&state);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use eframe::egui::pos2;

    use super::*;
    use crate::timeline::pointer::HostFlags;

    fn surface() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 20.0))
    }

    fn at(kind: PointerKind, x: f32) -> PointerEvent {
        PointerEvent::new(kind, pos2(x, 5.0))
    }

    #[test]
    fn left_handle_stops_short_of_right() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        assert!(drag.drag_start(DragHandle::Left, Some(surface()), &mut host));
        assert!(drag.drag_move(&at(PointerKind::Move, 999.0), Some(surface())));

        assert_eq!(drag.state().left_handle_position, 1.0 - MIN_WINDOW_SIZE);
        assert_eq!(drag.state().view_window_start, 0.0);
    }

    #[test]
    fn right_handle_stops_short_of_left() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        drag.drag_start(DragHandle::Right, Some(surface()), &mut host);
        drag.drag_move(&at(PointerKind::Move, -300.0), Some(surface()));

        assert_eq!(drag.state().right_handle_position, MIN_WINDOW_SIZE);
    }

    #[test]
    fn release_commits_and_restores_host() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();
        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        drag.subscribe(move |_| counter.set(counter.get() + 1));

        drag.drag_start(DragHandle::Left, Some(surface()), &mut host);
        assert!(host.global_tracking);
        assert!(host.selection_suppressed);

        drag.drag_move(&at(PointerKind::Move, 250.0), Some(surface()));
        assert!(drag.drag_end(&at(PointerKind::Release, 250.0), &mut host));

        let state = drag.state();
        assert_eq!(state.view_window_start, 0.25);
        assert_eq!(state.view_window_end, 1.0);
        assert!(!state.is_dragging);
        assert_eq!(state.dragging_handle, DragHandle::None);
        assert_eq!(host, HostFlags::default());
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        assert!(!drag.drag_end(&at(PointerKind::Release, 10.0), &mut host));
        assert!(!drag.drag_move(&at(PointerKind::Move, 10.0), Some(surface())));

        drag.drag_start(DragHandle::Right, Some(surface()), &mut host);
        assert!(!drag.drag_end(&at(PointerKind::Move, 10.0), &mut host));
        assert!(drag.state().is_dragging);
    }

    #[test]
    fn start_requires_mounted_surface_and_idle_state() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        assert!(!drag.drag_start(DragHandle::Left, None, &mut host));
        assert!(!host.global_tracking);

        assert!(drag.drag_start(DragHandle::Left, Some(surface()), &mut host));
        assert!(!drag.drag_start(DragHandle::Right, Some(surface()), &mut host));
        assert_eq!(drag.state().dragging_handle, DragHandle::Left);
    }

    #[test]
    fn selection_commits_both_edges() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        assert!(drag.selection_start(&at(PointerKind::Press, 600.0), Some(surface()), &mut host));
        drag.selection_move(&at(PointerKind::Move, 200.0), Some(surface()));
        assert_eq!(drag.state().window_selection.range(), (0.2, 0.6));
        assert!(drag.selection_end(&at(PointerKind::Release, 200.0), &mut host));

        let state = drag.state();
        assert_eq!((state.view_window_start, state.view_window_end), (0.2, 0.6));
        assert_eq!(
            (state.left_handle_position, state.right_handle_position),
            (0.2, 0.6)
        );
        assert!(!state.window_selection.is_dragging);
        assert!(!host.global_tracking);
    }

    #[test]
    fn tiny_selection_keeps_window() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        drag.selection_start(&at(PointerKind::Press, 500.0), Some(surface()), &mut host);
        drag.selection_move(&at(PointerKind::Move, 502.0), Some(surface()));

        assert!(!drag.selection_end(&at(PointerKind::Release, 502.0), &mut host));
        assert!(!drag.state().is_zoomed());
        assert!(!host.selection_suppressed);
    }

    #[test]
    fn cancel_reverts_live_handles() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        drag.drag_start(DragHandle::Right, Some(surface()), &mut host);
        drag.drag_move(&at(PointerKind::Move, 400.0), Some(surface()));
        drag.cancel(&mut host);

        assert_eq!(drag.state().right_handle_position, 1.0);
        assert!(!drag.state().is_dragging);
        assert!(!host.global_tracking);
    }

    #[test]
    fn reset_restores_full_window() {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        drag.drag_start(DragHandle::Left, Some(surface()), &mut host);
        drag.drag_move(&at(PointerKind::Move, 500.0), Some(surface()));
        drag.drag_end(&at(PointerKind::Release, 500.0), &mut host);
        assert!(drag.state().is_zoomed());

        drag.reset_window();
        assert_eq!(*drag.state(), ViewWindowState::default());
    }
}
