use eframe::egui::Rect;

use super::geometry::{clamp, raw_fraction};
use super::notify::{SubscriptionId, Subscribers};
use super::pointer::{PointerEvent, PointerKind};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CursorGuideState {
    pub show_guide: bool,
    pub mouse_fractional_x: Option<f64>,
}

/// Tracks the pointer over the overview strip.
#[derive(Debug, Default)]
pub struct CursorGuide {
    state: CursorGuideState,
    subscribers: Subscribers<CursorGuideState>,
}

impl CursorGuide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CursorGuideState {
        &self.state
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&CursorGuideState) + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn handle(&mut self, event: &PointerEvent, surface: Option<Rect>) {
        match event.kind {
            PointerKind::Enter | PointerKind::Move => self.show_at(event, surface),
            PointerKind::Leave => self.hide(),
            PointerKind::Press | PointerKind::Release => {}
        }
    }

    pub fn show_at(&mut self, event: &PointerEvent, surface: Option<Rect>) {
        let Some(surface) = surface else {
            return;
        };

        self.publish(CursorGuideState {
            show_guide: true,
            mouse_fractional_x: Some(clamp(raw_fraction(surface, event.pos), 0.0, 1.0)),
        });
    }

    pub fn hide(&mut self) {
        self.publish(CursorGuideState::default());
    }

    /// Time offset under the cursor, for the guide's tooltip.
    pub fn duration_at(&self, trace_duration: f64) -> Option<f64> {
        if !self.state.show_guide {
            return None;
        }
        self.state
            .mouse_fractional_x
            .map(|fraction| fraction * trace_duration)
    }

    fn publish(&mut self, state: CursorGuideState) {
        self.state = state;
        self.subscribers.notify(&state);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn surface() -> Rect {
        Rect::from_min_max(pos2(20.0, 0.0), pos2(420.0, 100.0))
    }

    #[test]
    fn move_inside_surface_shows_guide() {
        let mut guide = CursorGuide::new();
        guide.handle(&PointerEvent::new(PointerKind::Enter, pos2(120.0, 50.0)), Some(surface()));

        assert_eq!(
            *guide.state(),
            CursorGuideState {
                show_guide: true,
                mouse_fractional_x: Some(0.25),
            }
        );
        assert_eq!(guide.duration_at(2.0), Some(0.5));
    }

    #[test]
    fn pointer_past_edges_clamps() {
        let mut guide = CursorGuide::new();
        guide.handle(&PointerEvent::new(PointerKind::Move, pos2(900.0, 50.0)), Some(surface()));
        assert_eq!(guide.state().mouse_fractional_x, Some(1.0));

        guide.handle(&PointerEvent::new(PointerKind::Move, pos2(-5.0, 50.0)), Some(surface()));
        assert_eq!(guide.state().mouse_fractional_x, Some(0.0));
    }

    #[test]
    fn hide_is_idempotent() {
        let mut guide = CursorGuide::new();
        guide.show_at(&PointerEvent::new(PointerKind::Move, pos2(60.0, 1.0)), Some(surface()));

        guide.hide();
        let once = *guide.state();
        guide.hide();

        assert_eq!(*guide.state(), once);
        assert_eq!(once, CursorGuideState::default());
        assert_eq!(guide.duration_at(10.0), None);
    }

    #[test]
    fn unmounted_surface_leaves_state_alone() {
        let mut guide = CursorGuide::new();
        guide.show_at(&PointerEvent::new(PointerKind::Move, pos2(60.0, 1.0)), None);
        assert!(!guide.state().show_guide);
    }
}
