use eframe::egui::{Rect, pos2};
use proptest::prelude::*;

use span_waterfall::timeline::{
    DividerDrag, DragHandle, HostFlags, MIN_WINDOW_SIZE, PointerEvent, PointerKind,
    ViewWindowDrag, make_bounds_fn, normalize_timestamps,
};

fn surface() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 100.0))
}

proptest! {
    #[test]
    fn normalized_timestamps_are_ordered(a in -1.0e9f64..1.0e9, b in -1.0e9f64..1.0e9) {
        let (start, end) = normalize_timestamps(a, b);
        prop_assert!(start <= end);
        prop_assert!((start == a && end == b) || (start == b && end == a));
    }

    #[test]
    fn reversed_spans_place_like_forward_ones(
        view_start in 0.0f64..0.45,
        view_end in 0.55f64..1.0,
        a in 0.0f64..100.0,
        b in 0.0f64..100.0,
    ) {
        let bounds = make_bounds_fn(0.0, 100.0, view_start, view_end);
        let forward = bounds.bounds(a.min(b), a.max(b));
        let reversed = bounds.bounds(a.max(b), a.min(b));

        prop_assert_eq!(forward, reversed);
        if let Some((start, end)) = forward.extent() {
            prop_assert!(start <= end);
            prop_assert_eq!(forward.is_visible(), end > 0.0 && start < 1.0);
        }
    }

    #[test]
    fn handles_keep_minimum_window(moves in prop::collection::vec((any::<bool>(), -400.0f32..1200.0), 1..24)) {
        let mut host = HostFlags::default();
        let mut drag = ViewWindowDrag::new();

        for (left, x) in moves {
            let handle = if left { DragHandle::Left } else { DragHandle::Right };
            prop_assert!(drag.drag_start(handle, Some(surface()), &mut host));
            drag.drag_move(&PointerEvent::new(PointerKind::Move, pos2(x, 50.0)), Some(surface()));
            prop_assert!(drag.drag_end(&PointerEvent::new(PointerKind::Release, pos2(x, 50.0)), &mut host));

            let state = drag.state();
            prop_assert!(state.left_handle_position >= 0.0);
            prop_assert!(state.right_handle_position <= 1.0);
            prop_assert!(state.left_handle_position <= state.right_handle_position - MIN_WINDOW_SIZE + 1e-12);
            prop_assert_eq!(state.view_window_start, state.left_handle_position);
            prop_assert_eq!(state.view_window_end, state.right_handle_position);
            prop_assert_eq!(host, HostFlags::default());
        }
    }

    #[test]
    fn divider_commits_clamped_pointer(start in 0.0f64..=1.0, x in -1000.0f32..2000.0) {
        let mut host = HostFlags::default();
        let mut divider = DividerDrag::new(start);

        prop_assert!(divider.drag_start(Some(surface()), &mut host));
        divider.drag_move(&PointerEvent::new(PointerKind::Move, pos2(x, 10.0)), Some(surface()));
        prop_assert_eq!(divider.divider_position(), start);

        prop_assert!(divider.drag_end(&PointerEvent::new(PointerKind::Release, pos2(x, 10.0)), &mut host));
        let expected = (f64::from(x) / 800.0).clamp(0.0, 1.0);
        prop_assert_eq!(divider.divider_position(), expected);
    }
}
