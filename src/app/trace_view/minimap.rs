use eframe::egui::{
    Align2, CursorIcon, FontId, Painter, Rect, Response, Sense, Stroke, Ui, pos2, vec2,
};

use crate::timeline::{
    DragHandle, PointerEvent, PointerKind, ViewWindowState, make_bounds_fn, to_percent,
    x_at_fraction,
};
use crate::util::format_duration;

use super::super::render_utils::{
    FOG_COLOR, GUIDE_COLOR, HANDLE_COLOR, SELECTION_COLOR, bar_x_range, blend_color, dim_color,
    op_color,
};
use super::{ActiveDrag, TraceView};

const HANDLE_WIDTH: f32 = 6.0;
const AXIS_TICKS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

impl TraceView {
    pub(super) fn draw_minimap(&mut self, ui: &mut Ui) {
        let width = ui.available_width();
        let (block, body) = ui.allocate_exact_size(
            vec2(width, self.geometry.block_height()),
            Sense::click_and_drag(),
        );
        let strip = Rect::from_min_size(block.min, vec2(width, self.geometry.strip_height));
        let axis = Rect::from_min_max(pos2(block.left(), strip.bottom()), block.max);
        self.minimap_surface = Some(strip);

        let painter = ui.painter_at(strip);
        painter.rect_filled(strip, 0.0, ui.visuals().extreme_bg_color);
        self.paint_minimap_bars(&painter, strip);

        let state = *self.drag.state();
        self.paint_window(&painter, strip, &state);
        self.minimap_handles(ui, &painter, strip, &state);
        self.minimap_body(ui, strip, &body);
        self.paint_cursor_guide(&painter, strip);
        self.paint_axis(ui, axis);
    }

    fn paint_minimap_bars(&self, painter: &Painter, strip: Rect) {
        let bounds = make_bounds_fn(
            self.trace.trace_start_timestamp,
            self.trace.trace_end_timestamp,
            0.0,
            1.0,
        );
        let bar = self.geometry.bar_height;
        let offset = self.offset.get();

        for (id, node) in self.tree.iter() {
            let top = strip.top() + node.sequence.saturating_sub(1) as f32 * bar - offset;
            if top + bar < strip.top() {
                continue;
            }
            if top > strip.bottom() {
                break;
            }

            let span_bounds = bounds.bounds(node.span.start_timestamp, node.span.timestamp);
            let Some((left, right)) = bar_x_range(strip, &span_bounds) else {
                continue;
            };

            let mut color = op_color(node.span.op.as_deref());
            if !self.matches_filter(id) {
                color = dim_color(color, 0.35);
            }
            let bottom = top + (bar - 1.0).max(1.0);
            painter.rect_filled(Rect::from_min_max(pos2(left, top), pos2(right, bottom)), 0.0, color);
        }
    }

    /// Fog outside the committed window, the selection overlay, and ghost
    /// handles marking where a handle drag began.
    fn paint_window(&self, painter: &Painter, strip: Rect, state: &ViewWindowState) {
        let window_left = x_at_fraction(strip, state.view_window_start);
        let window_right = x_at_fraction(strip, state.view_window_end);
        painter.rect_filled(
            Rect::from_min_max(strip.min, pos2(window_left, strip.bottom())),
            0.0,
            FOG_COLOR,
        );
        painter.rect_filled(
            Rect::from_min_max(pos2(window_right, strip.top()), strip.max),
            0.0,
            FOG_COLOR,
        );

        if state.window_selection.is_dragging {
            let (start, end) = state.window_selection.range();
            painter.rect_filled(
                Rect::from_min_max(
                    pos2(x_at_fraction(strip, start), strip.top()),
                    pos2(x_at_fraction(strip, end), strip.bottom()),
                ),
                0.0,
                SELECTION_COLOR,
            );
        }

        if state.is_dragging {
            let ghost = Stroke::new(1.0, blend_color(HANDLE_COLOR, FOG_COLOR, 0.6));
            for x in [window_left, window_right] {
                painter.line_segment([pos2(x, strip.top()), pos2(x, strip.bottom())], ghost);
            }
        }
    }

    fn minimap_handles(
        &mut self,
        ui: &Ui,
        painter: &Painter,
        strip: Rect,
        state: &ViewWindowState,
    ) {
        let handles = [
            (DragHandle::Left, state.left_handle_position),
            (DragHandle::Right, state.right_handle_position),
        ];

        for (index, (handle, fraction)) in handles.into_iter().enumerate() {
            let x = x_at_fraction(strip, fraction);
            let hit = Rect::from_center_size(
                pos2(x, strip.center().y),
                vec2(HANDLE_WIDTH * 2.0, strip.height()),
            );
            let response = ui.interact(hit, ui.id().with("minimap_handle").with(index), Sense::drag());

            if response.hovered() || response.dragged() {
                ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
            }
            if response.drag_started()
                && self.active == ActiveDrag::None
                && self.drag.drag_start(handle, self.minimap_surface, &mut self.host)
            {
                self.active = ActiveDrag::Handle;
            }

            let width = if state.dragging_handle == handle { 2.0 } else { 1.0 };
            painter.line_segment(
                [pos2(x, strip.top()), pos2(x, strip.bottom())],
                Stroke::new(width, HANDLE_COLOR),
            );
            painter.rect_filled(
                Rect::from_center_size(pos2(x, strip.top() + 10.0), vec2(HANDLE_WIDTH, 14.0)),
                1.0,
                HANDLE_COLOR,
            );

            response.on_hover_text(format!(
                "window {} to {}",
                to_percent(state.view_window_start),
                to_percent(state.view_window_end)
            ));
        }
    }

    fn minimap_body(&mut self, ui: &Ui, strip: Rect, body: &Response) {
        if body.drag_started()
            && self.active == ActiveDrag::None
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && strip.contains(origin)
        {
            let press = PointerEvent::new(PointerKind::Press, origin);
            if self
                .drag
                .selection_start(&press, self.minimap_surface, &mut self.host)
            {
                self.active = ActiveDrag::Selection;
            }
        }

        let hover = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pos| strip.contains(*pos));
        match hover {
            Some(pos) => {
                let kind = if self.cursor.state().show_guide {
                    PointerKind::Move
                } else {
                    PointerKind::Enter
                };
                self.cursor
                    .handle(&PointerEvent::new(kind, pos), self.minimap_surface);
            }
            None if self.cursor.state().show_guide => self.cursor.hide(),
            None => {}
        }
    }

    fn paint_cursor_guide(&self, painter: &Painter, strip: Rect) {
        let state = self.cursor.state();
        let Some(fraction) = state.mouse_fractional_x.filter(|_| state.show_guide) else {
            return;
        };

        let x = x_at_fraction(strip, fraction);
        painter.line_segment(
            [pos2(x, strip.top()), pos2(x, strip.bottom())],
            Stroke::new(1.0, GUIDE_COLOR),
        );

        if let Some(offset) = self.cursor.duration_at(self.trace.duration()) {
            let (anchor, dx) = if fraction > 0.5 {
                (Align2::RIGHT_TOP, -4.0)
            } else {
                (Align2::LEFT_TOP, 4.0)
            };
            painter.text(
                pos2(x + dx, strip.top() + 2.0),
                anchor,
                format_duration(offset),
                FontId::monospace(11.0),
                GUIDE_COLOR,
            );
        }
    }

    fn paint_axis(&self, ui: &Ui, axis: Rect) {
        let painter = ui.painter_at(axis);
        let color = ui.visuals().weak_text_color();
        let stroke = Stroke::new(1.0, color);
        painter.line_segment([axis.left_top(), axis.right_top()], stroke);

        let duration = self.trace.duration();
        for fraction in AXIS_TICKS {
            let x = x_at_fraction(axis, fraction);
            painter.line_segment([pos2(x, axis.top()), pos2(x, axis.top() + 4.0)], stroke);

            let anchor = if fraction <= 0.0 {
                Align2::LEFT_TOP
            } else if fraction >= 1.0 {
                Align2::RIGHT_TOP
            } else {
                Align2::CENTER_TOP
            };
            painter.text(
                pos2(x, axis.top() + 5.0),
                anchor,
                format_duration(fraction * duration),
                FontId::proportional(10.0),
                color,
            );
        }
    }
}
