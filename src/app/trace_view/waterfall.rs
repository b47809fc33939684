use std::collections::HashMap;

use eframe::egui::{
    self, Align2, CursorIcon, FontId, Rect, ScrollArea, Sense, Stroke, StrokeKind, Ui, pos2, vec2,
};

use crate::timeline::{Bounds, NodeId, RenderRow, x_at_fraction};
use crate::util::format_duration;

use super::super::render_utils::{
    DIVIDER_COLOR, DIVIDER_HIGHLIGHT_COLOR, bar_x_range, blend_color, dim_color, op_color,
};
use super::super::ui::span_details;
use super::{ActiveDrag, TraceView};

const INDENT: f32 = 16.0;
const TOGGLE_WIDTH: f32 = 30.0;
const DIVIDER_HIT_WIDTH: f32 = 6.0;
const DURATION_LABEL_ROOM: f32 = 80.0;

enum RowAction {
    ToggleChildren(NodeId),
    ToggleDetails(NodeId),
    StartDividerDrag,
}

struct RowsOutput {
    layout: HashMap<NodeId, Rect>,
    actions: Vec<RowAction>,
    divider_hovered: bool,
    surface: Rect,
}

impl TraceView {
    /// Draws the span rows and returns where each one was laid out, plus the
    /// scroll viewport.
    pub(super) fn draw_waterfall(&mut self, ui: &mut Ui) -> (HashMap<NodeId, Rect>, Rect) {
        let output = ScrollArea::vertical()
            .id_salt("span_rows")
            .auto_shrink([false, false])
            .show(ui, |ui| self.draw_rows(ui));
        let rows = output.inner;

        self.rows_surface = Some(rows.surface);
        for action in rows.actions {
            match action {
                RowAction::ToggleChildren(node) => {
                    self.tree.toggle(node);
                    self.rows_dirty.set(true);
                }
                RowAction::ToggleDetails(node) => self.toggle_details(node),
                RowAction::StartDividerDrag => {
                    if self.active == ActiveDrag::None
                        && self.divider.drag_start(self.rows_surface, &mut self.host)
                    {
                        self.active = ActiveDrag::Divider;
                    }
                }
            }
        }

        if rows.divider_hovered != self.divider_hovered {
            if rows.divider_hovered {
                self.divider.hover_enter();
            } else {
                self.divider.hover_leave();
            }
            self.divider_hovered = rows.divider_hovered;
        }

        (rows.layout, output.inner_rect)
    }

    fn draw_rows(&self, ui: &mut Ui) -> RowsOutput {
        ui.spacing_mut().item_spacing.y = 0.0;
        let width = ui.available_width();
        let mut out = RowsOutput {
            layout: HashMap::with_capacity(self.rows.len()),
            actions: Vec::new(),
            divider_hovered: false,
            surface: ui.max_rect(),
        };

        for row in &self.rows {
            match *row {
                RenderRow::Span { node, bounds } => {
                    self.draw_span_row(ui, node, &bounds, width, &mut out);
                }
                RenderRow::HiddenSpans { count } => self.draw_hidden_row(ui, count, width),
            }
        }

        out
    }

    fn draw_span_row(
        &self,
        ui: &mut Ui,
        node: NodeId,
        bounds: &Bounds,
        width: f32,
        out: &mut RowsOutput,
    ) {
        let Some(span_node) = self.tree.get(node) else {
            return;
        };

        let text_color = ui.visuals().text_color();
        let weak_color = ui.visuals().weak_text_color();
        let hover_fill = ui.visuals().faint_bg_color;

        let (rect, response) = ui.allocate_exact_size(vec2(width, self.row_height), Sense::click());
        out.layout.insert(node, rect);

        let matches = self.matches_filter(node);
        let (label_color, connector_color) = if matches {
            (text_color, weak_color)
        } else {
            (dim_color(text_color, 0.4), dim_color(weak_color, 0.4))
        };

        let painter = ui.painter_at(rect);
        if response.hovered() {
            painter.rect_filled(rect, 0.0, hover_fill);
        }

        let registry = self.divider.registry();
        let line = registry.line(node);
        let divider_fraction = line.map_or(self.divider.divider_position(), |line| line.position);
        let divider_x = x_at_fraction(rect, divider_fraction);
        let label_rect = Rect::from_min_max(rect.min, pos2(divider_x, rect.bottom()));
        let timeline_rect = Rect::from_min_max(pos2(divider_x, rect.top()), rect.max);
        let center_y = rect.center().y;

        let label_painter = ui.painter_at(label_rect);
        let indent_x = rect.left() + 4.0 + span_node.depth as f32 * INDENT;
        if span_node.depth > 0 {
            let connector = Stroke::new(1.0, connector_color);
            let x = indent_x - INDENT / 2.0;
            label_painter.line_segment([pos2(x, rect.top()), pos2(x, center_y)], connector);
            label_painter.line_segment([pos2(x, center_y), pos2(indent_x, center_y)], connector);
        }

        let mut text_x = indent_x;
        if !span_node.children.is_empty() {
            let toggle_rect =
                Rect::from_min_size(pos2(indent_x, center_y - 8.0), vec2(TOGGLE_WIDTH, 16.0));
            let toggle = ui.interact(
                toggle_rect.intersect(label_rect),
                ui.id().with(("span_toggle", node.index())),
                Sense::click(),
            );
            let border = if toggle.hovered() { text_color } else { weak_color };
            label_painter.rect_stroke(toggle_rect, 3.0, Stroke::new(1.0, border), StrokeKind::Inside);

            let sign = if span_node.expanded { '-' } else { '+' };
            label_painter.text(
                toggle_rect.center(),
                Align2::CENTER_CENTER,
                format!("{sign}{}", span_node.children.len()),
                FontId::monospace(10.0),
                label_color,
            );
            if toggle.clicked() {
                out.actions.push(RowAction::ToggleChildren(node));
            }
            text_x += TOGGLE_WIDTH + 4.0;
        }
        label_painter.text(
            pos2(text_x, center_y),
            Align2::LEFT_CENTER,
            span_node.span.label(),
            FontId::proportional(13.0),
            label_color,
        );

        let timeline_painter = ui.painter_at(timeline_rect);
        let bar_surface = timeline_rect.shrink2(vec2(4.0, 0.0));
        if let Some((left, right)) = bar_x_range(bar_surface, bounds) {
            let mut color = op_color(span_node.span.op.as_deref());
            if !matches {
                color = dim_color(color, 0.35);
            }
            let bar_rect = Rect::from_min_max(pos2(left, rect.top() + 5.0), pos2(right, rect.bottom() - 5.0));
            timeline_painter.rect_filled(bar_rect, 2.0, color);

            let (anchor, label_x) = if right + DURATION_LABEL_ROOM < bar_surface.right() {
                (Align2::LEFT_CENTER, right + 4.0)
            } else {
                (Align2::RIGHT_CENTER, left - 4.0)
            };
            timeline_painter.text(
                pos2(label_x, center_y),
                anchor,
                format_duration(span_node.span.duration()),
                FontId::monospace(10.0),
                weak_color,
            );
        }

        // Rows with their details open have no divider line registered.
        if let Some(line) = line {
            let (stroke_width, color) = if line.highlighted {
                (2.0, DIVIDER_HIGHLIGHT_COLOR)
            } else {
                (1.0, DIVIDER_COLOR)
            };
            painter.line_segment(
                [pos2(divider_x, rect.top()), pos2(divider_x, rect.bottom())],
                Stroke::new(stroke_width, color),
            );

            if let Some(ghost) = registry.ghost(node).filter(|ghost| ghost.visible) {
                let x = x_at_fraction(rect, ghost.position);
                painter.line_segment(
                    [pos2(x, rect.top()), pos2(x, rect.bottom())],
                    Stroke::new(1.0, blend_color(DIVIDER_COLOR, DIVIDER_HIGHLIGHT_COLOR, 0.3)),
                );
            }

            let hit = Rect::from_center_size(
                pos2(divider_x, center_y),
                vec2(DIVIDER_HIT_WIDTH, rect.height()),
            );
            let handle = ui.interact(hit, ui.id().with(("span_divider", node.index())), Sense::drag());
            if handle.hovered() || handle.dragged() {
                out.divider_hovered = true;
                ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
            }
            if handle.drag_started() {
                out.actions.push(RowAction::StartDividerDrag);
            }
        }

        if response.clicked() {
            out.actions.push(RowAction::ToggleDetails(node));
        }

        if self.expanded_details.contains(&node) {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_width(width - 16.0);
                span_details(ui, &span_node.span, self.trace.trace_start_timestamp);
            });
        }
    }

    fn draw_hidden_row(&self, ui: &mut Ui, count: usize, width: f32) {
        let weak_color = ui.visuals().weak_text_color();
        let fill = ui.visuals().faint_bg_color;
        let (rect, _) = ui.allocate_exact_size(vec2(width, self.row_height), Sense::hover());

        let text = if count == 1 {
            "1 hidden span".to_owned()
        } else {
            format!("{count} hidden spans")
        };
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect.shrink(1.0), 2.0, fill);
        painter.text(
            pos2(rect.left() + 8.0, rect.center().y),
            Align2::LEFT_CENTER,
            text,
            FontId::proportional(12.0),
            weak_color,
        );
    }
}
