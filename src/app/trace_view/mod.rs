//! egui shell around the timeline engine: minimap on top, span rows below.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use eframe::egui::{Context, Pos2, Rect, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::{debug, trace};

use crate::config::ViewerConfig;
use crate::timeline::{
    CursorGuide, DividerDrag, HostFlags, LayoutVisibility, MinimapGeometry, MinimapPanner, NodeId,
    OverviewOffset, PointerEvent, PointerHost, PointerKind, RenderRow, SpanTree, ViewWindowDrag,
    ViewWindowState, VisibilityProvider, ZoomSource, make_bounds_fn,
};
use crate::trace::{ParsedTrace, Span};

mod minimap;
mod waterfall;

/// Called when a span row's detail panel opens.
pub trait SpanDetailHook {
    fn on_span_expanded(&mut self, span: &Span);
}

impl<F> SpanDetailHook for F
where
    F: FnMut(&Span),
{
    fn on_span_expanded(&mut self, span: &Span) {
        self(span)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ActiveDrag {
    #[default]
    None,
    Handle,
    Selection,
    Divider,
}

pub struct TraceView {
    trace: ParsedTrace,
    tree: SpanTree,
    drag: ViewWindowDrag,
    divider: DividerDrag,
    cursor: CursorGuide,
    host: HostFlags,
    active: ActiveDrag,
    visibility: LayoutVisibility,
    panner: MinimapPanner,
    offset: OverviewOffset,
    geometry: MinimapGeometry,
    row_height: f32,
    rows: Vec<RenderRow>,
    rows_dirty: Rc<Cell<bool>>,
    expanded_details: HashSet<NodeId>,
    detail_hook: Option<Box<dyn SpanDetailHook>>,
    filter_query: String,
    filter_matches: Option<HashSet<NodeId>>,
    minimap_surface: Option<Rect>,
    rows_surface: Option<Rect>,
    last_pointer: Option<Pos2>,
    divider_hovered: bool,
}

impl TraceView {
    pub fn new(trace: ParsedTrace, config: &ViewerConfig) -> Self {
        let tree = SpanTree::build(&trace);
        let geometry = config.minimap_geometry();
        let offset = OverviewOffset::default();
        let zoom_source = if config.infer_zoom {
            ZoomSource::Inferred
        } else {
            // egui lays out in points, which already include the zoom factor.
            ZoomSource::Explicit(1.0)
        };
        let span_count = tree.len().saturating_sub(1);
        let panner = MinimapPanner::new(geometry, span_count, offset.clone(), zoom_source);

        let rows_dirty = Rc::new(Cell::new(true));
        let mut drag = ViewWindowDrag::new();
        {
            let rows_dirty = Rc::clone(&rows_dirty);
            drag.subscribe(move |state| {
                trace!(
                    start = state.view_window_start,
                    end = state.view_window_end,
                    "view window changed"
                );
                rows_dirty.set(true);
            });
        }

        let mut divider = DividerDrag::new(config.divider_position);
        divider.subscribe(|state| debug!(position = state.divider_position, "divider moved"));

        debug!(
            spans = trace.num_of_spans,
            rows = tree.len(),
            depth = tree.max_depth(),
            "built span tree"
        );

        Self {
            trace,
            tree,
            drag,
            divider,
            cursor: CursorGuide::new(),
            host: HostFlags::default(),
            active: ActiveDrag::None,
            visibility: LayoutVisibility::default(),
            panner,
            offset,
            geometry,
            row_height: config.row_height,
            rows: Vec::new(),
            rows_dirty,
            expanded_details: HashSet::new(),
            detail_hook: None,
            filter_query: String::new(),
            filter_matches: None,
            minimap_surface: None,
            rows_surface: None,
            last_pointer: None,
            divider_hovered: false,
        }
    }

    pub fn trace(&self) -> &ParsedTrace {
        &self.trace
    }

    pub fn view_window(&self) -> &ViewWindowState {
        self.drag.state()
    }

    pub fn divider_position(&self) -> f64 {
        self.divider.divider_position()
    }

    pub fn set_detail_hook(&mut self, hook: impl SpanDetailHook + 'static) {
        self.detail_hook = Some(Box::new(hook));
    }

    pub fn reset_window(&mut self) {
        self.drag.reset_window();
    }

    pub fn expand_all(&mut self) {
        self.tree.expand_all();
        self.rows_dirty.set(true);
    }

    pub fn collapse_all(&mut self) {
        self.tree.collapse_all();
        self.rows_dirty.set(true);
    }

    /// Rows whose label does not fuzzy-match `query` are drawn dimmed.
    pub fn set_filter(&mut self, query: &str) {
        let query = query.trim();
        if query == self.filter_query {
            return;
        }
        self.filter_query = query.to_owned();

        if query.is_empty() {
            self.filter_matches = None;
            return;
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .tree
            .iter()
            .filter(|(_, node)| matcher.fuzzy_match(&node.span.label(), query).is_some())
            .map(|(id, _)| id)
            .collect::<HashSet<_>>();
        debug!(query, matches = matches.len(), "span filter updated");
        self.filter_matches = Some(matches);
    }

    pub fn matches_filter(&self, node: NodeId) -> bool {
        self.filter_matches
            .as_ref()
            .is_none_or(|matches| matches.contains(&node))
    }

    pub fn show(&mut self, ui: &mut Ui) {
        self.pump_global_pointer(ui.ctx());
        self.refresh_rows();

        ui.style_mut().interaction.selectable_labels = !self.host.selection_suppressed;

        let viewport_top = ui.cursor().min;
        self.draw_minimap(ui);
        let (layout, inner_rect) = self.draw_waterfall(ui);

        let viewport = Rect::from_min_max(viewport_top, inner_rect.max);
        let offset_before = self.offset.get();
        self.visibility.deliver(viewport, inner_rect.top(), &layout);

        // The minimap was already painted with the old offset.
        if self.host.global_tracking || self.offset.get() != offset_before {
            ui.ctx().request_repaint();
        }
    }

    fn refresh_rows(&mut self) {
        let rows_changed = self.rows_dirty.replace(false);
        let resubscribe = self.panner.take_resubscribe();

        if rows_changed {
            let state = self.drag.state();
            let bounds = make_bounds_fn(
                self.trace.trace_start_timestamp,
                self.trace.trace_end_timestamp,
                state.view_window_start,
                state.view_window_end,
            );
            self.rows = self.tree.rows(&bounds);

            let expanded = &self.expanded_details;
            self.divider.mount_rows(
                self.rows
                    .iter()
                    .filter_map(|row| match row {
                        RenderRow::Span { node, .. } => Some(*node),
                        RenderRow::HiddenSpans { .. } => None,
                    })
                    .filter(|node| !expanded.contains(node)),
            );
        }

        if rows_changed || resubscribe {
            let tree = &self.tree;
            let observed = self
                .rows
                .iter()
                .filter_map(|row| match row {
                    RenderRow::Span { node, .. } => Some((*node, tree.node(*node).sequence)),
                    RenderRow::HiddenSpans { .. } => None,
                })
                .collect::<Vec<_>>();
            self.panner.observe_rows(&mut self.visibility, observed);
        }
    }

    /// Feeds pointer motion to whichever drag holds global tracking, even
    /// when the pointer has left the surface the drag began on. A release
    /// outside the window ends the drag at the last known position.
    fn pump_global_pointer(&mut self, ctx: &Context) {
        let (pos, released) = ctx.input(|input| {
            (
                input.pointer.latest_pos(),
                input.pointer.any_released() || !input.pointer.primary_down(),
            )
        });
        if pos.is_some() {
            self.last_pointer = pos;
        }
        if !self.host.global_tracking {
            return;
        }

        if let Some(pos) = self.last_pointer {
            let moved = PointerEvent::new(PointerKind::Move, pos);
            match self.active {
                ActiveDrag::Handle => {
                    self.drag.drag_move(&moved, self.minimap_surface);
                }
                ActiveDrag::Selection => {
                    self.drag.selection_move(&moved, self.minimap_surface);
                }
                ActiveDrag::Divider => {
                    self.divider.drag_move(&moved, self.rows_surface);
                }
                ActiveDrag::None => {}
            }
        }

        if !released {
            return;
        }

        let Some(pos) = self.last_pointer else {
            debug!(drag = ?self.active, "pointer released with no known position");
            self.cancel_drags();
            return;
        };

        let release = PointerEvent::new(PointerKind::Release, pos);
        match std::mem::take(&mut self.active) {
            ActiveDrag::Handle => {
                self.drag.drag_end(&release, &mut self.host);
            }
            ActiveDrag::Selection => {
                self.drag.selection_end(&release, &mut self.host);
            }
            ActiveDrag::Divider => {
                self.divider.drag_end(&release, &mut self.host);
            }
            ActiveDrag::None => {
                self.host.detach_global_tracking();
                self.host.set_selection_suppressed(false);
            }
        }
    }

    fn toggle_details(&mut self, node: NodeId) {
        if !self.expanded_details.remove(&node) {
            self.expanded_details.insert(node);
            if let (Some(hook), Some(span_node)) = (self.detail_hook.as_mut(), self.tree.get(node)) {
                hook.on_span_expanded(&span_node.span);
            }
        }
        self.rows_dirty.set(true);
    }

    fn cancel_drags(&mut self) {
        self.drag.cancel(&mut self.host);
        self.divider.cancel(&mut self.host);
        self.host.detach_global_tracking();
        self.host.set_selection_suppressed(false);
        self.active = ActiveDrag::None;
    }

    fn unmount(&mut self) {
        self.visibility.disconnect_all();
        self.cancel_drags();
    }
}

impl Drop for TraceView {
    fn drop(&mut self) {
        self.unmount();
    }
}
