use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::timeline::to_percent;
use crate::trace::{LoadedTrace, Span};
use crate::util::{format_duration, short_id};

use super::super::{TraceView, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(loaded: LoadedTrace, config: &ViewerConfig) -> Self {
        let trace = loaded.trace;
        let trace_view = if !trace.has_context() || trace.is_empty() {
            info!("trace has no spans to show");
            None
        } else {
            let mut view = TraceView::new(trace, config);
            view.set_detail_hook(|span: &Span| {
                debug!(span_id = %span.span_id, op = ?span.op, "span details opened");
            });
            Some(view)
        };

        Self {
            title: loaded.title,
            trace_view,
            filter: String::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        trace_file: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("span-waterfall");
                    ui.separator();
                    if let Some(title) = &self.title {
                        ui.label(title.as_str());
                    }
                    ui.label(format!("file: {}", trace_file.display()));

                    if let Some(view) = &mut self.trace_view {
                        let trace = view.trace();
                        ui.label(format!("trace: {}", short_id(&trace.trace_id)))
                            .on_hover_text(trace.trace_id.as_str());
                        ui.label(format!("spans: {}", trace.num_of_spans));
                        ui.label(format!("duration: {}", format_duration(trace.duration())));

                        let window = *view.view_window();
                        if window.is_zoomed() {
                            ui.label(format!(
                                "window: {} to {}",
                                to_percent(window.view_window_start),
                                to_percent(window.view_window_end)
                            ));
                        }
                        if ui
                            .add_enabled(window.is_zoomed(), egui::Button::new("Reset zoom"))
                            .clicked()
                        {
                            view.reset_window();
                        }
                        if ui.button("Expand all").clicked() {
                            view.expand_all();
                        }
                        if ui.button("Collapse all").clicked() {
                            view.collapse_all();
                        }
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload trace"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.filter)
                                .hint_text("filter spans")
                                .desired_width(200.0),
                        );
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading trace...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
                return;
            }

            match &mut self.trace_view {
                Some(view) => {
                    view.set_filter(&self.filter);
                    view.show(ui);
                }
                None => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("This trace has no spans to show.");
                    });
                }
            }
        });
    }
}
