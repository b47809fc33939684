use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::config::ViewerConfig;
use crate::trace::{LoadedTrace, load_trace};

mod render_utils;
mod trace_view;

mod ui {
    mod details;
    mod panels;

    pub(super) use details::span_details;
}

pub use trace_view::{SpanDetailHook, TraceView};

type LoadResult = Result<LoadedTrace, String>;

pub struct TraceViewerApp {
    trace_file: PathBuf,
    config: ViewerConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    title: Option<String>,
    trace_view: Option<TraceView>,
    filter: String,
}

impl TraceViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, trace_file: PathBuf, config: ViewerConfig) -> Self {
        let state = Self::start_load(trace_file.clone());
        Self {
            trace_file,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(trace_file: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_trace(&trace_file).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(trace_file: PathBuf) -> AppState {
        info!(path = %trace_file.display(), "loading trace");
        AppState::Loading {
            rx: Self::spawn_load(trace_file),
        }
    }

    fn finish_load(&self, result: LoadResult) -> AppState {
        match result {
            Ok(loaded) => AppState::Ready(Box::new(ViewModel::new(loaded, &self.config))),
            Err(message) => {
                error!(%message, "trace load failed");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for TraceViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading trace...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load trace");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.trace_file.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.trace_file, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.trace_file.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.finish_load(result);
        }
    }
}
