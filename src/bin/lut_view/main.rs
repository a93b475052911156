#![windows_subsystem = "windows"] // Don't go through console on Windows.

use std::{
    cell::OnceCell,
    path::{Path, PathBuf},
    sync::Arc,
};

use eframe::egui;
use egui::containers::Frame;

use egui_custom::ViewSummary;
use lib::{
    cube_view::{CubeView, PlotSpace},
    job_helpers::{self, FormatFilter},
};
use lut::LutProcessor;
use shared_data::Shared;

mod toolbar;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "LUT View";

fn main() {
    let args = clap::App::new(APP_NAME)
        .version(VERSION)
        .about("Shows what a color LUT does to the RGB cube")
        .arg(
            clap::Arg::with_name("LUT_PATH")
                .help("LUT file to open on startup")
                .index(1),
        )
        .get_matches();
    let initial_lut: Option<PathBuf> = args.value_of_os("LUT_PATH").map(|p| p.into());

    let result = eframe::run_native(
        APP_NAME,
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1024.0, 768.0])
                .with_drag_and_drop(true), // Enable drag-and-dropping files on Windows.
            ..eframe::NativeOptions::default()
        },
        Box::new(move |cc| Ok(Box::new(AppMain::new(cc, initial_lut)))),
    );

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub struct AppMain {
    job_queue: job_queue::JobQueue,
    last_opened_directory: Option<PathBuf>,
    lut_format_filters: OnceCell<Vec<FormatFilter>>,
    window_title: String,

    cube_view: Shared<CubeView>,
    ui_data: Shared<UIData>,
}

impl AppMain {
    fn new(cc: &eframe::CreationContext, initial_lut: Option<PathBuf>) -> AppMain {
        // Dark mode.
        cc.egui_ctx.set_visuals(egui::style::Visuals {
            dark_mode: true,
            ..egui::style::Visuals::default()
        });

        // Update callback for jobs.
        let mut job_queue = job_queue::JobQueue::new();
        let ctx_clone = cc.egui_ctx.clone();
        job_queue.set_update_fn(move || {
            ctx_clone.request_repaint();
        });

        let mut app = AppMain {
            job_queue: job_queue,
            last_opened_directory: std::env::current_dir().ok(),
            lut_format_filters: OnceCell::new(),
            window_title: APP_NAME.into(),

            cube_view: Shared::new(CubeView::new()),
            ui_data: Shared::new(UIData {
                warning: None,
                lut_path: None,
                processor: None,
            }),
        };

        if let Some(path) = initial_lut {
            app.open_lut(&path);
        }

        app
    }
}

/// The stuff the UI code needs access to for drawing and update.
///
/// Nothing other than the UI should lock this data for non-trivial
/// amounts of time.
pub struct UIData {
    /// Shown in a modal dialog until dismissed.
    warning: Option<String>,

    lut_path: Option<PathBuf>,
    processor: Option<Arc<LutProcessor>>,
}

impl eframe::App for AppMain {
    // Called before shutdown.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        // Don't need to do anything.
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let job_count = self.job_queue.job_count();
        let warning = self.ui_data.lock().warning.clone();

        let mut working_dir = self
            .last_opened_directory
            .clone()
            .unwrap_or_else(|| "".into());

        //----------------
        // GUI.

        // Toolbar.
        let mut picked_lut = None;
        egui::containers::panel::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.add_enabled_ui(warning.is_none(), |ui| {
                picked_lut = toolbar::toolbar(ui, self, job_count, &mut working_dir);
            });
            ui.add_space(4.0);
        });

        // Status bar and log (footer).
        egui_custom::status_bar(ctx, &self.job_queue, &self.view_summary());

        // Main area.
        egui::containers::panel::CentralPanel::default()
            .frame(
                Frame::none()
                    .stroke(ctx.style().visuals.window_stroke())
                    .inner_margin(egui::Margin::same(10.0))
                    .fill(ctx.style().visuals.window_fill()),
            )
            .show(ctx, |ui| {
                ui.add_enabled_ui(warning.is_none(), |ui| {
                    self.cube_view.lock_mut().ui(ui);
                });
            });

        // Warning dialog.
        if let Some(message) = warning {
            egui::Window::new("Warning")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.ui_data.lock_mut().warning = None;
                    }
                });
        }

        self.last_opened_directory = Some(working_dir);

        //----------------
        // Processing.

        // Collect dropped files.  Only the first one is opened.
        let dropped_lut: Option<PathBuf> =
            ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));

        if let Some(path) = picked_lut.or(dropped_lut) {
            self.open_lut(&path);
        }

        // Window title.
        let title = match self.ui_data.lock().lut_path {
            Some(ref path) => match path.file_name() {
                Some(name) => format!("{} - {}", name.to_string_lossy(), APP_NAME),
                None => APP_NAME.into(),
            },
            None => APP_NAME.into(),
        };
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }
}

impl AppMain {
    /// What's currently shown, for the status bar.
    fn view_summary(&self) -> ViewSummary {
        let lut_name = self
            .ui_data
            .lock()
            .lut_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned());
        let cube_view = self.cube_view.lock();
        ViewSummary {
            lut_name: lut_name,
            resolution: cube_view.plotted_resolution().unwrap_or(0),
            point_count: cube_view.point_count(),
        }
    }

    fn lut_format_filters(&self) -> &[FormatFilter] {
        self.lut_format_filters
            .get_or_init(job_helpers::lut_format_filters)
    }

    /// Shows a modal warning and logs it as an error.
    fn warn(&self, message: String) {
        self.job_queue.log_error(message.clone());
        self.ui_data.lock_mut().warning = Some(message);
    }

    fn open_lut(&mut self, path: &Path) {
        if let Err(e) = job_helpers::check_lut_path(path) {
            self.warn(e.to_string());
            return;
        }
        if let Some(parent) = path.parent() {
            self.last_opened_directory = Some(parent.into());
        }

        let path_text = path.to_string_lossy().into_owned();
        let path: PathBuf = path.into();
        let cube_view = self.cube_view.clone_ref();
        let ui_data = self.ui_data.clone_ref();

        let queued = self.job_queue.add_job("Load LUT", move |status| {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            status
                .lock_mut()
                .set_progress(format!("Loading \"{}\"", filename), 0.0);

            match job_helpers::open_lut(&path, &cube_view) {
                Ok(processor) => {
                    let point_count = cube_view.lock().point_count();
                    {
                        let mut ui_data = ui_data.lock_mut();
                        ui_data.lut_path = Some(path.clone());
                        ui_data.processor = Some(processor);
                    }
                    status
                        .lock_mut()
                        .log_note(format!("Loaded \"{}\": {} points", filename, point_count));
                }
                Err(e) => {
                    let message = format!("Couldn't open \"{}\": {}", filename, e);
                    status.lock_mut().log_error(message.clone());
                    ui_data.lock_mut().warning = Some(message);
                }
            }
        });

        // The queue has already logged the rejection.
        if !queued {
            self.ui_data.lock_mut().warning = Some(format!(
                "Couldn't open \"{}\" while jobs are being canceled.  Please try again.",
                path_text
            ));
        }
    }

    fn set_resolution(&self, resolution: usize) {
        self.cube_view.lock_mut().set_resolution(resolution);
        self.replot();
    }

    fn set_plot_space(&self, plot_space: PlotSpace) {
        self.cube_view.lock_mut().set_plot_space(plot_space);
        self.replot();
    }

    /// Re-applies the current LUT, if any, after a view setting changed.
    fn replot(&self) {
        let processor = match self.ui_data.lock().processor {
            Some(ref processor) => Arc::clone(processor),
            None => return,
        };
        let cube_view = self.cube_view.clone_ref();
        let ui_data = self.ui_data.clone_ref();

        let queued = self.job_queue.add_job("Replot", move |status| {
            status.lock_mut().set_progress("Applying LUT".into(), 0.0);

            if let Err(e) = job_helpers::replot(&*processor, &cube_view) {
                let message = format!("Couldn't apply LUT: {}", e);
                status.lock_mut().log_error(message.clone());
                ui_data.lock_mut().warning = Some(message);
            }
        });

        // The queue has already logged the rejection.
        if !queued {
            self.ui_data.lock_mut().warning = Some(
                "The view settings changed while jobs were being canceled, so the \
                 view may be out of date.  Change a setting again to refresh it."
                    .into(),
            );
        }
    }
}
