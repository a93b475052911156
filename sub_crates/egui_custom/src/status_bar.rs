use eframe::egui::{
    self,
    containers::ScrollArea,
    widgets::{Button, Label, ProgressBar},
    Color32, RichText,
};
use job_queue::{JobQueue, LogLevel};

const ERROR_COLOR: Color32 = Color32::from_rgb(255, 60, 30);
const WARNING_COLOR: Color32 = Color32::from_rgb(200, 180, 20);

/// What the view is currently showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSummary {
    /// File name of the loaded LUT.
    pub lut_name: Option<String>,
    /// Samples per axis of the shown points.
    pub resolution: usize,
    pub point_count: usize,
}

impl ViewSummary {
    pub fn text(&self) -> String {
        match self.lut_name {
            Some(ref name) => format!(
                "{}  ({}³ grid, {} points)",
                name, self.resolution, self.point_count
            ),
            None => "No LUT loaded".into(),
        }
    }
}

/// The log, oldest first, numbered from 1.
fn log_lines(job_queue: &JobQueue) -> Vec<(String, LogLevel)> {
    let log_count = job_queue.log_count();
    (0..log_count)
        .rev()
        .filter_map(|i| job_queue.get_log(i))
        .enumerate()
        .map(|(n, (message, level))| {
            let line = match level {
                LogLevel::Error => format!("{}:  ERROR: {}", n + 1, message),
                LogLevel::Warning => format!("{}:  WARNING: {}", n + 1, message),
                LogLevel::Note => format!("{}:  {}", n + 1, message),
            };
            (line, level)
        })
        .collect()
}

/// The footer: the message log, a summary of what's being viewed, and
/// the progress of the running job.
pub fn status_bar(ctx: &egui::Context, job_queue: &JobQueue, summary: &ViewSummary) {
    egui::containers::panel::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        let lines = log_lines(job_queue);
        let error_count = lines
            .iter()
            .filter(|(_, level)| *level == LogLevel::Error)
            .count();

        // Log messages, errors and warnings highlighted.
        if !lines.is_empty() {
            ui.add_space(4.0);
            ScrollArea::vertical()
                .auto_shrink([false, true])
                .max_height(80.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for (line, level) in lines.iter() {
                        let text = RichText::new(line.as_str()).monospace();
                        let text = match level {
                            LogLevel::Error => text.color(ERROR_COLOR),
                            LogLevel::Warning => text.color(WARNING_COLOR),
                            LogLevel::Note => text,
                        };
                        ui.add(Label::new(text).wrap());
                    }
                });
            ui.separator();
        }

        ui.horizontal(|ui| {
            ui.label(summary.text());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let jobs_are_canceling = job_queue.is_canceling();
                if let Some((text, ratio)) = job_queue.progress() {
                    if ui
                        .add_enabled(!jobs_are_canceling, Button::new("Cancel"))
                        .clicked()
                    {
                        job_queue.cancel_all_jobs();
                    }
                    ui.add(
                        ProgressBar::new(ratio)
                            .desired_width(240.0)
                            .text(if jobs_are_canceling {
                                "Canceling..."
                            } else {
                                text.as_str()
                            })
                            .animate(true),
                    );
                } else if !lines.is_empty() {
                    if ui.add(Button::new("🗙  Clear Log")).clicked() {
                        job_queue.clear_log();
                    }
                    if error_count > 0 {
                        ui.add_space(6.0);
                        ui.add(Label::new(
                            RichText::new(format!("Errors: {}", error_count)).color(ERROR_COLOR),
                        ));
                    }
                }
            });
        });
    });
}
