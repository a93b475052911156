use std::path::PathBuf;

use crate::egui::{self, Ui};

use lib::cube_view::{PlotSpace, RESOLUTIONS};

/// LUT opening and view settings.  Returns the path of a LUT the user
/// picked, if any.
pub fn toolbar(
    ui: &mut Ui,
    app: &mut crate::AppMain,
    job_count: usize,
    working_dir: &mut PathBuf,
) -> Option<PathBuf> {
    let open_lut_dialog = {
        let mut d = rfd::FileDialog::new().set_title("Open LUT");
        for filter in app.lut_format_filters() {
            d = d.add_filter(filter.label(), &filter.extensions[..]);
        }
        if !working_dir.as_os_str().is_empty() && working_dir.is_dir() {
            d = d.set_directory(&working_dir);
        }
        d
    };

    let mut picked = None;
    ui.horizontal(|ui| {
        ui.add_enabled_ui(job_count == 0, |ui| {
            if ui
                .add(egui::widgets::Button::new("🗁  Open LUT file..."))
                .clicked()
            {
                if let Some(path) = open_lut_dialog.pick_file() {
                    if let Some(parent) = path.parent().map(|p| p.into()) {
                        *working_dir = parent;
                    }
                    picked = Some(path);
                }
            }

            ui.add(egui::widgets::Separator::default().spacing(24.0));

            // Grid resolution.
            let (old_resolution, old_plot_space) = {
                let cube_view = app.cube_view.lock();
                (cube_view.resolution(), cube_view.plot_space())
            };
            let mut resolution = old_resolution;
            egui::ComboBox::new("resolution_selector", "Samples per axis")
                .selected_text(format!("{}", resolution))
                .show_ui(ui, |ui| {
                    for &n in RESOLUTIONS {
                        ui.selectable_value(&mut resolution, n, format!("{}", n));
                    }
                });
            if resolution != old_resolution {
                app.set_resolution(resolution);
            }

            ui.add(egui::widgets::Separator::default().spacing(24.0));

            // Plot space.
            let mut plot_space = old_plot_space;
            ui.label("Plot: ");
            ui.radio_value(&mut plot_space, PlotSpace::Input, PlotSpace::Input.ui_text());
            ui.radio_value(
                &mut plot_space,
                PlotSpace::Output,
                PlotSpace::Output.ui_text(),
            );
            if plot_space != old_plot_space {
                app.set_plot_space(plot_space);
            }
        });
    });

    picked
}
