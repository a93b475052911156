use std::f32::consts::FRAC_PI_2;

use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};

const BACKGROUND: Color32 = Color32::from_rgb(24, 24, 24);
const WIREFRAME: Color32 = Color32::from_rgb(90, 90, 90);
const LABEL: Color32 = Color32::from_rgb(200, 200, 200);

/// Half the diagonal of the unit cube, plus some margin.
const VIEW_RADIUS: f32 = 0.95;

const CUBE_EDGES: [([f32; 3], [f32; 3]); 12] = [
    ([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 1.0, 0.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 1.0]),
    ([0.0, 1.0, 1.0], [1.0, 1.0, 1.0]),
    ([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
    ([0.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
    ([1.0, 0.0, 1.0], [1.0, 1.0, 1.0]),
    ([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([1.0, 0.0, 0.0], [1.0, 0.0, 1.0]),
    ([0.0, 1.0, 0.0], [0.0, 1.0, 1.0]),
    ([1.0, 1.0, 0.0], [1.0, 1.0, 1.0]),
];

/// One point of a scatter series: a position and the color to draw it
/// with.  Colors are display-referred, nominally in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScatterDataItem {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ScatterDataItem {
    pub fn new(x: f32, y: f32, z: f32, r: f32, g: f32, b: f32) -> ScatterDataItem {
        ScatterDataItem {
            position: [x, y, z],
            color: [r, g, b],
        }
    }

    /// The color, clamped and quantized for drawing.
    pub fn color32(&self) -> Color32 {
        let q = |n: f32| ((n.max(0.0).min(1.0) * 255.0) + 0.5) as u8;
        Color32::from_rgb(q(self.color[0]), q(self.color[1]), q(self.color[2]))
    }
}

/// The data of a scatter plot.
#[derive(Debug, Clone, Default)]
pub struct ScatterSeries {
    items: Vec<ScatterDataItem>,
}

impl ScatterSeries {
    pub fn new() -> ScatterSeries {
        ScatterSeries::default()
    }

    /// Replaces all of the series' items at once.
    pub fn set_data_array(&mut self, items: Vec<ScatterDataItem>) {
        self.items = items;
    }

    pub fn data_array(&self) -> &[ScatterDataItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An orbit camera looking at the center of the unit cube.
///
/// The y axis points up.  Yaw turns around it, and pitch tilts the
/// view up and down, both in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera {
            yaw: -0.6,
            pitch: 0.45,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Projects a point into `rect`.  Returns the screen position and
    /// a depth value, where larger is closer to the viewer.
    pub fn project(&self, p: [f32; 3], rect: Rect) -> (Pos2, f32) {
        let x = p[0] - 0.5;
        let y = p[1] - 0.5;
        let z = p[2] - 0.5;

        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let x2 = (x * cos_yaw) - (z * sin_yaw);
        let z2 = (x * sin_yaw) + (z * cos_yaw);

        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let y3 = (y * cos_pitch) - (z2 * sin_pitch);
        let z3 = (y * sin_pitch) + (z2 * cos_pitch);

        let scale = self.scale(rect);
        let center = rect.center();
        (Pos2::new(center.x + (x2 * scale), center.y - (y3 * scale)), z3)
    }

    /// Screen-space length of one unit.
    pub fn scale(&self, rect: Rect) -> f32 {
        self.zoom * rect.size().min_elem() * 0.5 / VIEW_RADIUS
    }

    pub fn orbit(&mut self, drag: Vec2) {
        self.yaw += drag.x * 0.01;
        self.pitch = (self.pitch + drag.y * 0.01).max(-FRAC_PI_2).min(FRAC_PI_2);
    }

    pub fn zoom_by(&mut self, scroll: f32) {
        self.zoom = (self.zoom * (scroll * 0.002).exp()).max(0.2).min(10.0);
    }
}

/// A 3D scatter plot of a single series over the unit cube.
///
/// Drag to orbit, scroll to zoom, double-click to reset the view.
#[derive(Debug, Clone, Default)]
pub struct Scatter3D {
    series: ScatterSeries,
    camera: Camera,
    axis_labels: Option<[String; 3]>,
}

impl Scatter3D {
    pub fn new() -> Scatter3D {
        Scatter3D::default()
    }

    pub fn with_axis_labels(mut self, labels: [&str; 3]) -> Scatter3D {
        self.axis_labels = Some([labels[0].into(), labels[1].into(), labels[2].into()]);
        self
    }

    pub fn series(&self) -> &ScatterSeries {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut ScatterSeries {
        &mut self.series
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn reset_camera(&mut self) {
        self.camera = Camera::default();
    }

    /// Point radius in pixels, shrinking as the grid gets denser.
    fn point_radius(&self, scale: f32) -> f32 {
        let per_axis = (self.series.len() as f32).cbrt().max(1.0);
        (scale / per_axis * 0.3).max(1.0).min(8.0)
    }

    pub fn ui(&mut self, ui: &mut Ui) -> Response {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());

        // Interaction.
        if response.dragged() {
            self.camera.orbit(response.drag_delta());
        }
        if response.double_clicked() {
            self.reset_camera();
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom_by(scroll);
            }
        }

        let rect = response.rect;
        let camera = self.camera;
        painter.rect_filled(rect, 0.0, BACKGROUND);

        // Cube wireframe and axis labels.
        for (a, b) in CUBE_EDGES.iter() {
            painter.line_segment(
                [camera.project(*a, rect).0, camera.project(*b, rect).0],
                Stroke::new(1.0, WIREFRAME),
            );
        }
        if let Some(ref labels) = self.axis_labels {
            let ends = [[1.08, 0.0, 0.0], [0.0, 1.08, 0.0], [0.0, 0.0, 1.08]];
            for (label, end) in labels.iter().zip(ends.iter()) {
                painter.text(
                    camera.project(*end, rect).0,
                    Align2::CENTER_CENTER,
                    label,
                    FontId::proportional(14.0),
                    LABEL,
                );
            }
        }

        // Points, back to front.
        let radius = self.point_radius(camera.scale(rect));
        let mut points: Vec<(Pos2, f32, Color32)> = self
            .series
            .data_array()
            .iter()
            .map(|item| {
                let (pos, depth) = camera.project(item.position, rect);
                (pos, depth, item.color32())
            })
            .collect();
        points.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        for (pos, _, color) in points {
            painter.circle_filled(pos, radius, color);
        }

        response
    }
}
