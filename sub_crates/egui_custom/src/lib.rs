//! Custom widgets and panels shared by the apps.

mod scatter_3d;
mod status_bar;

pub use scatter_3d::{Camera, Scatter3D, ScatterDataItem, ScatterSeries};
pub use status_bar::{status_bar, ViewSummary};
