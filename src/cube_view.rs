use std::sync::Arc;

use egui_custom::{Scatter3D, ScatterDataItem};
use grid_sampler::{Grid, GridSampler, InvalidResolution};
use lut::{Processor, TransformError};

/// Resolutions offered in the UI.
pub const RESOLUTIONS: &[usize] = &[8, 12, 20, 32];

/// Which coordinates the points are placed at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlotSpace {
    /// At the sampled input color, colored with the transformed color.
    Input,
    /// At the transformed color.
    Output,
}

impl PlotSpace {
    pub fn ui_text(&self) -> &'static str {
        match *self {
            PlotSpace::Input => "Input",
            PlotSpace::Output => "Output",
        }
    }
}

/// A 3D scatter plot of what a color transform does to a uniformly
/// sampled RGB cube.
#[derive(Debug)]
pub struct CubeView {
    chart: Scatter3D,
    sampler: GridSampler,
    resolution: usize,
    plot_space: PlotSpace,

    /// Resolution of the points currently shown, if any.
    plotted_resolution: Option<usize>,
}

impl CubeView {
    /// Default samples per axis.
    pub const SIZE: usize = 20;

    pub fn new() -> CubeView {
        CubeView::with_resolution(CubeView::SIZE)
    }

    pub fn with_resolution(resolution: usize) -> CubeView {
        CubeView {
            chart: Scatter3D::new().with_axis_labels(["R", "G", "B"]),
            sampler: GridSampler::new(),
            resolution: resolution,
            plot_space: PlotSpace::Input,
            plotted_resolution: None,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Takes effect on the next `load()`.
    pub fn set_resolution(&mut self, resolution: usize) {
        self.resolution = resolution;
    }

    pub fn plot_space(&self) -> PlotSpace {
        self.plot_space
    }

    /// Takes effect on the next `load()`.
    pub fn set_plot_space(&mut self, plot_space: PlotSpace) {
        self.plot_space = plot_space;
    }

    pub fn chart(&self) -> &Scatter3D {
        &self.chart
    }

    pub fn sampler(&self) -> &GridSampler {
        &self.sampler
    }

    pub fn point_count(&self) -> usize {
        self.chart.series().len()
    }

    pub fn plotted_resolution(&self) -> Option<usize> {
        self.plotted_resolution
    }

    /// Runs the sample grid through `processor` and shows the result,
    /// replacing whatever was shown before.
    ///
    /// On error the displayed points are left as they were.
    pub fn load(&mut self, processor: &dyn Processor) -> Result<(), LoadError> {
        let pending = self.begin_load()?;
        let plot = pending.run(processor)?;
        self.finish_load(plot);
        Ok(())
    }

    /// The first step of `load()`, split out so that a shared view
    /// only needs to be locked around the quick parts: fetches the
    /// sample grid for the current settings.
    pub fn begin_load(&mut self) -> Result<PendingLoad, InvalidResolution> {
        Ok(PendingLoad {
            grid: self.sampler.samples(self.resolution)?,
            plot_space: self.plot_space,
        })
    }

    /// The last step of `load()`: swaps in the new points all at once.
    pub fn finish_load(&mut self, plot: Plot) {
        self.plotted_resolution = Some(plot.resolution);
        self.chart.series_mut().set_data_array(plot.items);
    }

    pub fn ui(&mut self, ui: &mut eframe::egui::Ui) -> eframe::egui::Response {
        self.chart.ui(ui)
    }
}

impl Default for CubeView {
    fn default() -> CubeView {
        CubeView::new()
    }
}

/// A grid waiting to be run through a processor.  Doesn't borrow the
/// view it came from.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    grid: Arc<Grid>,
    plot_space: PlotSpace,
}

impl PendingLoad {
    pub fn resolution(&self) -> usize {
        self.grid.resolution()
    }

    /// Applies `processor` to a copy of the grid and builds the points
    /// to show.  This is the slow part of a load.
    pub fn run(&self, processor: &dyn Processor) -> Result<Plot, TransformError> {
        // Transform a copy of the grid in place, as packed RGB.
        let cpu_proc = processor.default_cpu_processor();
        let mut buffer = self.grid.to_flat();
        cpu_proc.apply_rgb(&mut buffer)?;

        let plot_space = self.plot_space;
        let items: Vec<ScatterDataItem> = self
            .grid
            .points()
            .iter()
            .zip(buffer.chunks_exact(3))
            .map(|(pos, rgb)| match plot_space {
                PlotSpace::Input => {
                    ScatterDataItem::new(pos[0], pos[1], pos[2], rgb[0], rgb[1], rgb[2])
                }
                PlotSpace::Output => {
                    ScatterDataItem::new(rgb[0], rgb[1], rgb[2], rgb[0], rgb[1], rgb[2])
                }
            })
            .collect();

        Ok(Plot {
            resolution: self.grid.resolution(),
            items: items,
        })
    }
}

/// Points ready to be handed to `CubeView::finish_load()`.
#[derive(Debug, Clone)]
pub struct Plot {
    resolution: usize,
    items: Vec<ScatterDataItem>,
}

impl Plot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadError {
    InvalidResolution(InvalidResolution),
    Transform(TransformError),
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::InvalidResolution(ref e) => Some(e),
            LoadError::Transform(ref e) => Some(e),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::InvalidResolution(e) => e.fmt(f),
            LoadError::Transform(e) => e.fmt(f),
        }
    }
}

impl From<InvalidResolution> for LoadError {
    fn from(other: InvalidResolution) -> Self {
        LoadError::InvalidResolution(other)
    }
}

impl From<TransformError> for LoadError {
    fn from(other: TransformError) -> Self {
        LoadError::Transform(other)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lut::CpuProcessor;

    /// Maps every color through a plain function.
    pub(crate) struct FnProcessor(pub fn([f32; 3]) -> [f32; 3]);

    struct FnCpuProcessor(fn([f32; 3]) -> [f32; 3]);

    impl Processor for FnProcessor {
        fn default_cpu_processor(&self) -> Box<dyn CpuProcessor + '_> {
            Box::new(FnCpuProcessor(self.0))
        }
    }

    impl CpuProcessor for FnCpuProcessor {
        fn apply_rgb(&self, buffer: &mut [f32]) -> Result<(), TransformError> {
            if buffer.len() % 3 != 0 {
                return Err(TransformError::BufferShape { len: buffer.len() });
            }
            for rgb in buffer.chunks_mut(3) {
                let out = (self.0)([rgb[0], rgb[1], rgb[2]]);
                rgb.copy_from_slice(&out);
            }
            Ok(())
        }
    }

    /// Refuses every buffer.
    struct Failing;

    impl Processor for Failing {
        fn default_cpu_processor(&self) -> Box<dyn CpuProcessor + '_> {
            Box::new(Failing)
        }
    }

    impl CpuProcessor for Failing {
        fn apply_rgb(&self, buffer: &mut [f32]) -> Result<(), TransformError> {
            Err(TransformError::BufferShape { len: buffer.len() })
        }
    }

    pub(crate) fn identity(rgb: [f32; 3]) -> [f32; 3] {
        rgb
    }

    fn stub(rgb: [f32; 3]) -> [f32; 3] {
        [1.0 - rgb[0], rgb[1] * 0.5, 0.25]
    }

    fn swap(rgb: [f32; 3]) -> [f32; 3] {
        [rgb[2], rgb[1], rgb[0]]
    }

    #[test]
    fn identity_on_corners() {
        let mut view = CubeView::with_resolution(2);
        view.load(&FnProcessor(identity)).unwrap();

        let items = view.chart().series().data_array();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(items[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(items[2].position, [0.0, 1.0, 0.0]);
        assert_eq!(items[4].position, [0.0, 0.0, 1.0]);
        assert_eq!(items[7].position, [1.0, 1.0, 1.0]);
        for item in items {
            assert_eq!(item.color, item.position);
        }
    }

    #[test]
    fn positions_match_grid_and_colors_match_stub() {
        let mut view = CubeView::with_resolution(5);
        view.load(&FnProcessor(stub)).unwrap();

        let grid = grid_sampler::uniform_samples(5).unwrap();
        let items = view.chart().series().data_array();
        assert_eq!(items.len(), 125);
        for (item, pos) in items.iter().zip(grid.points()) {
            assert_eq!(item.position, *pos);
            assert_eq!(item.color, stub(*pos));
        }
    }

    #[test]
    fn default_resolution() {
        let mut view = CubeView::new();
        assert_eq!(view.resolution(), 20);
        view.load(&FnProcessor(identity)).unwrap();
        assert_eq!(view.point_count(), 20 * 20 * 20);
    }

    #[test]
    fn second_load_replaces_first() {
        let mut view = CubeView::with_resolution(3);
        view.load(&FnProcessor(stub)).unwrap();
        view.load(&FnProcessor(swap)).unwrap();

        let items = view.chart().series().data_array();
        assert_eq!(items.len(), 27);
        for item in items {
            assert_eq!(item.color, swap(item.position));
        }
    }

    #[test]
    fn failed_transform_keeps_points() {
        let mut view = CubeView::with_resolution(2);
        view.load(&FnProcessor(identity)).unwrap();
        let before = view.chart().series().data_array().to_vec();

        assert_eq!(
            view.load(&Failing),
            Err(LoadError::Transform(TransformError::BufferShape { len: 24 }))
        );
        assert_eq!(view.chart().series().data_array(), &before[..]);
    }

    #[test]
    fn invalid_resolution_keeps_points() {
        let mut view = CubeView::with_resolution(2);
        view.load(&FnProcessor(identity)).unwrap();

        view.set_resolution(0);
        assert_eq!(
            view.load(&FnProcessor(identity)),
            Err(LoadError::InvalidResolution(InvalidResolution(0)))
        );
        assert_eq!(view.point_count(), 8);
    }

    #[test]
    fn output_plot_space() {
        let mut view = CubeView::with_resolution(3);
        view.set_plot_space(PlotSpace::Output);
        view.load(&FnProcessor(swap)).unwrap();

        let grid = grid_sampler::uniform_samples(3).unwrap();
        for (item, pos) in view.chart().series().data_array().iter().zip(grid.points()) {
            assert_eq!(item.position, swap(*pos));
            assert_eq!(item.color, swap(*pos));
        }
    }

    #[test]
    fn resolution_changes_use_grid_cache() {
        let mut view = CubeView::with_resolution(RESOLUTIONS[0]);
        for &n in RESOLUTIONS {
            view.set_resolution(n);
            view.load(&FnProcessor(identity)).unwrap();
            assert_eq!(view.point_count(), n * n * n);
        }
        for &n in RESOLUTIONS {
            assert!(view.sampler().cache().contains(n));
        }
    }

    #[test]
    fn split_load_swaps_only_at_the_end() {
        let mut view = CubeView::with_resolution(2);
        view.load(&FnProcessor(identity)).unwrap();
        assert_eq!(view.plotted_resolution(), Some(2));

        view.set_resolution(4);
        let pending = view.begin_load().unwrap();
        assert_eq!(pending.resolution(), 4);

        // Settings changes after this point don't affect the pending load.
        view.set_plot_space(PlotSpace::Output);
        let plot = pending.run(&FnProcessor(stub)).unwrap();
        assert_eq!(plot.len(), 64);
        assert_eq!(view.point_count(), 8);
        assert_eq!(view.plotted_resolution(), Some(2));

        view.finish_load(plot);
        assert_eq!(view.point_count(), 64);
        assert_eq!(view.plotted_resolution(), Some(4));
        let grid = grid_sampler::uniform_samples(4).unwrap();
        for (item, pos) in view.chart().series().data_array().iter().zip(grid.points()) {
            assert_eq!(item.position, *pos);
            assert_eq!(item.color, stub(*pos));
        }
    }

    #[test]
    fn with_lut_processor() {
        use lut::{Lut1D, LutOp, LutProcessor};

        let processor = LutProcessor::new(vec![LutOp::Lut1D(Lut1D {
            ranges: vec![(0.0, 1.0)],
            tables: vec![vec![1.0, 0.0]],
        })])
        .unwrap();
        let mut view = CubeView::with_resolution(2);
        view.load(&processor).unwrap();
        for item in view.chart().series().data_array() {
            let inverted = [
                1.0 - item.position[0],
                1.0 - item.position[1],
                1.0 - item.position[2],
            ];
            assert_eq!(item.color, inverted);
        }
    }
}
