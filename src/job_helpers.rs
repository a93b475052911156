use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use lut::{LutProcessor, Processor};
use shared_data::Shared;

use crate::cube_view::{CubeView, LoadError};

/// Everything that can go wrong when opening a LUT for viewing.
#[derive(Debug)]
pub enum OpenLutError {
    FileNotFound(PathBuf),
    /// The color engine couldn't make a processor from the file.
    Engine(lut::ReadError),
    /// The processor couldn't be applied to the sample grid.
    Load(LoadError),
}

impl std::error::Error for OpenLutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OpenLutError::FileNotFound(_) => None,
            OpenLutError::Engine(ref e) => Some(e),
            OpenLutError::Load(ref e) => Some(e),
        }
    }
}

impl std::fmt::Display for OpenLutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenLutError::FileNotFound(path) => {
                write!(f, "File not found:\n{}", path.to_string_lossy())
            }
            OpenLutError::Engine(e) => e.fmt(f),
            OpenLutError::Load(e) => e.fmt(f),
        }
    }
}

impl From<lut::ReadError> for OpenLutError {
    fn from(other: lut::ReadError) -> Self {
        OpenLutError::Engine(other)
    }
}

impl From<LoadError> for OpenLutError {
    fn from(other: LoadError) -> Self {
        OpenLutError::Load(other)
    }
}

/// Cheap check to run on the UI thread before queueing any loading.
pub fn check_lut_path<P: AsRef<Path>>(path: P) -> Result<(), OpenLutError> {
    let path: &Path = path.as_ref();
    if path.exists() {
        Ok(())
    } else {
        Err(OpenLutError::FileNotFound(path.into()))
    }
}

pub fn load_lut_processor<P: AsRef<Path>>(path: P) -> Result<LutProcessor, OpenLutError> {
    let path: &Path = path.as_ref();
    check_lut_path(path)?;
    Ok(lut::load_processor(path)?)
}

/// Loads the LUT at `path` and shows it in `cube_view`.
///
/// The file is read without holding the view's lock, and the view is
/// only touched once the processor is ready.  On error the view is
/// left as it was.
pub fn open_lut<P: AsRef<Path>>(
    path: P,
    cube_view: &Shared<CubeView>,
) -> Result<Arc<LutProcessor>, OpenLutError> {
    let processor = Arc::new(load_lut_processor(path)?);
    replot(&*processor, cube_view)?;
    Ok(processor)
}

/// `CubeView::load()` for a view that the UI is drawing at the same
/// time.  The view is only locked to fetch the grid and to swap in
/// the finished points, not while `processor` runs.
pub fn replot(processor: &dyn Processor, cube_view: &Shared<CubeView>) -> Result<(), LoadError> {
    let pending = cube_view.lock_mut().begin_load()?;
    let plot = pending.run(processor)?;
    cube_view.lock_mut().finish_load(plot);
    Ok(())
}

/// A file dialog filter.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FormatFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FormatFilter {
    /// E.g. "Imageworks 1D LUT (*.spi1d)".
    pub fn label(&self) -> String {
        let patterns: Vec<String> = self
            .extensions
            .iter()
            .map(|e| format!("*.{}", e))
            .collect();
        format!("{} ({})", self.name, patterns.join(" "))
    }
}

/// The open-file filters for LUTs: all LUT files, each registered
/// format, and finally all files.
pub fn lut_format_filters() -> Vec<FormatFilter> {
    let mut all_extensions: Vec<String> = Vec::new();
    let mut per_format = Vec::new();
    for format in lut::FORMATS.iter() {
        let extensions: Vec<String> = format.extensions.iter().map(|e| e.to_string()).collect();
        all_extensions.extend(extensions.iter().cloned());
        per_format.push(FormatFilter {
            name: format.name.into(),
            extensions: extensions,
        });
    }
    all_extensions.sort();
    all_extensions.dedup();

    let mut filters = Vec::with_capacity(per_format.len() + 2);
    filters.push(FormatFilter {
        name: "All LUT files".into(),
        extensions: all_extensions,
    });
    filters.extend(per_format);
    filters.push(FormatFilter {
        name: "All files".into(),
        extensions: vec!["*".into()],
    });
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube_view::tests::{identity, FnProcessor};
    use lut::{CpuProcessor, TransformError};
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "lut_view_test_{}_{}",
            std::process::id(),
            name
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn populated_view() -> Shared<CubeView> {
        let mut view = CubeView::with_resolution(3);
        view.load(&FnProcessor(identity)).unwrap();
        Shared::new(view)
    }

    #[test]
    fn missing_file_leaves_view_alone() {
        let view = populated_view();
        let before = view.lock().chart().series().data_array().to_vec();

        let path = std::env::temp_dir().join("lut_view_test_does_not_exist.cube");
        let err = open_lut(&path, &view).unwrap_err();
        assert!(matches!(err, OpenLutError::FileNotFound(ref p) if *p == path));
        assert!(err.to_string().starts_with("File not found:\n"));
        assert_eq!(view.lock().chart().series().data_array(), &before[..]);
    }

    #[test]
    fn engine_error_leaves_view_alone() {
        let view = populated_view();
        let before = view.lock().chart().series().data_array().to_vec();

        let path = temp_file("notes.txt", "not a lut");
        let err = open_lut(&path, &view).unwrap_err();
        assert!(matches!(
            err,
            OpenLutError::Engine(lut::ReadError::UnknownFormat)
        ));
        assert!(err.to_string().starts_with("UnknownFormat"));
        assert_eq!(view.lock().chart().series().data_array(), &before[..]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn existing_file_is_loaded() {
        let view = populated_view();
        let path = temp_file(
            "invert.cube",
            "LUT_1D_SIZE 2\n1.0 1.0 1.0\n0.0 0.0 0.0\n",
        );
        open_lut(&path, &view).unwrap();

        let view = view.lock();
        assert_eq!(view.point_count(), 27);
        for item in view.chart().series().data_array() {
            for i in 0..3 {
                assert!((item.color[i] - (1.0 - item.position[i])).abs() < 0.000_01);
            }
        }
        let _ = std::fs::remove_file(path);
    }

    /// Looks at the view while transforming, which would deadlock if
    /// the view were locked for writing around the transform.
    struct PeekingProcessor {
        view: Shared<CubeView>,
        seen_point_count: Shared<Option<usize>>,
    }

    impl Processor for PeekingProcessor {
        fn default_cpu_processor(&self) -> Box<dyn CpuProcessor + '_> {
            Box::new(PeekingCpuProcessor(self))
        }
    }

    struct PeekingCpuProcessor<'a>(&'a PeekingProcessor);

    impl<'a> CpuProcessor for PeekingCpuProcessor<'a> {
        fn apply_rgb(&self, _buffer: &mut [f32]) -> Result<(), TransformError> {
            let count = self.0.view.lock().point_count();
            *self.0.seen_point_count.lock_mut() = Some(count);
            Ok(())
        }
    }

    #[test]
    fn replot_doesnt_lock_view_during_transform() {
        let view = populated_view();
        view.lock_mut().set_resolution(4);
        let processor = PeekingProcessor {
            view: view.clone_ref(),
            seen_point_count: Shared::new(None),
        };

        replot(&processor, &view).unwrap();

        // The old points were still shown while the transform ran.
        assert_eq!(*processor.seen_point_count.lock(), Some(27));
        assert_eq!(view.lock().point_count(), 64);
        assert_eq!(view.lock().plotted_resolution(), Some(4));
    }

    #[test]
    fn filters() {
        let filters = lut_format_filters();
        assert_eq!(filters.len(), lut::FORMATS.len() + 2);

        assert_eq!(filters[0].name, "All LUT files");
        assert_eq!(filters[0].extensions, vec!["cube", "spi1d", "spi3d"]);
        assert_eq!(
            filters[0].label(),
            "All LUT files (*.cube *.spi1d *.spi3d)"
        );

        assert_eq!(filters[2].label(), "Imageworks 1D LUT (*.spi1d)");
        assert_eq!(filters.last().unwrap().label(), "All files (*.*)");
    }
}
