//! Reads color transform lookup tables from disk and turns them into
//! processors that apply them to RGB buffers.
//!
//! The file parsing itself is done by `colorbox`.  This crate decides
//! which reader to use for a file, and evaluates the resulting tables.

mod error;
mod processor;

use std::{
    fs::File,
    io::{BufReader, Seek},
    path::Path,
};

use colorbox::formats;

pub use colorbox::lut::{Lut1D, Lut3D};
pub use error::{ReadError, TransformError};
pub use processor::{CpuProcessor, LutOp, LutProcessor, Processor};

/// A LUT file format that `load_processor()` understands.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FileFormat {
    /// Human-readable name, for file dialogs and such.
    pub name: &'static str,

    /// Lower case, without the leading dot.
    pub extensions: &'static [&'static str],
}

/// All registered file formats.
pub const FORMATS: &[FileFormat] = &[
    FileFormat {
        name: "Iridas/Resolve Cube",
        extensions: &["cube"],
    },
    FileFormat {
        name: "Imageworks 1D LUT",
        extensions: &["spi1d"],
    },
    FileFormat {
        name: "Imageworks 3D LUT",
        extensions: &["spi3d"],
    },
];

/// Finds the registered format for a file extension (case insensitive).
pub fn format_for_extension(extension: &str) -> Option<&'static FileFormat> {
    let extension = extension.to_ascii_lowercase();
    FORMATS
        .iter()
        .find(|f| f.extensions.iter().any(|e| *e == extension))
}

/// Loads a LUT file into a processor, choosing the reader based on
/// the file's extension.
pub fn load_processor<P: AsRef<Path>>(path: P) -> Result<LutProcessor, ReadError> {
    let path: &Path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or(ReadError::UnknownFormat)?;
    if format_for_extension(&extension).is_none() {
        return Err(ReadError::UnknownFormat);
    }

    let mut file = BufReader::new(File::open(path)?);

    let ops = match extension.as_str() {
        "cube" => {
            // There are actually two different .cube formats, and the
            // Iridas one can hold either a 1D or a 3D table, so we try
            // them one after another.
            if let Ok(lut) = formats::cube_iridas::read_1d(&mut file) {
                vec![LutOp::Lut1D(lut)]
            } else {
                file.rewind()?;
                if let Ok(lut) = formats::cube_iridas::read_3d(&mut file) {
                    vec![LutOp::Lut3D(lut)]
                } else {
                    file.rewind()?;
                    match formats::cube_resolve::read(&mut file)? {
                        (Some(lut1), Some(lut3)) => vec![LutOp::Lut1D(lut1), LutOp::Lut3D(lut3)],
                        (Some(lut1), None) => vec![LutOp::Lut1D(lut1)],
                        (None, Some(lut3)) => vec![LutOp::Lut3D(lut3)],
                        (None, None) => return Err(ReadError::FormatErr),
                    }
                }
            }
        }

        "spi1d" => vec![LutOp::Lut1D(formats::spi1d::read(&mut file)?)],

        "spi3d" => vec![LutOp::Lut3D(formats::spi3d::read(&mut file)?)],

        _ => return Err(ReadError::UnknownFormat),
    };

    LutProcessor::new(ops)
}
