#[derive(Debug)]
#[non_exhaustive]
pub enum ReadError {
    IO(std::io::Error),
    UnknownFormat,
    FormatErr,
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::IO(ref e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::IO(e) => e.fmt(f),
            ReadError::UnknownFormat => write!(f, "UnknownFormat: the file extension doesn't belong to any supported LUT format."),
            ReadError::FormatErr => write!(f, "FormatErr: the file isn't a valid LUT, or uses a feature of its format that is currently unsupported."),
        }
    }
}

/// Returned when a processor can't be applied to a buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum TransformError {
    /// The buffer isn't made of whole RGB triples.
    BufferShape { len: usize },
}

impl std::error::Error for TransformError {}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::BufferShape { len } => write!(
                f,
                "TransformApplicationError: a buffer of {} values can't be processed as packed RGB triples.",
                len
            ),
        }
    }
}

//-------------------------------------------------------------
// From impls.

impl From<std::io::Error> for ReadError {
    fn from(other: std::io::Error) -> Self {
        Self::IO(other)
    }
}

impl From<colorbox::formats::ReadError> for ReadError {
    fn from(other: colorbox::formats::ReadError) -> Self {
        use colorbox::formats::ReadError::*;
        #[allow(unreachable_patterns)]
        match other {
            IoErr(e) => Self::IO(e),
            FormatErr => Self::FormatErr,
            _ => Self::FormatErr,
        }
    }
}
