use std::collections::TryReserveError;

/// Errors building a geometry record.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("edge index array has odd length {0}")]
    OddIndexCount(usize),
}

/// Errors reading STL data.
#[derive(Debug, thiserror::Error)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),
    #[error("unexpected end of file: header declares {declared} triangles, data holds {available}")]
    Truncated { declared: usize, available: usize },
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

/// Errors allocating a canvas.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas size {width}x{height} overflows")]
    TooLarge { width: usize, height: usize },
    #[error("failed to allocate {width}x{height} canvas: {source}")]
    Allocation {
        width: usize,
        height: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Errors aborting a single render call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to allocate line buffer for {lines} edges: {source}")]
    Allocation {
        lines: usize,
        #[source]
        source: TryReserveError,
    },
}
