use crate::config::DataType;
use crate::path::PathError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid data type: {0}")]
    InvalidDataType(String),
    #[error("Resolution {resolution} greater than selected data type {data_type}")]
    ResolutionOutOfRange { resolution: u32, data_type: DataType },
    #[error("SVG parse error: {0}")]
    SvgParse(String),
    #[error("Path element {index} has no \"d\" attribute")]
    MissingPathData { index: usize },
    #[error("Path element {index} requested, but only {count} found")]
    PathIndexOutOfRange { index: usize, count: usize },
    #[error("Path {index}: {source}")]
    Path {
        index: usize,
        #[source]
        source: PathError,
    },
    #[error("No path coordinates found")]
    EmptyInput,
    #[error("Degenerate canvas: width {width}, height {height}")]
    DegenerateExtent { width: f64, height: f64 },
    #[error("Offsets x={x_offset}, y={y_offset} overflow the scaled coordinates")]
    OffsetOverflow { x_offset: i64, y_offset: i64 },
}

impl Error {
    /// Whether this error was raised while validating the quantization
    /// configuration (before any input was read).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidDataType(_) | Error::ResolutionOutOfRange { .. }
        )
    }
}
