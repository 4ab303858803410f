use std::fmt;

/// Failure while uploading geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The driver handed back fewer objects than requested.
    Allocation {
        what: &'static str,
        requested: usize,
        allocated: usize,
    },
    /// The index count does not fit the draw call's count type.
    TooManyIndices(usize),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::Allocation { what, requested, allocated } => write!(
                f,
                "failed to create {what}: requested {requested}, driver returned {allocated}"
            ),
            GeometryError::TooManyIndices(n) => write!(f, "{n} indices exceed the drawable count"),
        }
    }
}

impl std::error::Error for GeometryError {}
