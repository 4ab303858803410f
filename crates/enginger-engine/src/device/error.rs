use std::fmt;

/// What the caller should do after a frame could not be presented.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame may succeed.
    Reconfigured,
    /// Transient failure; drop this frame.
    SkipFrame,
    /// Unrecoverable (out of memory); shut down.
    Fatal,
}

impl fmt::Display for SurfaceErrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceErrorAction::Reconfigured => f.write_str("surface reconfigured"),
            SurfaceErrorAction::SkipFrame => f.write_str("frame skipped"),
            SurfaceErrorAction::Fatal => f.write_str("surface lost beyond recovery"),
        }
    }
}
