use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::device::ShaderStage;

/// Failure while turning shader files into a linked program.
#[derive(Debug)]
pub enum ShaderError {
    /// The source file could not be read.
    Read { path: PathBuf, source: io::Error },
    /// The driver rejected a stage. `log` is the driver's full info log.
    Compile { stage: ShaderStage, log: String },
    /// The stages did not link into a program.
    Link { log: String },
    /// The driver returned no object.
    Create { what: &'static str },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Read { path, source } => {
                write!(f, "shader file reading failed ({}): {source}", path.display())
            }
            ShaderError::Compile { stage, log } => {
                write!(f, "{stage}: compilation failed\n{log}")
            }
            ShaderError::Link { log } => write!(f, "shader program linking failed\n{log}"),
            ShaderError::Create { what } => write!(f, "driver could not create a {what}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}
