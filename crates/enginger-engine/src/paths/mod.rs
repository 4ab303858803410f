//! Resource path resolution.
//!
//! A [`ResourceTree`] maps symbolic [`PathRole`]s to absolute filesystem paths
//! under one project root. Nodes live in an index arena; teardown is a clear.

mod arena;
mod error;
mod tree;

use std::fmt;

use crate::device::ShaderStage;

pub use arena::NodeId;
pub use error::PathError;
pub use tree::{ResourceTree, RootSource, SRC_PATH_VAR};

/// Symbolic purpose of a resolved path.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PathRole {
    ConfigFile,
    VertexShader,
    FragmentShader,
}

impl From<ShaderStage> for PathRole {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => PathRole::VertexShader,
            ShaderStage::Fragment => PathRole::FragmentShader,
        }
    }
}

impl fmt::Display for PathRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PathRole::ConfigFile => "config file",
            PathRole::VertexShader => "vertex shader",
            PathRole::FragmentShader => "fragment shader",
        })
    }
}
