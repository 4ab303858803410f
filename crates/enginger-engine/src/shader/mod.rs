//! Shader source loading, compilation and program linking.

mod compiler;
mod error;
mod source;

pub use compiler::ShaderCompiler;
pub use error::ShaderError;
pub use source::read_source;
