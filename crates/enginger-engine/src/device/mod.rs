//! GPU device boundary.
//!
//! [`GpuDriver`] is the handle-based interface the shader and geometry layers
//! talk to. [`WgpuDriver`] implements it on top of wgpu: it owns the
//! instance/device/queue and the window surface, records draws between
//! `clear` and [`WgpuDriver::present`], and replays them in one render pass.

mod api;
mod driver;
mod error;
mod gpu;
mod handle;
mod init;
mod objects;
mod surface;

#[cfg(test)]
pub(crate) mod mock;

pub use api::{
    BufferTarget, GpuDriver, IndexType, PolygonMode, PrimitiveMode, ShaderStage, VertexAttrib,
};
pub use error::SurfaceErrorAction;
pub use gpu::WgpuDriver;
pub use handle::{BufferHandle, ProgramHandle, ShaderHandle, VertexArrayHandle};
pub use init::GpuInit;
