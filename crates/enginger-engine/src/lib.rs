//! enGinger engine crate.
//!
//! Resource path resolution, shader compilation, static geometry upload and
//! the window runtime that draws it through a wgpu-backed driver.

pub mod config;
pub mod core;
pub mod device;
pub mod geometry;
pub mod logging;
pub mod paths;
pub mod scene;
pub mod shader;
pub mod window;
