//! The bootstrap scene: one shader program drawing one quad.
//!
//! Wires the resource tree, configuration, shader compiler and geometry
//! together and owns what they produce until shutdown.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::ConfigData;
use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GpuDriver, ProgramHandle, ShaderStage, WgpuDriver};
use crate::geometry::{quad, GeometryBuffer, QUAD_INDICES};
use crate::paths::{PathError, ResourceTree};
use crate::shader::ShaderCompiler;

/// Background color of every frame.
pub const CLEAR_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Half-size of the demo quad in normalized device coordinates.
pub const QUAD_EXTENT: f32 = 0.8;

pub struct BootstrapScene {
    paths: ResourceTree,
    config: ConfigData,
    program: Option<ProgramHandle>,
    geometry: Option<GeometryBuffer>,
}

impl BootstrapScene {
    pub fn new(paths: ResourceTree, config: ConfigData) -> Self {
        Self {
            paths,
            config,
            program: None,
            geometry: None,
        }
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    pub fn paths(&self) -> &ResourceTree {
        &self.paths
    }

    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    pub fn geometry(&self) -> Option<&GeometryBuffer> {
        self.geometry.as_ref()
    }

    /// Absolute paths of the configured vertex and fragment shaders.
    pub fn shader_paths(&mut self) -> Result<(PathBuf, PathBuf), PathError> {
        let vertex = self.paths.shader_path(ShaderStage::Vertex, &self.config.vertex_shader)?;
        let fragment = self
            .paths
            .shader_path(ShaderStage::Fragment, &self.config.fragment_shader)?;
        Ok((vertex, fragment))
    }

    /// Uploads the quad and builds the shader program.
    ///
    /// Whatever was created before a failure stays owned by the scene and is
    /// freed by [`release`](Self::release).
    pub fn load<D: GpuDriver + ?Sized>(&mut self, driver: &mut D) -> Result<()> {
        let geometry = GeometryBuffer::upload(driver, &quad(QUAD_EXTENT), &QUAD_INDICES)
            .context("failed to create vertex array object")?;
        self.geometry = Some(geometry);

        let (vertex, fragment) = self.shader_paths().context("failed to resolve shader paths")?;
        let program = ShaderCompiler::new(driver)
            .create_program_from_files(&vertex, &fragment)
            .context("failed to create shader program")?;
        driver.use_program(Some(program));
        self.program = Some(program);

        log::info!("scene loaded ({} / {})", vertex.display(), fragment.display());
        Ok(())
    }

    /// Draws the quad if everything is loaded.
    pub fn draw<D: GpuDriver + ?Sized>(&self, driver: &mut D) {
        if let (Some(program), Some(geometry)) = (self.program, &self.geometry) {
            geometry.draw(driver, program);
        }
    }

    /// Clears and draws one frame.
    pub fn frame<D: GpuDriver + ?Sized>(&self, driver: &mut D) {
        driver.clear(CLEAR_COLOR);
        self.draw(driver);
    }

    /// Releases geometry, then the program, then tears down the resource tree.
    pub fn release<D: GpuDriver + ?Sized>(&mut self, driver: &mut D) {
        if let Some(geometry) = self.geometry.take() {
            geometry.release(driver);
        }
        if let Some(program) = self.program.take() {
            ShaderCompiler::new(driver).delete_program(program);
        }
        self.paths.teardown();
    }
}

impl App for BootstrapScene {
    fn on_init(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        self.load(&mut *ctx.gpu)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        ctx.render(CLEAR_COLOR, |gpu| self.draw(gpu))
    }

    fn on_shutdown(&mut self, gpu: &mut WgpuDriver<'_>) {
        self.release(gpu);
    }
}
