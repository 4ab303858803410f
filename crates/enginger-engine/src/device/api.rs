use std::fmt;

use super::handle::{BufferHandle, ProgramHandle, ShaderHandle, VertexArrayHandle};

/// Programmable pipeline stage a shader object is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex shader",
            ShaderStage::Fragment => "Fragment shader",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data. The binding is recorded in the bound vertex array.
    ElementArray,
}

/// One float vertex attribute inside the currently bound array buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttrib {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components (1..=4).
    pub components: u32,
    /// Byte distance between consecutive vertices.
    pub stride: u64,
    /// Byte offset of the attribute within one vertex.
    pub offset: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveMode {
    Triangles,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

/// Rasterization mode for polygons.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

/// The GPU driver boundary.
///
/// Object-creation calls hand back driver-assigned handles; `None` (or a
/// shorter list than requested) means the driver could not allocate. Calls
/// that take a handle the driver does not know are ignored.
///
/// All calls happen on the thread that owns the GPU context.
pub trait GpuDriver {
    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle>;
    /// Replaces the shader's source and compiles it. Query the outcome with
    /// [`shader_compiled`](Self::shader_compiled).
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str);
    fn shader_compiled(&self, shader: ShaderHandle) -> bool;
    fn shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&mut self, shader: ShaderHandle);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&mut self) -> Option<ProgramHandle>;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn link_program(&mut self, program: ProgramHandle);
    fn program_linked(&self, program: ProgramHandle) -> bool;
    fn program_info_log(&self, program: ProgramHandle) -> String;
    fn use_program(&mut self, program: Option<ProgramHandle>);
    fn delete_program(&mut self, program: ProgramHandle);

    // ── vertex arrays & buffers ───────────────────────────────────────────

    fn create_vertex_arrays(&mut self, count: usize) -> Vec<VertexArrayHandle>;
    fn create_buffers(&mut self, count: usize) -> Vec<BufferHandle>;
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);
    /// Uploads write-once storage into the buffer bound at `target`.
    fn buffer_static_data(&mut self, target: BufferTarget, data: &[u8]);
    /// Declares an attribute sourced from the bound array buffer, recorded in
    /// the bound vertex array.
    fn vertex_attrib_pointer(&mut self, attrib: VertexAttrib);
    fn enable_vertex_attrib_array(&mut self, location: u32);
    fn delete_vertex_arrays(&mut self, vertex_arrays: &[VertexArrayHandle]);
    fn delete_buffers(&mut self, buffers: &[BufferHandle]);

    // ── frame ─────────────────────────────────────────────────────────────

    /// Clears the back buffer to `color` (linear RGBA).
    fn clear(&mut self, color: [f32; 4]);
    /// Draws `count` indices from the bound vertex array's index buffer.
    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32, index_type: IndexType);
    fn set_polygon_mode(&mut self, mode: PolygonMode);
}
