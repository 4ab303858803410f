//! In-memory driver for tests.

use std::collections::HashMap;

use super::api::{
    BufferTarget, GpuDriver, IndexType, PolygonMode, PrimitiveMode, ShaderStage, VertexAttrib,
};
use super::handle::{BufferHandle, ProgramHandle, ShaderHandle, VertexArrayHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram,
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateVertexArrays(usize),
    CreateBuffers(usize),
    BindVertexArray(Option<u32>),
    BindBuffer(BufferTarget, Option<u32>),
    BufferData(BufferTarget, usize),
    AttribPointer(VertexAttrib),
    EnableAttrib(u32),
    DeleteVertexArrays(Vec<u32>),
    DeleteBuffers(Vec<u32>),
    Clear,
    DrawElements(u32),
    PolygonMode(PolygonMode),
}

#[derive(Debug, Clone)]
pub struct MockShader {
    pub stage: ShaderStage,
    pub compiled: bool,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub attached: Vec<u32>,
    pub linked: bool,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockVertexArray {
    pub element_buffer: Option<u32>,
    pub attribs: Vec<(VertexAttrib, Option<u32>)>,
    pub enabled: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockDraw {
    pub program: Option<u32>,
    pub vertex_array: Option<u32>,
    pub mode: PrimitiveMode,
    pub count: u32,
    pub index_type: IndexType,
}

#[derive(Debug, Default)]
pub struct MockDriver {
    next_id: u32,

    pub shaders: HashMap<u32, MockShader>,
    pub programs: HashMap<u32, MockProgram>,
    pub vertex_arrays: HashMap<u32, MockVertexArray>,
    pub buffers: HashMap<u32, Vec<u8>>,

    pub current_program: Option<u32>,
    pub current_vertex_array: Option<u32>,
    pub array_buffer: Option<u32>,
    pub element_buffer: Option<u32>,
    pub polygon_mode: PolygonMode,

    pub calls: Vec<Call>,
    pub draws: Vec<MockDraw>,

    rejected_sources: Vec<(String, String)>,
    link_error: Option<String>,
    allocation_budget: Option<usize>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources containing `pattern` fail to compile with `log`.
    pub fn reject_source(mut self, pattern: &str, log: &str) -> Self {
        self.rejected_sources.push((pattern.to_string(), log.to_string()));
        self
    }

    /// Every link attempt fails with `log`.
    pub fn fail_link(mut self, log: &str) -> Self {
        self.link_error = Some(log.to_string());
        self
    }

    /// Only `n` more objects can be allocated.
    pub fn allocation_budget(mut self, n: usize) -> Self {
        self.allocation_budget = Some(n);
        self
    }

    /// Live objects of every kind.
    pub fn live_objects(&self) -> usize {
        self.shaders.len() + self.programs.len() + self.vertex_arrays.len() + self.buffers.len()
    }

    pub fn nothing_bound(&self) -> bool {
        self.current_vertex_array.is_none()
            && self.array_buffer.is_none()
            && self.element_buffer.is_none()
    }

    fn alloc(&mut self) -> Option<u32> {
        if let Some(budget) = self.allocation_budget.as_mut() {
            if *budget == 0 {
                return None;
            }
            *budget -= 1;
        }
        self.next_id += 1;
        Some(self.next_id)
    }
}

impl GpuDriver for MockDriver {
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle> {
        self.calls.push(Call::CreateShader(stage));
        let id = self.alloc()?;
        self.shaders.insert(id, MockShader { stage, compiled: false, log: String::new() });
        ShaderHandle::from_raw(id)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) {
        self.calls.push(Call::CompileShader(shader.raw()));
        let rejection = self
            .rejected_sources
            .iter()
            .find(|(pattern, _)| source.contains(pattern.as_str()))
            .map(|(_, log)| log.clone());

        if let Some(s) = self.shaders.get_mut(&shader.raw()) {
            match rejection {
                Some(log) => {
                    s.compiled = false;
                    s.log = log;
                }
                None => {
                    s.compiled = true;
                    s.log.clear();
                }
            }
        }
    }

    fn shader_compiled(&self, shader: ShaderHandle) -> bool {
        self.shaders.get(&shader.raw()).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders.get(&shader.raw()).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.calls.push(Call::DeleteShader(shader.raw()));
        self.shaders.remove(&shader.raw());
    }

    fn create_program(&mut self) -> Option<ProgramHandle> {
        self.calls.push(Call::CreateProgram);
        let id = self.alloc()?;
        self.programs.insert(id, MockProgram::default());
        ProgramHandle::from_raw(id)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        self.calls.push(Call::AttachShader(program.raw(), shader.raw()));
        if let Some(p) = self.programs.get_mut(&program.raw()) {
            p.attached.push(shader.raw());
        }
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        self.calls.push(Call::DetachShader(program.raw(), shader.raw()));
        if let Some(p) = self.programs.get_mut(&program.raw()) {
            p.attached.retain(|s| *s != shader.raw());
        }
    }

    fn link_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::LinkProgram(program.raw()));
        let Some(p) = self.programs.get(&program.raw()) else { return };

        let has_stage = |stage: ShaderStage| {
            p.attached
                .iter()
                .filter_map(|id| self.shaders.get(id))
                .any(|s| s.stage == stage && s.compiled)
        };

        let outcome = match &self.link_error {
            Some(log) => Err(log.clone()),
            None if !has_stage(ShaderStage::Vertex) => Err("no compiled vertex shader".to_string()),
            None if !has_stage(ShaderStage::Fragment) => {
                Err("no compiled fragment shader".to_string())
            }
            None => Ok(()),
        };

        if let Some(p) = self.programs.get_mut(&program.raw()) {
            match outcome {
                Ok(()) => {
                    p.linked = true;
                    p.log.clear();
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                }
            }
        }
    }

    fn program_linked(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program.raw()).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs.get(&program.raw()).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.calls.push(Call::UseProgram(program.map(ProgramHandle::raw)));
        self.current_program = program.map(ProgramHandle::raw);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::DeleteProgram(program.raw()));
        self.programs.remove(&program.raw());
        if self.current_program == Some(program.raw()) {
            self.current_program = None;
        }
    }

    fn create_vertex_arrays(&mut self, count: usize) -> Vec<VertexArrayHandle> {
        self.calls.push(Call::CreateVertexArrays(count));
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.alloc() else { break };
            self.vertex_arrays.insert(id, MockVertexArray::default());
            out.extend(VertexArrayHandle::from_raw(id));
        }
        out
    }

    fn create_buffers(&mut self, count: usize) -> Vec<BufferHandle> {
        self.calls.push(Call::CreateBuffers(count));
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.alloc() else { break };
            self.buffers.insert(id, Vec::new());
            out.extend(BufferHandle::from_raw(id));
        }
        out
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        let id = vertex_array.map(VertexArrayHandle::raw);
        self.calls.push(Call::BindVertexArray(id));
        self.current_vertex_array = id;
        self.element_buffer = id
            .and_then(|v| self.vertex_arrays.get(&v))
            .and_then(|v| v.element_buffer);
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        let id = buffer.map(BufferHandle::raw);
        self.calls.push(Call::BindBuffer(target, id));
        match target {
            BufferTarget::Array => self.array_buffer = id,
            BufferTarget::ElementArray => {
                self.element_buffer = id;
                if let Some(vao) = self.current_vertex_array.and_then(|v| self.vertex_arrays.get_mut(&v)) {
                    vao.element_buffer = id;
                }
            }
        }
    }

    fn buffer_static_data(&mut self, target: BufferTarget, data: &[u8]) {
        self.calls.push(Call::BufferData(target, data.len()));
        let bound = match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_buffer,
        };
        if let Some(buf) = bound.and_then(|b| self.buffers.get_mut(&b)) {
            *buf = data.to_vec();
        }
    }

    fn vertex_attrib_pointer(&mut self, attrib: VertexAttrib) {
        self.calls.push(Call::AttribPointer(attrib));
        let source = self.array_buffer;
        if let Some(vao) = self.current_vertex_array.and_then(|v| self.vertex_arrays.get_mut(&v)) {
            vao.attribs.push((attrib, source));
        }
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.calls.push(Call::EnableAttrib(location));
        if let Some(vao) = self.current_vertex_array.and_then(|v| self.vertex_arrays.get_mut(&v)) {
            vao.enabled.push(location);
        }
    }

    fn delete_vertex_arrays(&mut self, vertex_arrays: &[VertexArrayHandle]) {
        self.calls
            .push(Call::DeleteVertexArrays(vertex_arrays.iter().map(|v| v.raw()).collect()));
        for v in vertex_arrays {
            self.vertex_arrays.remove(&v.raw());
            if self.current_vertex_array == Some(v.raw()) {
                self.current_vertex_array = None;
            }
        }
    }

    fn delete_buffers(&mut self, buffers: &[BufferHandle]) {
        self.calls.push(Call::DeleteBuffers(buffers.iter().map(|b| b.raw()).collect()));
        for b in buffers {
            self.buffers.remove(&b.raw());
            if self.array_buffer == Some(b.raw()) {
                self.array_buffer = None;
            }
            if self.element_buffer == Some(b.raw()) {
                self.element_buffer = None;
            }
        }
    }

    fn clear(&mut self, _color: [f32; 4]) {
        self.calls.push(Call::Clear);
    }

    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32, index_type: IndexType) {
        self.calls.push(Call::DrawElements(count));
        self.draws.push(MockDraw {
            program: self.current_program,
            vertex_array: self.current_vertex_array,
            mode,
            count,
            index_type,
        });
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.calls.push(Call::PolygonMode(mode));
        self.polygon_mode = mode;
    }
}
