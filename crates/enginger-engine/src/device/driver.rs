use wgpu::util::DeviceExt;

use super::api::{
    BufferTarget, GpuDriver, IndexType, PolygonMode, PrimitiveMode, ShaderStage, VertexAttrib,
};
use super::gpu::{DrawCall, WgpuDriver};
use super::handle::{BufferHandle, ProgramHandle, ShaderHandle, VertexArrayHandle};
use super::objects::{
    vertex_slots, AttribBinding, BufferObject, LinkedStages, ProgramObject, ShaderObject,
    VertexArrayObject,
};

/// Compiles WGSL inside a validation error scope.
///
/// Returns the module only when compilation produced no errors. The log holds
/// one `line:column: message` line per error, or the scope's validation error
/// when the compiler reported none.
pub(super) fn compile_wgsl(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> (Option<wgpu::ShaderModule>, String) {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage.name()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let info = pollster::block_on(module.get_compilation_info());
    let scope_error = pollster::block_on(scope.pop());

    let mut log = String::new();
    for msg in &info.messages {
        if !matches!(msg.message_type, wgpu::CompilationMessageType::Error) {
            continue;
        }
        match &msg.location {
            Some(loc) => log.push_str(&format!(
                "{}:{}: {}\n",
                loc.line_number, loc.line_position, msg.message
            )),
            None => log.push_str(&format!("{}\n", msg.message)),
        }
    }
    if log.is_empty() {
        if let Some(err) = scope_error {
            log = err.to_string();
        }
    }

    (log.is_empty().then_some(module), log)
}

impl GpuDriver for WgpuDriver<'_> {
    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle> {
        let id = self.objects.alloc()?;
        self.objects.shaders.insert(
            id,
            ShaderObject {
                stage,
                module: None,
                compiled: false,
                log: String::new(),
            },
        );
        log::trace!("created {stage} {id}");
        ShaderHandle::from_raw(id)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) {
        let Some(obj) = self.objects.shaders.get_mut(&shader.raw()) else { return };

        let (module, log) = compile_wgsl(&self.device, obj.stage, source);
        obj.compiled = module.is_some();
        obj.module = module;
        obj.log = log;
    }

    fn shader_compiled(&self, shader: ShaderHandle) -> bool {
        self.objects
            .shaders
            .get(&shader.raw())
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.objects
            .shaders
            .get(&shader.raw())
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.objects.shaders.remove(&shader.raw()).is_some() {
            log::trace!("deleted shader {}", shader.raw());
        }
    }

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&mut self) -> Option<ProgramHandle> {
        let id = self.objects.alloc()?;
        self.objects.programs.insert(id, ProgramObject::default());
        log::trace!("created program {id}");
        ProgramHandle::from_raw(id)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if !self.objects.shaders.contains_key(&shader.raw()) {
            return;
        }
        if let Some(p) = self.objects.programs.get_mut(&program.raw()) {
            p.attached.push(shader.raw());
        }
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if let Some(p) = self.objects.programs.get_mut(&program.raw()) {
            p.attached.retain(|s| *s != shader.raw());
        }
    }

    /// Links by taking one compiled module per stage from the attached shaders.
    ///
    /// The modules are retained by the program, so the shader objects may be
    /// deleted right after linking.
    fn link_program(&mut self, program: ProgramHandle) {
        let Some(p) = self.objects.programs.get(&program.raw()) else { return };

        let stage_module = |stage: ShaderStage| {
            self.objects
                .compiled_shader(&p.attached, stage)
                .and_then(|id| self.objects.shaders.get(&id))
                .and_then(|s| s.module.clone())
        };

        let linked = match (stage_module(ShaderStage::Vertex), stage_module(ShaderStage::Fragment)) {
            (Some(vertex), Some(fragment)) => Ok(LinkedStages { vertex, fragment }),
            (None, _) => Err("no compiled vertex shader attached"),
            (_, None) => Err("no compiled fragment shader attached"),
        };

        let Some(p) = self.objects.programs.get_mut(&program.raw()) else { return };
        p.pipelines.clear();
        match linked {
            Ok(stages) => {
                p.linked = Some(stages);
                p.log.clear();
            }
            Err(reason) => {
                p.linked = None;
                p.log = reason.to_string();
            }
        }
    }

    fn program_linked(&self, program: ProgramHandle) -> bool {
        self.objects
            .programs
            .get(&program.raw())
            .is_some_and(|p| p.linked.is_some())
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.objects
            .programs
            .get(&program.raw())
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.state.program = program
            .map(ProgramHandle::raw)
            .filter(|id| self.objects.programs.contains_key(id));
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.objects.programs.remove(&program.raw()).is_some() {
            log::trace!("deleted program {}", program.raw());
        }
        self.state.forget(program.raw());
    }

    // ── vertex arrays & buffers ───────────────────────────────────────────

    fn create_vertex_arrays(&mut self, count: usize) -> Vec<VertexArrayHandle> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.objects.alloc() else { break };
            self.objects.vertex_arrays.insert(id, VertexArrayObject::default());
            out.extend(VertexArrayHandle::from_raw(id));
        }
        out
    }

    fn create_buffers(&mut self, count: usize) -> Vec<BufferHandle> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.objects.alloc() else { break };
            self.objects.buffers.insert(id, BufferObject::default());
            out.extend(BufferHandle::from_raw(id));
        }
        out
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.state.vertex_array = vertex_array
            .map(VertexArrayHandle::raw)
            .filter(|id| self.objects.vertex_arrays.contains_key(id));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        let id = buffer
            .map(BufferHandle::raw)
            .filter(|id| self.objects.buffers.contains_key(id));
        match target {
            BufferTarget::Array => self.state.array_buffer = id,
            BufferTarget::ElementArray => {
                let recorded = self.objects.bind_element_buffer(self.state.vertex_array, id);
                if !recorded && id.is_some() {
                    log::warn!("element buffer bound without a vertex array");
                }
            }
        }
    }

    fn buffer_static_data(&mut self, target: BufferTarget, data: &[u8]) {
        let (bound, usage, label) = match target {
            BufferTarget::Array => (
                self.state.array_buffer,
                wgpu::BufferUsages::VERTEX,
                "enginger vertex buffer",
            ),
            BufferTarget::ElementArray => (
                self.state
                    .vertex_array
                    .and_then(|v| self.objects.vertex_arrays.get(&v))
                    .and_then(|v| v.element_buffer),
                wgpu::BufferUsages::INDEX,
                "enginger index buffer",
            ),
        };

        let Some(obj) = bound.and_then(|b| self.objects.buffers.get_mut(&b)) else {
            log::warn!("static upload of {} bytes with no {target:?} buffer bound", data.len());
            return;
        };

        obj.buffer = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data,
            usage,
        }));
    }

    fn vertex_attrib_pointer(&mut self, attrib: VertexAttrib) {
        let buffer = self.state.array_buffer;
        let vao = self.state.vertex_array;
        let Some(vao) = vao.and_then(|v| self.objects.vertex_arrays.get_mut(&v)) else {
            log::warn!("attribute {} declared without a vertex array", attrib.location);
            return;
        };

        let enabled = vao
            .attribs
            .get(&attrib.location)
            .is_some_and(|b| b.enabled);
        vao.attribs.insert(attrib.location, AttribBinding { attrib, buffer, enabled });
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        let vao = self.state.vertex_array;
        if let Some(binding) = vao
            .and_then(|v| self.objects.vertex_arrays.get_mut(&v))
            .and_then(|v| v.attribs.get_mut(&location))
        {
            binding.enabled = true;
        }
    }

    fn delete_vertex_arrays(&mut self, vertex_arrays: &[VertexArrayHandle]) {
        for v in vertex_arrays {
            if self.objects.delete_vertex_array(v.raw()) {
                self.state.forget(v.raw());
            }
        }
    }

    fn delete_buffers(&mut self, buffers: &[BufferHandle]) {
        for b in buffers {
            if self.objects.delete_buffer(b.raw()) {
                self.state.forget(b.raw());
            }
        }
    }

    // ── frame ─────────────────────────────────────────────────────────────

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
        self.draws.clear();
    }

    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32, index_type: IndexType) {
        let PrimitiveMode::Triangles = mode;

        let (Some(program), Some(vao_id)) = (self.state.program, self.state.vertex_array) else {
            log::warn!("draw with no program or vertex array bound");
            return;
        };
        let Some(pipeline) = self.pipeline_for(program, vao_id) else { return };

        let Some(vao) = self.objects.vertex_arrays.get(&vao_id) else { return };
        let buffer = |id: u32| self.objects.buffers.get(&id).and_then(|b| b.buffer.clone());

        let Some(index_buffer) = vao.element_buffer.and_then(buffer) else {
            log::warn!("vertex array {vao_id} has no index data");
            return;
        };

        let vertex_buffers = match vertex_slots(vao) {
            Ok(slots) => slots.iter().map(|s| buffer(s.buffer)).collect::<Option<Vec<_>>>(),
            Err(_) => None,
        };
        let Some(vertex_buffers) = vertex_buffers else {
            log::warn!("vertex array {vao_id} has attributes without vertex data");
            return;
        };

        let index_format = match index_type {
            IndexType::U16 => wgpu::IndexFormat::Uint16,
            IndexType::U32 => wgpu::IndexFormat::Uint32,
        };

        self.draws.push(DrawCall {
            pipeline,
            vertex_buffers,
            index_buffer,
            index_format,
            count,
        });
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        if !self.supports_polygon_mode(mode) {
            log::warn!("polygon mode {mode:?} is not supported by this device; keeping fill");
            self.state.polygon_mode = PolygonMode::Fill;
            return;
        }
        self.state.polygon_mode = mode;
    }
}
