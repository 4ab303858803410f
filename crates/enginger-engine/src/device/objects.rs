//! Driver-side object tables backing the wgpu implementation of [`GpuDriver`].
//!
//! [`GpuDriver`]: super::GpuDriver

use std::collections::{BTreeMap, HashMap};

use super::api::{PolygonMode, ShaderStage, VertexAttrib};

pub(super) struct ShaderObject {
    pub stage: ShaderStage,
    pub module: Option<wgpu::ShaderModule>,
    pub compiled: bool,
    pub log: String,
}

pub(super) struct LinkedStages {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// Pipelines are keyed by the vertex array they were built against, since wgpu
/// bakes the vertex layout into the pipeline. `None` marks a failed build so it
/// is not retried every frame.
pub(super) type PipelineCache = HashMap<(u32, PolygonMode), Option<wgpu::RenderPipeline>>;

#[derive(Default)]
pub(super) struct ProgramObject {
    pub attached: Vec<u32>,
    pub linked: Option<LinkedStages>,
    pub log: String,
    pub pipelines: PipelineCache,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct AttribBinding {
    pub attrib: VertexAttrib,
    /// Array buffer bound when the attribute was declared.
    pub buffer: Option<u32>,
    pub enabled: bool,
}

#[derive(Debug, Default, Clone)]
pub(super) struct VertexArrayObject {
    pub element_buffer: Option<u32>,
    pub attribs: BTreeMap<u32, AttribBinding>,
}

#[derive(Default)]
pub(super) struct BufferObject {
    pub buffer: Option<wgpu::Buffer>,
}

/// Every object the driver has handed out, keyed by raw handle.
pub(super) struct Objects {
    next_id: u32,
    pub shaders: HashMap<u32, ShaderObject>,
    pub programs: HashMap<u32, ProgramObject>,
    pub vertex_arrays: HashMap<u32, VertexArrayObject>,
    pub buffers: HashMap<u32, BufferObject>,
}

impl Objects {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            vertex_arrays: HashMap::new(),
            buffers: HashMap::new(),
        }
    }

    /// Next non-zero id. Ids are never reused.
    pub fn alloc(&mut self) -> Option<u32> {
        self.next_id = self.next_id.checked_add(1)?;
        Some(self.next_id)
    }

    /// First shader in `attached` of `stage` that compiled. Ids of deleted
    /// shaders are skipped.
    pub fn compiled_shader(&self, attached: &[u32], stage: ShaderStage) -> Option<u32> {
        attached.iter().copied().find(|id| {
            self.shaders
                .get(id)
                .is_some_and(|s| s.stage == stage && s.compiled)
        })
    }

    /// Records `buffer` as the element buffer of `vertex_array`.
    ///
    /// Returns `false` when no live vertex array is bound; the binding is
    /// dropped in that case.
    pub fn bind_element_buffer(&mut self, vertex_array: Option<u32>, buffer: Option<u32>) -> bool {
        match vertex_array.and_then(|v| self.vertex_arrays.get_mut(&v)) {
            Some(vao) => {
                vao.element_buffer = buffer;
                true
            }
            None => false,
        }
    }

    /// Removes a buffer and every vertex array's reference to it.
    pub fn delete_buffer(&mut self, id: u32) -> bool {
        if self.buffers.remove(&id).is_none() {
            return false;
        }
        for vao in self.vertex_arrays.values_mut() {
            if vao.element_buffer == Some(id) {
                vao.element_buffer = None;
            }
        }
        true
    }

    /// Removes a vertex array and the pipelines built against it.
    pub fn delete_vertex_array(&mut self, id: u32) -> bool {
        if self.vertex_arrays.remove(&id).is_none() {
            return false;
        }
        for p in self.programs.values_mut() {
            p.pipelines.retain(|(vao, _), _| *vao != id);
        }
        true
    }
}

/// Bindings that persist between driver calls.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct BindState {
    pub program: Option<u32>,
    pub vertex_array: Option<u32>,
    pub array_buffer: Option<u32>,
    pub polygon_mode: PolygonMode,
}

impl BindState {
    /// Unbinds a deleted object. Ids are unique across object kinds.
    pub fn forget(&mut self, id: u32) {
        for slot in [&mut self.program, &mut self.vertex_array, &mut self.array_buffer] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

/// One vertex buffer slot of a pipeline: every enabled attribute sourced from
/// the same buffer.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct VertexSlot {
    pub buffer: u32,
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

pub(super) fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

/// Groups a vertex array's enabled attributes into buffer slots, in order of
/// each buffer's first shader location.
pub(super) fn vertex_slots(vao: &VertexArrayObject) -> Result<Vec<VertexSlot>, String> {
    let mut slots: Vec<VertexSlot> = Vec::new();

    for binding in vao.attribs.values().filter(|b| b.enabled) {
        let a = binding.attrib;
        let buffer = binding
            .buffer
            .ok_or_else(|| format!("attribute {} has no array buffer", a.location))?;
        let format = vertex_format(a.components)
            .ok_or_else(|| format!("attribute {} has {} components", a.location, a.components))?;

        let attribute = wgpu::VertexAttribute {
            format,
            offset: a.offset,
            shader_location: a.location,
        };

        match slots.iter_mut().find(|s| s.buffer == buffer) {
            Some(slot) if slot.stride == a.stride => slot.attributes.push(attribute),
            Some(slot) => {
                return Err(format!(
                    "attribute {} stride {} differs from buffer stride {}",
                    a.location, a.stride, slot.stride
                ));
            }
            None => slots.push(VertexSlot {
                buffer,
                stride: a.stride,
                attributes: vec![attribute],
            }),
        }
    }

    Ok(slots)
}
