use std::mem::{size_of, take};

use crate::device::{
    BufferHandle, BufferTarget, GpuDriver, IndexType, PrimitiveMode, ProgramHandle,
    VertexArrayHandle,
};

use super::{GeometryError, Vertex};

/// Static vertex and index data living on the GPU.
///
/// Owns every object it allocated. [`release`](Self::release) consumes the
/// buffer, so each object is deleted exactly once.
#[derive(Debug)]
pub struct GeometryBuffer {
    vertex_arrays: Vec<VertexArrayHandle>,
    vertex_buffers: Vec<BufferHandle>,
    index_buffers: Vec<BufferHandle>,
    index_count: u32,
}

impl GeometryBuffer {
    /// Uploads `vertices` and `indices` as write-once storage and records the
    /// [`Vertex`] attribute layout in a fresh vertex array.
    ///
    /// Leaves no vertex array bound. On error nothing stays allocated.
    pub fn upload<D: GpuDriver + ?Sized>(
        driver: &mut D,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self, GeometryError> {
        let index_count =
            u32::try_from(indices.len()).map_err(|_| GeometryError::TooManyIndices(indices.len()))?;

        let mut geometry = Self {
            vertex_arrays: driver.create_vertex_arrays(1),
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            index_count,
        };
        if let Err(e) = geometry.check_allocation("vertex array", 1, |g| g.vertex_arrays.len()) {
            geometry.delete_objects(driver);
            return Err(e);
        }
        geometry.index_buffers = driver.create_buffers(1);
        if let Err(e) = geometry.check_allocation("index buffer", 1, |g| g.index_buffers.len()) {
            geometry.delete_objects(driver);
            return Err(e);
        }
        geometry.vertex_buffers = driver.create_buffers(1);
        if let Err(e) = geometry.check_allocation("vertex buffer", 1, |g| g.vertex_buffers.len()) {
            geometry.delete_objects(driver);
            return Err(e);
        }

        let vao = geometry.vertex_arrays[0];
        driver.bind_vertex_array(Some(vao));

        driver.bind_buffer(BufferTarget::ElementArray, Some(geometry.index_buffers[0]));
        driver.buffer_static_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices));

        driver.bind_buffer(BufferTarget::Array, Some(geometry.vertex_buffers[0]));
        driver.buffer_static_data(BufferTarget::Array, bytemuck::cast_slice(vertices));

        for attrib in Vertex::ATTRIBUTES {
            driver.vertex_attrib_pointer(attrib);
            driver.enable_vertex_attrib_array(attrib.location);
        }

        driver.bind_vertex_array(None);

        log::debug!(
            "uploaded {} vertices ({} bytes), {} indices ({} bytes) into {vao:?}",
            vertices.len(),
            size_of::<Vertex>() * vertices.len(),
            indices.len(),
            size_of::<u32>() * indices.len(),
        );
        Ok(geometry)
    }

    pub fn vertex_array(&self) -> Option<VertexArrayHandle> {
        self.vertex_arrays.first().copied()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Draws every index with `program`.
    pub fn draw<D: GpuDriver + ?Sized>(&self, driver: &mut D, program: ProgramHandle) {
        if let Some(vao) = self.vertex_array() {
            draw(driver, program, vao, self.index_count);
        }
    }

    /// Unbinds and deletes every object this buffer owns.
    pub fn release<D: GpuDriver + ?Sized>(mut self, driver: &mut D) {
        driver.bind_vertex_array(None);
        driver.bind_buffer(BufferTarget::Array, None);
        driver.bind_buffer(BufferTarget::ElementArray, None);
        self.delete_objects(driver);
        log::debug!("released geometry");
    }

    fn check_allocation(
        &self,
        what: &'static str,
        requested: usize,
        allocated: impl Fn(&Self) -> usize,
    ) -> Result<(), GeometryError> {
        let allocated = allocated(self);
        if allocated < requested {
            log::error!("::Failed to create {what}");
            return Err(GeometryError::Allocation { what, requested, allocated });
        }
        Ok(())
    }

    /// Host-side lists are cleared only after the driver calls.
    fn delete_objects<D: GpuDriver + ?Sized>(&mut self, driver: &mut D) {
        if !self.vertex_arrays.is_empty() {
            driver.delete_vertex_arrays(&self.vertex_arrays);
        }
        if !self.vertex_buffers.is_empty() {
            driver.delete_buffers(&self.vertex_buffers);
        }
        if !self.index_buffers.is_empty() {
            driver.delete_buffers(&self.index_buffers);
        }
        take(&mut self.vertex_arrays);
        take(&mut self.vertex_buffers);
        take(&mut self.index_buffers);
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        let live = self.vertex_arrays.len() + self.vertex_buffers.len() + self.index_buffers.len();
        if live > 0 {
            log::warn!("geometry dropped without release; leaking {live} GPU objects");
        }
    }
}

/// Draws `element_count` `u32` indices from `vertex_array` as triangles.
pub fn draw<D: GpuDriver + ?Sized>(
    driver: &mut D,
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    element_count: u32,
) {
    driver.use_program(Some(program));
    driver.bind_vertex_array(Some(vertex_array));
    driver.draw_elements(PrimitiveMode::Triangles, element_count, IndexType::U32);
}
