use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::api::PolygonMode;
use super::objects::{vertex_slots, BindState, Objects};
use super::surface::SurfaceState;
use super::{GpuInit, SurfaceErrorAction};

/// A draw recorded between `clear` and `present`.
pub(super) struct DrawCall {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffers: Vec<wgpu::Buffer>,
    pub index_buffer: wgpu::Buffer,
    pub index_format: wgpu::IndexFormat,
    pub count: u32,
}

/// wgpu implementation of the GPU driver boundary.
///
/// Owns the wgpu core objects, the surface configuration and the table of
/// handle-addressed objects. Draw calls are recorded and replayed into a single
/// render pass by [`present`](Self::present).
pub struct WgpuDriver<'w> {
    /// Kept alive for the surface's sake.
    _instance: wgpu::Instance,

    /// Surface bound to the window; the window must outlive the driver.
    surface: SurfaceState<'w>,

    pub(super) device: wgpu::Device,
    pub(super) queue: wgpu::Queue,

    /// Polygon modes other than fill need optional device features.
    pub(super) polygon_features: wgpu::Features,

    pub(super) objects: Objects,
    pub(super) state: BindState,
    pub(super) clear_color: wgpu::Color,
    pub(super) draws: Vec<DrawCall>,
}

impl<'w> WgpuDriver<'w> {
    /// Creates a driver bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let polygon_features = adapter.features()
            & (wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("enginger device"),
                required_features: init.required_features | polygon_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface = SurfaceState::configure(surface, &adapter, &device, size, &init)
            .context("no supported surface formats")?;

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            polygon_features,
            objects: Objects::new(),
            state: BindState::default(),
            clear_color: wgpu::Color::BLACK,
            draws: Vec::new(),
        })
    }

    /// Reconfigures the surface after a resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(&self.device, new_size);
    }

    /// Replays the recorded draws into the next surface texture and presents it.
    ///
    /// Recorded draws are consumed whether or not a texture could be acquired.
    pub fn present(&mut self) -> Result<(), SurfaceErrorAction> {
        let draws = std::mem::take(&mut self.draws);

        let surface_texture = self.surface.acquire(&self.device)?;

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("enginger frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("enginger frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &draws {
                rpass.set_pipeline(&draw.pipeline);
                for (slot, vb) in draw.vertex_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32, vb.slice(..));
                }
                rpass.set_index_buffer(draw.index_buffer.slice(..), draw.index_format);
                rpass.draw_indexed(0..draw.count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Returns the render pipeline for `program` drawing `vertex_array` in the
    /// current polygon mode, building it on first use.
    ///
    /// wgpu checks the stage interfaces against the vertex layout only here, so
    /// a mismatch surfaces as a pipeline error on the program's info log.
    pub(super) fn pipeline_for(&mut self, program: u32, vertex_array: u32) -> Option<wgpu::RenderPipeline> {
        let mode = self.state.polygon_mode;
        let key = (vertex_array, mode);

        if let Some(cached) = self.objects.programs.get(&program)?.pipelines.get(&key) {
            return cached.clone();
        }

        let built = self.build_pipeline(program, vertex_array, mode);
        let p = self.objects.programs.get_mut(&program)?;
        match built {
            Ok(pipeline) => {
                p.pipelines.insert(key, Some(pipeline.clone()));
                Some(pipeline)
            }
            Err(err) => {
                log::error!("::Error: pipeline for program {program} failed\n{err}");
                p.log = err;
                p.pipelines.insert(key, None);
                None
            }
        }
    }

    fn build_pipeline(
        &self,
        program: u32,
        vertex_array: u32,
        mode: PolygonMode,
    ) -> std::result::Result<wgpu::RenderPipeline, String> {
        let stages = self
            .objects
            .programs
            .get(&program)
            .and_then(|p| p.linked.as_ref())
            .ok_or_else(|| format!("program {program} is not linked"))?;
        let vao = self
            .objects
            .vertex_arrays
            .get(&vertex_array)
            .ok_or_else(|| format!("vertex array {vertex_array} does not exist"))?;

        let slots = vertex_slots(vao)?;
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = slots
            .iter()
            .map(|s| wgpu::VertexBufferLayout {
                array_stride: s.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &s.attributes,
            })
            .collect();

        let polygon_mode = match mode {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
            PolygonMode::Point => wgpu::PolygonMode::Point,
        };

        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("enginger pipeline layout"),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("enginger program pipeline"),
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module: &stages.vertex,
                entry_point: None,
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &stages.fragment,
                entry_point: None,
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        match pollster::block_on(scope.pop()) {
            Some(err) => Err(err.to_string()),
            None => Ok(pipeline),
        }
    }

    /// Whether the device can rasterize in `mode`.
    pub fn supports_polygon_mode(&self, mode: PolygonMode) -> bool {
        match mode {
            PolygonMode::Fill => true,
            PolygonMode::Line => self.polygon_features.contains(wgpu::Features::POLYGON_MODE_LINE),
            PolygonMode::Point => self.polygon_features.contains(wgpu::Features::POLYGON_MODE_POINT),
        }
    }
}
