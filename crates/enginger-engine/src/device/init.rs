/// Parameters for bringing up the GPU driver.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when the surface offers one.
    pub prefer_srgb: bool,

    /// Wait for vertical blank between presents (swap interval 1).
    pub vsync: bool,

    /// Alpha mode to request. Unsupported requests fall back to the first
    /// mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// Features the device must have. Line and point polygon modes are
    /// requested on top of these whenever the adapter offers them.
    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Latency hint for the surface; backends may ignore it.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
