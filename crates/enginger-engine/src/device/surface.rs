use winit::dpi::PhysicalSize;

use super::{GpuInit, SurfaceErrorAction};

/// The window surface together with its current configuration.
pub(super) struct SurfaceState<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> SurfaceState<'w> {
    /// Picks a format and alpha mode from the adapter's capabilities and
    /// configures the surface for `size`.
    pub fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Option<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)?;
        let alpha_mode = init
            .alpha_mode
            .filter(|m| caps.alpha_modes.contains(m))
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let present_mode = init.present_mode();
        let automatic = matches!(
            present_mode,
            wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync
        );
        let present_mode = if automatic || caps.present_modes.contains(&present_mode) {
            present_mode
        } else {
            log::warn!("present mode {present_mode:?} unsupported; falling back to Fifo");
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!("surface configured: {format:?} {}x{} {present_mode:?}", config.width, config.height);

        Some(Self { surface, config, size })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Tracks the new size; a minimized (zero-sized) window keeps the old
    /// configuration until it is restored.
    pub fn resize(&mut self, device: &wgpu::Device, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(device, &self.config);
    }

    /// Acquires the next texture, reconfiguring on a lost or outdated surface.
    pub fn acquire(&self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture, SurfaceErrorAction> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(device, &self.config);
                }
                Err(SurfaceErrorAction::Reconfigured)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceErrorAction::Fatal),
            Err(wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other) => {
                Err(SurfaceErrorAction::SkipFrame)
            }
        }
    }
}

/// First sRGB format when preferred, else whatever the surface lists first.
fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| f.is_srgb());
    match srgb {
        Some(f) if prefer_srgb => Some(f),
        _ => formats.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn srgb_preferred_when_listed() {
        let formats = [F::Bgra8Unorm, F::Bgra8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(F::Bgra8UnormSrgb));
    }

    #[test]
    fn first_format_without_preference() {
        let formats = [F::Bgra8Unorm, F::Bgra8UnormSrgb];
        assert_eq!(pick_format(&formats, false), Some(F::Bgra8Unorm));
    }

    #[test]
    fn no_formats_means_no_surface() {
        assert_eq!(pick_format(&[], true), None);
    }
}
