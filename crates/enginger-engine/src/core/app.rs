use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::WgpuDriver;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime calls `on_init` once after the GPU is up, `on_frame` for every
/// redraw, and `on_shutdown` exactly once before the GPU is dropped (also when
/// `on_init` failed).
pub trait App {
    /// Creates GPU resources. An error stops the runtime and is returned from
    /// [`Runtime::run`](crate::window::Runtime::run).
    fn on_init(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases GPU resources.
    fn on_shutdown(&mut self, gpu: &mut WgpuDriver<'_>);
}
