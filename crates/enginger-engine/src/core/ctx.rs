use winit::window::{Window, WindowId};

use crate::device::{GpuDriver, SurfaceErrorAction, WgpuDriver};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App` callbacks.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `WgpuDriver<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut WgpuDriver<'w>,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Clears to `clear`, runs `draw` against the driver, then presents.
    ///
    /// Surface loss and timeouts skip the frame; an unrecoverable surface
    /// error asks the runtime to exit.
    pub fn render<F>(&mut self, clear: [f32; 4], draw: F) -> AppControl
    where
        F: FnOnce(&mut WgpuDriver<'_>),
    {
        self.gpu.clear(clear);
        draw(&mut *self.gpu);

        match self.gpu.present() {
            Ok(()) => AppControl::Continue,
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("{}", SurfaceErrorAction::Fatal);
                AppControl::Exit
            }
            Err(action) => {
                log::debug!("{action}");
                AppControl::Continue
            }
        }
    }
}
