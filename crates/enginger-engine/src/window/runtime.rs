use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::config::ConfigData;
use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{GpuDriver, GpuInit, PolygonMode, WgpuDriver};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Borderless fullscreen on the current monitor.
    pub fullscreen: bool,
    /// No window decorations.
    pub borderless: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "enGinger".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            fullscreen: false,
            borderless: false,
        }
    }
}

impl From<&ConfigData> for RuntimeConfig {
    fn from(config: &ConfigData) -> Self {
        Self {
            initial_size: LogicalSize::new(f64::from(config.width), f64::from(config.height)),
            fullscreen: config.fullscreen,
            borderless: config.borderless,
            ..Self::default()
        }
    }
}

/// Runtime context passed to the application.
///
/// Requests are applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit = true;
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until it exits or the window closes.
    ///
    /// Returns the error that stopped the loop, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Built-in key bindings.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum KeyAction {
    Close,
    Polygon(PolygonMode),
}

fn key_action(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Escape => Some(KeyAction::Close),
        KeyCode::Digit1 => Some(KeyAction::Polygon(PolygonMode::Line)),
        KeyCode::Digit2 => Some(KeyAction::Polygon(PolygonMode::Fill)),
        KeyCode::Digit3 => Some(KeyAction::Polygon(PolygonMode::Point)),
        _ => None,
    }
}

/// Top-left position that centers `outer` inside a monitor.
fn centered(
    monitor_pos: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    outer: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let dx = (i64::from(monitor_size.width) - i64::from(outer.width)) / 2;
    let dy = (i64::from(monitor_size.height) - i64::from(outer.height)) / 2;
    PhysicalPosition::new(
        monitor_pos.x.saturating_add(dx as i32),
        monitor_pos.y.saturating_add(dy as i32),
    )
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: WgpuDriver<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    /// `on_shutdown` has run; the app must not be called again.
    shut_down: bool,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            shut_down: false,
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.request_exit(event_loop);
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let config = &self.config;
        let mut attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size)
            .with_decorations(!config.borderless);
        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        if !config.fullscreen {
            if let Some(monitor) = event_loop.primary_monitor() {
                window.set_outer_position(centered(
                    monitor.position(),
                    monitor.size(),
                    window.outer_size(),
                ));
            }
        }

        let gpu_init = self.gpu_init.clone();
        WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(WgpuDriver::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }

    /// Runs `on_shutdown` once and drops the window with its GPU state.
    fn shutdown(&mut self) {
        let Some(mut entry) = self.window.take() else { return };
        if !self.shut_down {
            self.shut_down = true;
            let app = &mut self.app;
            entry.with_gpu_mut(|gpu| app.on_shutdown(gpu));
            log::info!("shut down");
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match key_action(code) {
            Some(KeyAction::Close) => self.request_exit(event_loop),
            Some(KeyAction::Polygon(mode)) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.set_polygon_mode(mode));
                    log::debug!("polygon mode {mode:?}");
                }
            }
            None => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &mut self.window);
        if let Some(entry) = window.as_mut() {
            entry.with_mut(|fields| {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: window_id,
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                    runtime: &mut runtime_ctx,
                };
                control = app.on_frame(&mut ctx);
            });
        }

        if control == AppControl::Exit || runtime_ctx.exit {
            self.request_exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        let mut entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(e) => return self.fail(event_loop, e),
        };
        log::info!("window created");

        let mut runtime_ctx = RuntimeCtx::default();
        let app = &mut self.app;
        let init = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                runtime: &mut runtime_ctx,
            };
            app.on_init(&mut ctx)
        });
        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);

        if let Err(e) = init {
            self.fail(event_loop, e.context("application initialization failed"));
        } else if runtime_ctx.exit {
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested || self.window.is_none() {
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::KeyboardInput { event: key, .. } => {
                if let (ElementState::Pressed, PhysicalKey::Code(code)) = (key.state, key.physical_key) {
                    self.handle_key(event_loop, code);
                }
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_select_polygon_modes() {
        assert_eq!(key_action(KeyCode::Digit1), Some(KeyAction::Polygon(PolygonMode::Line)));
        assert_eq!(key_action(KeyCode::Digit2), Some(KeyAction::Polygon(PolygonMode::Fill)));
        assert_eq!(key_action(KeyCode::Digit3), Some(KeyAction::Polygon(PolygonMode::Point)));
    }

    #[test]
    fn escape_closes_and_other_keys_are_ignored() {
        assert_eq!(key_action(KeyCode::Escape), Some(KeyAction::Close));
        assert_eq!(key_action(KeyCode::KeyA), None);
    }

    #[test]
    fn window_is_centered_on_monitor() {
        let pos = centered(
            PhysicalPosition::new(1920, 0),
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(800, 600),
        );
        assert_eq!(pos, PhysicalPosition::new(1920 + 560, 240));
    }

    #[test]
    fn oversized_window_starts_left_of_monitor() {
        let pos = centered(
            PhysicalPosition::new(0, 0),
            PhysicalSize::new(800, 600),
            PhysicalSize::new(1000, 600),
        );
        assert_eq!(pos, PhysicalPosition::new(-100, 0));
    }

    #[test]
    fn runtime_config_from_file_config() {
        let data = ConfigData {
            vertex_shader: "v.wgsl".into(),
            fragment_shader: "f.wgsl".into(),
            fullscreen: true,
            borderless: true,
            width: 800,
            height: 600,
        };
        let c = RuntimeConfig::from(&data);
        assert_eq!(c.title, "enGinger");
        assert_eq!(c.initial_size, LogicalSize::new(800.0, 600.0));
        assert!(c.fullscreen && c.borderless);
    }
}
