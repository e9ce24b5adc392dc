use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::color::GlColor;
use crate::core::{App, AppControl, FrameCtx, Present};
use crate::device::{Device, GlContext, GlDevice, GlInit};
use crate::input::platform::{committed_text, translate_window_event};
use crate::input::InputState;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: LogicalSize<f64>,
    /// Color the window is cleared to before every frame.
    pub clear_color: GlColor,
    pub gl: GlInit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            size: LogicalSize::new(1280.0, 720.0),
            clear_color: GlColor::new(0.1, 0.1, 0.1, 1.0),
            gl: GlInit::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    pub fn run<A>(config: WindowConfig, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

// Field order is drop order: the context must go before the window it renders to.
struct WindowEntry {
    input: InputState,
    device: GlDevice,
    context: GlContext,
    window: Window,
}

impl WindowEntry {
    fn create(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.size)
            .with_resizable(true)
            .with_visible(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let (context, gl) = GlContext::new(&window, &config.gl)?;
        let mut device = GlDevice::new(gl, &config.gl);

        let size = window.inner_size();
        device.set_viewport(size.width, size.height);

        Ok(Self {
            input: InputState::default(),
            device,
            context,
            window,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        self.context.resize(size);
        self.device.set_viewport(size.width, size.height);
        true
    }
}

struct AppState<A>
where
    A: App + 'static,
{
    config: WindowConfig,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: WindowConfig, app: A) -> Self {
        Self {
            config,
            app,
            entry: None,
            exit_requested: false,
        }
    }

    /// Lets the app release its GPU resources, then tears down the window.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;

        if let Some(mut entry) = self.entry.take() {
            if let Err(e) = entry.context.make_current() {
                log::error!("cannot release GPU resources: {e:#}");
            } else {
                self.app.on_exit(&mut entry.device);
                entry.device.log_errors();
            }
            log::debug!("window {:?} closed", entry.window.id());
        }

        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut entry = WindowEntry::create(event_loop, &self.config)?;

        let size = entry.window.inner_size();
        self.app
            .on_start(&mut entry.device, size)
            .context("application failed to start")?;

        entry.window.set_visible(true);
        entry.window.request_redraw();
        self.entry = Some(entry);
        Ok(())
    }

    /// Clear, app frame, optional target blit, swap, input aging.
    fn frame(&mut self) -> Result<AppControl> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let size = entry.window.inner_size();
        entry.device.bind_framebuffer(None);
        entry.device.set_viewport(size.width, size.height);
        entry.device.clear(self.config.clear_color);

        let (control, present, exit) = {
            let mut ctx = FrameCtx::new(
                &entry.window,
                &mut entry.device,
                &mut entry.input,
                self.config.clear_color,
            );
            let control = self.app.on_frame(&mut ctx);
            (control, ctx.present, ctx.exit)
        };

        if let Some(Present { framebuffer, size: source }) = present {
            entry.device.bind_framebuffer(None);
            entry.device.set_viewport(size.width, size.height);
            entry
                .device
                .blit_framebuffer(framebuffer, source, (size.width, size.height));
        }

        entry.device.log_errors();
        entry.window.pre_present_notify();
        entry.context.swap_buffers()?;
        entry.input.age_frame();

        if exit {
            return Ok(AppControl::Exit);
        }
        Ok(control)
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.window.id() != window_id {
            return;
        }

        if let Some(ev) = translate_window_event(&entry.window, &event) {
            entry.input.apply_event(ev);
        }
        if let Some(ev) = committed_text(&event) {
            entry.input.apply_event(ev);
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                if entry.resize(size) {
                    self.app.on_resize(&mut entry.device, size);
                    entry.window.request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.window.inner_size();
                if entry.resize(size) {
                    self.app.on_resize(&mut entry.device, size);
                    entry.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => match self.frame() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => self.shutdown(event_loop),
                Err(e) => {
                    log::error!("frame failed: {e:#}");
                    self.shutdown(event_loop);
                }
            },

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            self.shutdown(event_loop);
        }
    }
}
