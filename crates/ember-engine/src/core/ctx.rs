use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

use crate::camera::Camera;
use crate::color::GlColor;
use crate::device::{Device, GlDevice};
use crate::error::{Error, Result};
use crate::input::InputState;

/// Window handle and window commands.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let logi: LogicalSize<f64> = phys.to_logical(self.window.scale_factor());
        (logi.width as f32, logi.height as f32)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Requests a new logical inner size. The resize arrives as a regular event.
    pub fn set_size(&self, width: f64, height: f64) {
        let _ = self.window.request_inner_size(LogicalSize::new(width, height));
    }
}

/// Offscreen color buffer copied onto the window after `on_frame`.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Present {
    pub framebuffer: glow::Framebuffer,
    pub size: (u32, u32),
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// The default framebuffer is bound and cleared when the callback starts.
pub struct FrameCtx<'a> {
    pub window: WindowCtx<'a>,
    pub device: &'a mut GlDevice,
    pub input: &'a mut InputState,
    /// Framebuffer size in physical pixels.
    pub size: PhysicalSize<u32>,
    pub clear_color: GlColor,

    pub(crate) present: Option<Present>,
    pub(crate) exit: bool,
}

impl<'a> FrameCtx<'a> {
    pub(crate) fn new(
        window: &'a Window,
        device: &'a mut GlDevice,
        input: &'a mut InputState,
        clear_color: GlColor,
    ) -> Self {
        Self {
            window: WindowCtx { window },
            size: window.inner_size(),
            device,
            input,
            clear_color,
            present: None,
            exit: false,
        }
    }

    /// Redirects drawing into `camera`'s render target and schedules it to be
    /// copied onto the window once the frame callback returns.
    ///
    /// The target is bound, its viewport set and it is cleared with
    /// `clear_color`.
    pub fn render_to(&mut self, camera: &Camera<GlDevice>) -> Result<()> {
        let target = camera
            .target()
            .ok_or(Error::ResourceReleased("camera render target"))?;

        self.device.bind_framebuffer(Some(target.framebuffer));
        self.device.set_viewport(target.width, target.height);
        self.device.clear(self.clear_color);

        self.present = Some(Present {
            framebuffer: target.framebuffer,
            size: (target.width, target.height),
        });
        Ok(())
    }

    /// Stops the event loop after this frame.
    pub fn exit(&mut self) {
        self.exit = true;
    }
}
