use std::ffi::CStr;
use std::num::NonZeroU32;

use anyhow::{Context, Result};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::GlInit;

/// GL context + window surface pair.
///
/// The surface refers to the window through its raw handle; the owner must keep
/// the window alive for as long as this value exists.
pub struct GlContext {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlContext {
    /// Creates an OpenGL 3.3 core context for `window`, makes it current and
    /// returns it together with a loaded `glow` function table.
    pub fn new(window: &Window, init: &GlInit) -> Result<(Self, glow::Context)> {
        let display_handle = window
            .display_handle()
            .context("window has no display handle")?
            .as_raw();
        let window_handle = window
            .window_handle()
            .context("window has no window handle")?
            .as_raw();

        #[cfg(target_os = "windows")]
        let preference = DisplayApiPreference::Wgl(Some(window_handle));
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;
        #[cfg(all(unix, not(target_os = "macos")))]
        let preference = DisplayApiPreference::Egl;

        // SAFETY: the display handle comes from a live winit window.
        let display = unsafe { Display::new(display_handle, preference) }
            .context("failed to open GL display")?;

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_stencil_size(8)
            .build();

        // SAFETY: display is valid for the duration of the call.
        let config = unsafe { display.find_configs(template) }
            .context("failed to query GL configs")?
            .next()
            .context("no suitable GL config")?;

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        // SAFETY: the window handle stays valid while the window lives.
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("failed to create GL window surface")?;

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .with_debug(init.debug)
            .build(Some(window_handle));
        // SAFETY: config was produced by this display.
        let context = unsafe { display.create_context(&config, &context_attributes) }
            .context("failed to create GL context")?
            .make_current(&surface)
            .context("failed to make GL context current")?;

        let interval = if init.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("failed to set swap interval (vsync={}): {e}", init.vsync);
        }

        // SAFETY: the context was just made current on this thread.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s: &CStr| display.get_proc_address(s))
        };

        Ok((Self { surface, context }, gl))
    }

    /// Makes the context current on the calling thread.
    pub fn make_current(&self) -> Result<()> {
        self.context
            .make_current(&self.surface)
            .context("failed to make GL context current")
    }

    /// Resizes the window surface. Zero sizes are ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface
            .resize(&self.context, non_zero(size.width), non_zero(size.height));
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap GL buffers")
    }
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}
