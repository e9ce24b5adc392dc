use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

use crate::device::GlDevice;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`crate::window::Runtime`].
///
/// GPU resources must be created in [`on_start`](Self::on_start) or later and
/// released in [`on_exit`](Self::on_exit); the device is only reachable from
/// inside these callbacks.
pub trait App {
    /// Called once, after the context is current and before the window is shown.
    fn on_start(&mut self, device: &mut GlDevice, size: PhysicalSize<u32>) -> anyhow::Result<()> {
        let _ = (device, size);
        Ok(())
    }

    /// Called for every window event, after input state has been updated.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the surface and viewport were resized. Zero sizes are not reported.
    fn on_resize(&mut self, device: &mut GlDevice, size: PhysicalSize<u32>) {
        let _ = (device, size);
    }

    /// Called once per frame, between clear and swap.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called once before the context goes away. Release GPU resources here.
    fn on_exit(&mut self, device: &mut GlDevice) {
        let _ = device;
    }
}
