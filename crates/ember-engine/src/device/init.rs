/// Initialization parameters for the GL context.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or driver requirement exists.
#[derive(Debug, Clone)]
pub struct GlInit {
    /// Wait for vertical sync when swapping buffers.
    pub vsync: bool,

    /// Request a debug context and route GL debug output to the logger.
    pub debug: bool,

    /// Enable depth testing once the context is created.
    pub depth_test: bool,
}

impl Default for GlInit {
    fn default() -> Self {
        Self {
            vsync: true,
            debug: cfg!(debug_assertions),
            depth_test: true,
        }
    }
}
