//! Perspective / orthographic cameras with an optional offscreen target.

use glam::{Mat4, Vec3};

use crate::device::{Device, Sampling, TextureDesc, TextureFormat};
use crate::error::{Error, Result};
use crate::transform::Transform;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    /// Vertical field of view in degrees.
    Perspective {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Right-handed, GL clip space (`z` in `[-1, 1]`).
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_gl(fov.to_radians(), aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh_gl(left, right, bottom, top, near, far),
        }
    }
}

/// Framebuffer with a color and a depth-stencil attachment.
pub struct RenderTarget<D: Device> {
    pub framebuffer: D::Framebuffer,
    pub color: D::Texture,
    pub depth_stencil: D::Texture,
    pub width: u32,
    pub height: u32,
}

impl<D: Device> RenderTarget<D> {
    fn create(device: &mut D, width: u32, height: u32) -> Result<Self> {
        let desc = |format| TextureDesc {
            width,
            height,
            format,
            sampling: Sampling::Target,
        };

        let color = device
            .create_texture(&desc(TextureFormat::Rgba8), None)
            .map_err(Error::DeviceResource)?;
        let depth_stencil = match device.create_texture(&desc(TextureFormat::Depth24Stencil8), None) {
            Ok(t) => t,
            Err(e) => {
                device.delete_texture(color);
                return Err(Error::DeviceResource(e));
            }
        };
        let framebuffer = match device.create_framebuffer(color, depth_stencil) {
            Ok(fb) => fb,
            Err(e) => {
                device.delete_texture(color);
                device.delete_texture(depth_stencil);
                return Err(Error::DeviceResource(e));
            }
        };

        log::debug!("render target {framebuffer:?} created ({width}x{height})");
        Ok(Self {
            framebuffer,
            color,
            depth_stencil,
            width,
            height,
        })
    }

    fn release(self, device: &mut D) {
        device.delete_framebuffer(self.framebuffer);
        device.delete_texture(self.color);
        device.delete_texture(self.depth_stencil);
    }
}

pub struct Camera<D: Device> {
    pub transform: Transform,
    projection: Projection,
    matrix: Mat4,
    target: Option<RenderTarget<D>>,
}

impl<D: Device> Camera<D> {
    pub fn new(projection: Projection) -> Self {
        Self {
            transform: Transform::IDENTITY,
            projection,
            matrix: projection.matrix(),
            target: None,
        }
    }

    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Rebuilds a perspective projection for a new aspect ratio.
    /// Orthographic cameras are left untouched.
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: a, .. } = &mut self.projection {
            *a = aspect;
            self.matrix = self.projection.matrix();
        }
    }

    /// Matrix uploaded as the camera-position uniform: the model matrix of the
    /// camera transform with its position negated.
    pub fn view_matrix(&self) -> Mat4 {
        Transform {
            position: -self.transform.position,
            ..self.transform
        }
        .model_matrix()
    }

    pub fn right(&self) -> Vec3 {
        self.transform.view_matrix().x_axis.truncate().normalize_or_zero()
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.view_matrix().z_axis.truncate().normalize_or_zero()
    }

    pub fn target(&self) -> Option<&RenderTarget<D>> {
        self.target.as_ref()
    }

    /// Creates an offscreen target of `width x height`, replacing any previous one.
    pub fn attach_target(&mut self, device: &mut D, width: u32, height: u32) -> Result<()> {
        let target = RenderTarget::create(device, width, height)?;
        if let Some(old) = self.target.replace(target) {
            old.release(device);
        }
        Ok(())
    }

    /// Recreates the target at a new size. No-op without a target or when the
    /// size is unchanged.
    pub fn resize_target(&mut self, device: &mut D, width: u32, height: u32) -> Result<()> {
        match &self.target {
            Some(t) if (t.width, t.height) != (width, height) => {
                self.attach_target(device, width, height)
            }
            _ => Ok(()),
        }
    }

    /// Releases the render target, if any. Safe to call more than once.
    pub fn destroy(&mut self, device: &mut D) {
        if let Some(target) = self.target.take() {
            log::debug!("render target {:?} destroyed", target.framebuffer);
            target.release(device);
        }
    }
}

impl<D: Device> Drop for Camera<D> {
    fn drop(&mut self) {
        if let Some(target) = &self.target {
            log::warn!(
                "camera dropped without destroy; render target {:?} leaked",
                target.framebuffer
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    type Cam = Camera<MockDevice>;

    #[test]
    fn perspective_matches_glam() {
        let cam = Cam::perspective(60.0, 16.0 / 9.0, 0.1, 100.0);
        let expected = Mat4::perspective_rh_gl(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        assert_eq!(cam.projection_matrix(), expected);
    }

    #[test]
    fn set_aspect_rebuilds_perspective_only() {
        let mut cam = Cam::perspective(45.0, 1.0, 0.1, 10.0);
        cam.set_aspect(2.0);
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh_gl(45f32.to_radians(), 2.0, 0.1, 10.0)
        );

        let mut ortho = Cam::orthographic(-1.0, 1.0, -1.0, 1.0, 0.0, 1.0);
        let before = ortho.projection_matrix();
        ortho.set_aspect(3.0);
        assert_eq!(ortho.projection_matrix(), before);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let mut cam = Cam::perspective(45.0, 1.0, 0.1, 10.0);
        cam.transform.position = Vec3::new(0.0, 0.0, 5.0);
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn identity_camera_axes() {
        let cam = Cam::perspective(45.0, 1.0, 0.1, 10.0);
        assert_eq!(cam.right(), Vec3::X);
        assert_eq!(cam.forward(), Vec3::Z);
    }

    #[test]
    fn axes_stay_normalized_under_scale() {
        let mut cam = Cam::perspective(45.0, 1.0, 0.1, 10.0);
        cam.transform.scale = Vec3::splat(3.0);
        cam.transform.rotation = Vec3::new(0.0, 0.7, 0.0);
        assert!((cam.right().length() - 1.0).abs() < 1e-5);
        assert!((cam.forward().length() - 1.0).abs() < 1e-5);
        assert!(cam.right().dot(cam.forward()).abs() < 1e-5);
    }

    #[test]
    fn target_lifecycle() {
        let mut dev = MockDevice::new();
        let mut cam = Cam::perspective(45.0, 1.0, 0.1, 10.0);

        cam.attach_target(&mut dev, 320, 240).unwrap();
        assert_eq!(dev.textures.len(), 2);
        assert_eq!(dev.framebuffers.len(), 1);

        let first = cam.target().unwrap().framebuffer;
        cam.resize_target(&mut dev, 320, 240).unwrap();
        assert_eq!(cam.target().unwrap().framebuffer, first);

        cam.resize_target(&mut dev, 640, 480).unwrap();
        let t = cam.target().unwrap();
        assert_ne!(t.framebuffer, first);
        assert_eq!((t.width, t.height), (640, 480));
        assert_eq!(dev.live_objects(), 3);

        cam.destroy(&mut dev);
        cam.destroy(&mut dev);
        assert!(cam.target().is_none());
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn failed_target_allocation_keeps_nothing() {
        let mut dev = MockDevice::new();
        dev.fail_alloc = true;
        let mut cam = Cam::orthographic(0.0, 1.0, 0.0, 1.0, -1.0, 1.0);

        assert!(matches!(
            cam.attach_target(&mut dev, 8, 8),
            Err(Error::DeviceResource(_))
        ));
        assert!(cam.target().is_none());
        assert_eq!(dev.live_objects(), 0);
    }
}
