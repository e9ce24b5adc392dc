//! 2D RGBA textures.

use std::path::Path;

use crate::device::{Device, Sampling, TextureDesc, TextureFormat};
use crate::error::{Error, Result};

/// An RGBA8 texture sampled with pixelated filtering.
pub struct Texture<D: Device> {
    handle: Option<D::Texture>,
    width: u32,
    height: u32,
}

impl<D: Device> Texture<D> {
    /// Uploads tightly packed RGBA8 `pixels` of `width * height` texels.
    pub fn from_rgba(device: &mut D, width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::DeviceResource(format!(
                "texture {width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        let desc = TextureDesc {
            width,
            height,
            format: TextureFormat::Rgba8,
            sampling: Sampling::Pixelated,
        };
        let handle = device
            .create_texture(&desc, Some(pixels))
            .map_err(Error::DeviceResource)?;

        log::trace!("texture {handle:?} created ({width}x{height})");
        Ok(Self {
            handle: Some(handle),
            width,
            height,
        })
    }

    /// Decodes the image at `path` to RGBA8 and uploads it.
    pub fn load(device: &mut D, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| Error::Image {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();

        let (width, height) = image.dimensions();
        log::debug!("loaded {} ({width}x{height})", path.display());
        Self::from_rgba(device, width, height, image.as_raw())
    }

    pub fn handle(&self) -> Option<D::Texture> {
        self.handle
    }

    /// `(width, height)` in texels; `(0, 0)` once destroyed.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bind(&self, device: &mut D, unit: u32) -> Result<()> {
        let handle = self.handle.ok_or(Error::ResourceReleased("texture"))?;
        device.bind_texture(unit, Some(handle));
        Ok(())
    }

    /// Releases the device texture. Safe to call more than once.
    pub fn destroy(&mut self, device: &mut D) {
        if let Some(handle) = self.handle.take() {
            device.delete_texture(handle);
            log::trace!("texture {handle:?} destroyed");
        }
        self.width = 0;
        self.height = 0;
    }
}

impl<D: Device> Drop for Texture<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            log::warn!("texture {handle:?} dropped without destroy; GL object leaked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    #[test]
    fn uploads_and_reports_dimensions() {
        let mut dev = MockDevice::new();
        let mut tex = Texture::from_rgba(&mut dev, 2, 3, &[0u8; 24]).unwrap();
        assert_eq!(tex.dimensions(), (2, 3));
        assert_eq!(dev.textures.len(), 1);

        tex.destroy(&mut dev);
        assert_eq!(tex.dimensions(), (0, 0));
        assert!(tex.handle().is_none());
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn rejects_wrong_pixel_count() {
        let mut dev = MockDevice::new();
        let err = Texture::from_rgba(&mut dev, 4, 4, &[0u8; 10]).err().unwrap();
        assert!(matches!(err, Error::DeviceResource(_)));
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn bind_uses_requested_unit() {
        let mut dev = MockDevice::new();
        let mut tex = Texture::from_rgba(&mut dev, 1, 1, &[255; 4]).unwrap();
        tex.bind(&mut dev, 3).unwrap();
        assert_eq!(dev.bound_textures.get(&3), Some(&tex.handle()));

        tex.destroy(&mut dev);
        tex.destroy(&mut dev);
        assert!(matches!(tex.bind(&mut dev, 0), Err(Error::ResourceReleased("texture"))));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let mut dev = MockDevice::new();
        let err = Texture::load(&mut dev, "does/not/exist.png").err().unwrap();
        assert!(matches!(err, Error::Image { .. }));
    }

    #[test]
    fn loads_png_from_disk() {
        let path = std::env::temp_dir().join(format!("ember-tex-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(5, 4, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut dev = MockDevice::new();
        let mut tex = Texture::load(&mut dev, &path).unwrap();
        assert_eq!(tex.dimensions(), (5, 4));

        tex.destroy(&mut dev);
        std::fs::remove_file(&path).unwrap();
    }
}
