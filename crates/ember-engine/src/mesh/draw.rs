use crate::camera::Camera;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::shader::ShaderProgram;
use crate::texture::Texture;
use crate::transform::Transform;

use super::store::Mesh;

pub const PROJECTION_UNIFORM: &str = "m_projection";
pub const VIEW_UNIFORM: &str = "m_campos";
pub const MODEL_UNIFORM: &str = "m_model";
pub const TEXTURE_UNIFORM: &str = "t_texture";

impl<D: Device> Mesh<D> {
    /// Draws the last synced index list with `program`.
    ///
    /// Uniforms are set in the order projection, camera, model, texture sampler;
    /// the first one the program lacks aborts the draw. Program, texture and
    /// vertex array are left bound. A hidden mesh draws nothing.
    pub fn draw(
        &self,
        device: &mut D,
        program: &mut ShaderProgram<D>,
        camera: &Camera<D>,
        transform: &Transform,
        texture: Option<&Texture<D>>,
    ) -> Result<()> {
        let Some(buffers) = self.buffers.as_ref() else {
            return Err(Error::ResourceReleased("mesh"));
        };
        if !self.flags.visible {
            return Ok(());
        }

        program.bind(device)?;
        program.set_mat4(device, PROJECTION_UNIFORM, camera.projection_matrix())?;
        program.set_mat4(device, VIEW_UNIFORM, camera.view_matrix())?;
        program.set_mat4(device, MODEL_UNIFORM, transform.model_matrix())?;

        if let Some(texture) = texture {
            program.set_int(device, TEXTURE_UNIFORM, 0)?;
            texture.bind(device, 0)?;
        }

        device.draw_indexed(buffers.vertex_array, self.synced_indices);
        Ok(())
    }
}
