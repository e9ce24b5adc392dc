use glam::{Mat4, Vec3};

/// Position, euler rotation (radians, applied X then Y then Z) and scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Model matrix: `scale * rot_x * rot_y * rot_z * translation`.
    ///
    /// Translation is applied first to a vertex, so `position` is expressed in
    /// the scaled and rotated frame.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale(self.scale)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_translation(self.position)
    }

    /// Inverse of [`model_matrix`](Self::model_matrix).
    pub fn view_matrix(&self) -> Mat4 {
        self.model_matrix().inverse()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_yields_identity_matrix() {
        assert_eq!(Transform::IDENTITY.model_matrix(), Mat4::IDENTITY);
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }

    #[test]
    fn translation_only_moves_origin() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.model_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn translation_is_scaled() {
        let t = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            scale: Vec3::splat(2.0),
            ..Transform::IDENTITY
        };
        let p = t.model_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn view_inverts_model() {
        let t = Transform {
            position: Vec3::new(3.0, -1.0, 2.0),
            rotation: Vec3::new(0.3, 1.1, -0.4),
            scale: Vec3::new(1.0, 2.0, 0.5),
        };
        let product = t.model_matrix() * t.view_matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
