use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::color::GlColor;
use crate::device::{VertexAttribute, VertexLayout};

/// Interleaved mesh vertex: position, texture coordinate, color.
///
/// `Pod` rules out padding, so the byte content of two equal vertices is
/// always identical and can be used as a deduplication key.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: GlColor,
}

const _: () = assert!(size_of::<Vertex>() == 9 * size_of::<f32>());

impl Vertex {
    pub const SIZE: usize = size_of::<Vertex>();

    const ATTRS: [VertexAttribute; 3] = [
        VertexAttribute {
            location: 0,
            components: 3,
            offset: offset_of!(Vertex, position) as i32,
        },
        VertexAttribute {
            location: 1,
            components: 2,
            offset: offset_of!(Vertex, uv) as i32,
        },
        VertexAttribute {
            location: 2,
            components: 4,
            offset: offset_of!(Vertex, color) as i32,
        },
    ];

    /// GL attribute layout: 0 = position, 1 = uv, 2 = color.
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: Self::SIZE as i32,
        attributes: &Self::ATTRS,
    };

    #[inline]
    pub fn new(position: Vec3, uv: Vec2, color: impl Into<GlColor>) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
            color: color.into(),
        }
    }

    /// Exact byte content of this vertex.
    #[inline]
    pub fn key(&self) -> VertexKey {
        let mut bytes = [0u8; Vertex::SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        VertexKey(bytes)
    }
}

/// Byte-exact identity of a [`Vertex`].
///
/// Two vertices share a key only if every field has the same bit pattern, so
/// `0.0` and `-0.0` (or two different NaN payloads) are distinct.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexKey([u8; Vertex::SIZE]);

impl VertexKey {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn layout_matches_field_offsets() {
        assert_eq!(Vertex::LAYOUT.stride, 36);
        let offsets: Vec<i32> = Vertex::LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
    }

    #[test]
    fn key_is_the_raw_bytes() {
        let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec2::new(0.5, 0.25), Rgba::WHITE);
        assert_eq!(v.key().as_bytes(), bytemuck::bytes_of(&v));
    }

    #[test]
    fn signed_zero_changes_the_key() {
        let a = Vertex::new(Vec3::ZERO, Vec2::ZERO, GlColor::BLACK);
        let b = Vertex::new(Vec3::new(-0.0, 0.0, 0.0), Vec2::ZERO, GlColor::BLACK);
        assert_eq!(a, b);
        assert_ne!(a.key(), b.key());
    }
}
