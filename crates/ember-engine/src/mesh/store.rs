use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::device::{BufferKind, Device};
use crate::error::{Error, Result};

use super::vertex::{Vertex, VertexKey};

/// Lifecycle flags of a mesh.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeshFlags {
    /// Device buffers are allocated.
    pub active: bool,
    /// `draw` issues GPU work. Hidden meshes draw nothing.
    pub visible: bool,
}

pub(super) struct MeshBuffers<D: Device> {
    pub vertex_array: D::VertexArray,
    pub vertices: D::Buffer,
    pub indices: D::Buffer,
}

/// Indexed triangle mesh with content-addressed vertex deduplication.
///
/// Invariants:
/// - every entry of `indices` is `< vertices.len()`
/// - `lookup` holds exactly one key per unique vertex, mapping to its slot
///
/// Device buffers mirror `vertices`/`indices` as of the last [`sync`](Self::sync).
/// They are released by [`destroy`](Self::destroy); dropping a live mesh leaks them.
pub struct Mesh<D: Device> {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    lookup: HashMap<VertexKey, u32>,

    pub(super) buffers: Option<MeshBuffers<D>>,
    pub(super) flags: MeshFlags,

    dirty: bool,
    pub(super) synced_indices: u32,
}

impl<D: Device> Mesh<D> {
    /// Creates an empty mesh and allocates its device buffers.
    pub fn new(device: &mut D) -> Result<Self> {
        let buffers = create_buffers(device).map_err(Error::DeviceResource)?;
        log::debug!("mesh created: {:?}", buffers.vertex_array);

        Ok(Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            lookup: HashMap::new(),
            buffers: Some(buffers),
            flags: MeshFlags {
                active: true,
                visible: true,
            },
            dirty: false,
            synced_indices: 0,
        })
    }

    /// Appends one vertex and returns the slot its index refers to.
    ///
    /// A vertex byte-equal to a stored one reuses that slot. The device copy is
    /// only refreshed by the next [`sync`](Self::sync).
    pub fn append(&mut self, vertex: Vertex) -> u32 {
        let slot = match self.lookup.entry(vertex.key()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                debug_assert!(self.vertices.len() < i32::MAX as usize);
                let slot = self.vertices.len() as u32;
                self.vertices.push(vertex);
                *e.insert(slot)
            }
        };

        // Draw counts are passed to GL as `i32`.
        debug_assert!(self.indices.len() < i32::MAX as usize);
        self.indices.push(slot);
        self.dirty = true;
        slot
    }

    /// Appends `vertices` in order, then syncs once.
    pub fn append_batch<I>(&mut self, device: &mut D, vertices: I) -> Result<()>
    where
        I: IntoIterator<Item = Vertex>,
    {
        for v in vertices {
            self.append(v);
        }
        self.sync(device)
    }

    /// Replaces both device buffers with the full vertex and index lists.
    pub fn sync(&mut self, device: &mut D) -> Result<()> {
        let Some(buffers) = self.buffers.as_ref() else {
            return Err(Error::ResourceReleased("mesh"));
        };

        device
            .upload_buffer(
                buffers.vertices,
                BufferKind::Vertex,
                bytemuck::cast_slice(&self.vertices),
            )
            .map_err(Error::DeviceResource)?;
        device
            .upload_buffer(
                buffers.indices,
                BufferKind::Index,
                bytemuck::cast_slice(&self.indices),
            )
            .map_err(Error::DeviceResource)?;

        log::trace!(
            "mesh synced: {} unique vertices, {} indices",
            self.vertices.len(),
            self.indices.len()
        );

        self.dirty = false;
        self.synced_indices = self.indices.len() as u32;
        Ok(())
    }

    /// Releases device buffers and clears all vertex data. Safe to call twice.
    pub fn destroy(&mut self, device: &mut D) {
        if let Some(buffers) = self.buffers.take() {
            device.delete_vertex_array(buffers.vertex_array);
            device.delete_buffer(buffers.vertices);
            device.delete_buffer(buffers.indices);
            log::debug!("mesh destroyed: {:?}", buffers.vertex_array);
        }

        self.vertices.clear();
        self.indices.clear();
        self.lookup.clear();
        self.flags = MeshFlags {
            active: false,
            visible: false,
        };
        self.dirty = false;
        self.synced_indices = 0;
    }

    /// Unique vertices in first-seen order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// One index per appended vertex.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Slot of a stored vertex, by byte content.
    pub fn slot_of(&self, vertex: &Vertex) -> Option<u32> {
        self.lookup.get(&vertex.key()).copied()
    }

    pub fn unique_len(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_len(&self) -> usize {
        self.indices.len()
    }

    /// True when appends happened after the last sync.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn flags(&self) -> MeshFlags {
        self.flags
    }

    /// Shows or hides an active mesh. Ignored once destroyed.
    pub fn set_visible(&mut self, visible: bool) {
        if self.flags.active {
            self.flags.visible = visible;
        }
    }
}

impl<D: Device> Drop for Mesh<D> {
    fn drop(&mut self) {
        if let Some(buffers) = &self.buffers {
            log::warn!(
                "mesh {:?} dropped without destroy(); device buffers leaked",
                buffers.vertex_array
            );
        }
    }
}

fn create_buffers<D: Device>(device: &mut D) -> std::result::Result<MeshBuffers<D>, String> {
    let vertices = device.create_buffer()?;
    let indices = match device.create_buffer() {
        Ok(b) => b,
        Err(e) => {
            device.delete_buffer(vertices);
            return Err(e);
        }
    };
    match device.create_vertex_array(vertices, indices, &Vertex::LAYOUT) {
        Ok(vertex_array) => Ok(MeshBuffers {
            vertex_array,
            vertices,
            indices,
        }),
        Err(e) => {
            device.delete_buffer(vertices);
            device.delete_buffer(indices);
            Err(e)
        }
    }
}
