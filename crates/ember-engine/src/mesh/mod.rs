//! Deduplicated indexed meshes.
//!
//! Vertices are appended one at a time; byte-identical vertices share a slot,
//! so the index list grows on every append while the vertex list only grows
//! for new content. `sync` mirrors both lists into device buffers and `draw`
//! renders the last synced state.

mod draw;
mod store;
mod vertex;

pub use draw::{MODEL_UNIFORM, PROJECTION_UNIFORM, TEXTURE_UNIFORM, VIEW_UNIFORM};
pub use store::{Mesh, MeshFlags};
pub use vertex::{Vertex, VertexKey};
