use bytemuck::{Pod, Zeroable};

/// CPU-side vertex layout for chunk geometry. Kept free of any GPU types so
/// the draw boundary decides how to upload it.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}
const _: [(); 32] = [(); std::mem::size_of::<ChunkVertex>()];

#[derive(Debug, Clone, Default)]
pub struct MeshBuffer {
    pub vertices: Vec<ChunkVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Appends one quad as four vertices and two CCW triangles. Corners must
    /// arrive in winding order for the face they belong to.
    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], uvs: [[f32; 2]; 4]) {
        let base = self.vertices.len() as u32;
        for (position, tex_coord) in corners.into_iter().zip(uvs) {
            self.vertices.push(ChunkVertex {
                position,
                normal,
                tex_coord,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Renderable geometry derived from one chunk's blocks plus its neighbors'
/// boundary blocks. `built` doubles as the staleness flag: block mutations
/// clear it, a successful rebuild sets it.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    pub solid: MeshBuffer,
    pub transparent: MeshBuffer,
    pub built: bool,
}

impl ChunkMesh {
    /// An empty, unbuilt mesh. Assigned on world swap so no chunk is ever
    /// drawn with geometry from a previous world.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.solid.clear();
        self.transparent.clear();
        self.built = false;
    }
}
