use glam::Vec3;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::block::BlockId;
use crate::coords::{local_to_index, LocalPos, CHUNK_VOLUME};
use crate::mesh::ChunkMesh;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    ItemDrop,
    Critter,
    Hostile,
}

/// A spawn recorded against the chunk that hosts it. Entity simulation lives
/// outside this core; the chunk only remembers what was placed where.
#[derive(Clone, Debug)]
pub struct EntitySpawn {
    pub position: Vec3,
    pub kind: EntityKind,
}

/// One vertical column of blocks, the unit of storage and meshing. Owns its
/// mesh exclusively; the mesh stays `None` until the renderer builds it.
#[derive(Clone, Debug)]
pub struct ChunkColumn {
    pub blocks: Box<[BlockId; CHUNK_VOLUME]>,
    pub mesh: Option<ChunkMesh>,
    pub entities: Vec<EntitySpawn>,
}

impl ChunkColumn {
    pub fn new_empty() -> Self {
        Self {
            blocks: Box::new([BlockId::AIR; CHUNK_VOLUME]),
            mesh: None,
            entities: Vec::new(),
        }
    }

    pub fn new_filled(block: BlockId) -> Self {
        Self {
            blocks: Box::new([block; CHUNK_VOLUME]),
            mesh: None,
            entities: Vec::new(),
        }
    }

    pub fn get(&self, local: LocalPos) -> BlockId {
        self.blocks[local_to_index(local)]
    }

    pub fn set(&mut self, local: LocalPos, block: BlockId) {
        let index = local_to_index(local);
        self.blocks[index] = block;
    }

    /// Marks any existing mesh stale. Called by the world on every mutation
    /// that can change this chunk's geometry, including neighbor boundary
    /// edits.
    pub fn mark_mesh_stale(&mut self) {
        if let Some(mesh) = self.mesh.as_mut() {
            mesh.built = false;
        }
    }

    pub fn mesh_is_current(&self) -> bool {
        self.mesh.as_ref().is_some_and(|mesh| mesh.built)
    }
}

impl Default for ChunkColumn {
    fn default() -> Self {
        Self::new_empty()
    }
}

// Only the block array crosses the persistence boundary; mesh and entity
// spawns are runtime state rebuilt after load.
impl Serialize for ChunkColumn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.blocks.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkColumn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let blocks = Vec::<BlockId>::deserialize(deserializer)?;
        if blocks.len() != CHUNK_VOLUME {
            return Err(de::Error::custom(format!(
                "expected {CHUNK_VOLUME} blocks, got {}",
                blocks.len()
            )));
        }

        let blocks: [BlockId; CHUNK_VOLUME] = blocks
            .try_into()
            .map_err(|_| de::Error::custom("failed to deserialize chunk block array"))?;

        Ok(Self {
            blocks: Box::new(blocks),
            mesh: None,
            entities: Vec::new(),
        })
    }
}
