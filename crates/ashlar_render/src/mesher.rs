use glam::IVec3;
use tracing::debug;

use ashlar_shared::block::{BlockId, BlockRegistry};
use ashlar_shared::chunk::ChunkColumn;
use ashlar_shared::coords::{chunk_to_world, ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};
use ashlar_shared::face::Face;
use ashlar_shared::mesh::{ChunkMesh, MeshBuffer};

use ashlar_world::world::World;

const ATLAS_TILES_PER_ROW: u16 = 16;
const TILE_UV: f32 = 1.0 / ATLAS_TILES_PER_ROW as f32;

/// Rebuilds the mesh for the chunk at `chunk_pos` from its block content and
/// its neighbors' boundary blocks, fully replacing prior geometry.
///
/// Returns `false` without touching anything when the chunk is not loaded
/// (it may have been evicted between enqueue and dequeue) or when its mesh
/// is already current (a stale duplicate queue entry).
pub fn build_chunk_mesh(world: &mut World, chunk_pos: ChunkPos) -> bool {
    let mesh = {
        let Some(chunk) = world.chunk(chunk_pos) else {
            return false;
        };
        if chunk.mesh_is_current() {
            return false;
        }
        build_geometry(world, chunk_pos, chunk)
    };

    debug!(
        "meshed chunk ({}, {}): {} solid / {} transparent vertices",
        chunk_pos.x,
        chunk_pos.z,
        mesh.solid.vertices.len(),
        mesh.transparent.vertices.len()
    );

    let Some(chunk) = world.chunk_mut(chunk_pos) else {
        return false;
    };
    chunk.mesh = Some(mesh);
    true
}

/// Pure function of the chunk's blocks plus neighbor boundary blocks. The
/// scan order (y, then z, then x, faces in `Face::ALL` order) is fixed so
/// identical content yields byte-identical buffers.
fn build_geometry(world: &World, chunk_pos: ChunkPos, chunk: &ChunkColumn) -> ChunkMesh {
    let registry = world.registry();
    let mut mesh = ChunkMesh::placeholder();

    for y in 0..CHUNK_HEIGHT {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let local = LocalPos {
                    x: x as u8,
                    y: y as u8,
                    z: z as u8,
                };
                let block = chunk.get(local);
                if block == BlockId::AIR {
                    continue;
                }

                let world_pos = chunk_to_world(chunk_pos, local);
                let opaque = registry.is_opaque(block);
                for face in Face::ALL {
                    if face_is_visible(world, registry, world_pos, face, opaque) {
                        let buffer = if opaque {
                            &mut mesh.solid
                        } else {
                            &mut mesh.transparent
                        };
                        emit_face(buffer, world_pos, face, block);
                    }
                }
            }
        }
    }

    mesh.built = true;
    mesh
}

/// A face shows when nothing hides it: the neighbor cell is unloaded or out
/// of the column, holds air, or (opaque blocks only) holds something
/// see-through. Transparent blocks cull against any neighbor content, which
/// also removes internal faces between touching water cells.
fn face_is_visible(
    world: &World,
    registry: &BlockRegistry,
    world_pos: IVec3,
    face: Face,
    opaque: bool,
) -> bool {
    let neighbor_pos = world_pos + face.normal_ivec3();
    match world.block_at(neighbor_pos) {
        None => true,
        Some(BlockId::AIR) => true,
        Some(neighbor) => opaque && registry.properties_of(neighbor).transparent,
    }
}

fn emit_face(buffer: &mut MeshBuffer, world_pos: IVec3, face: Face, block: BlockId) {
    let x = world_pos.x as f32;
    let y = world_pos.y as f32;
    let z = world_pos.z as f32;

    // Counter-clockwise when viewed from outside the block.
    let corners = match face {
        Face::PosX => [
            [x + 1.0, y, z],
            [x + 1.0, y + 1.0, z],
            [x + 1.0, y + 1.0, z + 1.0],
            [x + 1.0, y, z + 1.0],
        ],
        Face::NegX => [
            [x, y, z + 1.0],
            [x, y + 1.0, z + 1.0],
            [x, y + 1.0, z],
            [x, y, z],
        ],
        Face::PosY => [
            [x, y + 1.0, z],
            [x, y + 1.0, z + 1.0],
            [x + 1.0, y + 1.0, z + 1.0],
            [x + 1.0, y + 1.0, z],
        ],
        Face::NegY => [
            [x, y, z + 1.0],
            [x, y, z],
            [x + 1.0, y, z],
            [x + 1.0, y, z + 1.0],
        ],
        Face::PosZ => [
            [x, y, z + 1.0],
            [x + 1.0, y, z + 1.0],
            [x + 1.0, y + 1.0, z + 1.0],
            [x, y + 1.0, z + 1.0],
        ],
        Face::NegZ => [
            [x + 1.0, y, z],
            [x, y, z],
            [x, y + 1.0, z],
            [x + 1.0, y + 1.0, z],
        ],
    };

    buffer.push_quad(corners, face.normal_f32(), tile_uvs(block));
}

/// Texture coordinates for a block's atlas tile; tiles are laid out row by
/// row in block-id order.
fn tile_uvs(block: BlockId) -> [[f32; 2]; 4] {
    let u0 = f32::from(block.0 % ATLAS_TILES_PER_ROW) * TILE_UV;
    let v0 = f32::from(block.0 / ATLAS_TILES_PER_ROW) * TILE_UV;
    let u1 = u0 + TILE_UV;
    let v1 = v0 + TILE_UV;
    [[u0, v1], [u1, v1], [u1, v0], [u0, v0]]
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use ashlar_shared::block::BlockId;
    use ashlar_shared::chunk::ChunkColumn;
    use ashlar_shared::coords::ChunkPos;

    use super::build_chunk_mesh;
    use ashlar_world::world::World;

    fn empty_world_with_chunk(pos: ChunkPos) -> World {
        let mut world = World::new(1);
        world.add_chunk(pos, ChunkColumn::new_empty());
        world
    }

    #[test]
    fn missing_chunk_is_a_no_op() {
        let mut world = World::new(1);
        assert!(!build_chunk_mesh(&mut world, ChunkPos::new(4, 4)));
    }

    #[test]
    fn isolated_block_emits_all_six_faces() {
        let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
        world.add_block(IVec3::new(8, 64, 8), BlockId::GRANITE);

        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));

        let mesh = world.chunk(ChunkPos::new(0, 0)).unwrap().mesh.as_ref().unwrap();
        assert!(mesh.built);
        assert_eq!(mesh.solid.vertices.len(), 6 * 4);
        assert_eq!(mesh.solid.indices.len(), 6 * 6);
        assert!(mesh.transparent.is_empty());
    }

    #[test]
    fn touching_blocks_cull_their_shared_faces() {
        let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
        world.add_block(IVec3::new(8, 64, 8), BlockId::GRANITE);
        world.add_block(IVec3::new(9, 64, 8), BlockId::GRANITE);

        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));

        // Two blocks, five visible faces each.
        let mesh = world.chunk(ChunkPos::new(0, 0)).unwrap().mesh.as_ref().unwrap();
        assert_eq!(mesh.solid.vertices.len(), 2 * 5 * 4);
    }

    #[test]
    fn transparent_blocks_fill_the_transparent_buffer() {
        let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
        world.add_block(IVec3::new(8, 63, 8), BlockId::SHORE_SAND);
        world.add_block(IVec3::new(8, 64, 8), BlockId::STILL_WATER);

        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));
        let mesh = world.chunk(ChunkPos::new(0, 0)).unwrap().mesh.as_ref().unwrap();

        // Sand keeps all six faces: five against air plus the top one against
        // see-through water. Water culls only its face against the sand.
        assert_eq!(mesh.solid.vertices.len(), 6 * 4);
        assert_eq!(mesh.transparent.vertices.len(), 5 * 4);
    }

    #[test]
    fn faces_against_a_loaded_neighbor_chunk_are_culled() {
        let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
        world.add_chunk(ChunkPos::new(1, 0), ChunkColumn::new_empty());
        world.add_block(IVec3::new(15, 64, 8), BlockId::GRANITE);
        world.add_block(IVec3::new(16, 64, 8), BlockId::GRANITE);

        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));
        let mesh = world.chunk(ChunkPos::new(0, 0)).unwrap().mesh.as_ref().unwrap();

        // The +X face is hidden by the block across the chunk boundary.
        assert_eq!(mesh.solid.vertices.len(), 5 * 4);
    }

    #[test]
    fn faces_against_unloaded_terrain_are_emitted() {
        let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
        world.add_block(IVec3::new(15, 64, 8), BlockId::GRANITE);

        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));
        let mesh = world.chunk(ChunkPos::new(0, 0)).unwrap().mesh.as_ref().unwrap();

        // Chunk (1, 0) is not loaded; the boundary face still shows.
        assert_eq!(mesh.solid.vertices.len(), 6 * 4);
    }

    #[test]
    fn identical_content_builds_byte_identical_geometry() {
        let build = || {
            let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
            world.add_block(IVec3::new(3, 60, 3), BlockId::GRANITE);
            world.add_block(IVec3::new(4, 60, 3), BlockId::SOIL);
            world.add_block(IVec3::new(3, 61, 3), BlockId::STILL_WATER);
            build_chunk_mesh(&mut world, ChunkPos::new(0, 0));
            world
                .chunk(ChunkPos::new(0, 0))
                .unwrap()
                .mesh
                .as_ref()
                .unwrap()
                .clone()
        };

        let first = build();
        let second = build();
        assert_eq!(first.solid.vertices, second.solid.vertices);
        assert_eq!(first.solid.indices, second.solid.indices);
        assert_eq!(first.transparent.vertices, second.transparent.vertices);
    }

    #[test]
    fn a_current_mesh_makes_stale_queue_entries_no_ops() {
        let mut world = empty_world_with_chunk(ChunkPos::new(0, 0));
        world.add_block(IVec3::new(8, 64, 8), BlockId::GRANITE);

        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));
        // Duplicate dequeue: nothing changed, nothing rebuilt.
        assert!(!build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));

        // An edit marks the mesh stale and re-enables the rebuild.
        world.remove_block(IVec3::new(8, 64, 8));
        assert!(build_chunk_mesh(&mut world, ChunkPos::new(0, 0)));
        let mesh = world.chunk(ChunkPos::new(0, 0)).unwrap().mesh.as_ref().unwrap();
        assert!(mesh.solid.is_empty());
    }
}
