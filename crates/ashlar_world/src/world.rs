use std::collections::VecDeque;

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use ashlar_shared::block::{register_default_blocks, BlockId, BlockRegistry};
use ashlar_shared::chunk::{ChunkColumn, EntityKind, EntitySpawn};
use ashlar_shared::coords::{column_of, world_to_chunk, ChunkPos, LocalPos, CHUNK_SIZE};

use crate::generator::{ChunkGenerator, GeneratorError, NoiseGenerator};

/// Authoritative store of loaded terrain and the single point of mutation
/// for blocks. Reads never create chunks; generation happens only through
/// the explicit load path.
pub struct World {
    seed: u64,
    chunks: FxHashMap<ChunkPos, ChunkColumn>,
    regeneration: VecDeque<ChunkPos>,
    generator: Box<dyn ChunkGenerator>,
    registry: BlockRegistry,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self::with_generator(seed, Box::new(NoiseGenerator::new()))
    }

    pub fn with_generator(seed: u64, generator: Box<dyn ChunkGenerator>) -> Self {
        Self {
            seed,
            chunks: FxHashMap::default(),
            regeneration: VecDeque::new(),
            generator,
            registry: register_default_blocks(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Full chunk collection, exposed for an external serializer together
    /// with `seed()`. This core performs no file I/O itself.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkPos, &ChunkColumn)> {
        self.chunks.iter().map(|(pos, chunk)| (*pos, chunk))
    }

    pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&ChunkColumn> {
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut ChunkColumn> {
        self.chunks.get_mut(&pos)
    }

    /// Inserts `chunk` at `pos`, replacing any existing entry. No mesh is
    /// built here; the renderer schedules that.
    pub fn add_chunk(&mut self, pos: ChunkPos, chunk: ChunkColumn) {
        self.chunks.insert(pos, chunk);
    }

    /// Eviction hook for an external streaming policy. Dropping a chunk also
    /// drops its pending regeneration entries so the FIFO only ever names
    /// loaded chunks.
    pub fn remove_chunk(&mut self, pos: ChunkPos) -> Option<ChunkColumn> {
        let removed = self.chunks.remove(&pos);
        if removed.is_some() {
            self.regeneration.retain(|queued| *queued != pos);
        }
        removed
    }

    /// Resolves the chunk owning a world-space position. Read-only: never
    /// creates or generates.
    pub fn chunk_at(&self, world_pos: IVec3) -> Option<(ChunkPos, &ChunkColumn)> {
        let pos = column_of(world_pos);
        self.chunks.get(&pos).map(|chunk| (pos, chunk))
    }

    /// `None` means "no block here": the chunk is not loaded or the position
    /// is outside the column. Routine near the render boundary, not an
    /// error.
    pub fn block_at(&self, world_pos: IVec3) -> Option<BlockId> {
        let (chunk_pos, local) = world_to_chunk(world_pos)?;
        self.chunks.get(&chunk_pos).map(|chunk| chunk.get(local))
    }

    pub fn add_block(&mut self, world_pos: IVec3, block: BlockId) {
        self.set_block(world_pos, block);
    }

    pub fn remove_block(&mut self, world_pos: IVec3) {
        self.set_block(world_pos, BlockId::AIR);
    }

    /// Records an entity spawn against a loaded chunk. Entity simulation is
    /// external; this is only the bookkeeping hook.
    pub fn add_entity(&mut self, position: Vec3, kind: EntityKind, chunk_pos: ChunkPos) {
        match self.chunks.get_mut(&chunk_pos) {
            Some(chunk) => chunk.entities.push(EntitySpawn { position, kind }),
            None => warn!(
                "entity spawn at {position} targets unloaded chunk ({}, {})",
                chunk_pos.x, chunk_pos.z
            ),
        }
    }

    /// Lazily generates the chunk at `pos` through the generator boundary.
    /// Idempotent: an already-loaded coordinate never re-invokes the
    /// generator. On failure the chunk stays absent and the next call
    /// retries; no default terrain is substituted.
    pub fn load_chunk(&mut self, pos: ChunkPos) -> Result<bool, GeneratorError> {
        if self.chunks.contains_key(&pos) {
            return Ok(false);
        }

        let chunk = self.generator.generate(self.seed, pos, &self.registry)?;
        debug!("generated chunk ({}, {})", pos.x, pos.z);
        self.chunks.insert(pos, chunk);
        Ok(true)
    }

    pub fn pop_regeneration(&mut self) -> Option<ChunkPos> {
        self.regeneration.pop_front()
    }

    pub fn regeneration_len(&self) -> usize {
        self.regeneration.len()
    }

    fn set_block(&mut self, world_pos: IVec3, block: BlockId) {
        let Some((chunk_pos, local)) = world_to_chunk(world_pos) else {
            return;
        };
        // No implicit chunk creation on write.
        let Some(chunk) = self.chunks.get_mut(&chunk_pos) else {
            return;
        };

        chunk.set(local, block);
        chunk.mark_mesh_stale();
        self.enqueue_regeneration(chunk_pos);

        // A boundary block is part of the neighbor's mesh input too.
        for neighbor in boundary_sharing_neighbors(chunk_pos, local) {
            if let Some(neighbor_chunk) = self.chunks.get_mut(&neighbor) {
                neighbor_chunk.mark_mesh_stale();
                self.enqueue_regeneration(neighbor);
            }
        }
    }

    fn enqueue_regeneration(&mut self, pos: ChunkPos) {
        debug_assert!(self.chunks.contains_key(&pos));
        if !self.regeneration.contains(&pos) {
            self.regeneration.push_back(pos);
        }
    }
}

/// Lateral neighbors whose mesh depends on a block at `local` within
/// `chunk_pos`: one per chunk face the block touches, two at a corner.
fn boundary_sharing_neighbors(chunk_pos: ChunkPos, local: LocalPos) -> Vec<ChunkPos> {
    let edge = (CHUNK_SIZE - 1) as u8;
    let mut neighbors = Vec::new();

    if local.x == 0 {
        neighbors.push(ChunkPos::new(chunk_pos.x - 1, chunk_pos.z));
    } else if local.x == edge {
        neighbors.push(ChunkPos::new(chunk_pos.x + 1, chunk_pos.z));
    }
    if local.z == 0 {
        neighbors.push(ChunkPos::new(chunk_pos.x, chunk_pos.z - 1));
    } else if local.z == edge {
        neighbors.push(ChunkPos::new(chunk_pos.x, chunk_pos.z + 1));
    }

    neighbors
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::{IVec3, Vec3};

    use ashlar_shared::block::{BlockId, BlockRegistry};
    use ashlar_shared::chunk::{ChunkColumn, EntityKind};
    use ashlar_shared::coords::ChunkPos;

    use super::World;
    use crate::generator::{ChunkGenerator, GeneratorError};

    struct CountingGenerator {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl ChunkGenerator for CountingGenerator {
        fn generate(
            &self,
            _seed: u64,
            pos: ChunkPos,
            _registry: &BlockRegistry,
        ) -> Result<ChunkColumn, GeneratorError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(GeneratorError {
                    chunk: pos,
                    message: "simulated failure".to_string(),
                });
            }
            Ok(ChunkColumn::new_filled(BlockId::GRANITE))
        }
    }

    fn world_with_flat_chunk(pos: ChunkPos) -> World {
        let mut world = World::new(1);
        world.add_chunk(pos, ChunkColumn::new_filled(BlockId::GRANITE));
        world
    }

    #[test]
    fn block_round_trip_through_add_and_get() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));
        let pos = IVec3::new(5, 80, 9);

        world.add_block(pos, BlockId::CUT_PLANK);
        assert_eq!(world.block_at(pos), Some(BlockId::CUT_PLANK));
    }

    #[test]
    fn remove_block_then_get_returns_air_and_never_errors() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));
        let pos = IVec3::new(3, 40, 3);

        world.remove_block(pos);
        assert_eq!(world.block_at(pos), Some(BlockId::AIR));

        // Removing where nothing was ever set is equally fine.
        world.remove_block(IVec3::new(4, 200, 4));
        assert_eq!(world.block_at(IVec3::new(4, 200, 4)), Some(BlockId::AIR));
    }

    #[test]
    fn queries_outside_loaded_terrain_return_empty() {
        let world = world_with_flat_chunk(ChunkPos::new(0, 0));

        assert_eq!(world.block_at(IVec3::new(500, 64, 500)), None);
        assert_eq!(world.block_at(IVec3::new(0, -1, 0)), None);
        assert_eq!(world.block_at(IVec3::new(0, 256, 0)), None);
    }

    #[test]
    fn writes_to_unloaded_chunks_are_no_ops() {
        let mut world = World::new(1);
        world.add_block(IVec3::new(10, 64, 10), BlockId::GRANITE);

        assert_eq!(world.chunk_count(), 0);
        assert_eq!(world.regeneration_len(), 0);
        assert_eq!(world.block_at(IVec3::new(10, 64, 10)), None);
    }

    #[test]
    fn interior_edit_enqueues_only_the_owning_chunk() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));
        world.add_chunk(ChunkPos::new(1, 0), ChunkColumn::new_empty());

        world.add_block(IVec3::new(8, 64, 8), BlockId::AIR);

        assert_eq!(world.pop_regeneration(), Some(ChunkPos::new(0, 0)));
        assert_eq!(world.pop_regeneration(), None);
    }

    #[test]
    fn boundary_edit_enqueues_owner_and_sharing_neighbor() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));
        world.add_chunk(ChunkPos::new(1, 0), ChunkColumn::new_empty());
        world.add_chunk(ChunkPos::new(0, 1), ChunkColumn::new_empty());

        // x = 15 touches the +X face shared with chunk (1, 0).
        world.remove_block(IVec3::new(15, 64, 8));

        assert_eq!(world.pop_regeneration(), Some(ChunkPos::new(0, 0)));
        assert_eq!(world.pop_regeneration(), Some(ChunkPos::new(1, 0)));
        assert_eq!(world.pop_regeneration(), None);
    }

    #[test]
    fn corner_edit_enqueues_both_sharing_neighbors_but_never_diagonals() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));
        world.add_chunk(ChunkPos::new(1, 0), ChunkColumn::new_empty());
        world.add_chunk(ChunkPos::new(0, 1), ChunkColumn::new_empty());
        world.add_chunk(ChunkPos::new(1, 1), ChunkColumn::new_empty());

        world.remove_block(IVec3::new(15, 64, 15));

        let mut queued = Vec::new();
        while let Some(pos) = world.pop_regeneration() {
            queued.push(pos);
        }
        assert!(queued.contains(&ChunkPos::new(0, 0)));
        assert!(queued.contains(&ChunkPos::new(1, 0)));
        assert!(queued.contains(&ChunkPos::new(0, 1)));
        assert!(!queued.contains(&ChunkPos::new(1, 1)));
    }

    #[test]
    fn boundary_edit_skips_unloaded_neighbors() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));

        world.remove_block(IVec3::new(0, 64, 8));

        assert_eq!(world.pop_regeneration(), Some(ChunkPos::new(0, 0)));
        assert_eq!(world.pop_regeneration(), None);
    }

    #[test]
    fn load_chunk_invokes_the_generator_exactly_once_per_coordinate() {
        let calls = Rc::new(Cell::new(0));
        let mut world = World::with_generator(
            9,
            Box::new(CountingGenerator {
                calls: calls.clone(),
                fail: false,
            }),
        );

        assert!(world.load_chunk(ChunkPos::new(2, 2)).unwrap());
        assert!(!world.load_chunk(ChunkPos::new(2, 2)).unwrap());
        assert!(!world.load_chunk(ChunkPos::new(2, 2)).unwrap());

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn generator_failure_leaves_the_chunk_absent_and_retries() {
        let calls = Rc::new(Cell::new(0));
        let mut world = World::with_generator(
            9,
            Box::new(CountingGenerator {
                calls: calls.clone(),
                fail: true,
            }),
        );

        assert!(world.load_chunk(ChunkPos::new(0, 0)).is_err());
        assert_eq!(world.chunk_count(), 0);

        assert!(world.load_chunk(ChunkPos::new(0, 0)).is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn evicting_a_chunk_purges_its_regeneration_entries() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));
        world.add_block(IVec3::new(8, 64, 8), BlockId::AIR);
        assert_eq!(world.regeneration_len(), 1);

        world.remove_chunk(ChunkPos::new(0, 0));
        assert_eq!(world.regeneration_len(), 0);
    }

    #[test]
    fn entity_spawns_attach_to_their_loaded_chunk() {
        let mut world = world_with_flat_chunk(ChunkPos::new(0, 0));

        world.add_entity(Vec3::new(4.0, 70.0, 4.0), EntityKind::Critter, ChunkPos::new(0, 0));
        world.add_entity(Vec3::new(99.0, 70.0, 99.0), EntityKind::Hostile, ChunkPos::new(9, 9));

        let chunk = world.chunk(ChunkPos::new(0, 0)).unwrap();
        assert_eq!(chunk.entities.len(), 1);
        assert_eq!(chunk.entities[0].kind, EntityKind::Critter);
    }
}
