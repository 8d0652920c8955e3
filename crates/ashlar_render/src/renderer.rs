use glam::IVec3;
use tracing::info;

use ashlar_shared::block::BlockId;
use ashlar_shared::coords::{ChunkPos, CHUNK_SIZE};
use ashlar_shared::mesh::{ChunkMesh, MeshBuffer};

use ashlar_world::raycast::{self, MAX_INTERACTION_DISTANCE};
use ashlar_world::world::World;

use crate::camera::Camera;
use crate::mesher::build_chunk_mesh;
use crate::queue::RenderQueue;

/// Upper bound on mesh builds taken from each queue per frame. Keeping it at
/// one trades initial-load and edit-propagation latency for a stable frame
/// time no matter how deep the queues get.
pub const MESH_BUILDS_PER_FRAME: usize = 1;

/// External draw-submission facility. The renderer decides what to draw and
/// in which order; uploading and issuing the actual draw calls is the
/// implementor's concern.
pub trait DrawSink {
    /// Distance parameter for the shader-side fog cutoff, kept in sync with
    /// the render distance.
    fn set_fog_distance(&mut self, distance: f32);
    fn draw_solid(&mut self, chunk_pos: ChunkPos, buffer: &MeshBuffer);
    fn draw_transparent(&mut self, chunk_pos: ChunkPos, buffer: &MeshBuffer);
    fn highlight_block(&mut self, block_pos: IVec3);
}

/// Per-frame orchestration: visibility culling, two-pass draw submission,
/// target-block highlighting, and amortized mesh building. Holds the build
/// queue; the world is borrowed per call and never owned.
pub struct WorldRenderer {
    queue: RenderQueue,
    render_distance: i32,
    fog_distance: f32,
    current_target: Option<BlockId>,
}

impl WorldRenderer {
    pub fn new(render_distance: i32) -> Self {
        Self {
            queue: RenderQueue::new(),
            render_distance,
            fog_distance: fog_distance_for(render_distance),
            current_target: None,
        }
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// Synchronously recomputes state derived from the render distance. Does
    /// not re-enqueue any chunk.
    pub fn set_render_distance(&mut self, render_distance: i32) {
        self.render_distance = render_distance;
        self.fog_distance = fog_distance_for(render_distance);
    }

    pub fn fog_distance(&self) -> f32 {
        self.fog_distance
    }

    /// The block the camera pointed at during the last frame, if any.
    pub fn current_target(&self) -> Option<BlockId> {
        self.current_target
    }

    pub fn pending_builds(&self) -> usize {
        self.queue.len()
    }

    /// Rebinds the renderer to a world. Chunks the incoming world already
    /// holds (a loaded save rather than a fresh creation) each get a fresh
    /// unbuilt mesh placeholder and a queue entry, so nothing is ever drawn
    /// with stale or foreign geometry after the swap.
    pub fn bind_world(&mut self, world: &mut World, camera: &Camera) {
        self.queue.clear();
        self.current_target = None;

        let positions: Vec<ChunkPos> = world.positions().collect();
        for pos in &positions {
            if let Some(chunk) = world.chunk_mut(*pos) {
                chunk.mesh = Some(ChunkMesh::placeholder());
            }
        }
        for pos in positions {
            self.enqueue(pos, camera);
        }

        info!(
            "renderer bound to world (seed {}): {} chunks queued",
            world.seed(),
            self.queue.len()
        );
    }

    /// Queues a chunk for mesh building at its current camera distance.
    /// Re-adding an already-queued coordinate is fine; the extra entry dies
    /// as a no-op at dequeue.
    pub fn enqueue(&mut self, pos: ChunkPos, camera: &Camera) {
        self.queue.push(pos, pos.grid_distance(camera.grid_position()));
    }

    /// One frame: solid pass over every in-range chunk, transparent pass
    /// over the same set (so transparent fragments blend against all solid
    /// geometry regardless of chunk iteration order), target highlighting,
    /// then at most one build from the priority queue and one from the
    /// regeneration FIFO. Builds run after both draw passes; their output is
    /// first seen next frame.
    pub fn render_world(&mut self, world: &mut World, camera: &Camera, sink: &mut impl DrawSink) {
        sink.set_fog_distance(self.fog_distance);

        let in_range: Vec<ChunkPos> = world
            .positions()
            .filter(|pos| self.chunk_in_range(*pos, camera))
            .collect();

        for pos in &in_range {
            if let Some(mesh) = world.chunk(*pos).and_then(|chunk| chunk.mesh.as_ref()) {
                if !mesh.solid.is_empty() {
                    sink.draw_solid(*pos, &mesh.solid);
                }
            }
        }
        for pos in &in_range {
            if let Some(mesh) = world.chunk(*pos).and_then(|chunk| chunk.mesh.as_ref()) {
                if !mesh.transparent.is_empty() {
                    sink.draw_transparent(*pos, &mesh.transparent);
                }
            }
        }

        self.highlight_target(world, camera, sink);

        for _ in 0..MESH_BUILDS_PER_FRAME {
            if let Some(pos) = self.queue.pop() {
                build_chunk_mesh(world, pos);
            }
        }
        for _ in 0..MESH_BUILDS_PER_FRAME {
            if let Some(pos) = world.pop_regeneration() {
                build_chunk_mesh(world, pos);
            }
        }
    }

    /// Axis-aligned square cutoff on both horizontal axes, deliberately not
    /// a circle: the fog parameter handed to the draw sink uses the same
    /// distance, so culling and fog agree at the boundary.
    fn chunk_in_range(&self, pos: ChunkPos, camera: &Camera) -> bool {
        let size = CHUNK_SIZE as f32;
        let limit = self.render_distance as f32 * size;
        let x_distance = (camera.position.x - pos.x as f32 * size).abs();
        let z_distance = (camera.position.z - pos.z as f32 * size).abs();
        x_distance <= limit && z_distance <= limit
    }

    fn highlight_target(&mut self, world: &World, camera: &Camera, sink: &mut impl DrawSink) {
        let hit = raycast::cast(
            world,
            camera.position,
            camera.forward_direction(),
            MAX_INTERACTION_DISTANCE,
        );

        self.current_target = hit.and_then(|hit| world.block_at(hit.block_pos));
        if let Some(hit) = hit {
            sink.highlight_block(hit.block_pos);
        }
    }
}

fn fog_distance_for(render_distance: i32) -> f32 {
    render_distance as f32 * CHUNK_SIZE as f32
}
