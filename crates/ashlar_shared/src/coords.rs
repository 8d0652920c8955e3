use std::ops::{Add, AddAssign, Sub, SubAssign};

use glam::{IVec3, Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_HEIGHT: usize = 256;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_HEIGHT * CHUNK_SIZE;

/// Chunk-grid coordinate on the horizontal plane. Chunks are full vertical
/// columns, so two components are enough to address one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Planar distance to a point expressed in chunk-grid units.
    pub fn grid_distance(self, grid_point: Vec2) -> f32 {
        Vec2::new(self.x as f32, self.z as f32).distance(grid_point)
    }

    /// The four laterally adjacent chunk coordinates, +X, -X, +Z, -Z.
    pub fn lateral_neighbors(self) -> [ChunkPos; 4] {
        [
            ChunkPos::new(self.x + 1, self.z),
            ChunkPos::new(self.x - 1, self.z),
            ChunkPos::new(self.x, self.z + 1),
            ChunkPos::new(self.x, self.z - 1),
        ]
    }
}

impl Add for ChunkPos {
    type Output = ChunkPos;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x + rhs.x,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for ChunkPos {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl Sub for ChunkPos {
    type Output = ChunkPos;

    fn sub(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x - rhs.x,
            z: self.z - rhs.z,
        }
    }
}

impl SubAssign for ChunkPos {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.z -= rhs.z;
    }
}

fn div_rem_floor(value: i32, divisor: i32) -> (i32, i32) {
    let mut q = value / divisor;
    let mut r = value % divisor;
    if r < 0 {
        q -= 1;
        r += divisor;
    }
    (q, r)
}

/// The chunk column owning a world-space position, floored toward negative
/// infinity so negative coordinates land in the right column.
pub fn column_of(world_pos: IVec3) -> ChunkPos {
    let size = CHUNK_SIZE as i32;
    let (chunk_x, _) = div_rem_floor(world_pos.x, size);
    let (chunk_z, _) = div_rem_floor(world_pos.z, size);
    ChunkPos::new(chunk_x, chunk_z)
}

/// Splits a world position into its owning chunk and intra-chunk coordinate.
/// `None` when the y component falls outside the column.
pub fn world_to_chunk(world_pos: IVec3) -> Option<(ChunkPos, LocalPos)> {
    if world_pos.y < 0 || world_pos.y >= CHUNK_HEIGHT as i32 {
        return None;
    }

    let size = CHUNK_SIZE as i32;
    let (chunk_x, local_x) = div_rem_floor(world_pos.x, size);
    let (chunk_z, local_z) = div_rem_floor(world_pos.z, size);

    Some((
        ChunkPos::new(chunk_x, chunk_z),
        LocalPos {
            x: local_x as u8,
            y: world_pos.y as u8,
            z: local_z as u8,
        },
    ))
}

pub fn chunk_to_world(chunk_pos: ChunkPos, local: LocalPos) -> IVec3 {
    let size = CHUNK_SIZE as i32;
    IVec3::new(
        chunk_pos.x * size + i32::from(local.x),
        i32::from(local.y),
        chunk_pos.z * size + i32::from(local.z),
    )
}

/// World-space position of a chunk's minimum corner.
pub fn chunk_origin(chunk_pos: ChunkPos) -> Vec3 {
    let size = CHUNK_SIZE as f32;
    Vec3::new(chunk_pos.x as f32 * size, 0.0, chunk_pos.z as f32 * size)
}

pub fn local_to_index(local: LocalPos) -> usize {
    usize::from(local.x)
        + usize::from(local.z) * CHUNK_SIZE
        + usize::from(local.y) * CHUNK_SIZE * CHUNK_SIZE
}

pub fn index_to_local(index: usize) -> LocalPos {
    assert!(index < CHUNK_VOLUME, "chunk index out of bounds: {index}");

    let y = index / (CHUNK_SIZE * CHUNK_SIZE);
    let rem = index % (CHUNK_SIZE * CHUNK_SIZE);
    let z = rem / CHUNK_SIZE;
    let x = rem % CHUNK_SIZE;

    LocalPos {
        x: x as u8,
        y: y as u8,
        z: z as u8,
    }
}
