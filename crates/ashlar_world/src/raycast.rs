use glam::{IVec3, Vec3};

use ashlar_shared::block::BlockId;
use ashlar_shared::face::Face;

use crate::world::World;

/// How far the player can reach when targeting a block, in world units.
pub const MAX_INTERACTION_DISTANCE: f32 = 8.0;

/// The block a ray first entered, valid only for the frame that computed it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    pub block_pos: IVec3,
    pub face: Face,
    pub distance: f32,
}

/// Amanatides & Woo voxel traversal: visits every grid cell a ray passes
/// through in order, so no block can be tunneled past regardless of
/// distance. When the ray exits a cell exactly at a corner the tie resolves
/// x before y before z; that order is fixed, not per-call.
#[derive(Debug, Copy, Clone)]
struct VoxelWalk {
    current: IVec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
    t_current: f32,
    max_distance: f32,
    entry_face: Face,
    started: bool,
    finished: bool,
}

impl VoxelWalk {
    fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        let step = IVec3::new(
            direction.x.partial_cmp(&0.0).map_or(0, |o| o as i32),
            direction.y.partial_cmp(&0.0).map_or(0, |o| o as i32),
            direction.z.partial_cmp(&0.0).map_or(0, |o| o as i32),
        );

        let current = origin.floor().as_ivec3();

        let boundary = |cell: i32, step: i32| {
            if step > 0 {
                cell as f32 + 1.0
            } else {
                cell as f32
            }
        };
        let axis_t = |next: f32, origin: f32, dir: f32| {
            if dir != 0.0 {
                (next - origin) / dir
            } else {
                f32::INFINITY
            }
        };
        let axis_delta = |dir: f32| {
            if dir != 0.0 {
                1.0 / dir.abs()
            } else {
                f32::INFINITY
            }
        };

        let t_max = Vec3::new(
            axis_t(boundary(current.x, step.x), origin.x, direction.x),
            axis_t(boundary(current.y, step.y), origin.y, direction.y),
            axis_t(boundary(current.z, step.z), origin.z, direction.z),
        );
        let t_delta = Vec3::new(
            axis_delta(direction.x),
            axis_delta(direction.y),
            axis_delta(direction.z),
        );

        Self {
            current,
            step,
            t_max,
            t_delta,
            t_current: 0.0,
            max_distance: max_distance.max(0.0),
            // The origin cell has no crossing; report the face the ray's
            // dominant axis points away from.
            entry_face: dominant_entry_face(direction),
            started: false,
            finished: false,
        }
    }
}

impl Iterator for VoxelWalk {
    type Item = (IVec3, Face, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some((self.current, self.entry_face, 0.0));
        }

        let (axis, distance) = if self.t_max.x <= self.t_max.y && self.t_max.x <= self.t_max.z {
            (0usize, self.t_max.x)
        } else if self.t_max.y <= self.t_max.z {
            (1usize, self.t_max.y)
        } else {
            (2usize, self.t_max.z)
        };

        if !distance.is_finite() || distance > self.max_distance {
            self.finished = true;
            return None;
        }

        match axis {
            0 => {
                self.current.x += self.step.x;
                self.t_max.x += self.t_delta.x;
                self.entry_face = if self.step.x > 0 { Face::NegX } else { Face::PosX };
            }
            1 => {
                self.current.y += self.step.y;
                self.t_max.y += self.t_delta.y;
                self.entry_face = if self.step.y > 0 { Face::NegY } else { Face::PosY };
            }
            _ => {
                self.current.z += self.step.z;
                self.t_max.z += self.t_delta.z;
                self.entry_face = if self.step.z > 0 { Face::NegZ } else { Face::PosZ };
            }
        }
        self.t_current = distance;

        Some((self.current, self.entry_face, self.t_current))
    }
}

fn dominant_entry_face(direction: Vec3) -> Face {
    let abs = direction.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        if direction.x >= 0.0 { Face::NegX } else { Face::PosX }
    } else if abs.y >= abs.z {
        if direction.y >= 0.0 { Face::NegY } else { Face::PosY }
    } else if direction.z >= 0.0 {
        Face::NegZ
    } else {
        Face::PosZ
    }
}

/// Marches from `origin` along `direction` and reports the first non-air
/// block within `max_distance`. Unloaded terrain reads as empty, so casting
/// near the world edge simply passes through.
pub fn cast(world: &World, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    for (block_pos, face, distance) in VoxelWalk::new(origin, direction, max_distance) {
        match world.block_at(block_pos) {
            Some(block) if block != BlockId::AIR => {
                return Some(RayHit {
                    block_pos,
                    face,
                    distance,
                });
            }
            _ => {}
        }
    }

    None
}
