use glam::{Vec2, Vec3};

use ashlar_shared::coords::CHUNK_SIZE;

/// Read-only view state consumed by the renderer and the ray caster each
/// frame. Input handling and movement live outside this core and only ever
/// hand a finished position/orientation in.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 72.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn forward_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize_or_zero()
    }

    /// The camera's planar position in chunk-grid units, the reference point
    /// for build prioritization.
    pub fn grid_position(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z) / CHUNK_SIZE as f32
    }
}
