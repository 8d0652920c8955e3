use std::error::Error;
use std::fmt;

use noise::{NoiseFn, Perlin};

use ashlar_shared::block::{BlockId, BlockRegistry};
use ashlar_shared::chunk::ChunkColumn;
use ashlar_shared::coords::{ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};

const SEA_LEVEL: i32 = 62;
const BASE_HEIGHT: f64 = 64.0;
const HEIGHT_AMPLITUDE: f64 = 24.0;
const SNOW_LINE: i32 = 84;
const SOIL_DEPTH: i32 = 3;

#[derive(Debug)]
pub struct GeneratorError {
    pub chunk: ChunkPos,
    pub message: String,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to generate chunk ({}, {}): {}",
            self.chunk.x, self.chunk.z, self.message
        )
    }
}

impl Error for GeneratorError {}

/// Producer of a chunk's initial block content. Implementations must be pure
/// functions of `(seed, pos)` so chunk loading stays idempotent and a world
/// can be regenerated from its seed alone.
pub trait ChunkGenerator {
    fn generate(
        &self,
        seed: u64,
        pos: ChunkPos,
        registry: &BlockRegistry,
    ) -> Result<ChunkColumn, GeneratorError>;
}

/// Layered-heightmap terrain: keelstone floor, granite body, a soil cap with
/// turf or sand on top, water filled to sea level, snow above the snow line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoiseGenerator;

impl NoiseGenerator {
    pub fn new() -> Self {
        Self
    }

    fn surface_height(seed: u64, world_x: i32, world_z: i32) -> i32 {
        let coarse = Perlin::new(seed as u32);
        let fine = Perlin::new(seed.wrapping_add(1) as u32);

        let wx = world_x as f64;
        let wz = world_z as f64;
        let rolling = coarse.get([wx * 0.008, wz * 0.008]);
        let detail = fine.get([wx * 0.045, wz * 0.045]);

        let height = BASE_HEIGHT + rolling * HEIGHT_AMPLITUDE + detail * 4.0;
        (height as i32).clamp(1, CHUNK_HEIGHT as i32 - 1)
    }
}

impl ChunkGenerator for NoiseGenerator {
    fn generate(
        &self,
        seed: u64,
        pos: ChunkPos,
        _registry: &BlockRegistry,
    ) -> Result<ChunkColumn, GeneratorError> {
        let mut chunk = ChunkColumn::new_empty();
        let size = CHUNK_SIZE as i32;

        for local_z in 0..CHUNK_SIZE {
            for local_x in 0..CHUNK_SIZE {
                let world_x = pos.x * size + local_x as i32;
                let world_z = pos.z * size + local_z as i32;
                let surface = Self::surface_height(seed, world_x, world_z);

                for y in 0..CHUNK_HEIGHT as i32 {
                    let block = if y == 0 {
                        BlockId::KEELSTONE
                    } else if y < surface - SOIL_DEPTH {
                        BlockId::GRANITE
                    } else if y < surface {
                        BlockId::SOIL
                    } else if y == surface {
                        if surface > SNOW_LINE {
                            BlockId::SNOW_CAP
                        } else if surface <= SEA_LEVEL + 1 {
                            BlockId::SHORE_SAND
                        } else {
                            BlockId::MEADOW_TURF
                        }
                    } else if y <= SEA_LEVEL {
                        BlockId::STILL_WATER
                    } else {
                        continue;
                    };

                    chunk.set(
                        LocalPos {
                            x: local_x as u8,
                            y: y as u8,
                            z: local_z as u8,
                        },
                        block,
                    );
                }
            }
        }

        Ok(chunk)
    }
}
