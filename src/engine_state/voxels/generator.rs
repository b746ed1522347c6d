//! # Terrain Generation
//!
//! The chunk manager only sees terrain through [`TerrainGenerator`]: given a
//! chunk key and edge length, produce a filled chunk. Generators are shared
//! with worker threads, so they must be `Send + Sync` and deterministic.
//!
//! Two generators are provided:
//! - [`PerlinTerrainGenerator`]: heightmap terrain with caves, soil layers,
//!   sandy shores, snowy peaks and water below sea level
//! - [`FlatTerrainGenerator`]: a single block type below a fixed height, mostly
//!   useful for tests and benchmarks

use noise::{NoiseFn, Perlin};

use super::{
    block::block_type::BlockType,
    chunk::{Chunk, ChunkCreationIterator, ChunkKey},
};

/// Black-box source of chunk content.
pub trait TerrainGenerator: Send + Sync {
    /// Generates the chunk at `key` with edge length `size`.
    fn generate(&self, key: ChunkKey, size: usize) -> Chunk;
}

/// Scaling factor applied to world coordinates when sampling the heightmap.
pub const HEIGHT_SCALE_FACTOR: f64 = 0.01;
/// Scaling factor applied to world coordinates when sampling cave noise.
pub const CAVE_SCALE_FACTOR: f64 = 0.05;
/// Cave noise above this value is carved out.
pub const CAVE_THRESHOLD: f64 = 0.55;

/// Heightmap terrain built from Perlin noise.
#[derive(Clone, Debug)]
pub struct PerlinTerrainGenerator {
    height_noise: Perlin,
    cave_noise: Perlin,
    /// World Y of the water surface.
    pub sea_level: i32,
    /// Mean terrain height in world Y.
    pub base_height: f64,
    /// Peak deviation from `base_height`.
    pub amplitude: f64,
    /// Surfaces above this height are covered in snow.
    pub snow_line: i32,
}

impl PerlinTerrainGenerator {
    /// Creates a generator with the default terrain shape for `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            height_noise: Perlin::new(seed),
            cave_noise: Perlin::new(seed.wrapping_add(1)),
            sea_level: 0,
            base_height: 6.0,
            amplitude: 24.0,
            snow_line: 24,
        }
    }

    /// Surface height of the column at world `(x, z)`.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let sx = x as f64 * HEIGHT_SCALE_FACTOR;
        let sz = z as f64 * HEIGHT_SCALE_FACTOR;
        let broad = self.height_noise.get([sx, sz]);
        let detail = self.height_noise.get([sx * 4.0 + 100.0, sz * 4.0 + 100.0]);
        (self.base_height + self.amplitude * (broad + 0.25 * detail)).floor() as i32
    }

    fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        let sample = self.cave_noise.get([
            x as f64 * CAVE_SCALE_FACTOR,
            y as f64 * CAVE_SCALE_FACTOR,
            z as f64 * CAVE_SCALE_FACTOR,
        ]);
        sample > CAVE_THRESHOLD
    }

    fn block_at(&self, x: i32, y: i32, z: i32, height: i32) -> BlockType {
        if y > height {
            return if y <= self.sea_level {
                BlockType::WATER
            } else {
                BlockType::AIR
            };
        }

        let depth = height - y;
        let shore = height <= self.sea_level + 1;

        // Keep a crust so caves don't open straight into the sky or the sea.
        if depth > 3 && self.is_cave(x, y, z) {
            return BlockType::AIR;
        }

        match depth {
            0 if shore => BlockType::SAND,
            0 if height >= self.snow_line => BlockType::SNOW,
            0 => BlockType::GRASS,
            1..=3 if shore => BlockType::SAND,
            1..=3 => BlockType::DIRT,
            _ => BlockType::STONE,
        }
    }
}

impl TerrainGenerator for PerlinTerrainGenerator {
    fn generate(&self, key: ChunkKey, size: usize) -> Chunk {
        let origin = key.origin(size);
        let n = size as i32;

        let heights: Vec<i32> = (0..n)
            .flat_map(|z| (0..n).map(move |x| (x, z)))
            .map(|(x, z)| self.height_at(origin.x + x, origin.z + z))
            .collect();

        let mut cci = ChunkCreationIterator::new(key, size);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let height = heights[(i + n * k) as usize];
                    cci.push_block_type(self.block_at(origin.x + i, origin.y + j, origin.z + k, height));
                }
            }
        }
        cci.return_chunk()
    }
}

/// Fills every voxel below `ground_level` with one block type.
#[derive(Clone, Copy, Debug)]
pub struct FlatTerrainGenerator {
    /// Voxels with world Y strictly below this are filled.
    pub ground_level: i32,
    /// Fill material.
    pub block: BlockType,
}

impl FlatTerrainGenerator {
    /// Creates a flat generator.
    pub fn new(ground_level: i32, block: BlockType) -> Self {
        Self { ground_level, block }
    }
}

impl TerrainGenerator for FlatTerrainGenerator {
    fn generate(&self, key: ChunkKey, size: usize) -> Chunk {
        let origin = key.origin(size);
        let n = size as i32;

        if origin.y >= self.ground_level {
            return Chunk::empty(key, size);
        }
        if origin.y + n <= self.ground_level {
            return Chunk::filled(key, size, self.block);
        }

        let mut cci = ChunkCreationIterator::new(key, size);
        for _k in 0..n {
            for j in 0..n {
                let block = if origin.y + j < self.ground_level {
                    self.block
                } else {
                    BlockType::AIR
                };
                for _i in 0..n {
                    cci.push_block_type(block);
                }
            }
        }
        cci.return_chunk()
    }
}
