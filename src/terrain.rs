//! Terrain generator: two layered simplex-noise octave stacks combine
//! into a per-column heightmap, then a fixed fill-rule table writes
//! water/sand/grass/dirt/stone into a chunk.
//!
//! Ported from the reference engine's `TerrainGen.cpp`. Two literal
//! quirks of the source are reproduced rather than "fixed":
//! - the per-octave noise remap is `noise + 1.0/2.0`, which is
//!   `noise + 0.5` under the source's own operator precedence, not
//!   `(noise + 1.0) * 0.5`;
//! - the island falloff is applied as two separate multiplications
//!   (`bump(x)*bump(y)*0.9`, then `* 1.25` by the caller) rather than a
//!   single collapsed constant, keeping the two knobs independently
//!   tunable as in the source.

use glam::IVec3;
use noise::{NoiseFn, Simplex};
use once_cell::sync::Lazy;

use crate::chunk::{recompute_highest_point, Chunk};
use crate::coord::CHUNK_SIZE;
use crate::grid::ChunkGrid;
use crate::palette::{CommonVoxel, VoxelPalette};

static SIMPLEX: Lazy<Simplex> = Lazy::new(|| Simplex::new(0));

/// One octave-stack's tuning knobs (§4.D).
#[derive(Debug, Clone, Copy)]
pub struct NoiseOptions {
    pub amplitude: f64,
    pub octaves: u32,
    pub smoothness: f64,
    pub roughness: f64,
    pub offset: f64,
}

pub const NOISE_A: NoiseOptions = NoiseOptions {
    amplitude: 105.0,
    octaves: 6,
    smoothness: 205.0,
    roughness: 0.58,
    offset: 18.0,
};

pub const NOISE_B: NoiseOptions = NoiseOptions {
    amplitude: 20.0,
    octaves: 4,
    smoothness: 200.0,
    roughness: 0.45,
    offset: 0.0,
};

pub const WATER_LEVEL: i32 = 24;

/// Island falloff: goes to zero at the edge of the world, peaks near
/// the centre. `coord` is normalised to roughly `[-1, 1]` by the caller.
fn bump(t: f64) -> f64 {
    (1.0 - t.powi(6)).max(0.0)
}

fn rounded(coord_x: f64, coord_y: f64) -> f64 {
    bump(coord_x) * bump(coord_y) * 0.9
}

/// Normalises a world-space voxel coordinate to roughly `[-1, 1]`,
/// centred on the grid rather than anchored at its corner:
/// `(coord - worldSize/2) / worldSize * 2`.
fn normalize_to_world(voxel_coord: f64, chunks_per_side: u32) -> f64 {
    let world_size = chunks_per_side as f64 * CHUNK_SIZE as f64;
    (voxel_coord - world_size / 2.0) / world_size * 2.0
}

/// Normalised per-octave-stack noise sample for a single (x, z) column.
fn noise_at(voxel_xz: (f64, f64), chunk_xz: (f64, f64), options: &NoiseOptions, seed: f64) -> f64 {
    let mut value = 0.0;
    let mut accumulated = 0.0;

    for i in 0..options.octaves {
        let freq = 2f64.powi(i as i32);
        let amplitude = options.roughness.powi(i as i32);

        let coord_x = (voxel_xz.0 + chunk_xz.0 * CHUNK_SIZE as f64) * freq / options.smoothness;
        let coord_y = (voxel_xz.1 + chunk_xz.1 * CHUNK_SIZE as f64) * freq / options.smoothness;

        let mut sample = SIMPLEX.get([seed + coord_x, seed + coord_y, seed]);
        sample += 1.0 / 2.0; // literal: `noise + 0.5`, see module docs.

        value += sample * amplitude;
        accumulated += amplitude;
    }

    value / accumulated
}

/// Builds the `ChunkArea`-sized heightmap for the chunk column at
/// `(chunk_x, chunk_z)`. Purely functional with respect to `(chunk_x,
/// chunk_z, seed, chunks_per_side)` - `chunks_per_side` sets the world
/// size the island falloff is normalised against.
pub fn create_chunk_heightmap(chunk_x: i32, chunk_z: i32, seed: u64, chunks_per_side: u32) -> Vec<i32> {
    let seed = seed as f64;
    let chunk_xz = (chunk_x as f64, chunk_z as f64);

    let mut heightmap = Vec::with_capacity((CHUNK_SIZE * CHUNK_SIZE) as usize);
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            let voxel_xz = (x as f64, z as f64);

            let noise0 = noise_at(voxel_xz, chunk_xz, &NOISE_A, seed);
            let noise1 = noise_at(voxel_xz, chunk_xz, &NOISE_B, seed);
            let result = noise0 * noise1;

            // Normalised column position in [-1, 1], used only by the
            // island falloff, centred on the world rather than its
            // corner.
            let voxel_x = chunk_x as f64 * CHUNK_SIZE as f64 + x as f64;
            let voxel_z = chunk_z as f64 * CHUNK_SIZE as f64 + z as f64;
            let norm_x = normalize_to_world(voxel_x, chunks_per_side);
            let norm_z = normalize_to_world(voxel_z, chunks_per_side);
            let island = rounded(norm_x, norm_z) * 1.25;

            let height = (result * NOISE_A.amplitude + NOISE_A.offset) * island - 5.0;
            heightmap.push(height.round() as i32);
        }
    }
    heightmap
}

/// Fills a single chunk's voxels from a heightmap, per the fixed rule
/// table in §4.D.2. Writes go through the unchecked setter; `chunk`
/// must be the chunk at vertical index `chunk_y` for this column.
pub fn fill_chunk_from_heightmap(
    chunk: &mut Chunk,
    heightmap: &[i32],
    chunk_y: i32,
    palette: &VoxelPalette,
) {
    let water = palette.id_of_common(CommonVoxel::Water).unwrap();
    let sand = palette.id_of_common(CommonVoxel::Sand).unwrap();
    let grass = palette.id_of_common(CommonVoxel::Grass).unwrap();
    let dirt = palette.id_of_common(CommonVoxel::Dirt).unwrap();
    let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();

    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            let height = heightmap[(z * CHUNK_SIZE + x) as usize];
            for local_y in 0..CHUNK_SIZE {
                let vox_y = chunk_y * CHUNK_SIZE + local_y;

                let id = if vox_y > height {
                    if vox_y < WATER_LEVEL {
                        Some(water)
                    } else {
                        None // air, already the default fill.
                    }
                } else if vox_y == height {
                    if vox_y < WATER_LEVEL + 3 {
                        Some(sand)
                    } else {
                        Some(grass)
                    }
                } else if vox_y > height - 4 {
                    Some(dirt)
                } else {
                    Some(stone)
                };

                if let Some(id) = id {
                    chunk.set_voxel_q(IVec3::new(x, local_y, z), id);
                }
            }
        }
    }
}

/// Generates every vertical chunk for the column at `(chunk_x,
/// chunk_z)`, from `y = 0` up to the column's tallest surface, and
/// inserts them into `grid`.
pub fn generate_column(
    grid: &ChunkGrid,
    chunk_x: i32,
    chunk_z: i32,
    seed: u64,
    palette: &VoxelPalette,
) {
    let heightmap = create_chunk_heightmap(chunk_x, chunk_z, seed, grid.chunks_per_side());
    let max_height = heightmap.iter().copied().max().unwrap_or(0);
    let top_chunk_y = (max_height / CHUNK_SIZE + 1).max(1);

    for chunk_y in 0..top_chunk_y {
        grid.with_chunk_mut(IVec3::new(chunk_x, chunk_y, chunk_z), |chunk| {
            fill_chunk_from_heightmap(chunk, &heightmap, chunk_y, palette);
            recompute_highest_point(chunk);
        });
        grid.ensure_neighbours(IVec3::new(chunk_x, chunk_y, chunk_z));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heightmap_has_chunk_area_entries() {
        let heightmap = create_chunk_heightmap(0, 0, 42, 4);
        assert_eq!(heightmap.len(), (CHUNK_SIZE * CHUNK_SIZE) as usize);
    }

    #[test]
    fn heightmap_is_deterministic_for_same_seed() {
        let a = create_chunk_heightmap(3, -2, 7, 4);
        let b = create_chunk_heightmap(3, -2, 7, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn heightmap_depends_on_chunks_per_side() {
        // The island falloff is normalised against world size, so the
        // same chunk position under a different grid width samples a
        // different point on the falloff curve.
        let a = create_chunk_heightmap(3, -2, 7, 4);
        let b = create_chunk_heightmap(3, -2, 7, 14);
        assert_ne!(a, b);
    }

    #[test]
    fn generate_column_populates_at_least_one_chunk() {
        let grid = ChunkGrid::new(4);
        let palette = VoxelPalette::default();
        generate_column(&grid, 0, 0, 1, &palette);
        assert!(grid.has_chunk(IVec3::new(0, 0, 0)));
    }

    #[test]
    fn fill_rule_places_stone_deep_below_surface() {
        let mut chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let heightmap = vec![20; (CHUNK_SIZE * CHUNK_SIZE) as usize];
        fill_chunk_from_heightmap(&mut chunk, &heightmap, 0, &palette);
        let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();
        assert_eq!(chunk.get_voxel_q(IVec3::new(0, 0, 0)), stone);
    }
}
