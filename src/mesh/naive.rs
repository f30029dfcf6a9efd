//! Naive (unmerged) mesher: one quad per visible voxel face. Used as
//! the oracle the greedy mesher's quad count is checked against (§8 S3)
//! and grounded on the same `ChunkSystem.cpp` fallback path the
//! reference engine keeps for debugging mesh artifacts.

use crate::chunk::Chunk;
use crate::coord::CHUNK_SIZE;
use crate::grid::ChunkGrid;
use crate::palette::VoxelPalette;

use super::mask;
use super::{cross, MeshOutput, ScanPass};

/// Builds the complete mesh for one chunk with no face merging.
pub fn mesh_chunk(grid: &ChunkGrid, chunk: &Chunk, palette: &VoxelPalette) -> MeshOutput {
    let mut output = MeshOutput::new(chunk.position());

    for pass in ScanPass::ALL {
        for slice in 0..pass.slice_count(chunk.highest_point()) {
            let slice_mask = mask::build_slice(grid, chunk, palette, pass, slice);
            for v in 0..CHUNK_SIZE {
                for u in 0..CHUNK_SIZE {
                    if let Some(cell) = slice_mask[(v * CHUNK_SIZE + u) as usize] {
                        mask::emit_quad(&mut output, pass, slice, u, v, 1, 1, cell, palette);
                    }
                }
            }
        }
    }

    cross::mesh_details(chunk, palette, &mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::CommonVoxel;
    use glam::IVec3;

    #[test]
    fn single_exposed_voxel_has_six_faces() {
        let grid = ChunkGrid::new(1);
        let palette = VoxelPalette::default();
        let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();
        grid.with_chunk_mut(IVec3::ZERO, |chunk| {
            chunk.set_voxel_q(IVec3::new(16, 16, 16), stone);
            crate::chunk::recompute_highest_point(chunk);
        });

        let output = grid.with_chunk(IVec3::ZERO, |chunk| mesh_chunk(&grid, chunk, &palette));
        // 6 faces * 2 triangles * 3 indices.
        assert_eq!(output.solid_indices.len(), 36);
    }
}
