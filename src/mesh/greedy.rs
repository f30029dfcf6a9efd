//! Greedy mesher: merges runs of structurally-equal mask cells into the
//! widest/tallest quad that stays rectangular, before falling through to
//! per-vertex emission (§4.E). Grounded on the reference engine's
//! `ChunkSystem::greedyMesh`.

use crate::chunk::Chunk;
use crate::coord::CHUNK_SIZE;
use crate::grid::ChunkGrid;
use crate::palette::VoxelPalette;

use super::mask::{self, MaskCell};
use super::{cross, MeshOutput, ScanPass};

/// Builds the complete mesh for one chunk using greedy merging.
pub fn mesh_chunk(grid: &ChunkGrid, chunk: &Chunk, palette: &VoxelPalette) -> MeshOutput {
    let mut output = MeshOutput::new(chunk.position());

    for pass in ScanPass::ALL {
        for slice in 0..pass.slice_count(chunk.highest_point()) {
            let slice_mask = mask::build_slice(grid, chunk, palette, pass, slice);
            merge_and_emit(&mut output, pass, slice, slice_mask, palette);
        }
    }

    cross::mesh_details(chunk, palette, &mut output);
    output
}

/// Consumes `slice_mask` in place, emitting one quad per maximal
/// rectangle of structurally-equal cells.
fn merge_and_emit(
    output: &mut MeshOutput,
    pass: ScanPass,
    slice: i32,
    mut slice_mask: Vec<Option<MaskCell>>,
    palette: &VoxelPalette,
) {
    let size = CHUNK_SIZE;

    for v in 0..size {
        let mut u = 0;
        while u < size {
            let idx = (v * size + u) as usize;
            let Some(cell) = slice_mask[idx] else {
                u += 1;
                continue;
            };

            let mut width = 1;
            while u + width < size && slice_mask[(v * size + u + width) as usize] == Some(cell) {
                width += 1;
            }

            let mut height = 1;
            'grow: while v + height < size {
                for du in 0..width {
                    if slice_mask[((v + height) * size + u + du) as usize] != Some(cell) {
                        break 'grow;
                    }
                }
                height += 1;
            }

            for dv in 0..height {
                for du in 0..width {
                    slice_mask[((v + dv) * size + u + du) as usize] = None;
                }
            }

            mask::emit_quad(output, pass, slice, u, v, width, height, cell, palette);
            u += width;
        }
    }
}
