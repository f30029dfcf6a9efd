//! Per-vertex ambient occlusion (§4.E).

use glam::IVec3;

use crate::grid::ChunkGrid;
use crate::palette::{VoxelPalette, AIR_ID, OUT_OF_BOUNDS_ID};

/// A neighbour occludes AO iff it is not air, not out-of-bounds, and
/// not a detail block.
fn occludes(voxel_id: u8, palette: &VoxelPalette) -> bool {
    if voxel_id == AIR_ID || voxel_id == OUT_OF_BOUNDS_ID {
        return false;
    }
    palette.descriptor_of(voxel_id).kind != crate::palette::VoxelType::Detail
}

/// Computes the four AO corner levels (each in `{0,1,2,3}`) for the
/// face whose outward cell (the voxel beyond the boundary, on the
/// occluder side) is at `outward_cell`, spanning tangent axes `u_axis`
/// and `v_axis`.
///
/// Corner order is `[(-,-), (+,-), (-,+), (+,+)]` in `(u, v)`, matching
/// the quad corner order used by the mesher's emission code.
pub fn corner_ao(
    grid: &ChunkGrid,
    chunk_origin: IVec3,
    outward_cell: IVec3,
    u_axis: usize,
    v_axis: usize,
    palette: &VoxelPalette,
) -> [u8; 4] {
    let mut unit_u = IVec3::ZERO;
    unit_u[u_axis] = 1;
    let mut unit_v = IVec3::ZERO;
    unit_v[v_axis] = 1;

    let sample = |offset: IVec3| -> bool {
        occludes(grid.global_voxel(chunk_origin + outward_cell + offset), palette)
    };

    let mut levels = [0u8; 4];
    for (i, (su, sv)) in [(-1, -1), (1, -1), (-1, 1), (1, 1)].into_iter().enumerate() {
        let side1 = sample(unit_u * su);
        let side2 = sample(unit_v * sv);
        let corner = sample(unit_u * su + unit_v * sv);
        levels[i] = vertex_ao(side1, side2, corner);
    }
    levels
}

fn vertex_ao(side1: bool, side2: bool, corner: bool) -> u8 {
    if side1 && side2 {
        0
    } else {
        3 - (side1 as u8 + side2 as u8 + corner as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_open_corner_is_fully_lit() {
        assert_eq!(vertex_ao(false, false, false), 3);
    }

    #[test]
    fn both_sides_occluded_is_fully_dark_regardless_of_corner() {
        assert_eq!(vertex_ao(true, true, false), 0);
        assert_eq!(vertex_ao(true, true, true), 0);
    }

    #[test]
    fn single_corner_occluder_drops_one_level() {
        // S5: one side and no corner occluder -> 3 - (0+0+1) = 2.
        assert_eq!(vertex_ao(false, false, true), 2);
    }

    #[test]
    fn single_side_occluder_drops_one_level() {
        assert_eq!(vertex_ao(true, false, false), 2);
    }
}
