//! Shared slice-mask construction and quad emission used by both the
//! greedy and naive mesher (§4.E).

use glam::{IVec3, Vec3};

use crate::chunk::Chunk;
use crate::grid::ChunkGrid;
use crate::palette::{MeshStyle, VoxelPalette, VoxelType, AIR_ID};

use super::{ao::corner_ao, MeshOutput, ScanPass, Triangle, TEXTURE_TILE_COUNT};

/// One populated cell of a slice mask. An absent face is represented
/// by `None` at the call site (§9: explicit sum type, not a boolean
/// flag plus sentinel values). Equality is structural over every field
/// here, which is exactly the set of things that must match for two
/// adjacent cells to be merged into one quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskCell {
    pub voxel_id: u8,
    pub tile_index: u16,
    pub ao: [u8; 4],
}

fn is_solid(kind: VoxelType) -> bool {
    matches!(kind, VoxelType::Solid)
}

/// §4.E quad-visibility rule: populated iff exactly one side is solid,
/// or the opposite side is non-solid and distinct from the source.
fn quad_visible(source_id: u8, neighbour_id: u8, palette: &VoxelPalette) -> bool {
    let source = palette.descriptor_of(source_id);
    if source.style != MeshStyle::Voxel {
        return false;
    }
    let neighbour = palette.descriptor_of(neighbour_id);
    let source_solid = is_solid(source.kind);
    let neighbour_solid = is_solid(neighbour.kind);
    (source_solid != neighbour_solid) || (!neighbour_solid && source_id != neighbour_id)
}

fn local_at(pass: ScanPass, slice: i32, u: i32, v: i32) -> IVec3 {
    let (u_axis, v_axis) = pass.tangent_axes();
    let mut local = IVec3::ZERO;
    local[pass.axis] = slice;
    local[u_axis] = u;
    local[v_axis] = v;
    local
}

/// Reads a voxel id at `local`, following into the neighbouring chunk
/// through the grid when `local` falls outside `[0, ChunkSize)`.
fn read_voxel(grid: &ChunkGrid, chunk: &Chunk, local: IVec3) -> u8 {
    use crate::coord::CHUNK_SIZE;
    if (0..CHUNK_SIZE).contains(&local.x)
        && (0..CHUNK_SIZE).contains(&local.y)
        && (0..CHUNK_SIZE).contains(&local.z)
    {
        chunk.get_voxel_q(local)
    } else {
        grid.global_voxel(crate::coord::global_from_local(local, chunk.position()))
    }
}

/// Builds the mask for one slice of one scan pass. Cross-style voxels
/// never populate a mask cell; they are meshed separately by
/// `mesh::cross`.
pub fn build_slice(
    grid: &ChunkGrid,
    chunk: &Chunk,
    palette: &VoxelPalette,
    pass: ScanPass,
    slice: i32,
) -> Vec<Option<MaskCell>> {
    use crate::coord::CHUNK_SIZE;

    let mut mask = vec![None; (CHUNK_SIZE * CHUNK_SIZE) as usize];

    for v in 0..CHUNK_SIZE {
        for u in 0..CHUNK_SIZE {
            let local = local_at(pass, slice, u, v);
            let source_id = read_voxel(grid, chunk, local);
            if source_id == AIR_ID {
                continue;
            }

            let descriptor = palette.descriptor_of(source_id);
            if descriptor.style != MeshStyle::Voxel {
                continue;
            }

            let neighbour_local = local + pass.normal();
            let neighbour_id = read_voxel(grid, chunk, neighbour_local);
            if !quad_visible(source_id, neighbour_id, palette) {
                continue;
            }

            let (u_axis, v_axis) = pass.tangent_axes();
            let ao = corner_ao(grid, chunk.position() * crate::coord::CHUNK_SIZE, neighbour_local, u_axis, v_axis, palette);

            mask[(v * CHUNK_SIZE + u) as usize] = Some(MaskCell {
                voxel_id: source_id,
                tile_index: descriptor.tile_ids[pass.direction().index()],
                ao,
            });
        }
    }

    mask
}

fn vertical_offset(voxel_id: u8, palette: &VoxelPalette) -> f32 {
    if palette.descriptor_of(voxel_id).kind == VoxelType::Liquid {
        0.1
    } else {
        0.0
    }
}

/// Appends one quad (merged or 1x1) to `output`, including its indices,
/// vertex data, and - for water - its transparency-sort triangles.
pub fn emit_quad(
    output: &mut MeshOutput,
    pass: ScanPass,
    slice: i32,
    u0: i32,
    v0: i32,
    width: i32,
    height: i32,
    cell: MaskCell,
    palette: &VoxelPalette,
) {
    let (u_axis, v_axis) = pass.tangent_axes();
    let plane_coord = if pass.backface { slice } else { slice + 1 } as f32;
    let offset = vertical_offset(cell.voxel_id, palette);

    let mut corner = |u: i32, v: i32| -> Vec3 {
        let mut p = Vec3::ZERO;
        p[pass.axis] = plane_coord - if pass.axis == 1 { offset } else { 0.0 };
        p[u_axis] = u as f32;
        p[v_axis] = v as f32;
        p
    };

    // Order matches ao.rs's corner_ao: (-,-), (+,-), (-,+), (+,+).
    let corners = if pass.backface {
        [
            corner(u0 + width, v0),
            corner(u0, v0),
            corner(u0 + width, v0 + height),
            corner(u0, v0 + height),
        ]
    } else {
        [
            corner(u0, v0),
            corner(u0 + width, v0),
            corner(u0, v0 + height),
            corner(u0 + width, v0 + height),
        ]
    };

    let normal = pass.normal().as_vec3();
    let tile_size = 1.0 / TEXTURE_TILE_COUNT as f32;
    let col = (cell.tile_index as u32 % TEXTURE_TILE_COUNT) as f32;
    let row = (cell.tile_index as u32 / TEXTURE_TILE_COUNT) as f32;
    let tile_u = col * tile_size;
    let tile_v = row * tile_size;

    let uvs = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(width as f32, 0.0, 0.0),
        Vec3::new(0.0, height as f32, 0.0),
        Vec3::new(width as f32, height as f32, 0.0),
    ];

    let base_index = output.vertex_count() as u32;
    for i in 0..4 {
        let ao_factor = super::ao_shading_factor(cell.ao[i]);
        let p = corners[i];
        output.vertex_data.extend_from_slice(&[
            p.x, p.y, p.z,
            tile_u, tile_v,
            1.0,
            ao_factor,
            normal.x, normal.y, normal.z,
            uvs[i].x, uvs[i].y,
        ]);
    }

    // Tri split chosen by AO to keep the bilinear gradient smooth across
    // whichever diagonal has the flatter combined AO.
    let indices: [u32; 6] = if cell.ao[2] as u32 + cell.ao[1] as u32 < cell.ao[0] as u32 + cell.ao[3] as u32 {
        [3, 0, 1, 2, 0, 3]
    } else {
        [2, 0, 1, 1, 3, 2]
    };
    let indices: Vec<u32> = indices.iter().map(|i| base_index + i).collect();

    let descriptor = palette.descriptor_of(cell.voxel_id);
    if descriptor.kind == VoxelType::Liquid {
        output.water_indices.extend_from_slice(&indices);
        output.triangles.push(Triangle {
            indices: [indices[0], indices[1], indices[2]],
            normal,
            sort_value: 0.0,
        });
        output.triangles.push(Triangle {
            indices: [indices[3], indices[4], indices[5]],
            normal,
            sort_value: 0.0,
        });
    } else {
        output.solid_indices.extend_from_slice(&indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::grid::ChunkGrid;
    use crate::palette::{CommonVoxel, VoxelPalette};

    #[test]
    fn quad_visible_between_solid_and_air() {
        let palette = VoxelPalette::default();
        let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();
        let air = palette.id_of_common(CommonVoxel::Air).unwrap();
        assert!(quad_visible(stone, air, &palette));
        assert!(!quad_visible(stone, stone, &palette));
    }

    #[test]
    fn quad_visible_between_distinct_liquids_and_gases() {
        let palette = VoxelPalette::default();
        let water = palette.id_of_common(CommonVoxel::Water).unwrap();
        let air = palette.id_of_common(CommonVoxel::Air).unwrap();
        // water (liquid, non-solid) next to air (gas, non-solid) but
        // distinct ids -> visible.
        assert!(quad_visible(water, air, &palette));
        assert!(!quad_visible(air, air, &palette));
    }

    #[test]
    fn cross_style_source_never_emits_a_quad() {
        let palette = VoxelPalette::default();
        let detail = palette.id_of("short_grass01").unwrap();
        let air = palette.id_of_common(CommonVoxel::Air).unwrap();
        assert!(!quad_visible(detail, air, &palette));
    }

    #[test]
    fn build_slice_empty_chunk_has_no_populated_cells() {
        let grid = ChunkGrid::new(2);
        let chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let pass = ScanPass { axis: 1, backface: false };
        let mask = build_slice(&grid, &chunk, &palette, pass, 0);
        assert!(mask.iter().all(|c| c.is_none()));
    }

    #[test]
    fn build_slice_surface_voxel_is_visible_against_air_above() {
        let grid = ChunkGrid::new(2);
        let mut chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();
        chunk.set_voxel_q(IVec3::new(5, 0, 5), stone);
        let pass = ScanPass { axis: 1, backface: false };
        let mask = build_slice(&grid, &chunk, &palette, pass, 0);
        assert!(mask[(5 * crate::coord::CHUNK_SIZE + 5) as usize].is_some());
    }
}
