//! Cross-style ("billboard") detail voxels: grass tufts and similar
//! decoration meshed as two crossed unit quads instead of a full cube
//! (§4.E). Grounded on the reference engine's detail-voxel path in
//! `ChunkSystem.cpp`, which skips these entirely in the greedy scan and
//! emits them from a dedicated pass.

use glam::{IVec3, Vec3};

use crate::chunk::Chunk;
use crate::coord::CHUNK_SIZE;
use crate::palette::{MeshStyle, VoxelPalette, AIR_ID};

use super::{MeshOutput, TEXTURE_TILE_COUNT};

/// A single detail voxel's chunk-local position and texture tile.
#[derive(Debug, Clone, Copy)]
struct DetailEntry {
    local: IVec3,
    tile_index: u16,
}

fn find_details(chunk: &Chunk, palette: &VoxelPalette) -> Vec<DetailEntry> {
    let mut entries = Vec::new();
    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let local = IVec3::new(x, y, z);
                let id = chunk.get_voxel_q(local);
                if id == AIR_ID {
                    continue;
                }
                let descriptor = palette.descriptor_of(id);
                if descriptor.style == MeshStyle::Cross {
                    entries.push(DetailEntry {
                        local,
                        tile_index: descriptor.tile_ids[0],
                    });
                }
            }
        }
    }
    entries
}

/// Appends the two-quad X-shaped billboard for every Cross-style voxel
/// in `chunk` to `output`.
pub fn mesh_details(chunk: &Chunk, palette: &VoxelPalette, output: &mut MeshOutput) {
    for entry in find_details(chunk, palette) {
        emit_billboard(output, entry);
    }
}

fn emit_billboard(output: &mut MeshOutput, entry: DetailEntry) {
    // Corner-anchored at the voxel's integer minimum corner, spanning
    // 0.7 units in XZ, then the whole cross is shifted by (0.15, -0.15).
    let position = Vec3::new(entry.local.x as f32, entry.local.y as f32, entry.local.z as f32);
    let shift = Vec3::new(0.15, 0.0, -0.15);
    const SPAN: f32 = 0.7;

    let tile_size = 1.0 / TEXTURE_TILE_COUNT as f32;
    let col = (entry.tile_index as u32 % TEXTURE_TILE_COUNT) as f32;
    let row = (entry.tile_index as u32 / TEXTURE_TILE_COUNT) as f32;
    let tile_u = col * tile_size;
    let tile_v = row * tile_size;
    let normal = Vec3::Y;
    let ao_factor = 1.0;

    let quads = [
        [
            position + Vec3::new(0.0, 0.0, 0.0) + shift,
            position + Vec3::new(SPAN, 0.0, SPAN) + shift,
            position + Vec3::new(0.0, 1.0, 0.0) + shift,
            position + Vec3::new(SPAN, 1.0, SPAN) + shift,
        ],
        [
            position + Vec3::new(0.0, 0.0, SPAN) + shift,
            position + Vec3::new(SPAN, 0.0, 0.0) + shift,
            position + Vec3::new(0.0, 1.0, SPAN) + shift,
            position + Vec3::new(SPAN, 1.0, 0.0) + shift,
        ],
    ];

    let uvs = [(0.0, 1.0), (1.0, 1.0), (0.0, 0.0), (1.0, 0.0)];
    for quad in quads {
        let base_index = output.vertex_count() as u32;
        for (i, p) in quad.iter().enumerate() {
            output.vertex_data.extend_from_slice(&[
                p.x, p.y, p.z,
                tile_u, tile_v,
                1.0,
                ao_factor,
                normal.x, normal.y, normal.z,
                uvs[i].0, uvs[i].1,
            ]);
        }
        // Both faces of the cross are double-sided via two opposite
        // winding triangle pairs so they read from either side.
        let front = [2u32, 0, 1, 1, 3, 2].map(|i| base_index + i);
        let back = [1u32, 0, 2, 2, 3, 1].map(|i| base_index + i);
        output.detail_indices.extend_from_slice(&front);
        output.detail_indices.extend_from_slice(&back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::CommonVoxel;

    #[test]
    fn chunk_with_no_detail_voxels_yields_no_entries() {
        let chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        assert!(find_details(&chunk, &palette).is_empty());
    }

    #[test]
    fn single_detail_voxel_is_found_once() {
        let mut chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let grass_tuft = palette.id_of("short_grass01").unwrap();
        chunk.set_voxel_q(IVec3::new(3, 4, 5), grass_tuft);
        let entries = find_details(&chunk, &palette);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].local, IVec3::new(3, 4, 5));
    }

    #[test]
    fn solid_voxels_are_not_treated_as_details() {
        let mut chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();
        chunk.set_voxel_q(IVec3::new(0, 0, 0), stone);
        assert!(find_details(&chunk, &palette).is_empty());
    }

    #[test]
    fn billboard_is_corner_anchored_and_shifted() {
        let mut chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let grass_tuft = palette.id_of("short_grass01").unwrap();
        chunk.set_voxel_q(IVec3::new(2, 0, 3), grass_tuft);
        let mut output = MeshOutput::new(IVec3::ZERO);
        mesh_details(&chunk, &palette, &mut output);

        // First vertex of the first quad is the voxel's minimum corner
        // shifted by (0.15, 0, -0.15), not centred on the voxel.
        let first = &output.vertex_data[0..3];
        assert_eq!(first, [2.0 + 0.15, 0.0, 3.0 - 0.15]);

        // The opposite corner of that same quad is 0.7 units away in XZ.
        let opposite = &output.vertex_data[12..15];
        assert_eq!(opposite, [2.0 + 0.7 + 0.15, 0.0, 3.0 + 0.7 - 0.15]);
    }

    #[test]
    fn mesh_details_emits_two_quads_worth_of_indices() {
        let mut chunk = Chunk::new(IVec3::ZERO);
        let palette = VoxelPalette::default();
        let grass_tuft = palette.id_of("short_grass01").unwrap();
        chunk.set_voxel_q(IVec3::new(1, 1, 1), grass_tuft);
        let mut output = MeshOutput::new(IVec3::ZERO);
        mesh_details(&chunk, &palette, &mut output);
        // 2 quads * 2 winding passes * 6 indices.
        assert_eq!(output.detail_indices.len(), 24);
        assert_eq!(output.vertex_count(), 8);
    }
}
