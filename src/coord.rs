//! Pure coordinate conversions between world, chunk, and local voxel space.
//!
//! Ported from the reference engine's `Coordinate.cpp`: floored division
//! for negative coordinates, a simple row-major local index, and the
//! position hash used when chunks are keyed by a hash map rather than a
//! linear grid.

use glam::{IVec3, Vec3};

pub const CHUNK_SIZE: i32 = 32;
pub const CHUNK_AREA: i32 = CHUNK_SIZE * CHUNK_SIZE;
pub const CHUNK_VOLUME: i32 = CHUNK_AREA * CHUNK_SIZE;

/// Index of a local voxel position within a chunk's flat storage array.
///
/// Storage order is `y * ChunkArea + z * ChunkSize + x`, not the more
/// common `x + y*Size + z*Size^2` - this must match exactly for RLE runs
/// to line up with the reference wire format.
pub fn local_index(local: IVec3) -> i32 {
    local.y * CHUNK_AREA + local.z * CHUNK_SIZE + local.x
}

/// Inverse of [`local_index`].
pub fn index_to_local(index: i32) -> IVec3 {
    let y = index / CHUNK_AREA;
    let rem = index % CHUNK_AREA;
    let z = rem / CHUNK_SIZE;
    let x = rem % CHUNK_SIZE;
    IVec3::new(x, y, z)
}

/// Floored integer division, so `-1 / 32 == -1` rather than `0`.
fn floor_div(value: i32, size: i32) -> i32 {
    if value < 0 {
        (value - size + 1) / size
    } else {
        value / size
    }
}

/// World-space voxel position to the chunk position that owns it.
pub fn voxel_to_chunk(voxel: IVec3) -> IVec3 {
    IVec3::new(
        floor_div(voxel.x, CHUNK_SIZE),
        floor_div(voxel.y, CHUNK_SIZE),
        floor_div(voxel.z, CHUNK_SIZE),
    )
}

/// World-space voxel position to its local position within its chunk.
///
/// Always non-negative regardless of sign of the input.
pub fn to_local(voxel: IVec3) -> IVec3 {
    let wrap = |v: i32| (CHUNK_SIZE + v.rem_euclid(CHUNK_SIZE)) % CHUNK_SIZE;
    IVec3::new(wrap(voxel.x), wrap(voxel.y), wrap(voxel.z))
}

/// Local voxel position plus the chunk it lives in, back to world space.
pub fn global_from_local(local: IVec3, chunk_pos: IVec3) -> IVec3 {
    chunk_pos * CHUNK_SIZE + local
}

/// Floating-point world position to the voxel it occupies (component floor).
pub fn to_voxel_position(world: Vec3) -> IVec3 {
    IVec3::new(
        world.x.floor() as i32,
        world.y.floor() as i32,
        world.z.floor() as i32,
    )
}

/// Floating-point world position directly to chunk position.
pub fn world_to_chunk(world: Vec3) -> IVec3 {
    voxel_to_chunk(to_voxel_position(world))
}

/// Hash used when a `HashMap<IVec3, _>` of chunks is preferred over the
/// linear grid. Matches the reference engine's `PositionHash`.
pub fn position_hash(position: IVec3) -> i64 {
    (position.x as i64 * 88339) ^ (position.z as i64 * 91967) ^ (position.z as i64 * 126323)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_floor_scenario() {
        // S2: voxelToChunk((-1, 0, 33)) with ChunkSize=32 yields (-1, 0, 1).
        let chunk = voxel_to_chunk(IVec3::new(-1, 0, 33));
        assert_eq!(chunk, IVec3::new(-1, 0, 1));

        let local = to_local(IVec3::new(-1, 0, 33));
        assert_eq!(local, IVec3::new(31, 0, 1));
    }

    #[test]
    fn local_index_is_bijective_over_chunk_volume() {
        let mut seen = vec![false; CHUNK_VOLUME as usize];
        for y in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let idx = local_index(IVec3::new(x, y, z));
                    assert!(idx >= 0 && idx < CHUNK_VOLUME);
                    assert!(!seen[idx as usize], "duplicate index {idx}");
                    seen[idx as usize] = true;
                    assert_eq!(index_to_local(idx), IVec3::new(x, y, z));
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn global_from_local_round_trips() {
        let chunk_pos = IVec3::new(-2, 0, 3);
        let local = IVec3::new(5, 10, 15);
        let global = global_from_local(local, chunk_pos);
        assert_eq!(voxel_to_chunk(global), chunk_pos);
        assert_eq!(to_local(global), local);
    }

    #[test]
    fn positive_positions_match_plain_division() {
        assert_eq!(voxel_to_chunk(IVec3::new(65, 0, 0)), IVec3::new(2, 0, 0));
        assert_eq!(to_local(IVec3::new(65, 0, 0)), IVec3::new(1, 0, 0));
    }
}
