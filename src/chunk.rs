//! A single fixed-size cube of voxel IDs, plus run-length (de)compression
//! for network transport.
//!
//! Grounded on the reference engine's `Chunk.hpp`/`Chunk.cpp`. Unlike the
//! original, a `Chunk` here never back-references its owning grid
//! (§9 design notes) - cross-chunk lookups are the grid's job via
//! `ChunkGrid::global_voxel`.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::coord::{local_index, CHUNK_VOLUME};
use crate::error::{PipelineError, PipelineResult};
use crate::palette::AIR_ID;

/// `(voxelId, runLength)` - the unit of run-length compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlePair {
    pub id: u8,
    pub count: u16,
}

impl RlePair {
    pub fn new(id: u8, count: u16) -> Self {
        Self { id, count }
    }
}

pub type ChunkVoxels = Vec<u8>;
pub type CompressedVoxels = Vec<RlePair>;

/// A `ChunkSize^3` cube of voxel IDs.
#[derive(Debug, Clone)]
pub struct Chunk {
    position: IVec3,
    voxels: ChunkVoxels,
    /// Greatest local y holding a non-air voxel, or `-1` if the chunk is
    /// pure air. Set by the terrain generator / network deposit; never
    /// mutated automatically after that (§9 open question: exposed via
    /// [`recompute_highest_point`] but nothing calls it for callers).
    highest_point: i8,
}

impl Chunk {
    pub fn new(position: IVec3) -> Self {
        Self {
            position,
            voxels: vec![AIR_ID; CHUNK_VOLUME as usize],
            highest_point: -1,
        }
    }

    pub fn position(&self) -> IVec3 {
        self.position
    }

    pub fn voxels(&self) -> &ChunkVoxels {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut ChunkVoxels {
        &mut self.voxels
    }

    pub fn highest_point(&self) -> i8 {
        self.highest_point
    }

    pub fn set_highest_point(&mut self, value: i8) {
        self.highest_point = value;
    }

    /// A chunk with no populated voxels is indistinguishable from a
    /// reserved-but-empty slot in the grid.
    pub fn is_empty(&self) -> bool {
        self.highest_point == -1
    }

    /// Unchecked getter; caller guarantees `local` is in `[0, ChunkSize)^3`.
    pub fn get_voxel_q(&self, local: IVec3) -> u8 {
        self.voxels[local_index(local) as usize]
    }

    /// Unchecked setter; caller guarantees `local` is in `[0, ChunkSize)^3`.
    pub fn set_voxel_q(&mut self, local: IVec3, id: u8) {
        self.voxels[local_index(local) as usize] = id;
    }
}

/// Recomputes and stores `highest_point` by scanning the voxel array.
/// Not called automatically by any setter - an explicit hook for callers
/// that mutate voxels directly (tests, tools, in-process edits) and need
/// the advisory field refreshed without re-shipping the whole chunk.
pub fn recompute_highest_point(chunk: &mut Chunk) {
    let mut highest = -1i32;
    for y in (0..crate::coord::CHUNK_SIZE).rev() {
        let mut any_non_air = false;
        for z in 0..crate::coord::CHUNK_SIZE {
            for x in 0..crate::coord::CHUNK_SIZE {
                if chunk.get_voxel_q(IVec3::new(x, y, z)) != AIR_ID {
                    any_non_air = true;
                    break;
                }
            }
            if any_non_air {
                break;
            }
        }
        if any_non_air {
            highest = y;
            break;
        }
    }
    chunk.set_highest_point(highest as i8);
}

/// Run-length encodes a voxel array in its storage order. Emits exactly
/// one pair per maximal run.
pub fn compress(voxels: &ChunkVoxels) -> CompressedVoxels {
    let mut runs = CompressedVoxels::new();
    let mut iter = voxels.iter();
    let Some(&first) = iter.next() else {
        return runs;
    };
    let mut current_id = first;
    let mut count: u32 = 1;

    for &id in iter {
        if id == current_id && count < u16::MAX as u32 {
            count += 1;
        } else {
            runs.push(RlePair::new(current_id, count as u16));
            current_id = id;
            count = 1;
        }
    }
    runs.push(RlePair::new(current_id, count as u16));
    runs
}

/// Inverse of [`compress`]. Fails loudly if the run lengths do not sum
/// to exactly `ChunkVolume`.
pub fn decompress(compressed: &CompressedVoxels) -> PipelineResult<ChunkVoxels> {
    let total: u64 = compressed.iter().map(|pair| pair.count as u64).sum();
    if total != CHUNK_VOLUME as u64 {
        return Err(PipelineError::MalformedChunkPacket(format!(
            "run lengths sum to {total}, expected {CHUNK_VOLUME}"
        )));
    }

    let mut voxels = Vec::with_capacity(CHUNK_VOLUME as usize);
    for pair in compressed {
        voxels.extend(std::iter::repeat(pair.id).take(pair.count as usize));
    }
    Ok(voxels)
}
