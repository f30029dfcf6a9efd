//! The fixed `ChunksPerSide^3` chunk grid.
//!
//! Grounded on the reference engine's `ChunkManager.hpp`/`.cpp`: all
//! chunks are pre-allocated at construction (no dynamic insertion), a
//! reserved error chunk is returned for out-of-range lookups, and
//! `ensure_neighbours` is kept as an explicit no-op reserved hook rather
//! than dropped, since multiple call sites in the reference source
//! depend on it existing as an interface method.

use glam::IVec3;
use parking_lot::Mutex;

use crate::chunk::Chunk;
use crate::palette::OUT_OF_BOUNDS_ID;

/// The fixed cube of chunks. Owns every `Chunk` exclusively; callers
/// never hold a chunk beyond the scope of a lock acquisition.
pub struct ChunkGrid {
    chunks_per_side: i32,
    chunks: Mutex<Vec<Chunk>>,
    error_chunk: Chunk,
}

fn position_to_index(pos: IVec3, chunks_per_side: i32) -> i64 {
    pos.x as i64
        + chunks_per_side as i64 * (pos.y as i64 + chunks_per_side as i64 * pos.z as i64)
}

impl ChunkGrid {
    pub fn new(chunks_per_side: u32) -> Self {
        let side = chunks_per_side as i32;
        let mut chunks = Vec::with_capacity((side * side * side) as usize);
        for z in 0..side {
            for y in 0..side {
                for x in 0..side {
                    chunks.push(Chunk::new(IVec3::new(x, y, z)));
                }
            }
        }
        Self {
            chunks_per_side: side,
            chunks: Mutex::new(chunks),
            error_chunk: Chunk::new(IVec3::ZERO),
        }
    }

    pub fn chunks_per_side(&self) -> u32 {
        self.chunks_per_side as u32
    }

    fn index_in_range(&self, index: i64) -> Option<usize> {
        let max = self.chunks_per_side as i64 * self.chunks_per_side as i64 * self.chunks_per_side as i64;
        if index >= 0 && index < max {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Runs `f` with read access to the chunk at `pos`, or with the
    /// reserved error chunk if `pos` is out of range.
    ///
    /// The chunk is cloned out from under the grid's lock before `f`
    /// runs, so the lock is never held while `f` executes. This matters
    /// because `f` (meshing in particular) typically reads neighbouring
    /// chunks through `global_voxel`, which takes the same lock - held
    /// across `f`, that second acquisition would deadlock.
    pub fn with_chunk<R>(&self, pos: IVec3, f: impl FnOnce(&Chunk) -> R) -> R {
        let index = position_to_index(pos, self.chunks_per_side);
        let chunk = match self.index_in_range(index) {
            Some(i) => self.chunks.lock()[i].clone(),
            None => self.error_chunk.clone(),
        };
        f(&chunk)
    }

    /// Runs `f` with mutable access to the chunk at `pos`. Returns
    /// `None` if `pos` is out of range (the error chunk is never
    /// mutated).
    pub fn with_chunk_mut<R>(&self, pos: IVec3, f: impl FnOnce(&mut Chunk) -> R) -> Option<R> {
        let index = position_to_index(pos, self.chunks_per_side);
        self.index_in_range(index)
            .map(|i| f(&mut self.chunks.lock()[i]))
    }

    pub fn has_chunk(&self, pos: IVec3) -> bool {
        let index = position_to_index(pos, self.chunks_per_side);
        match self.index_in_range(index) {
            Some(i) => !self.chunks.lock()[i].is_empty(),
            None => false,
        }
    }

    pub fn has_neighbours(&self, pos: IVec3) -> bool {
        self.has_chunk(pos)
            && self.has_chunk(pos + IVec3::Y)
            && self.has_chunk(pos - IVec3::Y)
            && self.has_chunk(pos - IVec3::X)
            && self.has_chunk(pos + IVec3::X)
            && self.has_chunk(pos - IVec3::Z)
            && self.has_chunk(pos + IVec3::Z)
    }

    /// Reserved hook for a future streaming loader. The full grid is
    /// pre-allocated up front, so there is nothing to load lazily today;
    /// kept as an explicit no-op rather than removed, matching the
    /// reference source where this is called from multiple sites but
    /// its body is empty.
    pub fn ensure_neighbours(&self, _pos: IVec3) {}

    /// World-space voxel lookup: resolves the owning chunk then the
    /// local voxel within it. Returns [`OUT_OF_BOUNDS_ID`] if the chunk
    /// is absent.
    pub fn global_voxel(&self, world_pos: IVec3) -> u8 {
        let chunk_pos = crate::coord::voxel_to_chunk(world_pos);
        let local = crate::coord::to_local(world_pos);
        let index = position_to_index(chunk_pos, self.chunks_per_side);
        match self.index_in_range(index) {
            Some(i) => self.chunks.lock()[i].get_voxel_q(local),
            None => OUT_OF_BOUNDS_ID,
        }
    }

    /// World-space voxel write via the quick setter on the owning
    /// chunk, followed by the (no-op) neighbour-loading hook.
    pub fn set_global_voxel(&self, world_pos: IVec3, id: u8) {
        let chunk_pos = crate::coord::voxel_to_chunk(world_pos);
        let local = crate::coord::to_local(world_pos);
        if self.with_chunk_mut(chunk_pos, |c| c.set_voxel_q(local, id)).is_some() {
            self.ensure_neighbours(chunk_pos);
        }
    }
}
