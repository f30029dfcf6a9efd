//! Mesher and worker pool (§4.E): turns chunk voxel data into GPU-ready
//! vertex/index buffers, dispatched across a fixed pool of long-lived
//! worker threads guarded by a single mutex.
//!
//! Grounded on the reference engine's `ChunkSystem.cpp`: the greedy
//! mesher, its naive oracle, the AO corner formula, the detail/Cross
//! billboard path, and the worker loop's lock/sleep/shutdown dance all
//! come from that file.

mod ao;
mod cross;
mod greedy;
mod mask;
mod naive;
mod pool;

pub use pool::{MesherHandle, WorkerPool};

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::coord::CHUNK_SIZE;
use crate::palette::Face;

/// Texture atlas layout assumed by the renderer (§6).
pub const TEXTURE_TILE_COUNT: u32 = 8;

/// Floats per emitted vertex: px,py,pz, tile_u,tile_v, w=1, ao_factor,
/// nx,ny,nz, uv_x,uv_y.
pub const VERTEX_COMPONENT_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshMode {
    Greedy,
    Naive,
}

impl Default for MeshMode {
    fn default() -> Self {
        MeshMode::Greedy
    }
}

/// AO level to shading-multiplier table (§8 property 7).
pub const AO_SHADING: [f32; 4] = [0.25, 0.6, 0.8, 1.0];

pub fn ao_shading_factor(level: u8) -> f32 {
    AO_SHADING[level.min(3) as usize]
}

/// A semi-transparent triangle kept for per-frame back-to-front sort.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub normal: Vec3,
    pub sort_value: f32,
}

/// One completed chunk's worth of render data (§4.E output struct).
#[derive(Debug, Clone, Default)]
pub struct MeshOutput {
    pub chunk_pos: IVec3,
    pub vertex_data: Vec<f32>,
    pub solid_indices: Vec<u32>,
    pub water_indices: Vec<u32>,
    pub detail_indices: Vec<u32>,
    pub triangles: Vec<Triangle>,
}

impl MeshOutput {
    pub fn new(chunk_pos: IVec3) -> Self {
        Self {
            chunk_pos,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.solid_indices.is_empty() && self.water_indices.is_empty() && self.detail_indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_data.len() / VERTEX_COMPONENT_COUNT
    }
}

/// Which of the three axes a slice scan is perpendicular to, paired
/// with whether the pass scans the "front" (+axis) or "back" (-axis)
/// facing side of the slice boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanPass {
    pub axis: usize,
    pub backface: bool,
}

impl ScanPass {
    pub const ALL: [ScanPass; 6] = [
        ScanPass { axis: 0, backface: false },
        ScanPass { axis: 0, backface: true },
        ScanPass { axis: 1, backface: false },
        ScanPass { axis: 1, backface: true },
        ScanPass { axis: 2, backface: false },
        ScanPass { axis: 2, backface: true },
    ];

    /// The named face direction this pass emits geometry for.
    pub fn direction(self) -> Face {
        match (self.axis, self.backface) {
            (0, false) => Face::East,
            (0, true) => Face::West,
            (1, false) => Face::Top,
            (1, true) => Face::Bottom,
            (2, false) => Face::North,
            (2, true) => Face::South,
            _ => unreachable!(),
        }
    }

    /// Unit vector pointing from the source voxel toward the neighbour
    /// that would occlude this face.
    pub fn normal(self) -> IVec3 {
        let mut v = IVec3::ZERO;
        v[self.axis] = if self.backface { -1 } else { 1 };
        v
    }

    /// The two tangent axes spanning the scan plane, in `(u, v)` order.
    pub fn tangent_axes(self) -> (usize, usize) {
        match self.axis {
            0 => (2, 1), // East/West: u=z, v=y
            1 => (0, 2), // Top/Bottom: u=x, v=z
            2 => (0, 1), // North/South: u=x, v=y
            _ => unreachable!(),
        }
    }

    /// Upper bound of the slice index along this pass's axis, honouring
    /// the vertical short-circuit at `highest_point + 1`.
    pub fn slice_count(self, highest_point: i8) -> i32 {
        if self.axis == 1 {
            (highest_point as i32 + 1).clamp(0, CHUNK_SIZE)
        } else {
            CHUNK_SIZE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ao_shading_table_covers_all_levels() {
        for level in 0..4u8 {
            assert!(AO_SHADING.contains(&ao_shading_factor(level)));
        }
    }

    #[test]
    fn vertical_pass_short_circuits_at_highest_point() {
        let top = ScanPass { axis: 1, backface: false };
        assert_eq!(top.slice_count(-1), 0);
        assert_eq!(top.slice_count(0), 1);
        assert_eq!(top.slice_count(31), 32);
    }
}
