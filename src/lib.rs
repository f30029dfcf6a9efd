//! Voxel chunk pipeline: coordinate algebra, a dense voxel palette, RLE
//! chunk storage and an in-memory grid, a layered simplex-noise terrain
//! generator, and a greedy mesher backed by a worker pool.

pub mod chunk;
pub mod config;
pub mod coord;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod net;
pub mod palette;
pub mod ray;
pub mod terrain;

/// Commonly used types, re-exported for downstream crates.
pub mod prelude {
    pub use crate::chunk::{Chunk, RlePair};
    pub use crate::config::PipelineConfig;
    pub use crate::coord;
    pub use crate::error::{PipelineError, PipelineResult};
    pub use crate::grid::ChunkGrid;
    pub use crate::mesh::{MeshMode, MeshOutput, MesherHandle, WorkerPool};
    pub use crate::palette::{CommonVoxel, VoxelPalette};

    pub use glam::{IVec3, Vec3};
    pub use parking_lot::{Mutex, RwLock};
}

/// Current pipeline version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
