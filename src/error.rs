use thiserror::Error;

/// Structured error kinds for the chunk pipeline (§7 of the design).
///
/// Lookup misses inside the grid are *not* represented here - they are
/// recovered locally by returning the `OutOfBounds` sentinel rather than
/// propagating an error. This enum covers only the failures that are
/// genuinely fatal to a caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("palette already holds the maximum of 254 voxel descriptors")]
    PaletteOverflow,

    #[error("unknown voxel name: {0}")]
    UnknownVoxelName(String),

    #[error("unknown common voxel type: {0:?}")]
    UnknownCommonVoxel(crate::palette::CommonVoxel),

    #[error("malformed chunk packet: {0}")]
    MalformedChunkPacket(String),

    #[error("invalid configuration field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
