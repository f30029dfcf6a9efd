//! Loaded and validated configuration for the chunk pipeline.
//!
//! Mirrors the world-sizing knobs in the wire/renderer contract (chunk
//! size, chunks-per-side, water level) and the worker pool tuning, the
//! way the rest of this codebase's `config` module loads TOML through
//! `serde` rather than hand-parsing it.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::mesh::MeshMode;

/// `ChunksPerSide` in a release build; debug builds default to 4 so a
/// full grid fits comfortably on a developer machine.
#[cfg(not(debug_assertions))]
pub const DEFAULT_CHUNKS_PER_SIDE: u32 = 14;
#[cfg(debug_assertions)]
pub const DEFAULT_CHUNKS_PER_SIDE: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Present for documentation/validation; the mesher and coordinate
    /// algebra are compiled against the fixed constant `CHUNK_SIZE`.
    pub chunk_size: u32,
    pub chunks_per_side: u32,
    pub water_level: i32,
    pub world_seed: u64,
    pub worker_thread_count: usize,
    pub worker_idle_sleep_ms: u64,
    pub mesh_mode: MeshMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::coord::CHUNK_SIZE as u32,
            chunks_per_side: DEFAULT_CHUNKS_PER_SIDE,
            water_level: 24,
            world_seed: 0,
            worker_thread_count: 4,
            worker_idle_sleep_ms: 50,
            mesh_mode: MeshMode::Greedy,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.chunk_size != crate::coord::CHUNK_SIZE as u32 {
            return Err(PipelineError::InvalidConfig {
                field: "chunk_size",
                reason: format!("must equal {}", crate::coord::CHUNK_SIZE),
            });
        }
        if self.chunks_per_side == 0 {
            return Err(PipelineError::InvalidConfig {
                field: "chunks_per_side",
                reason: "must be at least 1".into(),
            });
        }
        if self.worker_thread_count == 0 {
            return Err(PipelineError::InvalidConfig {
                field: "worker_thread_count",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_chunks_per_side_is_rejected() {
        let mut config = PipelineConfig::default();
        config.chunks_per_side = 0;
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig { field: "chunks_per_side", .. })
        ));
    }

    #[test]
    fn loads_from_toml() {
        let text = r#"
            world_seed = 42
            worker_thread_count = 2
        "#;
        let config = PipelineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.world_seed, 42);
        assert_eq!(config.worker_thread_count, 2);
        assert_eq!(config.chunks_per_side, DEFAULT_CHUNKS_PER_SIDE);
    }

    #[test]
    fn rejects_bad_field_before_construction() {
        let text = "chunks_per_side = 0";
        assert!(PipelineConfig::from_toml_str(text).is_err());
    }
}
