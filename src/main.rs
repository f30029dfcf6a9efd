//! Minimal demo binary: generates a few terrain columns, meshes them
//! through the worker pool, and logs a summary. There is no renderer
//! here - this exists so the pipeline can be driven end to end outside
//! the test suite.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::IVec3;
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use chunkforge::config::PipelineConfig;
use chunkforge::grid::ChunkGrid;
use chunkforge::mesh::WorkerPool;
use chunkforge::palette::VoxelPalette;
use chunkforge::terrain;

const DEMO_RADIUS: i32 = 3;

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("failed to initialize logger")?;

    info!("starting chunkforge demo");

    let config = load_config()?;
    let palette = Arc::new(VoxelPalette::default());
    let grid = Arc::new(ChunkGrid::new(config.chunks_per_side));

    info!(
        "generating a {0}x{0} column grid at world seed {1}",
        DEMO_RADIUS, config.world_seed
    );
    for chunk_z in 0..DEMO_RADIUS {
        for chunk_x in 0..DEMO_RADIUS {
            terrain::generate_column(&grid, chunk_x, chunk_z, config.world_seed, &palette);
        }
    }

    let pool = WorkerPool::new(grid.clone(), palette.clone(), &config);
    let mut submitted = 0usize;
    for chunk_z in 0..DEMO_RADIUS {
        for chunk_y in 0..config.chunks_per_side as i32 {
            for chunk_x in 0..DEMO_RADIUS {
                let pos = IVec3::new(chunk_x, chunk_y, chunk_z);
                if grid.has_chunk(pos) {
                    pool.submit(pos);
                    submitted += 1;
                }
            }
        }
    }
    info!("submitted {submitted} chunks for meshing");

    let mut meshed = 0usize;
    let deadline = Instant::now() + Duration::from_secs(5);
    while meshed < submitted && Instant::now() < deadline {
        if let Some(output) = pool.poll() {
            meshed += 1;
            info!(
                "meshed chunk {:?}: {} solid indices, {} water indices, {} detail indices",
                output.chunk_pos,
                output.solid_indices.len(),
                output.water_indices.len(),
                output.detail_indices.len()
            );
        } else {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    if meshed < submitted {
        warn!("timed out waiting for {} chunks to mesh", submitted - meshed);
    }

    info!("done: {meshed}/{submitted} chunks meshed");
    Ok(())
}

fn load_config() -> Result<PipelineConfig> {
    match std::fs::read_to_string("chunkforge.toml") {
        Ok(text) => PipelineConfig::from_toml_str(&text).context("invalid chunkforge.toml"),
        Err(_) => {
            info!("no chunkforge.toml found, using defaults");
            Ok(PipelineConfig::default())
        }
    }
}
