//! Fixed worker-thread pool that drains a shared input queue of chunk
//! positions and produces [`MeshOutput`]s on a shared output queue.
//!
//! Grounded on the reference engine's `ChunkSystem::threadFunc`: four
//! long-lived threads, one mutex guarding both FIFOs (and, by extension,
//! any chunk read taken while holding it), a 50ms sleep when the input
//! queue is empty, and a plain atomic flag for shutdown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use glam::IVec3;
use log::debug;
use parking_lot::Mutex;

use crate::config::PipelineConfig;
use crate::grid::ChunkGrid;
use crate::palette::VoxelPalette;

use super::{greedy, naive, MeshMode, MeshOutput};

struct Queues {
    input: VecDeque<IVec3>,
    output: VecDeque<MeshOutput>,
}

struct Shared {
    grid: Arc<ChunkGrid>,
    palette: Arc<VoxelPalette>,
    mode: MeshMode,
    idle_sleep: Duration,
    queues: Mutex<Queues>,
    running: AtomicBool,
}

/// A fixed pool of mesher worker threads. Dropping it signals shutdown
/// and joins every thread.
pub struct WorkerPool {
    shared: Arc<Shared>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(grid: Arc<ChunkGrid>, palette: Arc<VoxelPalette>, config: &PipelineConfig) -> Self {
        let shared = Arc::new(Shared {
            grid,
            palette,
            mode: config.mesh_mode,
            idle_sleep: Duration::from_millis(config.worker_idle_sleep_ms),
            queues: Mutex::new(Queues {
                input: VecDeque::new(),
                output: VecDeque::new(),
            }),
            running: AtomicBool::new(true),
        });

        let threads = (0..config.worker_thread_count.max(1))
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || worker_loop(shared))
            })
            .collect();

        Self { shared, threads }
    }

    /// Queues a chunk for (re)meshing. Idempotent under coalescing: a
    /// chunk already waiting in the input queue is not queued twice.
    pub fn submit(&self, chunk_pos: IVec3) {
        let mut queues = self.shared.queues.lock();
        if !queues.input.contains(&chunk_pos) {
            queues.input.push_back(chunk_pos);
        }
    }

    /// Pops one completed mesh, if any worker has finished one.
    pub fn poll(&self) -> Option<MeshOutput> {
        self.shared.queues.lock().output.pop_front()
    }

    pub fn pending_input(&self) -> usize {
        self.shared.queues.lock().input.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

/// A lightweight, `Send`-able handle that can be cloned and passed to
/// other code that only needs to submit jobs, without exposing shutdown.
#[derive(Clone)]
pub struct MesherHandle(Arc<Shared>);

impl MesherHandle {
    /// Idempotent under coalescing; see [`WorkerPool::submit`].
    pub fn submit(&self, chunk_pos: IVec3) {
        let mut queues = self.0.queues.lock();
        if !queues.input.contains(&chunk_pos) {
            queues.input.push_back(chunk_pos);
        }
    }

    pub fn poll(&self) -> Option<MeshOutput> {
        self.0.queues.lock().output.pop_front()
    }
}

impl WorkerPool {
    pub fn handle(&self) -> MesherHandle {
        MesherHandle(self.shared.clone())
    }
}

fn worker_loop(shared: Arc<Shared>) {
    while shared.running.load(Ordering::Acquire) {
        let job = shared.queues.lock().input.pop_front();

        match job {
            Some(chunk_pos) => {
                let output = shared.grid.with_chunk(chunk_pos, |chunk| {
                    if chunk.is_empty() {
                        None
                    } else {
                        Some(match shared.mode {
                            MeshMode::Greedy => greedy::mesh_chunk(&shared.grid, chunk, &shared.palette),
                            MeshMode::Naive => naive::mesh_chunk(&shared.grid, chunk, &shared.palette),
                        })
                    }
                });

                if let Some(output) = output {
                    shared.queues.lock().output.push_back(output);
                }
            }
            None => std::thread::sleep(shared.idle_sleep),
        }
    }
    debug!("mesher worker thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::recompute_highest_point;
    use crate::palette::CommonVoxel;
    use std::time::Instant;

    fn populated_grid() -> Arc<ChunkGrid> {
        let grid = Arc::new(ChunkGrid::new(1));
        let palette = VoxelPalette::default();
        let stone = palette.id_of_common(CommonVoxel::Stone).unwrap();
        grid.with_chunk_mut(IVec3::ZERO, |chunk| {
            chunk.set_voxel_q(IVec3::new(1, 1, 1), stone);
            recompute_highest_point(chunk);
        });
        grid
    }

    #[test]
    fn submitted_chunk_eventually_produces_output() {
        let grid = populated_grid();
        let palette = Arc::new(VoxelPalette::default());
        let pool = WorkerPool::new(grid, palette, &PipelineConfig::default());
        pool.submit(IVec3::ZERO);

        let start = Instant::now();
        let mut result = None;
        while start.elapsed() < Duration::from_secs(2) {
            if let Some(output) = pool.poll() {
                result = Some(output);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        let output = result.expect("worker pool produced a mesh within 2s");
        assert!(!output.is_empty());
    }

    #[test]
    fn empty_chunk_submission_produces_no_output() {
        let grid = Arc::new(ChunkGrid::new(1));
        let palette = Arc::new(VoxelPalette::default());
        let pool = WorkerPool::new(grid, palette, &PipelineConfig::default());
        pool.submit(IVec3::ZERO);
        std::thread::sleep(Duration::from_millis(150));
        assert!(pool.poll().is_none());
    }

    #[test]
    fn resubmitting_the_same_chunk_does_not_duplicate_the_queue_entry() {
        // A worker may race to drain the queue between submits, but it
        // can never observe more than one entry for the same position.
        let grid = Arc::new(ChunkGrid::new(1));
        let palette = Arc::new(VoxelPalette::default());
        let pool = WorkerPool::new(grid, palette, &PipelineConfig::default());
        pool.submit(IVec3::ZERO);
        pool.submit(IVec3::ZERO);
        pool.submit(IVec3::ZERO);
        assert!(pool.pending_input() <= 1);
    }

    #[test]
    fn drop_joins_workers_promptly() {
        // S6: shutdown should complete well within the idle sleep's
        // order of magnitude, not hang waiting on work.
        let grid = Arc::new(ChunkGrid::new(1));
        let palette = Arc::new(VoxelPalette::default());
        let pool = WorkerPool::new(grid, palette, &PipelineConfig::default());
        let start = Instant::now();
        drop(pool);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
