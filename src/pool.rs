// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent pool of tile workers.
//!
//! Each worker owns a queue.  For every frame the pool deals tiles
//! round-robin onto the queues of the first `W` workers, then waits
//! on a completion channel until it has heard back about every tile,
//! copying each finished tile into the frame as it arrives.  Threads
//! live as long as the pool, so a frame costs a handful of channel
//! sends rather than a round of thread creation.

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, info, warn};
use std::thread::{self, JoinHandle};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::scheduler::{blit, Pass, TileScheduler};
use crate::tiles::{owner, worker_count, Tile};

struct Job {
    pass: Pass,
    tile: Tile,
    done: Sender<Finished>,
}

struct Finished {
    worker: usize,
    tile: Tile,
    pixels: Vec<Color>,
}

fn work(worker: usize, queue: Receiver<Job>) {
    for job in queue.iter() {
        let pixels = job.pass.shade_tile(&job.tile);
        // The frame may have been abandoned; nothing to do about it.
        let _ = job.done.send(Finished {
            worker,
            tile: job.tile,
            pixels,
        });
    }
}

/// Long-lived tile workers behind per-worker queues.
pub struct WorkerPool {
    queues: Vec<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `workers` threads.
    pub fn new(workers: usize) -> Result<WorkerPool> {
        if workers == 0 {
            return Err(Error::InvalidWorkers);
        }
        let mut queues = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let (sender, receiver) = channel::unbounded();
            let handle = thread::Builder::new()
                .name(format!("tile-worker-{}", id))
                .spawn(move || work(id, receiver))
                .map_err(|e| Error::Spawn(e.to_string()))?;
            queues.push(sender);
            handles.push(handle);
        }
        info!("started {} tile workers", workers);
        Ok(WorkerPool { queues, handles })
    }

    /// Number of threads in the pool.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// A pool always has at least one worker.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Render a frame and report which worker rendered each tile,
    /// indexed by tile.  `None` marks a tile that had to be rendered
    /// on the calling thread because its worker was gone.
    pub fn render_traced(&self, pass: &Pass, frame: &mut [Color]) -> Vec<Option<usize>> {
        debug_assert_eq!(frame.len(), pass.raster().len());
        let workers = worker_count(self.len(), &pass.grid);
        debug!(
            "pooled pass: {} tiles over {} workers",
            pass.grid.len(),
            workers
        );

        let (done, finished) = channel::unbounded();
        let mut traced = vec![None; pass.grid.len()];
        let mut outstanding = vec![false; pass.grid.len()];
        let mut pending = 0;
        for tile in pass.grid.iter() {
            let job = Job {
                pass: *pass,
                tile,
                done: done.clone(),
            };
            match self.queues[owner(tile.index, workers)].send(job) {
                Ok(()) => {
                    outstanding[tile.index] = true;
                    pending += 1;
                }
                Err(channel::SendError(job)) => {
                    warn!("worker for tile {} is gone, rendering inline", tile.index);
                    blit(frame, pass.raster(), &tile, &pass.shade_tile(&job.tile));
                }
            }
        }
        drop(done);

        while pending > 0 {
            match finished.recv() {
                Ok(Finished {
                    worker,
                    tile,
                    pixels,
                }) => {
                    blit(frame, pass.raster(), &tile, &pixels);
                    traced[tile.index] = Some(worker);
                    outstanding[tile.index] = false;
                    pending -= 1;
                }
                Err(_) => break,
            }
        }

        if pending > 0 {
            warn!("{} tiles lost to dead workers, rendering inline", pending);
            for tile in pass.grid.iter().filter(|t| outstanding[t.index]) {
                blit(frame, pass.raster(), &tile, &pass.shade_tile(&tile));
            }
        }
        traced
    }
}

impl TileScheduler for WorkerPool {
    fn render(&self, pass: &Pass, frame: &mut [Color]) {
        self.render_traced(pass, frame);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the queues ends each worker's loop.
        self.queues.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        debug!("tile workers stopped");
    }
}
