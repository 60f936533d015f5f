// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render engine: one frame at a time, never half a frame.
//!
//! The engine is either `Idle` or `Rendering`.  A request that arrives
//! while a frame is in flight is parked in a single pending slot
//! (a later request replaces an earlier one) and the thread that owns
//! the current frame picks it up as soon as its join completes.  The
//! viewport and raster of a frame are snapshotted when it starts, so
//! a pan that lands mid-frame only shows up in the next one.

use log::{debug, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::color::Color;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::planes::{Raster, Viewport};
use crate::pool::WorkerPool;
use crate::scheduler::{Pass, TileScheduler};

/// A finished frame, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    raster: Raster,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Columns.
    pub fn width(&self) -> usize {
        self.raster.width()
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.raster.height()
    }

    /// The raster this frame was rendered at.
    pub fn raster(&self) -> Raster {
        self.raster
    }

    /// All pixels, `y * width + x`.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// One pixel, if it is on the raster.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.raster.width() && y < self.raster.height() {
            Some(self.pixels[self.raster.offset(x, y)])
        } else {
            None
        }
    }

    /// Packed RGBA8, ready for a texture upload or an encoder.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            bytes.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        bytes
    }

    /// Packed RGB8, alpha dropped.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for c in &self.pixels {
            bytes.extend_from_slice(&[c.r, c.g, c.b]);
        }
        bytes
    }
}

/// What the engine is doing right now.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// Waiting for a request.
    Idle,
    /// A frame is in flight.
    Rendering,
}

/// Inputs for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Request {
    /// The part of the plane to show.
    pub viewport: Viewport,
    /// The size of the image.
    pub raster: Raster,
}

struct Slot {
    state: RenderState,
    pending: Option<Request>,
}

/// Renders frames on a `TileScheduler`, one at a time.
pub struct RenderEngine {
    config: RenderConfig,
    scheduler: Box<dyn TileScheduler>,
    slot: Mutex<Slot>,
    latest: Mutex<Option<Arc<PixelBuffer>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Held by the thread that owns the current frame.  If that thread
/// unwinds out of a scheduler, the engine goes back to `Idle` and the
/// parked request is dropped along with the frame.
struct InFlight<'a> {
    slot: &'a Mutex<Slot>,
}

impl<'a> Drop for InFlight<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!("render pass panicked, engine back to idle");
            let mut slot = lock(self.slot);
            slot.state = RenderState::Idle;
            slot.pending = None;
        }
    }
}

impl RenderEngine {
    /// An engine backed by a persistent worker pool.
    pub fn new(config: RenderConfig) -> Result<RenderEngine> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_threads())?;
        Ok(RenderEngine::with_scheduler(config, Box::new(pool)))
    }

    /// An engine backed by any scheduler.  `config` is assumed valid.
    pub fn with_scheduler(config: RenderConfig, scheduler: Box<dyn TileScheduler>) -> RenderEngine {
        RenderEngine {
            config,
            scheduler,
            slot: Mutex::new(Slot {
                state: RenderState::Idle,
                pending: None,
            }),
            latest: Mutex::new(None),
        }
    }

    /// The settings every frame is rendered with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Idle or rendering.
    pub fn state(&self) -> RenderState {
        lock(&self.slot).state
    }

    /// True while a frame is in flight, so a presenter can keep
    /// showing the last one instead of blocking.
    pub fn is_rendering(&self) -> bool {
        self.state() == RenderState::Rendering
    }

    /// The most recently completed frame.
    pub fn latest(&self) -> Option<Arc<PixelBuffer>> {
        lock(&self.latest).clone()
    }

    /// Render `viewport` at `raster`, blocking until done.
    ///
    /// If another thread is already rendering, the request is parked
    /// for it to pick up and this returns `None` straight away.
    /// Otherwise this renders the request, then any request parked in
    /// the meantime, and returns the last frame it produced.
    pub fn render(&self, viewport: Viewport, raster: Raster) -> Option<Arc<PixelBuffer>> {
        let mut request = Request { viewport, raster };
        {
            let mut slot = lock(&self.slot);
            if slot.state == RenderState::Rendering {
                if slot.pending.replace(request).is_some() {
                    trace!("coalesced a pending redraw");
                }
                return None;
            }
            slot.state = RenderState::Rendering;
        }
        let _in_flight = InFlight { slot: &self.slot };

        loop {
            let frame = Arc::new(self.render_pass(&request));
            *lock(&self.latest) = Some(frame.clone());

            let mut slot = lock(&self.slot);
            match slot.pending.take() {
                Some(next) => {
                    debug!("redraw requested mid-frame, rendering again");
                    request = next;
                }
                None => {
                    slot.state = RenderState::Idle;
                    return Some(frame);
                }
            }
        }
    }

    fn render_pass(&self, request: &Request) -> PixelBuffer {
        let pass = Pass::new(request.viewport, request.raster, &self.config);
        let mut pixels = vec![Color::default(); request.raster.len()];
        debug!(
            "rendering {}x{} over real {}..{}, imag {}..{}",
            request.raster.width(),
            request.raster.height(),
            request.viewport.real_min,
            request.viewport.real_max,
            request.viewport.imag_min,
            request.viewport.imag_max
        );
        self.scheduler.render(&pass, &mut pixels);
        PixelBuffer {
            raster: request.raster,
            pixels,
        }
    }
}
