// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns pointer gestures into viewport changes.
//!
//! A `Navigator` is owned by whatever is polling the window.  It holds
//! the current viewport and raster, the drag in progress if any, and
//! a flag recording that the picture has gone stale.  It never renders
//! anything; it just hands out `Request`s.

use num::Complex;

use crate::config::NavigationConfig;
use crate::engine::Request;
use crate::error::Result;
use crate::planes::{PlaneMapper, Raster, Viewport};

/// Pointer-driven view state.
#[derive(Clone, Debug)]
pub struct Navigator {
    config: NavigationConfig,
    viewport: Viewport,
    raster: Raster,
    drag_from: Option<(f64, f64)>,
    stale: bool,
}

impl Navigator {
    /// Start at the default view.  The first frame is always stale.
    pub fn new(raster: Raster, config: NavigationConfig) -> Result<Navigator> {
        Navigator::with_viewport(raster, Viewport::default(), config)
    }

    /// Start at a particular view.
    pub fn with_viewport(
        raster: Raster,
        viewport: Viewport,
        config: NavigationConfig,
    ) -> Result<Navigator> {
        config.validate()?;
        Ok(Navigator {
            config,
            viewport,
            raster,
            drag_from: None,
            stale: true,
        })
    }

    /// Current view.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current raster.
    pub fn raster(&self) -> Raster {
        self.raster
    }

    /// The pixel/plane mapping for the current state.
    pub fn mapper(&self) -> PlaneMapper {
        PlaneMapper::new(self.raster, self.viewport)
    }

    /// The point under a cursor position.
    pub fn point_at(&self, x: f64, y: f64) -> Complex<f64> {
        self.mapper().position_to_point(x, y)
    }

    /// Something changed since the last `take_redraw`.
    pub fn needs_redraw(&self) -> bool {
        self.stale
    }

    /// If the picture is stale, the request that would refresh it.
    /// Clears the stale flag.
    pub fn take_redraw(&mut self) -> Option<Request> {
        if !self.stale {
            return None;
        }
        self.stale = false;
        Some(Request {
            viewport: self.viewport,
            raster: self.raster,
        })
    }

    /// Slide the view by a pixel offset, as though the picture were
    /// dragged `dx` right and `dy` down.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let scale = self.config.drag_sensitivity;
        let re = -dx * self.viewport.real_range() / self.raster.width() as f64 * scale;
        let im = dy * self.viewport.imag_range() / self.raster.height() as f64 * scale;
        self.viewport.real_min += re;
        self.viewport.real_max += re;
        self.viewport.imag_min += im;
        self.viewport.imag_max += im;
        self.stale = true;
    }

    /// The button went down at `(x, y)`.
    pub fn drag_begin(&mut self, x: f64, y: f64) {
        self.drag_from = Some((x, y));
    }

    /// The cursor moved to `(x, y)`.  The view only follows once the
    /// cursor has travelled `min_movement` pixels from where the view
    /// last caught up; returns whether it moved.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let (from_x, from_y) = match self.drag_from {
            Some(from) => from,
            None => return false,
        };
        let (dx, dy) = (x - from_x, y - from_y);
        if (dx * dx + dy * dy).sqrt() < self.config.min_movement {
            return false;
        }
        self.pan(dx, dy);
        self.drag_from = Some((x, y));
        true
    }

    /// The button came up.
    pub fn drag_end(&mut self) {
        self.drag_from = None;
    }

    /// Zoom about the cursor.  Positive `wheel` zooms in, negative
    /// zooms out, zero does nothing.  The point under the cursor stays
    /// under the cursor.
    pub fn zoom_at(&mut self, x: f64, y: f64, wheel: f64) {
        let factor = if wheel > 0.0 {
            self.config.zoom_in
        } else if wheel < 0.0 {
            self.config.zoom_out
        } else {
            return;
        };
        let anchor = self.point_at(x, y);
        let vp = self.viewport;
        self.viewport = Viewport {
            real_min: anchor.re - (anchor.re - vp.real_min) * factor,
            real_max: anchor.re + (vp.real_max - anchor.re) * factor,
            imag_min: anchor.im - (anchor.im - vp.imag_min) * factor,
            imag_max: anchor.im + (vp.imag_max - anchor.im) * factor,
        };
        self.stale = true;
    }

    /// Back to the default view.
    pub fn reset(&mut self) {
        self.viewport = Viewport::default();
        self.stale = true;
    }

    /// The window changed size.  Each axis of the view grows or
    /// shrinks with the raster around the same center, so the scale
    /// of a pixel is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let raster = Raster::new(width, height)?;
        if raster == self.raster {
            return Ok(());
        }
        let real = self.viewport.real_range() * (raster.width() as f64 / self.raster.width() as f64);
        let imag = self.viewport.imag_range() * (raster.height() as f64 / self.raster.height() as f64);
        self.viewport = Viewport::centered(self.viewport.center(), real, imag);
        self.raster = raster;
        self.stale = true;
        Ok(())
    }
}
