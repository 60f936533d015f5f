// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tunables.  None of these change what the picture means, only how
//! long it takes and how it looks.

use crate::color::ColorConfig;
use crate::error::{Error, Result};
use crate::tiles::TILE_SIZE;

/// The default iteration cap.
pub const MAX_ITER: u32 = 100;

/// Everything a render pass needs besides the viewport and raster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Iteration cap for the escape test.
    pub max_iter: u32,
    /// Tile edge in pixels.
    pub tile_edge: usize,
    /// Worker threads; `None` means one per logical CPU.
    pub workers: Option<usize>,
    /// Palette.
    pub color: ColorConfig,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            max_iter: MAX_ITER,
            tile_edge: TILE_SIZE,
            workers: None,
            color: ColorConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Reject settings that leave a render pass undefined.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::InvalidIterations);
        }
        if self.tile_edge == 0 {
            return Err(Error::InvalidTileEdge);
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidWorkers);
        }
        self.color.validate()
    }

    /// The worker count after filling in the default.
    pub fn worker_threads(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// How the view responds to the mouse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NavigationConfig {
    /// Scale applied to the view per wheel click toward the user.
    pub zoom_in: f64,
    /// Scale applied to the view per wheel click away from the user.
    pub zoom_out: f64,
    /// Multiplier on drag distance.
    pub drag_sensitivity: f64,
    /// Pixels the cursor must travel before a drag moves the view.
    pub min_movement: f64,
}

impl Default for NavigationConfig {
    fn default() -> NavigationConfig {
        NavigationConfig {
            zoom_in: 0.8,
            zoom_out: 1.25,
            drag_sensitivity: 1.0,
            min_movement: 2.0,
        }
    }
}

impl NavigationConfig {
    /// Zooming in must shrink the view and zooming out must grow it.
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom_in > 0.0 && self.zoom_in < 1.0) {
            return Err(Error::InvalidNavigation(format!(
                "zoom-in factor {} is not in (0, 1)",
                self.zoom_in
            )));
        }
        if !(self.zoom_out > 1.0 && self.zoom_out.is_finite()) {
            return Err(Error::InvalidNavigation(format!(
                "zoom-out factor {} is not greater than 1",
                self.zoom_out
            )));
        }
        if !(self.drag_sensitivity.is_finite() && self.drag_sensitivity > 0.0) {
            return Err(Error::InvalidNavigation(format!(
                "drag sensitivity {} is not positive",
                self.drag_sensitivity
            )));
        }
        if !(self.min_movement.is_finite() && self.min_movement >= 0.0) {
            return Err(Error::InvalidNavigation(format!(
                "minimum movement {} is negative",
                self.min_movement
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RenderConfig::default().validate().is_ok());
        assert!(NavigationConfig::default().validate().is_ok());
        assert_eq!(RenderConfig::default().max_iter, 100);
        assert_eq!(RenderConfig::default().tile_edge, 64);
    }

    #[test]
    fn zero_settings_are_rejected() {
        let config = RenderConfig {
            max_iter: 0,
            ..RenderConfig::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidIterations));

        let config = RenderConfig {
            tile_edge: 0,
            ..RenderConfig::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidTileEdge));

        let config = RenderConfig {
            workers: Some(0),
            ..RenderConfig::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidWorkers));
    }

    #[test]
    fn worker_threads_defaults_to_cpus() {
        assert_eq!(RenderConfig::default().worker_threads(), num_cpus::get().max(1));
        let config = RenderConfig {
            workers: Some(3),
            ..RenderConfig::default()
        };
        assert_eq!(config.worker_threads(), 3);
    }

    #[test]
    fn inverted_zoom_is_rejected() {
        let config = NavigationConfig {
            zoom_in: 1.25,
            ..NavigationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
