// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while building a renderer or writing its output.
//! Rendering itself cannot fail; everything here is caught at the
//! boundary where a viewport, raster, or configuration is constructed.

use failure::Fail;

/// Everything that can go wrong before a render pass begins.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The plane bounds do not describe a rectangle with positive area.
    #[fail(
        display = "invalid viewport: real {}..{}, imag {}..{}",
        real_min, real_max, imag_min, imag_max
    )]
    InvalidViewport {
        /// Left edge of the rejected viewport.
        real_min: f64,
        /// Right edge of the rejected viewport.
        real_max: f64,
        /// Bottom edge of the rejected viewport.
        imag_min: f64,
        /// Top edge of the rejected viewport.
        imag_max: f64,
    },

    /// One of the raster dimensions is zero.
    #[fail(display = "raster must be at least 1x1, got {}x{}", _0, _1)]
    EmptyRaster(usize, usize),

    /// An iteration cap of zero has no defined escape semantics.
    #[fail(display = "iteration cap must be positive")]
    InvalidIterations,

    /// Tiles must be at least one pixel on a side.
    #[fail(display = "tile edge must be positive")]
    InvalidTileEdge,

    /// A scheduler needs at least one worker.
    #[fail(display = "worker count must be positive")]
    InvalidWorkers,

    /// Saturation and value must be finite and non-negative.
    #[fail(display = "invalid color parameters: saturation {}, value {}", _0, _1)]
    InvalidColor(f64, f64),

    /// A navigation tunable is out of range.
    #[fail(display = "invalid navigation setting: {}", _0)]
    InvalidNavigation(String),

    /// The operating system refused to start a worker thread.
    #[fail(display = "could not start worker thread: {}", _0)]
    Spawn(String),

    /// The finished frame could not be written.
    #[fail(display = "could not write image: {}", _0)]
    Image(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
