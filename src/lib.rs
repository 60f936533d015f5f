#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot explorer core
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring and adding, `z = z² + c` starting
//! from zero, never runs off to infinity.  The usual picture colors
//! every point outside the set by how many steps it took to get more
//! than 2 away from the origin (its "escape time") and leaves the set
//! itself black.
//!
//! This crate is the part of an interactive explorer that does the
//! arithmetic.  The window, the event loop and the texture upload live
//! elsewhere; they hand us a viewport and a raster size, and get back
//! a finished buffer of colors.  A frame is cut into square tiles,
//! the tiles are dealt round-robin to a pool of worker threads, and
//! the frame is published only once every tile is in.
//!
//! ```
//! use mandelbrot::{Raster, RenderConfig, RenderEngine, Viewport};
//!
//! let engine = RenderEngine::new(RenderConfig::default()).unwrap();
//! let frame = engine
//!     .render(Viewport::default(), Raster::new(90, 90).unwrap())
//!     .unwrap();
//! assert_eq!(frame.pixels().len(), 90 * 90);
//! ```

extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod escape;
pub mod navigation;
pub mod planes;
pub mod pool;
pub mod scheduler;
pub mod tiles;

pub use color::{colorize, Color, ColorConfig};
pub use config::{NavigationConfig, RenderConfig};
pub use engine::{PixelBuffer, RenderEngine, RenderState, Request};
pub use error::{Error, Result};
pub use escape::escape;
pub use navigation::Navigator;
pub use planes::{to_complex, PlaneMapper, Raster, Viewport};
pub use pool::WorkerPool;
pub use scheduler::{Pass, ScopedScheduler, TileScheduler};
pub use tiles::{Tile, TileGrid, TILE_SIZE};
