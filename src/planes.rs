// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the upper-left corner, and a rectangle on the complex plane whose
//! imaginary axis runs the other way: row 0 of the raster is the top
//! of the image, and the top of the image is `imag_max`.
use num::Complex;

use crate::error::{Error, Result};

/// The default view: the whole set, with a little breathing room.
pub const DEFAULT_REAL: (f64, f64) = (-2.0, 1.5);
/// See `DEFAULT_REAL`.
pub const DEFAULT_IMAG: (f64, f64) = (-1.5, 1.5);

/// The visible rectangle of the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub real_min: f64,
    /// Right edge.
    pub real_max: f64,
    /// Bottom edge.
    pub imag_min: f64,
    /// Top edge.
    pub imag_max: f64,
}

impl Viewport {
    /// Constructor.  Refuses bounds that do not describe a rectangle
    /// with positive area, or that are not finite.
    pub fn new(real_min: f64, real_max: f64, imag_min: f64, imag_max: f64) -> Result<Viewport> {
        let viewport = Viewport {
            real_min,
            real_max,
            imag_min,
            imag_max,
        };
        if viewport.is_valid() {
            Ok(viewport)
        } else {
            Err(Error::InvalidViewport {
                real_min,
                real_max,
                imag_min,
                imag_max,
            })
        }
    }

    /// Both axes are finite and strictly increasing.
    pub fn is_valid(&self) -> bool {
        let finite = [self.real_min, self.real_max, self.imag_min, self.imag_max]
            .iter()
            .all(|v| v.is_finite());
        finite && self.real_min < self.real_max && self.imag_min < self.imag_max
    }

    /// Width of the view along the real axis.
    pub fn real_range(&self) -> f64 {
        self.real_max - self.real_min
    }

    /// Height of the view along the imaginary axis.
    pub fn imag_range(&self) -> f64 {
        self.imag_max - self.imag_min
    }

    /// The point in the middle of the view.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            (self.real_min + self.real_max) / 2.0,
            (self.imag_min + self.imag_max) / 2.0,
        )
    }

    /// A view of the given extents centered on `center`.
    pub fn centered(center: Complex<f64>, real_range: f64, imag_range: f64) -> Viewport {
        Viewport {
            real_min: center.re - real_range / 2.0,
            real_max: center.re + real_range / 2.0,
            imag_min: center.im - imag_range / 2.0,
            imag_max: center.im + imag_range / 2.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport {
            real_min: DEFAULT_REAL.0,
            real_max: DEFAULT_REAL.1,
            imag_min: DEFAULT_IMAG.0,
            imag_max: DEFAULT_IMAG.1,
        }
    }
}

/// Describes the width and height of an integral plane that is
/// assumed to start at 0,0.  Both dimensions are positive; the only
/// way to get one is through `new`.
///
/// ```compile_fail
/// let empty = mandelbrot::Raster { width: 0, height: 5 };
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Raster {
    width: usize,
    height: usize,
}

impl Raster {
    /// Constructor.  A raster with no pixels cannot be rendered.
    pub fn new(width: usize, height: usize) -> Result<Raster> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyRaster(width, height));
        }
        Ok(Raster { width, height })
    }

    /// Columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Never true; a `Raster` always has at least one pixel.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Row-major offset of a pixel.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

/// Map a pixel to the complex plane.  `width` and `height` must be
/// positive; that is the caller's job.
#[inline]
pub fn to_complex(x: usize, y: usize, width: usize, height: usize, view: &Viewport) -> Complex<f64> {
    Complex::new(
        view.real_min + (x as f64 / width as f64) * view.real_range(),
        view.imag_max - (y as f64 / height as f64) * view.imag_range(),
    )
}

/// Contains a snapshot of the two planes for the length of a render
/// pass, and maps points from one to the other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The integral plane.
    pub raster: Raster,
    /// The complex plane.
    pub viewport: Viewport,
}

impl PlaneMapper {
    /// Pair a raster with a viewport.
    pub fn new(raster: Raster, viewport: Viewport) -> PlaneMapper {
        PlaneMapper { raster, viewport }
    }

    /// Given the column and row of a pixel on the integral plane,
    /// return the complex number at that location.
    #[inline]
    pub fn pixel_to_point(&self, x: usize, y: usize) -> Complex<f64> {
        to_complex(x, y, self.raster.width(), self.raster.height(), &self.viewport)
    }

    /// Like `pixel_to_point`, but for a cursor position that may sit
    /// between pixels or off the raster entirely.
    pub fn position_to_point(&self, x: f64, y: f64) -> Complex<f64> {
        Complex::new(
            self.viewport.real_min + (x / self.raster.width() as f64) * self.viewport.real_range(),
            self.viewport.imag_max - (y / self.raster.height() as f64) * self.viewport.imag_range(),
        )
    }

    /// Given a point on the complex plane, return the fractional pixel
    /// position it lands on.  The inverse of `position_to_point`.
    pub fn point_to_position(&self, point: &Complex<f64>) -> (f64, f64) {
        (
            (point.re - self.viewport.real_min) / self.viewport.real_range()
                * self.raster.width() as f64,
            (self.viewport.imag_max - point.im) / self.viewport.imag_range()
                * self.raster.height() as f64,
        )
    }
}
