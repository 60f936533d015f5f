// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cuts a raster into square tiles, the unit of parallel work.
//!
//! Tiles are numbered row-major, left to right and then top to
//! bottom.  The last tile in each row and column is clipped to the
//! raster, so every pixel belongs to exactly one tile.  Work is dealt
//! out round-robin over that numbering: worker `t` of `W` takes tiles
//! `t, t + W, t + 2W, ...`.  Neighbouring tiles tend to cost about
//! the same, so dealing them to different workers spreads the
//! expensive regions around the boundary of the set.

use itertools::iproduct;
use std::ops::Range;

use crate::planes::Raster;

/// The default tile edge, in pixels.
pub const TILE_SIZE: usize = 64;

/// A rectangle of pixels, clipped to the raster it came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Row-major position of the tile in its grid.
    pub index: usize,
    /// Left column, inclusive.
    pub x: usize,
    /// Top row, inclusive.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Tile {
    /// Columns covered by this tile.
    pub fn columns(&self) -> Range<usize> {
        self.x..self.x + self.width
    }

    /// Rows covered by this tile.
    pub fn rows(&self) -> Range<usize> {
        self.y..self.y + self.height
    }

    /// Every (x, y) in the tile, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(self.rows(), self.columns()).map(|(y, x)| (x, y))
    }

    /// Pixel count.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Tiles from a `TileGrid` are never empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The tiling of one raster.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    raster: Raster,
    edge: usize,
    tiles_x: usize,
    tiles_y: usize,
}

impl TileGrid {
    /// Tile `raster` with squares of side `edge`, which must be
    /// positive.
    pub fn new(raster: Raster, edge: usize) -> TileGrid {
        debug_assert!(edge > 0);
        TileGrid {
            raster,
            edge,
            tiles_x: (raster.width() + edge - 1) / edge,
            tiles_y: (raster.height() + edge - 1) / edge,
        }
    }

    /// The raster being tiled.
    pub fn raster(&self) -> Raster {
        self.raster
    }

    /// Nominal tile edge.
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// Tiles per row.
    pub fn tiles_x(&self) -> usize {
        self.tiles_x
    }

    /// Tiles per column.
    pub fn tiles_y(&self) -> usize {
        self.tiles_y
    }

    /// Total tile count.
    pub fn len(&self) -> usize {
        self.tiles_x * self.tiles_y
    }

    /// Never true for a grid over a valid raster.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The tile with the given row-major index, if there is one.
    pub fn tile(&self, index: usize) -> Option<Tile> {
        if index >= self.len() {
            return None;
        }
        let x = (index % self.tiles_x) * self.edge;
        let y = (index / self.tiles_x) * self.edge;
        Some(Tile {
            index,
            x,
            y,
            width: self.edge.min(self.raster.width() - x),
            height: self.edge.min(self.raster.height() - y),
        })
    }

    /// All tiles, in index order.
    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.len()).filter_map(move |i| self.tile(i))
    }

    /// The tiles dealt to `worker` out of `workers`.
    pub fn dealt_to(&self, worker: usize, workers: usize) -> impl Iterator<Item = Tile> + '_ {
        self.iter().filter(move |tile| owner(tile.index, workers) == worker)
    }
}

/// The worker, out of `workers`, that renders tile `index`.
#[inline]
pub fn owner(index: usize, workers: usize) -> usize {
    index % workers.max(1)
}

/// How many workers to use for a grid: whatever was asked for, but
/// never more than there are tiles and never fewer than one.
pub fn worker_count(requested: usize, grid: &TileGrid) -> usize {
    requested.min(grid.len()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(width: usize, height: usize, edge: usize) -> Vec<u8> {
        let raster = Raster::new(width, height).unwrap();
        let grid = TileGrid::new(raster, edge);
        let mut seen = vec![0u8; raster.len()];
        for tile in grid.iter() {
            for (x, y) in tile.pixels() {
                seen[raster.offset(x, y)] += 1;
            }
        }
        seen
    }

    #[test]
    fn tiles_cover_exactly_once() {
        for &(w, h, e) in &[(1, 1, 64), (64, 64, 64), (65, 63, 64), (900, 900, 64), (7, 13, 3)] {
            assert!(coverage(w, h, e).iter().all(|&n| n == 1), "{}x{}/{}", w, h, e);
        }
    }

    #[test]
    fn grid_dimensions_round_up() {
        let grid = TileGrid::new(Raster::new(900, 900).unwrap(), 64);
        assert_eq!(grid.tiles_x(), 15);
        assert_eq!(grid.tiles_y(), 15);
        assert_eq!(grid.len(), 225);
        let last = grid.tile(224).unwrap();
        assert_eq!((last.x, last.y, last.width, last.height), (896, 896, 4, 4));
        assert_eq!(grid.tile(225), None);
    }

    #[test]
    fn tiles_are_numbered_row_major() {
        let grid = TileGrid::new(Raster::new(100, 50).unwrap(), 32);
        let tile = grid.tile(5).unwrap();
        assert_eq!(grid.tiles_x(), 4);
        assert_eq!((tile.x, tile.y), (32, 32));
        assert_eq!((tile.width, tile.height), (32, 18));
    }

    #[test]
    fn dealing_is_round_robin() {
        let grid = TileGrid::new(Raster::new(300, 200).unwrap(), 64);
        let dealt: Vec<usize> = grid.dealt_to(1, 3).map(|t| t.index).collect();
        assert_eq!(dealt, vec![1, 4, 7, 10, 13, 16, 19]);

        let mut all: Vec<usize> = (0..3).flat_map(|w| grid.dealt_to(w, 3)).map(|t| t.index).collect();
        all.sort();
        assert_eq!(all, (0..grid.len()).collect::<Vec<_>>());
    }

    #[test]
    fn owner_wraps_around_the_workers() {
        let owners: Vec<usize> = (0..7).map(|i| owner(i, 3)).collect();
        assert_eq!(owners, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(owner(5, 0), 0);
    }

    #[test]
    fn worker_count_is_bounded() {
        let grid = TileGrid::new(Raster::new(100, 100).unwrap(), 64);
        assert_eq!(worker_count(16, &grid), 4);
        assert_eq!(worker_count(0, &grid), 1);
        assert_eq!(worker_count(2, &grid), 2);
    }
}
