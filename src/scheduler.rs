// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spreads the tiles of a frame across threads.
//!
//! A `Pass` is everything one frame needs, frozen for the length of
//! that frame.  A `TileScheduler` takes a pass and a frame buffer and
//! returns once every pixel in the buffer has been written.  Two
//! schedulers exist: the `ScopedScheduler` here, which forks a fresh
//! set of threads for every frame and writes each tile in place, and
//! the `WorkerPool` in `pool`, which keeps its threads between frames.

use log::debug;

use crate::color::{Color, ColorConfig};
use crate::config::RenderConfig;
use crate::escape::escape;
use crate::planes::{PlaneMapper, Raster, Viewport};
use crate::tiles::{owner, worker_count, Tile, TileGrid};

/// A frozen description of one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pass {
    /// Raster and viewport.
    pub mapper: PlaneMapper,
    /// How the raster is cut up.
    pub grid: TileGrid,
    /// Iteration cap.
    pub max_iter: u32,
    /// Palette.
    pub palette: ColorConfig,
}

impl Pass {
    /// Snapshot the inputs to a frame.
    pub fn new(viewport: Viewport, raster: Raster, config: &RenderConfig) -> Pass {
        Pass {
            mapper: PlaneMapper::new(raster, viewport),
            grid: TileGrid::new(raster, config.tile_edge),
            max_iter: config.max_iter,
            palette: config.color,
        }
    }

    /// The raster being rendered.
    pub fn raster(&self) -> Raster {
        self.mapper.raster
    }

    /// Escape count for one pixel.
    #[inline]
    pub fn escape_at(&self, x: usize, y: usize) -> u32 {
        let c = self.mapper.pixel_to_point(x, y);
        escape(c.re, c.im, self.max_iter)
    }

    /// Final color for one pixel.
    #[inline]
    pub fn shade(&self, x: usize, y: usize) -> Color {
        self.palette.colorize(self.escape_at(x, y), self.max_iter)
    }

    /// Render a tile into a buffer of its own, row-major.
    pub fn shade_tile(&self, tile: &Tile) -> Vec<Color> {
        tile.pixels().map(|(x, y)| self.shade(x, y)).collect()
    }

    /// Render a tile into the rows of the frame that belong to it.
    pub fn shade_into(&self, view: &mut TileView) {
        let tile = view.tile;
        for (row, y) in view.rows.iter_mut().zip(tile.rows()) {
            for (pixel, x) in row.iter_mut().zip(tile.columns()) {
                *pixel = self.shade(x, y);
            }
        }
    }
}

/// Copy a separately rendered tile into its place in the frame.
pub fn blit(frame: &mut [Color], raster: Raster, tile: &Tile, pixels: &[Color]) {
    for (y, row) in tile.rows().zip(pixels.chunks(tile.width)) {
        let start = raster.offset(tile.x, y);
        frame[start..start + tile.width].copy_from_slice(row);
    }
}

/// The slices of a frame that one tile owns, one per row.
pub struct TileView<'a> {
    /// Which tile.
    pub tile: Tile,
    /// The tile's rows, top to bottom.
    pub rows: Vec<&'a mut [Color]>,
}

/// Carve a frame into one view per tile, in tile index order.  The
/// views are disjoint, so each can go to a different thread.
pub fn split_frame<'a>(frame: &'a mut [Color], grid: &TileGrid) -> Vec<TileView<'a>> {
    let raster = grid.raster();
    let mut views: Vec<TileView<'a>> = grid
        .iter()
        .map(|tile| TileView {
            tile,
            rows: Vec::with_capacity(tile.height),
        })
        .collect();

    for (y, row) in frame.chunks_mut(raster.width()).take(raster.height()).enumerate() {
        let first = (y / grid.edge()) * grid.tiles_x();
        let mut rest = row;
        for view in &mut views[first..first + grid.tiles_x()] {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(view.tile.width);
            view.rows.push(head);
            rest = tail;
        }
    }
    views
}

/// Anything that can fill a frame from a pass.
pub trait TileScheduler: Send + Sync {
    /// Fill every pixel of `frame`, which holds exactly
    /// `pass.raster().len()` colors, and return only when done.
    fn render(&self, pass: &Pass, frame: &mut [Color]);
}

/// Forks one thread per worker for each frame and joins them before
/// returning.  Tiles are written in place.
#[derive(Clone, Debug)]
pub struct ScopedScheduler {
    workers: usize,
}

impl ScopedScheduler {
    /// A scheduler that uses up to `workers` threads per frame.
    pub fn new(workers: usize) -> ScopedScheduler {
        ScopedScheduler {
            workers: workers.max(1),
        }
    }

    /// Render a frame and report which worker rendered each tile,
    /// indexed by tile.
    pub fn render_traced(&self, pass: &Pass, frame: &mut [Color]) -> Vec<usize> {
        debug_assert_eq!(frame.len(), pass.raster().len());
        let workers = worker_count(self.workers, &pass.grid);
        debug!(
            "scoped pass: {} tiles over {} threads",
            pass.grid.len(),
            workers
        );

        let mut hands: Vec<Vec<TileView>> = (0..workers).map(|_| Vec::new()).collect();
        for view in split_frame(frame, &pass.grid) {
            hands[owner(view.tile.index, workers)].push(view);
        }

        let joined = crossbeam::scope(|spawner| {
            let handles: Vec<_> = hands
                .into_iter()
                .map(|hand| {
                    spawner.spawn(move |_| {
                        hand.into_iter()
                            .map(|mut view| {
                                pass.shade_into(&mut view);
                                view.tile.index
                            })
                            .collect::<Vec<usize>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });
        let results = match joined {
            Ok(results) => results,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        let mut traced = vec![0; pass.grid.len()];
        for (worker, result) in results.into_iter().enumerate() {
            match result {
                Ok(indices) => {
                    for index in indices {
                        traced[index] = worker;
                    }
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        traced
    }
}

impl TileScheduler for ScopedScheduler {
    fn render(&self, pass: &Pass, frame: &mut [Color]) {
        self.render_traced(pass, frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(width: usize, height: usize, edge: usize) -> Pass {
        let config = RenderConfig {
            tile_edge: edge,
            ..RenderConfig::default()
        };
        Pass::new(
            Viewport::default(),
            Raster::new(width, height).unwrap(),
            &config,
        )
    }

    fn serial(pass: &Pass) -> Vec<Color> {
        let raster = pass.raster();
        let mut frame = vec![Color::default(); raster.len()];
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                frame[raster.offset(x, y)] = pass.shade(x, y);
            }
        }
        frame
    }

    #[test]
    fn split_frame_views_are_tile_shaped() {
        let p = pass(10, 7, 4);
        let mut frame = vec![Color::default(); 70];
        let views = split_frame(&mut frame, &p.grid);
        assert_eq!(views.len(), 6);
        for view in &views {
            assert_eq!(view.rows.len(), view.tile.height);
            assert!(view.rows.iter().all(|r| r.len() == view.tile.width));
        }
    }

    #[test]
    fn split_frame_writes_land_in_place() {
        let p = pass(10, 7, 4);
        let mut frame = vec![Color::default(); 70];
        for view in split_frame(&mut frame, &p.grid) {
            let marker = Color::rgba(view.tile.index as u8, 0, 0, 255);
            for row in view.rows {
                for pixel in row.iter_mut() {
                    *pixel = marker;
                }
            }
        }
        let raster = p.raster();
        for tile in p.grid.iter() {
            for (x, y) in tile.pixels() {
                assert_eq!(frame[raster.offset(x, y)].r as usize, tile.index);
            }
        }
    }

    #[test]
    fn blit_places_tile() {
        let p = pass(10, 7, 4);
        let raster = p.raster();
        let tile = p.grid.tile(5).unwrap();
        let pixels = vec![Color::BLACK; tile.len()];
        let mut frame = vec![Color::default(); raster.len()];
        blit(&mut frame, raster, &tile, &pixels);
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                let inside = tile.columns().contains(&x) && tile.rows().contains(&y);
                assert_eq!(frame[raster.offset(x, y)] == Color::BLACK, inside);
            }
        }
    }

    #[test]
    fn scoped_matches_serial() {
        let p = pass(130, 70, 16);
        let mut frame = vec![Color::default(); p.raster().len()];
        ScopedScheduler::new(4).render(&p, &mut frame);
        assert_eq!(frame, serial(&p));
    }

    #[test]
    fn scoped_deals_round_robin() {
        let p = pass(300, 200, 32);
        let mut frame = vec![Color::default(); p.raster().len()];
        let traced = ScopedScheduler::new(3).render_traced(&p, &mut frame);
        assert_eq!(traced.len(), p.grid.len());
        for (index, &worker) in traced.iter().enumerate() {
            assert_eq!(worker, index % 3, "tile {}", index);
        }
    }

    #[test]
    fn single_thread_matches_serial() {
        let p = pass(33, 17, 8);
        let mut frame = vec![Color::default(); p.raster().len()];
        ScopedScheduler::new(1).render(&p, &mut frame);
        assert_eq!(frame, serial(&p));
    }
}
