// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use log::debug;
use ndarray::prelude::*;
use ndarray::Slice;
use rand::prelude::*;
use thiserror::Error;

/// Slicing grid, `rows × cols` tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Returns `None` if either count is zero or the tile count overflows.
    pub fn new(rows: usize, cols: usize) -> Option<Self> {
        match rows.checked_mul(cols) {
            Some(n) if n > 0 => Some(Self { rows, cols }),
            _ => None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of tiles.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }
}

/// Grid shape tiles are laid out on when reassembling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// `ceil(sqrt(n))` columns and as many rows as needed.
    ///
    /// This ignores the slicing grid, so a non-square grid may be
    /// reassembled into a different shape. Tiles can then fall off the
    /// canvas, and the canvas can be larger than the sliced area (its
    /// uncovered part stays at `A::default()`).
    #[default]
    SquareRoot,
    /// Same shape as the slicing grid.
    Sliced,
}

impl Layout {
    /// Reassembly grid as `(columns, rows)`.
    pub fn columns_rows(self, grid: Grid) -> (usize, usize) {
        match self {
            Self::SquareRoot => {
                let n = grid.len();
                let columns = ceil_sqrt(n);
                (columns, n.div_ceil(columns))
            }
            Self::Sliced => (grid.cols, grid.rows),
        }
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r.saturating_mul(r) < n {
        r += 1;
    }
    while r > 1 && (r - 1) * (r - 1) >= n {
        r -= 1;
    }
    r.max(1)
}

#[derive(Debug, Error)]
pub enum SliceError {
    #[error("cannot slice a {width}x{height} region into {rows} rows and {cols} columns")]
    TooFine {
        width: usize,
        height: usize,
        rows: usize,
        cols: usize,
    },
}

/// A fragment of the sliced array and its origin `(x, y)`.
#[derive(Debug, Clone)]
pub struct Tile<A, D: Dimension> {
    pub origin: (usize, usize),
    pub pixels: Array<A, D>,
}

/// Result of reassembly.
#[derive(Debug, Clone)]
pub struct Reassembled<A, D: Dimension> {
    pub pixels: Array<A, D>,
    /// Tiles that fell entirely outside of the canvas.
    pub dropped: usize,
}

/// Slices the first 2 dimensions of `arr` (row, column) into tiles.
///
/// Tiles are `floor(width / cols) × floor(height / rows)` and returned
/// in row-major order. Remainder pixels on the right and bottom edge
/// do not belong to any tile.
pub fn slice_tiles<A, D>(arr: ArrayView<'_, A, D>, grid: Grid) -> Result<Vec<Tile<A, D>>, SliceError>
where
    A: Clone,
    D: Dimension,
{
    let (height, width) = (arr.shape()[0], arr.shape()[1]);
    let (tile_w, tile_h) = (width / grid.cols, height / grid.rows);
    if tile_w == 0 || tile_h == 0 {
        return Err(SliceError::TooFine {
            width,
            height,
            rows: grid.rows,
            cols: grid.cols,
        });
    }
    debug!(
        "slicing {}x{} into {}x{} tiles of {}x{}",
        width, height, grid.rows, grid.cols, tile_w, tile_h
    );

    let mut tiles = Vec::with_capacity(grid.len());
    for r in 0..grid.rows {
        for c in 0..grid.cols {
            let (x, y) = (c * tile_w, r * tile_h);
            let mut v = arr.view();
            v.slice_axis_inplace(Axis(0), Slice::from(y..y + tile_h));
            v.slice_axis_inplace(Axis(1), Slice::from(x..x + tile_w));
            tiles.push(Tile {
                origin: (x, y),
                pixels: v.to_owned(),
            });
        }
    }

    Ok(tiles)
}

/// Pastes `contents[i]` at `orders[i]` onto a fresh canvas.
///
/// The canvas holds `columns × rows` tiles of the first tile's size and
/// is filled with `A::default()`. Pasting replaces canvas values and is
/// clipped to the canvas; a tile with no visible part is skipped.
///
/// Panics if `contents` is empty or tiles differ in shape.
pub fn reassemble<A, D>(
    contents: &[Array<A, D>],
    orders: &[(usize, usize)],
    (columns, rows): (usize, usize),
) -> Reassembled<A, D>
where
    A: Clone + Default,
    D: Dimension,
{
    let mut dim = contents[0].raw_dim();
    let (tile_h, tile_w) = (dim[0], dim[1]);
    let (height, width) = (tile_h * rows, tile_w * columns);
    dim[0] = height;
    dim[1] = width;

    let mut out = Array::from_elem(dim, A::default());
    let mut dropped = 0;

    for (tile, &(x, y)) in contents.iter().zip(orders) {
        if x >= width || y >= height {
            dropped += 1;
            continue;
        }
        let vh = tile_h.min(height - y);
        let vw = tile_w.min(width - x);

        let mut src = tile.view();
        src.slice_axis_inplace(Axis(0), Slice::from(..vh));
        src.slice_axis_inplace(Axis(1), Slice::from(..vw));

        let mut dst = out.view_mut();
        dst.slice_axis_inplace(Axis(0), Slice::from(y..y + vh));
        dst.slice_axis_inplace(Axis(1), Slice::from(x..x + vw));
        dst.assign(&src);
    }

    Reassembled { pixels: out, dropped }
}

/// Slices, shuffles tile contents, and reassembles at the original origins.
///
/// Parameters:
/// * `arr` : Input array view. Can be multidimensional,
///   but only the first 2 dimension will be sliced.
/// * `grid` : Slicing grid.
/// * `layout` : Reassembly grid shape.
/// * `random` : Random number generator.
pub fn scramble<A, D, R>(
    arr: ArrayView<'_, A, D>,
    grid: Grid,
    layout: Layout,
    random: &mut R,
) -> Result<Reassembled<A, D>, SliceError>
where
    A: Clone + Default,
    D: Dimension,
    R: Rng,
{
    let tiles = slice_tiles(arr, grid)?;
    let (orders, mut contents): (Vec<_>, Vec<_>) =
        tiles.into_iter().map(|t| (t.origin, t.pixels)).unzip();
    debug_assert_eq!(orders.len(), grid.len());

    contents.shuffle(random);

    Ok(reassemble(&contents, &orders, layout.columns_rows(grid)))
}
