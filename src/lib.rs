//! Library to scramble images by shuffling a grid of tiles.
//!
//! An image (or a rectangular region of it) is sliced into `rows × cols`
//! tiles. The tile origins are recorded, tile contents are shuffled, and
//! the contents are pasted back at the recorded origins. So:
//!
//! * Every tile keeps its size, only its place changes.
//! * Pixels outside the region are untouched, unless the default
//!   [Layout::SquareRoot] builds a canvas larger than the region. The
//!   whole canvas is pasted back then, overwriting pixels right of or
//!   below the region.
//! * With a seed, the same input always scrambles the same way.
//!
//! The core is [shuffle::scramble], which works on any [ndarray] array.
//! [scramble] adds PNG I/O, region handling and a directory batch driver.

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

pub mod config;
pub mod preview;
pub mod purge;
pub mod scramble;
pub mod shuffle;

#[doc(inline)]
pub use crate::config::{Args, ConfigError, Mode};
#[doc(inline)]
pub use crate::scramble::{scramble_dir, scramble_file, scramble_image, Job, Region};
#[doc(inline)]
pub use crate::shuffle::{Grid, Layout};
