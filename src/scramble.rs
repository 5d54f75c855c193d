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

//! Per-image scrambling and the directory batch driver.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::io::Reader as ImageReader;
use image::{ImageError, ImageFormat, RgbaImage};
use log::{debug, info, warn};
use ndarray::prelude::*;
use ndarray::ShapeError;
use rand::Rng;
use thiserror::Error;

use crate::shuffle::{self, Grid, Layout, SliceError};

/// File name prefix of scrambled outputs.
pub const MARKER: &str = "s_";

/// Size every image is resized to before a region is cropped,
/// so one set of coordinates fits a whole batch.
pub const CANONICAL_SIZE: (u32, u32) = (2133, 1600);

/// Sub-rectangle `x1 <= x < x2`, `y1 <= y < y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Region {
    /// True if the region is non-empty and inside a `width × height` image.
    pub fn fits(&self, (width, height): (u32, u32)) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2 && self.x2 <= width && self.y2 <= height
    }
}

/// Parameters shared by every image of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub grid: Grid,
    pub region: Option<Region>,
    pub layout: Layout,
    /// Size images are normalized to when `region` is set.
    pub canonical: (u32, u32),
}

impl Job {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            region: None,
            layout: Layout::default(),
            canonical: CANONICAL_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScrambleError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to process image {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error(transparent)]
    Slice(#[from] SliceError),
    #[error(
        "region ({}, {})-({}, {}) does not fit a {}x{} image",
        region.x1, region.y1, region.x2, region.y2, width, height
    )]
    RegionOutside {
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("pixel buffer does not match image size")]
    Shape(#[from] ShapeError),
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
}

/// Scrambled image and the number of tiles lost off the canvas.
#[derive(Debug, Clone)]
pub struct Scrambled {
    pub image: RgbaImage,
    pub dropped: usize,
}

fn to_array(img: RgbaImage) -> Result<Array3<u8>, ShapeError> {
    let (w, h) = img.dimensions();
    Array3::from_shape_vec((h as usize, w as usize, 4), img.into_raw())
}

fn to_image(arr: Array3<u8>) -> Result<RgbaImage, ScrambleError> {
    let (h, w) = (arr.shape()[0] as u32, arr.shape()[1] as u32);
    let raw = arr.as_standard_layout().into_owned().into_raw_vec();
    RgbaImage::from_raw(w, h, raw).ok_or(ScrambleError::Shape(ShapeError::from_kind(
        ndarray::ErrorKind::IncompatibleShape,
    )))
}

fn scramble_array<R: Rng>(
    img: RgbaImage,
    job: &Job,
    random: &mut R,
) -> Result<Scrambled, ScrambleError> {
    let arr = to_array(img)?;
    let out = shuffle::scramble(arr.view(), job.grid, job.layout, random)?;

    let (columns, rows) = job.layout.columns_rows(job.grid);
    if (columns, rows) != (job.grid.cols(), job.grid.rows()) {
        warn!(
            "{}x{} tiles are reassembled on a {}x{} grid",
            job.grid.rows(),
            job.grid.cols(),
            rows,
            columns
        );
    }
    if out.dropped > 0 {
        warn!("{} tile(s) fell outside of the canvas", out.dropped);
    }

    Ok(Scrambled {
        image: to_image(out.pixels)?,
        dropped: out.dropped,
    })
}

/// Scrambles an in-memory image.
///
/// Without a region the result is the reassembled canvas. With a region,
/// the image is first resized to `job.canonical`, the region is scrambled,
/// and the canvas is pasted back at the region's top-left corner.
///
/// With [`Layout::SquareRoot`] the canvas can be larger than the region;
/// it is pasted whole (clipped to the image), so pixels right of or below
/// the region are overwritten, partly with transparent black.
pub fn scramble_image<R: Rng>(
    img: &RgbaImage,
    job: &Job,
    random: &mut R,
) -> Result<Scrambled, ScrambleError> {
    let Some(region) = job.region else {
        return scramble_array(img.clone(), job, random);
    };

    let (width, height) = job.canonical;
    if !region.fits(job.canonical) {
        return Err(ScrambleError::RegionOutside {
            region,
            width,
            height,
        });
    }

    let mut base = if img.dimensions() == job.canonical {
        img.clone()
    } else {
        debug!(
            "resizing {}x{} to {}x{}",
            img.width(),
            img.height(),
            width,
            height
        );
        imageops::resize(img, width, height, FilterType::CatmullRom)
    };

    let crop = imageops::crop_imm(
        &base,
        region.x1,
        region.y1,
        region.x2 - region.x1,
        region.y2 - region.y1,
    )
    .to_image();
    let patch = scramble_array(crop, job, random)?;
    let (pw, ph) = patch.image.dimensions();
    if pw > region.x2 - region.x1 || ph > region.y2 - region.y1 {
        warn!(
            "{}x{} patch overflows the {}x{} region",
            pw,
            ph,
            region.x2 - region.x1,
            region.y2 - region.y1
        );
    }

    imageops::replace(&mut base, &patch.image, region.x1.into(), region.y1.into());
    Ok(Scrambled {
        image: base,
        dropped: patch.dropped,
    })
}

/// Output path of a scrambled image: same directory, name prefixed with [`MARKER`].
pub fn output_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!("{MARKER}{name}")))
}

/// True for paths ending in `.png` (lowercase only).
pub fn has_png_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "png")
}

/// True if the file name starts with [`MARKER`].
pub fn is_scrambled(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(MARKER))
}

/// Reads, scrambles and writes one PNG. Returns the output path.
pub fn scramble_file<R: Rng>(
    path: &Path,
    job: &Job,
    random: &mut R,
) -> Result<PathBuf, ScrambleError> {
    let output = output_path(path).ok_or_else(|| ScrambleError::NoFileName(path.to_owned()))?;
    let io_err = |source| ScrambleError::Io {
        path: path.to_owned(),
        source,
    };
    let image_err = |source| ScrambleError::Image {
        path: path.to_owned(),
        source,
    };

    let img = ImageReader::new(BufReader::new(File::open(path).map_err(io_err)?))
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(image_err)?
        .into_rgba8();

    let out = scramble_image(&img, job, random)?;
    out.image
        .save_with_format(&output, ImageFormat::Png)
        .map_err(|source| ScrambleError::Image {
            path: output.clone(),
            source,
        })?;

    info!("{} -> {}", path.display(), output.display());
    Ok(output)
}

/// Scrambles every PNG directly inside `dir`, in name order.
///
/// Earlier outputs are scrambled too (`s_a.png` becomes `s_s_a.png`).
/// The listing is taken before the first write, so outputs of this run
/// are not picked up. The first failure aborts the remaining batch.
pub fn scramble_dir<R: Rng>(
    dir: &Path,
    job: &Job,
    random: &mut R,
) -> Result<Vec<PathBuf>, ScrambleError> {
    let io_err = |source| ScrambleError::Io {
        path: dir.to_owned(),
        source,
    };

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && has_png_extension(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    debug!("{} image(s) in {}", inputs.len(), dir.display());

    inputs
        .iter()
        .map(|p| scramble_file(p, job, random))
        .collect()
}
