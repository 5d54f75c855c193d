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

//! Coordinate grid overlay, for reading off region corners by eye.

use std::env;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageError, ImageFormat, RgbImage};
use log::debug;
use plotters::prelude::*;
use thiserror::Error;

/// Spacing of thin grid lines, in pixels.
pub const MINOR_STEP: u32 = 100;
/// Spacing of thick grid lines, in pixels.
pub const MAJOR_STEP: u32 = 500;

pub const MINOR_COLOR: RGBColor = RGBColor(0, 200, 255);
pub const MAJOR_COLOR: RGBColor = RGBColor(255, 0, 0);

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to process image {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("failed to draw coordinate grid: {0}")]
    Draw(String),
}

/// Draws grid lines every [`MINOR_STEP`] and [`MAJOR_STEP`] pixels over `img`.
pub fn draw_grid(img: &mut RgbImage) -> Result<(), PreviewError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Ok(());
    }
    let (right, bottom) = (width as i32 - 1, height as i32 - 1);

    let root = BitMapBackend::with_buffer(&mut **img, (width, height)).into_drawing_area();
    for (step, color) in [(MINOR_STEP, MINOR_COLOR), (MAJOR_STEP, MAJOR_COLOR)] {
        for x in (step..width).step_by(step as usize) {
            let x = x as i32;
            root.draw(&PathElement::new([(x, 0), (x, bottom)], color))
                .map_err(|e| PreviewError::Draw(e.to_string()))?;
        }
        for y in (step..height).step_by(step as usize) {
            let y = y as i32;
            root.draw(&PathElement::new([(0, y), (right, y)], color))
                .map_err(|e| PreviewError::Draw(e.to_string()))?;
        }
    }
    root.present()
        .map_err(|e| PreviewError::Draw(e.to_string()))?;

    Ok(())
}

/// Renders `path` at `canvas` size with a coordinate grid.
///
/// The preview is written to the system temporary directory and its
/// path returned.
pub fn write_preview(path: &Path, canvas: (u32, u32)) -> Result<PathBuf, PreviewError> {
    let image_err = |source| PreviewError::Image {
        path: path.to_owned(),
        source,
    };

    let img = image::open(path).map_err(image_err)?.into_rgb8();
    let mut img = if img.dimensions() == canvas {
        img
    } else {
        imageops::resize(&img, canvas.0, canvas.1, FilterType::CatmullRom)
    };
    draw_grid(&mut img)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "preview".into());
    let output = env::temp_dir().join(format!("{stem}_coords.png"));
    debug!("writing preview to {}", output.display());
    img.save_with_format(&output, ImageFormat::Png)
        .map_err(|source| PreviewError::Image {
            path: output.clone(),
            source,
        })?;

    Ok(output)
}
