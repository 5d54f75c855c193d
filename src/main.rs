//! Main Program for Tilescramble
//! Run with `-h` for more instruction

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

use anyhow::{Context, Error};
use clap::Parser;
use env_logger::Env;

use tilescramble::config::{Args, Mode, Target};
use tilescramble::scramble::{self, CANONICAL_SIZE};
use tilescramble::{preview, purge};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match Args::parse().resolve()? {
        Mode::Purge(dir) => {
            let report = purge::purge(&dir)
                .with_context(|| format!("failed to purge {}", dir.display()))?;
            for p in &report.deleted {
                if let Some(name) = p.file_name() {
                    println!("'{}' has been deleted", name.to_string_lossy());
                }
            }
            if report.deleted.is_empty() {
                println!("No scrambled image found in {}", dir.display());
            }
        }
        Mode::Preview(path) => {
            println!("Please record down your desired x-y (x1,x2,y1,y2) coordinates for scrambling later");
            let out = preview::write_preview(&path, CANONICAL_SIZE)?;
            println!(
                "Coordinate grid ({}x{}, lines every {} px) written to {}",
                CANONICAL_SIZE.0,
                CANONICAL_SIZE.1,
                preview::MINOR_STEP,
                out.display()
            );
            println!("Open that file in an image viewer to read off the coordinates");
            println!("Run again with -x x1,x2 -y y1,y2 to scramble that region");
        }
        Mode::Scramble(config) => {
            let mut random = config.random();
            let outputs = match &config.target {
                Target::File(path) => vec![scramble::scramble_file(path, &config.job, &mut random)
                    .with_context(|| format!("failed to scramble {}", path.display()))?],
                Target::Dir(dir) => scramble::scramble_dir(dir, &config.job, &mut random)
                    .with_context(|| format!("failed to scramble images in {}", dir.display()))?,
            };
            for p in &outputs {
                println!("Scrambled image written to {}", p.display());
            }
            if outputs.is_empty() {
                println!("No png image found");
            }
        }
    }

    Ok(())
}
