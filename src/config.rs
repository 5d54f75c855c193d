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

//! Command line options and their resolution into a [`Mode`].

use std::path::{Path, PathBuf};

use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::scramble::{has_png_extension, Job, Region, CANONICAL_SIZE};
use crate::shuffle::{Grid, Layout};

/// Pair of coordinates given as `A,B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

fn parse_span(s: &str) -> Result<Span, String> {
    let digits = |v: &str| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit());
    match s.split_once(',') {
        Some((a, b)) if digits(a) && digits(b) => Ok(Span {
            start: a.parse().map_err(|e| format!("{e}"))?,
            end: b.parse().map_err(|e| format!("{e}"))?,
        }),
        _ => Err("expected format: N1,N2".into()),
    }
}

/// Scramble PNG images by shuffling a grid of tiles.
#[derive(Parser, Debug, Default)]
#[command(author, version, disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Image file to scramble
    #[arg(short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Directory whose images are all scrambled
    #[arg(short = 'a', value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Number of tile rows
    #[arg(short = 'r', value_name = "ROWS")]
    pub rows: Option<usize>,

    /// Number of tile columns
    #[arg(short = 'c', value_name = "COLS")]
    pub cols: Option<usize>,

    /// Horizontal extent of the scrambled region
    #[arg(short = 'x', value_name = "X1,X2", value_parser = parse_span)]
    pub x: Option<Span>,

    /// Vertical extent of the scrambled region
    #[arg(short = 'y', value_name = "Y1,Y2", value_parser = parse_span)]
    pub y: Option<Span>,

    /// Show coordinate grid over an image
    #[arg(short = 's', value_name = "FILE")]
    pub show: Option<PathBuf>,

    /// Delete scrambled images (prefixed with "s_") in a directory
    #[arg(short = 'd', value_name = "DIR")]
    pub purge: Option<PathBuf>,

    /// Random seed
    #[arg(short = 'k', value_name = "SEED")]
    pub seed: Option<String>,

    /// Reassemble tiles on the row×column grid instead of a square one
    #[arg(short = 'g')]
    pub sliced: bool,

    /// Print help
    #[arg(short = 'h', action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot use -{0} and -{1} option together")]
    Conflict(char, char),
    #[error("x and y coordinates must be specified together")]
    IncompleteRegion,
    #[error("row and column counts must be at least 1")]
    ZeroGrid,
    #[error("{0}x{1} tiles are too many")]
    GridTooLarge(usize, usize),
    #[error("invalid directory {} (wrong spelling or not a directory)", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid image file {} (wrong spelling or not a png image)", .0.display())]
    NotAPng(PathBuf),
    #[error("please specify an image file (-f) or a directory (-a)")]
    NoTarget,
    #[error("please specify scrambled rows (-r) and columns (-c)")]
    MissingGrid,
    #[error(
        "region ({}, {})-({}, {}) must be non-empty and within {}x{}",
        .0.x1, .0.y1, .0.x2, .0.y2, CANONICAL_SIZE.0, CANONICAL_SIZE.1
    )]
    BadRegion(Region),
}

/// What to scramble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Dir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleConfig {
    pub target: Target,
    pub job: Job,
    pub seed: Option<String>,
}

impl ScrambleConfig {
    /// Random source, seeded from `seed` if given.
    pub fn random(&self) -> Xoshiro256StarStar {
        if let Some(seed) = &self.seed {
            let mut hasher = Sha256::new();
            hasher.update(seed);

            Xoshiro256StarStar::from_seed(hasher.finalize().into())
        } else {
            Xoshiro256StarStar::from_entropy()
        }
    }
}

/// Resolved run configuration. Modes are exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Purge(PathBuf),
    Preview(PathBuf),
    Scramble(ScrambleConfig),
}

fn check_dir(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(ConfigError::NotADirectory(path))
    }
}

fn check_png(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if is_png_file(&path) {
        Ok(path)
    } else {
        Err(ConfigError::NotAPng(path))
    }
}

fn is_png_file(path: &Path) -> bool {
    path.is_file() && has_png_extension(path)
}

impl Args {
    /// Checks that do not touch the file system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.is_some() && self.file.is_some() {
            return Err(ConfigError::Conflict('a', 'f'));
        }
        if self.purge.is_some() {
            if self.dir.is_some() {
                return Err(ConfigError::Conflict('d', 'a'));
            }
            if self.file.is_some() {
                return Err(ConfigError::Conflict('d', 'f'));
            }
            if self.show.is_some() {
                return Err(ConfigError::Conflict('d', 's'));
            }
        }
        if self.show.is_some() {
            if self.dir.is_some() {
                return Err(ConfigError::Conflict('s', 'a'));
            }
            if self.file.is_some() {
                return Err(ConfigError::Conflict('s', 'f'));
            }
        }
        if self.x.is_some() != self.y.is_some() {
            return Err(ConfigError::IncompleteRegion);
        }
        if self.rows == Some(0) || self.cols == Some(0) {
            return Err(ConfigError::ZeroGrid);
        }
        if let (Some(rows), Some(cols)) = (self.rows, self.cols) {
            if rows.checked_mul(cols).is_none() {
                return Err(ConfigError::GridTooLarge(rows, cols));
            }
        }
        Ok(())
    }

    fn region(&self) -> Option<Region> {
        let (x, y) = (self.x?, self.y?);
        Some(Region {
            x1: x.start,
            y1: y.start,
            x2: x.end,
            y2: y.end,
        })
    }

    /// Validates and resolves into a [`Mode`].
    ///
    /// Purge takes priority over preview, which takes priority over scrambling.
    pub fn resolve(self) -> Result<Mode, ConfigError> {
        self.validate()?;

        if let Some(dir) = self.purge {
            return check_dir(dir).map(Mode::Purge);
        }
        if let Some(file) = self.show {
            return check_png(file).map(Mode::Preview);
        }

        let region = self.region();
        let target = match (self.file, self.dir) {
            (Some(file), _) => Target::File(check_png(file)?),
            (None, Some(dir)) => Target::Dir(check_dir(dir)?),
            (None, None) => return Err(ConfigError::NoTarget),
        };
        let grid = match (self.rows, self.cols) {
            (Some(rows), Some(cols)) => Grid::new(rows, cols).ok_or(ConfigError::GridTooLarge(rows, cols))?,
            _ => return Err(ConfigError::MissingGrid),
        };
        if let Some(region) = region {
            if !region.fits(CANONICAL_SIZE) {
                return Err(ConfigError::BadRegion(region));
            }
        }

        Ok(Mode::Scramble(ScrambleConfig {
            target,
            job: Job {
                region,
                layout: if self.sliced {
                    Layout::Sliced
                } else {
                    Layout::SquareRoot
                },
                ..Job::new(grid)
            },
            seed: self.seed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tilescramble").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn span_format() {
        assert_eq!(parse_span("3,40"), Ok(Span { start: 3, end: 40 }));
        assert!(parse_span("3").is_err());
        assert!(parse_span("3,").is_err());
        assert!(parse_span("+3,4").is_err());
        assert!(parse_span("3,4,5").is_err());
        assert!(Args::try_parse_from(["tilescramble", "-x", "1;2"]).is_err());
    }

    #[test]
    fn partial_region_rejected_before_io() {
        let e = args(&["-f", "/does/not/exist.png", "-r", "2", "-c", "2", "-x", "1,5"])
            .resolve()
            .unwrap_err();
        assert_eq!(e, ConfigError::IncompleteRegion);

        let e = args(&["-a", "/does/not/exist", "-y", "1,5"]).resolve().unwrap_err();
        assert_eq!(e, ConfigError::IncompleteRegion);
    }

    #[test]
    fn conflicts() {
        let e = args(&["-f", "a.png", "-a", "dir"]).validate().unwrap_err();
        assert_eq!(e, ConfigError::Conflict('a', 'f'));
        let e = args(&["-d", "dir", "-s", "a.png"]).validate().unwrap_err();
        assert_eq!(e, ConfigError::Conflict('d', 's'));
        let e = args(&["-s", "a.png", "-f", "b.png"]).validate().unwrap_err();
        assert_eq!(e, ConfigError::Conflict('s', 'f'));
        let e = args(&["-f", "a.png", "-r", "0", "-c", "2"]).validate().unwrap_err();
        assert_eq!(e, ConfigError::ZeroGrid);
    }

    #[test]
    fn huge_grid_rejected_before_io() {
        let max = usize::MAX.to_string();
        let e = args(&["-f", "/does/not/exist.png", "-r", max.as_str(), "-c", "2"])
            .resolve()
            .unwrap_err();
        assert_eq!(e, ConfigError::GridTooLarge(usize::MAX, 2));
    }

    #[test]
    fn short_flags_only() {
        use clap::error::ErrorKind;

        let kind = |argv: &[&str]| {
            Args::try_parse_from(std::iter::once("tilescramble").chain(argv.iter().copied()))
                .unwrap_err()
                .kind()
        };
        assert_eq!(kind(&["-h"]), ErrorKind::DisplayHelp);
        assert_eq!(kind(&["--help"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["--version"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["-V"]), ErrorKind::UnknownArgument);
    }

    #[test]
    fn resolves_modes() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("a.png");
        fs::write(&png, b"").unwrap();
        let d = dir.path().to_str().unwrap();
        let p = png.to_str().unwrap();

        assert_eq!(
            args(&["-d", d, "-r", "2"]).resolve(),
            Ok(Mode::Purge(dir.path().into()))
        );
        assert_eq!(args(&["-s", p]).resolve(), Ok(Mode::Preview(png.clone())));
        assert_eq!(args(&["-s", d]).resolve(), Err(ConfigError::NotAPng(d.into())));
        assert_eq!(args(&[]).resolve(), Err(ConfigError::NoTarget));
        assert_eq!(args(&["-f", p, "-r", "2"]).resolve(), Err(ConfigError::MissingGrid));

        let Ok(Mode::Scramble(config)) =
            args(&["-a", d, "-r", "2", "-c", "3", "-x", "10,20", "-y", "5,15", "-g"]).resolve()
        else {
            panic!("expected scramble mode");
        };
        assert_eq!(config.target, Target::Dir(dir.path().into()));
        assert_eq!(config.job.grid, Grid::new(2, 3).unwrap());
        assert_eq!(config.job.layout, Layout::Sliced);
        assert_eq!(
            config.job.region,
            Some(Region {
                x1: 10,
                y1: 5,
                x2: 20,
                y2: 15
            })
        );
    }

    #[test]
    fn region_must_fit_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("a.png");
        fs::write(&png, b"").unwrap();
        let p = png.to_str().unwrap();

        let e = args(&["-f", p, "-r", "2", "-c", "2", "-x", "20,10", "-y", "0,5"])
            .resolve()
            .unwrap_err();
        assert!(matches!(e, ConfigError::BadRegion(_)));
        let e = args(&["-f", p, "-r", "2", "-c", "2", "-x", "0,3000", "-y", "0,5"])
            .resolve()
            .unwrap_err();
        assert!(matches!(e, ConfigError::BadRegion(_)));
    }

    #[test]
    fn seeded_random_is_reproducible() {
        use rand::Rng;

        let config = ScrambleConfig {
            target: Target::File("a.png".into()),
            job: Job::new(Grid::new(1, 1).unwrap()),
            seed: Some("puzzle".into()),
        };
        assert_eq!(config.random().gen::<u64>(), config.random().gen::<u64>());
    }
}
