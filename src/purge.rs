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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::scramble::{has_png_extension, is_scrambled};

/// Files removed by [`purge`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: Vec<PathBuf>,
}

/// Deletes scrambled outputs (`s_*.png`) directly inside `dir`.
///
/// Not recursive. Anything else in the directory is left alone.
pub fn purge(dir: &Path) -> io::Result<PurgeReport> {
    let mut targets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_png_extension(&path) && is_scrambled(&path) {
            targets.push(path);
        }
    }
    targets.sort();

    for path in &targets {
        debug!("removing {}", path.display());
        fs::remove_file(path)?;
    }

    Ok(PurgeReport { deleted: targets })
}
