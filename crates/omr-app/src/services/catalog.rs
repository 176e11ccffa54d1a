// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image catalog and pickers — choose the key and submission photographs from
// a folder, either by number on the console or with a native file dialog.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use omr_core::Result;
use tracing::{debug, info};

/// File extensions accepted as sheet photographs.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Sorted list of the image files in one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCatalog {
    dir: PathBuf,
    entries: Vec<PathBuf>,
}

impl ImageCatalog {
    /// List the images directly inside `dir`, sorted by file name.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                entries.push(path);
            }
        }
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        info!(dir = %dir.display(), images = entries.len(), "image catalog scanned");
        Ok(Self { dir, entries })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by 1-based menu number.
    pub fn get(&self, number: usize) -> Option<&Path> {
        number
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(PathBuf::as_path)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Asks the user for one photograph.
pub trait ImagePicker {
    /// Show the choice under `prompt`. Returns `None` if the user cancelled.
    fn pick_image(&mut self, prompt: &str) -> Result<Option<PathBuf>>;
}

/// Numbered menu over an [`ImageCatalog`], read from any line source.
pub struct ConsoleImagePicker<'a, R, W> {
    catalog: &'a ImageCatalog,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> ConsoleImagePicker<'a, R, W> {
    pub fn new(catalog: &'a ImageCatalog, input: R, output: W) -> Self {
        Self {
            catalog,
            input,
            output,
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "Available images:")?;
        for (i, path) in self.catalog.entries().iter().enumerate() {
            let name = path.file_name().unwrap_or(path.as_os_str());
            writeln!(self.output, "{}) {}", i + 1, name.to_string_lossy())?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> ImagePicker for ConsoleImagePicker<'_, R, W> {
    /// Re-prompts until a listed number is entered. End of input cancels.
    fn pick_image(&mut self, prompt: &str) -> Result<Option<PathBuf>> {
        if self.catalog.is_empty() {
            writeln!(
                self.output,
                "No images found in {}.",
                self.catalog.dir().display()
            )?;
            return Ok(None);
        }

        loop {
            self.print_menu()?;
            write!(self.output, "\n{prompt}: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                debug!("picker input closed");
                return Ok(None);
            }

            let choice = line.trim().parse::<usize>().ok();
            if let Some(path) = choice.and_then(|n| self.catalog.get(n)) {
                debug!(path = %path.display(), "image picked");
                return Ok(Some(path.to_path_buf()));
            }
            writeln!(self.output, "The choice must be one of the options above!\n")?;
        }
    }
}

/// Native file dialog filtered to image files.
#[cfg(feature = "dialog")]
pub struct DialogImagePicker {
    start_dir: PathBuf,
}

#[cfg(feature = "dialog")]
impl DialogImagePicker {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }
}

#[cfg(feature = "dialog")]
impl ImagePicker for DialogImagePicker {
    fn pick_image(&mut self, prompt: &str) -> Result<Option<PathBuf>> {
        let picked = rfd::FileDialog::new()
            .set_title(prompt)
            .set_directory(&self.start_dir)
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = &picked {
            info!(path = %path.display(), "image picked from dialog");
        }
        Ok(picked)
    }
}
