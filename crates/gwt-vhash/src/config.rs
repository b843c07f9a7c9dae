//! Card geometry and asset locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};

/// Top-left corner of the grid inside the template, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOrigin {
    pub x: u32,
    pub y: u32,
}

impl Default for GridOrigin {
    fn default() -> Self {
        Self { x: 8, y: 8 }
    }
}

/// Configuration for a [`CardCodec`](crate::CardCodec).
///
/// Paths are optional; a codec built from in-memory images needs none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub grid_origin: GridOrigin,
    /// Cells per side. The grid holds `grid_cells²` bytes.
    pub grid_cells: u32,
    /// Cell side length in pixels.
    pub cell_size: u32,
    /// Side of the centered square sampled in each cell when decoding.
    pub sample_size: u32,
    pub template_path: Option<PathBuf>,
    pub mask_path: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            grid_origin: GridOrigin::default(),
            grid_cells: 8,
            cell_size: 16,
            sample_size: 4,
            template_path: None,
            mask_path: None,
            export_path: None,
        }
    }
}

impl CardConfig {
    /// Number of bytes one card carries.
    pub fn hash_len(&self) -> usize {
        (self.grid_cells as usize) * (self.grid_cells as usize)
    }

    /// Side of the grid region in pixels.
    pub fn region_side(&self) -> u32 {
        self.grid_cells.saturating_mul(self.cell_size)
    }

    /// Offset of the sample square from a cell's corner.
    pub fn sample_offset(&self) -> u32 {
        self.cell_size.saturating_sub(self.sample_size) / 2
    }

    /// Reject geometry that cannot round-trip.
    pub fn validate(&self) -> Result<()> {
        if self.grid_cells == 0 || self.cell_size == 0 {
            return Err(CardError::ImageBounds(
                "grid_cells and cell_size must be non-zero".into(),
            ));
        }
        if self.sample_size == 0 || self.sample_size > self.cell_size {
            return Err(CardError::ImageBounds(format!(
                "sample_size {} must be in 1..={}",
                self.sample_size, self.cell_size
            )));
        }
        if self.grid_cells.checked_mul(self.cell_size).is_none() {
            return Err(CardError::ImageBounds("grid is too large".into()));
        }
        Ok(())
    }

    /// Check that the grid region lies inside a `width`×`height` image.
    pub fn check_fits(&self, width: u32, height: u32) -> Result<()> {
        let side = self.region_side() as u64;
        let right = self.grid_origin.x as u64 + side;
        let bottom = self.grid_origin.y as u64 + side;
        if right > width as u64 || bottom > height as u64 {
            return Err(CardError::ImageBounds(format!(
                "grid ({}, {})+{side} exceeds image {width}x{height}",
                self.grid_origin.x, self.grid_origin.y
            )));
        }
        Ok(())
    }
}
