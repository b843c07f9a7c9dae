//! Masks XOR-blended over the grid region.
//!
//! Two kinds exist: a *pattern* image shipped with the template, and a
//! per-card [`CardMask`] of raw RGB bytes that is either random (and must be
//! stored by the caller) or derived from key material.

use image::RgbaImage;
use rand::RngCore;

use crate::color::xor_rgb;
use crate::error::{CardError, Result};

/// BLAKE3 context string for derived masks.
pub const DERIVED_MASK_CONTEXT: &str = "gwt vhash card mask v1";

/// How the per-card mask is chosen when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode<'a> {
    /// No per-card mask; only the pattern (if any) is applied.
    #[default]
    None,
    /// A fresh random mask, returned to the caller to keep.
    OneTime,
    /// A mask derived from this key material; nothing needs storing.
    Derived(&'a [u8]),
}

/// RGB mask bytes for every pixel of a square region, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct CardMask {
    side: u32,
    rgb: Vec<u8>,
}

impl CardMask {
    /// A fresh random mask.
    pub fn random(side: u32) -> Self {
        let mut rgb = vec![0u8; mask_len(side)];
        rand::thread_rng().fill_bytes(&mut rgb);
        Self { side, rgb }
    }

    /// A mask derived from `key`. The same key and side give the same mask.
    pub fn derive(key: &[u8], side: u32) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(DERIVED_MASK_CONTEXT);
        hasher.update(&side.to_be_bytes());
        hasher.update(key);

        let mut rgb = vec![0u8; mask_len(side)];
        hasher.finalize_xof().fill(&mut rgb);
        Self { side, rgb }
    }

    /// Rebuild a stored mask.
    pub fn from_bytes(side: u32, rgb: Vec<u8>) -> Result<Self> {
        let expected = mask_len(side);
        if rgb.len() != expected {
            return Err(CardError::MaskMismatch {
                expected,
                actual: rgb.len(),
            });
        }
        Ok(Self { side, rgb })
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgb
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.rgb
    }

    /// XOR the mask over a region image of the same side.
    pub(crate) fn apply(&self, region: &mut RgbaImage) -> Result<()> {
        if region.width() != self.side || region.height() != self.side {
            return Err(CardError::MaskMismatch {
                expected: mask_len(region.width().min(region.height())),
                actual: self.rgb.len(),
            });
        }
        for (pixel, rgb) in region.pixels_mut().zip(self.rgb.chunks_exact(3)) {
            xor_rgb(pixel, [rgb[0], rgb[1], rgb[2]]);
        }
        Ok(())
    }
}

impl std::fmt::Debug for CardMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardMask")
            .field("side", &self.side)
            .field("len", &self.rgb.len())
            .finish()
    }
}

/// XOR a pattern image over the region. The pattern's top-left pixel lines
/// up with the region's.
pub(crate) fn apply_pattern(region: &mut RgbaImage, pattern: &RgbaImage) -> Result<()> {
    check_pattern_covers(pattern, region.width())?;
    for (x, y, pixel) in region.enumerate_pixels_mut() {
        let m = pattern.get_pixel(x, y).0;
        xor_rgb(pixel, [m[0], m[1], m[2]]);
    }
    Ok(())
}

pub(crate) fn check_pattern_covers(pattern: &RgbaImage, side: u32) -> Result<()> {
    if pattern.width() < side || pattern.height() < side {
        return Err(CardError::ImageBounds(format!(
            "pattern {}x{} does not cover the {side}x{side} grid",
            pattern.width(),
            pattern.height()
        )));
    }
    Ok(())
}

fn mask_len(side: u32) -> usize {
    (side as usize) * (side as usize) * 3
}
