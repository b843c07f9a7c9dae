//! Rendering a hash onto a card template and reading it back.

use std::io::{Cursor, ErrorKind};
use std::path::Path;

use image::{imageops, ImageFormat, RgbaImage};
use tracing::debug;

use crate::color::{byte_from_color, color_from_byte};
use crate::config::CardConfig;
use crate::error::{CardError, Result};
use crate::mask::{apply_pattern, check_pattern_covers, CardMask, MaskMode};

/// A rendered card.
#[derive(Debug, Clone)]
pub struct EncodedCard {
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Set for [`MaskMode::OneTime`]; the caller must keep it to decode.
    pub one_time_mask: Option<CardMask>,
}

/// Encodes hashes into card images and decodes them back.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct CardCodec {
    config: CardConfig,
    template: RgbaImage,
    pattern: Option<RgbaImage>,
}

impl CardCodec {
    /// Build from in-memory images.
    pub fn new(config: CardConfig, template: RgbaImage, pattern: Option<RgbaImage>) -> Result<Self> {
        config.validate()?;
        config.check_fits(template.width(), template.height())?;
        if let Some(pattern) = &pattern {
            check_pattern_covers(pattern, config.region_side())?;
        }
        Ok(Self {
            config,
            template,
            pattern,
        })
    }

    /// Build by loading the configured template and pattern files.
    pub fn from_config(config: CardConfig) -> Result<Self> {
        let template_path = config
            .template_path
            .as_deref()
            .ok_or_else(|| CardError::MissingAsset("no template_path configured".into()))?;
        let template = load_png(template_path)?;
        let pattern = match config.mask_path.as_deref() {
            Some(path) => Some(load_png(path)?),
            None => None,
        };
        Self::new(config, template, pattern)
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// The mask [`MaskMode::Derived`] would apply for `key`.
    pub fn derived_mask(&self, key: &[u8]) -> CardMask {
        CardMask::derive(key, self.config.region_side())
    }

    /// Render `hash` onto a copy of the template.
    pub fn encode(&self, hash: &[u8], mode: MaskMode<'_>) -> Result<EncodedCard> {
        let expected = self.config.hash_len();
        if hash.len() != expected {
            return Err(CardError::HashLength {
                expected,
                actual: hash.len(),
            });
        }

        let side = self.config.region_side();
        let cells = self.config.grid_cells;
        let cell = self.config.cell_size;

        let mut region = RgbaImage::from_fn(side, side, |x, y| {
            let index = (y / cell) * cells + (x / cell);
            color_from_byte(hash[index as usize])
        });

        if let Some(pattern) = &self.pattern {
            apply_pattern(&mut region, pattern)?;
        }

        let one_time_mask = match mode {
            MaskMode::None => None,
            MaskMode::OneTime => {
                let mask = CardMask::random(side);
                mask.apply(&mut region)?;
                Some(mask)
            }
            MaskMode::Derived(key) => {
                self.derived_mask(key).apply(&mut region)?;
                None
            }
        };

        let mut card = self.template.clone();
        imageops::replace(
            &mut card,
            &region,
            self.config.grid_origin.x as i64,
            self.config.grid_origin.y as i64,
        );

        let mut png = Vec::new();
        card.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(EncodedCard { png, one_time_mask })
    }

    /// Recover the hash from PNG bytes.
    ///
    /// Pass the one-time mask returned by [`CardCodec::encode`], or
    /// [`CardCodec::derived_mask`] for derived cards.
    pub fn decode(&self, png: &[u8], mask: Option<&CardMask>) -> Result<Vec<u8>> {
        let card = image::load_from_memory_with_format(png, ImageFormat::Png)?.to_rgba8();
        self.config.check_fits(card.width(), card.height())?;

        let side = self.config.region_side();
        let mut region = imageops::crop_imm(
            &card,
            self.config.grid_origin.x,
            self.config.grid_origin.y,
            side,
            side,
        )
        .to_image();

        if let Some(mask) = mask {
            mask.apply(&mut region)?;
        }
        if let Some(pattern) = &self.pattern {
            apply_pattern(&mut region, pattern)?;
        }

        let cells = self.config.grid_cells;
        let mut hash = Vec::with_capacity(self.config.hash_len());
        for row in 0..cells {
            for col in 0..cells {
                hash.push(self.sample_cell(&region, col, row));
            }
        }
        Ok(hash)
    }

    /// Encode and write the PNG to `path`.
    pub fn encode_to_file(
        &self,
        hash: &[u8],
        mode: MaskMode<'_>,
        path: impl AsRef<Path>,
    ) -> Result<Option<CardMask>> {
        let path = path.as_ref();
        let card = self.encode(hash, mode)?;
        std::fs::write(path, &card.png)?;
        debug!(path = %path.display(), bytes = card.png.len(), "wrote card");
        Ok(card.one_time_mask)
    }

    /// Encode and write to the configured `export_path`.
    pub fn export(&self, hash: &[u8], mode: MaskMode<'_>) -> Result<Option<CardMask>> {
        let path = self
            .config
            .export_path
            .as_deref()
            .ok_or_else(|| CardError::MissingAsset("no export_path configured".into()))?;
        self.encode_to_file(hash, mode, path)
    }

    /// Read a PNG file and decode it.
    pub fn decode_file(&self, path: impl AsRef<Path>, mask: Option<&CardMask>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let png = read_asset(path)?;
        debug!(path = %path.display(), bytes = png.len(), "read card");
        self.decode(&png, mask)
    }

    /// Average the centered sample square of one cell and invert its color.
    fn sample_cell(&self, region: &RgbaImage, col: u32, row: u32) -> u8 {
        let cell = self.config.cell_size;
        let sample = self.config.sample_size;
        let x0 = col * cell + self.config.sample_offset();
        let y0 = row * cell + self.config.sample_offset();

        let mut sum = [0u32; 4];
        for y in y0..y0 + sample {
            for x in x0..x0 + sample {
                let p = region.get_pixel(x, y).0;
                for (acc, ch) in sum.iter_mut().zip(p) {
                    *acc += ch as u32;
                }
            }
        }

        let count = sample * sample;
        let avg = image::Rgba(sum.map(|s| ((s + count / 2) / count) as u8));
        byte_from_color(&avg)
    }
}

fn read_asset(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CardError::MissingAsset(path.display().to_string()),
        _ => CardError::Io(e),
    })
}

fn load_png(path: &Path) -> Result<RgbaImage> {
    let bytes = read_asset(path)?;
    debug!(path = %path.display(), "loaded card asset");
    Ok(image::load_from_memory_with_format(&bytes, ImageFormat::Png)?.to_rgba8())
}
