//! Byte to color mapping.
//!
//! Each byte splits into 3 red bits, 2 green bits and 3 blue bits, and each
//! field is spread evenly over 0..=255 so that small channel drift still
//! rounds back to the right level.

use image::Rgba;

const R_STEP: u32 = 36;
const G_STEP: u32 = 85;
const B_STEP: u32 = 36;

/// Map a byte to an opaque color.
pub fn color_from_byte(b: u8) -> Rgba<u8> {
    let r = ((b >> 5) & 0b111) as u32 * R_STEP;
    let g = ((b >> 3) & 0b11) as u32 * G_STEP;
    let bl = (b & 0b111) as u32 * B_STEP;
    Rgba([r as u8, g as u8, bl as u8, 255])
}

/// Invert [`color_from_byte`], rounding each channel to the nearest level.
pub fn byte_from_color(c: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = c.0;
    let r = nearest(r, R_STEP, 7);
    let g = nearest(g, G_STEP, 3);
    let b = nearest(b, B_STEP, 7);
    (r << 5) | (g << 3) | b
}

fn nearest(channel: u8, step: u32, max: u32) -> u8 {
    ((channel as u32 + step / 2) / step).min(max) as u8
}

/// XOR the color channels of `mask` into `pixel`, keeping `pixel`'s alpha.
pub fn xor_rgb(pixel: &mut Rgba<u8>, mask: [u8; 3]) {
    pixel.0[0] ^= mask[0];
    pixel.0[1] ^= mask[1];
    pixel.0[2] ^= mask[2];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_byte_roundtrips() {
        for b in 0..=255u8 {
            assert_eq!(byte_from_color(&color_from_byte(b)), b, "byte {b:#04x}");
        }
    }

    #[test]
    fn test_mapping() {
        assert_eq!(color_from_byte(0x00), Rgba([0, 0, 0, 255]));
        assert_eq!(color_from_byte(0xff), Rgba([252, 255, 252, 255]));
        assert_eq!(color_from_byte(0b101_10_011), Rgba([180, 170, 108, 255]));
    }

    #[test]
    fn test_tolerates_drift() {
        for b in 0..=255u8 {
            let mut c = color_from_byte(b);
            for ch in &mut c.0[..3] {
                *ch = ch.saturating_add(9);
            }
            assert_eq!(byte_from_color(&c), b);
        }
    }

    #[test]
    fn test_xor_keeps_alpha() {
        let mut p = Rgba([0xf0, 0x0f, 0xaa, 0x80]);
        xor_rgb(&mut p, [0xff, 0xff, 0xff]);
        assert_eq!(p, Rgba([0x0f, 0xf0, 0x55, 0x80]));
    }
}
