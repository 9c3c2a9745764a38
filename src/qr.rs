//!
//! The QR decode routine
//!
//! One concrete [Decoder] over rqrr. The loop treats decoding as a black
//! box; nothing outside this module knows the symbol family.
//!

use crate::scan::{Decoded, Decoder};

/// QR decoding over raw RGBA pixel bytes
pub struct QrDecoder;

impl Decoder for QrDecoder {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<Decoded> {
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 || pixels.len() < width * height * 4 {
            return None;
        }

        let luma = rgba_to_luma(pixels, width, height);
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| luma[y * width + x]);

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, text)) => return Some(Decoded { text }),
                Err(err) => {
                    debug!("grid failed to decode: {err}");
                }
            }
        }

        None
    }
}

fn rgba_to_luma(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut luma = Vec::with_capacity(width * height);
    for px in pixels.chunks_exact(4).take(width * height) {
        let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
        luma.push(((r * 76 + g * 150 + b * 29) >> 8) as u8);
    }
    luma
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_frame_decodes_to_nothing() {
        let frame = vec![0xFFu8; 64 * 64 * 4];
        assert!(QrDecoder.decode(&frame, 64, 64).is_none());
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let frame = vec![0u8; 16];
        assert!(QrDecoder.decode(&frame, 64, 64).is_none());
        assert!(QrDecoder.decode(&[], 0, 0).is_none());
    }

    #[test]
    fn luma_weights_sum_to_one() {
        // white stays white, black stays black
        let white = rgba_to_luma(&[0xFF, 0xFF, 0xFF, 0xFF], 1, 1);
        let black = rgba_to_luma(&[0, 0, 0, 0xFF], 1, 1);
        assert!(white[0] >= 0xFE);
        assert_eq!(black[0], 0);
    }
}
