use crate::{
    consts::*,
    utils::{diff, hash},
};
use alloc::vec::Vec;
use byteorder::{BigEndian, ByteOrder};

#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

#[derive(Debug, Clone, Copy)]
pub struct QoiEncodeContext {
    pub prev: [u8; 4],
    pub arr: [[u8; 4]; 64],
}

impl QoiEncodeContext {
    pub const fn new() -> Self {
        Self {
            prev: [0, 0, 0, 255],
            arr: [[0; 4]; 64],
        }
    }
}

impl Default for QoiEncodeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One non-run operation, produced by [`QoiEncodeContext::select_op`].
///
/// The variants are listed in selection priority order; the selector tries
/// them top to bottom and the first applicable one wins. Reordering this
/// cascade would still decode correctly but change the emitted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Index(u8),
    Rgba([u8; 4]),
    Diff { dr: i8, dg: i8, db: i8 },
    Luma { dg: i8, dr_dg: i8, db_dg: i8 },
    Rgb([u8; 3]),
}

impl Op {
    /// Serializes the operation. Returns the byte buffer and the number of
    /// valid leading bytes.
    pub(crate) fn to_bytes(self) -> ([u8; 5], usize) {
        let mut buf = [0u8; 5];
        let len = match self {
            Op::Index(index) => {
                buf[0] = QOI_OP_INDEX | index;
                1
            }
            Op::Rgba([r, g, b, a]) => {
                buf = [QOI_OP_RGBA, r, g, b, a];
                5
            }
            Op::Diff { dr, dg, db } => {
                buf[0] = QOI_OP_DIFF
                    | (((dr + 2) as u8) << 4)
                    | (((dg + 2) as u8) << 2)
                    | (db + 2) as u8;
                1
            }
            Op::Luma { dg, dr_dg, db_dg } => {
                buf[0] = QOI_OP_LUMA | (dg + 32) as u8;
                buf[1] = (((dr_dg + 8) as u8) << 4) | (db_dg + 8) as u8;
                2
            }
            Op::Rgb([r, g, b]) => {
                buf[0] = QOI_OP_RGB;
                buf[1..4].copy_from_slice(&[r, g, b]);
                4
            }
        };
        (buf, len)
    }
}

pub(crate) fn header_bytes(
    width: u32,
    height: u32,
    channels: u8,
    colorspace: u8,
) -> [u8; QOI_HEADER_SIZE] {
    let mut header = [0u8; QOI_HEADER_SIZE];
    header[..4].copy_from_slice(&QOI_MAGIC);
    BigEndian::write_u32(&mut header[4..8], width);
    BigEndian::write_u32(&mut header[8..12], height);
    header[12] = channels;
    header[13] = colorspace;
    header
}

impl QoiEncodeContext {
    /// Picks the operation for a pixel that differs from the previous one,
    /// updating the previous pixel and the color array as a side effect.
    ///
    /// An INDEX hit leaves the color array untouched (the slot already holds
    /// this color); every other outcome stores the pixel into its slot first.
    pub(crate) fn select_op(&mut self, pixel: [u8; 4]) -> Op {
        let [r, g, b, a] = pixel;
        let [pr, pg, pb, pa] = self.prev;
        self.prev = pixel;

        let index = hash(pixel);
        if self.arr[usize::from(index)] == pixel {
            return Op::Index(index);
        }
        self.arr[usize::from(index)] = pixel;

        if a != pa {
            return Op::Rgba(pixel);
        }

        let (dr, dg, db) = (diff(r, pr), diff(g, pg), diff(b, pb));
        if matches!((dr, dg, db), (-2..=1, -2..=1, -2..=1)) {
            return Op::Diff { dr, dg, db };
        }

        let (dr_dg, db_dg) = (dr.wrapping_sub(dg), db.wrapping_sub(dg));
        if matches!((dg, dr_dg, db_dg), (-32..=31, -8..=7, -8..=7)) {
            return Op::Luma { dg, dr_dg, db_dg };
        }

        Op::Rgb([r, g, b])
    }

    /// Encodes an image into `w`.
    ///
    /// `pixels` is the raw row-major buffer, `channels` bytes per pixel
    /// (3 = RGB, 4 = RGBA). Returns `false` without touching `w` if
    /// `channels` is not 3 or 4 or the buffer length doesn't match
    /// `width * height * channels`.
    pub fn encode_to_vec(
        width: u32,
        height: u32,
        channels: u8,
        colorspace: u8,
        pixels: &[u8],
        w: &mut Vec<u8>,
    ) -> bool {
        let mut state = QoiEncodeContext::new();
        state.encode_to_vec_with_state(width, height, channels, colorspace, pixels, w)
    }

    pub fn encode_to_vec_with_state(
        &mut self,
        width: u32,
        height: u32,
        channels: u8,
        colorspace: u8,
        pixels: &[u8],
        w: &mut Vec<u8>,
    ) -> bool {
        if channels != 3 && channels != 4 {
            return false;
        }
        let px_num = (width as usize) * (height as usize);
        if px_num * usize::from(channels) != pixels.len() {
            return false;
        }

        w.extend_from_slice(&header_bytes(width, height, channels, colorspace));

        let mut run = 0u8;
        for (i, px) in pixels.chunks_exact(usize::from(channels)).enumerate() {
            let pixel = match *px {
                [r, g, b] => [r, g, b, 255],
                [r, g, b, a] => [r, g, b, a],
                _ => unreachable!(),
            };

            if pixel == self.prev {
                run += 1;
                if run == QOI_RUN_MAX || i == px_num - 1 {
                    w.push(QOI_OP_RUN | (run - 1));
                    run = 0;
                }
                // already same as prev, no state to update
                continue;
            }

            if run > 0 {
                w.push(QOI_OP_RUN | (run - 1));
                run = 0;
            }

            let (buf, len) = self.select_op(pixel).to_bytes();
            w.extend_from_slice(&buf[..len]);
        }

        w.extend_from_slice(&QOI_PADDING);

        true
    }
}
