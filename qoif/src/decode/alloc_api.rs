use crate::{
    consts::*,
    decode::{
        bytes_per_pixel,
        ops::{apply_diff, apply_luma},
        parse_header, HeaderParseError, QoiDecodeContext,
    },
    utils::hash,
    Header,
};
use alloc::vec::Vec;
use snafu::{ensure, Snafu};

#[derive(Debug, Snafu)]
pub enum DecodeToVecError {
    UnexpectedEof,
    InvalidMagic,
    /// The pixel data decoded fully but the 8-byte end marker didn't match.
    /// `w` still holds the complete decoded image.
    TrailerMismatch { header: Header },
}

impl QoiDecodeContext {
    /// Decodes a QOI image, appending the raw pixel bytes to `w`.
    pub fn decode_to_vec(data: &[u8], w: &mut Vec<u8>) -> Result<Header, DecodeToVecError> {
        let mut state = QoiDecodeContext::new();
        state.decode_to_vec_with_state(data, w)
    }

    pub fn decode_to_vec_with_state(
        &mut self,
        data: &[u8],
        w: &mut Vec<u8>,
    ) -> Result<Header, DecodeToVecError> {
        let header = parse_header(data).map_err(|e| match e {
            HeaderParseError::UnexpectedEof => DecodeToVecError::UnexpectedEof,
            HeaderParseError::InvalidMagic => DecodeToVecError::InvalidMagic,
        })?;

        let px_num = (header.width as usize) * (header.height as usize);
        let bpp = bytes_per_pixel(header.channels);
        w.reserve(px_num * bpp);

        let mut data = data[QOI_HEADER_SIZE..].iter().copied();
        let mut next = || data.next().ok_or(DecodeToVecError::UnexpectedEof);

        let mut run = 0u8;
        for _ in 0..px_num {
            if run > 0 {
                run -= 1;
            } else {
                let tag = next()?;
                match tag {
                    QOI_OP_RGB => {
                        self.prev[0] = next()?;
                        self.prev[1] = next()?;
                        self.prev[2] = next()?;
                    }
                    QOI_OP_RGBA => {
                        self.prev = [next()?, next()?, next()?, next()?];
                    }
                    _ => match tag & QOI_MASK_2 {
                        QOI_OP_INDEX => self.prev = self.arr[usize::from(tag & 0x3f)],
                        QOI_OP_DIFF => self.prev = apply_diff(self.prev, tag),
                        QOI_OP_LUMA => self.prev = apply_luma(self.prev, tag, next()?),
                        QOI_OP_RUN => run = tag & 0x3f,
                        _ => unreachable!(),
                    },
                }

                self.arr[usize::from(hash(self.prev))] = self.prev;
            }

            w.extend_from_slice(&self.prev[..bpp]);
        }

        let mut valid = true;
        for expected in QOI_PADDING {
            if next()? != expected {
                valid = false;
            }
        }
        ensure!(valid, TrailerMismatchSnafu { header });

        Ok(header)
    }
}
