use crate::{
    consts::*,
    decode::ops::{apply_diff, apply_luma},
    utils::hash,
    Header,
};
use byteorder::{BigEndian, ByteOrder};
use snafu::{ensure, Snafu};

pub(crate) mod ops;

#[cfg(feature = "alloc")]
mod alloc_api;
#[cfg(feature = "alloc")]
pub use alloc_api::*;

#[derive(Debug, Clone, Copy)]
pub struct QoiDecodeContext {
    pub prev: [u8; 4],
    pub arr: [[u8; 4]; 64],
}

impl QoiDecodeContext {
    pub const fn new() -> Self {
        Self {
            prev: [0, 0, 0, 255],
            arr: [[0; 4]; 64],
        }
    }
}

impl Default for QoiDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum DecodeError {
    OutputTooSmall,
    UnexpectedEof,
    InvalidMagic,
    /// The pixel data decoded fully but the 8-byte end marker didn't match.
    /// The output buffer still holds the complete decoded image.
    TrailerMismatch { header: Header },
}

pub(crate) enum HeaderParseError {
    UnexpectedEof,
    InvalidMagic,
}

/// Parses the 14-byte preamble. The magic is checked before any other field
/// is trusted; the remaining fields are accepted as-is.
pub(crate) fn parse_header(data: &[u8]) -> Result<Header, HeaderParseError> {
    if data.len() < QOI_HEADER_SIZE {
        return Err(HeaderParseError::UnexpectedEof);
    }
    if data[..4] != QOI_MAGIC {
        return Err(HeaderParseError::InvalidMagic);
    }
    Ok(Header {
        width: BigEndian::read_u32(&data[4..8]),
        height: BigEndian::read_u32(&data[8..12]),
        channels: data[12],
        colorspace: data[13],
    })
}

/// Output bytes per pixel for a declared channel count. Any value other than
/// 4 is emitted as 3 bytes per pixel, matching the encoder's interpretation.
pub(crate) fn bytes_per_pixel(channels: u8) -> usize {
    if channels == 4 {
        4
    } else {
        3
    }
}

impl QoiDecodeContext {
    /// Decodes a QOI image into a caller-provided byte slice.
    ///
    /// Returns the parsed header; the number of bytes written is
    /// `width * height * bytes_per_pixel` where `bytes_per_pixel` is 4 for
    /// 4-channel streams and 3 otherwise.
    ///
    /// On [`DecodeError::TrailerMismatch`] the output slice holds the full
    /// decoded image anyway; the error carries the header so callers can
    /// still interpret the buffer.
    pub fn decode_to_slice(data: &[u8], output: &mut [u8]) -> Result<Header, DecodeError> {
        let mut state = QoiDecodeContext::new();
        state.decode_to_slice_with_state(data, output)
    }

    pub fn decode_to_slice_with_state(
        &mut self,
        data: &[u8],
        output: &mut [u8],
    ) -> Result<Header, DecodeError> {
        let header = parse_header(data).map_err(|e| match e {
            HeaderParseError::UnexpectedEof => DecodeError::UnexpectedEof,
            HeaderParseError::InvalidMagic => DecodeError::InvalidMagic,
        })?;

        let px_num = (header.width as usize) * (header.height as usize);
        let bpp = bytes_per_pixel(header.channels);
        ensure!(
            output.len() >= px_num * bpp,
            decode_error::OutputTooSmallSnafu
        );

        let mut data = data[QOI_HEADER_SIZE..].iter().copied();
        let mut next = || data.next().ok_or(DecodeError::UnexpectedEof);

        let mut run = 0u8;
        let mut out_idx = 0;
        for _ in 0..px_num {
            if run > 0 {
                // Run continuation: re-emit the previous pixel without
                // consuming input or touching the color array.
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

                // Stored after every tag, even for INDEX hits (same value)
                // and RUN tags (previous pixel into its own slot).
                self.arr[usize::from(hash(self.prev))] = self.prev;
            }

            output[out_idx..out_idx + bpp].copy_from_slice(&self.prev[..bpp]);
            out_idx += bpp;
        }

        // Read the whole end marker before judging it, like the reference
        // codec does.
        let mut valid = true;
        for expected in QOI_PADDING {
            if next()? != expected {
                valid = false;
            }
        }
        ensure!(valid, decode_error::TrailerMismatchSnafu { header });

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::header_bytes;

    fn stream(header: [u8; QOI_HEADER_SIZE], data: &[u8]) -> Vec<u8> {
        let mut v = header.to_vec();
        v.extend_from_slice(data);
        v.extend_from_slice(&QOI_PADDING);
        v
    }

    #[test]
    fn corrupted_magic_fails_before_output() {
        let mut s = stream(header_bytes(1, 1, 3, 0), &[QOI_OP_RUN]);
        s[0] = b'X';
        let mut out = [0xaau8; 3];
        let err = QoiDecodeContext::decode_to_slice(&s, &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidMagic));
        assert_eq!(out, [0xaa; 3], "output must be untouched");
    }

    #[test]
    fn zero_pixel_image() {
        let s = stream(header_bytes(0, 0, 3, 0), &[]);
        let header = QoiDecodeContext::decode_to_slice(&s, &mut []).unwrap();
        assert_eq!(
            header,
            Header {
                width: 0,
                height: 0,
                channels: 3,
                colorspace: 0
            }
        );
    }

    #[test]
    fn single_black_pixel_stream() {
        let s = stream(header_bytes(1, 1, 3, 0), &[QOI_OP_RUN]);
        assert_eq!(s.len(), 23);
        let mut out = [0xaau8; 3];
        QoiDecodeContext::decode_to_slice(&s, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0]);
    }

    #[test]
    fn index_of_unset_slot_is_transparent_black() {
        let s = stream(header_bytes(1, 1, 4, 0), &[QOI_OP_INDEX | 5]);
        let mut out = [0xaau8; 4];
        QoiDecodeContext::decode_to_slice(&s, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn index_hit_restores_slot() {
        // RGB(5,5,5) stores into slot hash(5,5,5,255) == 0; the following
        // INDEX re-stores the same value there. Pinned so the redundant
        // store never gets "optimized" away.
        let s = stream(
            header_bytes(2, 1, 3, 0),
            &[QOI_OP_RGB, 5, 5, 5, QOI_OP_INDEX],
        );
        let mut out = [0u8; 6];
        let mut ctx = QoiDecodeContext::new();
        ctx.decode_to_slice_with_state(&s, &mut out).unwrap();
        assert_eq!(out, [5, 5, 5, 5, 5, 5]);
        assert_eq!(ctx.arr[0], [5, 5, 5, 255]);
    }

    #[test]
    fn run_tag_stores_previous_pixel() {
        // A RUN tag writes the previous pixel into its own hash slot.
        let s = stream(header_bytes(2, 1, 3, 0), &[QOI_OP_RGB, 9, 9, 9, QOI_OP_RUN]);
        let mut out = [0u8; 6];
        let mut ctx = QoiDecodeContext::new();
        ctx.decode_to_slice_with_state(&s, &mut out).unwrap();
        assert_eq!(out, [9, 9, 9, 9, 9, 9]);
        assert_eq!(ctx.arr[usize::from(crate::utils::hash([9, 9, 9, 255]))], [9, 9, 9, 255]);
    }

    #[test]
    fn truncated_stream_is_eof() {
        let s = stream(header_bytes(2, 1, 3, 0), &[QOI_OP_RGB, 1, 2]);
        // data bytes run out mid-op
        let mut out = [0u8; 6];
        let err = QoiDecodeContext::decode_to_slice(&s[..17], &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof));
    }

    #[test]
    fn trailer_mismatch_keeps_pixels() {
        let mut s = stream(header_bytes(1, 1, 3, 0), &[QOI_OP_RGB, 7, 8, 9]);
        let last = s.len() - 1;
        s[last] = 0;
        let mut out = [0u8; 3];
        let err = QoiDecodeContext::decode_to_slice(&s, &mut out).unwrap_err();
        match err {
            DecodeError::TrailerMismatch { header } => {
                assert_eq!(header.width, 1);
                assert_eq!(header.channels, 3);
            }
            other => panic!("expected trailer mismatch, got {other:?}"),
        }
        assert_eq!(out, [7, 8, 9], "decoded pixels survive the bad trailer");
    }

    #[test]
    fn output_too_small() {
        let s = stream(header_bytes(2, 2, 3, 0), &[QOI_OP_RUN | 3]);
        let mut out = [0u8; 11];
        let err = QoiDecodeContext::decode_to_slice(&s, &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::OutputTooSmall));
    }

    #[test]
    fn unknown_channel_count_decodes_as_rgb() {
        // channels is carried through unchecked; anything but 4 emits 3
        // bytes per pixel.
        let s = stream(header_bytes(1, 1, 0, 7), &[QOI_OP_RUN]);
        let mut out = [0xaau8; 3];
        let header = QoiDecodeContext::decode_to_slice(&s, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0]);
        assert_eq!(header.channels, 0);
        assert_eq!(header.colorspace, 7);
    }
}
