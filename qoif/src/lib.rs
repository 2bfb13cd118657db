//! Codec for the [QOI image format](https://qoiformat.org/) (8-bit RGB/RGBA).
//!
//! QOI compresses losslessly by walking the pixels in row-major order and
//! emitting one small operation per pixel (or per run of identical pixels).
//! Each operation describes the pixel relative to the decoder state: the
//! previously seen pixel and a 64-entry array of recently seen colors.
//!
//! # Stream layout
//!
//! - 14-byte header: magic `qoif`, u32 big-endian width, u32 big-endian
//!   height, u8 channel count (3 = RGB, 4 = RGBA), u8 colorspace
//!   (0 = sRGB with linear alpha, 1 = all channels linear). The colorspace
//!   byte is carried through unchanged and never interpreted.
//! - data: a sequence of the operations described in [consts], covering
//!   exactly `width * height` pixels.
//! - 8-byte end marker: seven `0x00` bytes followed by `0x01`.
//!
//! 3-channel images use an implicit alpha of 255 everywhere: the color array,
//! the previous-pixel state, and the hash all operate on full RGBA values.
//!
//! # API layers
//!
//! Decoding into a caller-provided slice works without `alloc`. The `alloc`
//! feature adds `Vec`-based encode/decode, and `std` adds an
//! [`std::io::Write`]-based encoder.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
pub mod encode;

pub mod decode;
pub mod utils;

pub use decode::QoiDecodeContext;
#[cfg(feature = "alloc")]
pub use encode::QoiEncodeContext;

/// The fields of a QOI stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    /// 3 = RGB, 4 = RGBA. Decoding accepts this byte as-is; any value other
    /// than 4 produces 3-channel output.
    pub channels: u8,
    /// 0 = sRGB with linear alpha, 1 = all channels linear. Never validated
    /// or interpreted, only carried through.
    pub colorspace: u8,
}

pub mod consts {
    /// Re-emit a pixel from the color array.
    ///
    /// ```plain
    /// .- QOI_OP_INDEX ----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  0  0 |     index       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b00
    /// - 6-bit index into the color array: 0..63
    pub const QOI_OP_INDEX: u8 = 0b0000_0000;

    /// Calculate a pixel based on a 2-bit per-channel difference from the
    /// previous pixel. Alpha is unchanged.
    ///
    /// ```plain
    /// .- QOI_OP_DIFF -----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----+-----+-----|
    /// |  0  1 |  dr |  dg |  db |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b01
    /// - 2-bit red/green/blue channel differences from the previous pixel
    ///   between -2..1, stored with a bias of 2
    /// - differences wrap around the 8-bit channel range
    pub const QOI_OP_DIFF: u8 = 0b0100_0000;

    /// Calculate a pixel based on a 6-bit green-channel difference from the
    /// previous pixel, and differences to the green-channel difference for
    /// red and blue. Alpha is unchanged.
    ///
    /// ```plain
    /// .- QOI_OP_LUMA -------------------------------------.
    /// |         Byte[0]         |         Byte[1]         |
    /// |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------+-------------+-----------|
    /// |  1  0 |   green diff    |   dr - dg   |  db - dg  |
    /// `---------------------------------------------------`
    /// ```
    ///
    /// - 2-bit tag b10
    /// - 6-bit green channel difference from the previous pixel (`-32..31`),
    ///   stored with a bias of 32
    /// - 4-bit red channel difference minus green channel difference
    ///   (`-8..7`), stored with a bias of 8
    /// - 4-bit blue channel difference minus green channel difference
    ///   (`-8..7`), stored with a bias of 8
    pub const QOI_OP_LUMA: u8 = 0b1000_0000;

    /// Repeats the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RUN ------------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  1  1 |       run       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b11
    /// - 6-bit run-length repeating the previous pixel: 1..62, stored with a
    ///   bias of -1. The run-lengths 63 and 64 (`b111110` and `b111111`) are
    ///   illegal as they are occupied by the QOI_OP_RGB and QOI_OP_RGBA tags.
    pub const QOI_OP_RUN: u8 = 0b1100_0000;

    /// Emits raw red, green, and blue values. Alpha is unchanged.
    ///
    /// ```plain
    /// .- QOI_OP_RGB ------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  0 |   red   |  green  |  blue   |
    /// `-------------------------------------------------------`
    /// ```
    pub const QOI_OP_RGB: u8 = 0xfe;

    /// Emits raw red, green, blue, and alpha values.
    ///
    /// ```plain
    /// .- QOI_OP_RGBA ---------------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] | Byte[4] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  1 |   red   |  green  |  blue   |  alpha  |
    /// `-----------------------------------------------------------------`
    /// ```
    pub const QOI_OP_RGBA: u8 = 0xff;

    /// Mask for the 2-bit tag in the top bits of an opcode byte.
    pub const QOI_MASK_2: u8 = 0xc0;

    /// The four magic bytes opening every stream.
    pub const QOI_MAGIC: [u8; 4] = *b"qoif";

    /// Total header size in bytes.
    pub const QOI_HEADER_SIZE: usize = 14;

    /// End-of-stream marker following the pixel data.
    pub const QOI_PADDING: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

    /// Longest run a single QOI_OP_RUN can carry.
    pub const QOI_RUN_MAX: u8 = 62;
}
