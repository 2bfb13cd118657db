use crate::{
    consts::*,
    encode::{header_bytes, QoiEncodeContext},
};
use snafu::{ensure, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display("invalid channel count {channels}, must be 3 (RGB) or 4 (RGBA)"))]
    InvalidChannels { channels: u8 },
    #[snafu(display(
        "specified image dimensions don't match the pixel buffer: {width} * {height} * {channels} == {} bytes, but {byte_count} bytes were given",
        *width as usize * *height as usize * *channels as usize
    ))]
    InvalidDimensions {
        width: u32,
        height: u32,
        channels: u8,
        byte_count: usize,
    },
    WriteIo {
        source: std::io::Error,
    },
}

impl QoiEncodeContext {
    /// Encodes an image to any [`Write`] sink.
    ///
    /// `pixels` is the raw row-major buffer, `channels` bytes per pixel.
    pub fn encode<W: Write>(
        width: u32,
        height: u32,
        channels: u8,
        colorspace: u8,
        pixels: &[u8],
        w: W,
    ) -> Result<(), EncodeError> {
        let mut ctx = QoiEncodeContext::new();
        ctx.encode_with_state(width, height, channels, colorspace, pixels, w)
    }

    pub fn encode_header<W: Write>(
        width: u32,
        height: u32,
        channels: u8,
        colorspace: u8,
        mut w: W,
    ) -> Result<(), EncodeError> {
        w.write_all(&header_bytes(width, height, channels, colorspace))
            .context(WriteIoSnafu)
    }

    pub fn encode_with_state<W: Write>(
        &mut self,
        width: u32,
        height: u32,
        channels: u8,
        colorspace: u8,
        pixels: &[u8],
        mut w: W,
    ) -> Result<(), EncodeError> {
        ensure!(channels == 3 || channels == 4, InvalidChannelsSnafu { channels });
        ensure!(
            (width as usize) * (height as usize) * usize::from(channels) == pixels.len(),
            InvalidDimensionsSnafu {
                width,
                height,
                channels,
                byte_count: pixels.len()
            }
        );

        Self::encode_header(width, height, channels, colorspace, &mut w)?;
        self.encode_pixels(channels, pixels, w)?;

        Ok(())
    }

    /// Encodes the pixel data and the end marker, without the header.
    ///
    /// The final pixel of `pixels` is treated as the final pixel of the
    /// image, so any pending run is flushed at the end.
    pub fn encode_pixels<W: Write>(
        &mut self,
        channels: u8,
        pixels: &[u8],
        mut w: W,
    ) -> Result<(), EncodeError> {
        ensure!(channels == 3 || channels == 4, InvalidChannelsSnafu { channels });

        macro_rules! w {
            ($bytes:expr) => {
                w.write_all($bytes).context(WriteIoSnafu)
            };
        }

        let px_num = pixels.len() / usize::from(channels);

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
                    w!(&[QOI_OP_RUN | (run - 1)])?;
                    run = 0;
                }
                continue;
            }

            if run > 0 {
                w!(&[QOI_OP_RUN | (run - 1)])?;
                run = 0;
            }

            let (buf, len) = self.select_op(pixel).to_bytes();
            w!(&buf[..len])?;
        }

        w!(&QOI_PADDING)?;

        Ok(())
    }
}
